#![warn(missing_docs)]

//! Shelf packing for shelfplan racks.
//!
//! Given an aisle, its ordered per-shelf product allocations and the
//! inventory they reference, [`pack`] deterministically computes where every
//! individual box sits: rack unit, shelf level and centre on the shelf.
//! [`find_vacant_slots`] lays a grid over a shelf and reports the positions
//! a held box can be dropped on, and [`target_slot`] picks the one slot hit
//! by the user's view ray.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use shelfplan_ir::{Aisle, AisleProduct, InventoryProduct};
//! use shelfplan_math::{BoxDims, ShelfLevel};
//! use shelfplan_packer::{pack, RackSpec};
//!
//! let product = InventoryProduct {
//!     id: "p1".into(),
//!     user_id: "u1".into(),
//!     name: "Cereal".into(),
//!     sku: "CER-1".into(),
//!     category: "food".into(),
//!     box_dimensions: BoxDims::new(0.25, 0.2, 0.2),
//!     items_per_box: 12,
//!     label_color: "#ffaa00".into(),
//!     price_per_item: 3.5,
//!     total_boxes_stock: 40,
//! };
//! let aisle = Aisle {
//!     id: "a1".into(),
//!     store_id: "s1".into(),
//!     name: "Aisle 1".into(),
//!     x: 0.0,
//!     z: 0.0,
//!     width: 2.0,
//!     length: 6.0,
//!     height: 2.0,
//!     shelves: 1,
//!     products: vec![AisleProduct {
//!         id: "ap1".into(),
//!         product_id: "p1".into(),
//!         aisle_id: "a1".into(),
//!         quantity_boxes: 10,
//!         shelf_level: ShelfLevel::FIRST,
//!         position: 0,
//!     }],
//! };
//! let inventory = HashMap::from([(product.id.clone(), product)]);
//!
//! let boxes = pack(&aisle, &inventory, &RackSpec::default());
//! assert_eq!(boxes.len(), 10);
//! ```

mod config;
mod key;
mod layout;
mod pack;
mod target;
mod vacancy;

pub use config::RackSpec;
pub use key::BoxKey;
pub use layout::{RackLayout, ShelfArea};
pub use pack::{pack, pack_aisle, PackedAisle, ProductCatalog, ShelfLabel};
pub use target::{target_slot, SlotVolume, ViewRay};
pub use vacancy::{find_aisle_vacancies, find_vacant_slots, Slot};

use thiserror::Error;

/// Errors from packer configuration.
#[derive(Debug, Clone, Error)]
pub enum PackerError {
    /// A rack dimension is zero, negative or not finite.
    #[error("invalid rack spec: {0}")]
    InvalidSpec(String),
}

/// Result type for packer operations.
pub type Result<T> = std::result::Result<T, PackerError>;
