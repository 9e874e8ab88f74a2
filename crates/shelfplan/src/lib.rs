#![warn(missing_docs)]

//! shelfplan: retail store planning in Rust
//!
//! Lay out aisles on a store floor plan, allocate inventory to shelves,
//! pack the boxes deterministically and move them around by hand.
//!
//! [`Session`] is the application state: one store, its aisles, the
//! owner's inventory and the manual placements, plus the box currently held
//! in hand. Every mutation is applied locally first and queued as a pending
//! write; [`Session::sync`] later pushes the queue through a
//! [`PersistenceGateway`], logging failures without undoing anything.
//!
//! # Example
//!
//! ```
//! use shelfplan::{InMemoryGateway, PersistenceGateway, RackSpec, Session};
//! use shelfplan::editor::EditorCommit;
//! use shelfplan::ir::{InventoryProduct, NewAisle, NewStore};
//! use shelfplan::math::{BoxDims, Rect2, ShelfLevel};
//!
//! let mut gateway = InMemoryGateway::new();
//! let store_id = gateway
//!     .create_store(
//!         "u1",
//!         NewStore {
//!             name: "Corner shop".into(),
//!             description: None,
//!             color: "#f5f5f5".into(),
//!             width: 20.0,
//!             depth: 12.0,
//!         },
//!     )
//!     .unwrap();
//! let mut session = Session::load(&gateway, &store_id, "u1", RackSpec::default()).unwrap();
//!
//! let product = session
//!     .save_inventory_product(
//!         &mut gateway,
//!         InventoryProduct {
//!             id: String::new(),
//!             user_id: "u1".into(),
//!             name: "Oats".into(),
//!             sku: "OAT-1".into(),
//!             category: "dry".into(),
//!             box_dimensions: BoxDims::new(0.25, 0.2, 0.2),
//!             items_per_box: 8,
//!             label_color: "#d4a017".into(),
//!             price_per_item: 2.0,
//!             total_boxes_stock: 20,
//!         },
//!     )
//!     .unwrap();
//!
//! let aisle = session
//!     .apply_commit(EditorCommit::Create(NewAisle::from_rect(
//!         "Aisle 1",
//!         Rect2::new(2.0, 2.0, 2.0, 6.0),
//!     )))
//!     .unwrap();
//! session.assign_product(&aisle, &product, ShelfLevel::FIRST, 12).unwrap();
//! assert_eq!(session.scene().boxes.len(), 12);
//!
//! let report = session.sync(&mut gateway);
//! assert_eq!(report.failed, 0);
//! assert_eq!(gateway.list_aisles(&store_id).unwrap().len(), 1);
//! ```

mod interaction;
mod plan;
mod session;
mod snapshot;
mod sync;

pub use interaction::{BoxInspection, HeldBox, HoldState, PlaceTarget, Target};
pub use session::{Scene, Session, ViewMode};
pub use snapshot::SessionSnapshot;
pub use sync::{PendingWrite, SyncReport};

pub use shelfplan_editor as editor;
pub use shelfplan_ir as ir;
pub use shelfplan_math as math;
pub use shelfplan_packer as packer;
pub use shelfplan_store as store;

pub use shelfplan_packer::RackSpec;
pub use shelfplan_store::{GatewayError, InMemoryGateway, PersistenceGateway};

use thiserror::Error;

/// Errors returned by session operations.
///
/// Invalid interaction transitions are reported rather than panicking so a
/// UI can ignore them; persistence failures during [`Session::sync`] are
/// logged instead.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The operation needs an empty hand.
    #[error("a box is already held")]
    NotIdle,

    /// The operation needs a held box.
    #[error("no box is held")]
    NotHolding,

    /// A placement has not been synced yet.
    #[error("a placement is already in flight")]
    PlacementInFlight,

    /// No visible box has this id.
    #[error("unknown box {0}")]
    UnknownBox(String),

    /// No aisle in this store has this id.
    #[error("unknown aisle {0}")]
    UnknownAisle(String),

    /// No allocation in the aisle has this id.
    #[error("unknown allocation {0}")]
    UnknownAllocation(String),

    /// The shelf level does not exist in the aisle.
    #[error("aisle {aisle} has no shelf {level}")]
    NoSuchShelf {
        /// Aisle id.
        aisle: String,
        /// Requested level.
        level: u32,
    },

    /// The rack unit does not exist in the aisle.
    #[error("aisle {aisle} has no rack unit {unit}")]
    NoSuchUnit {
        /// Aisle id.
        aisle: String,
        /// Requested unit.
        unit: u32,
    },

    /// A snapshot was written by an incompatible version.
    #[error("unsupported snapshot version {0}")]
    SnapshotVersion(String),

    /// Snapshot (de)serialization failed.
    #[error("snapshot error: {0}")]
    Json(#[from] serde_json::Error),

    /// The gateway failed on a call whose result is needed immediately.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
