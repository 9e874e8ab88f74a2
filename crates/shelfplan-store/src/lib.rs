#![warn(missing_docs)]

//! Persistence for shelfplan documents.
//!
//! [`PersistenceGateway`] is the CRUD contract over the four collections a
//! planner reads and writes: stores, aisles (with their embedded product
//! allocations), inventory products and placed-box overrides. Every
//! document is keyed by a gateway-generated id, every update is a partial
//! merge described by a patch type, and timestamps are assigned by the
//! gateway on write.
//!
//! [`InMemoryGateway`] is a complete implementation backed by plain vectors,
//! used by the CLI and by tests.

mod memory;
mod patch;

pub use memory::InMemoryGateway;
pub use patch::{AislePatch, ProductPatch, StorePatch};

use shelfplan_ir::{
    Aisle, AisleId, InventoryProduct, NewAisle, NewStore, OverrideId, PlacedBoxOverride,
    ProductId, Store, StoreId,
};
use thiserror::Error;

/// Errors returned by a persistence backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// No document with this id exists in the collection.
    #[error("{collection} {id} not found")]
    NotFound {
        /// Collection name, e.g. `"aisle"`.
        collection: &'static str,
        /// The missing id.
        id: String,
    },

    /// The backend refused the write.
    #[error("write rejected: {0}")]
    Rejected(String),

    /// The backend could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    pub(crate) fn not_found(collection: &'static str, id: &str) -> Self {
        GatewayError::NotFound {
            collection,
            id: id.to_string(),
        }
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// CRUD over stores, aisles, inventory products and overrides.
pub trait PersistenceGateway {
    /// Create a store owned by `owner_id`.
    fn create_store(&mut self, owner_id: &str, fields: NewStore) -> Result<StoreId>;

    /// Stores owned by `owner_id`, most recently updated first.
    fn list_stores(&self, owner_id: &str) -> Result<Vec<Store>>;

    /// A store by id.
    fn get_store(&self, id: &str) -> Result<Option<Store>>;

    /// Merge `patch` into a store.
    fn update_store(&mut self, id: &str, patch: StorePatch) -> Result<()>;

    /// Delete a store and every aisle whose `store_id` matches.
    fn delete_store(&mut self, id: &str) -> Result<()>;

    /// Create an aisle in `store_id`. Touches the store's update time.
    fn create_aisle(&mut self, store_id: &str, fields: NewAisle) -> Result<AisleId>;

    /// Aisles of a store, in creation order.
    fn list_aisles(&self, store_id: &str) -> Result<Vec<Aisle>>;

    /// Merge `patch` into an aisle. Touches the store's update time.
    fn update_aisle(&mut self, id: &str, patch: AislePatch) -> Result<()>;

    /// Delete an aisle. Touches the store's update time.
    fn delete_aisle(&mut self, id: &str) -> Result<()>;

    /// Create an inventory product. The `id` of `fields` is ignored.
    fn create_product(&mut self, fields: InventoryProduct) -> Result<ProductId>;

    /// Inventory owned by `owner_id`.
    fn list_products(&self, owner_id: &str) -> Result<Vec<InventoryProduct>>;

    /// Merge `patch` into an inventory product.
    fn update_product(&mut self, id: &str, patch: ProductPatch) -> Result<()>;

    /// Delete an inventory product. References to it are left dangling.
    fn delete_product(&mut self, id: &str) -> Result<()>;

    /// Create an override record. The `id` of `fields` is ignored.
    fn create_override(&mut self, fields: PlacedBoxOverride) -> Result<OverrideId>;

    /// Overrides of a store.
    fn list_overrides(&self, store_id: &str) -> Result<Vec<PlacedBoxOverride>>;

    /// Delete one override.
    fn delete_override(&mut self, id: &str) -> Result<()>;

    /// Delete every override of a store.
    fn delete_all_overrides(&mut self, store_id: &str) -> Result<()>;
}
