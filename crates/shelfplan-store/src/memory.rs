//! A complete gateway held in process memory.

use std::time::{SystemTime, UNIX_EPOCH};

use shelfplan_ir::{
    Aisle, AisleId, InventoryProduct, NewAisle, NewStore, OverrideId, PlacedBoxOverride,
    ProductId, Store, StoreDocument, StoreId,
};
use tracing::debug;
use uuid::Uuid;

use crate::{AislePatch, GatewayError, PersistenceGateway, ProductPatch, Result, StorePatch};

/// In-memory backend. Ids are random v4 uuids; timestamps are wall-clock
/// milliseconds forced strictly increasing so update order is total.
#[derive(Debug, Default, Clone)]
pub struct InMemoryGateway {
    stores: Vec<Store>,
    aisles: Vec<Aisle>,
    products: Vec<InventoryProduct>,
    overrides: Vec<PlacedBoxOverride>,
    clock: u64,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl InMemoryGateway {
    /// An empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend seeded with the contents of `doc`, ids preserved.
    pub fn from_document(doc: &StoreDocument) -> Self {
        let mut gateway = Self::new();
        gateway.clock = doc.store.updated_at.max(doc.store.created_at);
        gateway.stores.push(doc.store.clone());
        gateway.aisles = doc.aisles.clone();
        gateway.products = doc.inventory.clone();
        gateway.overrides = doc.overrides.clone();
        gateway
    }

    /// Export one store with its aisles, its owner's inventory and its
    /// overrides.
    pub fn to_document(&self, store_id: &str) -> Result<StoreDocument> {
        let store = self
            .get_store(store_id)?
            .ok_or_else(|| GatewayError::not_found("store", store_id))?;
        let mut doc = StoreDocument::new(store);
        doc.aisles = self.list_aisles(store_id)?;
        doc.inventory = self.list_products(&doc.store.owner_id)?;
        doc.overrides = self.list_overrides(store_id)?;
        Ok(doc)
    }

    fn tick(&mut self) -> u64 {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.clock = wall.max(self.clock + 1);
        self.clock
    }

    fn touch_store(&mut self, store_id: &str) {
        let now = self.tick();
        if let Some(store) = self.stores.iter_mut().find(|s| s.id == store_id) {
            store.updated_at = now;
        }
    }

    fn store_mut(&mut self, id: &str) -> Result<&mut Store> {
        self.stores
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| GatewayError::not_found("store", id))
    }

    fn aisle_mut(&mut self, id: &str) -> Result<&mut Aisle> {
        self.aisles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| GatewayError::not_found("aisle", id))
    }
}

impl PersistenceGateway for InMemoryGateway {
    fn create_store(&mut self, owner_id: &str, fields: NewStore) -> Result<StoreId> {
        let id = new_id();
        let now = self.tick();
        self.stores.push(Store {
            id: id.clone(),
            owner_id: owner_id.to_string(),
            name: fields.name,
            description: fields.description,
            color: fields.color,
            width: fields.width,
            depth: fields.depth,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    fn list_stores(&self, owner_id: &str) -> Result<Vec<Store>> {
        let mut stores: Vec<Store> = self
            .stores
            .iter()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        stores.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(stores)
    }

    fn get_store(&self, id: &str) -> Result<Option<Store>> {
        Ok(self.stores.iter().find(|s| s.id == id).cloned())
    }

    fn update_store(&mut self, id: &str, patch: StorePatch) -> Result<()> {
        let now = self.tick();
        let store = self.store_mut(id)?;
        patch.apply(store);
        store.updated_at = now;
        Ok(())
    }

    fn delete_store(&mut self, id: &str) -> Result<()> {
        let before = self.stores.len();
        self.stores.retain(|s| s.id != id);
        if self.stores.len() == before {
            return Err(GatewayError::not_found("store", id));
        }
        let aisles = self.aisles.len();
        self.aisles.retain(|a| a.store_id != id);
        debug!(store = id, aisles = aisles - self.aisles.len(), "deleted store");
        Ok(())
    }

    fn create_aisle(&mut self, store_id: &str, fields: NewAisle) -> Result<AisleId> {
        self.store_mut(store_id)?;
        let id = new_id();
        let mut aisle = fields.into_aisle(id.clone(), store_id.to_string());
        for allocation in &mut aisle.products {
            allocation.aisle_id = id.clone();
        }
        self.aisles.push(aisle);
        self.touch_store(store_id);
        Ok(id)
    }

    fn list_aisles(&self, store_id: &str) -> Result<Vec<Aisle>> {
        Ok(self
            .aisles
            .iter()
            .filter(|a| a.store_id == store_id)
            .cloned()
            .collect())
    }

    fn update_aisle(&mut self, id: &str, patch: AislePatch) -> Result<()> {
        let aisle = self.aisle_mut(id)?;
        patch.apply(aisle);
        let store_id = aisle.store_id.clone();
        self.touch_store(&store_id);
        Ok(())
    }

    fn delete_aisle(&mut self, id: &str) -> Result<()> {
        let index = self
            .aisles
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| GatewayError::not_found("aisle", id))?;
        let aisle = self.aisles.remove(index);
        self.touch_store(&aisle.store_id);
        Ok(())
    }

    fn create_product(&mut self, fields: InventoryProduct) -> Result<ProductId> {
        let id = new_id();
        self.products.push(InventoryProduct {
            id: id.clone(),
            ..fields
        });
        Ok(id)
    }

    fn list_products(&self, owner_id: &str) -> Result<Vec<InventoryProduct>> {
        Ok(self
            .products
            .iter()
            .filter(|p| p.user_id == owner_id)
            .cloned()
            .collect())
    }

    fn update_product(&mut self, id: &str, patch: ProductPatch) -> Result<()> {
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| GatewayError::not_found("product", id))?;
        patch.apply(product);
        Ok(())
    }

    fn delete_product(&mut self, id: &str) -> Result<()> {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        if self.products.len() == before {
            return Err(GatewayError::not_found("product", id));
        }
        Ok(())
    }

    fn create_override(&mut self, fields: PlacedBoxOverride) -> Result<OverrideId> {
        let id = new_id();
        self.overrides.push(PlacedBoxOverride {
            id: id.clone(),
            ..fields
        });
        Ok(id)
    }

    fn list_overrides(&self, store_id: &str) -> Result<Vec<PlacedBoxOverride>> {
        Ok(self
            .overrides
            .iter()
            .filter(|o| o.store_id == store_id)
            .cloned()
            .collect())
    }

    fn delete_override(&mut self, id: &str) -> Result<()> {
        let before = self.overrides.len();
        self.overrides.retain(|o| o.id != id);
        if self.overrides.len() == before {
            return Err(GatewayError::not_found("override", id));
        }
        Ok(())
    }

    fn delete_all_overrides(&mut self, store_id: &str) -> Result<()> {
        self.overrides.retain(|o| o.store_id != store_id);
        Ok(())
    }
}
