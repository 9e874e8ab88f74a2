//! Aisle and inventory edits on a session.

use shelfplan_editor::EditorCommit;
use shelfplan_ir::{AisleId, AisleProduct, InventoryProduct, NewAisle, ProductId};
use shelfplan_math::{Rect2, ShelfLevel};
use shelfplan_store::{AislePatch, GatewayError, PersistenceGateway, ProductPatch};
use tracing::debug;
use uuid::Uuid;

use crate::sync::PendingWrite;
use crate::{Result, Session, SessionError};

impl Session {
    /// Apply a validated edit from the plan editor. Returns the id of the
    /// created or resized aisle.
    pub fn apply_commit(&mut self, commit: EditorCommit) -> Result<AisleId> {
        match commit {
            EditorCommit::Create(fields) => Ok(self.add_aisle(fields)),
            EditorCommit::Resize { aisle_id, rect } => {
                self.resize_aisle(&aisle_id, rect)?;
                Ok(aisle_id)
            }
        }
    }

    /// Add an aisle with a client-side id (replaced on sync).
    pub fn add_aisle(&mut self, fields: NewAisle) -> AisleId {
        let id = Uuid::new_v4().to_string();
        let mut aisle = fields.into_aisle(id.clone(), self.store.id.clone());
        for allocation in &mut aisle.products {
            allocation.aisle_id = id.clone();
        }
        debug!(aisle = %id, rect = %aisle.rect(), "added aisle");
        self.aisles.push(aisle);
        self.outbox.push(PendingWrite::CreateAisle(id.clone()));
        id
    }

    /// Move/resize an aisle.
    pub fn resize_aisle(&mut self, id: &str, rect: Rect2) -> Result<()> {
        self.aisle_mut(id)?.set_rect(rect);
        self.queue_aisle_patch(id, AislePatch::rect(rect));
        Ok(())
    }

    /// Rename an aisle.
    pub fn rename_aisle(&mut self, id: &str, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.aisle_mut(id)?.name = name.clone();
        self.queue_aisle_patch(
            id,
            AislePatch {
                name: Some(name),
                ..AislePatch::default()
            },
        );
        Ok(())
    }

    /// Set an aisle's height; the shelf count is re-derived from it.
    pub fn set_aisle_height(&mut self, id: &str, height: f64) -> Result<()> {
        let aisle = self.aisle_mut(id)?;
        aisle.set_height(height);
        let shelves = aisle.shelves;
        self.queue_aisle_patch(
            id,
            AislePatch {
                height: Some(height),
                shelves: Some(shelves),
                ..AislePatch::default()
            },
        );
        Ok(())
    }

    /// Override an aisle's shelf count (clamped to `[1, 10]`). Allocations
    /// on shelves that no longer exist are kept but not packed.
    pub fn set_aisle_shelves(&mut self, id: &str, shelves: u32) -> Result<()> {
        let aisle = self.aisle_mut(id)?;
        aisle.set_shelves(shelves);
        let shelves = aisle.shelves;
        self.queue_aisle_patch(
            id,
            AislePatch {
                shelves: Some(shelves),
                ..AislePatch::default()
            },
        );
        Ok(())
    }

    /// Delete an aisle together with the manual placements inside it.
    pub fn delete_aisle(&mut self, id: &str) -> Result<()> {
        let index = self
            .aisles
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| SessionError::UnknownAisle(id.to_string()))?;
        self.aisles.remove(index);

        let (gone, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.overrides)
            .into_iter()
            .partition(|o| o.aisle_id == id);
        self.overrides = kept;
        for record in &gone {
            self.queue_override_delete(&record.id);
        }
        if self.selected_aisle.as_deref() == Some(id) {
            self.selected_aisle = None;
        }
        debug!(aisle = id, overrides = gone.len(), "deleted aisle");
        self.queue_aisle_delete(id);
        Ok(())
    }

    /// Append an allocation of `quantity_boxes` boxes of a product to one
    /// shelf of an aisle. Returns the allocation id.
    pub fn assign_product(
        &mut self,
        aisle_id: &str,
        product_id: &str,
        shelf_level: ShelfLevel,
        quantity_boxes: u32,
    ) -> Result<String> {
        let aisle = self.aisle_mut(aisle_id)?;
        if shelf_level.get() > aisle.shelves {
            return Err(SessionError::NoSuchShelf {
                aisle: aisle_id.to_string(),
                level: shelf_level.get(),
            });
        }
        let id = Uuid::new_v4().to_string();
        let position = aisle.products.len() as u32;
        aisle.products.push(AisleProduct {
            id: id.clone(),
            product_id: product_id.to_string(),
            aisle_id: aisle_id.to_string(),
            quantity_boxes,
            shelf_level,
            position,
        });
        let products = aisle.products.clone();
        self.queue_aisle_patch(aisle_id, AislePatch::products(products));
        Ok(id)
    }

    /// Change how many boxes an allocation requests.
    pub fn set_allocation_quantity(
        &mut self,
        aisle_id: &str,
        allocation_id: &str,
        quantity_boxes: u32,
    ) -> Result<()> {
        self.edit_allocations(aisle_id, |products| {
            let allocation = products
                .iter_mut()
                .find(|p| p.id == allocation_id)
                .ok_or_else(|| SessionError::UnknownAllocation(allocation_id.to_string()))?;
            allocation.quantity_boxes = quantity_boxes;
            Ok(())
        })
    }

    /// Remove an allocation.
    pub fn remove_allocation(&mut self, aisle_id: &str, allocation_id: &str) -> Result<()> {
        self.edit_allocations(aisle_id, |products| {
            let index = products
                .iter()
                .position(|p| p.id == allocation_id)
                .ok_or_else(|| SessionError::UnknownAllocation(allocation_id.to_string()))?;
            products.remove(index);
            Ok(())
        })
    }

    /// Move an allocation to `to` in packing order (clamped to the end).
    pub fn reorder_allocation(
        &mut self,
        aisle_id: &str,
        allocation_id: &str,
        to: usize,
    ) -> Result<()> {
        self.edit_allocations(aisle_id, |products| {
            let from = products
                .iter()
                .position(|p| p.id == allocation_id)
                .ok_or_else(|| SessionError::UnknownAllocation(allocation_id.to_string()))?;
            let allocation = products.remove(from);
            products.insert(to.min(products.len()), allocation);
            Ok(())
        })
    }

    fn edit_allocations<F>(&mut self, aisle_id: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<AisleProduct>) -> Result<()>,
    {
        let aisle = self.aisle_mut(aisle_id)?;
        edit(&mut aisle.products)?;
        for (position, allocation) in aisle.products.iter_mut().enumerate() {
            allocation.position = position as u32;
        }
        let products = aisle.products.clone();
        self.queue_aisle_patch(aisle_id, AislePatch::products(products));
        Ok(())
    }

    /// Create or update an inventory product directly through `gateway`.
    ///
    /// Unlike other edits this is not queued: the error is returned so the
    /// caller can show it, and local inventory only changes on success. A
    /// product whose id is not in the local inventory is created.
    pub fn save_inventory_product<G>(
        &mut self,
        gateway: &mut G,
        product: InventoryProduct,
    ) -> std::result::Result<ProductId, GatewayError>
    where
        G: PersistenceGateway + ?Sized,
    {
        let id = if self.inventory.contains_key(&product.id) {
            gateway.update_product(&product.id, ProductPatch::from_product(&product))?;
            product.id.clone()
        } else {
            gateway.create_product(product.clone())?
        };
        debug!(product = %id, name = %product.name, "saved product");
        self.inventory
            .insert(id.clone(), InventoryProduct { id: id.clone(), ..product });
        Ok(id)
    }

    /// Delete an inventory product through `gateway`. Allocations and
    /// placements referencing it are left dangling and skipped when drawn.
    pub fn delete_inventory_product<G>(
        &mut self,
        gateway: &mut G,
        id: &str,
    ) -> std::result::Result<(), GatewayError>
    where
        G: PersistenceGateway + ?Sized,
    {
        gateway.delete_product(id)?;
        self.inventory.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RackSpec;
    use shelfplan_ir::NewStore;
    use shelfplan_math::BoxDims;
    use shelfplan_store::InMemoryGateway;

    fn setup() -> (InMemoryGateway, Session) {
        let mut gw = InMemoryGateway::new();
        let store = gw
            .create_store(
                "u1",
                NewStore {
                    name: "Shop".into(),
                    description: None,
                    color: "#fff".into(),
                    width: 20.0,
                    depth: 12.0,
                },
            )
            .unwrap();
        let session = Session::load(&gw, &store, "u1", RackSpec::default()).unwrap();
        (gw, session)
    }

    fn oats() -> InventoryProduct {
        InventoryProduct {
            id: String::new(),
            user_id: "u1".into(),
            name: "Oats".into(),
            sku: "OAT-1".into(),
            category: "dry".into(),
            box_dimensions: BoxDims::new(0.4, 0.3, 0.2),
            items_per_box: 8,
            label_color: "#d4a017".into(),
            price_per_item: 2.0,
            total_boxes_stock: 20,
        }
    }

    fn rect() -> Rect2 {
        Rect2::new(2.0, 2.0, 2.0, 6.0)
    }

    #[test]
    fn test_new_aisle_synced_under_server_id() {
        let (mut gw, mut s) = setup();
        let product = s.save_inventory_product(&mut gw, oats()).unwrap();
        let local = s.add_aisle(NewAisle::from_rect("Aisle 1", rect()));
        s.assign_product(&local, &product, ShelfLevel::FIRST, 2).unwrap();
        s.select_aisle(Some(&local)).unwrap();
        s.grab(&format!("{local}:{product}:L1:U0:1")).unwrap();

        let report = s.sync(&mut gw);
        assert_eq!(report.attempted, 2);
        assert_eq!(report.failed, 0);

        let remote = gw.list_aisles(&s.store().id).unwrap();
        assert_eq!(remote.len(), 1);
        let server = remote[0].id.clone();
        assert_ne!(server, local);
        assert_eq!(remote[0].products.len(), 1);
        assert_eq!(remote[0].products[0].aisle_id, server);

        assert_eq!(s.aisles()[0].id, server);
        assert_eq!(s.selected_aisle().unwrap().id, server);
        assert_eq!(s.held().unwrap().source_aisle_id, server);
        assert!(s
            .picked_up()
            .contains(&format!("{server}:{product}:L1:U0:1")));
        assert_eq!(s.scene().boxes.len(), 1);
    }

    #[test]
    fn test_resize_and_height_patch_remote() {
        let (mut gw, mut s) = setup();
        s.apply_commit(EditorCommit::Create(NewAisle::from_rect("Aisle 1", rect())))
            .unwrap();
        s.sync(&mut gw);
        let id = s.aisles()[0].id.clone();

        let resized = Rect2::new(3.0, 2.0, 2.0, 9.0);
        s.apply_commit(EditorCommit::Resize {
            aisle_id: id.clone(),
            rect: resized,
        })
        .unwrap();
        s.set_aisle_height(&id, 1.0).unwrap();
        assert_eq!(s.aisle(&id).unwrap().shelves, 2);
        s.rename_aisle(&id, "Dry goods").unwrap();
        assert_eq!(s.sync(&mut gw).failed, 0);

        let remote = &gw.list_aisles(&s.store().id).unwrap()[0];
        assert_eq!(remote.rect(), resized);
        assert_eq!(remote.height, 1.0);
        assert_eq!(remote.shelves, 2);
        assert_eq!(remote.name, "Dry goods");
    }

    #[test]
    fn test_delete_unsynced_aisle_never_reaches_gateway() {
        let (mut gw, mut s) = setup();
        let id = s.add_aisle(NewAisle::from_rect("Aisle 1", rect()));
        s.set_aisle_shelves(&id, 3).unwrap();
        s.delete_aisle(&id).unwrap();
        assert!(s.pending().is_empty());
        assert_eq!(s.sync(&mut gw).attempted, 0);
        assert!(matches!(
            s.delete_aisle(&id),
            Err(SessionError::UnknownAisle(_))
        ));
    }

    #[test]
    fn test_delete_aisle_removes_its_overrides() {
        let (mut gw, mut s) = setup();
        let product = s.save_inventory_product(&mut gw, oats()).unwrap();
        let aisle = s.add_aisle(NewAisle::from_rect("Aisle 1", rect()));
        s.assign_product(&aisle, &product, ShelfLevel::FIRST, 2).unwrap();
        s.sync(&mut gw);
        let aisle = s.aisles()[0].id.clone();

        let box_id = format!("{aisle}:{product}:L1:U0:0");
        s.grab(&box_id).unwrap();
        let slot = s.vacant_slots(&aisle).unwrap()[0].clone();
        s.place(crate::PlaceTarget::from_slot(aisle.clone(), &slot))
            .unwrap();
        s.sync(&mut gw);
        assert_eq!(gw.list_overrides(&s.store().id).unwrap().len(), 1);

        s.delete_aisle(&aisle).unwrap();
        assert!(s.overrides().is_empty());
        assert_eq!(s.sync(&mut gw).failed, 0);
        assert!(gw.list_overrides(&s.store().id).unwrap().is_empty());
        assert!(gw.list_aisles(&s.store().id).unwrap().is_empty());
    }

    #[test]
    fn test_allocation_edits_keep_positions_dense() {
        let (mut gw, mut s) = setup();
        let product = s.save_inventory_product(&mut gw, oats()).unwrap();
        let aisle = s.add_aisle(NewAisle::from_rect("Aisle 1", rect()));
        let first = s.assign_product(&aisle, &product, ShelfLevel::FIRST, 2).unwrap();
        let second = s.assign_product(&aisle, "gone", ShelfLevel::FIRST, 5).unwrap();
        let third = s.assign_product(&aisle, &product, ShelfLevel::FIRST, 1).unwrap();

        s.reorder_allocation(&aisle, &third, 0).unwrap();
        s.remove_allocation(&aisle, &second).unwrap();
        s.set_allocation_quantity(&aisle, &first, 4).unwrap();

        let products = &s.aisle(&aisle).unwrap().products;
        let ids: Vec<_> = products.iter().map(|p| (p.id.as_str(), p.position)).collect();
        assert_eq!(ids, [(third.as_str(), 0), (first.as_str(), 1)]);
        assert_eq!(products[1].quantity_boxes, 4);
        assert!(matches!(
            s.remove_allocation(&aisle, &second),
            Err(SessionError::UnknownAllocation(_))
        ));
        assert!(matches!(
            s.assign_product(&aisle, &product, ShelfLevel::new(6).unwrap(), 1),
            Err(SessionError::NoSuchShelf { level: 6, .. })
        ));
    }

    #[test]
    fn test_save_product_updates_existing() {
        let (mut gw, mut s) = setup();
        let id = s.save_inventory_product(&mut gw, oats()).unwrap();
        let mut edited = s.inventory()[&id].clone();
        edited.total_boxes_stock = 3;
        assert_eq!(s.save_inventory_product(&mut gw, edited).unwrap(), id);
        assert_eq!(gw.list_products("u1").unwrap()[0].total_boxes_stock, 3);
        assert_eq!(s.inventory()[&id].total_boxes_stock, 3);

        s.delete_inventory_product(&mut gw, &id).unwrap();
        assert!(s.inventory().is_empty());
        assert!(s.delete_inventory_product(&mut gw, &id).is_err());
    }
}
