//! End-to-end behaviour of a planning session through its public API:
//!
//! 1. Grab/place/reset round trip restores packed positions.
//! 2. A manually placed box is never offered as a vacant slot again.
//! 3. A 6 m aisle with one shelf spills a large allocation into its second
//!    rack unit and drops the rest.
//! 4. Editing one allocation never renames or duplicates another product's
//!    boxes, including one that was moved by hand.
//! 5. Gateway failures are counted and logged; local state is kept.

use std::collections::BTreeSet;

use shelfplan::ir::{
    Aisle, InventoryProduct, NewAisle, NewStore, PlacedBoxOverride, ProductId, Store,
};
use shelfplan::math::{BoxDims, Footprint, Rect2, ShelfLevel};
use shelfplan::packer::{find_vacant_slots, RackSpec};
use shelfplan::store::{AislePatch, ProductPatch, StorePatch};
use shelfplan::{
    GatewayError, InMemoryGateway, PersistenceGateway, PlaceTarget, Session, SessionError,
};

// ── Helpers ─────────────────────────────────────────────────────────────

fn cereal() -> InventoryProduct {
    InventoryProduct {
        id: String::new(),
        user_id: "u1".into(),
        name: "Cereal".into(),
        sku: "CER-1".into(),
        category: "breakfast".into(),
        box_dimensions: BoxDims::new(0.25, 0.2, 0.2),
        items_per_box: 12,
        label_color: "#ffaa00".into(),
        price_per_item: 3.5,
        total_boxes_stock: 80,
    }
}

/// A store with one 2 × 6 m aisle holding `quantity` cereal boxes on a
/// single shelf, already synced.
fn planned(quantity: u32) -> (InMemoryGateway, Session, String, ProductId) {
    let mut gateway = InMemoryGateway::new();
    let store = gateway
        .create_store(
            "u1",
            NewStore {
                name: "Market".into(),
                description: None,
                color: "#eeeeee".into(),
                width: 24.0,
                depth: 16.0,
            },
        )
        .unwrap();
    let mut session = Session::load(&gateway, &store, "u1", RackSpec::default()).unwrap();
    let product = session
        .save_inventory_product(&mut gateway, cereal())
        .unwrap();
    let aisle = session.add_aisle(NewAisle::from_rect("Aisle 1", Rect2::new(4.0, 4.0, 2.0, 6.0)));
    session.set_aisle_shelves(&aisle, 1).unwrap();
    session
        .assign_product(&aisle, &product, ShelfLevel::FIRST, quantity)
        .unwrap();
    assert_eq!(session.sync(&mut gateway).failed, 0);
    let aisle = session.aisles()[0].id.clone();
    (gateway, session, aisle, product)
}

fn box_id(aisle: &str, product: &str, unit: u32, seq: u32) -> String {
    format!("{aisle}:{product}:L1:U{unit}:{seq}")
}

/// Reads succeed, every write fails.
struct OfflineGateway {
    inner: InMemoryGateway,
}

impl OfflineGateway {
    fn down<T>() -> Result<T, GatewayError> {
        Err(GatewayError::Unavailable("connection refused".into()))
    }
}

impl PersistenceGateway for OfflineGateway {
    fn create_store(&mut self, _: &str, _: NewStore) -> Result<String, GatewayError> {
        Self::down()
    }
    fn list_stores(&self, owner_id: &str) -> Result<Vec<Store>, GatewayError> {
        self.inner.list_stores(owner_id)
    }
    fn get_store(&self, id: &str) -> Result<Option<Store>, GatewayError> {
        self.inner.get_store(id)
    }
    fn update_store(&mut self, _: &str, _: StorePatch) -> Result<(), GatewayError> {
        Self::down()
    }
    fn delete_store(&mut self, _: &str) -> Result<(), GatewayError> {
        Self::down()
    }
    fn create_aisle(&mut self, _: &str, _: NewAisle) -> Result<String, GatewayError> {
        Self::down()
    }
    fn list_aisles(&self, store_id: &str) -> Result<Vec<Aisle>, GatewayError> {
        self.inner.list_aisles(store_id)
    }
    fn update_aisle(&mut self, _: &str, _: AislePatch) -> Result<(), GatewayError> {
        Self::down()
    }
    fn delete_aisle(&mut self, _: &str) -> Result<(), GatewayError> {
        Self::down()
    }
    fn create_product(&mut self, _: InventoryProduct) -> Result<String, GatewayError> {
        Self::down()
    }
    fn list_products(&self, owner_id: &str) -> Result<Vec<InventoryProduct>, GatewayError> {
        self.inner.list_products(owner_id)
    }
    fn update_product(&mut self, _: &str, _: ProductPatch) -> Result<(), GatewayError> {
        Self::down()
    }
    fn delete_product(&mut self, _: &str) -> Result<(), GatewayError> {
        Self::down()
    }
    fn create_override(&mut self, _: PlacedBoxOverride) -> Result<String, GatewayError> {
        Self::down()
    }
    fn list_overrides(&self, store_id: &str) -> Result<Vec<PlacedBoxOverride>, GatewayError> {
        self.inner.list_overrides(store_id)
    }
    fn delete_override(&mut self, _: &str) -> Result<(), GatewayError> {
        Self::down()
    }
    fn delete_all_overrides(&mut self, _: &str) -> Result<(), GatewayError> {
        Self::down()
    }
}

// ── Grab / place / reset ────────────────────────────────────────────────

#[test]
fn grab_place_reset_round_trip() {
    let (mut gateway, mut session, aisle, product) = planned(4);
    let original = session.scene().boxes;
    let b = box_id(&aisle, &product, 0, 1);
    let home = original.iter().find(|p| p.box_id == b).unwrap().clone();

    session.grab(&b).unwrap();
    assert!(session.scene().boxes.iter().all(|p| p.box_id != b));

    let slot = session
        .vacant_slots(&aisle)
        .unwrap()
        .into_iter()
        .find(|s| s.unit_index == 1)
        .unwrap();
    let id = session
        .place(PlaceTarget::from_slot(aisle.clone(), &slot))
        .unwrap();

    let scene = session.scene().boxes;
    assert_eq!(scene.len(), original.len());
    let moved: Vec<_> = scene.iter().filter(|p| p.box_id == b).collect();
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].unit_index, 1);
    assert_ne!(moved[0].footprint(), home.footprint());
    assert_eq!(session.overrides().len(), 1);
    assert_eq!(session.overrides()[0].id, id);

    assert_eq!(session.sync(&mut gateway).failed, 0);
    let store = session.store().id.clone();
    assert_eq!(gateway.list_overrides(&store).unwrap().len(), 1);

    session.reset_all();
    assert_eq!(session.scene().boxes, original);
    assert!(session.overrides().is_empty());
    assert_eq!(session.sync(&mut gateway).failed, 0);
    assert!(gateway.list_overrides(&store).unwrap().is_empty());
}

#[test]
fn reload_keeps_moved_box_out_of_its_packed_slot() {
    let (mut gateway, mut session, aisle, product) = planned(4);
    let b = box_id(&aisle, &product, 0, 0);
    session.grab(&b).unwrap();
    let slot = session.vacant_slots(&aisle).unwrap().pop().unwrap();
    session
        .place(PlaceTarget::from_slot(aisle.clone(), &slot))
        .unwrap();
    session.sync(&mut gateway);

    let store = session.store().id.clone();
    let reloaded = Session::load(&gateway, &store, "u1", RackSpec::default()).unwrap();
    assert!(reloaded.picked_up().contains(&b));
    let scene = reloaded.scene().boxes;
    assert_eq!(scene.len(), 4);
    assert_eq!(scene.iter().filter(|p| p.box_id == b).count(), 1);
    assert_eq!(scene.last().unwrap().box_id, b);
}

// ── Vacancy exclusion ───────────────────────────────────────────────────

#[test]
fn placed_override_is_never_vacant() {
    let (_gateway, mut session, aisle, product) = planned(2);
    session.grab(&box_id(&aisle, &product, 0, 0)).unwrap();
    let before = session.vacant_slots(&aisle).unwrap();
    let chosen = before
        .iter()
        .find(|s| s.unit_index == 1 && s.shelf_level == ShelfLevel::FIRST)
        .unwrap()
        .clone();
    session
        .place(PlaceTarget::from_slot(aisle.clone(), &chosen))
        .unwrap();

    let placed: Footprint = session.overrides()[0].footprint();
    let occupied = session.scene().boxes;
    let after = find_vacant_slots(
        session.rack_spec(),
        1,
        ShelfLevel::FIRST,
        &occupied,
        chosen.width,
        chosen.depth,
    );
    assert!(!after.is_empty());
    assert!(after
        .iter()
        .filter(|s| s.side == chosen.side)
        .all(|s| !s.footprint().overlaps(&placed)));
    assert_eq!(after.len(), before.iter().filter(|s| s.unit_index == 1).count() - 1);
}

// ── Capacity scenario ───────────────────────────────────────────────────

#[test]
fn six_metre_aisle_fills_two_units_then_drops() {
    let (_gateway, session, aisle, _product) = planned(50);
    let scene = session.scene();
    let boxes: Vec<_> = scene.boxes.iter().filter(|b| b.aisle_id == aisle).collect();

    assert!(boxes.len() < 50);
    assert!(boxes.iter().any(|b| b.unit_index == 0));
    assert!(boxes.iter().any(|b| b.unit_index == 1));
    assert!(boxes.iter().all(|b| b.unit_index < 2));
    // 9 boxes per row, 2 rows per shelf, 2 units
    assert_eq!(boxes.len(), 36);

    let label = &scene.labels[0];
    assert_eq!(label.requested, 50);
    assert_eq!(label.placed, 36);
    assert_eq!(label.overflow(), 14);
    assert_eq!(label.anchor.map(|(unit, _)| unit), Some(0));
}

// ── Allocation edits after a move ───────────────────────────────────────

fn tea() -> InventoryProduct {
    InventoryProduct {
        name: "Tea".into(),
        sku: "TEA-1".into(),
        label_color: "#00aa55".into(),
        ..cereal()
    }
}

fn count_of(session: &Session, product: &str) -> usize {
    session
        .scene()
        .boxes
        .iter()
        .filter(|b| b.product_id == product)
        .count()
}

fn assert_ids_unique(session: &Session) {
    let scene = session.scene().boxes;
    let ids: BTreeSet<&str> = scene.iter().map(|b| b.box_id.as_str()).collect();
    assert_eq!(ids.len(), scene.len());
}

#[test]
fn resizing_neighbour_allocation_keeps_moved_box_single() {
    let (mut gateway, mut session, aisle, cereal_id) = planned(3);
    let tea_id = session.save_inventory_product(&mut gateway, tea()).unwrap();
    session
        .assign_product(&aisle, &tea_id, ShelfLevel::FIRST, 3)
        .unwrap();
    let cereal_allocation = session.aisle(&aisle).unwrap().products[0].id.clone();

    session.grab(&box_id(&aisle, &tea_id, 0, 0)).unwrap();
    let slot = session
        .vacant_slots(&aisle)
        .unwrap()
        .into_iter()
        .find(|s| s.unit_index == 1)
        .unwrap();
    session
        .place(PlaceTarget::from_slot(aisle.clone(), &slot))
        .unwrap();
    assert_eq!(count_of(&session, &tea_id), 3);

    session
        .set_allocation_quantity(&aisle, &cereal_allocation, 4)
        .unwrap();
    assert_eq!(count_of(&session, &cereal_id), 4);
    assert_eq!(count_of(&session, &tea_id), 3);
    assert_ids_unique(&session);
    // the other tea boxes keep their ids
    let scene = session.scene().boxes;
    assert!(scene.iter().any(|b| b.box_id == box_id(&aisle, &tea_id, 0, 1)));
    assert!(scene.iter().any(|b| b.box_id == box_id(&aisle, &tea_id, 0, 2)));

    // a full first unit pushes tea into unit 1, renaming every tea box;
    // the moved one still hides exactly one of them
    session
        .set_allocation_quantity(&aisle, &cereal_allocation, 18)
        .unwrap();
    assert_eq!(count_of(&session, &cereal_id), 18);
    assert_eq!(count_of(&session, &tea_id), 3);
    assert_ids_unique(&session);
    let scene = session.scene().boxes;
    assert!(scene.iter().all(|b| b.box_id != box_id(&aisle, &tea_id, 1, 0)));
    assert!(scene.iter().any(|b| b.box_id == box_id(&aisle, &tea_id, 0, 0)));
}

// ── Persistence failures ────────────────────────────────────────────────

#[test]
fn failed_writes_keep_local_state() {
    let (gateway, mut session, aisle, product) = planned(4);
    let mut offline = OfflineGateway { inner: gateway };

    session.grab(&box_id(&aisle, &product, 0, 2)).unwrap();
    let slot = session.vacant_slots(&aisle).unwrap().pop().unwrap();
    session
        .place(PlaceTarget::from_slot(aisle.clone(), &slot))
        .unwrap();
    session
        .resize_aisle(&aisle, Rect2::new(4.0, 4.0, 2.0, 9.0))
        .unwrap();

    let report = session.sync(&mut offline);
    assert_eq!(report.attempted, 2);
    assert_eq!(report.failed, 2);
    assert!(session.pending().is_empty());
    assert!(!session.placement_in_flight());
    assert_eq!(session.overrides().len(), 1);
    assert_eq!(session.aisle(&aisle).unwrap().length, 9.0);

    // the backend never saw either write
    let store = session.store().id.clone();
    assert!(offline.inner.list_overrides(&store).unwrap().is_empty());
    assert_eq!(offline.inner.list_aisles(&store).unwrap()[0].length, 6.0);
}

#[test]
fn failed_product_save_is_reported() {
    let (gateway, mut session, _aisle, _product) = planned(1);
    let mut offline = OfflineGateway { inner: gateway };
    let before = session.inventory().len();
    let err = session
        .save_inventory_product(&mut offline, cereal())
        .unwrap_err();
    assert!(matches!(err, GatewayError::Unavailable(_)));
    assert_eq!(session.inventory().len(), before);
}

#[test]
fn interaction_errors_do_not_change_state() {
    let (_gateway, mut session, aisle, product) = planned(3);
    assert!(matches!(
        session.place(PlaceTarget {
            aisle_id: aisle.clone(),
            unit_index: 0,
            side: Default::default(),
            shelf_level: ShelfLevel::FIRST,
            local_x: 0.0,
            local_z: 0.0,
        }),
        Err(SessionError::NotHolding)
    ));
    assert!(matches!(
        session.grab("missing"),
        Err(SessionError::UnknownBox(_))
    ));
    session.grab(&box_id(&aisle, &product, 0, 0)).unwrap();
    assert!(matches!(
        session.grab(&box_id(&aisle, &product, 0, 1)),
        Err(SessionError::NotIdle)
    ));
    assert_eq!(session.scene().boxes.len(), 2);
}
