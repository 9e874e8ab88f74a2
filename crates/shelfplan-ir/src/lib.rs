//! Documents for the shelfplan store planner.
//!
//! This crate defines the records that flow between the aisle editor, the
//! shelf packer, the interaction layer and the persistence gateway: stores,
//! aisles with their per-shelf product allocations, inventory products and
//! placed-box overrides. It also defines [`BoxPlacement`], the derived
//! (never persisted) output of packing.
//!
//! The documents are purely declarative. Packing and placement are handled
//! by `shelfplan-packer`; persistence by `shelfplan-store`.

use serde::{Deserialize, Serialize};
use shelfplan_math::{BoxDims, Footprint, Rect2, ShelfLevel};

/// Identifier of a store document.
pub type StoreId = String;
/// Identifier of an aisle document.
pub type AisleId = String;
/// Identifier of an inventory product document.
pub type ProductId = String;
/// Identifier of a placed-box override document.
pub type OverrideId = String;
/// Identifier of a user.
pub type UserId = String;
/// Deterministic identity of one packed box. See `shelfplan_packer::BoxKey`.
pub type BoxId = String;

/// Shelves never start below this height (metres).
pub const SHELF_BASE_HEIGHT: f64 = 0.15;
/// Racks taller than this contribute no extra shelves (metres).
pub const MAX_SHELVED_HEIGHT: f64 = 2.1;
/// Vertical distance between shelves in the default shelf count (metres).
pub const SHELF_PITCH: f64 = 0.35;
/// Shelf count range accepted on an aisle.
pub const MIN_SHELVES: u32 = 1;
/// Shelf count range accepted on an aisle.
pub const MAX_SHELVES: u32 = 10;
/// Height given to aisles created in the editor (metres).
pub const DEFAULT_AISLE_HEIGHT: f64 = 2.0;

/// Usable rack height: `min(height, 2.1) - 0.15`, never negative. Zero for
/// non-finite heights.
pub fn usable_height(height: f64) -> f64 {
    if !height.is_finite() {
        return 0.0;
    }
    (height.min(MAX_SHELVED_HEIGHT) - SHELF_BASE_HEIGHT).max(0.0)
}

/// Default shelf count for a rack of the given height, clamped to
/// `[MIN_SHELVES, MAX_SHELVES]`.
pub fn shelves_for_height(height: f64) -> u32 {
    let usable = usable_height(height);
    let count = (usable / SHELF_PITCH).floor();
    if count.is_finite() && count > 0.0 {
        (count as u32).clamp(MIN_SHELVES, MAX_SHELVES)
    } else {
        MIN_SHELVES
    }
}

/// A store floor plan owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    /// Document id.
    pub id: StoreId,
    /// Owning user.
    pub owner_id: UserId,
    /// Display name.
    pub name: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Floor colour as a CSS-style string.
    pub color: String,
    /// Floor extent along x (metres).
    pub width: f64,
    /// Floor extent along z (metres).
    pub depth: f64,
    /// Server-assigned creation stamp.
    #[serde(default)]
    pub created_at: u64,
    /// Server-assigned update stamp, bumped by any aisle write.
    #[serde(default)]
    pub updated_at: u64,
}

/// Fields supplied when creating a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStore {
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Floor colour.
    pub color: String,
    /// Floor extent along x (metres).
    pub width: f64,
    /// Floor extent along z (metres).
    pub depth: f64,
}

/// Boxes of one product assigned to one shelf level of an aisle.
///
/// `quantity_boxes` is a soft reservation against the product's global
/// stock, not a coordinate. The position of the entry inside
/// [`Aisle::products`] decides packing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AisleProduct {
    /// Allocation id.
    pub id: String,
    /// Referenced inventory product (may dangle).
    pub product_id: ProductId,
    /// Owning aisle.
    pub aisle_id: AisleId,
    /// Requested number of boxes.
    pub quantity_boxes: u32,
    /// Target shelf.
    pub shelf_level: ShelfLevel,
    /// Display ordinal kept for the edit panel.
    #[serde(default)]
    pub position: u32,
}

/// A rectangular rack footprint on the store plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aisle {
    /// Document id.
    pub id: AisleId,
    /// Parent store.
    pub store_id: StoreId,
    /// Display name, e.g. `"Aisle 3"`.
    pub name: String,
    /// Minimum x on the plan (metres).
    pub x: f64,
    /// Minimum z on the plan (metres).
    pub z: f64,
    /// Extent along x (metres).
    pub width: f64,
    /// Extent along z (metres); rack units repeat along this axis.
    pub length: f64,
    /// Rack height (metres).
    pub height: f64,
    /// Shelf count in `[1, 10]`.
    pub shelves: u32,
    /// Ordered shelf allocations. Order is packing order.
    #[serde(default)]
    pub products: Vec<AisleProduct>,
}

impl Aisle {
    /// Floor-plan rectangle of this aisle.
    pub fn rect(&self) -> Rect2 {
        Rect2::new(self.x, self.z, self.width, self.length)
    }

    /// Move/resize this aisle to `rect`.
    pub fn set_rect(&mut self, rect: Rect2) {
        self.x = rect.x;
        self.z = rect.z;
        self.width = rect.width;
        self.length = rect.length;
    }

    /// Shelf count derived from the current height.
    pub fn default_shelves(&self) -> u32 {
        shelves_for_height(self.height)
    }

    /// Set the height and re-derive the shelf count from it.
    pub fn set_height(&mut self, height: f64) {
        self.height = height;
        self.shelves = shelves_for_height(height);
    }

    /// Set the shelf count independently of the height (clamped).
    pub fn set_shelves(&mut self, shelves: u32) {
        self.shelves = shelves.clamp(MIN_SHELVES, MAX_SHELVES);
    }

    /// Allocations on one shelf level, in packing order.
    pub fn products_on(&self, level: ShelfLevel) -> impl Iterator<Item = &AisleProduct> {
        self.products.iter().filter(move |p| p.shelf_level == level)
    }
}

/// Fields supplied when creating an aisle (everything but id and store).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAisle {
    /// Display name.
    pub name: String,
    /// Minimum x (metres).
    pub x: f64,
    /// Minimum z (metres).
    pub z: f64,
    /// Extent along x (metres).
    pub width: f64,
    /// Extent along z (metres).
    pub length: f64,
    /// Rack height (metres).
    pub height: f64,
    /// Shelf count.
    pub shelves: u32,
    /// Initial allocations.
    #[serde(default)]
    pub products: Vec<AisleProduct>,
}

impl NewAisle {
    /// A fresh aisle covering `rect` with the default height and the shelf
    /// count derived from it.
    pub fn from_rect(name: impl Into<String>, rect: Rect2) -> Self {
        Self {
            name: name.into(),
            x: rect.x,
            z: rect.z,
            width: rect.width,
            length: rect.length,
            height: DEFAULT_AISLE_HEIGHT,
            shelves: shelves_for_height(DEFAULT_AISLE_HEIGHT),
            products: Vec::new(),
        }
    }

    /// Attach ids, producing the stored form.
    pub fn into_aisle(self, id: AisleId, store_id: StoreId) -> Aisle {
        Aisle {
            id,
            store_id,
            name: self.name,
            x: self.x,
            z: self.z,
            width: self.width,
            length: self.length,
            height: self.height,
            shelves: self.shelves,
            products: self.products,
        }
    }

    /// Floor-plan rectangle.
    pub fn rect(&self) -> Rect2 {
        Rect2::new(self.x, self.z, self.width, self.length)
    }
}

/// A product kept in inventory, packed as identical boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryProduct {
    /// Document id.
    pub id: ProductId,
    /// Owning user.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Stock keeping unit.
    #[serde(default)]
    pub sku: String,
    /// Free-form category.
    #[serde(default)]
    pub category: String,
    /// Outer box dimensions; zero entries fall back to packer defaults.
    #[serde(default)]
    pub box_dimensions: BoxDims,
    /// Items in one box.
    #[serde(default)]
    pub items_per_box: u32,
    /// Colour of the shelf label and box tint.
    #[serde(default)]
    pub label_color: String,
    /// Unit price.
    #[serde(default)]
    pub price_per_item: f64,
    /// Authoritative global stock, in boxes.
    #[serde(default)]
    pub total_boxes_stock: u32,
}

/// Which of the two parallel racks in a rack unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RackSide {
    /// The stocked rack; packing fills only this side.
    #[default]
    Left,
    /// The display rack; only manual placements go here.
    Right,
}

impl RackSide {
    /// Both sides, left first.
    pub const BOTH: [RackSide; 2] = [RackSide::Left, RackSide::Right];
}

/// Computed position of one box on one shelf of one rack unit.
///
/// `local_x` / `local_z` are the box centre in unit-local coordinates: the
/// origin is the centre of the rack, `x` runs along the shelf front and `z`
/// into the shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxPlacement {
    /// Stable identity (see the packer's key contract).
    pub box_id: BoxId,
    /// Aisle the box sits in.
    pub aisle_id: AisleId,
    /// Rack unit along the aisle, from 0.
    pub unit_index: u32,
    /// Rack side.
    #[serde(default)]
    pub side: RackSide,
    /// Shelf tier.
    pub shelf_level: ShelfLevel,
    /// Centre along the shelf front.
    pub local_x: f64,
    /// Centre into the shelf.
    pub local_z: f64,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
    /// Box depth.
    pub depth: f64,
    /// Label colour copied from the product.
    pub label_color: String,
    /// Product in the box.
    pub product_id: ProductId,
}

impl BoxPlacement {
    /// Centred shelf footprint.
    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.local_x, self.local_z, self.width, self.depth)
    }

    /// Box dimensions.
    pub fn dims(&self) -> BoxDims {
        BoxDims::new(self.width, self.height, self.depth)
    }

    /// True if this box sits on exactly `(unit, side, level)`.
    pub fn is_on(&self, unit: u32, side: RackSide, level: ShelfLevel) -> bool {
        self.unit_index == unit && self.side == side && self.shelf_level == level
    }
}

/// A box manually moved away from its packed position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedBoxOverride {
    /// Document id.
    pub id: OverrideId,
    /// Identity of the packed box this override replaces.
    pub box_id: BoxId,
    /// Product in the box.
    pub product_id: ProductId,
    /// Aisle the box now sits in.
    pub aisle_id: AisleId,
    /// Rack unit it now sits in.
    pub unit_index: u32,
    /// Rack side it now sits on.
    #[serde(default)]
    pub side: RackSide,
    /// Shelf it now sits on.
    pub shelf_level: ShelfLevel,
    /// Centre along the shelf front.
    pub local_x: f64,
    /// Centre into the shelf.
    pub local_z: f64,
    /// Box dimensions carried from the source.
    pub dimensions: BoxDims,
    /// Label colour carried from the source.
    pub label_color: String,
    /// Aisle the box was packed into originally.
    pub source_aisle_id: AisleId,
    /// Shelf the box was packed onto originally.
    pub source_shelf_level: ShelfLevel,
    /// User who moved it.
    pub user_id: UserId,
    /// Store the override belongs to.
    pub store_id: StoreId,
}

impl PlacedBoxOverride {
    /// The override rendered as a box placement.
    pub fn to_placement(&self) -> BoxPlacement {
        BoxPlacement {
            box_id: self.box_id.clone(),
            aisle_id: self.aisle_id.clone(),
            unit_index: self.unit_index,
            side: self.side,
            shelf_level: self.shelf_level,
            local_x: self.local_x,
            local_z: self.local_z,
            width: self.dimensions.width,
            height: self.dimensions.height,
            depth: self.dimensions.depth,
            label_color: self.label_color.clone(),
            product_id: self.product_id.clone(),
        }
    }

    /// Centred shelf footprint.
    pub fn footprint(&self) -> Footprint {
        Footprint::new(
            self.local_x,
            self.local_z,
            self.dimensions.width,
            self.dimensions.depth,
        )
    }
}

/// A self-contained store document: the plan, its inventory and its
/// overrides. This is the CLI input format and the export format of a
/// planning session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    /// Format version string (e.g. "0.1").
    pub version: String,
    /// The store.
    pub store: Store,
    /// Aisles of the store.
    #[serde(default)]
    pub aisles: Vec<Aisle>,
    /// Inventory visible to the store owner.
    #[serde(default)]
    pub inventory: Vec<InventoryProduct>,
    /// Manual placements.
    #[serde(default)]
    pub overrides: Vec<PlacedBoxOverride>,
}

impl StoreDocument {
    /// Current format version.
    pub const VERSION: &'static str = "0.1";

    /// A document holding just `store`.
    pub fn new(store: Store) -> Self {
        Self {
            version: Self::VERSION.to_string(),
            store,
            aisles: Vec::new(),
            inventory: Vec::new(),
            overrides: Vec::new(),
        }
    }

    /// Look up an aisle by id.
    pub fn aisle(&self, id: &str) -> Option<&Aisle> {
        self.aisles.iter().find(|a| a.id == id)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store {
            id: "s1".to_string(),
            owner_id: "u1".to_string(),
            name: "Corner shop".to_string(),
            description: None,
            color: "#eeeeee".to_string(),
            width: 30.0,
            depth: 20.0,
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn test_shelf_formula() {
        // (2.0 - 0.15) / 0.35 = 5.28
        assert_eq!(shelves_for_height(2.0), 5);
        // capped at 2.1: (2.1 - 0.15) / 0.35 = 5.57
        assert_eq!(shelves_for_height(4.0), 5);
        assert_eq!(shelves_for_height(0.3), 1);
        assert_eq!(shelves_for_height(0.0), 1);
        assert_eq!(shelves_for_height(f64::NAN), 1);
        assert_eq!(shelves_for_height(f64::INFINITY), 1);
        assert_eq!(usable_height(f64::NAN), 0.0);
    }

    #[test]
    fn test_new_aisle_defaults() {
        let aisle = NewAisle::from_rect("Aisle 1", Rect2::new(2.0, 3.0, 2.0, 6.0))
            .into_aisle("a1".to_string(), "s1".to_string());
        assert_eq!(aisle.rect(), Rect2::new(2.0, 3.0, 2.0, 6.0));
        assert_eq!(aisle.height, DEFAULT_AISLE_HEIGHT);
        assert_eq!(aisle.shelves, 5);
        assert!(aisle.products.is_empty());
    }

    #[test]
    fn test_shelves_editable_independently() {
        let mut aisle = NewAisle::from_rect("A", Rect2::new(0.0, 0.0, 2.0, 3.0))
            .into_aisle("a".to_string(), "s".to_string());
        aisle.set_shelves(12);
        assert_eq!(aisle.shelves, MAX_SHELVES);
        aisle.set_shelves(0);
        assert_eq!(aisle.shelves, MIN_SHELVES);
        aisle.set_height(1.0);
        assert_eq!(aisle.shelves, 2);
    }

    #[test]
    fn test_override_to_placement() {
        let ov = PlacedBoxOverride {
            id: "o1".to_string(),
            box_id: "a1:p1:L1:U0:0".to_string(),
            product_id: "p1".to_string(),
            aisle_id: "a2".to_string(),
            unit_index: 1,
            side: RackSide::Right,
            shelf_level: ShelfLevel::new(2).unwrap(),
            local_x: 0.5,
            local_z: -0.1,
            dimensions: BoxDims::new(0.3, 0.2, 0.25),
            label_color: "#ff0000".to_string(),
            source_aisle_id: "a1".to_string(),
            source_shelf_level: ShelfLevel::FIRST,
            user_id: "u1".to_string(),
            store_id: "s1".to_string(),
        };
        let placement = ov.to_placement();
        assert_eq!(placement.box_id, ov.box_id);
        assert!(placement.is_on(1, RackSide::Right, ShelfLevel::new(2).unwrap()));
        assert_eq!(placement.footprint(), ov.footprint());
    }

    #[test]
    fn test_document_json_camel_case() {
        let mut doc = StoreDocument::new(store());
        doc.aisles.push(
            NewAisle::from_rect("Aisle 1", Rect2::new(0.0, 0.0, 2.0, 6.0))
                .into_aisle("a1".to_string(), "s1".to_string()),
        );
        let json = doc.to_json().expect("serialize");
        assert!(json.contains("\"storeId\""));
        assert!(json.contains("\"ownerId\""));
        let restored = StoreDocument::from_json(&json).expect("deserialize");
        assert_eq!(doc, restored);
        assert!(restored.aisle("a1").is_some());
    }

    #[test]
    fn test_override_side_defaults_left() {
        let json = r##"{
            "id": "o", "boxId": "b", "productId": "p", "aisleId": "a",
            "unitIndex": 0, "shelfLevel": 1, "localX": 0.0, "localZ": 0.0,
            "dimensions": {"width": 0.2, "height": 0.2, "depth": 0.2},
            "labelColor": "#000", "sourceAisleId": "a", "sourceShelfLevel": 1,
            "userId": "u", "storeId": "s"
        }"##;
        let ov: PlacedBoxOverride = serde_json::from_str(json).unwrap();
        assert_eq!(ov.side, RackSide::Left);
    }
}
