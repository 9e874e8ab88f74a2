//! First-come-first-packed shelf filling.
//!
//! Each shelf level keeps one cursor for the whole aisle, and at most
//! [`MAX_SHELVES`] levels are packed. Allocations are
//! visited in their stored order; boxes fill a row left to right, rows
//! front to back, then spill into the next rack unit. When the last unit is
//! full the level is exhausted and every further box for it is dropped.
//! Only the left rack of each unit is stocked.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use shelfplan_ir::{
    Aisle, AisleId, BoxPlacement, InventoryProduct, ProductId, RackSide, MAX_SHELVES,
};
use shelfplan_math::{ShelfLevel, Tolerance};
use tracing::debug;

use crate::{BoxKey, RackLayout, RackSpec, ShelfArea};

/// Lookup of inventory products by id. A miss is a dangling reference and
/// is skipped by the packer.
pub trait ProductCatalog {
    /// The product with `id`, if it exists.
    fn product(&self, id: &str) -> Option<&InventoryProduct>;
}

impl<S: BuildHasher> ProductCatalog for HashMap<ProductId, InventoryProduct, S> {
    fn product(&self, id: &str) -> Option<&InventoryProduct> {
        self.get(id)
    }
}

impl ProductCatalog for BTreeMap<ProductId, InventoryProduct> {
    fn product(&self, id: &str) -> Option<&InventoryProduct> {
        self.get(id)
    }
}

impl ProductCatalog for [InventoryProduct] {
    fn product(&self, id: &str) -> Option<&InventoryProduct> {
        self.iter().find(|p| p.id == id)
    }
}

impl ProductCatalog for Vec<InventoryProduct> {
    fn product(&self, id: &str) -> Option<&InventoryProduct> {
        self.as_slice().product(id)
    }
}

/// The electronic shelf label for one resolved allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ShelfLabel {
    /// Allocation this label belongs to.
    pub allocation_id: String,
    /// Aisle id.
    pub aisle_id: AisleId,
    /// Product id.
    pub product_id: ProductId,
    /// Product display name.
    pub product_name: String,
    /// Shelf the allocation targets.
    pub shelf_level: ShelfLevel,
    /// Requested box count; this is the "×N" badge, not the rendered count.
    pub requested: u32,
    /// Boxes that actually fit.
    pub placed: u32,
    /// Unit and centre x of the first placed box, for anchoring the label.
    pub anchor: Option<(u32, f64)>,
}

impl ShelfLabel {
    /// Boxes requested but dropped for lack of shelf space.
    pub fn overflow(&self) -> u32 {
        self.requested.saturating_sub(self.placed)
    }
}

/// Output of packing one aisle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackedAisle {
    /// Every placed box, in packing order.
    pub placements: Vec<BoxPlacement>,
    /// One label per allocation that resolved to a product.
    pub labels: Vec<ShelfLabel>,
}

#[derive(Debug, Clone, Copy)]
struct ShelfCursor {
    unit: u32,
    x: f64,
    z: f64,
    row_depth: f64,
    exhausted: bool,
}

impl ShelfCursor {
    fn start(area: &ShelfArea) -> Self {
        Self {
            unit: 0,
            x: area.start_x,
            z: area.start_z,
            row_depth: 0.0,
            exhausted: false,
        }
    }

    /// Move the cursor to where a `width × depth` box can go, or mark the
    /// level exhausted. Returns false once exhausted.
    fn advance_to_fit(
        &mut self,
        area: &ShelfArea,
        width: f64,
        depth: f64,
        gap: f64,
        units: u32,
    ) -> bool {
        let tol = Tolerance::DEFAULT;
        if self.exhausted {
            return false;
        }
        if !tol.le(self.x + width, area.row_end) {
            self.x = area.start_x;
            self.z += self.row_depth + gap;
            self.row_depth = 0.0;
        }
        if !tol.le(self.z + depth, area.depth_end) {
            self.unit += 1;
            self.x = area.start_x;
            self.z = area.start_z;
            self.row_depth = 0.0;
            if self.unit >= units {
                self.exhausted = true;
                return false;
            }
        }
        true
    }
}

/// Pack one aisle. See [`pack_aisle`] for labels.
pub fn pack<C>(aisle: &Aisle, catalog: &C, spec: &RackSpec) -> Vec<BoxPlacement>
where
    C: ProductCatalog + ?Sized,
{
    pack_aisle(aisle, catalog, spec).placements
}

/// Pack one aisle and report per-allocation labels.
///
/// Deterministic for fixed inputs. Rows advance by the deepest box already
/// in the row, so products of mixed depth sharing a shelf never overlap.
pub fn pack_aisle<C>(aisle: &Aisle, catalog: &C, spec: &RackSpec) -> PackedAisle
where
    C: ProductCatalog + ?Sized,
{
    let layout = RackLayout::new(spec);
    let area = layout.shelf_area();
    let units = layout.num_units(aisle);
    let shelves = aisle.shelves.min(MAX_SHELVES) as usize;
    let mut cursors = vec![ShelfCursor::start(&area); shelves];
    let mut sequences: BTreeMap<(&str, ShelfLevel), u32> = BTreeMap::new();
    let mut packed = PackedAisle::default();

    for allocation in &aisle.products {
        let level = allocation.shelf_level;
        let Some(cursor) = cursors.get_mut(level.index()) else {
            debug!(
                aisle = %aisle.id,
                allocation = %allocation.id,
                level = level.get(),
                shelves = aisle.shelves,
                "allocation targets a shelf the aisle does not have"
            );
            continue;
        };
        let Some(product) = catalog.product(&allocation.product_id) else {
            debug!(
                aisle = %aisle.id,
                product = %allocation.product_id,
                "skipping allocation with dangling product"
            );
            continue;
        };

        let dims = product.box_dimensions.or_fallback(spec.fallback_box);
        let mut label = ShelfLabel {
            allocation_id: allocation.id.clone(),
            aisle_id: aisle.id.clone(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            shelf_level: level,
            requested: allocation.quantity_boxes,
            placed: 0,
            anchor: None,
        };

        if !area.fits(dims.width, dims.depth) {
            debug!(
                product = %product.id,
                width = dims.width,
                depth = dims.depth,
                "box larger than the shelf, nothing placed"
            );
            packed.labels.push(label);
            continue;
        }

        for _ in 0..allocation.quantity_boxes {
            if !cursor.advance_to_fit(&area, dims.width, dims.depth, spec.gap, units) {
                break;
            }
            let local_x = cursor.x + dims.width / 2.0;
            let sequence = sequences.entry((product.id.as_str(), level)).or_insert(0);
            let key = BoxKey {
                aisle_id: &aisle.id,
                product_id: &product.id,
                shelf_level: level,
                unit_index: cursor.unit,
                sequence: *sequence,
            };
            packed.placements.push(BoxPlacement {
                box_id: key.box_id(),
                aisle_id: aisle.id.clone(),
                unit_index: cursor.unit,
                side: RackSide::Left,
                shelf_level: level,
                local_x,
                local_z: cursor.z + dims.depth / 2.0,
                width: dims.width,
                height: dims.height,
                depth: dims.depth,
                label_color: product.label_color.clone(),
                product_id: product.id.clone(),
            });
            label.anchor.get_or_insert((cursor.unit, local_x));
            label.placed += 1;
            *sequence += 1;
            cursor.x += dims.width + spec.gap;
            cursor.row_depth = cursor.row_depth.max(dims.depth);
        }

        if label.overflow() > 0 {
            debug!(
                aisle = %aisle.id,
                product = %product.id,
                level = level.get(),
                requested = label.requested,
                placed = label.placed,
                "shelf capacity exceeded"
            );
        }
        packed.labels.push(label);
    }

    packed
}
