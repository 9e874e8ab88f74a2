//! Grid search for free shelf positions.
//!
//! A held box can be dropped on any grid cell whose footprint is clear of
//! every box already on that exact unit, side and shelf. The grid uses the
//! held box's footprint plus the packing gap as its pitch and starts at the
//! same origin as the packer, so a box dropped on an empty shelf lands where
//! the packer would have put it. Both racks are searched.

use shelfplan_ir::{Aisle, BoxPlacement, RackSide, MAX_SHELVES};
use shelfplan_math::{Footprint, ShelfLevel, Tolerance};

use crate::{RackLayout, RackSpec};

/// A vacant grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    /// Rack unit.
    pub unit_index: u32,
    /// Rack side.
    pub side: RackSide,
    /// Shelf tier.
    pub shelf_level: ShelfLevel,
    /// Centre along the shelf front.
    pub local_x: f64,
    /// Centre into the shelf.
    pub local_z: f64,
    /// Cell width (the held box's width).
    pub width: f64,
    /// Cell depth (the held box's depth).
    pub depth: f64,
}

impl Slot {
    /// Centred footprint of the cell.
    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.local_x, self.local_z, self.width, self.depth)
    }
}

/// Vacant slots on both racks of `unit` at `level` for a box of
/// `width × depth`, in row-major order (left rack first).
pub fn find_vacant_slots(
    spec: &RackSpec,
    unit: u32,
    level: ShelfLevel,
    occupied: &[BoxPlacement],
    width: f64,
    depth: f64,
) -> Vec<Slot> {
    let area = RackLayout::new(spec).shelf_area();
    if !(width > 0.0 && depth > 0.0) || !area.fits(width, depth) {
        return Vec::new();
    }
    let tol = Tolerance::DEFAULT;
    let mut slots = Vec::new();

    for side in RackSide::BOTH {
        let blockers: Vec<Footprint> = occupied
            .iter()
            .filter(|b| b.is_on(unit, side, level))
            .map(BoxPlacement::footprint)
            .collect();

        let mut row = 0u32;
        loop {
            let z = area.start_z + row as f64 * (depth + spec.gap);
            if !tol.le(z + depth, area.depth_end) {
                break;
            }
            let mut col = 0u32;
            loop {
                let x = area.start_x + col as f64 * (width + spec.gap);
                if !tol.le(x + width, area.row_end) {
                    break;
                }
                let candidate = Slot {
                    unit_index: unit,
                    side,
                    shelf_level: level,
                    local_x: x + width / 2.0,
                    local_z: z + depth / 2.0,
                    width,
                    depth,
                };
                let cell = candidate.footprint();
                if !blockers.iter().any(|b| b.overlaps(&cell)) {
                    slots.push(candidate);
                }
                col += 1;
            }
            row += 1;
        }
    }

    slots
}

/// Vacant slots over every unit and shelf of `aisle`.
///
/// `occupied` may hold boxes of other aisles; only those in `aisle` count.
/// At most [`MAX_SHELVES`] levels are searched.
pub fn find_aisle_vacancies(
    spec: &RackSpec,
    aisle: &Aisle,
    occupied: &[BoxPlacement],
    width: f64,
    depth: f64,
) -> Vec<Slot> {
    let here: Vec<BoxPlacement> = occupied
        .iter()
        .filter(|b| b.aisle_id == aisle.id)
        .cloned()
        .collect();
    let units = RackLayout::new(spec).num_units(aisle);
    let mut slots = Vec::new();
    for unit in 0..units {
        for level in ShelfLevel::all(aisle.shelves.min(MAX_SHELVES)) {
            slots.extend(find_vacant_slots(spec, unit, level, &here, width, depth));
        }
    }
    slots
}
