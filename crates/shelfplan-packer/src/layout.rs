//! Rack geometry: usable shelf area, unit count and the mapping from
//! unit-local shelf coordinates to store space.
//!
//! Each aisle holds two parallel racks per unit, one along its min-x edge
//! ([`RackSide::Left`]) and one along its max-x edge ([`RackSide::Right`]),
//! facing each other across the walkway. Units repeat along the aisle's
//! length (`z`) and are centred on it.
//!
//! Unit-local frame: origin at the centre of one rack of one unit, `x`
//! along the shelf front (store `+z`), `z` from the front (walkway side,
//! negative) to the back.

use shelfplan_ir::{usable_height, Aisle, RackSide, SHELF_BASE_HEIGHT};
use shelfplan_math::{BoxDims, Point3, ShelfLevel, Tolerance};

use crate::RackSpec;

/// Usable shelf rectangle in unit-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShelfArea {
    /// Left edge of the first box in a row.
    pub start_x: f64,
    /// No box may extend past this along `x`.
    pub row_end: f64,
    /// Front edge of the first row.
    pub start_z: f64,
    /// No box may extend past this along `z`.
    pub depth_end: f64,
}

impl ShelfArea {
    /// Usable width along the shelf front.
    pub fn width(&self) -> f64 {
        self.row_end - self.start_x
    }

    /// Usable depth.
    pub fn depth(&self) -> f64 {
        self.depth_end - self.start_z
    }

    /// True if a box with this footprint fits on an empty shelf.
    pub fn fits(&self, width: f64, depth: f64) -> bool {
        let tol = Tolerance::DEFAULT;
        tol.le(width, self.width()) && tol.le(depth, self.depth())
    }
}

/// Rack geometry derived from a [`RackSpec`].
#[derive(Debug, Clone, Copy)]
pub struct RackLayout<'a> {
    spec: &'a RackSpec,
}

impl<'a> RackLayout<'a> {
    /// Layout for `spec`.
    pub fn new(spec: &'a RackSpec) -> Self {
        Self { spec }
    }

    /// Usable area of every shelf (identical across units, levels and sides).
    pub fn shelf_area(&self) -> ShelfArea {
        let half_w = self.spec.unit_width / 2.0;
        let half_d = self.spec.rack_depth / 2.0;
        ShelfArea {
            start_x: -half_w + self.spec.post_inset,
            row_end: half_w - self.spec.post_inset,
            start_z: -half_d + self.spec.post_inset,
            depth_end: half_d - self.spec.post_inset,
        }
    }

    /// `max(1, floor(length / unit_width))`.
    pub fn num_units(&self, aisle: &Aisle) -> u32 {
        let units = (aisle.length / self.spec.unit_width).floor();
        if units.is_finite() && units >= 1.0 {
            units as u32
        } else {
            1
        }
    }

    /// Height of the top surface of `level` above the floor.
    pub fn shelf_y(&self, aisle: &Aisle, level: ShelfLevel) -> f64 {
        let shelves = aisle.shelves.max(1) as f64;
        let pitch = usable_height(aisle.height) / shelves;
        SHELF_BASE_HEIGHT + (level.get() - 1) as f64 * pitch
    }

    /// Store-space centre of the rack `side` of unit `unit`, at floor level.
    pub fn rack_origin(&self, aisle: &Aisle, unit: u32, side: RackSide) -> Point3 {
        let units = self.num_units(aisle) as f64;
        let span_start = aisle.z + (aisle.length - units * self.spec.unit_width) / 2.0;
        let z = span_start + (unit as f64 + 0.5) * self.spec.unit_width;
        let half_d = self.spec.rack_depth / 2.0;
        let x = match side {
            RackSide::Left => aisle.x + half_d,
            RackSide::Right => aisle.x + aisle.width - half_d,
        };
        Point3::new(x, 0.0, z)
    }

    /// Store-space centre of a box of size `dims` whose shelf footprint is
    /// centred on `(local_x, local_z)`.
    #[allow(clippy::too_many_arguments)]
    pub fn world_center(
        &self,
        aisle: &Aisle,
        unit: u32,
        side: RackSide,
        level: ShelfLevel,
        local_x: f64,
        local_z: f64,
        dims: BoxDims,
    ) -> Point3 {
        let origin = self.rack_origin(aisle, unit, side);
        // front of the left rack faces +x, front of the right rack faces -x
        let x = match side {
            RackSide::Left => origin.x - local_z,
            RackSide::Right => origin.x + local_z,
        };
        let y = self.shelf_y(aisle, level) + dims.height / 2.0;
        Point3::new(x, y, origin.z + local_x)
    }
}
