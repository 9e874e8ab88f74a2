//! View-ray slot targeting.
//!
//! While a box is held, the slot the user is looking at is the nearest one
//! whose store-space volume the view ray enters. At most one slot is
//! targeted at a time.

use nalgebra::Unit;
use shelfplan_ir::Aisle;
use shelfplan_math::{BoxDims, Point3, Vec3};

use crate::{RackLayout, Slot};

/// Below this a look-direction component counts as parallel to the faces
/// it would cross.
const PARALLEL_EPS: f64 = 1e-12;

/// The store-space room a box would fill in a slot. Racks are axis-aligned
/// in store space, so two corners describe it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotVolume {
    /// Corner nearest the store origin, at the shelf surface.
    pub min: Point3,
    /// Opposite corner.
    pub max: Point3,
}

impl SlotVolume {
    /// Volume spanning two corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Volume centred on `center` with full extents `size`.
    pub fn around(center: Point3, size: Vec3) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// How far along `ray` the volume is entered, or `None` if the user is
    /// not looking at it. Zero when the eye is already inside.
    ///
    /// Each axis narrows the range of distances inside the volume; the ray
    /// hits when some distance in front of the eye survives all three.
    pub fn entry_distance(&self, ray: &ViewRay) -> Option<f64> {
        let mut near = 0.0_f64;
        let mut far = f64::INFINITY;
        for axis in 0..3 {
            let (lo, hi) = (self.min[axis], self.max[axis]);
            let eye = ray.eye[axis];
            let step = ray.look[axis];
            if step.abs() < PARALLEL_EPS {
                if eye < lo || eye > hi {
                    return None;
                }
                continue;
            }
            let enter = (lo - eye) / step;
            let leave = (hi - eye) / step;
            near = near.max(enter.min(leave));
            far = far.min(enter.max(leave));
            if near > far {
                return None;
            }
        }
        Some(near)
    }
}

/// Where the user stands and which way they look, in store space.
#[derive(Debug, Clone, Copy)]
pub struct ViewRay {
    /// Eye position.
    pub eye: Point3,
    /// Unit look direction.
    pub look: Unit<Vec3>,
}

impl ViewRay {
    /// `None` if `look` has no length.
    pub fn new(eye: Point3, look: Vec3) -> Option<Self> {
        let look = Unit::try_new(look, PARALLEL_EPS)?;
        Some(Self { eye, look })
    }

    /// The point `distance` metres along the look direction.
    pub fn point_at(&self, distance: f64) -> Point3 {
        self.eye + self.look.as_ref() * distance
    }
}

impl RackLayout<'_> {
    /// Store-space volume a box `height` tall would occupy in `slot`.
    pub fn slot_volume(&self, aisle: &Aisle, slot: &Slot, height: f64) -> SlotVolume {
        let dims = BoxDims::new(slot.width, height, slot.depth);
        let center = self.world_center(
            aisle,
            slot.unit_index,
            slot.side,
            slot.shelf_level,
            slot.local_x,
            slot.local_z,
            dims,
        );
        // local z maps onto store x, local x onto store z
        SlotVolume::around(center, Vec3::new(slot.depth, height, slot.width))
    }
}

/// Index of the nearest volume the user is looking at, if any.
///
/// Ties keep the earlier index, so the result is stable for a fixed slot
/// order.
pub fn target_slot<I>(ray: &ViewRay, volumes: I) -> Option<usize>
where
    I: IntoIterator<Item = SlotVolume>,
{
    let mut best: Option<(usize, f64)> = None;
    for (index, volume) in volumes.into_iter().enumerate() {
        let Some(distance) = volume.entry_distance(ray) else {
            continue;
        };
        if best.map_or(true, |(_, nearest)| distance < nearest) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}
