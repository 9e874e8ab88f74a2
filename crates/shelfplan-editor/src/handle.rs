//! Resize handles on an aisle rectangle.
//!
//! North is the min-`z` edge (top of the screen), west the min-`x` edge.

use shelfplan_math::{Point2, Rect2};

/// One of the eight grab points of a selected aisle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    /// Min-x, min-z corner.
    NorthWest,
    /// Max-x, min-z corner.
    NorthEast,
    /// Min-x, max-z corner.
    SouthWest,
    /// Max-x, max-z corner.
    SouthEast,
    /// Min-z edge.
    North,
    /// Max-z edge.
    South,
    /// Max-x edge.
    East,
    /// Min-x edge.
    West,
}

impl ResizeHandle {
    const CORNERS: [ResizeHandle; 4] = [
        ResizeHandle::NorthWest,
        ResizeHandle::NorthEast,
        ResizeHandle::SouthWest,
        ResizeHandle::SouthEast,
    ];
    const EDGES: [ResizeHandle; 4] = [
        ResizeHandle::North,
        ResizeHandle::South,
        ResizeHandle::East,
        ResizeHandle::West,
    ];

    fn moves_west(self) -> bool {
        matches!(
            self,
            ResizeHandle::West | ResizeHandle::NorthWest | ResizeHandle::SouthWest
        )
    }

    fn moves_east(self) -> bool {
        matches!(
            self,
            ResizeHandle::East | ResizeHandle::NorthEast | ResizeHandle::SouthEast
        )
    }

    fn moves_north(self) -> bool {
        matches!(
            self,
            ResizeHandle::North | ResizeHandle::NorthWest | ResizeHandle::NorthEast
        )
    }

    fn moves_south(self) -> bool {
        matches!(
            self,
            ResizeHandle::South | ResizeHandle::SouthWest | ResizeHandle::SouthEast
        )
    }

    fn is_hit(self, rect: &Rect2, p: Point2, tol: f64) -> bool {
        let near = |a: f64, b: f64| (a - b).abs() <= tol;
        let within_x = p.x >= rect.x && p.x <= rect.max_x();
        let within_z = p.y >= rect.z && p.y <= rect.max_z();
        match self {
            ResizeHandle::NorthWest => near(p.x, rect.x) && near(p.y, rect.z),
            ResizeHandle::NorthEast => near(p.x, rect.max_x()) && near(p.y, rect.z),
            ResizeHandle::SouthWest => near(p.x, rect.x) && near(p.y, rect.max_z()),
            ResizeHandle::SouthEast => near(p.x, rect.max_x()) && near(p.y, rect.max_z()),
            ResizeHandle::North => near(p.y, rect.z) && within_x,
            ResizeHandle::South => near(p.y, rect.max_z()) && within_x,
            ResizeHandle::East => near(p.x, rect.max_x()) && within_z,
            ResizeHandle::West => near(p.x, rect.x) && within_z,
        }
    }
}

/// The handle of `rect` under world point `p`, if any. Corners win over
/// edges when both are within `tolerance`.
pub fn hit_test_resize_handle(p: Point2, rect: &Rect2, tolerance: f64) -> Option<ResizeHandle> {
    ResizeHandle::CORNERS
        .into_iter()
        .chain(ResizeHandle::EDGES)
        .find(|h| h.is_hit(rect, p, tolerance))
}

/// Move the edges implied by `handle` to `p`, pinning the opposite edges.
/// Extents shorter than `min_size` are restored by moving the dragged edge
/// back, never the pinned one.
pub fn apply_resize(handle: ResizeHandle, original: &Rect2, p: Point2, min_size: f64) -> Rect2 {
    let mut min_x = original.x;
    let mut max_x = original.max_x();
    let mut min_z = original.z;
    let mut max_z = original.max_z();

    if handle.moves_west() {
        min_x = p.x.min(max_x - min_size);
    }
    if handle.moves_east() {
        max_x = p.x.max(min_x + min_size);
    }
    if handle.moves_north() {
        min_z = p.y.min(max_z - min_size);
    }
    if handle.moves_south() {
        max_z = p.y.max(min_z + min_size);
    }

    Rect2::new(min_x, min_z, max_x - min_x, max_z - min_z)
}
