#![warn(missing_docs)]

//! Geometry value types for the shelfplan store planner.
//!
//! Thin wrappers around nalgebra plus the plain-data contracts shared by the
//! aisle editor, the shelf packer and the interaction layer: floor-plan
//! rectangles, box dimensions, shelf levels and centred shelf footprints.
//!
//! All lengths are metres. The floor plan uses `x` for the store width axis
//! and `z` for the depth axis; `y` is up.

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the 2D floor plan or on the screen.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector on the 2D floor plan or on the screen.
pub type Vec2 = Vector2<f64>;

/// A point in 3D store space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D store space.
pub type Vec3 = Vector3<f64>;

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in metres.
    pub linear: f64,
}

impl Tolerance {
    /// Default planner tolerance (1e-9 m).
    pub const DEFAULT: Self = Self { linear: 1e-9 };

    /// `a <= b` allowing for accumulated float error.
    pub fn le(&self, a: f64, b: f64) -> bool {
        a <= b + self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Axis-aligned rectangle on the floor plan.
///
/// `(x, z)` is the minimum corner; `width` runs along `x` and `length`
/// along `z`. A valid rectangle has strictly positive extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect2 {
    /// Minimum x coordinate.
    pub x: f64,
    /// Minimum z coordinate.
    pub z: f64,
    /// Extent along x.
    pub width: f64,
    /// Extent along z.
    pub length: f64,
}

impl Rect2 {
    /// Create a rectangle from its minimum corner and extents.
    pub fn new(x: f64, z: f64, width: f64, length: f64) -> Self {
        Self {
            x,
            z,
            width,
            length,
        }
    }

    /// Rectangle spanning two arbitrary corners.
    pub fn from_corners(a: Point2, b: Point2) -> Self {
        Self {
            x: a.x.min(b.x),
            z: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            length: (a.y - b.y).abs(),
        }
    }

    /// Maximum x coordinate.
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    /// Maximum z coordinate.
    pub fn max_z(&self) -> f64 {
        self.z + self.length
    }

    /// Centre point.
    pub fn center(&self) -> Point2 {
        Point2::new(self.x + self.width / 2.0, self.z + self.length / 2.0)
    }

    /// Both extents strictly positive and every field finite.
    pub fn is_valid(&self) -> bool {
        [self.x, self.z, self.width, self.length]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.length > 0.0
    }

    /// Interior overlap test. Rectangles that only share an edge or a
    /// corner do not overlap.
    pub fn overlaps(&self, other: &Rect2) -> bool {
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.z < other.max_z()
            && other.z < self.max_z()
    }

    /// True if `self` lies entirely inside `[0, 0] - [width, depth]`.
    pub fn within_bounds(&self, width: f64, depth: f64) -> bool {
        let tol = Tolerance::DEFAULT;
        self.x >= -tol.linear
            && self.z >= -tol.linear
            && tol.le(self.max_x(), width)
            && tol.le(self.max_z(), depth)
    }

    /// Point containment, inclusive of the boundary.
    pub fn contains_point(&self, p: Point2) -> bool {
        p.x >= self.x && p.x <= self.max_x() && p.y >= self.z && p.y <= self.max_z()
    }
}

impl fmt::Display for Rect2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) {}x{}",
            self.x, self.z, self.width, self.length
        )
    }
}

/// Outer dimensions of one product box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxDims {
    /// Extent along the shelf front (metres).
    pub width: f64,
    /// Vertical extent (metres).
    pub height: f64,
    /// Extent into the shelf (metres).
    pub depth: f64,
}

impl BoxDims {
    /// Create box dimensions.
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Replace every missing, zero or negative dimension with the matching
    /// dimension of `fallback`.
    pub fn or_fallback(&self, fallback: BoxDims) -> BoxDims {
        let pick = |v: f64, d: f64| if v.is_finite() && v > 0.0 { v } else { d };
        BoxDims {
            width: pick(self.width, fallback.width),
            height: pick(self.height, fallback.height),
            depth: pick(self.depth, fallback.depth),
        }
    }
}

impl Default for BoxDims {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// A 1-indexed shelf tier within a rack unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ShelfLevel(u32);

impl ShelfLevel {
    /// The bottom shelf.
    pub const FIRST: ShelfLevel = ShelfLevel(1);

    /// Create a shelf level; `None` for level 0.
    pub fn new(level: u32) -> Option<Self> {
        (level >= 1).then_some(Self(level))
    }

    /// The raw 1-based level.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Zero-based index, for tables indexed by shelf.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Levels `1..=shelves` in ascending order.
    pub fn all(shelves: u32) -> impl Iterator<Item = ShelfLevel> {
        (1..=shelves).map(ShelfLevel)
    }
}

impl TryFrom<u32> for ShelfLevel {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        ShelfLevel::new(value).ok_or_else(|| "shelf level is 1-indexed".to_string())
    }
}

impl From<ShelfLevel> for u32 {
    fn from(level: ShelfLevel) -> u32 {
        level.0
    }
}

impl fmt::Display for ShelfLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A centred rectangular footprint on a shelf, in rack-unit local
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    /// Centre along the shelf front.
    pub x: f64,
    /// Centre into the shelf.
    pub z: f64,
    /// Extent along the shelf front.
    pub width: f64,
    /// Extent into the shelf.
    pub depth: f64,
}

impl Footprint {
    /// Create a footprint from its centre and extents.
    pub fn new(x: f64, z: f64, width: f64, depth: f64) -> Self {
        Self { x, z, width, depth }
    }

    /// Centred overlap test: `|dx| < (w1+w2)/2 && |dz| < (d1+d2)/2`.
    ///
    /// Footprints that merely touch do not overlap; the linear tolerance
    /// keeps boxes packed edge-to-edge from registering as overlapping.
    pub fn overlaps(&self, other: &Footprint) -> bool {
        let tol = Tolerance::DEFAULT.linear;
        let dx = (self.x - other.x).abs();
        let dz = (self.z - other.z).abs();
        dx + tol < (self.width + other.width) / 2.0 && dz + tol < (self.depth + other.depth) / 2.0
    }
}
