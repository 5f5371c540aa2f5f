//! Planar primitives shared by the sweep, the clipper and the consumers
//!
//! All coordinates are `f64` and use [`glam::DVec2`] as the point type.

use std::cmp::Ordering;

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};

/// Grid used to turn floating-point coordinates into hashable keys
///
/// Two coordinates closer than this on both axes may share a key. Used for
/// site deduplication, site lookup and union-find endpoint identity.
pub const COORD_QUANTUM: f64 = 1e-9;

/// Axis-aligned rectangle defined by its minimum corner and size
///
/// This is the clip domain for every visible output of a diagram.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum x coordinate
    pub x: f64,
    /// Minimum y coordinate
    pub y: f64,
    /// Extent along x (non-negative)
    pub width: f64,
    /// Extent along y (non-negative)
    pub height: f64,
}

impl Bounds {
    /// Create bounds from the minimum corner and size
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create bounds spanning two opposite corners (in any order)
    pub fn from_corners(a: DVec2, b: DVec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Check that all fields are finite and the size is non-negative
    ///
    /// Zero-area bounds are accepted: they produce degenerate but valid output.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(VoronoiError::InvalidConfig(format!(
                "bounds must be finite (got {:?})",
                self
            )));
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(VoronoiError::InvalidConfig(format!(
                "bounds size must be non-negative (got {} x {})",
                self.width, self.height
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn x_min(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn x_max(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn y_min(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn y_max(&self) -> f64 {
        self.y + self.height
    }

    /// Minimum corner
    #[inline]
    pub fn min(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Maximum corner
    #[inline]
    pub fn max(&self) -> DVec2 {
        DVec2::new(self.x_max(), self.y_max())
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Whether the point lies inside or on the border
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.x_min() && p.x <= self.x_max() && p.y >= self.y_min() && p.y <= self.y_max()
    }

    /// The four corners in counter-clockwise order starting at the minimum corner
    pub fn corners(&self) -> [DVec2; 4] {
        [
            DVec2::new(self.x_min(), self.y_min()),
            DVec2::new(self.x_max(), self.y_min()),
            DVec2::new(self.x_max(), self.y_max()),
            DVec2::new(self.x_min(), self.y_max()),
        ]
    }
}

/// A finite line segment between two points
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub p0: DVec2,
    pub p1: DVec2,
}

impl LineSegment {
    pub const fn new(p0: DVec2, p1: DVec2) -> Self {
        Self { p0, p1 }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.p0.distance(self.p1)
    }

    /// Whether both segments join the same two points, in either direction
    pub fn same_endpoints(&self, other: &LineSegment) -> bool {
        let a = (CoordKey::from(self.p0), CoordKey::from(self.p1));
        let b = (CoordKey::from(other.p0), CoordKey::from(other.p1));
        a == b || a == (b.1, b.0)
    }

    /// The same segment with its endpoints swapped
    pub fn reversed(&self) -> Self {
        Self::new(self.p1, self.p0)
    }
}

/// A circle in the plane
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle {
    pub const fn new(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// Which side of an edge a half-edge, vertex or clipped end belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Magnitude above which a coordinate's own precision is coarser than
/// [`COORD_QUANTUM`]; such values are keyed by their exact bits
const GRID_LIMIT: f64 = 4.5e6;

/// Key for one axis of a [`CoordKey`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum AxisKey {
    Grid(i64),
    Exact(u64),
}

impl AxisKey {
    fn new(v: f64) -> Self {
        if v.abs() < GRID_LIMIT {
            AxisKey::Grid((v / COORD_QUANTUM).round() as i64)
        } else {
            // Adding 0.0 folds -0.0 into 0.0
            AxisKey::Exact((v + 0.0).to_bits())
        }
    }
}

/// Quantized coordinate usable as a hash key
///
/// Keys are taken on a fixed [`COORD_QUANTUM`] grid, so `-0.0` and `0.0`
/// collapse to one key and values that differ only by rounding noise below
/// the grid resolution compare equal. Coordinates too large for the grid to
/// resolve are keyed by their exact value, so distinct finite coordinates
/// never share a key there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordKey {
    x: AxisKey,
    y: AxisKey,
}

impl From<DVec2> for CoordKey {
    fn from(p: DVec2) -> Self {
        Self {
            x: AxisKey::new(p.x),
            y: AxisKey::new(p.y),
        }
    }
}

/// Sweep order: ascending y, then ascending x
///
/// This is the tie-break rule used wherever sites or events are compared.
pub fn compare_by_y_then_x(a: DVec2, b: DVec2) -> Ordering {
    a.y.partial_cmp(&b.y)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
}
