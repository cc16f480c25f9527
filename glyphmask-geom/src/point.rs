//! Points in pixel coordinates.

use std::fmt;

/// A 2D point in pixel space, after the design-unit-to-pixel transform.
///
/// `f32` throughout: the rasterizer's numeric contract is single
/// precision, and TrueType coordinates (16-bit design units times a
/// pixels-per-em scale) fit comfortably.
#[derive(Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// The origin (0, 0).
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Linearly interpolate between `self` and `other`.
    ///
    /// `t = 0` returns `self`, `t = 1` returns `other`. Written as
    /// `p + t·(q − p)` (not `mul_add`) so results are bit-identical on
    /// every target.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(self.x + t * (other.x - self.x), self.y + t * (other.y - self.y))
    }

    /// The midpoint of `self` and `other`.
    ///
    /// Used for the implicit on-curve points between consecutive
    /// off-curve points in a TrueType outline.
    #[must_use]
    pub fn mid(self, other: Self) -> Self {
        Self::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
