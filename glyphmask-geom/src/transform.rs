//! Affine 2×3 transforms.
//!
//! A [`Transform`] maps `(x, y)` to `(txx·x + txy·y + tx, tyx·x + tyy·y + ty)`.
//! Glyph outlines are stored in font design units; the fonts crate builds a
//! transform that scales them to pixels, flips the y axis (raster rows grow
//! downward), and shifts the glyph bounding box to the image origin.
//! Compound glyphs compose their component offsets and scales onto the
//! outer transform with [`Transform::then`].

use crate::point::Point;

/// An affine 2×3 transform over `f32` coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub txx: f32,
    pub txy: f32,
    pub tx: f32,
    pub tyx: f32,
    pub tyy: f32,
    pub ty: f32,
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        txx: 1.0,
        txy: 0.0,
        tx: 0.0,
        tyx: 0.0,
        tyy: 1.0,
        ty: 0.0,
    };

    /// Create a transform from its six components, row-major:
    /// `[[txx, txy, tx], [tyx, tyy, ty]]`.
    #[must_use]
    pub const fn new(txx: f32, txy: f32, tx: f32, tyx: f32, tyy: f32, ty: f32) -> Self {
        Self {
            txx,
            txy,
            tx,
            tyx,
            tyy,
            ty,
        }
    }

    /// A pure translation.
    #[must_use]
    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, tx, 0.0, 1.0, ty)
    }

    /// Apply the transform to a point.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.txx * p.x + self.txy * p.y + self.tx,
            self.tyx * p.x + self.tyy * p.y + self.ty,
        )
    }

    /// Compose two transforms: `self` applied first, then `outer`.
    #[must_use]
    pub fn then(&self, outer: &Self) -> Self {
        Self {
            txx: outer.txx * self.txx + outer.txy * self.tyx,
            txy: outer.txx * self.txy + outer.txy * self.tyy,
            tx: outer.txx * self.tx + outer.txy * self.ty + outer.tx,
            tyx: outer.tyx * self.txx + outer.tyy * self.tyx,
            tyy: outer.tyx * self.txy + outer.tyy * self.tyy,
            ty: outer.tyx * self.tx + outer.tyy * self.ty + outer.ty,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
