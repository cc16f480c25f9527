//! The high-precision fixed-point rasterizer.
//!
//! Incoming coordinates are quantized to 22.10 fixed point (ϕ = 10
//! fractional bits); coverage deltas carry 2ϕ = 20 fractional bits in an
//! `i32` cell. Results match the floating formulation to within one byte
//! per sample. Unlike the [`packed`](crate::packed) variant, products of
//! two 1ϕ quantities times a flux can exceed 32 bits here, so every
//! multi-column deposit keeps its numerator in 64 bits and performs the
//! single division last.

use glyphmask_geom::{PathSink, Point};

use crate::flatten::flatten_quad;

/// Fractional bits of a quantized coordinate.
const PHI: i32 = 10;
/// 1.0 in 1ϕ fixed point.
const ONE: i32 = 1 << PHI;
/// 1.5 in 1ϕ fixed point.
const ONE_AND_A_HALF: i32 = (1 << PHI) + (1 << (PHI - 1));
/// Largest value below 1.0; added before a shift to round up.
const ONE_MINUS_IOTA: i32 = (1 << PHI) - 1;

#[expect(
    clippy::cast_possible_truncation,
    reason = "quantized glyph coordinates fit in 22 integer bits"
)]
fn to_fixed(v: f32) -> i32 {
    (v * (ONE as f32)) as i32
}

/// Analytic area rasterizer over 12.20 fixed-point delta cells.
///
/// Same API and pipeline as [`crate::floating::Rasterizer`]; only the
/// cell arithmetic differs.
pub struct Rasterizer {
    cover: Vec<i32>,
    width: usize,
    height: usize,
    first: Point,
    last: Point,
}

impl Rasterizer {
    /// Create a rasterizer for a `width` × `height` pixel image.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cover: vec![0; width * height],
            width,
            height,
            first: Point::ZERO,
            last: Point::ZERO,
        }
    }

    /// Zero the delta buffer and pen state for the next glyph.
    pub fn reset(&mut self) {
        self.cover.fill(0);
        self.first = Point::ZERO;
        self.last = Point::ZERO;
    }

    /// Image width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The signed 12.20 coverage deltas, row-major.
    #[must_use]
    pub fn coverage(&self) -> &[i32] {
        &self.cover
    }

    /// Start a new contour at `p`.
    pub fn move_to(&mut self, p: Point) {
        self.first = p;
        self.last = p;
    }

    /// Add a straight edge from the pen to `q`.
    pub fn line_to(&mut self, q: Point) {
        let p = self.last;
        self.last = q;
        self.draw_line(p, q);
    }

    /// Add a quadratic Bézier from the pen via `q` to `r`.
    ///
    /// Flattening runs in float; only the chord endpoints are quantized.
    pub fn quad_to(&mut self, q: Point, r: Point) {
        let p = self.last;
        flatten_quad(p, q, r, |s| self.line_to(s));
    }

    /// Close the current contour with a line back to its start.
    pub fn close_path(&mut self) {
        self.line_to(self.first);
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        reason = "deposits are bounded by one unit of flux in 2\u{3d5} bits and row indices are checked non-negative"
    )]
    fn draw_line(&mut self, p: Point, q: Point) {
        let (dir, p, q) = if p.y > q.y { (-1i32, q, p) } else { (1, p, q) };
        let px = to_fixed(p.x);
        let py = to_fixed(p.y);
        let qx = to_fixed(q.x);
        let qy = to_fixed(q.y);
        // An edge whose endpoints quantize to the same row of subpixels
        // is horizontal; no flux crosses any row boundary.
        if py == qy {
            return;
        }
        let deltax = i64::from(qx - px);
        let deltay = i64::from(qy - py);

        let y_max = ((qy + ONE_MINUS_IOTA) >> PHI).min(self.height as i32);
        let mut x = px;
        let mut y = py >> PHI;

        while y < y_max {
            let row_top = y << PHI;
            let dy = (row_top + ONE).min(qy) - row_top.max(py);
            let x_next = x + ((i64::from(dy) * deltax) / deltay) as i32;
            if y < 0 {
                x = x_next;
                y += 1;
                continue;
            }
            let row = y as usize * self.width;
            let d = dy * dir;
            let (x0, x1) = if x <= x_next { (x, x_next) } else { (x_next, x) };
            let x0i = x0 >> PHI;
            let x0_floor = x0i << PHI;
            let x1i = (x1 + ONE_MINUS_IOTA) >> PHI;
            let x1_ceil = x1i << PHI;

            if x1i <= x0i + 1 {
                let xmf = ((x + x_next) >> 1) - x0_floor;
                add(&mut self.cover, row, x0i, d * (ONE - xmf));
                add(&mut self.cover, row, x0i + 1, d * xmf);
            } else {
                // Every deposit below is d·numer / twoOverS, with the
                // numerator held in 64 bits and the division performed
                // last — dividing the small quadratic terms first (as the
                // packed variant can afford to) would discard most of the
                // 2ϕ precision this variant exists to keep.
                let two_over_s = i64::from(2 * (x1 - x0));
                let x0f = x0 - x0_floor;
                let one_minus_x0f = i64::from(ONE - x0f);
                let x1f = i64::from(x1 - x1_ceil + ONE);
                let d = i64::from(d);

                let a0_num = one_minus_x0f * one_minus_x0f;
                let am_num = x1f * x1f;
                add(&mut self.cover, row, x0i, (d * a0_num / two_over_s) as i32);
                if x1i == x0i + 2 {
                    let mid_num = (two_over_s << PHI) - a0_num - am_num;
                    add(&mut self.cover, row, x0i + 1, (d * mid_num / two_over_s) as i32);
                } else {
                    let a1_num = i64::from(ONE_AND_A_HALF - x0f) << (PHI + 1);
                    add(
                        &mut self.cover,
                        row,
                        x0i + 1,
                        (d * (a1_num - a0_num) / two_over_s) as i32,
                    );
                    let d_times_s = ((d << (2 * PHI + 1)) / two_over_s) as i32;
                    for xi in x0i + 2..x1i - 1 {
                        add(&mut self.cover, row, xi, d_times_s);
                    }
                    let a2_num = a1_num + (i64::from(x1i - x0i - 3) << (2 * PHI + 1));
                    let last_num = (two_over_s << PHI) - a2_num - am_num;
                    add(
                        &mut self.cover,
                        row,
                        x1i - 1,
                        (d * last_num / two_over_s) as i32,
                    );
                }
                add(&mut self.cover, row, x1i, (d * am_num / two_over_s) as i32);
            }

            x = x_next;
            y += 1;
        }
    }
}

impl PathSink for Rasterizer {
    fn move_to(&mut self, p: Point) {
        Self::move_to(self, p);
    }

    fn line_to(&mut self, p: Point) {
        Self::line_to(self, p);
    }

    fn quad_to(&mut self, p: Point, q: Point) {
        Self::quad_to(self, p, q);
    }
}

/// Deposit `v` at flat offset `row + x`. Negative columns and offsets
/// past the buffer end are dropped; a column past the row's right edge
/// lands at the start of the following row, keeping the single linear
/// accumulation scan balanced.
#[inline]
#[expect(clippy::cast_sign_loss, reason = "x is checked non-negative first")]
fn add(cover: &mut [i32], row: usize, x: i32, v: i32) {
    if x >= 0 {
        if let Some(cell) = cover.get_mut(row + x as usize) {
            *cell += v;
        }
    }
}

/// Integrate 12.20 deltas into alpha bytes: the absolute running sum,
/// shifted down from 2ϕ to 8 fractional bits and saturated at 0xff.
///
/// Extra `dst` is left untouched; extra `src` is ignored, so a
/// zero-length `dst` is a no-op.
#[expect(
    clippy::cast_possible_truncation,
    reason = "the encoded value is saturated to 0xff first"
)]
pub fn accumulate(dst: &mut [u8], src: &[i32]) {
    let mut acc: i32 = 0;
    for (d, &v) in dst.iter_mut().zip(src) {
        acc = acc.wrapping_add(v);
        *d = (acc.unsigned_abs() >> (2 * PHI - 8)).min(0xff) as u8;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
