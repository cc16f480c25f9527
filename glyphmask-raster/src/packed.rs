//! The low-precision fixed-point rasterizer.
//!
//! Coordinates quantize to 26.6 fixed point (ϕ = 6) and coverage deltas
//! carry 2ϕ = 12 fractional bits. With only six fractional bits, every
//! product and every shifted numerator stays inside 32 bits, so the
//! multi-column deposits can divide the small quadratic terms first and
//! keep the whole inner loop in `i32` — the layout the four-lane
//! accumulator in [`simd`](crate::simd) wants. Output is one or two
//! steps coarser than the other variants.

use glyphmask_geom::{PathSink, Point};

use crate::flatten::flatten_quad;

/// Fractional bits of a quantized coordinate.
const PHI: i32 = 6;
/// 1.0 in 1ϕ fixed point.
const ONE: i32 = 1 << PHI;
/// 1.5 in 1ϕ fixed point.
const ONE_AND_A_HALF: i32 = (1 << PHI) + (1 << (PHI - 1));
/// Largest value below 1.0; added before a shift to round up.
const ONE_MINUS_IOTA: i32 = (1 << PHI) - 1;

/// Saturation bound of the running sum: 1.0 in 2ϕ bits.
pub(crate) const COVER_ONE: i32 = (1 << (2 * PHI)) - 1;

#[expect(
    clippy::cast_possible_truncation,
    reason = "quantized glyph coordinates fit in 26 integer bits"
)]
fn to_fixed(v: f32) -> i32 {
    (v * (ONE as f32)) as i32
}

/// Analytic area rasterizer over 20.12 fixed-point delta cells.
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

    /// The signed 20.12 coverage deltas, row-major.
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
        reason = "row indices fit in i32"
    )]
    fn draw_line(&mut self, p: Point, q: Point) {
        let (dir, p, q) = if p.y > q.y { (-1i32, q, p) } else { (1, p, q) };
        let px = to_fixed(p.x);
        let py = to_fixed(p.y);
        let qx = to_fixed(q.x);
        let qy = to_fixed(q.y);
        if py == qy {
            return;
        }
        let deltax = qx - px;
        let deltay = qy - py;

        let y_max = ((qy + ONE_MINUS_IOTA) >> PHI).min(self.height as i32);
        let mut x = px;
        let mut y = py >> PHI;

        while y < y_max {
            let row_top = y << PHI;
            let dy = (row_top + ONE).min(qy) - row_top.max(py);
            let x_next = x + dy * deltax / deltay;
            if y < 0 {
                x = x_next;
                y += 1;
                continue;
            }
            #[expect(clippy::cast_sign_loss, reason = "y is non-negative here")]
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
                // With six fractional bits the quadratic terms fit a
                // 1ϕ quotient, so each coefficient is divided down
                // before it meets d.
                let one_over_s = x1 - x0;
                let x0f = x0 - x0_floor;
                let one_minus_x0f = ONE - x0f;
                let a0 = ((one_minus_x0f * one_minus_x0f) >> 1) / one_over_s;
                let x1f = x1 - x1_ceil + ONE;
                let am = ((x1f * x1f) >> 1) / one_over_s;

                add(&mut self.cover, row, x0i, d * a0);
                if x1i == x0i + 2 {
                    add(&mut self.cover, row, x0i + 1, d * (ONE - a0 - am));
                } else {
                    let a1 = ((ONE_AND_A_HALF - x0f) << PHI) / one_over_s;
                    add(&mut self.cover, row, x0i + 1, d * (a1 - a0));
                    let d_times_s = (d << (2 * PHI)) / one_over_s;
                    for xi in x0i + 2..x1i - 1 {
                        add(&mut self.cover, row, xi, d_times_s);
                    }
                    let a2 = a1 + (((x1i - x0i - 3) << (2 * PHI)) / one_over_s);
                    add(&mut self.cover, row, x1i - 1, d * (ONE - a2 - am));
                }
                add(&mut self.cover, row, x1i, d * am);
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

/// Integrate 20.12 deltas into alpha bytes: the absolute running sum,
/// saturated at 1.0, keeps its top eight fractional bits.
///
/// Extra `dst` is left untouched; extra `src` is ignored, so a
/// zero-length `dst` is a no-op.
#[expect(
    clippy::cast_possible_truncation,
    reason = "the encoded value is clamped to [0, 0xfff] first"
)]
pub fn accumulate(dst: &mut [u8], src: &[i32]) {
    let mut acc: i32 = 0;
    for (d, &v) in dst.iter_mut().zip(src) {
        acc = acc.wrapping_add(v);
        #[expect(clippy::cast_sign_loss, reason = "COVER_ONE is positive")]
        let a = acc.unsigned_abs().min(COVER_ONE as u32);
        *d = (a >> (2 * PHI - 8)) as u8;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
