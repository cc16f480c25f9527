//! The `f32` rasterizer, the reference formulation.
//!
//! Coverage deltas are accumulated in single precision and encoded to
//! alpha bytes by [`accumulate`]. The arithmetic deliberately avoids
//! fused multiply-adds so results are identical on every target.

use glyphmask_geom::{PathSink, Point};

use crate::flatten::flatten_quad;

/// Scales a value in [0, 1] to a byte in [0x00, 0xff] by truncation.
///
/// 255 is too small: accumulated rounding error can leave a fully
/// covered sample at 1 − ε, and truncating 255·(1 − ε) gives 0xfe.
/// 256 is too big: truncating 256·1.0 wraps to 0x00. This constant has
/// the exact `f32` representation 0x437f_ffff and maps both cases to
/// 0xff.
const ALMOST_256: f32 = 255.999_98;

/// An edge flatter than this is treated as horizontal: the division by
/// `q.y − p.y` below is unstable once the denominator underflows it.
const MIN_DELTA_Y: f32 = 1e-6;

/// Analytic area rasterizer over an `f32` delta buffer.
///
/// Feed it a segment stream (it implements
/// [`PathSink`](glyphmask_geom::PathSink)), then hand
/// [`coverage`](Self::coverage) to [`accumulate`] to produce alpha bytes.
pub struct Rasterizer {
    cover: Vec<f32>,
    width: usize,
    height: usize,
    first: Point,
    last: Point,
}

impl Rasterizer {
    /// Create a rasterizer for a `width` × `height` pixel image.
    /// The delta buffer is allocated once, here.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cover: vec![0.0; width * height],
            width,
            height,
            first: Point::ZERO,
            last: Point::ZERO,
        }
    }

    /// Zero the delta buffer and pen state for the next glyph.
    pub fn reset(&mut self) {
        self.cover.fill(0.0);
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

    /// The signed coverage deltas, row-major. `coverage()[y·W + x]` is
    /// the change in row `y`'s coverage as x crosses column `x`; for a
    /// closed contour that stays inside the image, each row's deltas
    /// sum to zero.
    #[must_use]
    pub fn coverage(&self) -> &[f32] {
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
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        reason = "row and column indices fit in i32, are checked non-negative, and convert exactly to f32"
    )]
    fn draw_line(&mut self, p: Point, q: Point) {
        let (dir, p, q) = if p.y > q.y { (-1.0f32, q, p) } else { (1.0, p, q) };
        // Horizontal edges deposit nothing. Almost-horizontal edges would
        // deposit a little in ideal math, but 1 / (q.y − p.y) blows up, so
        // they are treated as perfectly horizontal.
        if q.y - p.y <= MIN_DELTA_Y {
            return;
        }
        let dxdy = (q.x - p.x) / (q.y - p.y);

        let y_max = (q.y.ceil() as i32).min(self.height as i32);
        let mut x = p.x;
        let mut y = p.y.floor() as i32;

        while y < y_max {
            // The portion of the edge inside this row: dy is its vertical
            // extent (≤ 1), x..x_next its horizontal span.
            let dy = ((y + 1) as f32).min(q.y) - (y as f32).max(p.y);
            let x_next = x + dxdy * dy;
            if y < 0 {
                x = x_next;
                y += 1;
                continue;
            }
            let row = y as usize * self.width;
            // The signed vertical flux distributed among this row's cells.
            // In both branches below the deposits sum to exactly d.
            let d = dy * dir;
            let (x0, x1) = if x <= x_next { (x, x_next) } else { (x_next, x) };
            let x0i = x0.floor() as i32;
            let x0_floor = x0i as f32;
            let x1i = x1.ceil() as i32;
            let x1_ceil = x1i as f32;

            if x1i <= x0i + 1 {
                // The edge stays inside one pixel column: split d between
                // that column and the next by the mean fractional x.
                let xmf = 0.5 * (x + x_next) - x0_floor;
                add(&mut self.cover, row, x0i, d - d * xmf);
                add(&mut self.cover, row, x0i + 1, d * xmf);
            } else {
                // The edge spans several columns. Integrating the column
                // fraction left of the edge gives a quadratic ramp-in
                // (a0), a linear middle, and a quadratic ramp-out (am).
                let s = 1.0 / (x1 - x0);
                let x0f = x0 - x0_floor;
                let one_minus_x0f = 1.0 - x0f;
                let a0 = 0.5 * s * one_minus_x0f * one_minus_x0f;
                let x1f = x1 - x1_ceil + 1.0;
                let am = 0.5 * s * x1f * x1f;

                add(&mut self.cover, row, x0i, d * a0);
                if x1i == x0i + 2 {
                    add(&mut self.cover, row, x0i + 1, d * (1.0 - a0 - am));
                } else {
                    let a1 = s * (1.5 - x0f);
                    add(&mut self.cover, row, x0i + 1, d * (a1 - a0));
                    let d_times_s = d * s;
                    for xi in x0i + 2..x1i - 1 {
                        add(&mut self.cover, row, xi, d_times_s);
                    }
                    let a2 = a1 + s * (x1i - x0i - 3) as f32;
                    add(&mut self.cover, row, x1i - 1, d * (1.0 - a2 - am));
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
/// past the buffer end are dropped. A column at or past the row's right
/// edge intentionally lands at the start of the following row: the
/// accumulator is one linear scan over the flat buffer, and flux that
/// exits a row rightward must still be balanced before the scan reaches
/// the next row's samples.
#[inline]
#[expect(clippy::cast_sign_loss, reason = "x is checked non-negative first")]
fn add(cover: &mut [f32], row: usize, x: i32, v: f32) {
    if x >= 0 {
        if let Some(cell) = cover.get_mut(row + x as usize) {
            *cell += v;
        }
    }
}

/// Integrate `src` into alpha bytes: `dst[i]` is the encoded absolute
/// running sum of `src[..=i]`, clamped to [0, 1].
///
/// Row boundaries need no special handling because each row's deltas sum
/// to zero. Extra `dst` is left untouched; extra `src` is ignored, so a
/// zero-length `dst` is a no-op.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the encoded value is non-negative and below 256 by construction"
)]
pub fn accumulate(dst: &mut [u8], src: &[f32]) {
    let mut acc = 0.0f32;
    for (d, &v) in dst.iter_mut().zip(src) {
        acc += v;
        *d = (ALMOST_256 * acc.abs().min(1.0)) as u8;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[expect(
    clippy::float_cmp,
    reason = "exact float comparisons are intentional in tests"
)]
mod tests {
    use super::*;
    use crate::testdata::{ROBOTO_G16, ROBOTO_G16_ACC, SEQUENCE, SEQUENCE_ACC};

    #[test]
    fn accumulate_roboto_g() {
        for n in [0, 1, 7, 41, 58, 79, 96, ROBOTO_G16.len()] {
            let mut dst = vec![0u8; n];
            accumulate(&mut dst, &ROBOTO_G16[..n]);
            assert_eq!(dst, ROBOTO_G16_ACC[..n], "prefix length {n}");
        }
    }

    #[test]
    fn accumulate_sequence() {
        let mut dst = [0u8; 11];
        accumulate(&mut dst, &SEQUENCE);
        assert_eq!(dst, SEQUENCE_ACC);
    }

    #[test]
    fn accumulate_every_prefix_length() {
        for n in 0..=SEQUENCE.len() {
            let mut dst = vec![0u8; n];
            accumulate(&mut dst, &SEQUENCE[..n]);
            assert_eq!(dst, SEQUENCE_ACC[..n], "prefix length {n}");
        }
    }

    #[test]
    fn accumulate_empty_dst_is_noop() {
        let mut backing = [0u8; 4];
        accumulate(&mut backing[..0], &[0.25, 0.25, 0.25, 0.25]);
        assert_eq!(backing, [0, 0, 0, 0]);
    }

    #[test]
    fn accumulate_is_sign_insensitive() {
        let flipped: Vec<f32> = SEQUENCE.iter().map(|v| -v).collect();
        let mut dst = [0u8; 11];
        accumulate(&mut dst, &flipped);
        assert_eq!(dst, SEQUENCE_ACC);
    }

    #[test]
    fn fully_covered_sample_encodes_to_ff() {
        let mut dst = [0u8; 2];
        accumulate(&mut dst, &[1.0, 0.5]);
        assert_eq!(dst, [0xff, 0xff]);
    }

    #[test]
    fn horizontal_edges_deposit_nothing() {
        let mut z = Rasterizer::new(4, 4);
        z.move_to(Point::new(0.0, 1.0));
        z.line_to(Point::new(4.0, 1.0));
        z.line_to(Point::new(4.0, 1.0 + 5e-7));
        assert!(z.coverage().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn diagonal_edge_pair() {
        // A line down the main diagonal and straight back up: the lower
        // triangle is filled, the upper-right stays empty.
        let mut z = Rasterizer::new(4, 4);
        z.move_to(Point::new(0.0, 0.0));
        z.line_to(Point::new(4.0, 4.0));
        z.line_to(Point::new(0.0, 4.0));
        z.close_path();

        // Every row's deltas sum to zero (mass conservation). The last
        // row is excluded: the diagonal exits through the buffer's right
        // edge there, so half a unit of flux lands on column W and is
        // clipped.
        for y in 0..3 {
            let row: f32 = z.coverage()[y * 4..(y + 1) * 4].iter().sum();
            assert!(row.abs() < 1e-5, "row {y} sums to {row}");
        }

        let mut dst = [0u8; 16];
        accumulate(&mut dst, z.coverage());
        for y in 0..4 {
            // The diagonal pixel is half covered, pixels left of it are
            // full, pixels right of it empty.
            assert!(dst[y * 4 + y] > 0x40, "diagonal at row {y}: {:#04x}", dst[y * 4 + y]);
            if y + 1 < 4 {
                assert_eq!(dst[y * 4 + y + 1], 0x00, "above diagonal at row {y}");
            }
            if y > 0 {
                assert_eq!(dst[y * 4], 0xff, "left edge at row {y}");
            }
        }
    }

    #[test]
    fn rows_conserve_mass_for_quads() {
        let mut z = Rasterizer::new(8, 8);
        z.move_to(Point::new(1.0, 4.0));
        z.quad_to(Point::new(4.0, -2.0), Point::new(7.0, 4.0));
        z.quad_to(Point::new(4.0, 10.0), Point::new(1.0, 4.0));
        for y in 0..8 {
            let row: f32 = z.coverage()[y * 8..(y + 1) * 8].iter().sum();
            assert!(row.abs() < 1e-5, "row {y} sums to {row}");
        }
    }

    #[test]
    fn out_of_range_columns_are_dropped() {
        let mut z = Rasterizer::new(2, 2);
        // An edge far to the right of the buffer.
        z.move_to(Point::new(10.0, 0.0));
        z.line_to(Point::new(10.0, 2.0));
        assert!(z.coverage().iter().all(|&v| v == 0.0));
        // And one crossing from inside to far outside.
        z.move_to(Point::new(0.0, 0.0));
        z.line_to(Point::new(40.0, 2.0));
        let total: f32 = z.coverage().iter().map(|v| v.abs()).sum();
        assert!(total > 0.0);
    }
}
