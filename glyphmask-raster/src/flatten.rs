//! Quadratic Bézier flattening shared by all rasterizer variants.

use glyphmask_geom::Point;

/// Approximate the quadratic Bézier (p, q, r) with line chords, invoking
/// `line_to` for each chord endpoint in order (the final call is exactly
/// `r`).
///
/// The deviation vector `p − 2q + r` measures how far the curve bends
/// away from the chord `p→r`; its squared length picks the subdivision
/// count `n = 1 + ⌊⁴√(3·dev²)⌋`, and the chords are evaluated at evenly
/// spaced parameters. Compared to recursive de Casteljau subdivision this
/// computes the flatness term once instead of at every split and needs
/// about a third fewer chords in the limit.
pub(crate) fn flatten_quad(p: Point, q: Point, r: Point, mut line_to: impl FnMut(Point)) {
    let devx = p.x - 2.0 * q.x + r.x;
    let devy = p.y - 2.0 * q.y + r.y;
    let devsq = devx * devx + devy * devy;
    if devsq >= 0.333 {
        const TOL: f64 = 3.0;
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "the subdivision count is a small positive integer"
        )]
        let n = 1 + (TOL * f64::from(devsq)).sqrt().sqrt().floor() as u32;
        #[expect(
            clippy::cast_precision_loss,
            reason = "subdivision counts are far below f32 precision limits"
        )]
        let n_inv = 1.0 / n as f32;
        let mut t = 0.0f32;
        for _ in 0..n - 1 {
            t += n_inv;
            line_to(p.lerp(q, t).lerp(q.lerp(r, t), t));
        }
    }
    line_to(r);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
