//! Four-lane accumulators for the floating and packed delta buffers.
//!
//! Each iteration loads four source cells, forms their running sums in
//! register with two shift-and-add steps, folds in the carry from the
//! previous iteration, then applies the variant's encoding (absolute
//! value, saturation, scale) and stores four alpha bytes. A scalar tail
//! finishes the last `n % 4` samples, stopping exactly at the buffer
//! end — callers never over-allocate.
//!
//! Output is byte-identical to the scalar accumulators, a property the
//! tests pin down together with zero-length destinations and every
//! (dst, src) misalignment pair. On targets other than x86-64 these
//! functions simply call the scalar versions.

#[cfg(target_arch = "x86_64")]
pub use x86::{accumulate_floating, accumulate_packed};

#[cfg(not(target_arch = "x86_64"))]
pub use fallback::{accumulate_floating, accumulate_packed};

#[cfg(target_arch = "x86_64")]
mod x86 {
    //! SSE2 kernels. SSE2 is part of the x86-64 baseline, so no runtime
    //! feature detection is needed.

    #[expect(clippy::wildcard_imports, reason = "intrinsics are conventionally glob-imported")]
    use core::arch::x86_64::*;

    use crate::packed::COVER_ONE;

    /// Four-lane version of [`crate::floating::accumulate`].
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "encoded values are non-negative and below 256 by construction"
    )]
    pub fn accumulate_floating(dst: &mut [u8], src: &[f32]) {
        const ALMOST_256: f32 = 255.999_98;

        let n = dst.len().min(src.len());
        let mut i = 0;
        let mut acc;
        // SAFETY: every `loadu` reads lanes i..i+4 with i + 4 <= n <=
        // src.len(); stores go through the checked slice. The intrinsics
        // themselves are plain SSE2 arithmetic.
        unsafe {
            let sign_mask = _mm_set1_ps(-0.0);
            let ones = _mm_set1_ps(1.0);
            let scale = _mm_set1_ps(ALMOST_256);
            let mut carry = _mm_setzero_ps();
            while i + 4 <= n {
                let x = _mm_loadu_ps(src.as_ptr().add(i));
                // In-register prefix sum: lane j becomes src[i] + … + src[i+j].
                let x = _mm_add_ps(x, _mm_castsi128_ps(_mm_slli_si128::<4>(_mm_castps_si128(x))));
                let x = _mm_add_ps(x, _mm_castsi128_ps(_mm_slli_si128::<8>(_mm_castps_si128(x))));
                let x = _mm_add_ps(x, carry);
                // |sum| clamped to 1, scaled, truncated.
                let a = _mm_andnot_ps(sign_mask, x);
                let a = _mm_min_ps(a, ones);
                let v = _mm_cvttps_epi32(_mm_mul_ps(a, scale));
                let v = _mm_packs_epi32(v, v);
                let v = _mm_packus_epi16(v, v);
                let bytes = (_mm_cvtsi128_si32(v) as u32).to_le_bytes();
                dst[i..i + 4].copy_from_slice(&bytes);
                carry = _mm_shuffle_ps::<0b1111_1111>(x, x);
                i += 4;
            }
            acc = _mm_cvtss_f32(carry);
        }
        for j in i..n {
            acc += src[j];
            dst[j] = (ALMOST_256 * acc.abs().min(1.0)) as u8;
        }
    }

    /// Four-lane version of [`crate::packed::accumulate`].
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "encoded values are clamped to [0, 0xfff] first"
    )]
    pub fn accumulate_packed(dst: &mut [u8], src: &[i32]) {
        let n = dst.len().min(src.len());
        let mut i = 0;
        let mut acc;
        // SAFETY: as in `accumulate_floating`; all loads stay inside
        // src[..n] and stores go through the checked slice.
        unsafe {
            let cap = _mm_set1_epi32(COVER_ONE);
            let mut carry = _mm_setzero_si128();
            while i + 4 <= n {
                let x = _mm_loadu_si128(src.as_ptr().add(i).cast());
                let x = _mm_add_epi32(x, _mm_slli_si128::<4>(x));
                let x = _mm_add_epi32(x, _mm_slli_si128::<8>(x));
                let x = _mm_add_epi32(x, carry);
                // |sum| via sign folding, then min(·, 0xfff) and the
                // 2ϕ−8 downshift.
                let sign = _mm_srai_epi32::<31>(x);
                let a = _mm_sub_epi32(_mm_xor_si128(x, sign), sign);
                let over = _mm_cmpgt_epi32(a, cap);
                let a = _mm_or_si128(_mm_and_si128(over, cap), _mm_andnot_si128(over, a));
                let a = _mm_srli_epi32::<4>(a);
                let v = _mm_packs_epi32(a, a);
                let v = _mm_packus_epi16(v, v);
                let bytes = (_mm_cvtsi128_si32(v) as u32).to_le_bytes();
                dst[i..i + 4].copy_from_slice(&bytes);
                carry = _mm_shuffle_epi32::<0b1111_1111>(x);
                i += 4;
            }
            acc = _mm_cvtsi128_si32(carry);
        }
        for j in i..n {
            acc = acc.wrapping_add(src[j]);
            let a = acc.unsigned_abs().min(COVER_ONE as u32);
            dst[j] = (a >> 4) as u8;
        }
    }
}

#[cfg(not(target_arch = "x86_64"))]
mod fallback {
    /// Scalar stand-in where no vector kernel is available.
    pub fn accumulate_floating(dst: &mut [u8], src: &[f32]) {
        crate::floating::accumulate(dst, src);
    }

    /// Scalar stand-in where no vector kernel is available.
    pub fn accumulate_packed(dst: &mut [u8], src: &[i32]) {
        crate::packed::accumulate(dst, src);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::{ROBOTO_G16, ROBOTO_G16_ACC, ROBOTO_G16_FIXED, SEQUENCE, SEQUENCE_ACC};
    use crate::{floating, packed};

    #[test]
    fn floating_matches_scalar_on_sequence() {
        for n in 0..=SEQUENCE.len() {
            let mut dst = vec![0u8; n];
            accumulate_floating(&mut dst, &SEQUENCE[..n]);
            assert_eq!(dst, SEQUENCE_ACC[..n], "prefix length {n}");
        }
    }

    #[test]
    fn floating_matches_scalar_on_roboto_g() {
        for n in [0, 1, 2, 3, 4, 5, 6, 7, 8, 15, 16, 17, 41, 58, 79, 96, ROBOTO_G16.len()] {
            let mut dst = vec![0u8; n];
            accumulate_floating(&mut dst, &ROBOTO_G16[..n]);
            assert_eq!(dst, ROBOTO_G16_ACC[..n], "prefix length {n}");
        }
    }

    #[test]
    fn packed_matches_scalar_on_roboto_g() {
        // The 12.20 reference buffer scaled down to 20.12 is valid
        // packed data; byte parity with the scalar packed accumulator
        // must hold at every length.
        let src: Vec<i32> = ROBOTO_G16_FIXED.iter().map(|v| v >> 8).collect();
        for n in 0..=src.len() {
            let mut simd = vec![0u8; n];
            let mut scalar = vec![0u8; n];
            accumulate_packed(&mut simd, &src[..n]);
            packed::accumulate(&mut scalar, &src[..n]);
            assert_eq!(simd, scalar, "prefix length {n}");
        }
    }

    #[test]
    fn zero_length_dst_is_a_noop() {
        let mut backing = [0u8; 4];
        accumulate_floating(&mut backing[..0], &[0.25, 0.25, 0.25, 0.25]);
        assert_eq!(backing, [0, 0, 0, 0]);

        let quarter = 1 << 10;
        accumulate_packed(&mut backing[..0], &[quarter; 4]);
        assert_eq!(backing, [0, 0, 0, 0]);
    }

    #[test]
    fn unaligned_offsets_are_safe_and_correct() {
        // Multiples of 1/16 sum exactly in f32 whatever the association,
        // so scalar and four-lane results must agree bit for bit.
        let mut src = [0.0f32; 64];
        for (i, v) in src.iter_mut().enumerate() {
            #[expect(clippy::cast_precision_loss, reason = "small test values")]
            let steps = (i % 13) as f32 - 6.0;
            *v = steps / 16.0;
        }
        for d in 0..16 {
            for s in 0..16 {
                let mut dst = [0u8; 64];
                let mut want = [0u8; 64];
                accumulate_floating(&mut dst[d..d + 32], &src[s..s + 32]);
                floating::accumulate(&mut want[d..d + 32], &src[s..s + 32]);
                assert_eq!(dst, want, "offsets d={d} s={s}");
            }
        }
    }

    #[test]
    fn unaligned_offsets_are_safe_and_correct_packed() {
        let mut src = [0i32; 64];
        for (i, v) in src.iter_mut().enumerate() {
            *v = ROBOTO_G16_FIXED[i % ROBOTO_G16_FIXED.len()] >> 8;
        }
        for d in 0..16 {
            for s in 0..16 {
                let mut dst = [0u8; 64];
                let mut want = [0u8; 64];
                accumulate_packed(&mut dst[d..d + 32], &src[s..s + 32]);
                packed::accumulate(&mut want[d..d + 32], &src[s..s + 32]);
                assert_eq!(dst, want, "offsets d={d} s={s}");
            }
        }
    }
}
