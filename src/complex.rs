//! Vectorized complex arithmetic on packed (re, im) lane pairs.
//!
//! A `f64x4` holds two complex doubles as `[re0, im0, re1, im1]`. There is no
//! native complex multiply, so products are built from two real multiplies
//! and one combine against a negated-swapped copy of the right-hand side,
//! which the driver precomputes once per call.

use num_complex::Complex64;
use std::simd::{f64x4, simd_swizzle, StdFloat};

/// Sign pattern applied to the swapped lanes: the new real lane is negated.
const NEG_RE: f64x4 = f64x4::from_array([-1.0, 1.0, -1.0, 1.0]);

/// Unaligned load of two amplitudes from independent indices into one vector.
#[inline(always)]
pub(crate) fn load2(psi: &[Complex64], i: usize, j: usize) -> f64x4 {
    let a = psi[i];
    let b = psi[j];
    f64x4::from_array([a.re, a.im, b.re, b.im])
}

/// Scatter the two packed amplitudes back to independent indices.
#[inline(always)]
pub(crate) fn store2(psi: &mut [Complex64], i: usize, j: usize, v: f64x4) {
    let v = v.to_array();
    psi[i] = Complex64::new(v[0], v[1]);
    psi[j] = Complex64::new(v[2], v[3]);
}

/// Broadcast one amplitude into both halves of a vector.
#[inline(always)]
pub(crate) fn splat1(psi: &[Complex64], i: usize) -> f64x4 {
    let a = psi[i];
    f64x4::from_array([a.re, a.im, a.re, a.im])
}

/// `[c, d, c', d'] -> [-d, c, -d', c']`.
///
/// For a matrix element `m = c + di`, `mul_combine(v, m, negate_swap(m))`
/// is the full complex product `v * m`.
#[inline(always)]
pub(crate) fn negate_swap(m: f64x4) -> f64x4 {
    simd_swizzle!(m, [1, 0, 3, 2]) * NEG_RE
}

/// Complex product of packed amplitudes `v` with packed matrix elements `m`.
///
/// `mt` must be `negate_swap(m)`. With `v = [a, b, ...]` and `m = [c, d, ...]`
/// the result lanes are `[ac - bd, ad + bc, ...]`, equal to scalar complex
/// multiplication up to floating-point rounding.
#[inline(always)]
pub(crate) fn mul_combine(v: f64x4, m: f64x4, mt: f64x4) -> f64x4 {
    let v_re = simd_swizzle!(v, [0, 0, 2, 2]);
    let v_im = simd_swizzle!(v, [1, 1, 3, 3]);
    v_re.mul_add(m, v_im * mt)
}
