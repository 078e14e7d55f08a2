//! Arity-generic gate kernels, scalar and vectorized.
//!
//! A kernel call transforms every disjoint group of `2^k` amplitudes selected
//! by `k` target bits, multiplying each group by a caller-supplied
//! `2^k x 2^k` matrix in place. The group cores here are pure functions of
//! the amplitudes at `base + offsets[..]` and the matrix, so invocations for
//! distinct base indices never interact and may run concurrently.

use std::ops::{Add, Mul, Range};

use num_complex::Complex64;
use num_traits::Zero;
use std::simd::f64x4;

use crate::complex::{mul_combine, splat1, store2};
use crate::driver::expand_base;

/// Largest supported gate arity.
pub(crate) const MAX_ARITY: usize = 5;
/// Amplitudes per group at the largest arity.
pub(crate) const MAX_DIM: usize = 1 << MAX_ARITY;

/// Multiply one amplitude group by the matrix, element-algebra generic.
///
/// `m` is row-major with `offsets.len()` rows. Instantiated with `Complex64`
/// for the production fallback and with plain integers in exactness tests.
#[inline(always)]
fn kernel_core_scalar<T>(psi: &mut [T], base: usize, offsets: &[usize], m: &[T])
where
    T: Copy + Zero + Add<Output = T> + Mul<Output = T>,
{
    let dim = offsets.len();
    let mut v = [T::zero(); MAX_DIM];
    for (amp, off) in v.iter_mut().zip(offsets) {
        *amp = psi[base + off];
    }

    for (r, row) in m.chunks_exact(dim).enumerate() {
        let mut acc = T::zero();
        for (amp, mrc) in v[..dim].iter().zip(row) {
            acc = acc + *amp * *mrc;
        }
        psi[base + offsets[r]] = acc;
    }
}

/// Multiply one amplitude group by the packed matrix, two rows per vector.
///
/// `mm` packs matrix element pairs `(2r, c)` and `(2r + 1, c)` into one
/// vector; `mmt` is its negated-swapped transform. Each `mul_combine`
/// therefore feeds two output rows, and each store scatters one finished
/// row pair.
#[inline(always)]
fn kernel_core_simd(
    psi: &mut [Complex64],
    base: usize,
    offsets: &[usize],
    mm: &[f64x4],
    mmt: &[f64x4],
) {
    let dim = offsets.len();
    let mut v = [f64x4::splat(0.0); MAX_DIM];
    for (amp, off) in v.iter_mut().zip(offsets) {
        *amp = splat1(psi, base + off);
    }

    for rp in 0..dim / 2 {
        let row = rp * dim;
        let mut acc = mul_combine(v[0], mm[row], mmt[row]);
        for c in 1..dim {
            acc += mul_combine(v[c], mm[row + c], mmt[row + c]);
        }
        store2(psi, base + offsets[2 * rp], base + offsets[2 * rp + 1], acc);
    }
}

/// Run the scalar core over a contiguous range of group counters.
#[multiversion::multiversion(targets(
    "x86_64+avx512f+avx512bw+avx512cd+avx512dq+avx512vl",
    "x86_64+avx2+fma",
    "x86_64+sse4.2",
    "x86+avx512f+avx512bw+avx512cd+avx512dq+avx512vl",
    "x86+avx2+fma",
    "x86+sse4.2",
    "x86+sse2",
    "aarch64+neon",
))]
pub(crate) fn apply_groups_scalar<T>(
    psi: &mut [T],
    groups: Range<usize>,
    ids_low_to_high: &[usize],
    offsets: &[usize],
    m: &[T],
    ctrl_mask: usize,
) where
    T: Copy + Zero + Add<Output = T> + Mul<Output = T>,
{
    if ctrl_mask == 0 {
        for g in groups {
            kernel_core_scalar(psi, expand_base(g, ids_low_to_high), offsets, m);
        }
    } else {
        for g in groups {
            let base = expand_base(g, ids_low_to_high);
            if base & ctrl_mask == ctrl_mask {
                kernel_core_scalar(psi, base, offsets, m);
            }
        }
    }
}

/// Run the vectorized core over a contiguous range of group counters.
#[multiversion::multiversion(targets(
    "x86_64+avx512f+avx512bw+avx512cd+avx512dq+avx512vl",
    "x86_64+avx2+fma",
    "x86_64+sse4.2",
    "x86+avx512f+avx512bw+avx512cd+avx512dq+avx512vl",
    "x86+avx2+fma",
    "x86+sse4.2",
    "x86+sse2",
    "aarch64+neon",
))]
pub(crate) fn apply_groups_simd(
    psi: &mut [Complex64],
    groups: Range<usize>,
    ids_low_to_high: &[usize],
    offsets: &[usize],
    mm: &[f64x4],
    mmt: &[f64x4],
    ctrl_mask: usize,
) {
    if ctrl_mask == 0 {
        for g in groups {
            kernel_core_simd(psi, expand_base(g, ids_low_to_high), offsets, mm, mmt);
        }
    } else {
        for g in groups {
            let base = expand_base(g, ids_low_to_high);
            if base & ctrl_mask == ctrl_mask {
                kernel_core_simd(psi, base, offsets, mm, mmt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{group_offsets, pack_matrix};

    #[test]
    fn scalar_core_swaps_pair_for_bit_flip() {
        // X on bit 1 of a 4-amplitude vector, one group at a time
        let mut psi = [10i64, 20, 30, 40];
        let offsets = group_offsets(&[1]);
        let m = [0i64, 1, 1, 0];

        kernel_core_scalar(&mut psi, 0, &offsets, &m);
        assert_eq!(psi, [30, 20, 10, 40]);

        kernel_core_scalar(&mut psi, 1, &offsets, &m);
        assert_eq!(psi, [30, 40, 10, 20]);
    }

    #[test]
    fn simd_core_matches_scalar_core() {
        let ids = [2usize, 0];
        let offsets = group_offsets(&ids);
        let matrix: Vec<Complex64> = (0..16)
            .map(|i| Complex64::new(i as f64 * 0.5 - 3.0, 1.0 - i as f64 * 0.25))
            .collect();
        let (mm, mmt) = pack_matrix(&matrix, 4);

        let mut scalar: Vec<Complex64> = (0..8)
            .map(|i| Complex64::new(i as f64 + 0.5, -(i as f64)))
            .collect();
        let mut simd = scalar.clone();

        kernel_core_scalar(&mut scalar, 2, &offsets, &matrix);
        kernel_core_simd(&mut simd, 2, &offsets, &mm, &mmt);

        for (a, b) in scalar.iter().zip(simd.iter()) {
            assert!((a - b).norm() < 1e-12, "{a} != {b}");
        }
    }
}
