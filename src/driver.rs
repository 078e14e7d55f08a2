//! Group enumeration and data-parallel dispatch shared by both back ends.
//!
//! The driver turns a target-bit set into a flat range of group counters,
//! maps each counter to the base index of a disjoint amplitude group, and
//! feeds contiguous counter ranges to a kernel loop, either on the calling
//! thread or split once across the worker pool.

use std::ops::{Add, Mul, Range};

use num_complex::Complex64;
use num_traits::Zero;
use rayon::prelude::*;
use std::simd::f64x4;

use crate::complex::{load2, negate_swap};
use crate::error::{KernelError, Result};
use crate::kernels::{apply_groups_scalar, apply_groups_simd, MAX_ARITY};
use crate::options::{Options, Parallelism, Span};

/// Check every argument-error condition before any amplitude is touched.
///
/// The enumeration and the cores assume all of this holds; skipping it on a
/// bad call would silently corrupt memory or compute garbage.
pub(crate) fn validate<T>(
    state: &[T],
    ids: &[usize],
    matrix_len: usize,
    ctrl_mask: usize,
) -> Result<()> {
    let k = ids.len();
    if k == 0 || k > MAX_ARITY {
        return Err(KernelError::UnsupportedArity {
            arity: k,
            max: MAX_ARITY,
        });
    }
    if !state.len().is_power_of_two() {
        return Err(KernelError::StateLengthNotPowerOfTwo { len: state.len() });
    }
    let num_qubits = state.len().ilog2() as usize;

    let mut targets = 0usize;
    for &id in ids {
        if id >= num_qubits {
            return Err(KernelError::QubitOutOfRange { id, num_qubits });
        }
        if targets & (1 << id) != 0 {
            return Err(KernelError::DuplicateQubit { id });
        }
        targets |= 1 << id;
    }

    let dim = 1usize << k;
    if matrix_len != dim * dim {
        return Err(KernelError::MatrixSizeMismatch {
            expected: dim * dim,
            actual: matrix_len,
        });
    }
    if ctrl_mask & targets != 0 {
        return Err(KernelError::ControlOverlapsTarget {
            mask: ctrl_mask,
            targets,
        });
    }
    Ok(())
}

/// In-group offset of every basis combination, in the caller's id order.
///
/// Bit `j` of the table index is the value of qubit `ids[k - 1 - j]`, so the
/// first (highest) id owns the most significant matrix bit.
pub(crate) fn group_offsets(ids: &[usize]) -> Vec<usize> {
    let dim = 1usize << ids.len();
    (0..dim)
        .map(|t| {
            ids.iter()
                .rev()
                .enumerate()
                .filter(|(j, _)| (t >> j) & 1 == 1)
                .map(|(_, &id)| 1usize << id)
                .sum()
        })
        .collect()
}

/// Base index of the `group`-th amplitude group.
///
/// Inserts a zero bit at every target position, lowest first, visiting each
/// base index with all target bits clear exactly once and in increasing
/// order.
#[inline(always)]
pub(crate) fn expand_base(group: usize, ids_low_to_high: &[usize]) -> usize {
    let mut base = group;
    for &id in ids_low_to_high {
        let low = base & ((1 << id) - 1);
        base = ((base >> id) << (id + 1)) | low;
    }
    base
}

/// Pack the matrix as row pairs and precompute the negated-swapped transform.
pub(crate) fn pack_matrix(matrix: &[Complex64], dim: usize) -> (Vec<f64x4>, Vec<f64x4>) {
    let mut mm = Vec::with_capacity(matrix.len() / 2);
    let mut mmt = Vec::with_capacity(matrix.len() / 2);
    for rp in 0..dim / 2 {
        for c in 0..dim {
            let m = load2(matrix, 2 * rp * dim + c, (2 * rp + 1) * dim + c);
            mm.push(m);
            mmt.push(negate_swap(m));
        }
    }
    (mm, mmt)
}

fn num_groups<T>(state: &[T], ids: &[usize], span: Span) -> usize {
    let bound = match span {
        Span::FullVector => state.len(),
        Span::TopBlock => 1 << (ids.iter().max().unwrap() + 1),
    };
    bound >> ids.len()
}

/// Shared mutable access to the state vector across the worker pool.
///
/// Sound only because each worker receives a disjoint group-counter range
/// and every group touches a disjoint index set.
struct SendPtr<T>(*mut T);

unsafe impl<T: Send> Send for SendPtr<T> {}
unsafe impl<T: Send> Sync for SendPtr<T> {}

/// Split `0..num_groups` into one contiguous chunk per worker and run `f`
/// on each chunk (static schedule, partitioned once).
fn par_ranges<T, F>(state: &mut [T], num_groups: usize, f: F)
where
    T: Send,
    F: Fn(&mut [T], Range<usize>) + Sync,
{
    let workers = rayon::current_num_threads().max(1);
    let chunk = num_groups.div_ceil(workers).max(1);
    let len = state.len();
    let ptr = SendPtr(state.as_mut_ptr());

    (0..workers).into_par_iter().for_each(|w| {
        // Capture the whole `SendPtr` (Send + Sync) rather than the bare
        // `*mut T` field, which 2021 disjoint closure capture would otherwise
        // pick up and reject as not `Sync`.
        let ptr = &ptr;
        let start = w * chunk;
        let end = num_groups.min(start + chunk);
        if start >= end {
            return;
        }
        // SAFETY: counter ranges are disjoint and groups never overlap, so
        // no two workers read or write the same amplitude.
        let psi = unsafe { std::slice::from_raw_parts_mut(ptr.0, len) };
        f(psi, start..end);
    });
}

pub(crate) fn drive_simd(
    state: &mut [Complex64],
    ids: &[usize],
    matrix: &[Complex64],
    ctrl_mask: usize,
    opts: &Options,
) {
    let dim = 1usize << ids.len();
    let mut sorted_ids = ids.to_vec();
    sorted_ids.sort_unstable();
    let offsets = group_offsets(ids);
    let (mm, mmt) = pack_matrix(matrix, dim);
    let groups = num_groups(state, ids, opts.span);

    match opts.parallelism {
        Parallelism::SingleThreaded => {
            apply_groups_simd(state, 0..groups, &sorted_ids, &offsets, &mm, &mmt, ctrl_mask);
        }
        Parallelism::MultiThreaded => par_ranges(state, groups, |psi, range| {
            apply_groups_simd(psi, range, &sorted_ids, &offsets, &mm, &mmt, ctrl_mask);
        }),
    }
}

pub(crate) fn drive_scalar<T>(
    state: &mut [T],
    ids: &[usize],
    matrix: &[T],
    ctrl_mask: usize,
    opts: &Options,
) where
    T: Copy + Zero + Add<Output = T> + Mul<Output = T> + Send + Sync,
{
    let mut sorted_ids = ids.to_vec();
    sorted_ids.sort_unstable();
    let offsets = group_offsets(ids);
    let groups = num_groups(state, ids, opts.span);

    match opts.parallelism {
        Parallelism::SingleThreaded => {
            apply_groups_scalar(state, 0..groups, &sorted_ids, &offsets, matrix, ctrl_mask);
        }
        Parallelism::MultiThreaded => par_ranges(state, groups, |psi, range| {
            apply_groups_scalar(psi, range, &sorted_ids, &offsets, matrix, ctrl_mask);
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_caller_order() {
        // ids high-to-low: bit 3 owns the high matrix bit, bit 1 the low one
        assert_eq!(group_offsets(&[3, 1]), vec![0, 2, 8, 10]);
        assert_eq!(group_offsets(&[1, 3]), vec![0, 8, 2, 10]);
        assert_eq!(group_offsets(&[0]), vec![0, 1]);
    }

    #[test]
    fn enumerated_groups_partition_the_range() {
        for ids in [vec![0usize], vec![2, 0], vec![4, 1, 3], vec![1, 2, 0, 3]] {
            let k = ids.len();
            let n = 1usize << 6;
            let mut sorted = ids.clone();
            sorted.sort_unstable();
            let offsets = group_offsets(&ids);

            let mut seen = vec![0u32; n];
            for g in 0..n >> k {
                let base = expand_base(g, &sorted);
                for off in &offsets {
                    seen[base + off] += 1;
                }
            }
            assert!(
                seen.iter().all(|&c| c == 1),
                "ids {ids:?} do not tile the range: {seen:?}"
            );
        }
    }

    #[test]
    fn bases_are_increasing_with_target_bits_clear() {
        let ids = [3usize, 1];
        let mut sorted = ids.to_vec();
        sorted.sort_unstable();
        let targets: usize = ids.iter().map(|&id| 1 << id).sum();

        let mut prev = None;
        for g in 0..16 {
            let base = expand_base(g, &sorted);
            assert_eq!(base & targets, 0);
            if let Some(p) = prev {
                assert!(base > p);
            }
            prev = Some(base);
        }
    }

    #[test]
    fn validation_rejects_malformed_arguments() {
        let state = vec![Complex64::new(0.0, 0.0); 8];
        let m2 = vec![Complex64::new(0.0, 0.0); 4];

        assert!(matches!(
            validate(&state, &[], m2.len(), 0),
            Err(KernelError::UnsupportedArity { arity: 0, .. })
        ));
        assert!(matches!(
            validate(&state, &[0, 1, 2, 0, 1, 2], 4096, 0),
            Err(KernelError::UnsupportedArity { arity: 6, .. })
        ));
        assert!(matches!(
            validate(&state, &[3], m2.len(), 0),
            Err(KernelError::QubitOutOfRange { id: 3, .. })
        ));
        assert!(matches!(
            validate(&state, &[1, 1], 16, 0),
            Err(KernelError::DuplicateQubit { id: 1 })
        ));
        assert!(matches!(
            validate(&state, &[1], 3, 0),
            Err(KernelError::MatrixSizeMismatch { expected: 4, actual: 3 })
        ));
        assert!(matches!(
            validate(&state, &[1], m2.len(), 0b010),
            Err(KernelError::ControlOverlapsTarget { .. })
        ));
        assert!(matches!(
            validate(&state[..7], &[1], m2.len(), 0),
            Err(KernelError::StateLengthNotPowerOfTwo { len: 7 })
        ));
        assert!(validate(&state, &[1], m2.len(), 0b100).is_ok());
    }
}
