#![feature(portable_simd)]
//! Gate-application kernels for state-vector quantum-circuit simulation.
//!
//! A kernel call applies a dense `2^k x 2^k` complex matrix to the `k` qubit
//! index bits of a `2^N`-amplitude state vector, optionally restricted by a
//! control-bit mask, mutating the vector in place. The crate provides a
//! vectorized back end built on packed complex lanes, a portable scalar
//! reference that doubles as the ground-truth model, and a driver that
//! enumerates the disjoint amplitude groups and partitions them statically
//! across the worker pool.
//!
//! ```
//! use num_complex::Complex64;
//! use phastgate::{apply_kernel, gates};
//!
//! // H|0> = (|0> + |1>) / sqrt(2)
//! let mut state = vec![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
//! apply_kernel(&mut state, &[0], &gates::hadamard(), 0).unwrap();
//!
//! assert!((state[0].re - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
//! assert!((state[1].re - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
//! ```

use std::ops::{Add, Mul};

use num_complex::Complex64;
use num_traits::Zero;

mod complex;
mod driver;
mod error;
pub mod gates;
mod kernels;
mod options;
pub mod utils;

pub use error::KernelError;
pub use options::{Backend, Options, Parallelism, Span};

/// Apply a gate matrix to the qubits in `ids`, honoring `ctrl_mask`.
///
/// `ids` lists the target bit positions high-to-low per the usual gate
/// convention (control before target for a controlled gate); the first id
/// owns the most significant matrix index bit. `matrix` is row-major with
/// `4^k` elements for `k = ids.len()`. A group at base index `I`
/// participates iff `I & ctrl_mask == ctrl_mask`; a zero mask selects every
/// group. Mask bits above the vector range never match, so such a call
/// leaves the state untouched.
///
/// Options are guessed from the input size; use
/// [`apply_kernel_with_opts`] to pin them down.
///
/// # Errors
///
/// Returns a [`KernelError`] before touching any amplitude if the arity is
/// outside `1..=5`, an id is duplicated or out of range, the matrix is
/// mis-sized, the mask overlaps a target bit, or the state length is not a
/// power of two.
pub fn apply_kernel(
    state: &mut [Complex64],
    ids: &[usize],
    matrix: &[Complex64],
    ctrl_mask: usize,
) -> Result<(), KernelError> {
    let opts = Options::guess_options(state.len());
    apply_kernel_with_opts(state, ids, matrix, ctrl_mask, &opts)
}

/// [`apply_kernel`] with explicit execution [`Options`].
///
/// # Errors
///
/// Same conditions as [`apply_kernel`].
pub fn apply_kernel_with_opts(
    state: &mut [Complex64],
    ids: &[usize],
    matrix: &[Complex64],
    ctrl_mask: usize,
    opts: &Options,
) -> Result<(), KernelError> {
    driver::validate(state, ids, matrix.len(), ctrl_mask)?;
    match opts.backend {
        Backend::Auto | Backend::Simd => driver::drive_simd(state, ids, matrix, ctrl_mask, opts),
        Backend::Scalar => driver::drive_scalar(state, ids, matrix, ctrl_mask, opts),
    }
    Ok(())
}

/// The scalar reference kernel, generic over the element algebra.
///
/// Runs the same driver as [`apply_kernel`] with the portable scalar core.
/// Any element type with zero, addition, and multiplication works: integers
/// give bit-exact results for equivalence testing, `Complex64` gives the
/// production fallback. The `backend` option is not consulted.
///
/// # Errors
///
/// Same conditions as [`apply_kernel`].
pub fn apply_kernel_scalar<T>(
    state: &mut [T],
    ids: &[usize],
    matrix: &[T],
    ctrl_mask: usize,
    opts: &Options,
) -> Result<(), KernelError>
where
    T: Copy + Zero + Add<Output = T> + Mul<Output = T> + Send + Sync,
{
    driver::validate(state, ids, matrix.len(), ctrl_mask)?;
    driver::drive_scalar(state, ids, matrix, ctrl_mask, opts);
    Ok(())
}
