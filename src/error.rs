//! Argument-error taxonomy for the kernel boundary.

use thiserror::Error;

/// Errors detectable before any amplitude is touched.
///
/// The enumeration and kernel cores assume pre-validated arguments; every
/// condition below is checked once at the public boundary, so a call that
/// returns an error leaves the state vector untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// Gate arity outside the supported 1..=5 range
    #[error("unsupported gate arity {arity} (supported: 1..={max})")]
    UnsupportedArity { arity: usize, max: usize },

    /// Qubit index addresses a bit outside the state vector
    #[error("qubit index {id} out of range for {num_qubits}-qubit state")]
    QubitOutOfRange { id: usize, num_qubits: usize },

    /// The same qubit index appears more than once
    #[error("duplicate qubit index {id}")]
    DuplicateQubit { id: usize },

    /// Control mask selects a bit that the gate itself acts on
    #[error("control mask {mask:#x} overlaps target bits {targets:#x}")]
    ControlOverlapsTarget { mask: usize, targets: usize },

    /// Matrix length does not match `4^k` for the given id count
    #[error("matrix has {actual} elements, expected {expected}")]
    MatrixSizeMismatch { expected: usize, actual: usize },

    /// State vectors always hold `2^N` amplitudes
    #[error("state length {len} is not a power of two")]
    StateLengthNotPowerOfTwo { len: usize },
}

pub type Result<T> = std::result::Result<T, KernelError>;
