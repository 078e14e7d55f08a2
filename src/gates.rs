//! Common gate matrices in the row-major layout the kernels consume.

use num_complex::Complex64;

/// Identity on `arity` qubits.
pub fn identity(arity: usize) -> Vec<Complex64> {
    let dim = 1usize << arity;
    let mut m = vec![Complex64::new(0.0, 0.0); dim * dim];
    for r in 0..dim {
        m[r * dim + r] = Complex64::new(1.0, 0.0);
    }
    m
}

pub fn pauli_x() -> Vec<Complex64> {
    vec![
        Complex64::new(0.0, 0.0),
        Complex64::new(1.0, 0.0),
        Complex64::new(1.0, 0.0),
        Complex64::new(0.0, 0.0),
    ]
}

pub fn pauli_y() -> Vec<Complex64> {
    vec![
        Complex64::new(0.0, 0.0),
        Complex64::new(0.0, -1.0),
        Complex64::new(0.0, 1.0),
        Complex64::new(0.0, 0.0),
    ]
}

pub fn pauli_z() -> Vec<Complex64> {
    vec![
        Complex64::new(1.0, 0.0),
        Complex64::new(0.0, 0.0),
        Complex64::new(0.0, 0.0),
        Complex64::new(-1.0, 0.0),
    ]
}

pub fn hadamard() -> Vec<Complex64> {
    let h = std::f64::consts::FRAC_1_SQRT_2;
    vec![
        Complex64::new(h, 0.0),
        Complex64::new(h, 0.0),
        Complex64::new(h, 0.0),
        Complex64::new(-h, 0.0),
    ]
}

/// Embed `u` in a block-diagonal matrix gated on one extra control qubit.
///
/// The control owns the new high matrix bit (pass its id first): the
/// control-0 block is the identity, the control-1 block is `u`. So
/// `controlled(&pauli_x())` is the CNOT matrix.
///
/// # Panics
///
/// Panics if `u` is not square with a power-of-two dimension.
pub fn controlled(u: &[Complex64]) -> Vec<Complex64> {
    let dim = 1usize << (u.len().ilog2() / 2);
    assert_eq!(dim * dim, u.len(), "matrix is not square");

    let out = 2 * dim;
    let mut m = vec![Complex64::new(0.0, 0.0); out * out];
    for r in 0..dim {
        m[r * out + r] = Complex64::new(1.0, 0.0);
        for c in 0..dim {
            m[(dim + r) * out + (dim + c)] = u[r * dim + c];
        }
    }
    m
}
