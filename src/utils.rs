//! Small helpers shared by tests, benchmarks, and embedding callers.

use bytemuck::{cast_slice, cast_slice_mut};
use num_complex::Complex64;

/// View a state vector as its packed `[re, im, re, im, ..]` doubles.
pub fn flatten(state: &[Complex64]) -> &[f64] {
    cast_slice(state)
}

/// Mutable view of a state vector as its packed doubles.
pub fn flatten_mut(state: &mut [Complex64]) -> &mut [f64] {
    cast_slice_mut(state)
}

/// Asserts that two amplitudes are approximately equal.
///
/// # Panics
///
/// Panics if `actual` and `expected` are too far from each other
#[track_caller]
pub fn assert_complex_closeness(actual: Complex64, expected: Complex64, epsilon: f64) {
    if (actual - expected).norm() >= epsilon {
        panic!(
            "Assertion failed: {actual} too far from expected value {expected} (with epsilon {epsilon})",
        );
    }
}
