/// Options to tune how a kernel call executes on a given machine and input size.
///
/// Calling kernel routines without specifying options will automatically select
/// reasonable defaults depending on the input size and other factors.
///
/// You only need to tune these options if you are trying to squeeze maximum
/// performance out of a known hardware platform that you can benchmark at
/// varying input sizes.
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub backend: Backend,
    pub span: Span,
    pub parallelism: Parallelism,
}

impl Options {
    pub(crate) fn guess_options(state_len: usize) -> Options {
        let mut options = Options::default();
        let n: usize = state_len.max(1).ilog2() as usize;
        if n < 17 {
            options.parallelism = Parallelism::SingleThreaded;
        } else {
            options.parallelism = Parallelism::MultiThreaded;
        }
        options
    }
}

/// The arithmetic back end used for the per-group matrix multiply.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    /// Pick the fastest back end available (currently the vectorized one)
    Auto,
    /// Packed-lane complex arithmetic on two amplitudes per vector
    Simd,
    /// Portable scalar complex arithmetic
    ///
    /// Slower, but free of platform assumptions; also serves as the ground
    /// truth the vectorized back end is tested against.
    Scalar,
}

/// How much of the state vector one call covers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Span {
    #[default]
    /// Transform every amplitude group in the full state slice
    FullVector,
    /// Stop at `2^(highest_id + 1)`, the range spanned by the highest target bit
    ///
    /// Callers using this must repeat the call once per copy of that block
    /// across the remaining high bits of the index space.
    TopBlock,
}

/// Whether to fan the group range out across a thread pool.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Parallelism {
    #[default]
    /// Process every group on the calling thread
    SingleThreaded,
    /// Split the group range into one contiguous chunk per worker
    ///
    /// Typically beneficial from a few hundred thousand amplitudes upward;
    /// the exact threshold varies depending on the hardware.
    MultiThreaded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guessed_parallelism_scales_with_input() {
        assert_eq!(
            Options::guess_options(1 << 10).parallelism,
            Parallelism::SingleThreaded
        );
        assert_eq!(
            Options::guess_options(1 << 22).parallelism,
            Parallelism::MultiThreaded
        );
    }
}
