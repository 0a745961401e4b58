/// Pixel count above which [`ExecutionStrategy::Auto`] switches to the
/// parallel path.
const PARALLEL_THRESHOLD: usize = 100_000;

/// Controls how the per-row filtering loops are executed.
///
/// Every output row is an independent computation over the read-only,
/// boundary-expanded source, so rows can be distributed over the rayon thread
/// pool without any locking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    ///
    /// Useful for small arrays, debugging, or when the overhead of
    /// parallelization outweighs the benefits.
    Serial,

    /// Process rows in parallel on the global rayon thread pool.
    Parallel,

    /// Parallel for large arrays, serial otherwise.
    #[default]
    Auto,
}

impl ExecutionStrategy {
    /// Whether the parallel path should be taken for an array with
    /// `num_pixels` elements.
    pub fn is_parallel(&self, num_pixels: usize) -> bool {
        match self {
            ExecutionStrategy::Serial => false,
            ExecutionStrategy::Parallel => true,
            ExecutionStrategy::Auto => num_pixels >= PARALLEL_THRESHOLD,
        }
    }
}
