#![deny(missing_docs)]
//! Filtering operations over 2D arrays.
//!
//! Convolution, correlation and morphology are all driven by one
//! accumulator-parameterized engine: a boundary-expanded copy of the input is
//! swept by a kernel whose taps and samples are combined by an
//! [`filter::Accumulator`] strategy, with symmetric and antisymmetric kernels
//! taking a paired fast path.

/// Error types for the filtering operations.
pub mod error;

/// Linear filtering: kernels, accumulators and the convolution/correlation
/// functors.
pub mod filter;

/// Morphological operations (erosion, dilation).
pub mod morphology;

/// Boundary expansion of arrays.
pub mod padding;

/// Execution strategy for the per-row filtering loops.
pub mod parallel;

pub use crate::error::FilterError;
