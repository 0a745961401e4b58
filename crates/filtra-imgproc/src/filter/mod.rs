//! Linear filtering over 1D and 2D arrays.
//!
//! The kernel data model ([`Kernel1D`], [`Kernel2D`], [`SeparableKernel`]),
//! the [`Accumulator`] strategy protocol, and the convolution/correlation
//! functors built on the shared engine.

/// The accumulator protocol and the convolution sum.
mod accumulator;
pub use accumulator::{Accumulator, Sum};

/// Convolution functor.
mod convolution;
pub use convolution::{Convolution, ConvolutionParameters};

/// Correlation functor and its matching accumulators.
mod correlation;
pub use correlation::{
    Coefficient, Correlation, CorrelationMode, CorrelationParameters, Criterion1, Criterion2,
    Criterion3,
};

/// The shared filtering loops.
pub(crate) mod engine;

/// Kernel data model.
mod kernel;
pub use kernel::{FilterKernel, Kernel1D, Kernel2D, KernelSymmetry, SeparableKernel};

/// Kernel generators.
pub mod kernels;
