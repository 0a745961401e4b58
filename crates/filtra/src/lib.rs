#![deny(missing_docs)]
//! Accumulator-driven separable filtering toolkit for 2D arrays.
//!
//! Convolution, correlation, erosion and dilation share one engine:
//! boundary-expanded arrays swept by 1D/2D/separable kernels, with the
//! per-element combination supplied by an accumulator strategy.

#[doc(inline)]
pub use filtra_array as array;

#[doc(inline)]
pub use filtra_imgproc as imgproc;
