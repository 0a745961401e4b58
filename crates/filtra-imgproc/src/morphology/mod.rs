//! Morphological operations.
//!
//! Erosion and dilation run on the same accumulator-driven engine as the
//! linear filters; the running state is a min or max instead of a sum, and
//! the kernel acts as a structuring element.

/// The min/max accumulators.
mod accumulator;
pub use accumulator::{
    DilateBinary, DilateGrayFlat, DilateGrayNonFlat, ErodeBinary, ErodeGrayFlat,
    ErodeGrayNonFlat,
};

/// Dilation functor.
mod dilation;
pub use dilation::Dilation;

/// Erosion functor.
mod erosion;
pub use erosion::Erosion;

/// Structuring element generators.
pub mod kernels;

use filtra_array::Element;

use crate::filter::FilterKernel;
use crate::padding::BorderType;
use crate::parallel::ExecutionStrategy;

/// Operating mode shared by [`Erosion`] and [`Dilation`], selecting the
/// accumulator variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MorphologyMode {
    /// Hit-or-miss on zero/nonzero samples; results are the kernel norm or 0.
    #[default]
    Binary,
    /// Gray-valued min/max over the samples under nonzero taps.
    GrayFlat,
    /// Gray-valued min/max with the tap heights added/subtracted first.
    GrayNonFlat,
}

/// Parameters shared by [`Erosion`] and [`Dilation`].
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MorphologyParameters<T: Element> {
    /// The structuring element; `None` until one is set.
    pub kernel: Option<FilterKernel<T>>,
    /// Border policy used to expand the source.
    pub border: BorderType,
    /// The accumulator variant to run.
    pub mode: MorphologyMode,
    /// Execution strategy for the filtering loops.
    pub strategy: ExecutionStrategy,
}
