use filtra_array::{Array1, Array2, Element};

use crate::error::FilterError;
use crate::filter::engine;
use crate::filter::FilterKernel;
use crate::morphology::accumulator::{DilateBinary, DilateGrayFlat, DilateGrayNonFlat};
use crate::morphology::{MorphologyMode, MorphologyParameters};
use crate::padding::BorderType;

/// Dilation functor.
///
/// Expands bright regions: every output sample is the maximum over the
/// neighborhood selected by the structuring element, per the mode in the
/// parameters.
///
/// For flat gray morphology, dilation is the dual of [`super::Erosion`]:
/// `dilate(f, k)` equals `-erode(-f, mirror(k))` at every sample.
#[derive(Debug, Clone, Default)]
pub struct Dilation<T: Element> {
    params: MorphologyParameters<T>,
}

impl<T: Element> Dilation<T> {
    /// Create the functor from parameters.
    pub fn new(params: MorphologyParameters<T>) -> Self {
        Self { params }
    }

    /// The active parameters.
    pub fn parameters(&self) -> &MorphologyParameters<T> {
        &self.params
    }

    /// Shortcut to set the structuring element; the other parameters remain
    /// unchanged.
    pub fn set_kernel(&mut self, kernel: impl Into<FilterKernel<T>>) {
        self.params.kernel = Some(kernel.into());
    }

    /// Set the operating mode; the other parameters remain unchanged.
    pub fn set_mode(&mut self, mode: MorphologyMode) {
        self.params.mode = mode;
    }

    /// Set the border policy; the other parameters remain unchanged.
    pub fn set_border(&mut self, border: BorderType) {
        self.params.border = border;
    }

    /// Dilate `src` into `dst`, reallocating `dst` to `src`'s size.
    pub fn apply(&self, src: &Array2<T>, dst: &mut Array2<T>) -> Result<(), FilterError> {
        let kernel = self.params.kernel.as_ref().ok_or(FilterError::NoKernelSet)?;
        let border = self.params.border;
        let strategy = self.params.strategy;
        match self.params.mode {
            MorphologyMode::Binary => engine::apply_kernel(
                src,
                dst,
                kernel,
                border,
                &DilateBinary::default(),
                strategy,
            ),
            MorphologyMode::GrayFlat => engine::apply_kernel(
                src,
                dst,
                kernel,
                border,
                &DilateGrayFlat::default(),
                strategy,
            ),
            MorphologyMode::GrayNonFlat => engine::apply_kernel(
                src,
                dst,
                kernel,
                border,
                &DilateGrayNonFlat::default(),
                strategy,
            ),
        }
    }

    /// Dilate `srcdest` in place.
    pub fn apply_inplace(&self, srcdest: &mut Array2<T>) -> Result<(), FilterError> {
        let src = srcdest.clone();
        self.apply(&src, srcdest)
    }

    /// Dilate a vector with the bound 1D structuring element.
    pub fn apply_vector(&self, src: &Array1<T>, dst: &mut Array1<T>) -> Result<(), FilterError> {
        let kernel = self.params.kernel.as_ref().ok_or(FilterError::NoKernelSet)?;
        let border = self.params.border;
        match kernel {
            FilterKernel::OneD(k) => match self.params.mode {
                MorphologyMode::Binary => {
                    engine::filter_vector(src, dst, k, border, &DilateBinary::default())
                }
                MorphologyMode::GrayFlat => {
                    engine::filter_vector(src, dst, k, border, &DilateGrayFlat::default())
                }
                MorphologyMode::GrayNonFlat => {
                    engine::filter_vector(src, dst, k, border, &DilateGrayNonFlat::default())
                }
            },
            _ => Err(FilterError::UnsupportedKernel(
                "vectors are dilated with a 1D structuring element",
            )),
        }
    }
}
