use filtra_array::{Array1, Array2, Element};

use crate::error::FilterError;
use crate::filter::engine;
use crate::filter::FilterKernel;
use crate::morphology::accumulator::{ErodeBinary, ErodeGrayFlat, ErodeGrayNonFlat};
use crate::morphology::{MorphologyMode, MorphologyParameters};
use crate::padding::BorderType;

/// Erosion functor.
///
/// Shrinks bright regions: every output sample is the minimum over the
/// neighborhood selected by the structuring element, per the mode in the
/// parameters. The structuring element is any kernel representation; a
/// separable one runs as a row pass followed by a column pass.
///
/// The element is stored pre-mirrored (see [`Erosion::set_kernel`]), so the
/// neighborhood of an asymmetric element is the one erosion conventionally
/// reads (`sample(p + j)` for tap offset `j`), and the duality
/// `dilate(f, k) == -erode(-f, mirror(k))` holds for flat gray morphology.
///
/// # Examples
///
/// ```
/// use filtra_array::{Array2, ArraySize};
/// use filtra_imgproc::morphology::{kernels, Erosion, MorphologyMode};
///
/// let mut src = Array2::<u8>::from_size_val(ArraySize { rows: 5, cols: 5 }, 0);
/// src[(2, 2)] = 255;
///
/// let mut erosion = Erosion::default();
/// erosion.set_kernel(kernels::box_structuring_element::<u8>(3, 3));
/// erosion.set_mode(MorphologyMode::Binary);
///
/// let mut dst = Array2::default();
/// erosion.apply(&src, &mut dst).unwrap();
/// // a lone pixel is eroded away
/// assert!(dst.as_slice().iter().all(|&v| v == 0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Erosion<T: Element> {
    params: MorphologyParameters<T>,
}

impl<T: Element> Erosion<T> {
    /// Create the functor from parameters. The kernel in `params` must
    /// already be stored mirrored (as [`Erosion::set_kernel`] does).
    pub fn new(params: MorphologyParameters<T>) -> Self {
        Self { params }
    }

    /// The active parameters.
    pub fn parameters(&self) -> &MorphologyParameters<T> {
        &self.params
    }

    /// Shortcut to set the structuring element; the other parameters remain
    /// unchanged. The element is mirrored here, once, so the engine's
    /// convolution-style pass reads the erosion neighborhood.
    pub fn set_kernel(&mut self, kernel: impl Into<FilterKernel<T>>) {
        self.params.kernel = Some(kernel.into().mirror());
    }

    /// Set the operating mode; the other parameters remain unchanged.
    pub fn set_mode(&mut self, mode: MorphologyMode) {
        self.params.mode = mode;
    }

    /// Set the border policy; the other parameters remain unchanged.
    pub fn set_border(&mut self, border: BorderType) {
        self.params.border = border;
    }

    /// Erode `src` into `dst`, reallocating `dst` to `src`'s size.
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
                &ErodeBinary::default(),
                strategy,
            ),
            MorphologyMode::GrayFlat => engine::apply_kernel(
                src,
                dst,
                kernel,
                border,
                &ErodeGrayFlat::default(),
                strategy,
            ),
            MorphologyMode::GrayNonFlat => engine::apply_kernel(
                src,
                dst,
                kernel,
                border,
                &ErodeGrayNonFlat::default(),
                strategy,
            ),
        }
    }

    /// Erode `srcdest` in place.
    pub fn apply_inplace(&self, srcdest: &mut Array2<T>) -> Result<(), FilterError> {
        let src = srcdest.clone();
        self.apply(&src, srcdest)
    }

    /// Erode a vector with the bound 1D structuring element.
    pub fn apply_vector(&self, src: &Array1<T>, dst: &mut Array1<T>) -> Result<(), FilterError> {
        let kernel = self.params.kernel.as_ref().ok_or(FilterError::NoKernelSet)?;
        let border = self.params.border;
        match kernel {
            FilterKernel::OneD(k) => match self.params.mode {
                MorphologyMode::Binary => {
                    engine::filter_vector(src, dst, k, border, &ErodeBinary::default())
                }
                MorphologyMode::GrayFlat => {
                    engine::filter_vector(src, dst, k, border, &ErodeGrayFlat::default())
                }
                MorphologyMode::GrayNonFlat => {
                    engine::filter_vector(src, dst, k, border, &ErodeGrayNonFlat::default())
                }
            },
            _ => Err(FilterError::UnsupportedKernel(
                "vectors are eroded with a 1D structuring element",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::kernels::{box_structuring_element, cross_structuring_element};
    use filtra_array::ArraySize;

    #[test]
    fn test_binary_erosion_shrinks_a_block() {
        let mut src = Array2::<u8>::zeros(ArraySize { rows: 7, cols: 7 });
        for r in 1..6 {
            for c in 1..6 {
                src[(r, c)] = 255;
            }
        }

        let mut erosion = Erosion::default();
        erosion.set_kernel(box_structuring_element::<u8>(3, 3));
        erosion.set_mode(MorphologyMode::Binary);
        erosion.set_border(BorderType::Zero);

        let mut dst = Array2::default();
        erosion.apply(&src, &mut dst).unwrap();

        for r in 0..7 {
            for c in 0..7 {
                let expected = if (2..5).contains(&r) && (2..5).contains(&c) {
                    255
                } else {
                    0
                };
                assert_eq!(dst[(r, c)], expected, "at ({r}, {c})");
            }
        }
    }

    #[test]
    fn test_gray_flat_erosion_takes_neighborhood_min() {
        let src = Array2::<f32>::new(
            ArraySize { rows: 3, cols: 3 },
            vec![5.0, 2.0, 8.0, 9.0, 7.0, 1.0, 4.0, 6.0, 3.0],
        )
        .unwrap();

        let mut erosion = Erosion::default();
        erosion.set_kernel(box_structuring_element::<f32>(3, 3));
        erosion.set_mode(MorphologyMode::GrayFlat);
        erosion.set_border(BorderType::Constant);

        let mut dst = Array2::default();
        erosion.apply(&src, &mut dst).unwrap();
        assert_eq!(dst[(1, 1)], 1.0);
        assert_eq!(dst[(0, 0)], 2.0);
    }

    #[test]
    fn test_non_flat_erosion_subtracts_heights() {
        let src = Array2::<f32>::from_size_val(ArraySize { rows: 3, cols: 3 }, 10.0);
        let mut se = crate::filter::Kernel2D::centered(
            3,
            3,
            vec![0.0f32, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 0.0],
        )
        .unwrap();
        se.set_norm(1.0);

        let mut erosion = Erosion::default();
        erosion.set_kernel(se);
        erosion.set_mode(MorphologyMode::GrayNonFlat);
        erosion.set_border(BorderType::Constant);

        let mut dst = Array2::default();
        erosion.apply(&src, &mut dst).unwrap();
        // constant 10 minus the largest tap height
        assert_eq!(dst[(1, 1)], 8.0);
    }

    #[test]
    fn test_binary_erosion_with_cross() {
        let mut src = Array2::<u8>::zeros(ArraySize { rows: 5, cols: 5 });
        // a filled cross survives erosion by the cross at its center only
        for i in 0..5 {
            src[(2, i)] = 255;
            src[(i, 2)] = 255;
        }
        for r in 1..4 {
            for c in 1..4 {
                src[(r, c)] = 255;
            }
        }

        let mut erosion = Erosion::default();
        erosion.set_kernel(cross_structuring_element::<u8>(3));
        erosion.set_mode(MorphologyMode::Binary);
        erosion.set_border(BorderType::Zero);

        let mut dst = Array2::default();
        erosion.apply(&src, &mut dst).unwrap();
        assert_eq!(dst[(2, 2)], 255);
        assert_eq!(dst[(1, 2)], 255); // cross fits here
        assert_eq!(dst[(1, 1)], 0); // (0, 1) is off
        assert_eq!(dst[(0, 2)], 0); // arm tip loses its upper neighbor
    }
}
