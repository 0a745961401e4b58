use filtra_array::{Array1, Array2, Element};

use crate::error::FilterError;
use crate::filter::accumulator::Sum;
use crate::filter::engine;
use crate::filter::kernel::{FilterKernel, Kernel2D, SeparableKernel};
use crate::padding::BorderType;
use crate::parallel::ExecutionStrategy;

/// Parameters of the [`Convolution`] functor.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvolutionParameters<T: Element> {
    /// The filter kernel; `None` until one is set.
    pub kernel: Option<FilterKernel<T>>,
    /// Border policy used to expand the source.
    pub border: BorderType,
    /// Execution strategy for the filtering loops.
    pub strategy: ExecutionStrategy,
}

/// Convolution functor.
///
/// Convolves the kernel set in its parameters with a vector or a 2D array.
/// Separable kernels take the two-pass row/column path; dense 2D kernels use
/// the full double loop. Fixed-point kernels are finalized through their
/// norm (see [`crate::filter::Kernel1D::norm`]).
///
/// # Examples
///
/// ```
/// use filtra_array::{Array2, ArraySize};
/// use filtra_imgproc::filter::{Convolution, Kernel2D};
///
/// let src = Array2::<f32>::from_size_val(ArraySize { rows: 4, cols: 4 }, 2.0);
/// let mut dst = Array2::default();
///
/// let mut conv = Convolution::default();
/// conv.set_kernel(Kernel2D::centered(1, 1, vec![1.0f32]).unwrap());
/// conv.apply(&src, &mut dst).unwrap();
/// assert_eq!(dst.as_slice(), src.as_slice());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Convolution<T: Element> {
    params: ConvolutionParameters<T>,
}

impl<T: Element> Convolution<T> {
    /// Create the functor from parameters.
    pub fn new(params: ConvolutionParameters<T>) -> Self {
        Self { params }
    }

    /// The active parameters.
    pub fn parameters(&self) -> &ConvolutionParameters<T> {
        &self.params
    }

    /// Shortcut to set the filter kernel; the other parameters remain
    /// unchanged.
    pub fn set_kernel(&mut self, kernel: impl Into<FilterKernel<T>>) {
        self.params.kernel = Some(kernel.into());
    }

    /// Set a dense 2D kernel, decomposing it into a separable kernel when
    /// that succeeds within `max_dev` per element.
    pub fn set_kernel_separated(&mut self, kernel: Kernel2D<T>, max_dev: f64) {
        match SeparableKernel::separate(&kernel, max_dev) {
            Some(sep) => {
                log::debug!(
                    "separated a {}x{} kernel into {} pair(s)",
                    kernel.rows(),
                    kernel.cols(),
                    sep.num_pairs()
                );
                self.params.kernel = Some(sep.into());
            }
            None => {
                log::debug!(
                    "{}x{} kernel not separable within {max_dev}, keeping the dense path",
                    kernel.rows(),
                    kernel.cols()
                );
                self.params.kernel = Some(kernel.into());
            }
        }
    }

    /// Set the border policy; the other parameters remain unchanged.
    pub fn set_border(&mut self, border: BorderType) {
        self.params.border = border;
    }

    /// Filter `src` into `dst`, reallocating `dst` to `src`'s size.
    ///
    /// # Errors
    ///
    /// Fails when no kernel is set or a 1D kernel is bound (1D kernels
    /// filter vectors through [`Convolution::apply_vector`]).
    pub fn apply(&self, src: &Array2<T>, dst: &mut Array2<T>) -> Result<(), FilterError> {
        let kernel = self.params.kernel.as_ref().ok_or(FilterError::NoKernelSet)?;
        engine::apply_kernel(
            src,
            dst,
            kernel,
            self.params.border,
            &Sum::<T>::default(),
            self.params.strategy,
        )
    }

    /// Filter `srcdest` in place.
    pub fn apply_inplace(&self, srcdest: &mut Array2<T>) -> Result<(), FilterError> {
        let src = srcdest.clone();
        self.apply(&src, srcdest)
    }

    /// Filter a vector with the bound 1D kernel.
    pub fn apply_vector(&self, src: &Array1<T>, dst: &mut Array1<T>) -> Result<(), FilterError> {
        let kernel = self.params.kernel.as_ref().ok_or(FilterError::NoKernelSet)?;
        let proto = Sum::<T>::default();
        match kernel {
            FilterKernel::OneD(k) => {
                engine::filter_vector(src, dst, k, self.params.border, &proto)
            }
            _ => Err(FilterError::UnsupportedKernel(
                "vectors are filtered with a 1D kernel",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::kernel::Kernel1D;
    use crate::filter::kernels::{box_kernel_1d, gaussian_kernel_1d, gaussian_kernel_2d};
    use filtra_array::ArraySize;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_array(rows: usize, cols: usize, seed: u64) -> Array2<f32> {
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..rows * cols).map(|_| rng.random_range(0.0..1.0)).collect();
        Array2::new(ArraySize { rows, cols }, data).unwrap()
    }

    #[test]
    fn test_identity_kernel_returns_source() {
        let src = random_array(5, 7, 1);
        let mut conv = Convolution::default();
        conv.set_kernel(Kernel2D::centered(1, 1, vec![1.0f32]).unwrap());

        for border in [
            BorderType::Zero,
            BorderType::Mirror,
            BorderType::Periodic,
            BorderType::Constant,
        ] {
            let mut functor = conv.clone();
            functor.set_border(border);
            let mut dst = Array2::default();
            functor.apply(&src, &mut dst).unwrap();
            assert_eq!(dst.as_slice(), src.as_slice());
        }
    }

    #[test]
    fn test_separable_matches_dense_2d() {
        let src = random_array(9, 8, 2);

        let sep = gaussian_kernel_2d::<f32>(5, 1.2);
        let dense = sep.to_kernel2d().unwrap();

        let mut conv_sep = Convolution::default();
        conv_sep.set_kernel(sep);
        conv_sep.set_border(BorderType::Mirror);
        let mut out_sep = Array2::default();
        conv_sep.apply(&src, &mut out_sep).unwrap();

        let mut conv_dense = Convolution::default();
        conv_dense.set_kernel(dense);
        conv_dense.set_border(BorderType::Mirror);
        let mut out_dense = Array2::default();
        conv_dense.apply(&src, &mut out_dense).unwrap();

        for (a, b) in out_sep.as_slice().iter().zip(out_dense.as_slice()) {
            assert!((a - b).abs() < 1e-5, "{a} vs {b}");
        }
    }

    #[test]
    fn test_set_kernel_separated_decomposes_gaussian() {
        let dense = gaussian_kernel_2d::<f32>(5, 1.0).to_kernel2d().unwrap();
        let mut conv = Convolution::default();
        conv.set_kernel_separated(dense, 1e-5);
        assert!(matches!(
            conv.parameters().kernel,
            Some(FilterKernel::Separable(_))
        ));
    }

    #[test]
    fn test_impulse_response_is_kernel() {
        // convolving an impulse reproduces the kernel taps
        let src = Array1::new(vec![0.0f32, 0.0, 1.0, 0.0, 0.0]);
        let mut conv = Convolution::default();
        conv.set_kernel(Kernel1D::centered(vec![1.0f32, 2.0, 3.0]).unwrap());
        let mut dst = Array1::default();
        conv.apply_vector(&src, &mut dst).unwrap();
        assert_eq!(dst.as_slice(), &[0.0, 1.0, 2.0, 3.0, 0.0]);
    }

    #[test]
    fn test_fixed_point_norm_round_trip() {
        // i32 kernel [64, 128, 64] with norm 256 is the fixed-point image of
        // [0.25, 0.5, 0.25]; both paths must agree within rounding
        let src_u8 =
            Array2::<u8>::new(ArraySize { rows: 1, cols: 5 }, vec![10, 50, 200, 30, 90])
                .unwrap();
        let src_f32 = src_u8.map(|&v| v as f32);
        let src_i32 = src_u8.map(|&v| v as i32);

        let mut k_i32 = Kernel1D::new(vec![64i32, 128, 64], 1).unwrap();
        k_i32.set_norm(256);
        let mut id_i32 = Kernel1D::new(vec![1i32], 0).unwrap();
        id_i32.set_norm(1);

        let mut conv_i32 = Convolution::default();
        conv_i32.set_kernel(FilterKernel::Separable(SeparableKernel::from_pair(
            k_i32, id_i32,
        )));
        conv_i32.set_border(BorderType::Constant);
        let mut out_i32 = Array2::default();
        conv_i32.apply(&src_i32, &mut out_i32).unwrap();

        let k_f32 = Kernel1D::centered(vec![0.25f32, 0.5, 0.25]).unwrap();
        let mut conv_f32 = Convolution::default();
        conv_f32.set_kernel(FilterKernel::Separable(SeparableKernel::from_pair(
            k_f32,
            Kernel1D::new(vec![1.0f32], 0).unwrap(),
        )));
        conv_f32.set_border(BorderType::Constant);
        let mut out_f32 = Array2::default();
        conv_f32.apply(&src_f32, &mut out_f32).unwrap();

        for (i, (&fixed, &float)) in out_i32
            .as_slice()
            .iter()
            .zip(out_f32.as_slice())
            .enumerate()
        {
            assert!(
                (fixed as f32 - float).abs() <= 1.0,
                "element {i}: {fixed} vs {float}"
            );
        }
    }

    #[test]
    fn test_serial_and_parallel_agree() {
        let src = random_array(16, 16, 3);
        let kernel = gaussian_kernel_2d::<f32>(5, 1.0);

        let mut serial = Convolution::new(ConvolutionParameters {
            kernel: Some(kernel.clone().into()),
            border: BorderType::Mirror,
            strategy: ExecutionStrategy::Serial,
        });
        let mut out_serial = Array2::default();
        serial.apply(&src, &mut out_serial).unwrap();

        serial.params.strategy = ExecutionStrategy::Parallel;
        let mut out_parallel = Array2::default();
        serial.apply(&src, &mut out_parallel).unwrap();

        assert_eq!(out_serial.as_slice(), out_parallel.as_slice());
    }

    #[test]
    fn test_missing_kernel_fails() {
        let conv = Convolution::<f32>::default();
        let mut dst = Array2::default();
        assert_eq!(
            conv.apply(&random_array(2, 2, 4), &mut dst),
            Err(FilterError::NoKernelSet)
        );
    }

    #[test]
    fn test_kernel_container_mismatch() {
        let mut conv = Convolution::default();
        conv.set_kernel(Kernel1D::centered(vec![1.0f32]).unwrap());
        let mut dst = Array2::default();
        assert!(matches!(
            conv.apply(&random_array(2, 2, 5), &mut dst),
            Err(FilterError::UnsupportedKernel(_))
        ));

        conv.set_kernel(Kernel2D::centered(1, 1, vec![1.0f32]).unwrap());
        let mut vdst = Array1::default();
        assert!(matches!(
            conv.apply_vector(&Array1::new(vec![1.0f32]), &mut vdst),
            Err(FilterError::UnsupportedKernel(_))
        ));
    }

    #[test]
    fn test_apply_inplace() {
        let src = random_array(6, 6, 6);
        let mut conv = Convolution::default();
        conv.set_kernel(gaussian_kernel_2d::<f32>(3, 0.8));
        conv.set_border(BorderType::Mirror);

        let mut expected = Array2::default();
        conv.apply(&src, &mut expected).unwrap();

        let mut inplace = src.clone();
        conv.apply_inplace(&mut inplace).unwrap();
        assert_eq!(inplace.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_box_blur_smooths_vector() {
        let src = Array1::new(vec![0.0f32, 0.0, 9.0, 0.0, 0.0]);
        let mut conv = Convolution::default();
        conv.set_kernel(box_kernel_1d::<f32>(3));
        conv.set_border(BorderType::Zero);
        let mut dst = Array1::default();
        conv.apply_vector(&src, &mut dst).unwrap();
        for (a, b) in dst.as_slice().iter().zip([0.0f32, 3.0, 3.0, 3.0, 0.0]) {
            assert!((a - b).abs() < 1e-5, "{a} vs {b}");
        }
    }

    #[test]
    fn test_gaussian_1d_symmetric_path_matches_naive() {
        // the paired symmetric path must agree with a hand-rolled sum
        let src = Array1::new(vec![1.0f32, 4.0, 2.0, 8.0, 5.0, 7.0, 3.0]);
        let kernel = gaussian_kernel_1d::<f32>(5, 1.0);
        assert_eq!(
            kernel.symmetry(),
            crate::filter::kernel::KernelSymmetry::Symmetric
        );

        let mut conv = Convolution::default();
        conv.set_kernel(kernel.clone());
        conv.set_border(BorderType::NoBoundary);
        let mut dst = Array1::default();
        conv.apply_vector(&src, &mut dst).unwrap();

        for i in 2..5 {
            let mut naive = 0.0f32;
            for j in -2isize..=2 {
                naive += kernel.at(j).unwrap() * src[(i as isize - j) as usize];
            }
            assert!((dst[i] - naive).abs() < 1e-5);
        }
    }
}
