use filtra_array::{Array1, Array2, Element};
use num_traits::{One, Zero};

use crate::error::FilterError;
use crate::filter::accumulator::{Accumulator, Sum};
use crate::filter::engine;
use crate::filter::kernel::FilterKernel;
use crate::padding::BorderType;
use crate::parallel::ExecutionStrategy;

/// Operating mode of the [`Correlation`] functor, selecting the accumulator
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CorrelationMode {
    /// The plain sliding dot product. Accumulation math is identical to
    /// convolution; the kernel is simply not flipped against the signal.
    #[default]
    Classic,
    /// The normalized cross-correlation coefficient in [-1, 1], scaled by
    /// the element norm for fixed-point types. Degenerate windows (constant
    /// kernel or patch) yield 0.
    Coefficient,
    /// Matching criterion C1 (Sonka et al.): 1 / (max |Δ| + 1).
    Criterion1,
    /// Matching criterion C2: 1 / (Σ |Δ| + 1).
    Criterion2,
    /// Matching criterion C3: 1 / (Σ Δ² + 1).
    Criterion3,
}

#[inline]
fn abs_diff<U: PartialOrd + std::ops::Sub<Output = U>>(a: U, b: U) -> U {
    if a > b {
        a - b
    } else {
        b - a
    }
}

/// Normalized cross-correlation coefficient accumulator.
///
/// Maintains five running sums over the window: Σ(w−w̄), Σ(w−w̄)², Σf·(w−w̄),
/// Σf² and Σf, where w̄ is the precomputed kernel tap average. The functor
/// feeds the average and the kernel size in through
/// [`Coefficient::set_data`] before the pass; [`Accumulator::reset`] clears
/// only the sums.
#[derive(Debug, Clone)]
pub struct Coefficient<T: Element> {
    sum_w: f64,
    sum_ww: f64,
    sum_fw: f64,
    sum_ff: f64,
    sum_f: f64,
    kern_avg: f64,
    kern_size: f64,
    norm: f64,
    _element: std::marker::PhantomData<T>,
}

impl<T: Element> Default for Coefficient<T> {
    fn default() -> Self {
        Self {
            sum_w: 0.0,
            sum_ww: 0.0,
            sum_fw: 0.0,
            sum_ff: 0.0,
            sum_f: 0.0,
            kern_avg: 0.0,
            kern_size: 1.0,
            norm: T::suggested_norm().to_f64(),
            _element: std::marker::PhantomData,
        }
    }
}

impl<T: Element> Coefficient<T> {
    /// Set the precomputed kernel tap average and kernel size.
    pub fn set_data(&mut self, kernel_average: f64, kernel_size: f64) {
        self.kern_avg = kernel_average;
        self.kern_size = kernel_size.max(1.0);
    }

    #[inline]
    fn feed(&mut self, tap: f64, sample: f64) {
        let tmp = tap - self.kern_avg;
        self.sum_w += tmp;
        self.sum_ww += tmp * tmp;
        self.sum_fw += sample * tmp;
        self.sum_ff += sample * sample;
        self.sum_f += sample;
    }
}

impl<T: Element> Accumulator<T> for Coefficient<T> {
    fn reset(&mut self) {
        self.sum_w = 0.0;
        self.sum_ww = 0.0;
        self.sum_fw = 0.0;
        self.sum_ff = 0.0;
        self.sum_f = 0.0;
    }

    fn accumulate(&mut self, tap: T, sample: T) {
        self.feed(tap.to_f64(), sample.to_f64());
    }

    fn accumulate_zero(&mut self, sample: T) {
        self.feed(0.0, sample.to_f64());
    }

    fn accumulate_sym(&mut self, tap: T, left: T, right: T) {
        self.accumulate(tap, left);
        self.accumulate(tap, right);
    }

    fn accumulate_asym(&mut self, tap: T, left: T, right: T) {
        self.accumulate(tap, left);
        self.feed(-tap.to_f64(), right.to_f64());
    }

    fn set_norm(&mut self, norm: T) {
        self.norm = norm.to_f64();
    }

    fn result(&self) -> T {
        let denom = (self.sum_ff - self.sum_f * self.sum_f / self.kern_size) * self.sum_ww;
        if denom > 0.0 {
            let coeff = (self.sum_fw - self.sum_f * self.sum_w / self.kern_size) / denom.sqrt();
            T::from_f64(coeff * self.norm)
        } else {
            T::zero()
        }
    }
}

/// Matching criterion C1: the running state is `max |tap − sample|`.
#[derive(Debug, Clone)]
pub struct Criterion1<T: Element> {
    state: T::Acc,
}

impl<T: Element> Default for Criterion1<T> {
    fn default() -> Self {
        Self {
            state: T::Acc::zero(),
        }
    }
}

impl<T: Element> Accumulator<T> for Criterion1<T> {
    fn reset(&mut self) {
        self.state = T::Acc::zero();
    }

    fn accumulate(&mut self, tap: T, sample: T) {
        let d = abs_diff(sample.to_acc(), tap.to_acc());
        if d > self.state {
            self.state = d;
        }
    }

    fn accumulate_zero(&mut self, sample: T) {
        self.accumulate(T::zero(), sample);
    }

    fn accumulate_sym(&mut self, tap: T, left: T, right: T) {
        self.accumulate(tap, left);
        self.accumulate(tap, right);
    }

    fn accumulate_asym(&mut self, tap: T, left: T, right: T) {
        self.accumulate(tap, left);
        let d = abs_diff(right.to_acc(), T::Acc::zero() - tap.to_acc());
        if d > self.state {
            self.state = d;
        }
    }

    fn set_norm(&mut self, _norm: T) {}

    fn result(&self) -> T {
        T::from_acc(T::Acc::one() / (self.state + T::Acc::one()))
    }
}

/// Matching criterion C2: the running state is `Σ |tap − sample|`.
#[derive(Debug, Clone)]
pub struct Criterion2<T: Element> {
    state: T::Acc,
}

impl<T: Element> Default for Criterion2<T> {
    fn default() -> Self {
        Self {
            state: T::Acc::zero(),
        }
    }
}

impl<T: Element> Accumulator<T> for Criterion2<T> {
    fn reset(&mut self) {
        self.state = T::Acc::zero();
    }

    fn accumulate(&mut self, tap: T, sample: T) {
        self.state = self.state + abs_diff(sample.to_acc(), tap.to_acc());
    }

    fn accumulate_zero(&mut self, sample: T) {
        self.accumulate(T::zero(), sample);
    }

    fn accumulate_sym(&mut self, tap: T, left: T, right: T) {
        self.accumulate(tap, left);
        self.accumulate(tap, right);
    }

    fn accumulate_asym(&mut self, tap: T, left: T, right: T) {
        self.accumulate(tap, left);
        self.state = self.state + abs_diff(right.to_acc(), T::Acc::zero() - tap.to_acc());
    }

    fn set_norm(&mut self, _norm: T) {}

    fn result(&self) -> T {
        T::from_acc(T::Acc::one() / (self.state + T::Acc::one()))
    }
}

/// Matching criterion C3: the running state is `Σ (tap − sample)²`.
#[derive(Debug, Clone)]
pub struct Criterion3<T: Element> {
    state: T::Acc,
}

impl<T: Element> Default for Criterion3<T> {
    fn default() -> Self {
        Self {
            state: T::Acc::zero(),
        }
    }
}

impl<T: Element> Accumulator<T> for Criterion3<T> {
    fn reset(&mut self) {
        self.state = T::Acc::zero();
    }

    fn accumulate(&mut self, tap: T, sample: T) {
        let d = tap.to_acc() - sample.to_acc();
        self.state = self.state + d * d;
    }

    fn accumulate_zero(&mut self, sample: T) {
        let s = sample.to_acc();
        self.state = self.state + s * s;
    }

    fn accumulate_sym(&mut self, tap: T, left: T, right: T) {
        self.accumulate(tap, left);
        self.accumulate(tap, right);
    }

    fn accumulate_asym(&mut self, tap: T, left: T, right: T) {
        self.accumulate(tap, left);
        let d = T::Acc::zero() - tap.to_acc() - right.to_acc();
        self.state = self.state + d * d;
    }

    fn set_norm(&mut self, _norm: T) {}

    fn result(&self) -> T {
        T::from_acc(T::Acc::one() / (self.state + T::Acc::one()))
    }
}

/// Parameters of the [`Correlation`] functor.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrelationParameters<T: Element> {
    /// The filter kernel, stored pre-mirrored (see
    /// [`Correlation::set_kernel`]).
    pub kernel: Option<FilterKernel<T>>,
    /// Border policy used to expand the source.
    pub border: BorderType,
    /// The accumulator variant to run.
    pub mode: CorrelationMode,
    /// Execution strategy for the filtering loops.
    pub strategy: ExecutionStrategy,
}

/// Correlation functor.
///
/// Slides the kernel over the source without flipping it against the signal.
/// The engine itself computes convolutions, so [`Correlation::set_kernel`]
/// stores the kernel pre-mirrored; this mirroring is the sole engine-level
/// difference between correlation and convolution. The
/// [`CorrelationMode`] selects between the plain dot product and the
/// template-matching measures.
#[derive(Debug, Clone, Default)]
pub struct Correlation<T: Element> {
    params: CorrelationParameters<T>,
}

impl<T: Element> Correlation<T> {
    /// Create the functor from parameters. The kernel in `params` must
    /// already be stored mirrored (as [`Correlation::set_kernel`] does).
    pub fn new(params: CorrelationParameters<T>) -> Self {
        Self { params }
    }

    /// The active parameters.
    pub fn parameters(&self) -> &CorrelationParameters<T> {
        &self.params
    }

    /// Shortcut to set the filter kernel; the other parameters remain
    /// unchanged. The kernel is mirrored here, once, so the engine's
    /// convolution pass computes correlation.
    pub fn set_kernel(&mut self, kernel: impl Into<FilterKernel<T>>) {
        self.params.kernel = Some(kernel.into().mirror());
    }

    /// Set the operating mode; the other parameters remain unchanged.
    pub fn set_mode(&mut self, mode: CorrelationMode) {
        self.params.mode = mode;
    }

    /// Set the border policy; the other parameters remain unchanged.
    pub fn set_border(&mut self, border: BorderType) {
        self.params.border = border;
    }

    /// Correlate `src` into `dst`, reallocating `dst` to `src`'s size.
    pub fn apply(&self, src: &Array2<T>, dst: &mut Array2<T>) -> Result<(), FilterError> {
        let kernel = self.params.kernel.as_ref().ok_or(FilterError::NoKernelSet)?;
        match self.params.mode {
            CorrelationMode::Classic => self.run(kernel, src, dst, Sum::default()),
            CorrelationMode::Coefficient => {
                let mut proto = Coefficient::default();
                let (avg, size) = kernel_stats(kernel)?;
                proto.set_data(avg, size);
                self.run(kernel, src, dst, proto)
            }
            CorrelationMode::Criterion1 => self.run(kernel, src, dst, Criterion1::default()),
            CorrelationMode::Criterion2 => self.run(kernel, src, dst, Criterion2::default()),
            CorrelationMode::Criterion3 => self.run(kernel, src, dst, Criterion3::default()),
        }
    }

    /// Correlate `srcdest` in place.
    pub fn apply_inplace(&self, srcdest: &mut Array2<T>) -> Result<(), FilterError> {
        let src = srcdest.clone();
        self.apply(&src, srcdest)
    }

    /// Correlate a vector with the bound 1D kernel.
    pub fn apply_vector(&self, src: &Array1<T>, dst: &mut Array1<T>) -> Result<(), FilterError> {
        let kernel = self.params.kernel.as_ref().ok_or(FilterError::NoKernelSet)?;
        match kernel {
            FilterKernel::OneD(k) => match self.params.mode {
                CorrelationMode::Classic => {
                    engine::filter_vector(src, dst, k, self.params.border, &Sum::default())
                }
                CorrelationMode::Coefficient => {
                    let mut proto = Coefficient::default();
                    let (avg, size) = kernel_stats(kernel)?;
                    proto.set_data(avg, size);
                    engine::filter_vector(src, dst, k, self.params.border, &proto)
                }
                CorrelationMode::Criterion1 => {
                    engine::filter_vector(src, dst, k, self.params.border, &Criterion1::default())
                }
                CorrelationMode::Criterion2 => {
                    engine::filter_vector(src, dst, k, self.params.border, &Criterion2::default())
                }
                CorrelationMode::Criterion3 => {
                    engine::filter_vector(src, dst, k, self.params.border, &Criterion3::default())
                }
            },
            _ => Err(FilterError::UnsupportedKernel(
                "vectors are correlated with a 1D kernel",
            )),
        }
    }

    fn run<A>(
        &self,
        kernel: &FilterKernel<T>,
        src: &Array2<T>,
        dst: &mut Array2<T>,
        proto: A,
    ) -> Result<(), FilterError>
    where
        A: Accumulator<T> + Send + Sync,
    {
        engine::apply_kernel(src, dst, kernel, self.params.border, &proto, self.params.strategy)
    }
}

/// Raw tap average and tap count of a kernel, as the coefficient accumulator
/// needs them.
fn kernel_stats<T: Element>(kernel: &FilterKernel<T>) -> Result<(f64, f64), FilterError> {
    let (sum, count) = match kernel {
        FilterKernel::OneD(k) => (
            k.taps().iter().map(|&t| t.to_f64()).sum::<f64>(),
            k.len() as f64,
        ),
        FilterKernel::TwoD(k) => (
            k.taps().iter().map(|&t| t.to_f64()).sum::<f64>(),
            k.taps().len() as f64,
        ),
        FilterKernel::Separable(k) => {
            let dense = k.to_kernel2d()?;
            (
                dense.taps().iter().map(|&t| t.to_f64()).sum::<f64>(),
                dense.taps().len() as f64,
            )
        }
    };
    Ok((sum / count.max(1.0), count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::kernel::{Kernel1D, Kernel2D};
    use filtra_array::ArraySize;

    #[test]
    fn test_classic_does_not_flip_the_kernel() {
        // correlating an impulse reproduces the kernel taps reversed
        let src = Array1::new(vec![0.0f32, 0.0, 1.0, 0.0, 0.0]);
        let mut corr = Correlation::default();
        corr.set_kernel(Kernel1D::centered(vec![1.0f32, 2.0, 3.0]).unwrap());
        let mut dst = Array1::default();
        corr.apply_vector(&src, &mut dst).unwrap();
        assert_eq!(dst.as_slice(), &[0.0, 3.0, 2.0, 1.0, 0.0]);
    }

    fn template() -> Kernel2D<f32> {
        Kernel2D::centered(
            3,
            3,
            vec![1.0, 5.0, 2.0, 8.0, 3.0, 9.0, 4.0, 7.0, 6.0],
        )
        .unwrap()
    }

    /// 7x7 source with the template pattern centered at (3, 3).
    fn scene() -> Array2<f32> {
        let mut src = Array2::from_size_val(ArraySize { rows: 7, cols: 7 }, 0.5);
        let t = template();
        for r in 0..3isize {
            for c in 0..3isize {
                src[((2 + r) as usize, (2 + c) as usize)] = *t.at(r - 1, c - 1).unwrap();
            }
        }
        src
    }

    #[test]
    fn test_coefficient_peaks_at_exact_match() {
        let mut corr = Correlation::default();
        corr.set_kernel(template());
        corr.set_mode(CorrelationMode::Coefficient);
        corr.set_border(BorderType::NoBoundary);

        let src = scene();
        let mut dst = Array2::default();
        corr.apply(&src, &mut dst).unwrap();

        assert!((dst[(3, 3)] - 1.0).abs() < 1e-5, "peak {}", dst[(3, 3)]);
        for r in 1..6 {
            for c in 1..6 {
                if (r, c) != (3, 3) {
                    assert!(dst[(r, c)] < dst[(3, 3)]);
                }
            }
        }
    }

    #[test]
    fn test_coefficient_is_invariant_to_linear_patch_transforms() {
        let mut corr = Correlation::default();
        corr.set_kernel(template());
        corr.set_mode(CorrelationMode::Coefficient);
        corr.set_border(BorderType::NoBoundary);

        let scaled = scene().map(|&v| v * 3.0 + 10.0);
        let mut dst = Array2::default();
        corr.apply(&scaled, &mut dst).unwrap();
        assert!((dst[(3, 3)] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_coefficient_degenerate_patch_yields_zero() {
        let mut corr = Correlation::default();
        corr.set_kernel(template());
        corr.set_mode(CorrelationMode::Coefficient);
        corr.set_border(BorderType::NoBoundary);

        let flat = Array2::from_size_val(ArraySize { rows: 5, cols: 5 }, 4.2);
        let mut dst = Array2::default();
        corr.apply(&flat, &mut dst).unwrap();
        assert_eq!(dst[(2, 2)], 0.0);
    }

    #[test]
    fn test_criteria_peak_at_exact_match() {
        for mode in [
            CorrelationMode::Criterion1,
            CorrelationMode::Criterion2,
            CorrelationMode::Criterion3,
        ] {
            let mut corr = Correlation::default();
            corr.set_kernel(template());
            corr.set_mode(mode);
            corr.set_border(BorderType::NoBoundary);

            let src = scene();
            let mut dst = Array2::default();
            corr.apply(&src, &mut dst).unwrap();

            assert_eq!(dst[(3, 3)], 1.0, "{mode:?} must be 1 at a perfect match");
            for r in 1..6 {
                for c in 1..6 {
                    if (r, c) != (3, 3) {
                        assert!(
                            dst[(r, c)] < 1.0,
                            "{mode:?} at ({r},{c}) = {}",
                            dst[(r, c)]
                        );
                        assert!(dst[(r, c)] >= 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_criterion3_formula() {
        // single-tap kernel: state is (tap - sample)^2 per window
        let src = Array1::new(vec![2.0f32, 3.0, 5.0]);
        let mut corr = Correlation::default();
        corr.set_kernel(Kernel1D::new(vec![3.0f32], 0).unwrap());
        corr.set_mode(CorrelationMode::Criterion3);
        corr.set_border(BorderType::NoBoundary);
        let mut dst = Array1::default();
        corr.apply_vector(&src, &mut dst).unwrap();
        assert_eq!(dst.as_slice(), &[1.0 / 2.0, 1.0, 1.0 / 5.0]);
    }

    #[test]
    fn test_classic_symmetric_kernel_equals_convolution() {
        // for a symmetric kernel, mirroring is the identity, so classic
        // correlation and convolution coincide
        use crate::filter::convolution::Convolution;
        use crate::filter::kernels::gaussian_kernel_2d;

        let mut src = Array2::from_size_val(ArraySize { rows: 6, cols: 6 }, 0.0f32);
        src[(2, 3)] = 1.0;
        src[(4, 1)] = 0.5;

        let kernel = gaussian_kernel_2d::<f32>(3, 0.9);

        let mut corr = Correlation::default();
        corr.set_kernel(kernel.clone());
        corr.set_border(BorderType::Mirror);
        let mut out_corr = Array2::default();
        corr.apply(&src, &mut out_corr).unwrap();

        let mut conv = Convolution::default();
        conv.set_kernel(kernel);
        conv.set_border(BorderType::Mirror);
        let mut out_conv = Array2::default();
        conv.apply(&src, &mut out_conv).unwrap();

        assert_eq!(out_corr.as_slice(), out_conv.as_slice());
    }

    #[test]
    fn test_missing_kernel_fails() {
        let corr = Correlation::<f32>::default();
        let mut dst = Array2::default();
        assert_eq!(
            corr.apply(&scene(), &mut dst),
            Err(FilterError::NoKernelSet)
        );
    }
}
