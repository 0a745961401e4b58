//! Filter kernel generators.
//!
//! Fixed-point element types receive taps scaled by their suggested norm
//! (see [`crate::filter::Kernel1D::norm`]); floating point types receive the
//! real-valued taps directly.

use filtra_array::Element;

use crate::filter::kernel::{Kernel1D, SeparableKernel};

/// Create a centered box (averaging) kernel.
///
/// # Panics
///
/// Panics if `size` is zero.
pub fn box_kernel_1d<T: Element>(size: usize) -> Kernel1D<T> {
    assert!(size > 0, "box kernel size must be positive");
    let norm = T::suggested_norm().to_f64();
    let tap = T::from_f64(norm / size as f64);
    Kernel1D::new(vec![tap; size], size as isize / 2).expect("box kernel has taps")
}

/// Create a centered 1D gaussian kernel with unit tap sum.
///
/// # Panics
///
/// Panics if `size` is zero or `sigma` is not positive.
pub fn gaussian_kernel_1d<T: Element>(size: usize, sigma: f64) -> Kernel1D<T> {
    assert!(size > 0, "gaussian kernel size must be positive");
    assert!(sigma > 0.0, "gaussian sigma must be positive");

    let mean = (size - 1) as f64 / 2.0;
    let sigma_sq = sigma * sigma;

    let mut taps = Vec::with_capacity(size);
    for i in 0..size {
        let x = i as f64 - mean;
        taps.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    let sum: f64 = taps.iter().sum();
    let norm = T::suggested_norm().to_f64();
    let data = taps.iter().map(|&t| T::from_f64(t / sum * norm)).collect();

    Kernel1D::new(data, size as isize / 2).expect("gaussian kernel has taps")
}

/// Create a separable 2D gaussian kernel (one row/column pair).
///
/// # Panics
///
/// Panics if `size` is zero or `sigma` is not positive.
pub fn gaussian_kernel_2d<T: Element>(size: usize, sigma: f64) -> SeparableKernel<T> {
    SeparableKernel::from_pair(
        gaussian_kernel_1d(size, sigma),
        gaussian_kernel_1d(size, sigma),
    )
}

/// Create the separable sobel kernel for gradients along the column (x)
/// direction: a `[-1, 0, 1]` derivative across columns smoothed by
/// `[1, 2, 1]` across rows.
///
/// Only meaningful for signed element types.
pub fn sobel_kernel_x<T: Element>() -> SeparableKernel<T> {
    let norm = T::suggested_norm().to_f64();
    let row = [-1.0, 0.0, 1.0].map(|v| T::from_f64(v * norm)).to_vec();
    let col = [1.0, 2.0, 1.0].map(|v| T::from_f64(v * norm)).to_vec();
    SeparableKernel::from_pair(
        Kernel1D::new(row, 1).expect("sobel row taps"),
        Kernel1D::new(col, 1).expect("sobel col taps"),
    )
}

/// Create the separable sobel kernel for gradients along the row (y)
/// direction.
///
/// Only meaningful for signed element types.
pub fn sobel_kernel_y<T: Element>() -> SeparableKernel<T> {
    let norm = T::suggested_norm().to_f64();
    let row = [1.0, 2.0, 1.0].map(|v| T::from_f64(v * norm)).to_vec();
    let col = [-1.0, 0.0, 1.0].map(|v| T::from_f64(v * norm)).to_vec();
    SeparableKernel::from_pair(
        Kernel1D::new(row, 1).expect("sobel row taps"),
        Kernel1D::new(col, 1).expect("sobel col taps"),
    )
}
