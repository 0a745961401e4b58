//! Structuring element generators.
//!
//! Elements carry taps of 1 where the neighborhood is included and 0 where it
//! is not; the kernel norm doubles as the "on" output value of the binary
//! accumulators.

use filtra_array::Element;
use num_traits::{One, Zero};

use crate::filter::{Kernel1D, Kernel2D, SeparableKernel};

/// A filled, centered rectangular structuring element.
///
/// # Panics
///
/// Panics if either dimension is zero.
pub fn box_structuring_element<T: Element>(rows: usize, cols: usize) -> Kernel2D<T> {
    assert!(rows > 0 && cols > 0, "structuring element must be non-empty");
    Kernel2D::centered(rows, cols, vec![T::one(); rows * cols])
        .expect("box structuring element has taps")
}

/// The same rectangle as [`box_structuring_element`], as one separable
/// row/column pair for the O(rows + cols) two-pass path.
///
/// # Panics
///
/// Panics if either dimension is zero.
pub fn box_structuring_element_separable<T: Element>(
    rows: usize,
    cols: usize,
) -> SeparableKernel<T> {
    assert!(rows > 0 && cols > 0, "structuring element must be non-empty");
    SeparableKernel::from_pair(
        Kernel1D::centered(vec![T::one(); cols]).expect("box row taps"),
        Kernel1D::centered(vec![T::one(); rows]).expect("box col taps"),
    )
}

/// A centered plus-shaped structuring element of side length `size`.
///
/// # Panics
///
/// Panics if `size` is zero.
pub fn cross_structuring_element<T: Element>(size: usize) -> Kernel2D<T> {
    assert!(size > 0, "structuring element must be non-empty");
    let center = size / 2;
    let mut data = vec![T::zero(); size * size];
    for i in 0..size {
        data[center * size + i] = T::one();
        data[i * size + center] = T::one();
    }
    Kernel2D::centered(size, size, data).expect("cross structuring element has taps")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_is_filled_and_centered() {
        let k = box_structuring_element::<u8>(3, 5);
        assert_eq!(k.rows(), 3);
        assert_eq!(k.cols(), 5);
        assert_eq!(k.first_row(), -1);
        assert_eq!(k.first_col(), -2);
        assert!(k.taps().iter().all(|&t| t == 1));
        assert_eq!(k.norm(), 255);
    }

    #[test]
    fn test_cross_shape() {
        let k = cross_structuring_element::<f32>(3);
        assert_eq!(
            k.taps(),
            &[0.0, 1.0, 0.0, 1.0, 1.0, 1.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_separable_box_reconstructs_dense() {
        let sep = box_structuring_element_separable::<f32>(3, 3);
        let dense = sep.to_kernel2d().unwrap();
        assert!(dense.taps().iter().all(|&t| t == 1.0));
    }
}
