use num_traits::Zero;

use crate::array::Array2;
use crate::element::Element;
use crate::error::ArrayError;

/// Add `src` elementwise into `dst`.
///
/// The addition runs in each element's accumulation type and saturates on the
/// way back for integer types.
///
/// # Errors
///
/// Returns an error if the shapes differ.
pub fn add_assign<T: Element>(dst: &mut Array2<T>, src: &Array2<T>) -> Result<(), ArrayError> {
    if dst.size() != src.size() {
        return Err(ArrayError::DimensionMismatch(
            dst.rows(),
            dst.cols(),
            src.rows(),
            src.cols(),
        ));
    }

    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice().iter())
        .for_each(|(d, &s)| {
            *d = T::from_acc(d.to_acc() + s.to_acc());
        });

    Ok(())
}

/// Multiply every element of `src` by `factor`, writing into `dst`.
///
/// `dst` is resized to `src`'s shape.
pub fn scale_into<T: Element>(src: &Array2<T>, dst: &mut Array2<T>, factor: T) {
    dst.resize(src.size(), T::zero());
    let f = factor.to_acc();
    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice().iter())
        .for_each(|(d, &s)| {
            *d = T::from_acc(s.to_acc() * f);
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::ArraySize;

    #[test]
    fn test_add_assign() {
        let size = ArraySize { rows: 1, cols: 3 };
        let mut a = Array2::<f32>::new(size, vec![1.0, 2.0, 3.0]).unwrap();
        let b = Array2::<f32>::new(size, vec![0.5, 0.5, 0.5]).unwrap();
        add_assign(&mut a, &b).unwrap();
        assert_eq!(a.as_slice(), &[1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_add_assign_saturates_u8() {
        let size = ArraySize { rows: 1, cols: 2 };
        let mut a = Array2::<u8>::new(size, vec![250, 1]).unwrap();
        let b = Array2::<u8>::new(size, vec![10, 1]).unwrap();
        add_assign(&mut a, &b).unwrap();
        assert_eq!(a.as_slice(), &[255, 2]);
    }

    #[test]
    fn test_add_assign_shape_mismatch() {
        let mut a = Array2::<f32>::zeros(ArraySize { rows: 1, cols: 2 });
        let b = Array2::<f32>::zeros(ArraySize { rows: 2, cols: 1 });
        assert!(add_assign(&mut a, &b).is_err());
    }

    #[test]
    fn test_scale_into() {
        let src = Array2::<f32>::new(ArraySize { rows: 1, cols: 2 }, vec![2.0, 4.0]).unwrap();
        let mut dst = Array2::default();
        scale_into(&src, &mut dst, 0.5);
        assert_eq!(dst.as_slice(), &[1.0, 2.0]);
    }
}
