use num_traits::{Bounded, Num, NumCast};

/// Trait for scalar element types stored in [`crate::Array1`] and
/// [`crate::Array2`].
///
/// Every element type carries two pieces of information the filtering code
/// relies on:
///
/// * an **accumulation type** ([`Element::Acc`]) wide enough to hold sums of
///   tap/sample products without overflowing, and
/// * a **suggested norm**, the fixed-point representation of the value 1.0.
///   Fixed-point kernels store their taps scaled by this norm; floating point
///   types use 1.0 and behave as plain arithmetic.
///
/// Suggested norms: `u8` → 255, `i32` → 65536, `f32`/`f64` → 1.
pub trait Element:
    Copy + Default + PartialOrd + Num + NumCast + Bounded + Send + Sync + 'static
{
    /// Accumulation type wide enough for running sums of products.
    type Acc: Copy + Default + PartialOrd + Num + NumCast + Bounded + Send + Sync + 'static;

    /// The fixed-point representation of the value 1.0 for this type.
    fn suggested_norm() -> Self;

    /// Widen a sample into the accumulation type.
    fn to_acc(self) -> Self::Acc;

    /// Narrow an accumulated value back to the element type, saturating for
    /// integer types.
    fn from_acc(acc: Self::Acc) -> Self;

    /// Convert the value to `f64`.
    fn to_f64(self) -> f64;

    /// Convert an `f64` back to the element type, rounding and saturating for
    /// integer types.
    fn from_f64(v: f64) -> Self;
}

impl Element for u8 {
    type Acc = i32;

    fn suggested_norm() -> Self {
        255
    }

    fn to_acc(self) -> i32 {
        self as i32
    }

    fn from_acc(acc: i32) -> Self {
        acc.clamp(0, 255) as u8
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(v: f64) -> Self {
        v.round().clamp(0.0, 255.0) as u8
    }
}

impl Element for i32 {
    type Acc = i64;

    fn suggested_norm() -> Self {
        65536
    }

    fn to_acc(self) -> i64 {
        self as i64
    }

    fn from_acc(acc: i64) -> Self {
        acc.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(v: f64) -> Self {
        v.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32
    }
}

impl Element for f32 {
    type Acc = f32;

    fn suggested_norm() -> Self {
        1.0
    }

    fn to_acc(self) -> f32 {
        self
    }

    fn from_acc(acc: f32) -> Self {
        acc
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl Element for f64 {
    type Acc = f64;

    fn suggested_norm() -> Self {
        1.0
    }

    fn to_acc(self) -> f64 {
        self
    }

    fn from_acc(acc: f64) -> Self {
        acc
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(v: f64) -> Self {
        v
    }
}

/// Convert a value between element types, rescaling through each type's
/// suggested norm.
///
/// `u8` 0..255 maps onto `f32` 0.0..1.0 and back; converting between two
/// floating point types is a plain cast since both norms are 1.
///
/// # Examples
///
/// ```
/// use filtra_array::cast_and_scale;
///
/// let v: f32 = cast_and_scale(255u8);
/// assert_eq!(v, 1.0);
/// let b: u8 = cast_and_scale(0.5f32);
/// assert_eq!(b, 128);
/// ```
pub fn cast_and_scale<T: Element, U: Element>(value: T) -> U {
    U::from_f64(value.to_f64() / T::suggested_norm().to_f64() * U::suggested_norm().to_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggested_norms() {
        assert_eq!(u8::suggested_norm(), 255);
        assert_eq!(i32::suggested_norm(), 65536);
        assert_eq!(f32::suggested_norm(), 1.0);
        assert_eq!(f64::suggested_norm(), 1.0);
    }

    #[test]
    fn test_from_acc_saturates() {
        assert_eq!(u8::from_acc(300), 255);
        assert_eq!(u8::from_acc(-5), 0);
        assert_eq!(i32::from_acc(i64::MAX), i32::MAX);
    }

    #[test]
    fn test_cast_and_scale_round_trip() {
        for v in [0u8, 1, 127, 128, 254, 255] {
            let f: f32 = cast_and_scale(v);
            let back: u8 = cast_and_scale(f);
            assert_eq!(back, v);
        }
    }

    #[test]
    fn test_cast_and_scale_float_identity() {
        let v: f64 = cast_and_scale(0.25f32);
        approx::assert_relative_eq!(v, 0.25);
    }
}
