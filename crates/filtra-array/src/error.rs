/// An error type for the array module.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ArrayError {
    /// Error when the data length does not match the requested shape.
    #[error("Data length ({0}) does not match the array size ({1})")]
    InvalidDataLength(usize, usize),

    /// Error when two arrays that must agree in shape do not.
    #[error("Array sizes do not match ({0}x{1} vs {2}x{3})")]
    DimensionMismatch(usize, usize, usize, usize),
}
