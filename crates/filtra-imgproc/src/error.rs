use filtra_array::ArrayError;

/// An error type for the filtering operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// No kernel has been set in the functor parameters.
    #[error("no kernel set in the parameters")]
    NoKernelSet,

    /// A kernel with no taps was supplied.
    #[error("kernel has no taps")]
    EmptyKernel,

    /// The kernel representation cannot be applied to the given container.
    #[error("kernel cannot be applied to this container: {0}")]
    UnsupportedKernel(&'static str),

    /// Border widths foreshorten the output to a non-positive dimension.
    #[error("border widths ({top}, {bottom}, {left}, {right}) foreshorten a {rows}x{cols} array to nothing")]
    InvalidBorderWidths {
        /// Top border width.
        top: isize,
        /// Bottom border width.
        bottom: isize,
        /// Left border width.
        left: isize,
        /// Right border width.
        right: isize,
        /// Source rows.
        rows: usize,
        /// Source columns.
        cols: usize,
    },

    /// Error from the array container.
    #[error(transparent)]
    Array(#[from] ArrayError),
}
