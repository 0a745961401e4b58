#![deny(missing_docs)]
//! Numeric array containers and element traits for the filtra toolkit.

/// Row-major 1D/2D array containers.
pub mod array;

/// Element trait binding scalar types to accumulation types and norms.
pub mod element;

/// Error types for the array module.
pub mod error;

/// Elementwise operations on arrays.
pub mod ops;

pub use crate::array::{Array1, Array2, ArraySize};
pub use crate::element::{cast_and_scale, Element};
pub use crate::error::ArrayError;
