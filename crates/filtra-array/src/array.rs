use num_traits::Zero;

use crate::element::Element;
use crate::error::ArrayError;

/// Array size in elements.
///
/// # Examples
///
/// ```
/// use filtra_array::ArraySize;
///
/// let size = ArraySize { rows: 3, cols: 4 };
/// assert_eq!(size.num_elements(), 12);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArraySize {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
}

impl ArraySize {
    /// Total number of elements.
    pub fn num_elements(&self) -> usize {
        self.rows * self.cols
    }
}

impl std::fmt::Display for ArraySize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ArraySize {{ rows: {}, cols: {} }}", self.rows, self.cols)
    }
}

impl From<[usize; 2]> for ArraySize {
    fn from(size: [usize; 2]) -> Self {
        ArraySize {
            rows: size[0],
            cols: size[1],
        }
    }
}

/// A dense, row-major 2D array of numeric elements.
///
/// The backing storage is a contiguous `Vec<T>`; row `r` occupies the slice
/// `[r * cols, (r + 1) * cols)`. This is the container contract the filtering
/// functors rely on for their fast forward-iteration path.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Array2<T: Element> {
    size: ArraySize,
    data: Vec<T>,
}

impl<T: Element> Default for Array2<T> {
    fn default() -> Self {
        Self {
            size: ArraySize { rows: 0, cols: 0 },
            data: Vec::new(),
        }
    }
}

impl<T: Element> Array2<T> {
    /// Create a new array from element data.
    ///
    /// # Errors
    ///
    /// Returns an error if the data length does not match the size.
    ///
    /// # Examples
    ///
    /// ```
    /// use filtra_array::{Array2, ArraySize};
    ///
    /// let arr = Array2::<f32>::new(ArraySize { rows: 2, cols: 3 }, vec![0.0; 6]).unwrap();
    /// assert_eq!(arr.rows(), 2);
    /// assert_eq!(arr.cols(), 3);
    /// ```
    pub fn new(size: ArraySize, data: Vec<T>) -> Result<Self, ArrayError> {
        if data.len() != size.num_elements() {
            return Err(ArrayError::InvalidDataLength(
                data.len(),
                size.num_elements(),
            ));
        }
        Ok(Self { size, data })
    }

    /// Create a new array filled with a single value.
    pub fn from_size_val(size: ArraySize, val: T) -> Self {
        Self {
            size,
            data: vec![val; size.num_elements()],
        }
    }

    /// Create a new array filled with zeros.
    pub fn zeros(size: ArraySize) -> Self {
        Self::from_size_val(size, T::zero())
    }

    /// The array size.
    pub fn size(&self) -> ArraySize {
        self.size
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.size.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.size.cols
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The backing storage as a contiguous slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The backing storage as a mutable contiguous slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Bounds-checked element access.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.size.rows && col < self.size.cols {
            self.data.get(row * self.size.cols + col)
        } else {
            None
        }
    }

    /// Bounds-checked mutable element access.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        if row < self.size.rows && col < self.size.cols {
            self.data.get_mut(row * self.size.cols + col)
        } else {
            None
        }
    }

    /// A single row as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.rows()`.
    pub fn row(&self, row: usize) -> &[T] {
        let cols = self.size.cols;
        &self.data[row * cols..(row + 1) * cols]
    }

    /// A single row as a mutable slice.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.rows()`.
    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        let cols = self.size.cols;
        &mut self.data[row * cols..(row + 1) * cols]
    }

    /// Resize the array, discarding the previous contents.
    ///
    /// Existing storage is reused when the element count does not grow.
    pub fn resize(&mut self, size: ArraySize, val: T) {
        self.size = size;
        self.data.clear();
        self.data.resize(size.num_elements(), val);
    }

    /// Apply a function to each element, producing a new array of the same
    /// shape.
    pub fn map<U: Element>(&self, f: impl Fn(&T) -> U) -> Array2<U> {
        Array2 {
            size: self.size,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T: Element> std::ops::Index<(usize, usize)> for Array2<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.size.rows && col < self.size.cols);
        &self.data[row * self.size.cols + col]
    }
}

impl<T: Element> std::ops::IndexMut<(usize, usize)> for Array2<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(row < self.size.rows && col < self.size.cols);
        &mut self.data[row * self.size.cols + col]
    }
}

/// A dense 1D array of numeric elements.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Array1<T: Element> {
    data: Vec<T>,
}

impl<T: Element> Array1<T> {
    /// Create a new array from element data.
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Create a new array filled with a single value.
    pub fn from_size_val(len: usize, val: T) -> Self {
        Self {
            data: vec![val; len],
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bounds-checked element access.
    pub fn get(&self, i: usize) -> Option<&T> {
        self.data.get(i)
    }

    /// The backing storage as a contiguous slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The backing storage as a mutable contiguous slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Resize the array, discarding the previous contents.
    pub fn resize(&mut self, len: usize, val: T) {
        self.data.clear();
        self.data.resize(len, val);
    }
}

impl<T: Element> std::ops::Index<usize> for Array1<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<T: Element> std::ops::IndexMut<usize> for Array1<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i]
    }
}

impl<T: Element> From<Vec<T>> for Array1<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        let res = Array2::<u8>::new(ArraySize { rows: 2, cols: 2 }, vec![0u8; 3]);
        assert_eq!(res, Err(ArrayError::InvalidDataLength(3, 4)));
    }

    #[test]
    fn test_row_major_layout() {
        let arr = Array2::<u8>::new(
            ArraySize { rows: 2, cols: 3 },
            vec![1, 2, 3, 4, 5, 6],
        )
        .unwrap();
        assert_eq!(arr.row(0), &[1, 2, 3]);
        assert_eq!(arr.row(1), &[4, 5, 6]);
        assert_eq!(arr[(1, 2)], 6);
        assert_eq!(arr.get(2, 0), None);
        assert_eq!(arr.get(0, 3), None);
    }

    #[test]
    fn test_resize_discards() {
        let mut arr = Array2::<f32>::from_size_val(ArraySize { rows: 1, cols: 1 }, 7.0);
        arr.resize(ArraySize { rows: 2, cols: 2 }, 0.0);
        assert_eq!(arr.as_slice(), &[0.0; 4]);
    }

    #[test]
    fn test_map_converts() {
        let arr = Array2::<u8>::new(ArraySize { rows: 1, cols: 2 }, vec![1, 2]).unwrap();
        let doubled = arr.map(|&v| (v * 2) as f32);
        assert_eq!(doubled.as_slice(), &[2.0, 4.0]);
    }

    #[test]
    fn test_array1_access() {
        let mut v = Array1::<i32>::new(vec![1, 2, 3]);
        v[1] = 5;
        assert_eq!(v.as_slice(), &[1, 5, 3]);
        assert_eq!(v.get(3), None);
    }
}
