use filtra_array::Element;
use num_traits::{One, Zero};

use crate::error::FilterError;

/// Symmetry classification of a kernel, decided once when a functor binds it.
///
/// Symmetric and antisymmetric kernels take a paired accumulation path that
/// halves the number of tap multiplications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelSymmetry {
    /// No exploitable symmetry.
    General,
    /// `at(i) == at(-i)` and the index range is centered.
    Symmetric,
    /// `at(i) == -at(-i)` and the index range is centered. The center tap is
    /// the additive identity by library invariant.
    Antisymmetric,
}

/// A 1D filter kernel addressable by a signed index range.
///
/// Taps live in a contiguous buffer; the logical index range
/// `[first_idx, last_idx]` maps to physical slots through
/// `offset = -first_idx`, so logical index 0 may sit anywhere in the buffer
/// (or outside it). All access goes through the checked [`Kernel1D::at`]
/// accessor.
///
/// The `norm` is the fixed-point representation of the value 1.0. A `u8`
/// kernel `[64, 128, 64]` with norm 255 is interpreted during filtering as
/// roughly `[0.25, 0.5, 0.25]`; floating point kernels always use norm 1.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Kernel1D<T: Element> {
    data: Vec<T>,
    offset: isize,
    norm: T,
}

impl<T: Element> Kernel1D<T> {
    /// Create a kernel from taps and the physical position of logical
    /// index 0.
    ///
    /// # Errors
    ///
    /// Fails with [`FilterError::EmptyKernel`] when no taps are given.
    pub fn new(data: Vec<T>, offset: isize) -> Result<Self, FilterError> {
        if data.is_empty() {
            return Err(FilterError::EmptyKernel);
        }
        Ok(Self {
            data,
            offset,
            norm: T::suggested_norm(),
        })
    }

    /// Create a kernel centered on its middle tap.
    pub fn centered(data: Vec<T>) -> Result<Self, FilterError> {
        let offset = data.len() as isize / 2;
        Self::new(data, offset)
    }

    /// First valid logical index (`-offset`).
    pub fn first_idx(&self) -> isize {
        -self.offset
    }

    /// Last valid logical index.
    pub fn last_idx(&self) -> isize {
        self.data.len() as isize - 1 - self.offset
    }

    /// Offset of logical index 0 in the physical buffer.
    pub fn offset(&self) -> isize {
        self.offset
    }

    /// Number of taps.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the kernel has no taps. Construction forbids this; the method
    /// exists for container-style completeness.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The taps in physical order (logical `first_idx..=last_idx`).
    pub fn taps(&self) -> &[T] {
        &self.data
    }

    /// Checked access by logical index.
    pub fn at(&self, i: isize) -> Option<&T> {
        let p = i + self.offset;
        if p < 0 {
            None
        } else {
            self.data.get(p as usize)
        }
    }

    /// The normalization factor interpreted as 1.0.
    pub fn norm(&self) -> T {
        self.norm
    }

    /// Set the normalization factor.
    pub fn set_norm(&mut self, norm: T) {
        self.norm = norm;
    }

    /// A copy mirrored about logical index 0 (`at(i)` becomes `at(-i)`).
    pub fn mirror(&self) -> Self {
        let mut data = self.data.clone();
        data.reverse();
        Self {
            offset: data.len() as isize - 1 - self.offset,
            data,
            norm: self.norm,
        }
    }

    /// Divide all taps by the norm and set the norm to 1.
    pub fn denormalize(&mut self) {
        let n = self.norm.to_f64();
        if n != 1.0 {
            for t in self.data.iter_mut() {
                *t = T::from_f64(t.to_f64() / n);
            }
            self.norm = T::one();
        }
    }

    /// Sum of all taps, accumulated in the widened type.
    pub fn sum(&self) -> T {
        let mut acc = T::Acc::zero();
        for &t in &self.data {
            acc = acc + t.to_acc();
        }
        T::from_acc(acc)
    }

    /// Rescale the taps so that they sum to the norm (a unit-sum kernel in
    /// interpreted values). Kernels with a near-zero tap sum are left
    /// unchanged.
    pub fn normalize_sum(&mut self) {
        let mut sum = 0.0;
        for &t in &self.data {
            sum += t.to_f64();
        }
        if sum.abs() < 1e-12 {
            return;
        }
        let target = self.norm.to_f64();
        for t in self.data.iter_mut() {
            *t = T::from_f64(t.to_f64() / sum * target);
        }
    }

    /// Classify the kernel's symmetry about logical index 0.
    pub fn symmetry(&self) -> KernelSymmetry {
        if self.first_idx() != -self.last_idx() {
            return KernelSymmetry::General;
        }
        let h = self.last_idx();
        let symmetric = (1..=h).all(|i| self.at(i) == self.at(-i));
        if symmetric {
            return KernelSymmetry::Symmetric;
        }
        let center_zero = self
            .at(0)
            .map(|c| c.to_acc() == T::Acc::zero())
            .unwrap_or(false);
        let antisymmetric = center_zero
            && (1..=h).all(|i| match (self.at(i), self.at(-i)) {
                (Some(&a), Some(&b)) => a.to_acc() + b.to_acc() == T::Acc::zero(),
                _ => false,
            });
        if antisymmetric {
            KernelSymmetry::Antisymmetric
        } else {
            KernelSymmetry::General
        }
    }
}

/// A dense 2D filter kernel addressed by signed (row, col) offsets from a
/// center point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Kernel2D<T: Element> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
    offset: (isize, isize),
    norm: T,
}

impl<T: Element> Kernel2D<T> {
    /// Create a kernel from row-major taps and the physical position of the
    /// logical (0, 0) tap.
    ///
    /// # Errors
    ///
    /// Fails when no taps are given or the data length does not equal
    /// `rows * cols`.
    pub fn new(
        rows: usize,
        cols: usize,
        data: Vec<T>,
        offset: (isize, isize),
    ) -> Result<Self, FilterError> {
        if rows == 0 || cols == 0 || data.is_empty() {
            return Err(FilterError::EmptyKernel);
        }
        if data.len() != rows * cols {
            return Err(filtra_array::ArrayError::InvalidDataLength(data.len(), rows * cols).into());
        }
        Ok(Self {
            data,
            rows,
            cols,
            offset,
            norm: T::suggested_norm(),
        })
    }

    /// Create a kernel centered on its middle tap.
    pub fn centered(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, FilterError> {
        let offset = (rows as isize / 2, cols as isize / 2);
        Self::new(rows, cols, data, offset)
    }

    /// Number of tap rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of tap columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// First valid logical row index.
    pub fn first_row(&self) -> isize {
        -self.offset.0
    }

    /// Last valid logical row index.
    pub fn last_row(&self) -> isize {
        self.rows as isize - 1 - self.offset.0
    }

    /// First valid logical column index.
    pub fn first_col(&self) -> isize {
        -self.offset.1
    }

    /// Last valid logical column index.
    pub fn last_col(&self) -> isize {
        self.cols as isize - 1 - self.offset.1
    }

    /// The taps in row-major physical order.
    pub fn taps(&self) -> &[T] {
        &self.data
    }

    /// Checked access by logical (row, col) index.
    pub fn at(&self, row: isize, col: isize) -> Option<&T> {
        let r = row + self.offset.0;
        let c = col + self.offset.1;
        if r < 0 || c < 0 || r as usize >= self.rows || c as usize >= self.cols {
            None
        } else {
            self.data.get(r as usize * self.cols + c as usize)
        }
    }

    /// The normalization factor interpreted as 1.0.
    pub fn norm(&self) -> T {
        self.norm
    }

    /// Set the normalization factor.
    pub fn set_norm(&mut self, norm: T) {
        self.norm = norm;
    }

    /// A copy point-reflected about logical (0, 0).
    pub fn mirror(&self) -> Self {
        let mut data = self.data.clone();
        data.reverse();
        Self {
            data,
            rows: self.rows,
            cols: self.cols,
            offset: (
                self.rows as isize - 1 - self.offset.0,
                self.cols as isize - 1 - self.offset.1,
            ),
            norm: self.norm,
        }
    }

    /// Classify the kernel's symmetry under point reflection about (0, 0).
    pub fn symmetry(&self) -> KernelSymmetry {
        if self.first_row() != -self.last_row() || self.first_col() != -self.last_col() {
            return KernelSymmetry::General;
        }
        let n = self.data.len();
        let symmetric = (0..n / 2).all(|i| self.data[i] == self.data[n - 1 - i]);
        if symmetric {
            return KernelSymmetry::Symmetric;
        }
        let center_zero = self.data[n / 2].to_acc() == T::Acc::zero();
        let antisymmetric = center_zero
            && (0..n / 2).all(|i| {
                self.data[i].to_acc() + self.data[n - 1 - i].to_acc() == T::Acc::zero()
            });
        if antisymmetric {
            KernelSymmetry::Antisymmetric
        } else {
            KernelSymmetry::General
        }
    }
}

const POWER_ITERATIONS: usize = 128;

/// An ordered list of (row kernel, column kernel) pairs whose outer-product
/// sum represents a 2D kernel.
///
/// Filtering applies each pair as a row pass followed by a column pass and
/// sums the pair contributions, turning an O(area) per-pixel cost into
/// O(rows + cols). Each 1D member carries its own norm and each pass divides
/// by it once.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeparableKernel<T: Element> {
    row_kernels: Vec<Kernel1D<T>>,
    col_kernels: Vec<Kernel1D<T>>,
}

impl<T: Element> SeparableKernel<T> {
    /// An empty kernel (represents the zero 2D kernel).
    pub fn new() -> Self {
        Self::default()
    }

    /// A kernel with a single row/column pair.
    pub fn from_pair(row: Kernel1D<T>, col: Kernel1D<T>) -> Self {
        Self {
            row_kernels: vec![row],
            col_kernels: vec![col],
        }
    }

    /// Append a row/column pair.
    pub fn push_pair(&mut self, row: Kernel1D<T>, col: Kernel1D<T>) {
        self.row_kernels.push(row);
        self.col_kernels.push(col);
    }

    /// Number of row/column pairs.
    pub fn num_pairs(&self) -> usize {
        self.row_kernels.len()
    }

    /// The row filter of pair `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.num_pairs()`.
    pub fn row_filter(&self, i: usize) -> &Kernel1D<T> {
        &self.row_kernels[i]
    }

    /// The column filter of pair `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.num_pairs()`.
    pub fn col_filter(&self, i: usize) -> &Kernel1D<T> {
        &self.col_kernels[i]
    }

    /// A copy with every member kernel mirrored.
    pub fn mirror(&self) -> Self {
        Self {
            row_kernels: self.row_kernels.iter().map(Kernel1D::mirror).collect(),
            col_kernels: self.col_kernels.iter().map(Kernel1D::mirror).collect(),
        }
    }

    /// Try to decompose the 2D kernel `kernel` into outer-product pairs.
    ///
    /// Rank-1 terms are split off the residual until its largest per-element
    /// deviation from zero is at most `max_dev`. Returns `None` when the
    /// kernel is not separable within the tolerance; the caller then falls
    /// back to the non-separable 2D path.
    ///
    /// The extracted row kernels inherit `kernel`'s norm and the column
    /// kernels carry norm 1, so the two passes together divide by the
    /// original norm exactly once.
    pub fn separate(kernel: &Kernel2D<T>, max_dev: f64) -> Option<Self> {
        let rows = kernel.rows();
        let cols = kernel.cols();
        let mut resid: Vec<f64> = kernel.taps().iter().map(|&t| t.to_f64()).collect();

        let max_abs = |m: &[f64]| m.iter().fold(0.0f64, |a, v| a.max(v.abs()));

        let mut result = Self::new();
        for _ in 0..rows.min(cols) {
            if max_abs(&resid) <= max_dev {
                break;
            }

            // dominant rank-1 term by power iteration, seeded with the
            // largest residual row
            let seed = (0..rows)
                .max_by(|&a, &b| {
                    let na: f64 = resid[a * cols..(a + 1) * cols].iter().map(|v| v * v).sum();
                    let nb: f64 = resid[b * cols..(b + 1) * cols].iter().map(|v| v * v).sum();
                    na.partial_cmp(&nb).unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap_or(0);
            let mut v: Vec<f64> = resid[seed * cols..(seed + 1) * cols].to_vec();
            let vn: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
            if vn == 0.0 {
                v = vec![1.0; cols];
            } else {
                v.iter_mut().for_each(|x| *x /= vn);
            }

            let mut u = vec![0.0f64; rows];
            let mut sigma = 0.0f64;
            for _ in 0..POWER_ITERATIONS {
                // u = R v
                for (r, ur) in u.iter_mut().enumerate() {
                    *ur = resid[r * cols..(r + 1) * cols]
                        .iter()
                        .zip(v.iter())
                        .map(|(a, b)| a * b)
                        .sum();
                }
                let un: f64 = u.iter().map(|x| x * x).sum::<f64>().sqrt();
                if un == 0.0 {
                    break;
                }
                u.iter_mut().for_each(|x| *x /= un);

                // v = R^T u
                for (c, vc) in v.iter_mut().enumerate() {
                    *vc = (0..rows).map(|r| resid[r * cols + c] * u[r]).sum();
                }
                sigma = v.iter().map(|x| x * x).sum::<f64>().sqrt();
                if sigma == 0.0 {
                    break;
                }
                v.iter_mut().for_each(|x| *x /= sigma);
            }
            if sigma == 0.0 {
                break;
            }

            for r in 0..rows {
                for c in 0..cols {
                    resid[r * cols + c] -= sigma * u[r] * v[c];
                }
            }

            let row_data: Vec<T> = v.iter().map(|&x| T::from_f64(x * sigma)).collect();
            let col_data: Vec<T> = u.iter().map(|&x| T::from_f64(x)).collect();
            let mut row_k = Kernel1D::new(row_data, kernel.offset.1).ok()?;
            row_k.set_norm(kernel.norm());
            let mut col_k = Kernel1D::new(col_data, kernel.offset.0).ok()?;
            col_k.set_norm(T::one());
            result.push_pair(row_k, col_k);
        }

        if max_abs(&resid) <= max_dev {
            Some(result)
        } else {
            None
        }
    }

    /// The equivalent dense 2D kernel (sum of outer products), carrying the
    /// element type's suggested norm.
    ///
    /// # Errors
    ///
    /// Fails with [`FilterError::EmptyKernel`] when the pair list is empty.
    pub fn to_kernel2d(&self) -> Result<Kernel2D<T>, FilterError> {
        if self.num_pairs() == 0 {
            return Err(FilterError::EmptyKernel);
        }

        let first_row = self.col_kernels.iter().map(Kernel1D::first_idx).min();
        let last_row = self.col_kernels.iter().map(Kernel1D::last_idx).max();
        let first_col = self.row_kernels.iter().map(Kernel1D::first_idx).min();
        let last_col = self.row_kernels.iter().map(Kernel1D::last_idx).max();
        let (Some(fr), Some(lr), Some(fc), Some(lc)) =
            (first_row, last_row, first_col, last_col)
        else {
            return Err(FilterError::EmptyKernel);
        };

        let rows = (lr - fr + 1) as usize;
        let cols = (lc - fc + 1) as usize;
        let norm = T::suggested_norm().to_f64();
        let mut acc = vec![0.0f64; rows * cols];
        for p in 0..self.num_pairs() {
            let rk = &self.row_kernels[p];
            let ck = &self.col_kernels[p];
            let rn = rk.norm().to_f64();
            let cn = ck.norm().to_f64();
            for r in 0..rows {
                let cv = ck
                    .at(fr + r as isize)
                    .map(|&t| t.to_f64() / cn)
                    .unwrap_or(0.0);
                for c in 0..cols {
                    let rv = rk
                        .at(fc + c as isize)
                        .map(|&t| t.to_f64() / rn)
                        .unwrap_or(0.0);
                    acc[r * cols + c] += cv * rv * norm;
                }
            }
        }

        let data: Vec<T> = acc.iter().map(|&v| T::from_f64(v)).collect();
        Kernel2D::new(rows, cols, data, (-fr, -fc))
    }
}

/// The closed set of kernel representations a filtering functor accepts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterKernel<T: Element> {
    /// A 1D kernel for filtering vectors.
    OneD(Kernel1D<T>),
    /// A dense, non-separable 2D kernel.
    TwoD(Kernel2D<T>),
    /// A separable 2D kernel.
    Separable(SeparableKernel<T>),
}

impl<T: Element> FilterKernel<T> {
    /// A copy with the kernel mirrored (point-reflected for 2D forms).
    pub fn mirror(&self) -> Self {
        match self {
            FilterKernel::OneD(k) => FilterKernel::OneD(k.mirror()),
            FilterKernel::TwoD(k) => FilterKernel::TwoD(k.mirror()),
            FilterKernel::Separable(k) => FilterKernel::Separable(k.mirror()),
        }
    }
}

impl<T: Element> From<Kernel1D<T>> for FilterKernel<T> {
    fn from(k: Kernel1D<T>) -> Self {
        FilterKernel::OneD(k)
    }
}

impl<T: Element> From<Kernel2D<T>> for FilterKernel<T> {
    fn from(k: Kernel2D<T>) -> Self {
        FilterKernel::TwoD(k)
    }
}

impl<T: Element> From<SeparableKernel<T>> for FilterKernel<T> {
    fn from(k: SeparableKernel<T>) -> Self {
        FilterKernel::Separable(k)
    }
}
