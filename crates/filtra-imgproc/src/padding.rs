use filtra_array::{cast_and_scale, Array2, ArraySize, Element};
use num_traits::Zero;

use crate::error::FilterError;

/// Border policy for expanding an array past its edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BorderType {
    /// Border cells are filled with the additive identity.
    ///
    /// Example: ...d c b a | 0 0 0 0...
    #[default]
    Zero,

    /// Border cells reflect across the nearest edge, starting with the sample
    /// next to the edge (the edge sample itself is not duplicated). Widths
    /// beyond the source extent keep reflecting.
    ///
    /// Example: ...d c b a | b c d e...
    Mirror,

    /// Border cells wrap around modulo the source extent.
    ///
    /// Example: ...d c b a | w x y z...
    Periodic,

    /// Border cells replicate the nearest edge sample.
    ///
    /// Example: ...d c b a | a a a a...
    Constant,

    /// No expansion takes place; the caller restricts its sliding window to
    /// the valid region itself.
    NoBoundary,
}

impl BorderType {
    #[inline]
    fn mirror(i: isize, len: usize) -> usize {
        if len == 1 {
            return 0;
        }
        let last = len as isize - 1;
        let mut i = i;
        while i < 0 || i > last {
            if i < 0 {
                i = -i;
            } else {
                i = 2 * last - i;
            }
        }
        i as usize
    }

    #[inline]
    fn wrap(i: isize, len: usize) -> usize {
        ((i % len as isize + len as isize) % len as isize) as usize
    }

    /// Maps a (possibly out-of-range) coordinate to a valid index in
    /// `[0, len)` according to the border policy.
    ///
    /// [`BorderType::Zero`] and [`BorderType::NoBoundary`] have no source
    /// sample for out-of-range coordinates; they clamp like
    /// [`BorderType::Constant`] so the function is total, but callers handle
    /// those policies before mapping.
    #[inline]
    pub fn map_index(&self, i: isize, len: usize) -> usize {
        match self {
            BorderType::Mirror => Self::mirror(i, len),
            BorderType::Periodic => Self::wrap(i, len),
            _ => i.clamp(0, len as isize - 1) as usize,
        }
    }
}

/// Produces a border-extended copy of an input array.
///
/// The output has `src.rows + top + bottom` rows and
/// `src.cols + left + right` columns, with the source occupying the center
/// sub-rectangle at offset `(top, left)`. Negative widths clip the
/// corresponding side away instead of expanding it.
///
/// With [`BoundaryExpansion::normalized`] set and differing element types,
/// samples are rescaled through each type's suggested norm during the copy
/// (`u8` 0..255 ↔ `f32` 0..1) instead of being raw-cast.
///
/// # Examples
///
/// ```
/// use filtra_array::{Array2, ArraySize};
/// use filtra_imgproc::padding::{BorderType, BoundaryExpansion};
///
/// let src = Array2::<f32>::new(
///     ArraySize { rows: 1, cols: 5 },
///     vec![1.0, 2.0, 3.0, 4.0, 5.0],
/// ).unwrap();
/// let mut dst = Array2::<f32>::default();
/// BoundaryExpansion::with_widths(BorderType::Mirror, 0, 0, 2, 2)
///     .apply(&src, &mut dst)
///     .unwrap();
/// assert_eq!(dst.as_slice(), &[3.0, 2.0, 1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BoundaryExpansion {
    top: isize,
    bottom: isize,
    left: isize,
    right: isize,
    border: BorderType,
    normalize: bool,
}

impl BoundaryExpansion {
    /// A uniform expansion by `width` on every side.
    pub fn new(border: BorderType, width: usize) -> Self {
        let w = width as isize;
        Self::with_widths(border, w, w, w, w)
    }

    /// An expansion with independent per-side widths; negative widths clip.
    pub fn with_widths(
        border: BorderType,
        top: isize,
        bottom: isize,
        left: isize,
        right: isize,
    ) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
            border,
            normalize: false,
        }
    }

    /// Enable norm-rescaling on element type conversion.
    pub fn normalized(mut self) -> Self {
        self.normalize = true;
        self
    }

    /// Expand `src` into `dst` according to the border policy.
    ///
    /// # Errors
    ///
    /// Fails with [`FilterError::InvalidBorderWidths`] if the requested
    /// region forecloses the output to a non-positive dimension; the
    /// destination is left empty.
    pub fn apply<T: Element, U: Element>(
        &self,
        src: &Array2<T>,
        dst: &mut Array2<U>,
    ) -> Result<(), FilterError> {
        let convert = |v: T| -> U {
            if self.normalize {
                cast_and_scale(v)
            } else {
                U::from_f64(v.to_f64())
            }
        };

        if self.border == BorderType::NoBoundary {
            // Expansion is skipped; pass the samples through unchanged.
            dst.resize(src.size(), U::zero());
            for (d, &s) in dst.as_slice_mut().iter_mut().zip(src.as_slice().iter()) {
                *d = convert(s);
            }
            return Ok(());
        }

        let rows = src.rows() as isize;
        let cols = src.cols() as isize;
        let out_rows = rows + self.top + self.bottom;
        let out_cols = cols + self.left + self.right;

        if out_rows <= 0 || out_cols <= 0 || src.is_empty() {
            dst.resize(ArraySize { rows: 0, cols: 0 }, U::zero());
            return Err(FilterError::InvalidBorderWidths {
                top: self.top,
                bottom: self.bottom,
                left: self.left,
                right: self.right,
                rows: src.rows(),
                cols: src.cols(),
            });
        }

        dst.resize(
            ArraySize {
                rows: out_rows as usize,
                cols: out_cols as usize,
            },
            U::zero(),
        );

        for r in 0..out_rows as usize {
            let sr = r as isize - self.top;
            let in_rows = sr >= 0 && sr < rows;
            if !in_rows && self.border == BorderType::Zero {
                continue; // row stays at the additive identity
            }
            let mr = if in_rows {
                sr as usize
            } else {
                self.border.map_index(sr, src.rows())
            };
            let srow = src.row(mr);
            let drow = dst.row_mut(r);
            for (c, d) in drow.iter_mut().enumerate() {
                let sc = c as isize - self.left;
                if sc >= 0 && sc < cols {
                    *d = convert(srow[sc as usize]);
                } else if self.border != BorderType::Zero {
                    *d = convert(srow[self.border.map_index(sc, src.cols())]);
                }
            }
        }

        Ok(())
    }
}

/// Expand a single row by `left`/`right` samples for a 1D filtering pass.
pub(crate) fn expand_row<T: Element>(
    src: &[T],
    left: usize,
    right: usize,
    border: BorderType,
) -> Vec<T> {
    debug_assert!(!src.is_empty());
    let mut out = Vec::with_capacity(src.len() + left + right);
    for i in 0..src.len() + left + right {
        let sc = i as isize - left as isize;
        if sc >= 0 && (sc as usize) < src.len() {
            out.push(src[sc as usize]);
        } else if border == BorderType::Zero {
            out.push(T::zero());
        } else {
            out.push(src[border.map_index(sc, src.len())]);
        }
    }
    out
}
