//! The accumulator-driven filtering loops shared by convolution, correlation
//! and morphology.
//!
//! Every pass slides a kernel over samples that are already guaranteed valid:
//! functors boundary-expand the source by the kernel's signed index range
//! before the pass, so the inner loops carry no border special cases. The
//! inner loop walks physical taps in reverse against forward samples, which
//! computes true convolution of the logical kernel; callers wanting
//! correlation mirror their kernel once up front.

use filtra_array::{ops, Array1, Array2, Element};
use num_traits::Zero;
use rayon::prelude::*;

use crate::error::FilterError;
use crate::filter::accumulator::Accumulator;
use crate::filter::kernel::{FilterKernel, Kernel1D, Kernel2D, KernelSymmetry, SeparableKernel};
use crate::padding::{expand_row, BorderType, BoundaryExpansion};
use crate::parallel::ExecutionStrategy;

/// Geometry of one 1D pass along an axis of length `n`.
///
/// `out_start..out_start + out_len` is the output range that gets computed;
/// the sliding window for the k-th computed output begins at
/// `win_start + k` in the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PassGeometry {
    out_start: usize,
    out_len: usize,
    win_start: usize,
}

fn pass_geometry(first: isize, last: isize, n: usize, expanded: bool) -> PassGeometry {
    let win_start = (-last).max(0) as usize;
    if expanded {
        PassGeometry {
            out_start: 0,
            out_len: n,
            win_start,
        }
    } else {
        // restrict to the outputs whose window stays inside the source
        let out_start = (last.max(0) as usize).min(n);
        let out_end = (n as isize + first.min(0)).max(out_start as isize) as usize;
        PassGeometry {
            out_start,
            out_len: out_end - out_start,
            win_start,
        }
    }
}

/// Left/right (or top/bottom) expansion widths a kernel needs so that every
/// sliding window lands on valid samples.
fn expansion_widths<T: Element>(kernel: &Kernel1D<T>) -> (usize, usize) {
    (
        kernel.last_idx().max(0) as usize,
        (-kernel.first_idx()).max(0) as usize,
    )
}

/// Feed one output element's window through the accumulator.
///
/// `sample(t)` returns the t-th window sample in physical tap order. For
/// symmetric and antisymmetric kernels taps are paired from the outer edge
/// inward, halving the multiplications; the center tap is applied once (it is
/// the additive identity for antisymmetric kernels, by invariant).
#[inline]
fn run_taps<T: Element, A: Accumulator<T>>(
    acc: &mut A,
    taps: &[T],
    symmetry: KernelSymmetry,
    sample: impl Fn(usize) -> T,
) -> T {
    acc.reset();
    let n = taps.len();
    match symmetry {
        KernelSymmetry::General => {
            for t in 0..n {
                acc.accumulate(taps[n - 1 - t], sample(t));
            }
        }
        KernelSymmetry::Symmetric => {
            let c = n / 2;
            for d in (1..=c).rev() {
                acc.accumulate_sym(taps[c + d], sample(c - d), sample(c + d));
            }
            acc.accumulate(taps[c], sample(c));
        }
        KernelSymmetry::Antisymmetric => {
            let c = n / 2;
            for d in (1..=c).rev() {
                acc.accumulate_asym(taps[c + d], sample(c - d), sample(c + d));
            }
            acc.accumulate_zero(sample(c));
        }
    }
    acc.result()
}

/// Apply a 1D kernel along every row of `src`.
///
/// The output has `src`'s shape; with [`BorderType::NoBoundary`] only the
/// valid center columns are computed and the rest stay at the additive
/// identity.
pub(crate) fn filter_rows<T, A>(
    src: &Array2<T>,
    dst: &mut Array2<T>,
    kernel: &Kernel1D<T>,
    border: BorderType,
    proto: &A,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError>
where
    T: Element,
    A: Accumulator<T> + Send + Sync,
{
    dst.resize(src.size(), T::zero());
    if src.is_empty() {
        return Ok(());
    }

    let (left, right) = expansion_widths(kernel);
    let expanded_store;
    let (input, expanded) = if border == BorderType::NoBoundary {
        (src, false)
    } else {
        let mut e = Array2::default();
        BoundaryExpansion::with_widths(border, 0, 0, left as isize, right as isize)
            .apply(src, &mut e)?;
        expanded_store = e;
        (&expanded_store, true)
    };

    let geom = pass_geometry(kernel.first_idx(), kernel.last_idx(), src.cols(), expanded);
    let symmetry = kernel.symmetry();
    let taps = kernel.taps();
    let mut acc = proto.clone();
    acc.set_norm(kernel.norm());

    let do_row = |in_row: &[T], out_row: &mut [T], acc: &mut A| {
        for k in 0..geom.out_len {
            let window = &in_row[geom.win_start + k..geom.win_start + k + taps.len()];
            out_row[geom.out_start + k] = run_taps(acc, taps, symmetry, |t| window[t]);
        }
    };

    let cols = src.cols();
    if strategy.is_parallel(src.size().num_elements()) {
        dst.as_slice_mut()
            .par_chunks_exact_mut(cols)
            .enumerate()
            .for_each(|(r, out_row)| {
                let mut acc = acc.clone();
                do_row(input.row(r), out_row, &mut acc);
            });
    } else {
        for r in 0..src.rows() {
            do_row(input.row(r), dst.row_mut(r), &mut acc);
        }
    }

    Ok(())
}

/// Apply a 1D kernel along every column of `src`.
pub(crate) fn filter_cols<T, A>(
    src: &Array2<T>,
    dst: &mut Array2<T>,
    kernel: &Kernel1D<T>,
    border: BorderType,
    proto: &A,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError>
where
    T: Element,
    A: Accumulator<T> + Send + Sync,
{
    dst.resize(src.size(), T::zero());
    if src.is_empty() {
        return Ok(());
    }

    let (top, bottom) = expansion_widths(kernel);
    let expanded_store;
    let (input, expanded) = if border == BorderType::NoBoundary {
        (src, false)
    } else {
        let mut e = Array2::default();
        BoundaryExpansion::with_widths(border, top as isize, bottom as isize, 0, 0)
            .apply(src, &mut e)?;
        expanded_store = e;
        (&expanded_store, true)
    };

    let geom = pass_geometry(kernel.first_idx(), kernel.last_idx(), src.rows(), expanded);
    let symmetry = kernel.symmetry();
    let taps = kernel.taps();
    let mut acc = proto.clone();
    acc.set_norm(kernel.norm());

    let cols = src.cols();
    let in_slice = input.as_slice();

    let do_out_row = |k: usize, out_row: &mut [T], acc: &mut A| {
        let base = (geom.win_start + k) * cols;
        for (x, out) in out_row.iter_mut().enumerate() {
            *out = run_taps(acc, taps, symmetry, |t| in_slice[base + t * cols + x]);
        }
    };

    if strategy.is_parallel(src.size().num_elements()) {
        dst.as_slice_mut()
            .par_chunks_exact_mut(cols)
            .enumerate()
            .for_each(|(r, out_row)| {
                if r >= geom.out_start && r < geom.out_start + geom.out_len {
                    let mut acc = acc.clone();
                    do_out_row(r - geom.out_start, out_row, &mut acc);
                }
            });
    } else {
        for k in 0..geom.out_len {
            do_out_row(k, dst.row_mut(geom.out_start + k), &mut acc);
        }
    }

    Ok(())
}

/// Apply a dense, non-separable 2D kernel.
///
/// The O(kernel-area) per-pixel double loop, with the same symmetric /
/// antisymmetric pairing applied over the point-reflected tap pairs when the
/// 2D kernel has that symmetry.
pub(crate) fn filter_2d<T, A>(
    src: &Array2<T>,
    dst: &mut Array2<T>,
    kernel: &Kernel2D<T>,
    border: BorderType,
    proto: &A,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError>
where
    T: Element,
    A: Accumulator<T> + Send + Sync,
{
    dst.resize(src.size(), T::zero());
    if src.is_empty() {
        return Ok(());
    }

    let top = kernel.last_row().max(0);
    let bottom = (-kernel.first_row()).max(0);
    let left = kernel.last_col().max(0);
    let right = (-kernel.first_col()).max(0);

    let expanded_store;
    let (input, expanded) = if border == BorderType::NoBoundary {
        (src, false)
    } else {
        let mut e = Array2::default();
        BoundaryExpansion::with_widths(border, top, bottom, left, right).apply(src, &mut e)?;
        expanded_store = e;
        (&expanded_store, true)
    };

    let gr = pass_geometry(kernel.first_row(), kernel.last_row(), src.rows(), expanded);
    let gc = pass_geometry(kernel.first_col(), kernel.last_col(), src.cols(), expanded);
    let symmetry = kernel.symmetry();
    let taps = kernel.taps();
    let kcols = kernel.cols();
    let mut acc = proto.clone();
    acc.set_norm(kernel.norm());

    let cols = src.cols();
    let in_cols = input.cols();
    let in_slice = input.as_slice();

    let do_out_row = |kr: usize, out_row: &mut [T], acc: &mut A| {
        let base_r = gr.win_start + kr;
        for kc in 0..gc.out_len {
            let base_c = gc.win_start + kc;
            out_row[gc.out_start + kc] = run_taps(acc, taps, symmetry, |w| {
                in_slice[(base_r + w / kcols) * in_cols + base_c + w % kcols]
            });
        }
    };

    if strategy.is_parallel(src.size().num_elements()) {
        dst.as_slice_mut()
            .par_chunks_exact_mut(cols)
            .enumerate()
            .for_each(|(r, out_row)| {
                if r >= gr.out_start && r < gr.out_start + gr.out_len {
                    let mut acc = acc.clone();
                    do_out_row(r - gr.out_start, out_row, &mut acc);
                }
            });
    } else {
        for kr in 0..gr.out_len {
            do_out_row(kr, dst.row_mut(gr.out_start + kr), &mut acc);
        }
    }

    Ok(())
}

/// Apply a separable kernel: a row pass then a column pass per pair, with the
/// pair contributions summed.
///
/// The intermediate buffers hold element values; accumulation inside each
/// pass runs in the element's widened type.
pub(crate) fn filter_separable<T, A>(
    src: &Array2<T>,
    dst: &mut Array2<T>,
    kernel: &SeparableKernel<T>,
    border: BorderType,
    proto: &A,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError>
where
    T: Element,
    A: Accumulator<T> + Send + Sync,
{
    dst.resize(src.size(), T::zero());

    let mut buf = Array2::default();
    let mut tmp = Array2::default();
    for p in 0..kernel.num_pairs() {
        filter_rows(src, &mut buf, kernel.row_filter(p), border, proto, strategy)?;
        filter_cols(&buf, &mut tmp, kernel.col_filter(p), border, proto, strategy)?;
        if p == 0 {
            std::mem::swap(dst, &mut tmp);
        } else {
            ops::add_assign(dst, &tmp)?;
        }
    }

    Ok(())
}

/// Apply any 2D-capable kernel representation to a 2D array.
pub(crate) fn apply_kernel<T, A>(
    src: &Array2<T>,
    dst: &mut Array2<T>,
    kernel: &FilterKernel<T>,
    border: BorderType,
    proto: &A,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError>
where
    T: Element,
    A: Accumulator<T> + Send + Sync,
{
    match kernel {
        FilterKernel::Separable(k) => filter_separable(src, dst, k, border, proto, strategy),
        FilterKernel::TwoD(k) => filter_2d(src, dst, k, border, proto, strategy),
        FilterKernel::OneD(_) => Err(FilterError::UnsupportedKernel(
            "a 1D kernel filters vectors, not 2D arrays",
        )),
    }
}

/// Apply a 1D kernel to a vector.
pub(crate) fn filter_vector<T, A>(
    src: &Array1<T>,
    dst: &mut Array1<T>,
    kernel: &Kernel1D<T>,
    border: BorderType,
    proto: &A,
) -> Result<(), FilterError>
where
    T: Element,
    A: Accumulator<T>,
{
    dst.resize(src.len(), T::zero());
    if src.is_empty() {
        return Ok(());
    }

    let (left, right) = expansion_widths(kernel);
    let expanded_store;
    let (input, expanded): (&[T], bool) = if border == BorderType::NoBoundary {
        (src.as_slice(), false)
    } else {
        expanded_store = expand_row(src.as_slice(), left, right, border);
        (&expanded_store, true)
    };

    let geom = pass_geometry(kernel.first_idx(), kernel.last_idx(), src.len(), expanded);
    let symmetry = kernel.symmetry();
    let taps = kernel.taps();
    let mut acc = proto.clone();
    acc.set_norm(kernel.norm());

    let out = dst.as_slice_mut();
    for k in 0..geom.out_len {
        let window = &input[geom.win_start + k..geom.win_start + k + taps.len()];
        out[geom.out_start + k] = run_taps(&mut acc, taps, symmetry, |t| window[t]);
    }

    Ok(())
}
