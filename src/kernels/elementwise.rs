//! # Elementwise Kernels
//!
//! Broadcasting and chunk-mapped elementwise evaluation.
//!
//! Output buffers are split into the blocks of axis 0. With the
//! `parallel_proc` feature the blocks are filled in parallel with rayon,
//! otherwise sequentially on the calling thread.

#[cfg(feature = "parallel_proc")]
use rayon::prelude::*;
use vec64::Vec64;

use crate::enums::dtype::DType;
use crate::enums::error::UnitArrowError;
use crate::structs::nd_array::{NdArray, strides_of};

/// Numpy broadcasting of two shapes.
pub fn broadcast_shapes(lhs: &[usize], rhs: &[usize]) -> Result<Vec<usize>, UnitArrowError> {
    let ndim = lhs.len().max(rhs.len());
    let mut out = vec![0; ndim];
    for k in 0..ndim {
        let a = dim_from_end(lhs, ndim - 1 - k);
        let b = dim_from_end(rhs, ndim - 1 - k);
        out[k] = match (a, b) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            _ => {
                return Err(UnitArrowError::BroadcastError {
                    lhs: lhs.to_vec(),
                    rhs: rhs.to_vec(),
                });
            }
        };
    }
    Ok(out)
}

#[inline]
fn dim_from_end(shape: &[usize], from_end: usize) -> usize {
    if from_end < shape.len() {
        shape[shape.len() - 1 - from_end]
    } else {
        1
    }
}

/// Maps flat output positions onto a broadcast operand's buffer.
pub(crate) struct BroadcastIndex {
    out_strides: Vec<usize>,
    src_strides: Vec<usize>,
    mode: IndexMode,
}

enum IndexMode {
    Identity,
    Scalar,
    Strided,
}

impl BroadcastIndex {
    pub(crate) fn new(src_shape: &[usize], out_shape: &[usize]) -> Self {
        let src_len: usize = src_shape.iter().product();
        let mode = if src_shape == out_shape {
            IndexMode::Identity
        } else if src_len == 1 {
            IndexMode::Scalar
        } else {
            IndexMode::Strided
        };
        // Broadcast axes read with stride 0.
        let offset = out_shape.len() - src_shape.len();
        let own = strides_of(src_shape);
        let src_strides = (0..out_shape.len())
            .map(|k| {
                if k < offset || src_shape[k - offset] == 1 {
                    0
                } else {
                    own[k - offset]
                }
            })
            .collect();
        Self {
            out_strides: strides_of(out_shape),
            src_strides,
            mode,
        }
    }

    #[inline]
    pub(crate) fn map(&self, flat: usize) -> usize {
        match self.mode {
            IndexMode::Identity => flat,
            IndexMode::Scalar => 0,
            IndexMode::Strided => {
                let mut rem = flat;
                let mut idx = 0;
                for (os, ss) in self.out_strides.iter().zip(&self.src_strides) {
                    let coord = rem / os;
                    rem %= os;
                    idx += coord * ss;
                }
                idx
            }
        }
    }
}

/// Fills a buffer of `len` values, one axis-0 block at a time.
///
/// `blocks` are axis-0 block lengths in rows; `row_len` is the number of
/// values per row. `f` receives the flat output position.
pub(crate) fn fill_chunked<F>(len: usize, blocks: &[usize], row_len: usize, f: F) -> Vec64<f64>
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    let mut out = Vec64::from(vec![0.0; len]);
    let mut parts: Vec<(usize, &mut [f64])> = Vec::with_capacity(blocks.len());
    let mut rest: &mut [f64] = &mut out;
    let mut offset = 0;
    for &rows in blocks {
        let n = (rows * row_len).min(rest.len());
        let (head, tail) = rest.split_at_mut(n);
        parts.push((offset, head));
        offset += n;
        rest = tail;
    }
    if !rest.is_empty() {
        parts.push((offset, rest));
    }

    let fill = |(start, part): (usize, &mut [f64])| {
        for (i, slot) in part.iter_mut().enumerate() {
            *slot = f(start + i);
        }
    };
    #[cfg(feature = "parallel_proc")]
    parts.into_par_iter().for_each(fill);
    #[cfg(not(feature = "parallel_proc"))]
    parts.into_iter().for_each(fill);
    out
}

/// Applies `f` to every value of `input`, casting into `dtype`.
pub fn unary_map<F>(input: &NdArray, dtype: DType, blocks: &[usize], f: F) -> NdArray
where
    F: Fn(f64) -> f64 + Sync + Send,
{
    let src = input.as_slice();
    let shape = input.shape().to_vec();
    let row_len = row_len(&shape);
    let data = fill_chunked(src.len(), blocks, row_len, |i| dtype.cast(f(src[i])));
    NdArray::from_parts(data, shape, dtype)
}

/// Applies `f` pairwise after broadcasting `lhs` against `rhs`.
pub fn binary_map<F>(
    lhs: &NdArray,
    rhs: &NdArray,
    dtype: DType,
    blocks: &[usize],
    f: F,
) -> Result<NdArray, UnitArrowError>
where
    F: Fn(f64, f64) -> f64 + Sync + Send,
{
    let shape = broadcast_shapes(lhs.shape(), rhs.shape())?;
    let len: usize = shape.iter().product();
    let li = BroadcastIndex::new(lhs.shape(), &shape);
    let ri = BroadcastIndex::new(rhs.shape(), &shape);
    let (a, b) = (lhs.as_slice(), rhs.as_slice());
    let data = fill_chunked(len, blocks, row_len(&shape), |i| {
        dtype.cast(f(a[li.map(i)], b[ri.map(i)]))
    });
    Ok(NdArray::from_parts(data, shape, dtype))
}

/// Values per row of axis 0.
#[inline]
pub(crate) fn row_len(shape: &[usize]) -> usize {
    shape.iter().skip(1).product::<usize>().max(1)
}
