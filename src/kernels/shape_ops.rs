//! # Shape Kernels
//!
//! Kernels that move values between positions rather than computing new ones,
//! plus the two array functions that combine whole operands: `dot` and `diff`.

use vec64::Vec64;

use crate::enums::dtype::DType;
use crate::enums::error::UnitArrowError;
use crate::kernels::reduce::lanes;
use crate::structs::nd_array::{NdArray, strides_of};

/// Exchanges two axes, copying into row-major order.
pub fn swapaxes(input: &NdArray, a: usize, b: usize) -> Result<NdArray, UnitArrowError> {
    let shape = input.shape();
    let ndim = shape.len();
    for axis in [a, b] {
        if axis >= ndim {
            return Err(UnitArrowError::AxisError { axis, ndim });
        }
    }
    let mut out_shape = shape.to_vec();
    out_shape.swap(a, b);
    let mut src_strides = strides_of(shape);
    src_strides.swap(a, b);
    let out_strides = strides_of(&out_shape);
    let values = input.as_slice();
    let mut out = Vec64::with_capacity(values.len());
    for flat in 0..values.len() {
        let mut rem = flat;
        let mut src = 0;
        for (os, ss) in out_strides.iter().zip(&src_strides) {
            src += (rem / os) * ss;
            rem %= os;
        }
        out.push(values[src]);
    }
    Ok(NdArray::from_parts(out, out_shape, input.dtype()))
}

/// Repeats each element `repeats` times along `axis`, or over the flattened
/// array when `axis` is `None`.
pub fn repeat(input: &NdArray, repeats: usize, axis: Option<usize>) -> Result<NdArray, UnitArrowError> {
    let values = input.as_slice();
    match axis {
        None => {
            let mut out = Vec64::with_capacity(values.len() * repeats);
            for v in values {
                for _ in 0..repeats {
                    out.push(*v);
                }
            }
            Ok(NdArray::from_parts(out, vec![values.len() * repeats], input.dtype()))
        }
        Some(axis) => {
            let shape = input.shape();
            if axis >= shape.len() {
                return Err(UnitArrowError::AxisError {
                    axis,
                    ndim: shape.len(),
                });
            }
            let (outer, n, inner) = lanes(shape, axis);
            let mut out = Vec64::with_capacity(values.len() * repeats);
            for o in 0..outer {
                for j in 0..n {
                    let row = &values[(o * n + j) * inner..(o * n + j + 1) * inner];
                    for _ in 0..repeats {
                        out.extend_from_slice(row);
                    }
                }
            }
            let mut out_shape = shape.to_vec();
            out_shape[axis] *= repeats;
            Ok(NdArray::from_parts(out, out_shape, input.dtype()))
        }
    }
}

/// Joins `inputs` along an existing `axis`.
pub fn concatenate(inputs: &[&NdArray], axis: usize, dtype: DType) -> Result<NdArray, UnitArrowError> {
    let first = inputs.first().ok_or_else(|| UnitArrowError::ShapeError {
        message: "need at least one array to concatenate".into(),
    })?;
    let out_shape = concat_shape(inputs.iter().map(|a| a.shape()), axis)?;
    let (outer, _, inner) = lanes(first.shape(), axis);
    let mut out = Vec64::with_capacity(out_shape.iter().product());
    for o in 0..outer {
        for arr in inputs {
            let n = arr.shape()[axis];
            let block = &arr.as_slice()[o * n * inner..(o + 1) * n * inner];
            for v in block {
                out.push(dtype.cast(*v));
            }
        }
    }
    Ok(NdArray::from_parts(out, out_shape, dtype))
}

/// Result shape of joining `shapes` along `axis`.
pub(crate) fn concat_shape<'a>(
    mut shapes: impl Iterator<Item = &'a [usize]>,
    axis: usize,
) -> Result<Vec<usize>, UnitArrowError> {
    let first = shapes.next().ok_or_else(|| UnitArrowError::ShapeError {
        message: "need at least one array to concatenate".into(),
    })?;
    if axis >= first.len() {
        return Err(UnitArrowError::AxisError {
            axis,
            ndim: first.len(),
        });
    }
    let mut out = first.to_vec();
    for shape in shapes {
        let compatible = shape.len() == first.len()
            && shape
                .iter()
                .zip(first)
                .enumerate()
                .all(|(k, (a, b))| k == axis || a == b);
        if !compatible {
            return Err(UnitArrowError::ShapeError {
                message: format!(
                    "cannot concatenate shape {:?} with {:?} along axis {}",
                    shape, first, axis
                ),
            });
        }
        out[axis] += shape[axis];
    }
    Ok(out)
}

/// Result shape of `dot` for one- and two-dimensional operands.
pub(crate) fn dot_shape(a: &[usize], b: &[usize]) -> Result<Vec<usize>, UnitArrowError> {
    let mismatch = || UnitArrowError::ShapeError {
        message: format!("shapes {:?} and {:?} not aligned for dot", a, b),
    };
    match (a, b) {
        ([n], [m]) if n == m => Ok(vec![]),
        ([_, k], [m]) if k == m => Ok(vec![a[0]]),
        ([n], [m, _]) if n == m => Ok(vec![b[1]]),
        ([_, k], [m, _]) if k == m => Ok(vec![a[0], b[1]]),
        ([], _) | (_, []) => Err(UnitArrowError::ShapeError {
            message: "dot of a zero-dimensional operand; use multiply".into(),
        }),
        _ if a.len() > 2 || b.len() > 2 => Err(UnitArrowError::ShapeError {
            message: format!("dot supports up to two dimensions, got {:?} and {:?}", a, b),
        }),
        _ => Err(mismatch()),
    }
}

/// Inner product for vectors, matrix product otherwise.
pub fn dot(a: &NdArray, b: &NdArray, dtype: DType) -> Result<NdArray, UnitArrowError> {
    let out_shape = dot_shape(a.shape(), b.shape())?;
    // Vectors act as a row on the left and a column on the right.
    let (rows, k) = match a.shape() {
        [r, k] => (*r, *k),
        other => (1, other.iter().product()),
    };
    let cols = match b.shape() {
        [_, c] => *c,
        _ => 1,
    };
    let (x, y) = (a.as_slice(), b.as_slice());
    let mut out = Vec64::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let mut acc = 0.0;
            for j in 0..k {
                acc += x[r * k + j] * y[j * cols + c];
            }
            out.push(dtype.cast(acc));
        }
    }
    Ok(NdArray::from_parts(out, out_shape, dtype))
}

/// First order difference along `axis`.
pub fn diff(input: &NdArray, axis: usize) -> Result<NdArray, UnitArrowError> {
    let shape = input.shape();
    if axis >= shape.len() {
        return Err(UnitArrowError::AxisError {
            axis,
            ndim: shape.len(),
        });
    }
    let (outer, n, inner) = lanes(shape, axis);
    let m = n.saturating_sub(1);
    let values = input.as_slice();
    let mut out = Vec64::with_capacity(outer * m * inner);
    for o in 0..outer {
        for j in 0..m {
            for i in 0..inner {
                let lo = values[o * n * inner + j * inner + i];
                let hi = values[o * n * inner + (j + 1) * inner + i];
                out.push(input.dtype().cast(hi - lo));
            }
        }
    }
    let mut out_shape = shape.to_vec();
    out_shape[axis] = m;
    Ok(NdArray::from_parts(out, out_shape, input.dtype()))
}

/// Rounds half to even at `decimals` places, as numpy does.
#[inline]
pub(crate) fn round_to(v: f64, decimals: i32) -> f64 {
    if decimals == 0 {
        return v.round_ties_even();
    }
    let scale = 10f64.powi(decimals);
    (v * scale).round_ties_even() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arr(values: &[f64], shape: &[usize]) -> NdArray {
        NdArray::new(Vec64::from(values.to_vec()), shape.to_vec(), DType::Float64).unwrap()
    }

    #[test]
    fn test_swapaxes() {
        let a = arr(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let t = swapaxes(&a, 0, 1).unwrap();
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(t.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert!(swapaxes(&a, 0, 2).is_err());
    }

    #[test]
    fn test_repeat() {
        let a = arr(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        assert_eq!(repeat(&a, 2, None).unwrap().as_slice(), &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0]);
        let rows = repeat(&a, 2, Some(0)).unwrap();
        assert_eq!(rows.shape(), &[4, 2]);
        assert_eq!(rows.as_slice(), &[1.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 4.0]);
    }

    #[test]
    fn test_concatenate() {
        let a = arr(&[1.0, 2.0], &[1, 2]);
        let b = arr(&[3.0, 4.0, 5.0, 6.0], &[2, 2]);
        let rows = concatenate(&[&a, &b], 0, DType::Float64).unwrap();
        assert_eq!(rows.shape(), &[3, 2]);
        assert_eq!(rows.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert!(concatenate(&[&a, &b], 1, DType::Float64).is_err());
    }

    #[test]
    fn test_dot() {
        let v = arr(&[1.0, 2.0], &[2]);
        let m = arr(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        assert_eq!(dot(&v, &v, DType::Float64).unwrap().item().unwrap(), 5.0);
        assert_eq!(dot(&m, &v, DType::Float64).unwrap().as_slice(), &[5.0, 11.0]);
        assert_eq!(dot(&v, &m, DType::Float64).unwrap().as_slice(), &[7.0, 10.0]);
        assert_eq!(dot(&m, &m, DType::Float64).unwrap().as_slice(), &[7.0, 10.0, 15.0, 22.0]);
        assert!(dot_shape(&[3], &[2]).is_err());
    }

    #[test]
    fn test_diff_and_round() {
        let a = arr(&[1.0, 4.0, 9.0, 16.0], &[2, 2]);
        assert_eq!(diff(&a, 1).unwrap().as_slice(), &[3.0, 7.0]);
        assert_eq!(diff(&a, 0).unwrap().as_slice(), &[8.0, 12.0]);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(1.2345, 2), 1.23);
    }
}
