//! # Reduction Kernels
//!
//! Axis reductions, cumulative sums and top-k selection over materialised arrays.
//!
//! A reduction along `axis` views the buffer as `outer × n × inner` lanes,
//! where `n` is the axis length, and folds each lane to one value.

use std::cmp::Ordering;

use vec64::Vec64;

use crate::enums::dtype::DType;
use crate::enums::error::UnitArrowError;
use crate::enums::operators::Reduction;
use crate::structs::nd_array::NdArray;

/// Splits `shape` around `axis` into `(outer, n, inner)`.
#[inline]
pub(crate) fn lanes(shape: &[usize], axis: usize) -> (usize, usize, usize) {
    let outer = shape[..axis].iter().product();
    let inner = shape[axis + 1..].iter().product();
    (outer, shape[axis], inner)
}

/// Reduces `input` along `axis`, or over every value when `axis` is `None`.
pub fn reduce(
    input: &NdArray,
    reduction: Reduction,
    axis: Option<usize>,
    dtype: DType,
) -> Result<NdArray, UnitArrowError> {
    let values = input.as_slice();
    match axis {
        None => {
            let mut lane = values.to_vec();
            let v = fold(reduction, &mut lane)?;
            Ok(NdArray::scalar(v, dtype))
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
            let mut out = Vec64::with_capacity(outer * inner);
            let mut lane = Vec::with_capacity(n);
            for o in 0..outer {
                for i in 0..inner {
                    lane.clear();
                    lane.extend((0..n).map(|j| values[o * n * inner + j * inner + i]));
                    out.push(dtype.cast(fold(reduction, &mut lane)?));
                }
            }
            let mut out_shape = shape.to_vec();
            out_shape.remove(axis);
            Ok(NdArray::from_parts(out, out_shape, dtype))
        }
    }
}

/// Folds one lane. The lane may be reordered.
fn fold(reduction: Reduction, lane: &mut [f64]) -> Result<f64, UnitArrowError> {
    let n = lane.len();
    if n == 0 {
        return match reduction {
            Reduction::Sum => Ok(0.0),
            Reduction::Mean | Reduction::Std { .. } | Reduction::Var { .. } | Reduction::Median => {
                Ok(f64::NAN)
            }
            _ => Err(UnitArrowError::ShapeError {
                message: format!(
                    "zero-size array to reduction operation {} which has no identity",
                    reduction.name()
                ),
            }),
        };
    }
    let has_nan = lane.iter().any(|v| v.is_nan());
    Ok(match reduction {
        Reduction::Sum => lane.iter().sum(),
        Reduction::Mean => lane.iter().sum::<f64>() / n as f64,
        Reduction::Min if has_nan => f64::NAN,
        Reduction::Min => lane.iter().copied().fold(f64::INFINITY, f64::min),
        Reduction::Max if has_nan => f64::NAN,
        Reduction::Max => lane.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Reduction::Ptp if has_nan => f64::NAN,
        Reduction::Ptp => {
            let (lo, hi) = lane
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            hi - lo
        }
        Reduction::Var { ddof } => variance(lane, ddof),
        Reduction::Std { ddof } => variance(lane, ddof).sqrt(),
        Reduction::Median if has_nan => f64::NAN,
        Reduction::Median => {
            lane.sort_by(f64::total_cmp);
            if n % 2 == 1 {
                lane[n / 2]
            } else {
                (lane[n / 2 - 1] + lane[n / 2]) / 2.0
            }
        }
    })
}

fn variance(lane: &[f64], ddof: usize) -> f64 {
    let n = lane.len();
    if n <= ddof {
        return f64::NAN;
    }
    let mean = lane.iter().sum::<f64>() / n as f64;
    let ss: f64 = lane.iter().map(|v| (v - mean) * (v - mean)).sum();
    ss / (n - ddof) as f64
}

/// Running sum along `axis`.
pub fn cumsum(input: &NdArray, axis: usize, dtype: DType) -> Result<NdArray, UnitArrowError> {
    let shape = input.shape();
    if axis >= shape.len() {
        return Err(UnitArrowError::AxisError {
            axis,
            ndim: shape.len(),
        });
    }
    let values = input.as_slice();
    let (outer, n, inner) = lanes(shape, axis);
    let mut out = Vec64::from(vec![0.0; values.len()]);
    for o in 0..outer {
        for i in 0..inner {
            let mut acc = 0.0;
            for j in 0..n {
                let idx = o * n * inner + j * inner + i;
                acc += values[idx];
                out[idx] = dtype.cast(acc);
            }
        }
    }
    Ok(NdArray::from_parts(out, shape.to_vec(), dtype))
}

/// The `|k|` largest values along the last axis, in descending order, or the
/// `|k|` smallest in ascending order when `k` is negative.
pub fn topk(input: &NdArray, k: i64) -> Result<NdArray, UnitArrowError> {
    let shape = input.shape();
    let Some(&n) = shape.last() else {
        return Err(UnitArrowError::ShapeError {
            message: "topk requires at least one dimension".into(),
        });
    };
    let take = k.unsigned_abs() as usize;
    if take > n {
        return Err(UnitArrowError::ShapeError {
            message: format!("topk of {} values along an axis of length {}", take, n),
        });
    }
    let values = input.as_slice();
    let rows = if n == 0 { 0 } else { values.len() / n };
    let mut out = Vec64::with_capacity(rows * take);
    let mut lane: Vec<f64> = Vec::with_capacity(n);
    for r in 0..rows {
        lane.clear();
        lane.extend_from_slice(&values[r * n..(r + 1) * n]);
        if k >= 0 {
            lane.sort_by(|a, b| descending(*a, *b));
        } else {
            lane.sort_by(f64::total_cmp);
        }
        for v in &lane[..take] {
            out.push(*v);
        }
    }
    let mut out_shape = shape.to_vec();
    if let Some(last) = out_shape.last_mut() {
        *last = take;
    }
    Ok(NdArray::from_parts(out, out_shape, input.dtype()))
}

#[inline]
fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arr(values: &[f64], shape: &[usize]) -> NdArray {
        NdArray::new(Vec64::from(values.to_vec()), shape.to_vec(), DType::Float64).unwrap()
    }

    #[test]
    fn test_full_reductions() {
        let a = arr(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let f = DType::Float64;
        assert_eq!(reduce(&a, Reduction::Sum, None, f).unwrap().item().unwrap(), 10.0);
        assert_eq!(reduce(&a, Reduction::Mean, None, f).unwrap().item().unwrap(), 2.5);
        assert_eq!(reduce(&a, Reduction::Ptp, None, f).unwrap().item().unwrap(), 3.0);
        assert_eq!(reduce(&a, Reduction::Median, None, f).unwrap().item().unwrap(), 2.5);
        let var = reduce(&a, Reduction::Var { ddof: 0 }, None, f).unwrap();
        assert_eq!(var.item().unwrap(), 1.25);
        assert_eq!(var.ndim(), 0);
    }

    #[test]
    fn test_axis_reductions() {
        let a = arr(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let rows = reduce(&a, Reduction::Sum, Some(1), DType::Float64).unwrap();
        assert_eq!(rows.shape(), &[2]);
        assert_eq!(rows.as_slice(), &[6.0, 15.0]);
        let cols = reduce(&a, Reduction::Max, Some(0), DType::Float64).unwrap();
        assert_eq!(cols.as_slice(), &[4.0, 5.0, 6.0]);
        assert!(matches!(
            reduce(&a, Reduction::Sum, Some(2), DType::Float64),
            Err(UnitArrowError::AxisError { axis: 2, ndim: 2 })
        ));
    }

    #[test]
    fn test_nan_and_empty() {
        let a = arr(&[1.0, f64::NAN], &[2]);
        assert!(reduce(&a, Reduction::Max, None, DType::Float64).unwrap().item().unwrap().is_nan());
        let empty = arr(&[], &[0]);
        assert_eq!(reduce(&empty, Reduction::Sum, None, DType::Float64).unwrap().item().unwrap(), 0.0);
        assert!(reduce(&empty, Reduction::Min, None, DType::Float64).is_err());
    }

    #[test]
    fn test_cumsum() {
        let a = arr(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        assert_eq!(cumsum(&a, 0, DType::Float64).unwrap().as_slice(), &[1.0, 2.0, 4.0, 6.0]);
        assert_eq!(cumsum(&a, 1, DType::Float64).unwrap().as_slice(), &[1.0, 3.0, 3.0, 7.0]);
    }

    #[test]
    fn test_topk() {
        let a = arr(&[5.0, 1.0, 4.0, 2.0, 8.0, 3.0], &[2, 3]);
        let top = topk(&a, 2).unwrap();
        assert_eq!(top.shape(), &[2, 2]);
        assert_eq!(top.as_slice(), &[5.0, 4.0, 8.0, 3.0]);
        let bottom = topk(&a, -1).unwrap();
        assert_eq!(bottom.as_slice(), &[1.0, 2.0]);
        assert!(topk(&a, 4).is_err());
    }
}
