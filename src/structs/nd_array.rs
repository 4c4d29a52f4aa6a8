//! # **NdArray Module** - *Materialised N-dimensional Array*
//!
//! Row-major, contiguous result of executing a lazy task graph.
//!
//! ## Overview
//! - Backed by a 64-byte aligned [`Vec64<f64>`], the value type every kernel works in.
//! - `dtype` records the declared element type. All values have already been
//!   cast into that type's value space, so an `int32` array only holds integral
//!   values and a `bool` array only holds `0.0` and `1.0`.
//! - A zero-dimensional array (`shape == []`) holds exactly one value.

use std::fmt::{Display, Formatter};

use vec64::Vec64;

use crate::enums::dtype::DType;
use crate::enums::error::UnitArrowError;
use crate::traits::print::{format_float, format_nested};

#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    shape: Vec<usize>,
    dtype: DType,
    data: Vec64<f64>,
}

impl NdArray {
    /// Builds an array, checking the buffer length against `shape`.
    pub fn new(data: Vec64<f64>, shape: Vec<usize>, dtype: DType) -> Result<Self, UnitArrowError> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(UnitArrowError::ShapeError {
                message: format!(
                    "buffer of length {} cannot have shape {:?} ({} elements)",
                    data.len(),
                    shape,
                    expected
                ),
            });
        }
        Ok(Self { shape, dtype, data })
    }

    /// Same as [`NdArray::new`] for buffers a kernel already sized from `shape`.
    #[inline]
    pub(crate) fn from_parts(data: Vec64<f64>, shape: Vec<usize>, dtype: DType) -> Self {
        debug_assert_eq!(data.len(), shape.iter().product::<usize>());
        Self { shape, dtype, data }
    }

    /// Zero-dimensional array holding one value.
    pub fn scalar(value: f64, dtype: DType) -> Self {
        let mut data = Vec64::with_capacity(1);
        data.push(dtype.cast(value));
        Self {
            shape: Vec::new(),
            dtype,
            data,
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        self.data.as_slice()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.data.as_slice().to_vec()
    }

    /// The single value of a one-element array.
    pub fn item(&self) -> Result<f64, UnitArrowError> {
        match self.data.as_slice() {
            [v] => Ok(*v),
            _ => Err(UnitArrowError::ShapeError {
                message: format!(
                    "only one-element arrays can be converted to a scalar, got shape {:?}",
                    self.shape
                ),
            }),
        }
    }

    /// Value at a multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.ndim() {
            return None;
        }
        let mut flat = 0;
        for ((&i, &dim), stride) in index.iter().zip(&self.shape).zip(self.strides()) {
            if i >= dim {
                return None;
            }
            flat += i * stride;
        }
        self.data.as_slice().get(flat).copied()
    }

    /// Row-major strides in elements.
    pub fn strides(&self) -> Vec<usize> {
        strides_of(&self.shape)
    }

    /// Same data under a new shape with the same element count.
    pub(crate) fn with_shape(self, shape: Vec<usize>) -> Self {
        Self::from_parts(self.data, shape, self.dtype)
    }
}

/// Row-major strides in elements for `shape`.
pub(crate) fn strides_of(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for k in (0..shape.len().saturating_sub(1)).rev() {
        strides[k] = strides[k + 1] * shape[k + 1];
    }
    strides
}

/// Renders one value the way its dtype shows in numpy.
pub(crate) fn format_value(dtype: DType, v: f64) -> String {
    match dtype {
        DType::Bool => if v != 0.0 { "True" } else { "False" }.to_string(),
        DType::Int32 | DType::Int64 => format!("{}", v as i64),
        DType::Float32 | DType::Float64 => format_float(v),
    }
}

impl Display for NdArray {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let dtype = self.dtype;
        let body = format_nested(self.as_slice(), &self.shape, &|v| format_value(dtype, v));
        write!(f, "array({}, dtype={})", body, dtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_shape() {
        let data = Vec64::from(vec![1.0, 2.0, 3.0, 4.0]);
        let arr = NdArray::new(data.clone(), vec![2, 2], DType::Float64).unwrap();
        assert_eq!(arr.ndim(), 2);
        assert_eq!(arr.get(&[1, 0]), Some(3.0));
        assert_eq!(arr.get(&[2, 0]), None);
        assert!(NdArray::new(data, vec![3], DType::Float64).is_err());
    }

    #[test]
    fn test_scalar_and_item() {
        let s = NdArray::scalar(2.7, DType::Int32);
        assert_eq!(s.ndim(), 0);
        assert_eq!(s.item().unwrap(), 2.0);
        let v = NdArray::new(Vec64::from(vec![1.0, 2.0]), vec![2], DType::Float64).unwrap();
        assert!(v.item().is_err());
    }

    #[test]
    fn test_strides() {
        assert_eq!(strides_of(&[2, 3, 4]), vec![12, 4, 1]);
        assert_eq!(strides_of(&[]), Vec::<usize>::new());
    }

    #[test]
    fn test_display() {
        let arr = NdArray::new(Vec64::from(vec![1.0, 0.0]), vec![2], DType::Bool).unwrap();
        assert_eq!(arr.to_string(), "array([True, False], dtype=bool)");
        let ints = NdArray::new(Vec64::from(vec![1.0, 2.0]), vec![1, 2], DType::Int64).unwrap();
        assert_eq!(ints.to_string(), "array([[1, 2]], dtype=int64)");
    }
}
