//! # DType Enum Module
//!
//! Element types a lazy array can declare.
//!
//! Values are carried as `f64` inside the engine. The dtype decides how each
//! value is cast when a task writes its output, how type promotion behaves in
//! binary operations, and how values are shown.

use std::fmt::{Display, Formatter};

use crate::enums::error::UnitArrowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DType {
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl DType {
    /// Name as shown in array representations.
    pub fn name(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
        }
    }

    /// Size of one element in bytes.
    pub fn itemsize(self) -> usize {
        match self {
            DType::Bool => 1,
            DType::Int32 | DType::Float32 => 4,
            DType::Int64 | DType::Float64 => 8,
        }
    }

    #[inline]
    pub fn is_float(self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    #[inline]
    pub fn is_integer(self) -> bool {
        matches!(self, DType::Int32 | DType::Int64)
    }

    /// Result type of a binary arithmetic operation between two dtypes.
    ///
    /// Mixing `float32` with any integer widens to `float64`.
    pub fn promote(self, other: DType) -> DType {
        use DType::*;
        match (self, other) {
            (Float32, Int32) | (Int32, Float32) | (Float32, Int64) | (Int64, Float32) => Float64,
            (a, b) => a.max(b),
        }
    }

    /// Result type when a plain scalar enters an operation with this dtype.
    ///
    /// Floats keep their width; integers and booleans widen to `float64`
    /// because scalar operands are carried as `f64`.
    pub fn promote_scalar(self) -> DType {
        if self.is_float() { self } else { DType::Float64 }
    }

    /// Result type of a floating point only operation, e.g. true division or `sin`.
    pub fn to_float(self) -> DType {
        if self.is_float() { self } else { DType::Float64 }
    }

    /// Casts a carried value into this dtype's value space.
    #[inline(always)]
    pub fn cast(self, v: f64) -> f64 {
        match self {
            DType::Float64 => v,
            DType::Float32 => v as f32 as f64,
            DType::Int64 => v as i64 as f64,
            DType::Int32 => v as i32 as f64,
            DType::Bool => {
                if v != 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Reinterprets a value's bits as another dtype of the same item size.
    pub fn reinterpret(self, to: DType, v: f64) -> Result<f64, UnitArrowError> {
        use DType::*;
        if self == to {
            return Ok(v);
        }
        match (self, to) {
            (Float64, Int64) => Ok(v.to_bits() as i64 as f64),
            (Int64, Float64) => Ok(f64::from_bits(v as i64 as u64)),
            (Float32, Int32) => Ok((v as f32).to_bits() as i32 as f64),
            (Int32, Float32) => Ok(f32::from_bits(v as i32 as u32) as f64),
            _ => Err(UnitArrowError::TypeError {
                from: self.name(),
                to: to.name(),
                message: Some("view requires dtypes of equal item size".into()),
            }),
        }
    }
}

impl Display for DType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion() {
        assert_eq!(DType::Int32.promote(DType::Int64), DType::Int64);
        assert_eq!(DType::Float32.promote(DType::Int32), DType::Float64);
        assert_eq!(DType::Float32.promote(DType::Float32), DType::Float32);
        assert_eq!(DType::Bool.promote(DType::Int32), DType::Int32);
        assert_eq!(DType::Int64.promote_scalar(), DType::Float64);
    }

    #[test]
    fn test_cast() {
        assert_eq!(DType::Int64.cast(2.7), 2.0);
        assert_eq!(DType::Int32.cast(-2.7), -2.0);
        assert_eq!(DType::Bool.cast(3.0), 1.0);
        assert_eq!(DType::Float32.cast(0.1), 0.1f32 as f64);
    }

    #[test]
    fn test_reinterpret_roundtrip() {
        let bits = DType::Float64.reinterpret(DType::Int64, 1.5).unwrap();
        let back = DType::Int64.reinterpret(DType::Float64, bits).unwrap();
        assert_eq!(back, 1.5);
        assert!(DType::Float64.reinterpret(DType::Int32, 1.0).is_err());
    }
}
