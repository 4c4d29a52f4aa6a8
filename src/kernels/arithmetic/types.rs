//! # Lazy Array Arithmetic Operators
//!
//! Standard Rust arithmetic operators (Add, Sub, Mul, Div, Neg) for
//! [`LazyArray`] and [`UnitLazyArray`].
//!
//! Every operator only extends the task graph. Unit-bearing operators resolve
//! the result unit first and return `Err` on incompatible units, so the
//! output is a `Result`:
//! ```rust
//! use unitarrow::{ChunkSpec, LazyArray, UnitLazyArray, UnitSpec};
//! let m = UnitLazyArray::from_lazy(
//!     LazyArray::from_vec(vec![1.0, 2.0], &[2], ChunkSpec::Auto).unwrap(),
//!     UnitSpec::new("m"),
//! ).unwrap();
//! let s = UnitLazyArray::from_lazy(
//!     LazyArray::from_vec(vec![2.0, 4.0], &[2], ChunkSpec::Auto).unwrap(),
//!     UnitSpec::new("s"),
//! ).unwrap();
//! let v = (&m / &s).unwrap();
//! assert_eq!(v.units().to_string(), "m/s");
//! assert!((&m + &s).is_err());
//! ```

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::enums::error::UnitArrowError;
use crate::enums::operators::Operator;
use crate::kernels::routing::sanitize::Operand;
use crate::structs::lazy::lazy_array::{Input, LazyArray};
use crate::structs::unit_lazy_array::UnitLazyArray;
use crate::units::quantity::Quantity;

macro_rules! lazy_binary {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait<&LazyArray> for &LazyArray {
            type Output = Result<LazyArray, UnitArrowError>;

            fn $method(self, rhs: &LazyArray) -> Self::Output {
                LazyArray::binary($op, &Input::from(self), &Input::from(rhs))
            }
        }

        impl $trait<f64> for &LazyArray {
            type Output = Result<LazyArray, UnitArrowError>;

            fn $method(self, rhs: f64) -> Self::Output {
                LazyArray::binary($op, &Input::from(self), &Input::Scalar(rhs))
            }
        }

        impl $trait<&LazyArray> for f64 {
            type Output = Result<LazyArray, UnitArrowError>;

            fn $method(self, rhs: &LazyArray) -> Self::Output {
                LazyArray::binary($op, &Input::Scalar(self), &Input::from(rhs))
            }
        }
    };
}

lazy_binary!(Add, add, Operator::Add);
lazy_binary!(Sub, sub, Operator::Subtract);
lazy_binary!(Mul, mul, Operator::Multiply);
lazy_binary!(Div, div, Operator::Divide);

impl Neg for &LazyArray {
    type Output = LazyArray;

    fn neg(self) -> LazyArray {
        LazyArray::neg(self)
    }
}

// Unit-bearing operands. Anything convertible into an `Operand` may appear on
// the right; the left-hand impls cover scalars, quantities and plain arrays.
macro_rules! unit_binary {
    ($trait:ident, $method:ident, $op:expr, [$($rhs:ty),*]) => {
        $(
            impl $trait<$rhs> for &UnitLazyArray {
                type Output = Result<UnitLazyArray, UnitArrowError>;

                fn $method(self, rhs: $rhs) -> Self::Output {
                    UnitLazyArray::operator($op, &[Operand::from(self), Operand::from(rhs)])
                }
            }
        )*

        impl $trait<&UnitLazyArray> for f64 {
            type Output = Result<UnitLazyArray, UnitArrowError>;

            fn $method(self, rhs: &UnitLazyArray) -> Self::Output {
                UnitLazyArray::operator($op, &[Operand::Scalar(self), Operand::from(rhs)])
            }
        }

        impl $trait<&UnitLazyArray> for Quantity {
            type Output = Result<UnitLazyArray, UnitArrowError>;

            fn $method(self, rhs: &UnitLazyArray) -> Self::Output {
                UnitLazyArray::operator($op, &[Operand::Quantity(self), Operand::from(rhs)])
            }
        }

        impl $trait<&UnitLazyArray> for &LazyArray {
            type Output = Result<UnitLazyArray, UnitArrowError>;

            fn $method(self, rhs: &UnitLazyArray) -> Self::Output {
                UnitLazyArray::operator($op, &[Operand::from(self), Operand::from(rhs)])
            }
        }
    };
}

unit_binary!(Add, add, Operator::Add, [&UnitLazyArray, f64, Quantity, &Quantity, &LazyArray]);
unit_binary!(Sub, sub, Operator::Subtract, [&UnitLazyArray, f64, Quantity, &Quantity, &LazyArray]);
unit_binary!(Mul, mul, Operator::Multiply, [&UnitLazyArray, f64, Quantity, &Quantity, &LazyArray]);
unit_binary!(Div, div, Operator::Divide, [&UnitLazyArray, f64, Quantity, &Quantity, &LazyArray]);

impl Neg for &UnitLazyArray {
    type Output = Result<UnitLazyArray, UnitArrowError>;

    fn neg(self) -> Self::Output {
        UnitLazyArray::operator(Operator::Neg, &[Operand::from(self)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::chunks::ChunkSpec;
    use crate::traits::collection::Collection;
    use crate::units::spec::UnitSpec;

    fn lazy(values: Vec<f64>) -> LazyArray {
        let n = values.len();
        LazyArray::from_vec(values, &[n], ChunkSpec::Uniform(vec![2])).unwrap()
    }

    fn ula(values: Vec<f64>, units: &str) -> UnitLazyArray {
        UnitLazyArray::from_lazy(lazy(values), UnitSpec::new(units)).unwrap()
    }

    fn computed(a: &UnitLazyArray) -> Vec<f64> {
        a.compute().unwrap().into_array().unwrap().values().to_vec()
    }

    #[test]
    fn test_plain_operators() {
        let a = lazy(vec![1.0, 2.0, 3.0]);
        let sum = (&a + &a).unwrap();
        assert_eq!(sum.compute().unwrap().as_slice(), &[2.0, 4.0, 6.0]);
        let r = (10.0 - &a).unwrap();
        assert_eq!(r.compute().unwrap().as_slice(), &[9.0, 8.0, 7.0]);
        let q = (&a / 2.0).unwrap();
        assert_eq!(q.compute().unwrap().as_slice(), &[0.5, 1.0, 1.5]);
        assert_eq!((-&a).compute().unwrap().as_slice(), &[-1.0, -2.0, -3.0]);
    }

    #[test]
    fn test_unit_operators() {
        let m = ula(vec![1.0, 2.0], "m");
        let km = ula(vec![1.0, 1.0], "km");
        let total = (&m + &km).unwrap();
        assert_eq!(total.units().to_string(), "km");
        let got = computed(&total);
        assert!((got[0] - 1.001).abs() < 1e-12 && (got[1] - 1.002).abs() < 1e-12);

        let scaled = (2.0 * &m).unwrap();
        assert_eq!(scaled.units().to_string(), "m");
        assert_eq!(computed(&scaled), vec![2.0, 4.0]);

        let per_s = (&m / Quantity::parse(2.0, "s").unwrap()).unwrap();
        assert_eq!(per_s.units().to_string(), "m/s");
        assert_eq!(computed(&per_s), vec![0.5, 1.0]);

        let neg = (-&m).unwrap();
        assert_eq!(neg.units().to_string(), "m");
        assert_eq!(computed(&neg), vec![-1.0, -2.0]);
    }

    #[test]
    fn test_plain_array_with_units() {
        let m = ula(vec![1.0, 2.0], "m");
        let plain = lazy(vec![3.0, 4.0]);
        let prod = (&plain * &m).unwrap();
        assert_eq!(prod.units().to_string(), "m");
        assert_eq!(computed(&prod), vec![3.0, 8.0]);
        assert!((&m + &plain).is_err());
    }

    #[test]
    fn test_incompatible_units_rejected() {
        let m = ula(vec![1.0], "m");
        let s = ula(vec![1.0], "s");
        assert!(matches!(&m - &s, Err(UnitArrowError::UnitOperationError { .. })));
        assert!(matches!(1.0 + &m, Err(UnitArrowError::UnitOperationError { .. })));
    }
}
