//! # Collection Trait
//!
//! Materialisation of lazy arrays.
//!
//! `compute()` executes the graph and hands the raw result to
//! `post_compute`, which decides the concrete output type. Unit-bearing arrays
//! attach their carried unit here, based only on the realised shape.

use std::fmt::{Display, Formatter};

use crate::enums::error::UnitArrowError;
use crate::structs::lazy::execute::execute;
use crate::structs::lazy::graph::TaskGraph;
use crate::structs::lazy::lazy_array::LazyArray;
use crate::structs::nd_array::NdArray;
use crate::structs::unit_lazy_array::UnitLazyArray;
use crate::units::quantity::Quantity;
use crate::units::unit::Unit;
use crate::units::unit_array::UnitArray;

pub trait Collection {
    type Output;

    fn graph(&self) -> &TaskGraph;

    /// Turns the raw executed value into this collection's concrete output.
    fn post_compute(&self, raw: NdArray) -> Result<Self::Output, UnitArrowError>;

    /// Executes the graph and finalises the result.
    fn compute(&self) -> Result<Self::Output, UnitArrowError> {
        let raw = execute(self.graph())?;
        self.post_compute(raw)
    }
}

impl Collection for LazyArray {
    type Output = NdArray;

    fn graph(&self) -> &TaskGraph {
        LazyArray::graph(self)
    }

    fn post_compute(&self, raw: NdArray) -> Result<NdArray, UnitArrowError> {
        Ok(raw)
    }
}

/// Concrete result of computing a unit-bearing lazy array.
#[derive(Debug, Clone, PartialEq)]
pub enum Finalized {
    Array(UnitArray),
    Scalar(Quantity),
}

impl Finalized {
    pub fn units(&self) -> &Unit {
        match self {
            Finalized::Array(a) => a.units(),
            Finalized::Scalar(q) => q.units(),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Finalized::Scalar(_))
    }

    pub fn into_array(self) -> Result<UnitArray, UnitArrowError> {
        match self {
            Finalized::Array(a) => Ok(a),
            Finalized::Scalar(_) => Err(UnitArrowError::TypeError {
                from: "Quantity",
                to: "UnitArray",
                message: Some("the computed result is zero-dimensional".into()),
            }),
        }
    }

    pub fn into_scalar(self) -> Result<Quantity, UnitArrowError> {
        match self {
            Finalized::Scalar(q) => Ok(q),
            Finalized::Array(_) => Err(UnitArrowError::TypeError {
                from: "UnitArray",
                to: "Quantity",
                message: Some("the computed result has dimensions".into()),
            }),
        }
    }
}

impl Display for Finalized {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Finalized::Array(a) => write!(f, "{}", a),
            Finalized::Scalar(q) => write!(f, "{}", q),
        }
    }
}

impl Collection for UnitLazyArray {
    type Output = Finalized;

    fn graph(&self) -> &TaskGraph {
        self.as_lazy().graph()
    }

    fn post_compute(&self, raw: NdArray) -> Result<Finalized, UnitArrowError> {
        let sidecar = self.sidecar();
        if raw.ndim() == 0 {
            Ok(Finalized::Scalar(Quantity::from_parts(
                raw.item()?,
                sidecar.units().clone(),
                sidecar.registry().clone(),
                raw.dtype(),
                sidecar.name().map(str::to_string),
            )))
        } else {
            Ok(Finalized::Array(UnitArray::with_sidecar(raw, sidecar)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::chunks::ChunkSpec;
    use crate::units::spec::UnitSpec;

    fn metres() -> UnitLazyArray {
        let lazy = LazyArray::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2], ChunkSpec::Auto).unwrap();
        UnitLazyArray::from_lazy(lazy, UnitSpec::new("m")).unwrap()
    }

    #[test]
    fn test_array_finalises_to_unit_array() {
        let out = metres().compute().unwrap();
        assert!(!out.is_scalar());
        let arr = out.into_array().unwrap();
        assert_eq!(arr.shape(), &[2, 2]);
        assert_eq!(arr.units().to_string(), "m");
    }

    #[test]
    fn test_reduction_finalises_to_quantity() {
        let out = metres().mean(None).unwrap().compute().unwrap();
        let q = out.clone().into_scalar().unwrap();
        assert_eq!(q.value(), 2.5);
        assert_eq!(q.units().to_string(), "m");
        assert!(out.into_array().is_err());
    }

    #[test]
    fn test_plain_lazy_returns_raw() {
        let lazy = LazyArray::ones(&[3], ChunkSpec::Auto, crate::enums::dtype::DType::Int32).unwrap();
        let raw = lazy.compute().unwrap();
        assert_eq!(raw.as_slice(), &[1.0, 1.0, 1.0]);
    }
}
