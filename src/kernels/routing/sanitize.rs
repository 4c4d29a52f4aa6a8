//! # Operand Sanitation
//!
//! Prepares the operands of a unit-aware operation for unit resolution.
//!
//! When the first two operands carry units that differ but share dimensions,
//! the one whose unit is smaller (by `base_value`) is converted into the
//! other's unit, so `cm + m` runs in metres. Only those first two operands are
//! reconciled; a third `km` operand to a concatenation is left as is. No
//! dimensional checks happen here: incompatible units are rejected when the
//! result unit is resolved.

use tracing::debug;

use crate::enums::error::UnitArrowError;
use crate::structs::lazy::lazy_array::{Input, LazyArray};
use crate::structs::unit_lazy_array::UnitLazyArray;
use crate::units::combine::UnitToken;
use crate::units::quantity::Quantity;
use crate::units::unit::Unit;

/// One operand of a unit-aware operation.
#[derive(Debug, Clone)]
pub enum Operand {
    Unit(UnitLazyArray),
    Lazy(LazyArray),
    Quantity(Quantity),
    Scalar(f64),
}

impl Operand {
    /// The operand's stand-in for unit resolution.
    pub fn token(&self) -> UnitToken {
        match self {
            Operand::Unit(u) => UnitToken::UnitArray(u.sidecar().clone()),
            Operand::Quantity(q) => UnitToken::Quantity(q.clone()),
            Operand::Lazy(_) => UnitToken::PlainArray,
            Operand::Scalar(v) => UnitToken::Scalar(*v),
        }
    }

    pub fn units(&self) -> Option<&Unit> {
        match self {
            Operand::Unit(u) => Some(u.units()),
            Operand::Quantity(q) => Some(q.units()),
            Operand::Lazy(_) | Operand::Scalar(_) => None,
        }
    }

    /// Expresses a unit-bearing operand in `target`. Plain operands pass through.
    pub(crate) fn convert_to(&self, target: &Unit) -> Result<Operand, UnitArrowError> {
        Ok(match self {
            Operand::Unit(u) => Operand::Unit(u.to(target)?),
            Operand::Quantity(q) => Operand::Quantity(q.to(target)?),
            other => other.clone(),
        })
    }

    /// The engine input with units stripped.
    pub fn strip(&self) -> Input {
        match self {
            Operand::Unit(u) => Input::Array(u.to_lazy()),
            Operand::Lazy(a) => Input::Array(a.clone()),
            Operand::Quantity(q) => Input::Scalar(q.value()),
            Operand::Scalar(v) => Input::Scalar(*v),
        }
    }
}

impl From<UnitLazyArray> for Operand {
    fn from(u: UnitLazyArray) -> Self {
        Operand::Unit(u)
    }
}

impl From<&UnitLazyArray> for Operand {
    fn from(u: &UnitLazyArray) -> Self {
        Operand::Unit(u.clone())
    }
}

impl From<LazyArray> for Operand {
    fn from(a: LazyArray) -> Self {
        Operand::Lazy(a)
    }
}

impl From<&LazyArray> for Operand {
    fn from(a: &LazyArray) -> Self {
        Operand::Lazy(a.clone())
    }
}

impl From<Quantity> for Operand {
    fn from(q: Quantity) -> Self {
        Operand::Quantity(q)
    }
}

impl From<&Quantity> for Operand {
    fn from(q: &Quantity) -> Self {
        Operand::Quantity(q.clone())
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Scalar(v)
    }
}

/// Reconciles the units of the first two operands.
pub fn sanitize(operands: &[Operand]) -> Result<Vec<Operand>, UnitArrowError> {
    let mut out = operands.to_vec();
    let (Some(a), Some(b)) = (
        operands.first().and_then(Operand::units),
        operands.get(1).and_then(Operand::units),
    ) else {
        return Ok(out);
    };
    if a == b || !a.same_dimensions(b) {
        return Ok(out);
    }
    // The smaller unit is converted; on a tie the second operand follows the first.
    let (idx, target) = if a.base_value() < b.base_value() {
        (0, b.clone())
    } else {
        (1, a.clone())
    };
    debug!(operand = idx, from = %out[idx].units().map(|u| u.to_string()).unwrap_or_default(), to = %target, "reconciling operand units");
    out[idx] = out[idx].convert_to(&target)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::chunks::ChunkSpec;
    use crate::units::spec::UnitSpec;

    fn ula(values: Vec<f64>, units: &str) -> UnitLazyArray {
        let n = values.len();
        let lazy = LazyArray::from_vec(values, &[n], ChunkSpec::Auto).unwrap();
        UnitLazyArray::from_lazy(lazy, UnitSpec::new(units)).unwrap()
    }

    #[test]
    fn test_smaller_unit_is_converted() {
        let cm = Operand::from(ula(vec![100.0], "cm"));
        let m = Operand::from(ula(vec![1.0], "m"));
        let out = sanitize(&[cm, m]).unwrap();
        assert_eq!(out[0].units().unwrap().to_string(), "m");
        assert_eq!(out[1].units().unwrap().to_string(), "m");
    }

    #[test]
    fn test_only_first_two_are_reconciled() {
        let ops = [
            Operand::from(ula(vec![1.0], "m")),
            Operand::from(ula(vec![1.0], "cm")),
            Operand::from(ula(vec![1.0], "km")),
        ];
        let out = sanitize(&ops).unwrap();
        assert_eq!(out[1].units().unwrap().to_string(), "m");
        assert_eq!(out[2].units().unwrap().to_string(), "km");
    }

    #[test]
    fn test_incompatible_and_plain_pass_through() {
        let ops = [Operand::from(ula(vec![1.0], "m")), Operand::from(ula(vec![1.0], "s"))];
        let out = sanitize(&ops).unwrap();
        assert_eq!(out[1].units().unwrap().to_string(), "s");
        let ops = [Operand::from(ula(vec![1.0], "m")), Operand::Scalar(2.0)];
        assert!(sanitize(&ops).is_ok());
    }

    #[test]
    fn test_quantity_operand_converted() {
        let q = Quantity::parse(3.0, "km").unwrap();
        let ops = [Operand::from(ula(vec![1.0], "m")), Operand::from(q)];
        let out = sanitize(&ops).unwrap();
        // metres are smaller than kilometres, so the array moves
        assert_eq!(out[0].units().unwrap().to_string(), "km");
        match &out[1] {
            Operand::Quantity(q) => assert_eq!(q.value(), 3.0),
            other => panic!("unexpected operand {:?}", other),
        }
    }
}
