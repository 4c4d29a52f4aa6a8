//! # Unit Resolution
//!
//! Runs sanitation, derives the result unit of an operation and strips the
//! operands down to engine inputs. Nothing is added to any graph here, so a
//! failed resolution leaves no trace.

use tracing::trace;

use crate::enums::error::UnitArrowError;
use crate::enums::operators::{Operation, Operator};
use crate::kernels::routing::sanitize::{Operand, sanitize};
use crate::structs::lazy::lazy_array::Input;
use crate::units::combine::{Resolved, UnitToken, required_input_unit, resolve_unit};
use crate::units::unit::Unit;

/// Resolves `operation` over `operands`, returning the engine inputs and the
/// unit the result carries.
pub fn resolve(operation: Operation, operands: &[Operand]) -> Result<(Vec<Input>, Resolved), UnitArrowError> {
    let mut operands = sanitize(operands)?;
    if let (Operation::Ufunc(ufunc), Some(first)) = (operation, operands.first()) {
        if let Some(target) = required_input_unit(ufunc, &first.token()) {
            trace!(operation = ufunc.name(), to = %target, "normalising ufunc input");
            let converted = first.convert_to(&target)?;
            operands[0] = converted;
        }
    }
    // Exponents in scaled dimensionless units, e.g. `m/cm`, are read at scale 1.
    if let (Operation::Operator(Operator::Power), Some(exponent)) = (operation, operands.get(1)) {
        if exponent.units().is_some_and(|u| u.is_dimensionless() && u.base_value() != 1.0) {
            let converted = exponent.convert_to(&Unit::dimensionless())?;
            operands[1] = converted;
        }
    }
    let tokens: Vec<UnitToken> = operands.iter().map(Operand::token).collect();
    let resolved = resolve_unit(operation, &tokens)?;
    trace!(
        operation = operation.name(),
        units = %resolved.units().map(|u| u.to_string()).unwrap_or_else(|| "<plain>".into()),
        "resolved result unit"
    );
    Ok((operands.iter().map(Operand::strip).collect(), resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::operators::Ufunc;
    use crate::units::quantity::Quantity;
    use crate::structs::chunks::ChunkSpec;
    use crate::structs::lazy::lazy_array::LazyArray;
    use crate::structs::unit_lazy_array::UnitLazyArray;
    use crate::units::spec::UnitSpec;

    fn ula(units: &str) -> UnitLazyArray {
        let lazy = LazyArray::from_vec(vec![1.0, 2.0], &[2], ChunkSpec::Auto).unwrap();
        UnitLazyArray::from_lazy(lazy, UnitSpec::new(units)).unwrap()
    }

    #[test]
    fn test_resolve_operator() {
        let (inputs, resolved) = resolve(
            Operation::Operator(Operator::Multiply),
            &[Operand::from(ula("m")), Operand::Scalar(2.0)],
        )
        .unwrap();
        assert_eq!(inputs.len(), 2);
        assert!(matches!(inputs[1], Input::Scalar(v) if v == 2.0));
        assert_eq!(resolved.units().unwrap().to_string(), "m");
    }

    #[test]
    fn test_resolve_rejects_before_building() {
        let a = ula("m");
        let b = ula("s");
        let err = resolve(Operation::Operator(Operator::Add), &[a.into(), b.into()]).unwrap_err();
        assert!(matches!(err, UnitArrowError::UnitOperationError { .. }));
    }

    #[test]
    fn test_scaled_exponent_read_at_scale_one() {
        let ratio = Quantity::parse(0.02, "m/cm").unwrap();
        let (inputs, _) = resolve(
            Operation::Operator(Operator::Power),
            &[Operand::from(ula("m")), Operand::from(ratio)],
        )
        .unwrap();
        match inputs[1] {
            Input::Scalar(v) => assert!((v - 2.0).abs() < 1e-12),
            Input::Array(_) => panic!("expected a scalar exponent"),
        }
    }

    #[test]
    fn test_degrees_normalised_for_trig() {
        let (inputs, resolved) =
            resolve(Operation::Ufunc(Ufunc::Sin), &[Operand::from(ula("deg"))]).unwrap();
        assert!(resolved.units().unwrap().is_dimensionless());
        // The stripped input is the degree array scaled into radians.
        match &inputs[0] {
            Input::Array(a) => assert_eq!(a.graph().len(), 2),
            Input::Scalar(_) => panic!("expected an array input"),
        }
    }
}
