//! # Unit Combination Rules
//!
//! Explicit per-operation rules deciding the unit of a result from the unit
//! tokens of its operands.
//!
//! Tokens stand in for operands without touching their data:
//! - a unit-bearing array contributes its sidecar, whose magnitude is always 1.0;
//! - a scalar [`Quantity`] contributes itself, value included;
//! - a plain scalar contributes its value, which matters for exponents;
//! - a plain lazy array contributes nothing but its presence.
//!
//! Every rule either returns the result's unit, returns [`Resolved::Plain`]
//! for results that carry no unit (predicates), or fails with
//! `UnitOperationError` when the operand units cannot be combined.

use std::sync::Arc;

use crate::enums::dtype::DType;
use crate::enums::error::UnitArrowError;
use crate::enums::operators::{ArrayFunction, Operation, Operator, Ufunc};
use crate::units::quantity::Quantity;
use crate::units::registry::UnitRegistry;
use crate::units::unit::Unit;

/// Stand-in for one operand during unit resolution.
#[derive(Debug, Clone)]
pub enum UnitToken {
    Quantity(Quantity),
    /// Sidecar of a unit-bearing array. Only its units are meaningful.
    UnitArray(Quantity),
    Scalar(f64),
    PlainArray,
}

impl UnitToken {
    pub fn units(&self) -> Option<&Unit> {
        match self {
            UnitToken::Quantity(q) | UnitToken::UnitArray(q) => Some(q.units()),
            _ => None,
        }
    }

    fn quantity(&self) -> Option<&Quantity> {
        match self {
            UnitToken::Quantity(q) | UnitToken::UnitArray(q) => Some(q),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            UnitToken::Quantity(q) | UnitToken::UnitArray(q) => q.units().to_string(),
            UnitToken::Scalar(_) | UnitToken::PlainArray => "dimensionless".into(),
        }
    }
}

/// Outcome of unit resolution.
#[derive(Debug, Clone)]
pub enum Resolved {
    /// The result carries the units of this magnitude 1.0 token.
    Unit(Quantity),
    /// The result carries no units, e.g. a comparison.
    Plain,
}

impl Resolved {
    pub fn units(&self) -> Option<&Unit> {
        match self {
            Resolved::Unit(q) => Some(q.units()),
            Resolved::Plain => None,
        }
    }
}

/// Derives the unit of `operation` applied to `tokens`.
pub fn resolve_unit(operation: Operation, tokens: &[UnitToken]) -> Result<Resolved, UnitArrowError> {
    let name = operation.name();
    let unit = match operation {
        Operation::Operator(op) => operator_unit(op, tokens, name)?,
        Operation::Ufunc(ufunc) => match ufunc_unit(ufunc, tokens, name)? {
            UfuncUnit::Unit(u) => u,
            UfuncUnit::Plain => return Ok(Resolved::Plain),
        },
        Operation::Function(func) => function_unit(func, tokens, name)?,
    };
    Ok(match unit {
        Some(u) => Resolved::Unit(token_for(u, tokens)),
        None => Resolved::Plain,
    })
}

/// Unit the first operand must be expressed in before a ufunc sees its values.
///
/// Trigonometric functions read their argument in radians, and
/// exponentials and logarithms read dimensionless values at scale 1,
/// so `deg` and ratios such as `m/cm` are normalised first.
pub fn required_input_unit(ufunc: Ufunc, token: &UnitToken) -> Option<Unit> {
    let units = token.units()?;
    match ufunc {
        Ufunc::Sin | Ufunc::Cos | Ufunc::Tan
            if !units.is_dimensionless()
                && units.dimensions().is_angle_or_dimensionless()
                && units.base_value() != 1.0 =>
        {
            let registry = token
                .quantity()
                .map_or_else(UnitRegistry::default_registry, |q| q.registry().clone());
            registry.lookup("rad").ok()
        }
        Ufunc::Sin
        | Ufunc::Cos
        | Ufunc::Tan
        | Ufunc::Exp
        | Ufunc::Expm1
        | Ufunc::Log
        | Ufunc::Log2
        | Ufunc::Log10
        | Ufunc::Log1p
        | Ufunc::Arcsin
        | Ufunc::Arccos
        | Ufunc::Arctan
            if units.is_dimensionless() && units.base_value() != 1.0 =>
        {
            Some(Unit::dimensionless())
        }
        _ => None,
    }
}

fn operator_unit(
    op: Operator,
    tokens: &[UnitToken],
    name: &'static str,
) -> Result<Option<Unit>, UnitArrowError> {
    match op {
        Operator::Add | Operator::Subtract => additive(name, arg(tokens, 0)?, arg(tokens, 1)?),
        Operator::Multiply => multiplicative(arg(tokens, 0)?, arg(tokens, 1)?, false),
        Operator::Divide => multiplicative(arg(tokens, 0)?, arg(tokens, 1)?, true),
        Operator::Power => power(name, arg(tokens, 0)?, arg(tokens, 1)?),
        Operator::Abs | Operator::Neg => Ok(arg(tokens, 0)?.units().cloned()),
    }
}

enum UfuncUnit {
    Unit(Option<Unit>),
    Plain,
}

fn ufunc_unit(
    ufunc: Ufunc,
    tokens: &[UnitToken],
    name: &'static str,
) -> Result<UfuncUnit, UnitArrowError> {
    use Ufunc::*;
    let first = arg(tokens, 0)?;
    let unit = match ufunc {
        Sin | Cos | Tan => {
            require(name, first, |u| u.dimensions().is_angle_or_dimensionless())?;
            any_units(tokens).then(Unit::dimensionless)
        }
        Arcsin | Arccos | Arctan => {
            require(name, first, Unit::is_dimensionless)?;
            any_units(tokens).then(|| radian(first))
        }
        Arctan2 => {
            additive(name, first, arg(tokens, 1)?)?;
            any_units(tokens).then(|| radian(first))
        }
        Exp | Expm1 | Log | Log2 | Log10 | Log1p => {
            require(name, first, Unit::is_dimensionless)?;
            any_units(tokens).then(Unit::dimensionless)
        }
        Sqrt => power(name, first, &UnitToken::Scalar(0.5))?,
        Cbrt => power(name, first, &UnitToken::Scalar(1.0 / 3.0))?,
        Square => power(name, first, &UnitToken::Scalar(2.0))?,
        Reciprocal => power(name, first, &UnitToken::Scalar(-1.0))?,
        Absolute | Negative | Floor | Ceil | Rint => first.units().cloned(),
        Sign => first.units().map(|_| Unit::dimensionless()),
        IsFinite | IsNan => return Ok(UfuncUnit::Plain),
        Hypot | Maximum | Minimum => additive(name, first, arg(tokens, 1)?)?,
        Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual => {
            additive(name, first, arg(tokens, 1)?)?;
            return Ok(UfuncUnit::Plain);
        }
    };
    Ok(UfuncUnit::Unit(unit))
}

fn function_unit(
    func: ArrayFunction,
    tokens: &[UnitToken],
    name: &'static str,
) -> Result<Option<Unit>, UnitArrowError> {
    match func {
        ArrayFunction::Concatenate { .. } => {
            let first = arg(tokens, 0)?;
            let mut unit = first.units().cloned();
            for token in &tokens[1..] {
                let acc = match &unit {
                    Some(u) => UnitToken::Quantity(token_for(u.clone(), tokens)),
                    None => UnitToken::PlainArray,
                };
                unit = additive(name, &acc, token)?;
            }
            Ok(unit)
        }
        ArrayFunction::Dot => multiplicative(arg(tokens, 0)?, arg(tokens, 1)?, false),
        ArrayFunction::Var { .. } => power(name, arg(tokens, 0)?, &UnitToken::Scalar(2.0)),
        ArrayFunction::Median { .. } | ArrayFunction::Ptp { .. } | ArrayFunction::Diff { .. } => {
            Ok(arg(tokens, 0)?.units().cloned())
        }
    }
}

/// Addition-like rule: both sides must share dimensions. The result keeps the
/// left-hand unit, or the right-hand one when only the right carries units.
fn additive(
    name: &'static str,
    a: &UnitToken,
    b: &UnitToken,
) -> Result<Option<Unit>, UnitArrowError> {
    match (a.units(), b.units()) {
        (Some(ua), Some(ub)) => {
            if ua.same_dimensions(ub) {
                Ok(Some(ua.clone()))
            } else {
                Err(operation_error(name, a, Some(b)))
            }
        }
        (Some(u), None) | (None, Some(u)) => {
            if u.is_dimensionless() {
                Ok(Some(u.clone()))
            } else {
                Err(operation_error(name, a, Some(b)))
            }
        }
        (None, None) => Ok(None),
    }
}

fn multiplicative(
    a: &UnitToken,
    b: &UnitToken,
    divide: bool,
) -> Result<Option<Unit>, UnitArrowError> {
    Ok(match (a.units(), b.units()) {
        (Some(ua), Some(ub)) => Some(if divide { ua.div(ub) } else { ua.mul(ub) }),
        (Some(ua), None) => Some(ua.clone()),
        (None, Some(ub)) => Some(if divide { ub.powf(-1.0) } else { ub.clone() }),
        (None, None) => None,
    })
}

fn power(
    name: &'static str,
    base: &UnitToken,
    exponent: &UnitToken,
) -> Result<Option<Unit>, UnitArrowError> {
    let exp = match exponent {
        UnitToken::Scalar(v) => Some(*v),
        UnitToken::Quantity(q) if q.units().is_dimensionless() => {
            Some(q.to_value(&Unit::dimensionless())?)
        }
        UnitToken::Quantity(_) | UnitToken::UnitArray(_)
            if !exponent.units().is_some_and(Unit::is_dimensionless) =>
        {
            return Err(operation_error(name, base, Some(exponent)));
        }
        // Per-element exponents, whether or not the array carries units.
        UnitToken::Quantity(_) | UnitToken::UnitArray(_) | UnitToken::PlainArray => None,
    };
    match (base.units(), exp) {
        (Some(u), Some(p)) => Ok(Some(u.powf(p))),
        // An array exponent gives a different unit per element unless the base
        // has no dimensions to raise.
        (Some(u), None) if u.is_dimensionless() => Ok(Some(u.clone())),
        (Some(_), None) => Err(operation_error(name, base, Some(exponent))),
        (None, _) => Ok(None),
    }
}

fn require(
    name: &'static str,
    token: &UnitToken,
    ok: impl Fn(&Unit) -> bool,
) -> Result<(), UnitArrowError> {
    match token.units() {
        Some(u) if !ok(u) => Err(operation_error(name, token, None)),
        _ => Ok(()),
    }
}

fn radian(token: &UnitToken) -> Unit {
    let registry = token
        .quantity()
        .map_or_else(UnitRegistry::default_registry, |q| q.registry().clone());
    registry.lookup("rad").unwrap_or_else(|_| Unit::dimensionless())
}

fn any_units(tokens: &[UnitToken]) -> bool {
    tokens.iter().any(|t| t.units().is_some())
}

fn arg<'t>(tokens: &'t [UnitToken], idx: usize) -> Result<&'t UnitToken, UnitArrowError> {
    tokens.get(idx).ok_or_else(|| UnitArrowError::GraphError {
        message: format!("missing operand {} for unit resolution", idx),
    })
}

/// Fresh token for `units`, sharing the registry and dtype of the first
/// unit-bearing operand.
fn token_for(units: Unit, tokens: &[UnitToken]) -> Quantity {
    let (registry, dtype) = tokens
        .iter()
        .find_map(|t| t.quantity().map(|q| (q.registry().clone(), q.dtype())))
        .unwrap_or_else(|| (UnitRegistry::default_registry(), DType::Float64));
    Quantity::unit_token(units, Arc::clone(&registry), dtype, None)
}

fn operation_error(name: &'static str, a: &UnitToken, b: Option<&UnitToken>) -> UnitArrowError {
    UnitArrowError::UnitOperationError {
        operation: name,
        lhs: a.describe(),
        rhs: b.map(UnitToken::describe),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::dimensions::BaseDimension;

    fn q(expr: &str) -> UnitToken {
        UnitToken::Quantity(Quantity::parse(1.0, expr).unwrap())
    }

    fn unit_of(op: Operation, tokens: &[UnitToken]) -> String {
        resolve_unit(op, tokens)
            .unwrap()
            .units()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<plain>".into())
    }

    #[test]
    fn test_operator_rules() {
        let add = Operation::Operator(Operator::Add);
        let mul = Operation::Operator(Operator::Multiply);
        let div = Operation::Operator(Operator::Divide);
        let pow = Operation::Operator(Operator::Power);
        assert_eq!(unit_of(add, &[q("m"), q("m")]), "m");
        assert_eq!(unit_of(mul, &[q("m"), q("s")]), "m*s");
        assert_eq!(unit_of(mul, &[q("m"), UnitToken::Scalar(3.0)]), "m");
        assert_eq!(unit_of(div, &[UnitToken::Scalar(1.0), q("s")]), "1/s");
        assert_eq!(unit_of(pow, &[q("m"), UnitToken::Scalar(2.0)]), "m**2");
    }

    #[test]
    fn test_additive_rejects_mismatched_dimensions() {
        let add = Operation::Operator(Operator::Add);
        let err = resolve_unit(add, &[q("m"), q("s")]).unwrap_err();
        assert!(matches!(err, UnitArrowError::UnitOperationError { operation: "add", .. }));
        assert!(resolve_unit(add, &[q("m"), UnitToken::Scalar(1.0)]).is_err());
        assert!(resolve_unit(add, &[q("dimensionless"), UnitToken::Scalar(1.0)]).is_ok());
    }

    #[test]
    fn test_ufunc_rules() {
        assert_eq!(unit_of(Operation::Ufunc(Ufunc::Sqrt), &[q("m**2")]), "m");
        assert_eq!(unit_of(Operation::Ufunc(Ufunc::Sin), &[q("rad")]), "dimensionless");
        assert_eq!(unit_of(Operation::Ufunc(Ufunc::Less), &[q("m"), q("cm")]), "<plain>");
        assert_eq!(unit_of(Operation::Ufunc(Ufunc::Arctan2), &[q("m"), q("m")]), "rad");
        assert!(resolve_unit(Operation::Ufunc(Ufunc::Exp), &[q("m")]).is_err());
        assert!(resolve_unit(Operation::Ufunc(Ufunc::Sin), &[q("m")]).is_err());
        assert!(resolve_unit(Operation::Ufunc(Ufunc::Less), &[q("m"), q("s")]).is_err());
    }

    #[test]
    fn test_function_rules() {
        let var = Operation::Function(ArrayFunction::Var { axis: None, ddof: 0 });
        assert_eq!(unit_of(var, &[q("m")]), "m**2");
        let dot = Operation::Function(ArrayFunction::Dot);
        assert_eq!(unit_of(dot, &[q("m"), q("N")]), "m*N");
        let cat = Operation::Function(ArrayFunction::Concatenate { axis: 0 });
        assert_eq!(unit_of(cat, &[q("m"), q("km"), q("cm")]), "m");
        assert!(resolve_unit(cat, &[q("m"), q("m"), q("s")]).is_err());
    }

    #[test]
    fn test_power_with_array_exponent() {
        let pow = Operation::Operator(Operator::Power);
        assert!(resolve_unit(pow, &[q("m"), UnitToken::PlainArray]).is_err());
        assert_eq!(
            unit_of(pow, &[q("dimensionless"), UnitToken::PlainArray]),
            "dimensionless"
        );
    }

    #[test]
    fn test_power_with_unit_array_exponent() {
        let pow = Operation::Operator(Operator::Power);
        let exponent = UnitToken::UnitArray(Quantity::parse(1.0, "dimensionless").unwrap());
        let err = resolve_unit(pow, &[q("m"), exponent.clone()]).unwrap_err();
        assert!(matches!(err, UnitArrowError::UnitOperationError { operation: "power", .. }));
        assert_eq!(unit_of(pow, &[q("dimensionless"), exponent]), "dimensionless");
        let metres = UnitToken::UnitArray(Quantity::parse(1.0, "m").unwrap());
        assert!(resolve_unit(pow, &[q("dimensionless"), metres]).is_err());
    }

    #[test]
    fn test_power_with_scaled_quantity_exponent() {
        let pow = Operation::Operator(Operator::Power);
        let ratio = UnitToken::Quantity(Quantity::parse(2.0, "m/cm").unwrap());
        let resolved = resolve_unit(pow, &[q("s"), ratio]).unwrap();
        let exponent = resolved.units().unwrap().dimensions().exponent(BaseDimension::Time);
        assert!((exponent - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_required_input_unit() {
        let deg = q("deg");
        assert_eq!(
            required_input_unit(Ufunc::Sin, &deg).unwrap().to_string(),
            "rad"
        );
        assert!(required_input_unit(Ufunc::Sin, &q("rad")).is_none());
        let ratio = UnitToken::Quantity(Quantity::new(
            1.0,
            Unit::parse("m").unwrap().div(&Unit::parse("cm").unwrap()),
        ));
        assert!(required_input_unit(Ufunc::Log, &ratio).unwrap().is_dimensionless());
    }
}
