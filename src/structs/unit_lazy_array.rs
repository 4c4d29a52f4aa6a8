//! # **UnitLazyArray Module** - *Unit-aware Chunked Lazy Array*
//!
//! A [`LazyArray`] paired with a unit sidecar: a magnitude 1.0 [`Quantity`]
//! that is never materialised and is the single source of truth for the
//! array's unit.
//!
//! ## Overview
//! - Every operation resolves the result unit from the operands' sidecars
//!   first, then builds the plain engine node and wraps it with the resolved
//!   unit. A unit error therefore never leaves a half-built graph behind.
//! - Operations fall in four groups: elementwise ufuncs, array functions,
//!   arithmetic operators and unit-preserving simple operations. Unit
//!   conversions scale the lazy data by the sidecar's conversion factor.
//! - Instances are never mutated in place. `units` and `unit_name` are
//!   projections of the sidecar and change only together with it.
//!
//! ## Example
//! ```
//! use unitarrow::{ChunkSpec, Collection, LazyArray, UnitLazyArray, UnitSpec};
//!
//! let lazy = LazyArray::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2], ChunkSpec::Auto).unwrap();
//! let a = UnitLazyArray::from_lazy(lazy, UnitSpec::new("m")).unwrap();
//! let cm = a.to("cm").unwrap().compute().unwrap().into_array().unwrap();
//! assert_eq!(cm.values(), &[100.0, 200.0, 300.0, 400.0]);
//! ```

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use tracing::trace;

use crate::enums::dtype::DType;
use crate::enums::error::UnitArrowError;
use crate::enums::intercept::{ConversionOp, SimpleOp};
use crate::enums::operators::{ArrayFunction, Operation, Operator, Ufunc};
use crate::kernels::routing::resolve::resolve;
use crate::kernels::routing::sanitize::Operand;
use crate::structs::chunks::{ChunkLayout, ChunkSpec};
use crate::structs::lazy::graph::{ArrayMeta, TaskGraph};
use crate::structs::lazy::lazy_array::{Input, LazyArray};
use crate::traits::print::format_shape;
use crate::units::combine::Resolved;
use crate::units::quantity::Quantity;
use crate::units::spec::{UnitInput, UnitSpec};
use crate::units::system::UnitSystem;
use crate::units::unit::Unit;

#[derive(Debug, Clone)]
pub struct UnitLazyArray {
    array: LazyArray,
    sidecar: Quantity,
    units: Unit,
    unit_name: Option<String>,
}

/// Outcome of an operation that may or may not carry a unit.
#[derive(Debug, Clone)]
pub enum LazyResult {
    Unit(UnitLazyArray),
    /// Results such as comparisons, which carry no unit.
    Plain(LazyArray),
}

impl LazyResult {
    /// The unit-bearing result, or a `TypeError` for a plain one.
    pub fn unit_array(self) -> Result<UnitLazyArray, UnitArrowError> {
        match self {
            LazyResult::Unit(u) => Ok(u),
            LazyResult::Plain(_) => Err(UnitArrowError::TypeError {
                from: "LazyArray",
                to: "UnitLazyArray",
                message: Some("the operation produced a result without units".into()),
            }),
        }
    }

    /// The result with any unit dropped.
    pub fn into_lazy(self) -> LazyArray {
        match self {
            LazyResult::Unit(u) => u.array,
            LazyResult::Plain(a) => a,
        }
    }

    pub fn is_plain(&self) -> bool {
        matches!(self, LazyResult::Plain(_))
    }
}

macro_rules! unary_ufuncs {
    ($($(#[$doc:meta])* $name:ident => $ufunc:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(&self) -> Result<UnitLazyArray, UnitArrowError> {
                Self::elemwise(Ufunc::$ufunc, &[Operand::from(self)])?.unit_array()
            }
        )*
    };
}

macro_rules! binary_ufuncs {
    ($($name:ident => $ufunc:ident),* $(,)?) => {
        $(
            pub fn $name(&self, other: impl Into<Operand>) -> Result<UnitLazyArray, UnitArrowError> {
                Self::elemwise(Ufunc::$ufunc, &[Operand::from(self), other.into()])?.unit_array()
            }
        )*
    };
}

macro_rules! predicates {
    ($($name:ident => $ufunc:ident),* $(,)?) => {
        $(
            pub fn $name(&self, other: impl Into<Operand>) -> Result<LazyArray, UnitArrowError> {
                Ok(Self::elemwise(Ufunc::$ufunc, &[Operand::from(self), other.into()])?.into_lazy())
            }
        )*
    };
}

impl UnitLazyArray {
    /// Builds from the engine's construction arguments plus unit arguments.
    pub fn new(
        graph: TaskGraph,
        name: impl Into<String>,
        chunks: ChunkLayout,
        dtype: DType,
        meta: ArrayMeta,
        shape: Vec<usize>,
        spec: UnitSpec,
    ) -> Result<Self, UnitArrowError> {
        let array = LazyArray::new(graph, name, chunks, dtype, meta, shape)?;
        Self::from_lazy(array, spec)
    }

    /// Wraps a plain lazy array with the unit described by `spec`.
    pub fn from_lazy(array: LazyArray, spec: UnitSpec) -> Result<Self, UnitArrowError> {
        let sidecar = Quantity::from_spec(1.0, &spec, array.dtype())?;
        Ok(Self::wrap(array, sidecar))
    }

    fn wrap(array: LazyArray, sidecar: Quantity) -> Self {
        let mut out = Self {
            array,
            sidecar: sidecar.clone(),
            units: Unit::dimensionless(),
            unit_name: None,
        };
        out.set_unit_state(sidecar);
        out
    }

    /// Replaces the sidecar together with its projections.
    pub(crate) fn set_unit_state(&mut self, sidecar: Quantity) {
        self.units = sidecar.units().clone();
        self.unit_name = sidecar.name().map(str::to_string);
        self.sidecar = sidecar;
    }

    /// Wraps an engine result with a fresh token for `units`.
    fn derived(&self, array: LazyArray, units: Unit, name: Option<String>) -> Self {
        let token = Quantity::unit_token(units, Arc::clone(self.sidecar.registry()), array.dtype(), name);
        Self::wrap(array, token)
    }

    fn attach(array: LazyArray, resolved: Resolved) -> LazyResult {
        match resolved {
            Resolved::Unit(q) => {
                let token = Quantity::unit_token(q.units().clone(), Arc::clone(q.registry()), array.dtype(), None);
                LazyResult::Unit(Self::wrap(array, token))
            }
            Resolved::Plain => LazyResult::Plain(array),
        }
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    #[inline]
    pub fn units(&self) -> &Unit {
        &self.units
    }

    /// Custom display name of the unit, if one was given.
    pub fn unit_name(&self) -> Option<&str> {
        self.unit_name.as_deref()
    }

    #[inline]
    pub fn sidecar(&self) -> &Quantity {
        &self.sidecar
    }

    /// The underlying plain lazy array.
    pub fn to_lazy(&self) -> LazyArray {
        self.array.clone()
    }

    #[inline]
    pub fn as_lazy(&self) -> &LazyArray {
        &self.array
    }

    pub fn name(&self) -> &str {
        self.array.name()
    }

    pub fn shape(&self) -> &[usize] {
        self.array.shape()
    }

    pub fn ndim(&self) -> usize {
        self.array.ndim()
    }

    pub fn dtype(&self) -> DType {
        self.array.dtype()
    }

    pub fn chunks(&self) -> &ChunkLayout {
        self.array.chunks()
    }

    pub fn chunksize(&self) -> Vec<usize> {
        self.array.chunksize()
    }

    // ---------------------------------------------------------------------
    // Elementwise ufuncs and array functions
    // ---------------------------------------------------------------------

    /// Applies `ufunc` to `operands`, deriving the unit of the result.
    pub fn elemwise(ufunc: Ufunc, operands: &[Operand]) -> Result<LazyResult, UnitArrowError> {
        let (inputs, resolved) = resolve(Operation::Ufunc(ufunc), operands)?;
        let array = LazyArray::elemwise(ufunc, &inputs)?;
        Ok(Self::attach(array, resolved))
    }

    /// Applies an array-level function to `operands`, deriving the unit of the result.
    pub fn array_function(func: ArrayFunction, operands: &[Operand]) -> Result<LazyResult, UnitArrowError> {
        let (inputs, resolved) = resolve(Operation::Function(func), operands)?;
        let array = LazyArray::array_function(func, &inputs)?;
        Ok(Self::attach(array, resolved))
    }

    unary_ufuncs! {
        /// Requires an angle or dimensionless operand. Degrees are read as radians after conversion.
        sin => Sin,
        cos => Cos,
        tan => Tan,
        arcsin => Arcsin,
        arccos => Arccos,
        arctan => Arctan,
        sqrt => Sqrt,
        cbrt => Cbrt,
        square => Square,
        reciprocal => Reciprocal,
        /// Requires a dimensionless operand.
        exp => Exp,
        expm1 => Expm1,
        log => Log,
        log2 => Log2,
        log10 => Log10,
        log1p => Log1p,
        absolute => Absolute,
        negative => Negative,
        floor => Floor,
        ceil => Ceil,
        rint => Rint,
        sign => Sign,
    }

    binary_ufuncs! {
        hypot => Hypot,
        maximum => Maximum,
        minimum => Minimum,
        arctan2 => Arctan2,
    }

    predicates! {
        equal => Equal,
        not_equal => NotEqual,
        less => Less,
        less_equal => LessEqual,
        greater => Greater,
        greater_equal => GreaterEqual,
    }

    pub fn isfinite(&self) -> Result<LazyArray, UnitArrowError> {
        Ok(Self::elemwise(Ufunc::IsFinite, &[Operand::from(self)])?.into_lazy())
    }

    pub fn isnan(&self) -> Result<LazyArray, UnitArrowError> {
        Ok(Self::elemwise(Ufunc::IsNan, &[Operand::from(self)])?.into_lazy())
    }

    pub fn concatenate(arrays: &[Operand], axis: usize) -> Result<UnitLazyArray, UnitArrowError> {
        Self::array_function(ArrayFunction::Concatenate { axis }, arrays)?.unit_array()
    }

    pub fn dot(&self, other: impl Into<Operand>) -> Result<UnitLazyArray, UnitArrowError> {
        Self::array_function(ArrayFunction::Dot, &[Operand::from(self), other.into()])?.unit_array()
    }

    pub fn var(&self, axis: Option<usize>, ddof: usize) -> Result<UnitLazyArray, UnitArrowError> {
        Self::array_function(ArrayFunction::Var { axis, ddof }, &[Operand::from(self)])?.unit_array()
    }

    pub fn median(&self, axis: Option<usize>) -> Result<UnitLazyArray, UnitArrowError> {
        Self::array_function(ArrayFunction::Median { axis }, &[Operand::from(self)])?.unit_array()
    }

    pub fn ptp(&self, axis: Option<usize>) -> Result<UnitLazyArray, UnitArrowError> {
        Self::array_function(ArrayFunction::Ptp { axis }, &[Operand::from(self)])?.unit_array()
    }

    pub fn diff(&self, axis: usize) -> Result<UnitLazyArray, UnitArrowError> {
        Self::array_function(ArrayFunction::Diff { axis }, &[Operand::from(self)])?.unit_array()
    }

    // ---------------------------------------------------------------------
    // Operators
    // ---------------------------------------------------------------------

    /// Applies an arithmetic operator. Unit-bearing operands always give a
    /// unit-bearing result.
    pub fn operator(op: Operator, operands: &[Operand]) -> Result<UnitLazyArray, UnitArrowError> {
        let (inputs, resolved) = resolve(Operation::Operator(op), operands)?;
        let array = match (op, inputs.as_slice()) {
            (Operator::Abs, [Input::Array(a)]) => a.abs(),
            (Operator::Neg, [Input::Array(a)]) => a.neg(),
            (_, [lhs, rhs]) => LazyArray::binary(op, lhs, rhs)?,
            _ => {
                return Err(UnitArrowError::GraphError {
                    message: format!("{} got {} operands", op.name(), inputs.len()),
                });
            }
        };
        Self::attach(array, resolved).unit_array()
    }

    pub fn add(&self, rhs: impl Into<Operand>) -> Result<UnitLazyArray, UnitArrowError> {
        Self::operator(Operator::Add, &[Operand::from(self), rhs.into()])
    }

    /// `lhs + self`.
    pub fn radd(&self, lhs: impl Into<Operand>) -> Result<UnitLazyArray, UnitArrowError> {
        Self::operator(Operator::Add, &[lhs.into(), Operand::from(self)])
    }

    pub fn sub(&self, rhs: impl Into<Operand>) -> Result<UnitLazyArray, UnitArrowError> {
        Self::operator(Operator::Subtract, &[Operand::from(self), rhs.into()])
    }

    /// `lhs - self`.
    pub fn rsub(&self, lhs: impl Into<Operand>) -> Result<UnitLazyArray, UnitArrowError> {
        Self::operator(Operator::Subtract, &[lhs.into(), Operand::from(self)])
    }

    pub fn mul(&self, rhs: impl Into<Operand>) -> Result<UnitLazyArray, UnitArrowError> {
        Self::operator(Operator::Multiply, &[Operand::from(self), rhs.into()])
    }

    /// `lhs * self`.
    pub fn rmul(&self, lhs: impl Into<Operand>) -> Result<UnitLazyArray, UnitArrowError> {
        Self::operator(Operator::Multiply, &[lhs.into(), Operand::from(self)])
    }

    pub fn div(&self, rhs: impl Into<Operand>) -> Result<UnitLazyArray, UnitArrowError> {
        Self::operator(Operator::Divide, &[Operand::from(self), rhs.into()])
    }

    /// `lhs / self`.
    pub fn rdiv(&self, lhs: impl Into<Operand>) -> Result<UnitLazyArray, UnitArrowError> {
        Self::operator(Operator::Divide, &[lhs.into(), Operand::from(self)])
    }

    /// Raises to `exponent`, a scalar, a dimensionless quantity, or a plain
    /// array when this array is dimensionless.
    pub fn pow(&self, exponent: impl Into<Operand>) -> Result<UnitLazyArray, UnitArrowError> {
        Self::operator(Operator::Power, &[Operand::from(self), exponent.into()])
    }

    pub fn abs(&self) -> Result<UnitLazyArray, UnitArrowError> {
        Self::operator(Operator::Abs, &[Operand::from(self)])
    }

    pub fn neg(&self) -> Result<UnitLazyArray, UnitArrowError> {
        Self::operator(Operator::Neg, &[Operand::from(self)])
    }

    // ---------------------------------------------------------------------
    // Unit-preserving simple operations
    // ---------------------------------------------------------------------

    /// Re-wraps an engine result with this array's unchanged unit.
    fn preserve_units(&self, op: SimpleOp, result: Result<LazyArray, UnitArrowError>) -> Result<UnitLazyArray, UnitArrowError> {
        let array = result?;
        trace!(op = op.name(), units = %self.units, "preserving units");
        Ok(self.derived(array, self.units.clone(), self.unit_name.clone()))
    }

    pub fn min(&self, axis: Option<usize>) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::Min, self.array.min(axis))
    }

    pub fn max(&self, axis: Option<usize>) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::Max, self.array.max(axis))
    }

    pub fn sum(&self, axis: Option<usize>) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::Sum, self.array.sum(axis))
    }

    pub fn mean(&self, axis: Option<usize>) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::Mean, self.array.mean(axis))
    }

    pub fn std(&self, axis: Option<usize>, ddof: usize) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::Std, self.array.std(axis, ddof))
    }

    pub fn cumsum(&self, axis: usize) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::Cumsum, self.array.cumsum(axis))
    }

    pub fn squeeze(&self, axis: Option<usize>) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::Squeeze, self.array.squeeze(axis))
    }

    pub fn rechunk(&self, chunks: ChunkSpec) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::Rechunk, self.array.rechunk(chunks))
    }

    /// Bounds are read in this array's current unit.
    pub fn clip(&self, min: Option<f64>, max: Option<f64>) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::Clip, self.array.clip(min, max))
    }

    pub fn view(&self, dtype: DType) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::View, self.array.view(dtype))
    }

    pub fn swapaxes(&self, a: usize, b: usize) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::SwapAxes, self.array.swapaxes(a, b))
    }

    pub fn round(&self, decimals: i32) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::Round, self.array.round(decimals))
    }

    pub fn copy(&self) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::Copy, Ok(self.array.copy()))
    }

    pub fn deep_copy(&self) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::DeepCopy, Ok(self.array.deep_copy()))
    }

    pub fn repeat(&self, repeats: usize, axis: Option<usize>) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::Repeat, self.array.repeat(repeats, axis))
    }

    pub fn astype(&self, dtype: DType) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::AsType, self.array.astype(dtype))
    }

    pub fn reshape(&self, shape: &[usize]) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::Reshape, self.array.reshape(shape))
    }

    pub fn topk(&self, k: i64) -> Result<UnitLazyArray, UnitArrowError> {
        self.preserve_units(SimpleOp::TopK, self.array.topk(k))
    }

    // ---------------------------------------------------------------------
    // Unit conversions
    // ---------------------------------------------------------------------

    /// Scales the lazy data by the factor between the old and new sidecar.
    fn track_conversion(&self, op: ConversionOp, converted: Result<Quantity, UnitArrowError>) -> Result<UnitLazyArray, UnitArrowError> {
        let converted = converted?;
        let factor = converted.value() / self.sidecar.value();
        trace!(op = op.name(), from = %self.units, to = %converted.units(), factor, "converting units");
        let array = self.array.scale(factor)?;
        Ok(self.derived(array, converted.units().clone(), None))
    }

    pub fn to(&self, target: impl Into<UnitInput>) -> Result<UnitLazyArray, UnitArrowError> {
        self.track_conversion(ConversionOp::To, self.sidecar.to(target))
    }

    pub fn in_units(&self, target: impl Into<UnitInput>) -> Result<UnitLazyArray, UnitArrowError> {
        self.track_conversion(ConversionOp::InUnits, self.sidecar.in_units(target))
    }

    /// Base units of `system`, or of the registry's default system when `None`.
    pub fn in_base(&self, system: Option<UnitSystem>) -> Result<UnitLazyArray, UnitArrowError> {
        self.track_conversion(ConversionOp::InBase, self.sidecar.in_base(system))
    }

    pub fn in_cgs(&self) -> Result<UnitLazyArray, UnitArrowError> {
        self.track_conversion(ConversionOp::InCgs, self.sidecar.in_cgs())
    }

    pub fn in_mks(&self) -> Result<UnitLazyArray, UnitArrowError> {
        self.track_conversion(ConversionOp::InMks, self.sidecar.in_mks())
    }
}

impl Display for UnitLazyArray {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unit_lazy_array<{}, shape={}, dtype={}, chunksize={}, chunktype={}, units={}>",
            self.array.name(),
            format_shape(self.array.shape()),
            self.array.dtype(),
            format_shape(&self.array.chunksize()),
            self.array.meta().chunktype,
            self.units
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::collection::Collection;

    fn ula(values: Vec<f64>, shape: &[usize], units: &str) -> UnitLazyArray {
        let lazy = LazyArray::from_vec(values, shape, ChunkSpec::Uniform(vec![1; shape.len()])).unwrap();
        UnitLazyArray::from_lazy(lazy, UnitSpec::new(units)).unwrap()
    }

    fn values(a: &UnitLazyArray) -> Vec<f64> {
        a.compute().unwrap().into_array().unwrap().values().to_vec()
    }

    #[test]
    fn test_projections_follow_sidecar() {
        let lazy = LazyArray::from_vec(vec![1.0], &[1], ChunkSpec::Auto).unwrap();
        let a = UnitLazyArray::from_lazy(lazy, UnitSpec::new("km").name("kilometres")).unwrap();
        assert_eq!(a.units(), a.sidecar().units());
        assert_eq!(a.unit_name(), Some("kilometres"));
        assert_eq!(a.sidecar().value(), 1.0);
        let mut b = a.clone();
        b.set_unit_state(Quantity::parse(1.0, "s").unwrap());
        assert_eq!(b.units().to_string(), "s");
        assert_eq!(b.unit_name(), None);
    }

    #[test]
    fn test_add_takes_larger_unit() {
        let cm = ula(vec![100.0, 200.0], &[2], "cm");
        let m = ula(vec![1.0, 2.0], &[2], "m");
        let sum = cm.add(&m).unwrap();
        assert_eq!(sum.units().to_string(), "m");
        assert_eq!(values(&sum), vec![2.0, 4.0]);
        let again = (&m + &cm).unwrap();
        assert_eq!(again.units().to_string(), "m");
    }

    #[test]
    fn test_incompatible_add_builds_nothing() {
        let m = ula(vec![1.0], &[1], "m");
        let s = ula(vec![1.0], &[1], "s");
        assert!(matches!(m.add(&s), Err(UnitArrowError::UnitOperationError { .. })));
        assert!(matches!(m.add(1.0), Err(UnitArrowError::UnitOperationError { .. })));
    }

    #[test]
    fn test_multiplicative_and_power() {
        let m = ula(vec![1.0, 2.0], &[2], "m");
        let s = ula(vec![2.0, 4.0], &[2], "s");
        let v = m.div(&s).unwrap();
        assert_eq!(v.units().to_string(), "m/s");
        assert_eq!(values(&v), vec![0.5, 0.5]);
        assert_eq!(m.pow(2.0).unwrap().units().to_string(), "m**2");
        assert_eq!(m.rdiv(1.0).unwrap().units().to_string(), "1/m");
        assert_eq!(m.mul(3.0).unwrap().units().to_string(), "m");
        let k = Quantity::parse(2.0, "s").unwrap();
        assert_eq!(m.rmul(k).unwrap().units().to_string(), "s*m");
    }

    #[test]
    fn test_ufuncs() {
        let deg = ula(vec![90.0], &[1], "deg");
        let s = deg.sin().unwrap();
        assert!(s.units().is_dimensionless());
        assert!((values(&s)[0] - 1.0).abs() < 1e-12);
        let m2 = ula(vec![4.0, 9.0], &[2], "m**2");
        assert_eq!(values(&m2.sqrt().unwrap()), vec![2.0, 3.0]);
        assert!(ula(vec![1.0], &[1], "m").exp().is_err());
        let cmp = ula(vec![1.0, 3.0], &[2], "m").less(&ula(vec![150.0, 150.0], &[2], "cm")).unwrap();
        assert_eq!(cmp.dtype(), DType::Bool);
        assert_eq!(cmp.compute().unwrap().as_slice(), &[1.0, 0.0]);
    }

    #[test]
    fn test_simple_ops_preserve_units() {
        let a = ula(vec![1.0, 2.0, 3.0, 4.0], &[2, 2], "m");
        for out in [
            a.min(None).unwrap(),
            a.max(Some(0)).unwrap(),
            a.sum(None).unwrap(),
            a.std(None, 0).unwrap(),
            a.cumsum(0).unwrap(),
            a.rechunk(ChunkSpec::Auto).unwrap(),
            a.clip(Some(2.0), None).unwrap(),
            a.swapaxes(0, 1).unwrap(),
            a.round(0).unwrap(),
            a.copy().unwrap(),
            a.deep_copy().unwrap(),
            a.repeat(2, Some(1)).unwrap(),
            a.astype(DType::Float32).unwrap(),
            a.reshape(&[4]).unwrap(),
            a.reshape(&[1, 4]).unwrap().squeeze(Some(0)).unwrap(),
            a.view(DType::Int64).unwrap(),
            a.topk(1).unwrap(),
        ] {
            assert_eq!(out.units().to_string(), "m");
        }
    }

    #[test]
    fn test_conversions() {
        let a = ula(vec![1.0, 2.0, 3.0, 4.0], &[2, 2], "m");
        let cm = a.to("cm").unwrap();
        assert_eq!(values(&cm), vec![100.0, 200.0, 300.0, 400.0]);
        assert_eq!(a.units().to_string(), "m");
        let back = cm.in_units("m").unwrap();
        assert_eq!(values(&back), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(cm.in_mks().unwrap().units().to_string(), "m");
        assert_eq!(a.in_cgs().unwrap().units().to_string(), "cm");
        assert_eq!(a.in_base(None).unwrap().units().to_string(), "m");
        assert!(matches!(a.to("s"), Err(UnitArrowError::UnitConversionError { .. })));
    }

    #[test]
    fn test_array_functions() {
        let a = ula(vec![1.0, 2.0, 3.0, 4.0], &[2, 2], "m");
        assert_eq!(a.var(None, 0).unwrap().units().to_string(), "m**2");
        assert_eq!(a.median(Some(1)).unwrap().units().to_string(), "m");
        assert_eq!(a.ptp(None).unwrap().units().to_string(), "m");
        assert_eq!(a.diff(0).unwrap().units().to_string(), "m");
        assert_eq!(a.dot(&a).unwrap().units().to_string(), "m**2");
    }

    #[test]
    fn test_display() {
        let a = ula(vec![1.0, 2.0, 3.0, 4.0], &[2, 2], "m");
        let text = a.to_string();
        assert!(text.starts_with("unit_lazy_array<array-"));
        assert!(text.ends_with("shape=(2, 2), dtype=float64, chunksize=(1, 1), chunktype=ndarray, units=m>"));
    }

    #[test]
    fn test_display_renders_units_not_name() {
        let lazy = LazyArray::from_vec(vec![1.0, 2.0], &[2], ChunkSpec::Auto).unwrap();
        let a = UnitLazyArray::from_lazy(lazy, UnitSpec::new("km").name("klicks")).unwrap();
        assert_eq!(a.unit_name(), Some("klicks"));
        assert!(a.to_string().ends_with("units=km>"));
    }

    #[test]
    fn test_pow_by_unit_array_exponent() {
        let m = ula(vec![2.0, 3.0], &[2], "m");
        let two = ula(vec![2.0, 2.0], &[2], "dimensionless");
        assert!(matches!(m.pow(&two), Err(UnitArrowError::UnitOperationError { operation: "power", .. })));
        assert!(matches!(m.pow(&two.to_lazy()), Err(UnitArrowError::UnitOperationError { .. })));

        let ratio = ula(vec![2.0, 3.0], &[2], "dimensionless");
        let raised = ratio.pow(&two).unwrap();
        assert!(raised.units().is_dimensionless());
        assert_eq!(values(&raised), vec![4.0, 9.0]);
    }

    #[test]
    fn test_pow_by_scaled_quantity() {
        let m = ula(vec![2.0, 3.0], &[2], "m");
        let exponent = Quantity::parse(0.02, "m/cm").unwrap();
        let squared = m.pow(exponent).unwrap();
        let length = squared.units().dimensions().exponent(crate::units::dimensions::BaseDimension::Length);
        assert!((length - 2.0).abs() < 1e-12);
        let got = values(&squared);
        assert!((got[0] - 4.0).abs() < 1e-9 && (got[1] - 9.0).abs() < 1e-9);
    }
}
