//! # Quantity
//!
//! A scalar carrying a unit. It serves two purposes:
//! - it is the unit sidecar of every unit-bearing lazy array, where it always
//!   has magnitude 1.0 and is never materialised;
//! - it is the scalar result produced when a unit-bearing reduction is computed.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::enums::dtype::DType;
use crate::enums::error::UnitArrowError;
use crate::traits::print::format_float;
use crate::units::registry::UnitRegistry;
use crate::units::spec::{UnitInput, UnitSpec};
use crate::units::system::UnitSystem;
use crate::units::unit::Unit;

#[derive(Debug, Clone)]
pub struct Quantity {
    value: f64,
    units: Unit,
    registry: Arc<UnitRegistry>,
    dtype: DType,
    name: Option<String>,
}

impl Quantity {
    /// Builds a `float64` quantity against the default registry.
    pub fn new(value: f64, units: Unit) -> Self {
        Self {
            value,
            units,
            registry: UnitRegistry::default_registry(),
            dtype: DType::Float64,
            name: None,
        }
    }

    /// Parses `expr` against the default registry.
    pub fn parse(value: f64, expr: &str) -> Result<Self, UnitArrowError> {
        Ok(Self::new(value, Unit::parse(expr)?))
    }

    /// Builds a quantity from the full set of optional unit arguments.
    pub fn from_spec(value: f64, spec: &UnitSpec, dtype: DType) -> Result<Self, UnitArrowError> {
        let units = spec.resolve_unit()?;
        Ok(Self {
            value: dtype.cast(value),
            units,
            registry: spec.registry_or_default(),
            dtype,
            name: spec.name.clone(),
        })
    }

    /// Magnitude 1.0 token carrying `units`, as stored beside lazy arrays.
    pub(crate) fn unit_token(
        units: Unit,
        registry: Arc<UnitRegistry>,
        dtype: DType,
        name: Option<String>,
    ) -> Self {
        Self::from_parts(1.0, units, registry, dtype, name)
    }

    pub(crate) fn from_parts(
        value: f64,
        units: Unit,
        registry: Arc<UnitRegistry>,
        dtype: DType,
        name: Option<String>,
    ) -> Self {
        Self {
            value,
            units,
            registry,
            dtype,
            name,
        }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn units(&self) -> &Unit {
        &self.units
    }

    #[inline]
    pub fn registry(&self) -> &Arc<UnitRegistry> {
        &self.registry
    }

    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Converts into `target`, resolved against this quantity's registry.
    pub fn to(&self, target: impl Into<UnitInput>) -> Result<Quantity, UnitArrowError> {
        let target = target.into().resolve(&self.registry, false)?;
        self.convert(target)
    }

    /// Same as [`Quantity::to`].
    pub fn in_units(&self, target: impl Into<UnitInput>) -> Result<Quantity, UnitArrowError> {
        self.to(target)
    }

    /// Converts into the base units of `system`, or of the registry's default
    /// system when `None`.
    pub fn in_base(&self, system: Option<UnitSystem>) -> Result<Quantity, UnitArrowError> {
        let system = system.unwrap_or_else(|| self.registry.unit_system());
        let target = system.express(self.units.dimensions(), &self.registry)?;
        self.convert(target)
    }

    pub fn in_cgs(&self) -> Result<Quantity, UnitArrowError> {
        self.in_base(Some(UnitSystem::Cgs))
    }

    pub fn in_mks(&self) -> Result<Quantity, UnitArrowError> {
        self.in_base(Some(UnitSystem::Mks))
    }

    /// Value expressed in `target`, without building a new quantity.
    pub fn to_value(&self, target: &Unit) -> Result<f64, UnitArrowError> {
        Ok(self.value * self.units.conversion_factor(target)?)
    }

    fn convert(&self, target: Unit) -> Result<Quantity, UnitArrowError> {
        let factor = self.units.conversion_factor(&target)?;
        Ok(Quantity {
            value: self.value * factor,
            units: target,
            registry: self.registry.clone(),
            dtype: self.dtype.to_float(),
            name: None,
        })
    }
}

impl PartialEq for Quantity {
    /// Equal when both the value and the units agree, without conversion.
    fn eq(&self, other: &Self) -> bool {
        self.units == other.units && self.value == other.value
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", format_float(self.value), self.units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_to_and_back() {
        let q = Quantity::parse(1.5, "km").unwrap();
        let m = q.to("m").unwrap();
        assert!(approx(m.value(), 1500.0));
        assert_eq!(m.units().to_string(), "m");
        assert!(approx(m.to("km").unwrap().value(), 1.5));
    }

    #[test]
    fn test_in_cgs_and_mks() {
        let q = Quantity::parse(1.0, "J").unwrap();
        let cgs = q.in_cgs().unwrap();
        assert!(approx(cgs.value(), 1e7));
        assert_eq!(cgs.units().to_string(), "g*cm**2/s**2");
        let mks = cgs.in_mks().unwrap();
        assert!(approx(mks.value(), 1.0));
    }

    #[test]
    fn test_in_base_uses_registry_system() {
        let reg = Arc::new(UnitRegistry::new().with_unit_system(UnitSystem::Cgs));
        let spec = UnitSpec::new("m").registry(reg);
        let q = Quantity::from_spec(2.0, &spec, DType::Float64).unwrap();
        let base = q.in_base(None).unwrap();
        assert_eq!(base.units().to_string(), "cm");
        assert!(approx(base.value(), 200.0));
    }

    #[test]
    fn test_incompatible_conversion() {
        let q = Quantity::parse(1.0, "m").unwrap();
        assert!(matches!(
            q.to("s"),
            Err(UnitArrowError::UnitConversionError { .. })
        ));
        let amp = Quantity::parse(1.0, "A").unwrap();
        assert!(matches!(
            amp.in_cgs(),
            Err(UnitArrowError::UnitsNotReducible { .. })
        ));
    }

    #[test]
    fn test_display() {
        let q = Quantity::parse(2.5, "m/s").unwrap();
        assert_eq!(q.to_string(), "2.5 m/s");
    }
}
