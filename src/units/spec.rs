//! # Unit Spec
//!
//! Optional unit arguments accepted by unit-bearing constructors.

use std::sync::Arc;

use crate::enums::error::UnitArrowError;
use crate::units::registry::UnitRegistry;
use crate::units::unit::Unit;

/// A unit given either as an expression or as an already built [`Unit`].
#[derive(Debug, Clone, PartialEq)]
pub enum UnitInput {
    Expr(String),
    Unit(Unit),
}

impl UnitInput {
    /// Resolves against `registry`.
    ///
    /// A prebuilt unit is checked symbol by symbol unless `bypass_validation`
    /// is set, in which case it is taken as is.
    pub fn resolve(
        &self,
        registry: &UnitRegistry,
        bypass_validation: bool,
    ) -> Result<Unit, UnitArrowError> {
        match self {
            UnitInput::Expr(expr) => Unit::parse_with(expr, registry),
            UnitInput::Unit(unit) => {
                if !bypass_validation {
                    for (symbol, _) in unit.terms() {
                        registry.lookup(symbol)?;
                    }
                }
                Ok(unit.clone())
            }
        }
    }
}

impl From<&str> for UnitInput {
    fn from(s: &str) -> Self {
        UnitInput::Expr(s.to_string())
    }
}

impl From<String> for UnitInput {
    fn from(s: String) -> Self {
        UnitInput::Expr(s)
    }
}

impl From<Unit> for UnitInput {
    fn from(u: Unit) -> Self {
        UnitInput::Unit(u)
    }
}

impl From<&Unit> for UnitInput {
    fn from(u: &Unit) -> Self {
        UnitInput::Unit(u.clone())
    }
}

/// Unit arguments for building a sidecar quantity.
///
/// ## Example
/// ```
/// use unitarrow::UnitSpec;
///
/// let spec = UnitSpec::new("km").name("distance");
/// assert_eq!(spec.resolve_unit().unwrap().to_string(), "km");
/// ```
#[derive(Debug, Clone, Default)]
pub struct UnitSpec {
    pub units: Option<UnitInput>,
    pub registry: Option<Arc<UnitRegistry>>,
    pub bypass_validation: bool,
    /// Fallback used when `units` is absent.
    pub input_units: Option<UnitInput>,
    /// Custom display name for the unit.
    pub name: Option<String>,
}

impl UnitSpec {
    pub fn new(units: impl Into<UnitInput>) -> Self {
        Self {
            units: Some(units.into()),
            ..Default::default()
        }
    }

    /// Spec that resolves to the dimensionless unit.
    pub fn dimensionless() -> Self {
        Self::default()
    }

    pub fn registry(mut self, registry: Arc<UnitRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn bypass_validation(mut self, bypass: bool) -> Self {
        self.bypass_validation = bypass;
        self
    }

    pub fn input_units(mut self, units: impl Into<UnitInput>) -> Self {
        self.input_units = Some(units.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The registry this spec resolves against.
    pub fn registry_or_default(&self) -> Arc<UnitRegistry> {
        self.registry
            .clone()
            .unwrap_or_else(UnitRegistry::default_registry)
    }

    pub fn resolve_unit(&self) -> Result<Unit, UnitArrowError> {
        let registry = self.registry_or_default();
        match self.units.as_ref().or(self.input_units.as_ref()) {
            Some(input) => input.resolve(&registry, self.bypass_validation),
            None => Ok(Unit::dimensionless()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::dimensions::{BaseDimension, Dimensions};

    #[test]
    fn test_units_take_precedence() {
        let spec = UnitSpec::new("m").input_units("s");
        assert_eq!(spec.resolve_unit().unwrap().to_string(), "m");
        let fallback = UnitSpec::default().input_units("s");
        assert_eq!(fallback.resolve_unit().unwrap().to_string(), "s");
        assert!(UnitSpec::default().resolve_unit().unwrap().is_dimensionless());
    }

    #[test]
    fn test_validation_against_registry() {
        let mut custom = UnitRegistry::new();
        custom
            .add("furlong", 201.168, Dimensions::of(BaseDimension::Length), false)
            .unwrap();
        let furlong = Unit::parse_with("furlong", &custom).unwrap();

        // The default registry does not know the symbol.
        assert!(UnitSpec::new(furlong.clone()).resolve_unit().is_err());
        // Bypassing validation accepts it as is.
        let bypass = UnitSpec::new(furlong.clone()).bypass_validation(true);
        assert_eq!(bypass.resolve_unit().unwrap(), furlong);
        // As does the registry that defined it.
        let scoped = UnitSpec::new(furlong).registry(Arc::new(custom));
        assert!(scoped.resolve_unit().is_ok());
    }
}
