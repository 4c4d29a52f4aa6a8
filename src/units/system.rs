//! # Unit Systems
//!
//! Closed set of unit systems that `in_base`, `in_cgs` and `in_mks` reduce to.

use std::fmt::{Display, Formatter};

use crate::enums::error::UnitArrowError;
use crate::units::dimensions::{BaseDimension, Dimensions};
use crate::units::registry::UnitRegistry;
use crate::units::unit::Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnitSystem {
    /// metre, kilogram, second
    #[default]
    Mks,
    /// centimetre, gram, second
    Cgs,
}

impl UnitSystem {
    pub fn name(self) -> &'static str {
        match self {
            UnitSystem::Mks => "mks",
            UnitSystem::Cgs => "cgs",
        }
    }

    /// Base symbol for a dimension, or `None` when the system has no
    /// equivalent. CGS has no base unit for electric current.
    pub fn base_symbol(self, dim: BaseDimension) -> Option<&'static str> {
        use BaseDimension::*;
        match (self, dim) {
            (UnitSystem::Mks, Mass) => Some("kg"),
            (UnitSystem::Mks, Length) => Some("m"),
            (UnitSystem::Cgs, Mass) => Some("g"),
            (UnitSystem::Cgs, Length) => Some("cm"),
            (_, Time) => Some("s"),
            (_, Temperature) => Some("K"),
            (_, Angle) => Some("rad"),
            (UnitSystem::Mks, Current) => Some("A"),
            (UnitSystem::Cgs, Current) => None,
            (_, LuminousIntensity) => Some("cd"),
            (_, Amount) => Some("mol"),
        }
    }

    /// Expresses `dims` as a product of this system's base units.
    pub fn express(self, dims: &Dimensions, registry: &UnitRegistry) -> Result<Unit, UnitArrowError> {
        let mut unit = Unit::dimensionless();
        for (dim, power) in dims.iter() {
            let symbol = self
                .base_symbol(dim)
                .ok_or_else(|| UnitArrowError::UnitsNotReducible {
                    units: dims.to_string(),
                    system: self.name(),
                })?;
            unit = unit.mul(&registry.lookup(symbol)?.powf(power));
        }
        Ok(unit)
    }
}

impl Display for UnitSystem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
