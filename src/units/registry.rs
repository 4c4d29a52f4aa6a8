//! # Unit Registry
//!
//! Symbol table mapping unit symbols to their base value and dimensions.
//!
//! ## Lookup
//! - Exact symbols are tried first, so `min`, `cd` and `Pa` are never split
//!   into a prefix and a remainder.
//! - Otherwise a metric prefix is stripped and the remainder must be a
//!   prefixable symbol, e.g. `km`, `mmol`, `Mpc`, `keV`.
//!
//! A process-wide default registry is shared through [`UnitRegistry::default_registry`].
//! Custom registries are built with [`UnitRegistry::new`] and [`UnitRegistry::add`].

use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::{Arc, OnceLock};

use crate::enums::error::UnitArrowError;
use crate::units::dimensions::{BaseDimension, Dimensions};
use crate::units::system::UnitSystem;
use crate::units::unit::Unit;

/// Registry entry for a single symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDefinition {
    pub base_value: f64,
    pub dimensions: Dimensions,
    /// Whether metric prefixes may be attached.
    pub prefixable: bool,
}

// `da` must come before `d`.
const PREFIXES: [(&str, f64); 21] = [
    ("da", 1e1),
    ("Y", 1e24),
    ("Z", 1e21),
    ("E", 1e18),
    ("P", 1e15),
    ("T", 1e12),
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("h", 1e2),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("µ", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
    ("f", 1e-15),
    ("a", 1e-18),
    ("z", 1e-21),
    ("y", 1e-24),
];

#[derive(Debug, Clone)]
pub struct UnitRegistry {
    symbols: HashMap<String, UnitDefinition>,
    unit_system: UnitSystem,
}

static DEFAULT_REGISTRY: OnceLock<Arc<UnitRegistry>> = OnceLock::new();

impl UnitRegistry {
    /// Registry holding the built in symbols, defaulting to the MKS system.
    pub fn new() -> Self {
        let mut reg = Self {
            symbols: HashMap::new(),
            unit_system: UnitSystem::Mks,
        };
        reg.populate_builtin();
        reg
    }

    /// Shared default registry.
    pub fn default_registry() -> Arc<UnitRegistry> {
        DEFAULT_REGISTRY
            .get_or_init(|| Arc::new(UnitRegistry::new()))
            .clone()
    }

    /// Same registry with a different default unit system for `in_base`.
    pub fn with_unit_system(mut self, system: UnitSystem) -> Self {
        self.unit_system = system;
        self
    }

    #[inline]
    pub fn unit_system(&self) -> UnitSystem {
        self.unit_system
    }

    /// Registers a new symbol.
    ///
    /// Fails when the symbol already exists or its base value is not a
    /// positive finite number.
    pub fn add(
        &mut self,
        symbol: &str,
        base_value: f64,
        dimensions: Dimensions,
        prefixable: bool,
    ) -> Result<(), UnitArrowError> {
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_alphabetic() || c == '_') {
            return Err(UnitArrowError::UnitRegistryError {
                symbol: symbol.to_string(),
                message: "symbols must be non-empty and alphabetic".into(),
            });
        }
        if !(base_value.is_finite() && base_value > 0.0) {
            return Err(UnitArrowError::UnitRegistryError {
                symbol: symbol.to_string(),
                message: format!("base value {} must be positive and finite", base_value),
            });
        }
        if self.symbols.contains_key(symbol) {
            return Err(UnitArrowError::UnitRegistryError {
                symbol: symbol.to_string(),
                message: "symbol is already registered".into(),
            });
        }
        self.symbols.insert(
            symbol.to_string(),
            UnitDefinition {
                base_value,
                dimensions,
                prefixable,
            },
        );
        Ok(())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.lookup(symbol).is_ok()
    }

    pub fn definition(&self, symbol: &str) -> Option<&UnitDefinition> {
        self.symbols.get(symbol)
    }

    /// Resolves a single, possibly prefixed, symbol into a unit.
    pub fn lookup(&self, symbol: &str) -> Result<Unit, UnitArrowError> {
        if symbol == "dimensionless" {
            return Ok(Unit::dimensionless());
        }
        if let Some(def) = self.symbols.get(symbol) {
            return Ok(Unit::symbol(symbol, def.base_value, def.dimensions));
        }
        for (prefix, factor) in PREFIXES {
            if let Some(rest) = symbol.strip_prefix(prefix) {
                if rest.is_empty() {
                    continue;
                }
                if let Some(def) = self.symbols.get(rest) {
                    if def.prefixable {
                        return Ok(Unit::symbol(
                            symbol,
                            factor * def.base_value,
                            def.dimensions,
                        ));
                    }
                }
            }
        }
        Err(UnitArrowError::UnitParseError {
            expr: symbol.to_string(),
            message: "unknown unit symbol".into(),
        })
    }

    fn populate_builtin(&mut self) {
        use BaseDimension::*;
        let mass = Dimensions::of(Mass);
        let length = Dimensions::of(Length);
        let time = Dimensions::of(Time);
        let energy = mass.mul(&length.powf(2.0)).div(&time.powf(2.0));
        let force = mass.mul(&length).div(&time.powf(2.0));

        let builtin: [(&str, f64, Dimensions, bool); 34] = [
            // base units
            ("m", 1.0, length, true),
            ("g", 1e-3, mass, true),
            ("s", 1.0, time, true),
            ("K", 1.0, Dimensions::of(Temperature), true),
            ("A", 1.0, Dimensions::of(Current), true),
            ("cd", 1.0, Dimensions::of(LuminousIntensity), true),
            ("mol", 1.0, Dimensions::of(Amount), true),
            ("rad", 1.0, Dimensions::of(Angle), true),
            // angle and time
            ("deg", PI / 180.0, Dimensions::of(Angle), false),
            ("min", 60.0, time, false),
            ("hr", 3600.0, time, false),
            ("day", 86400.0, time, false),
            ("yr", 3.15576e7, time, true),
            // length
            ("au", 1.495978707e11, length, false),
            ("pc", 3.0856775814913673e16, length, true),
            ("ly", 9.4607304725808e15, length, false),
            ("inch", 0.0254, length, false),
            ("ft", 0.3048, length, false),
            ("mile", 1609.344, length, false),
            ("angstrom", 1e-10, length, false),
            // mechanics
            ("J", 1.0, energy, true),
            ("erg", 1e-7, energy, false),
            ("eV", 1.602176634e-19, energy, true),
            ("W", 1.0, energy.div(&time), true),
            ("N", 1.0, force, true),
            ("dyn", 1e-5, force, false),
            ("Pa", 1.0, force.div(&length.powf(2.0)), true),
            ("Hz", 1.0, time.powf(-1.0), true),
            ("L", 1e-3, length.powf(3.0), true),
            // electromagnetism
            ("C", 1.0, Dimensions::of(Current).mul(&time), true),
            ("V", 1.0, energy.div(&Dimensions::of(Current).mul(&time)), true),
            // astronomy
            ("Msun", 1.98841586e30, mass, false),
            ("Rsun", 6.957e8, length, false),
            ("Lsun", 3.828e26, energy.div(&time), false),
        ];

        for (symbol, base_value, dims, prefixable) in builtin {
            self.symbols.insert(
                symbol.to_string(),
                UnitDefinition {
                    base_value,
                    dimensions: dims,
                    prefixable,
                },
            );
        }
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        let reg = UnitRegistry::new();
        let km = reg.lookup("km").unwrap();
        assert!((km.base_value() - 1e3).abs() < 1e-9);
        let kg = reg.lookup("kg").unwrap();
        assert!((kg.base_value() - 1.0).abs() < 1e-12);
        let mpc = reg.lookup("Mpc").unwrap();
        assert!((mpc.base_value() / 3.0856775814913673e22 - 1.0).abs() < 1e-12);
        let dam = reg.lookup("dam").unwrap();
        assert!((dam.base_value() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_exact_symbols_win_over_prefixes() {
        let reg = UnitRegistry::new();
        assert_eq!(reg.lookup("min").unwrap().base_value(), 60.0);
        assert!(reg.lookup("cd").unwrap().same_dimensions(
            &Unit::symbol("cd", 1.0, Dimensions::of(BaseDimension::LuminousIntensity))
        ));
    }

    #[test]
    fn test_unprefixable_and_unknown() {
        let reg = UnitRegistry::new();
        assert!(reg.lookup("kdeg").is_err());
        assert!(reg.lookup("furlong").is_err());
    }

    #[test]
    fn test_add_custom_symbol() {
        let mut reg = UnitRegistry::new();
        reg.add("furlong", 201.168, Dimensions::of(BaseDimension::Length), false)
            .unwrap();
        assert!(reg.contains("furlong"));
        assert!(reg.add("furlong", 1.0, Dimensions::dimensionless(), false).is_err());
        assert!(reg.add("bad", -1.0, Dimensions::dimensionless(), false).is_err());
    }
}
