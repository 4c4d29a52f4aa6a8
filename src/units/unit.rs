//! # Unit
//!
//! A unit is a product of registry symbols raised to powers, together with its
//! scale relative to the base units of its dimension (`base_value`).
//!
//! Equality follows physical meaning rather than spelling. `J` and
//! `kg*m**2/s**2` compare equal because both the dimensions and the base value
//! agree. `km` and `m` do not.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::enums::error::UnitArrowError;
use crate::units::dimensions::Dimensions;
use crate::units::registry::UnitRegistry;
use crate::units::format::format_terms;
use crate::units::parse;

const BASE_VALUE_RTOL: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct Unit {
    terms: Vec<(String, f64)>,
    base_value: f64,
    dimensions: Dimensions,
}

impl Unit {
    /// The dimensionless unit with scale 1.
    pub fn dimensionless() -> Self {
        Self {
            terms: Vec::new(),
            base_value: 1.0,
            dimensions: Dimensions::dimensionless(),
        }
    }

    /// A single registry symbol.
    pub(crate) fn symbol(symbol: &str, base_value: f64, dimensions: Dimensions) -> Self {
        Self {
            terms: vec![(symbol.to_string(), 1.0)],
            base_value,
            dimensions,
        }
    }

    /// Parses an expression such as `"kg*m/s**2"` against the default registry.
    pub fn parse(expr: &str) -> Result<Unit, UnitArrowError> {
        parse::parse_unit(expr, &UnitRegistry::default_registry())
    }

    /// Parses an expression against a specific registry.
    pub fn parse_with(expr: &str, registry: &UnitRegistry) -> Result<Unit, UnitArrowError> {
        parse::parse_unit(expr, registry)
    }

    /// Scale of this unit relative to the base units of its dimension.
    #[inline]
    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    #[inline]
    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Symbol and power pairs making up the expression.
    pub fn terms(&self) -> &[(String, f64)] {
        &self.terms
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dimensions.is_dimensionless()
    }

    /// True when both units measure the same physical dimension.
    pub fn same_dimensions(&self, other: &Unit) -> bool {
        self.dimensions == other.dimensions
    }

    /// Expression string. Empty for the plain dimensionless unit.
    pub fn expr(&self) -> String {
        format_terms(&self.terms)
    }

    pub fn mul(&self, other: &Unit) -> Unit {
        let mut terms = self.terms.clone();
        for (sym, p) in &other.terms {
            merge_term(&mut terms, sym, *p);
        }
        Unit {
            terms,
            base_value: self.base_value * other.base_value,
            dimensions: self.dimensions.mul(&other.dimensions),
        }
    }

    pub fn div(&self, other: &Unit) -> Unit {
        self.mul(&other.powf(-1.0))
    }

    pub fn powf(&self, power: f64) -> Unit {
        let terms = self
            .terms
            .iter()
            .map(|(s, p)| (s.clone(), p * power))
            .filter(|(_, p)| *p != 0.0)
            .collect();
        Unit {
            terms,
            base_value: self.base_value.powf(power),
            dimensions: self.dimensions.powf(power),
        }
    }

    /// Multiplicative factor taking values in `self` to values in `to`.
    pub fn conversion_factor(&self, to: &Unit) -> Result<f64, UnitArrowError> {
        if !self.same_dimensions(to) {
            return Err(UnitArrowError::UnitConversionError {
                from: self.to_string(),
                to: to.to_string(),
            });
        }
        Ok(self.base_value / to.base_value)
    }
}

fn merge_term(terms: &mut Vec<(String, f64)>, symbol: &str, power: f64) {
    if let Some(pos) = terms.iter().position(|(s, _)| s == symbol) {
        terms[pos].1 += power;
        if terms[pos].1.abs() < 1e-12 {
            terms.remove(pos);
        }
    } else if power != 0.0 {
        terms.push((symbol.to_string(), power));
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        if self.dimensions != other.dimensions {
            return false;
        }
        let (a, b) = (self.base_value, other.base_value);
        (a - b).abs() <= BASE_VALUE_RTOL * a.abs().max(b.abs())
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::dimensionless()
    }
}

impl FromStr for Unit {
    type Err = UnitArrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::parse(s)
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.terms.is_empty() {
            f.write_str("dimensionless")
        } else {
            f.write_str(&self.expr())
        }
    }
}
