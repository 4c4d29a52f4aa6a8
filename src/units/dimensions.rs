//! # Dimensions
//!
//! Physical dimensions as exponent vectors over a fixed set of base dimensions.
//! Two units are compatible exactly when their dimensions compare equal.

use std::fmt::{Display, Formatter};

use crate::units::format::format_terms;

/// Base dimensions every unit is expressed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseDimension {
    Mass,
    Length,
    Time,
    Temperature,
    Angle,
    Current,
    LuminousIntensity,
    Amount,
}

impl BaseDimension {
    pub const ALL: [BaseDimension; 8] = [
        BaseDimension::Mass,
        BaseDimension::Length,
        BaseDimension::Time,
        BaseDimension::Temperature,
        BaseDimension::Angle,
        BaseDimension::Current,
        BaseDimension::LuminousIntensity,
        BaseDimension::Amount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BaseDimension::Mass => "mass",
            BaseDimension::Length => "length",
            BaseDimension::Time => "time",
            BaseDimension::Temperature => "temperature",
            BaseDimension::Angle => "angle",
            BaseDimension::Current => "current",
            BaseDimension::LuminousIntensity => "luminous_intensity",
            BaseDimension::Amount => "amount",
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

// Exponents within this distance are treated as equal, so that
// fractional powers such as `(m**(1/3))**3` come back to `m`.
const EXPONENT_TOLERANCE: f64 = 1e-9;

/// Exponent vector over [`BaseDimension::ALL`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Dimensions([f64; 8]);

impl Dimensions {
    pub const fn dimensionless() -> Self {
        Dimensions([0.0; 8])
    }

    pub fn of(base: BaseDimension) -> Self {
        Self::dimensionless().with(base, 1.0)
    }

    /// Returns a copy with `base` raised to `power`.
    pub fn with(mut self, base: BaseDimension, power: f64) -> Self {
        self.0[base.index()] = power;
        self
    }

    #[inline]
    pub fn exponent(&self, base: BaseDimension) -> f64 {
        self.0[base.index()]
    }

    pub fn mul(&self, other: &Dimensions) -> Dimensions {
        let mut out = self.0;
        for (o, e) in out.iter_mut().zip(other.0.iter()) {
            *o += e;
        }
        Dimensions(out).snapped()
    }

    pub fn div(&self, other: &Dimensions) -> Dimensions {
        let mut out = self.0;
        for (o, e) in out.iter_mut().zip(other.0.iter()) {
            *o -= e;
        }
        Dimensions(out).snapped()
    }

    pub fn powf(&self, power: f64) -> Dimensions {
        let mut out = self.0;
        for o in out.iter_mut() {
            *o *= power;
        }
        Dimensions(out).snapped()
    }

    pub fn is_dimensionless(&self) -> bool {
        self.0.iter().all(|e| e.abs() < EXPONENT_TOLERANCE)
    }

    /// Dimensionless, or a pure angle.
    pub fn is_angle_or_dimensionless(&self) -> bool {
        BaseDimension::ALL
            .iter()
            .filter(|b| **b != BaseDimension::Angle)
            .all(|b| self.exponent(*b).abs() < EXPONENT_TOLERANCE)
    }

    /// Non-zero exponents, in base dimension order.
    pub fn iter(&self) -> impl Iterator<Item = (BaseDimension, f64)> + '_ {
        BaseDimension::ALL
            .into_iter()
            .map(|b| (b, self.exponent(b)))
            .filter(|(_, e)| e.abs() >= EXPONENT_TOLERANCE)
    }

    fn snapped(mut self) -> Self {
        for e in self.0.iter_mut() {
            let r = e.round();
            if (*e - r).abs() < EXPONENT_TOLERANCE {
                *e = r;
            }
        }
        self
    }
}

impl PartialEq for Dimensions {
    fn eq(&self, other: &Self) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() < EXPONENT_TOLERANCE)
    }
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_dimensionless() {
            return f.write_str("1");
        }
        let terms: Vec<(String, f64)> = self
            .iter()
            .map(|(b, e)| (format!("({})", b.name()), e))
            .collect();
        f.write_str(&format_terms(&terms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_dimensions() {
        let l = Dimensions::of(BaseDimension::Length);
        let t = Dimensions::of(BaseDimension::Time);
        let v = l.div(&t);
        assert_eq!(v.exponent(BaseDimension::Length), 1.0);
        assert_eq!(v.exponent(BaseDimension::Time), -1.0);
        assert_eq!(v.to_string(), "(length)/(time)");
    }

    #[test]
    fn test_fractional_powers_snap_back() {
        let l = Dimensions::of(BaseDimension::Length);
        let cube_root = l.powf(1.0 / 3.0);
        assert_eq!(cube_root.powf(3.0), l);
        assert!(l.div(&l).is_dimensionless());
    }

    #[test]
    fn test_angle_is_angle_or_dimensionless() {
        assert!(Dimensions::of(BaseDimension::Angle).is_angle_or_dimensionless());
        assert!(!Dimensions::of(BaseDimension::Length).is_angle_or_dimensionless());
    }
}
