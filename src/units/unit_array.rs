//! # Unit Array
//!
//! A materialised array with a unit, produced when a unit-bearing lazy array
//! with at least one dimension is computed.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use vec64::Vec64;

use crate::enums::dtype::DType;
use crate::enums::error::UnitArrowError;
use crate::structs::nd_array::{NdArray, format_value};
use crate::traits::print::format_nested;
use crate::units::quantity::Quantity;
use crate::units::registry::UnitRegistry;
use crate::units::spec::UnitInput;
use crate::units::system::UnitSystem;
use crate::units::unit::Unit;

#[derive(Debug, Clone)]
pub struct UnitArray {
    data: NdArray,
    units: Unit,
    registry: Arc<UnitRegistry>,
    name: Option<String>,
}

impl UnitArray {
    /// Attaches `units`, resolved against the default registry.
    pub fn new(data: NdArray, units: Unit) -> Self {
        Self {
            data,
            units,
            registry: UnitRegistry::default_registry(),
            name: None,
        }
    }

    /// Attaches the unit, registry and name of a sidecar token.
    pub(crate) fn with_sidecar(data: NdArray, sidecar: &Quantity) -> Self {
        Self {
            data,
            units: sidecar.units().clone(),
            registry: Arc::clone(sidecar.registry()),
            name: sidecar.name().map(str::to_string),
        }
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        self.data.as_slice()
    }

    #[inline]
    pub fn data(&self) -> &NdArray {
        &self.data
    }

    pub fn into_data(self) -> NdArray {
        self.data
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    #[inline]
    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    #[inline]
    pub fn units(&self) -> &Unit {
        &self.units
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Element at `index` as a scalar quantity.
    pub fn get(&self, index: &[usize]) -> Option<Quantity> {
        let v = self.data.get(index)?;
        Some(Quantity::from_parts(
            v,
            self.units.clone(),
            Arc::clone(&self.registry),
            self.dtype(),
            self.name.clone(),
        ))
    }

    pub fn to(&self, target: impl Into<UnitInput>) -> Result<UnitArray, UnitArrowError> {
        let target = target.into().resolve(&self.registry, false)?;
        self.convert(target)
    }

    pub fn in_units(&self, target: impl Into<UnitInput>) -> Result<UnitArray, UnitArrowError> {
        self.to(target)
    }

    pub fn in_base(&self, system: Option<UnitSystem>) -> Result<UnitArray, UnitArrowError> {
        let system = system.unwrap_or_else(|| self.registry.unit_system());
        let target = system.express(self.units.dimensions(), &self.registry)?;
        self.convert(target)
    }

    pub fn in_cgs(&self) -> Result<UnitArray, UnitArrowError> {
        self.in_base(Some(UnitSystem::Cgs))
    }

    pub fn in_mks(&self) -> Result<UnitArray, UnitArrowError> {
        self.in_base(Some(UnitSystem::Mks))
    }

    fn convert(&self, target: Unit) -> Result<UnitArray, UnitArrowError> {
        let factor = self.units.conversion_factor(&target)?;
        let dtype = self.dtype().to_float();
        let mut values = Vec64::with_capacity(self.data.len());
        for v in self.values() {
            values.push(dtype.cast(v * factor));
        }
        Ok(UnitArray {
            data: NdArray::new(values, self.shape().to_vec(), dtype)?,
            units: target,
            registry: Arc::clone(&self.registry),
            name: None,
        })
    }
}

impl PartialEq for UnitArray {
    fn eq(&self, other: &Self) -> bool {
        self.units == other.units && self.data == other.data
    }
}

impl Display for UnitArray {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let dtype = self.dtype();
        let body = format_nested(self.values(), self.shape(), &|v| format_value(dtype, v));
        let units = self.name.clone().unwrap_or_else(|| self.units.to_string());
        write!(f, "unit_array({}, '{}')", body, units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metres() -> UnitArray {
        let data = NdArray::new(Vec64::from(vec![1.0, 2.0, 3.0, 4.0]), vec![2, 2], DType::Float64).unwrap();
        UnitArray::new(data, Unit::parse("m").unwrap())
    }

    #[test]
    fn test_to_cm() {
        let cm = metres().to("cm").unwrap();
        assert_eq!(cm.units().to_string(), "cm");
        assert_eq!(cm.values(), &[100.0, 200.0, 300.0, 400.0]);
        assert_eq!(cm.to_string(), "unit_array([[100, 200], [300, 400]], 'cm')");
    }

    #[test]
    fn test_get_and_incompatible() {
        let a = metres();
        let q = a.get(&[1, 1]).unwrap();
        assert_eq!(q.to_string(), "4 m");
        assert!(a.to("s").is_err());
        assert_eq!(a.in_cgs().unwrap().values()[0], 100.0);
    }
}
