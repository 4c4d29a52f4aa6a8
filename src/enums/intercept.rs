//! # Intercept Module
//!
//! The two closed sets of array methods the unit-aware layer intercepts by name.
//!
//! - [`SimpleOp`] never changes units. The engine result is re-wrapped with the
//!   caller's current unit.
//! - [`ConversionOp`] changes units. The factor comes from the unit sidecar and
//!   the lazy data is scaled by it.

use std::fmt::{Display, Formatter};

/// Engine operations whose results keep the input's unit unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimpleOp {
    Min,
    Max,
    Sum,
    Mean,
    Std,
    Cumsum,
    Squeeze,
    Rechunk,
    Clip,
    View,
    SwapAxes,
    Round,
    Copy,
    DeepCopy,
    Repeat,
    AsType,
    Reshape,
    TopK,
}

impl SimpleOp {
    pub const ALL: [SimpleOp; 18] = [
        SimpleOp::Min,
        SimpleOp::Max,
        SimpleOp::Sum,
        SimpleOp::Mean,
        SimpleOp::Std,
        SimpleOp::Cumsum,
        SimpleOp::Squeeze,
        SimpleOp::Rechunk,
        SimpleOp::Clip,
        SimpleOp::View,
        SimpleOp::SwapAxes,
        SimpleOp::Round,
        SimpleOp::Copy,
        SimpleOp::DeepCopy,
        SimpleOp::Repeat,
        SimpleOp::AsType,
        SimpleOp::Reshape,
        SimpleOp::TopK,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SimpleOp::Min => "min",
            SimpleOp::Max => "max",
            SimpleOp::Sum => "sum",
            SimpleOp::Mean => "mean",
            SimpleOp::Std => "std",
            SimpleOp::Cumsum => "cumsum",
            SimpleOp::Squeeze => "squeeze",
            SimpleOp::Rechunk => "rechunk",
            SimpleOp::Clip => "clip",
            SimpleOp::View => "view",
            SimpleOp::SwapAxes => "swapaxes",
            SimpleOp::Round => "round",
            SimpleOp::Copy => "copy",
            SimpleOp::DeepCopy => "deepcopy",
            SimpleOp::Repeat => "repeat",
            SimpleOp::AsType => "astype",
            SimpleOp::Reshape => "reshape",
            SimpleOp::TopK => "topk",
        }
    }

    /// Looks up an operation by its method name.
    pub fn from_name(name: &str) -> Option<SimpleOp> {
        SimpleOp::ALL.into_iter().find(|op| op.name() == name)
    }
}

/// Unit conversions exposed on unit-bearing arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionOp {
    To,
    InUnits,
    InCgs,
    InBase,
    InMks,
}

impl ConversionOp {
    pub const ALL: [ConversionOp; 5] = [
        ConversionOp::To,
        ConversionOp::InUnits,
        ConversionOp::InCgs,
        ConversionOp::InBase,
        ConversionOp::InMks,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConversionOp::To => "to",
            ConversionOp::InUnits => "in_units",
            ConversionOp::InCgs => "in_cgs",
            ConversionOp::InBase => "in_base",
            ConversionOp::InMks => "in_mks",
        }
    }

    pub fn from_name(name: &str) -> Option<ConversionOp> {
        ConversionOp::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl Display for SimpleOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Display for ConversionOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sets_are_disjoint() {
        for op in SimpleOp::ALL {
            assert!(ConversionOp::from_name(op.name()).is_none());
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(SimpleOp::from_name("topk"), Some(SimpleOp::TopK));
        assert_eq!(SimpleOp::from_name("astype"), Some(SimpleOp::AsType));
        assert_eq!(ConversionOp::from_name("in_mks"), Some(ConversionOp::InMks));
        assert_eq!(SimpleOp::from_name("to"), None);
    }
}
