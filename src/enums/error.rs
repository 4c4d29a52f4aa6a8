//! # Error Module - Custom *unitarrow* Error Type
//!
//! Defines the unified error type for the crate.
//!
//! ## Features
//! - Covers unit conversion and unit operation failures, unit expression parsing,
//!   broadcasting and shape mismatches, chunk layout validation and invalid casts.
//! - Implements `Display` for readable output and `Error` for integration
//!   with standard Rust error handling.
//!
//! Errors raised by the unit library or the lazy engine propagate through the
//! unit-aware dispatch layer untouched.

use std::error::Error;
use std::fmt;

/// Catch all error type for `unitarrow`
#[derive(Debug, Clone, PartialEq)]
pub enum UnitArrowError {
    /// Conversion between two units of different dimensions.
    UnitConversionError {
        from: String,
        to: String,
    },
    /// An operation whose operands carry units the operation cannot combine,
    /// e.g. adding a length to a time.
    UnitOperationError {
        operation: &'static str,
        lhs: String,
        rhs: Option<String>,
    },
    UnitParseError {
        expr: String,
        message: String,
    },
    /// The units have a dimension that the target unit system has no base unit for.
    UnitsNotReducible {
        units: String,
        system: &'static str,
    },
    UnitRegistryError {
        symbol: String,
        message: String,
    },
    BroadcastError {
        lhs: Vec<usize>,
        rhs: Vec<usize>,
    },
    ShapeError {
        message: String,
    },
    AxisError {
        axis: usize,
        ndim: usize,
    },
    ChunkLayoutError {
        message: String,
    },
    GraphError {
        message: String,
    },
    TypeError {
        from: &'static str,
        to: &'static str,
        message: Option<String>,
    },
}

impl fmt::Display for UnitArrowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitArrowError::UnitConversionError { from, to } => {
                write!(
                    f,
                    "Unit conversion error: cannot convert between '{}' and '{}'.",
                    from, to
                )
            }
            UnitArrowError::UnitOperationError { operation, lhs, rhs } => {
                if let Some(rhs) = rhs {
                    write!(
                        f,
                        "Unit operation error: the {} operation is not defined for '{}' and '{}'.",
                        operation, lhs, rhs
                    )
                } else {
                    write!(
                        f,
                        "Unit operation error: the {} operation is not defined for '{}'.",
                        operation, lhs
                    )
                }
            }
            UnitArrowError::UnitParseError { expr, message } => {
                write!(f, "Unit parse error in '{}': {}", expr, message)
            }
            UnitArrowError::UnitsNotReducible { units, system } => {
                write!(
                    f,
                    "Units not reducible: '{}' has no equivalent in the '{}' unit system.",
                    units, system
                )
            }
            UnitArrowError::UnitRegistryError { symbol, message } => {
                write!(f, "Unit registry error for symbol '{}': {}", symbol, message)
            }
            UnitArrowError::BroadcastError { lhs, rhs } => {
                write!(
                    f,
                    "Broadcast error: shapes {:?} and {:?} cannot be broadcast together.",
                    lhs, rhs
                )
            }
            UnitArrowError::ShapeError { message } => write!(f, "Shape error: {}", message),
            UnitArrowError::AxisError { axis, ndim } => {
                write!(
                    f,
                    "Axis error: axis {} is out of bounds for array of dimension {}.",
                    axis, ndim
                )
            }
            UnitArrowError::ChunkLayoutError { message } => {
                write!(f, "Chunk layout error: {}", message)
            }
            UnitArrowError::GraphError { message } => write!(f, "Graph error: {}", message),
            UnitArrowError::TypeError { from, to, message } => {
                if let Some(msg) = message {
                    write!(f, "Type error: cannot cast from '{}' to '{}': {}", from, to, msg)
                } else {
                    write!(f, "Type error: cannot cast from '{}' to '{}'.", from, to)
                }
            }
        }
    }
}

impl Error for UnitArrowError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_operation_error() {
        let err = UnitArrowError::UnitOperationError {
            operation: "add",
            lhs: "m".into(),
            rhs: Some("s".into()),
        };
        assert_eq!(
            err.to_string(),
            "Unit operation error: the add operation is not defined for 'm' and 's'."
        );
    }

    #[test]
    fn test_display_conversion_error() {
        let err = UnitArrowError::UnitConversionError {
            from: "m".into(),
            to: "s".into(),
        };
        assert!(err.to_string().contains("'m' and 's'"));
    }
}
