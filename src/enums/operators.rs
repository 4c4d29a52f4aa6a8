//! # Operators Module
//!
//! Closed enumerations of every operation the unit-aware layer knows how to
//! route: elementwise ufuncs, array-level functions and arithmetic operators.
//!
//! The lazy engine evaluates them, and the unit library decides their units.

use std::fmt::{Display, Formatter};

/// Elementwise universal functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ufunc {
    // unary
    Sin,
    Cos,
    Tan,
    Arcsin,
    Arccos,
    Arctan,
    Sqrt,
    Cbrt,
    Square,
    Reciprocal,
    Exp,
    Expm1,
    Log,
    Log2,
    Log10,
    Log1p,
    Absolute,
    Negative,
    Floor,
    Ceil,
    Rint,
    Sign,
    IsFinite,
    IsNan,
    // binary
    Hypot,
    Maximum,
    Minimum,
    Arctan2,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Ufunc {
    /// Number of operands the ufunc consumes.
    pub fn arity(self) -> usize {
        use Ufunc::*;
        match self {
            Hypot | Maximum | Minimum | Arctan2 | Equal | NotEqual | Less | LessEqual
            | Greater | GreaterEqual => 2,
            _ => 1,
        }
    }

    /// Whether the ufunc yields booleans rather than numbers.
    pub fn is_predicate(self) -> bool {
        use Ufunc::*;
        matches!(
            self,
            IsFinite | IsNan | Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual
        )
    }

    pub fn name(self) -> &'static str {
        use Ufunc::*;
        match self {
            Sin => "sin",
            Cos => "cos",
            Tan => "tan",
            Arcsin => "arcsin",
            Arccos => "arccos",
            Arctan => "arctan",
            Sqrt => "sqrt",
            Cbrt => "cbrt",
            Square => "square",
            Reciprocal => "reciprocal",
            Exp => "exp",
            Expm1 => "expm1",
            Log => "log",
            Log2 => "log2",
            Log10 => "log10",
            Log1p => "log1p",
            Absolute => "absolute",
            Negative => "negative",
            Floor => "floor",
            Ceil => "ceil",
            Rint => "rint",
            Sign => "sign",
            IsFinite => "isfinite",
            IsNan => "isnan",
            Hypot => "hypot",
            Maximum => "maximum",
            Minimum => "minimum",
            Arctan2 => "arctan2",
            Equal => "equal",
            NotEqual => "not_equal",
            Less => "less",
            LessEqual => "less_equal",
            Greater => "greater",
            GreaterEqual => "greater_equal",
        }
    }

    /// Evaluates a unary ufunc on one value.
    #[inline]
    pub fn apply_unary(self, x: f64) -> f64 {
        use Ufunc::*;
        match self {
            Sin => x.sin(),
            Cos => x.cos(),
            Tan => x.tan(),
            Arcsin => x.asin(),
            Arccos => x.acos(),
            Arctan => x.atan(),
            Sqrt => x.sqrt(),
            Cbrt => x.cbrt(),
            Square => x * x,
            Reciprocal => 1.0 / x,
            Exp => x.exp(),
            Expm1 => x.exp_m1(),
            Log => x.ln(),
            Log2 => x.log2(),
            Log10 => x.log10(),
            Log1p => x.ln_1p(),
            Absolute => x.abs(),
            Negative => -x,
            Floor => x.floor(),
            Ceil => x.ceil(),
            Rint => x.round_ties_even(),
            Sign => {
                if x.is_nan() {
                    f64::NAN
                } else if x == 0.0 {
                    0.0
                } else {
                    x.signum()
                }
            }
            IsFinite => bool_value(x.is_finite()),
            IsNan => bool_value(x.is_nan()),
            _ => f64::NAN,
        }
    }

    /// Evaluates a binary ufunc on one pair of values.
    #[inline]
    pub fn apply_binary(self, a: f64, b: f64) -> f64 {
        use Ufunc::*;
        match self {
            Hypot => a.hypot(b),
            Maximum => {
                if a.is_nan() || b.is_nan() {
                    f64::NAN
                } else {
                    a.max(b)
                }
            }
            Minimum => {
                if a.is_nan() || b.is_nan() {
                    f64::NAN
                } else {
                    a.min(b)
                }
            }
            Arctan2 => a.atan2(b),
            Equal => bool_value(a == b),
            NotEqual => bool_value(a != b),
            Less => bool_value(a < b),
            LessEqual => bool_value(a <= b),
            Greater => bool_value(a > b),
            GreaterEqual => bool_value(a >= b),
            _ => f64::NAN,
        }
    }
}

/// Arithmetic operators, including the unary `abs` and `neg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Abs,
    Neg,
}

impl Operator {
    pub fn name(self) -> &'static str {
        match self {
            Operator::Add => "add",
            Operator::Subtract => "subtract",
            Operator::Multiply => "multiply",
            Operator::Divide => "divide",
            Operator::Power => "power",
            Operator::Abs => "abs",
            Operator::Neg => "neg",
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Operator::Abs | Operator::Neg)
    }

    #[inline]
    pub fn apply_binary(self, a: f64, b: f64) -> f64 {
        match self {
            Operator::Add => a + b,
            Operator::Subtract => a - b,
            Operator::Multiply => a * b,
            Operator::Divide => a / b,
            Operator::Power => a.powf(b),
            Operator::Abs => a.abs(),
            Operator::Neg => -a,
        }
    }
}

/// Array-level functions that see the whole operand arrays rather than single elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrayFunction {
    /// Joins operands along an existing axis.
    Concatenate { axis: usize },
    /// Inner product for 1-d operands, matrix product for 2-d operands.
    Dot,
    Var { axis: Option<usize>, ddof: usize },
    Median { axis: Option<usize> },
    /// Peak to peak range, `max - min`.
    Ptp { axis: Option<usize> },
    /// First order discrete difference.
    Diff { axis: usize },
}

impl ArrayFunction {
    pub fn name(self) -> &'static str {
        match self {
            ArrayFunction::Concatenate { .. } => "concatenate",
            ArrayFunction::Dot => "dot",
            ArrayFunction::Var { .. } => "var",
            ArrayFunction::Median { .. } => "median",
            ArrayFunction::Ptp { .. } => "ptp",
            ArrayFunction::Diff { .. } => "diff",
        }
    }
}

/// Reductions along one axis or over the whole array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reduction {
    Min,
    Max,
    Sum,
    Mean,
    Std { ddof: usize },
    Var { ddof: usize },
    Median,
    Ptp,
}

impl Reduction {
    pub fn name(self) -> &'static str {
        match self {
            Reduction::Min => "min",
            Reduction::Max => "max",
            Reduction::Sum => "sum",
            Reduction::Mean => "mean",
            Reduction::Std { .. } => "std",
            Reduction::Var { .. } => "var",
            Reduction::Median => "median",
            Reduction::Ptp => "ptp",
        }
    }
}

/// Any operation whose result unit the resolver can derive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    Ufunc(Ufunc),
    Function(ArrayFunction),
    Operator(Operator),
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Ufunc(u) => u.name(),
            Operation::Function(f) => f.name(),
            Operation::Operator(o) => o.name(),
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[inline(always)]
fn bool_value(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity() {
        assert_eq!(Ufunc::Sin.arity(), 1);
        assert_eq!(Ufunc::Hypot.arity(), 2);
        assert_eq!(Ufunc::Less.arity(), 2);
    }

    #[test]
    fn test_apply() {
        assert_eq!(Ufunc::Square.apply_unary(3.0), 9.0);
        assert_eq!(Ufunc::Rint.apply_unary(2.5), 2.0);
        assert_eq!(Ufunc::Sign.apply_unary(-4.0), -1.0);
        assert_eq!(Ufunc::Hypot.apply_binary(3.0, 4.0), 5.0);
        assert_eq!(Ufunc::Less.apply_binary(1.0, 2.0), 1.0);
        assert_eq!(Operator::Power.apply_binary(2.0, 3.0), 8.0);
    }
}
