//! # **Print Module** - *Pretty Printing with Attitude*
//!
//! Contains the `Print` trait, which wraps `Display` to provide
//! `myobj.print()` for any object that implements it, along with the
//! numpy-style formatting helpers shared by the array representations.
use std::fmt::Display;

use crate::traits::type_unions::Float;

/// Values shown per axis before a preview is elided with `...`.
pub(crate) const MAX_PREVIEW: usize = 50;

/// # Print
///
/// Provides a more convenient way to activate `Display`
/// for arrays and quantities via `myarr.print()`,
/// avoiding the need to write `println!("{}", myarr);`
pub trait Print {
    #[inline]
    fn print(&self)
    where
        Self: Display,
    {
        println!("{}", self);
    }
}

impl<T: Display> Print for T where T: Display {}

/// Shortest readable form of a float: integral values print without a
/// fractional part, very large or small magnitudes switch to exponent form.
pub(crate) fn format_float<T: Float + Display + std::fmt::LowerExp>(v: T) -> String {
    let abs = v.abs();
    let small = T::from(1e-4).unwrap_or(T::zero());
    let large = T::from(1e16).unwrap_or(T::infinity());
    if abs.is_finite() && abs != T::zero() && (abs < small || abs >= large) {
        return format!("{:e}", v);
    }
    let s = format!("{:.6}", v);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Renders a shape as a tuple, `(2, 2)` or `(3,)`.
pub(crate) fn format_shape(shape: &[usize]) -> String {
    match shape {
        [] => "()".into(),
        [n] => format!("({},)", n),
        _ => {
            let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
            format!("({})", dims.join(", "))
        }
    }
}

/// Renders row-major `values` of `shape` as nested brackets, e.g. `[[1, 2], [3, 4]]`.
pub(crate) fn format_nested(values: &[f64], shape: &[usize], fmt: &dyn Fn(f64) -> String) -> String {
    if shape.is_empty() {
        return values.first().map(|v| fmt(*v)).unwrap_or_default();
    }
    let mut out = String::new();
    write_level(values, shape, fmt, &mut out);
    out
}

fn write_level(values: &[f64], shape: &[usize], fmt: &dyn Fn(f64) -> String, out: &mut String) {
    let n = shape[0];
    let inner: usize = shape[1..].iter().product();
    out.push('[');
    for i in 0..n {
        if i > 0 {
            out.push_str(", ");
        }
        if i == MAX_PREVIEW && n > MAX_PREVIEW + 1 {
            out.push_str("...");
            break;
        }
        let block = &values[i * inner..(i + 1) * inner];
        if shape.len() == 1 {
            out.push_str(&fmt(block[0]));
        } else {
            write_level(block, &shape[1..], fmt, out);
        }
    }
    out.push(']');
}
