//! Expression formatting shared by units and dimensions.

/// Renders `(symbol, power)` pairs as `a*b**2/c`, or `a/(b*c)` for several
/// negative powers. An empty list renders as an empty string.
pub(crate) fn format_terms(terms: &[(String, f64)]) -> String {
    let num: Vec<String> = terms
        .iter()
        .filter(|(_, p)| *p > 0.0)
        .map(|(s, p)| format_power(s, *p))
        .collect();
    let den: Vec<String> = terms
        .iter()
        .filter(|(_, p)| *p < 0.0)
        .map(|(s, p)| format_power(s, -*p))
        .collect();

    let head = if num.is_empty() {
        "1".to_string()
    } else {
        num.join("*")
    };
    match den.len() {
        0 if num.is_empty() => String::new(),
        0 => head,
        1 => format!("{}/{}", head, den[0]),
        _ => format!("{}/({})", head, den.join("*")),
    }
}

fn format_power(symbol: &str, power: f64) -> String {
    if power == 1.0 {
        symbol.to_string()
    } else if power.fract() == 0.0 {
        format!("{}**{}", symbol, power as i64)
    } else {
        format!("{}**{}", symbol, power)
    }
}
