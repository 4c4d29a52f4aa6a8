//! # Unit Expression Parser
//!
//! Recursive descent parser for unit expressions.
//!
//! ```text
//! expr     := power (('*' | '/') power)*
//! power    := atom (('**' | '^') exponent)?
//! atom     := symbol | '1' | '(' expr ')'
//! exponent := number | '(' number ('/' number)? ')'
//! number   := '-'? digits ('.' digits)?
//! ```

use crate::enums::error::UnitArrowError;
use crate::units::registry::UnitRegistry;
use crate::units::unit::Unit;

pub(crate) fn parse_unit(expr: &str, registry: &UnitRegistry) -> Result<Unit, UnitArrowError> {
    let mut parser = Parser {
        chars: expr.chars().collect(),
        pos: 0,
        expr,
        registry,
    };
    parser.skip_ws();
    if parser.eof() {
        return Err(parser.error("empty unit expression"));
    }
    let unit = parser.expr()?;
    parser.skip_ws();
    if !parser.eof() {
        return Err(parser.error(&format!(
            "unexpected '{}' at position {}",
            parser.chars[parser.pos], parser.pos
        )));
    }
    Ok(unit)
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    expr: &'a str,
    registry: &'a UnitRegistry,
}

impl<'a> Parser<'a> {
    fn expr(&mut self) -> Result<Unit, UnitArrowError> {
        let mut unit = self.power()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    let rhs = self.power()?;
                    unit = unit.mul(&rhs);
                }
                Some('/') => {
                    self.pos += 1;
                    let rhs = self.power()?;
                    unit = unit.div(&rhs);
                }
                _ => return Ok(unit),
            }
        }
    }

    fn power(&mut self) -> Result<Unit, UnitArrowError> {
        let base = self.atom()?;
        self.skip_ws();
        if self.peek() == Some('*') && self.peek_at(1) == Some('*') {
            self.pos += 2;
        } else if self.peek() == Some('^') {
            self.pos += 1;
        } else {
            return Ok(base);
        }
        let exp = self.exponent()?;
        Ok(base.powf(exp))
    }

    fn atom(&mut self) -> Result<Unit, UnitArrowError> {
        self.skip_ws();
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let inner = self.expr()?;
                self.expect(')')?;
                Ok(inner)
            }
            Some(c) if c.is_ascii_digit() => {
                let n = self.number()?;
                if n == 1.0 {
                    Ok(Unit::dimensionless())
                } else {
                    Err(self.error("numeric scale factors other than 1 are not supported"))
                }
            }
            Some(c) if is_symbol_start(c) => {
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if is_symbol_start(c) || c.is_ascii_digit() {
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                let symbol: String = self.chars[start..self.pos].iter().collect();
                self.registry.lookup(&symbol)
            }
            Some(c) => Err(self.error(&format!("unexpected '{}' at position {}", c, self.pos))),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn exponent(&mut self) -> Result<f64, UnitArrowError> {
        self.skip_ws();
        if self.peek() == Some('(') {
            self.pos += 1;
            self.skip_ws();
            let num = self.number()?;
            self.skip_ws();
            let value = if self.peek() == Some('/') {
                self.pos += 1;
                self.skip_ws();
                let den = self.number()?;
                if den == 0.0 {
                    return Err(self.error("zero denominator in exponent"));
                }
                num / den
            } else {
                num
            };
            self.expect(')')?;
            Ok(value)
        } else {
            self.number()
        }
    }

    fn number(&mut self) -> Result<f64, UnitArrowError> {
        self.skip_ws();
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map_err(|_| self.error(&format!("invalid number '{}'", text)))
    }

    fn expect(&mut self, c: char) -> Result<(), UnitArrowError> {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}' at position {}", c, self.pos)))
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    #[inline]
    fn eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&self, message: &str) -> UnitArrowError {
        UnitArrowError::UnitParseError {
            expr: self.expr.to_string(),
            message: message.to_string(),
        }
    }
}

#[inline]
fn is_symbol_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(expr: &str) -> Result<Unit, UnitArrowError> {
        parse_unit(expr, &UnitRegistry::new())
    }

    #[test]
    fn test_compound_expressions() {
        assert_eq!(parse("kg*m/s**2").unwrap().to_string(), "kg*m/s**2");
        assert_eq!(parse("m^2").unwrap().to_string(), "m**2");
        assert_eq!(parse("1/s").unwrap().to_string(), "1/s");
        assert_eq!(parse("(m/s)**2").unwrap().to_string(), "m**2/s**2");
        assert_eq!(parse(" cm * g ").unwrap().to_string(), "cm*g");
    }

    #[test]
    fn test_fractional_exponents() {
        let u = parse("m**(1/2)").unwrap();
        assert_eq!(u.terms()[0].1, 0.5);
        let v = parse("s**-1").unwrap();
        assert_eq!(v.to_string(), "1/s");
    }

    #[test]
    fn test_errors() {
        assert!(parse("").is_err());
        assert!(parse("m*").is_err());
        assert!(parse("(m").is_err());
        assert!(parse("2*m").is_err());
        assert!(parse("m2").is_err());
        assert!(parse("m)").is_err());
    }

    #[test]
    fn test_dimensionless_keyword() {
        assert!(parse("dimensionless").unwrap().is_dimensionless());
    }
}
