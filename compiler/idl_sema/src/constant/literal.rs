//! Numeric literal parsing.
//!
//! Accepted forms: decimal `42`, hex `0x2A`, binary `0b101010`, each with
//! an optional leading `-`, and decimal floats `1.5`, `-2e10`.

use super::value::{ConstantError, ConstantValue, ConstantValueKind};

#[derive(Copy, Clone, Debug, PartialEq)]
enum Numeral {
    Integer(i128),
    Float(f64),
}

fn parse_numeral(text: &str) -> Result<Numeral, ConstantError> {
    let malformed = || ConstantError::MalformedLiteral(text.to_owned());
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let (radix, body) = if let Some(rest) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, rest)
    } else if let Some(rest) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        (2, rest)
    } else {
        (10, digits)
    };

    if !body.starts_with(|c: char| c.is_ascii_digit() || (radix == 16 && c.is_ascii_hexdigit())) {
        return Err(malformed());
    }

    if radix == 10 && body.contains(['.', 'e', 'E']) {
        let well_formed = body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
        if !well_formed {
            return Err(malformed());
        }
        return text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Numeral::Float)
            .ok_or_else(malformed);
    }

    if !body.chars().all(|c| c.is_digit(radix)) {
        return Err(malformed());
    }
    let magnitude = i128::from_str_radix(body, radix).map_err(|_| ConstantError::Overflow {
        value: text.to_owned(),
        target: ConstantValueKind::Uint64,
    })?;
    Ok(Numeral::Integer(if negative { -magnitude } else { magnitude }))
}

/// Parse `text` as a value of `kind`.
pub fn numeric_value(text: &str, kind: ConstantValueKind) -> Result<ConstantValue, ConstantError> {
    match parse_numeral(text)? {
        Numeral::Integer(value) if kind.is_integral() => ConstantValue::from_integer(kind, value),
        #[allow(clippy::cast_precision_loss)]
        Numeral::Integer(value) if kind.is_float() => ConstantValue::from_float(kind, value as f64),
        Numeral::Integer(_) => Err(ConstantError::KindMismatch {
            from: ConstantValueKind::Int64,
            to: kind,
        }),
        Numeral::Float(value) if kind.is_float() => ConstantValue::from_float(kind, value),
        Numeral::Float(_) => Err(ConstantError::KindMismatch {
            from: ConstantValueKind::Float64,
            to: kind,
        }),
    }
}

/// Parse `text` with no expected type.
///
/// Integers become `int64`, or `uint64` past `i64::MAX`; anything with a
/// fraction or exponent becomes `float64`.
pub fn untyped_numeric_value(text: &str) -> Result<ConstantValue, ConstantError> {
    match parse_numeral(text)? {
        Numeral::Integer(value) => ConstantValue::from_integer(ConstantValueKind::Int64, value)
            .or_else(|_| ConstantValue::from_integer(ConstantValueKind::Uint64, value)),
        Numeral::Float(value) => Ok(ConstantValue::Float64(value)),
    }
}
