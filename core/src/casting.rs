//! Type casting and cast validation.
//!
//! Casting is the `:` operator (`"12" : 0` converts to the right operand's
//! type). The `?` operator asks whether such a cast would succeed without
//! performing it. Both consult the same table of allowed conversions.
//!
//! | from \ to | Integer     | Float       | String |
//! |-----------|-------------|-------------|--------|
//! | Integer   | always      | always      | always |
//! | Float     | always      | always      | always |
//! | String    | trial parse | trial parse | always |
//!
//! Every other pairing is rejected.

use thiserror::Error;

use crate::values::{Value, ValueType};

/// How a cast from one type to another is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Castability {
    Always,
    /// Allowed when the source text parses as the target type.
    TrialParse,
    Never,
}

/// Look up the cast table.
pub fn castability(from: ValueType, to: ValueType) -> Castability {
    use ValueType::*;
    match (from, to) {
        (Integer | Float, Integer | Float | String) => Castability::Always,
        (String, String) => Castability::Always,
        (String, Integer | Float) => Castability::TrialParse,
        _ => Castability::Never,
    }
}

/// Errors raised by [`cast`].
#[derive(Debug, Clone, Error)]
pub enum CastError {
    #[error("cannot cast {from} to {to}")]
    Unsupported { from: ValueType, to: ValueType },

    #[error("cannot parse {text:?} as {to}")]
    Unparsable { text: String, to: ValueType },
}

/// Convert `value` to `target`.
///
/// Float to Integer truncates toward zero. Numbers format to strings the same
/// way results are displayed.
pub fn cast(value: &Value, target: ValueType) -> Result<Value, CastError> {
    let unsupported = || CastError::Unsupported {
        from: value.ty(),
        to: target,
    };
    match castability(value.ty(), target) {
        Castability::Never => Err(unsupported()),
        Castability::Always => match (value, target) {
            (Value::Integer(i), ValueType::Integer) => Ok(Value::Integer(*i)),
            (Value::Integer(i), ValueType::Float) => Ok(Value::Float(*i as f64)),
            (Value::Float(f), ValueType::Integer) => Ok(Value::Integer(f.trunc() as i64)),
            (Value::Float(f), ValueType::Float) => Ok(Value::Float(*f)),
            (_, ValueType::String) => value
                .scalar_text()
                .map(Value::String)
                .ok_or_else(unsupported),
            _ => Err(unsupported()),
        },
        Castability::TrialParse => {
            let text = value.as_str().ok_or_else(unsupported)?;
            parse_as(text, target).ok_or_else(|| CastError::Unparsable {
                text: text.to_string(),
                to: target,
            })
        }
    }
}

/// Whether [`cast`] would succeed. Never fails.
pub fn can_cast(value: &Value, target: ValueType) -> bool {
    match castability(value.ty(), target) {
        Castability::Always => true,
        Castability::Never => false,
        Castability::TrialParse => value
            .as_str()
            .is_some_and(|text| parse_as(text, target).is_some()),
    }
}

fn parse_as(text: &str, target: ValueType) -> Option<Value> {
    match target {
        ValueType::Integer => text.parse::<i64>().ok().map(Value::Integer),
        ValueType::Float if is_decimal(text) => text.parse::<f64>().ok().map(Value::Float),
        _ => None,
    }
}

/// Optional sign, digits, and at most one `.`. Rejects the exponent and
/// `inf`/`NaN` spellings `f64::from_str` would take.
fn is_decimal(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    !(whole.is_empty() && fraction.is_empty()) && digits(whole) && digits(fraction)
}
