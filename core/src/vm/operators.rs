//! Binary and unary operator implementations.
//!
//! Operands arrive exactly as they were popped. Each operator decides whether
//! a Variable operand is loaded through the store (arithmetic, comparisons,
//! casts) or used as a reference (`$`, the base of `[]`, containers of the
//! membership operators, the truthiness operators).

use crate::{
    casting,
    values::{IndexKey, Name, Store, Value, ValueType},
    vm::{BinaryOp, RuntimeError, UnaryOp},
};

/// Number of Unicode scalar value slots; code point shifts wrap modulo this.
const CODE_POINT_SPACE: i128 = 0x11_0000;

/// Resolve a Variable one level through the store.
pub(crate) fn load(store: &Store, value: Value) -> Result<Value, RuntimeError> {
    match value {
        Value::Variable(name) => {
            store
                .get(&name)
                .cloned()
                .ok_or_else(|| RuntimeError::UndefinedVariable {
                    name: name.to_string(),
                })
        }
        other => Ok(other),
    }
}

/// Load an operand that must carry a value.
fn operand(store: &Store, value: Value, op: &'static str) -> Result<Value, RuntimeError> {
    match load(store, value)? {
        Value::None => Err(RuntimeError::NoneOperand { op }),
        loaded => Ok(loaded),
    }
}

/// Truthiness: numbers are true when non-zero, strings when non-empty,
/// variables when they exist. Labels and callables are always true.
pub(crate) fn truthy(store: &Store, value: &Value, op: &'static str) -> Result<bool, RuntimeError> {
    Ok(match value {
        Value::Integer(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Variable(name) => store.contains(name),
        Value::Label(_) | Value::BuiltIn(_) | Value::Func(_) => true,
        Value::None => return Err(RuntimeError::NoneOperand { op }),
    })
}

pub(crate) fn index_key(value: &Value) -> Result<IndexKey, RuntimeError> {
    match value {
        Value::Integer(i) => Ok(IndexKey::Integer(*i)),
        Value::Float(f) => Ok(IndexKey::float(*f)),
        Value::String(s) => Ok(IndexKey::String(s.clone())),
        other => Err(RuntimeError::UnaryTypeMismatch {
            op: BinaryOp::Index.symbol(),
            found: other.ty(),
        }),
    }
}

/// Evaluate `left op right`, applying the negation flag for the operators
/// that carry one.
pub(crate) fn binary(
    store: &Store,
    op: BinaryOp,
    negated: bool,
    left: Value,
    right: Value,
) -> Result<Value, RuntimeError> {
    let symbol = op.symbol();
    match op {
        BinaryOp::Add
        | BinaryOp::Sub
        | BinaryOp::Mul
        | BinaryOp::Div
        | BinaryOp::Mod
        | BinaryOp::Shl
        | BinaryOp::Shr => {
            let left = operand(store, left, symbol)?;
            let right = operand(store, right, symbol)?;
            arithmetic(op, left, right)
        }
        BinaryOp::Lt | BinaryOp::Gt => {
            let left = operand(store, left, symbol)?;
            let right = operand(store, right, symbol)?;
            let ordering = compare(op, &left, &right)?;
            let result = match op {
                BinaryOp::Lt => ordering.is_lt(),
                _ => ordering.is_gt(),
            };
            Ok(Value::bool(result != negated))
        }
        BinaryOp::Eq => {
            let left = operand(store, left, symbol)?;
            let right = operand(store, right, symbol)?;
            Ok(Value::bool(left.loosely_equals(&right) != negated))
        }
        BinaryOp::And | BinaryOp::Or => {
            let a = truthy(store, &left, symbol)?;
            let b = truthy(store, &right, symbol)?;
            let result = match op {
                BinaryOp::And => a && b,
                _ => a || b,
            };
            Ok(Value::bool(result != negated))
        }
        BinaryOp::Cast => {
            let left = operand(store, left, symbol)?;
            let right = operand(store, right, symbol)?;
            Ok(casting::cast(&left, right.ty())?)
        }
        BinaryOp::CanCast => {
            let castable = match (load(store, left), load(store, right)) {
                (Ok(left), Ok(right)) => casting::can_cast(&left, right.ty()),
                _ => false,
            };
            Ok(Value::bool(castable))
        }
        BinaryOp::Index => index(store, left, right),
        BinaryOp::In => {
            let needle = operand(store, left, symbol)?;
            let container = container(right, symbol)?;
            match store.find_value(&container, &needle) {
                Some(found) if !negated => Ok(Value::Variable(found)),
                found => Ok(Value::bool(found.is_some() != negated)),
            }
        }
        BinaryOp::Holds => {
            let container = container(left, symbol)?;
            let needle = operand(store, right, symbol)?;
            let found = store.find_value(&container, &needle).is_some();
            Ok(Value::bool(found != negated))
        }
        BinaryOp::Has => {
            let container = container(left, symbol)?;
            let key = index_key(&operand(store, right, symbol)?)?;
            Ok(Value::bool(store.has_index(&container, key) != negated))
        }
    }
}

fn container(value: Value, op: &'static str) -> Result<Name, RuntimeError> {
    match value {
        Value::Variable(name) => Ok(name),
        Value::None => Err(RuntimeError::NoneOperand { op }),
        other => Err(RuntimeError::NotAVariable {
            op,
            found: other.ty(),
        }),
    }
}

fn arithmetic(op: BinaryOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    let mismatch = |left: &Value, right: &Value| RuntimeError::TypeMismatch {
        op: op.symbol(),
        left: left.ty(),
        right: right.ty(),
    };

    match (&left, &right) {
        (Value::Integer(a), Value::Integer(b)) => integer_arithmetic(op, *a, *b),
        (Value::Float(a), Value::Float(b)) => {
            let result = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                BinaryOp::Mod => a % b,
                _ => return Err(mismatch(&left, &right)),
            };
            Ok(Value::Float(result))
        }
        (Value::String(s), _) if op == BinaryOp::Add => {
            let tail = right.scalar_text().ok_or_else(|| mismatch(&left, &right))?;
            let mut text = s.clone();
            text.push_str(&tail);
            Ok(Value::String(text))
        }
        (Value::String(s), Value::Integer(n)) => match op {
            BinaryOp::Mul => {
                let count = non_negative(op, *n)?;
                Ok(Value::string(s.repeat(count)))
            }
            BinaryOp::Sub => shift_code_points(s, -(*n as i128)),
            BinaryOp::Shl => shift_code_points(s, non_negative(op, *n)? as i128),
            BinaryOp::Shr => shift_code_points(s, -(non_negative(op, *n)? as i128)),
            _ => Err(mismatch(&left, &right)),
        },
        _ => Err(mismatch(&left, &right)),
    }
}

fn integer_arithmetic(op: BinaryOp, a: i64, b: i64) -> Result<Value, RuntimeError> {
    let result = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div if b == 0 => return Err(RuntimeError::DivisionByZero),
        BinaryOp::Mod if b == 0 => return Err(RuntimeError::DivisionByZero),
        // wrapping_div/rem handle i64::MIN / -1
        BinaryOp::Div => a.wrapping_div(b),
        BinaryOp::Mod => a.wrapping_rem(b),
        BinaryOp::Shl => {
            let count = non_negative(op, b)?;
            if count >= 64 { 0 } else { a << count }
        }
        BinaryOp::Shr => {
            let count = non_negative(op, b)?;
            a >> count.min(63)
        }
        _ => {
            return Err(RuntimeError::TypeMismatch {
                op: op.symbol(),
                left: ValueType::Integer,
                right: ValueType::Integer,
            });
        }
    };
    Ok(Value::Integer(result))
}

fn non_negative(op: BinaryOp, count: i64) -> Result<usize, RuntimeError> {
    usize::try_from(count).map_err(|_| RuntimeError::NegativeCount {
        op: op.symbol(),
        count,
    })
}

/// Move every character of `text` by `delta` code points.
fn shift_code_points(text: &str, delta: i128) -> Result<Value, RuntimeError> {
    let mut shifted = ecow::EcoString::new();
    for c in text.chars() {
        let code = (c as i128 + delta).rem_euclid(CODE_POINT_SPACE) as u32;
        let moved = char::from_u32(code).ok_or(RuntimeError::InvalidCodePoint { code })?;
        shifted.push(moved);
    }
    Ok(Value::String(shifted))
}

fn compare(
    op: BinaryOp,
    left: &Value,
    right: &Value,
) -> Result<core::cmp::Ordering, RuntimeError> {
    let mismatch = || RuntimeError::TypeMismatch {
        op: op.symbol(),
        left: left.ty(),
        right: right.ty(),
    };
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Ok(a.as_str().cmp(b.as_str())),
        _ => {
            let (a, b) = left
                .as_number()
                .zip(right.as_number())
                .ok_or_else(mismatch)?;
            // NaN compares as neither less nor greater.
            Ok(a.partial_cmp(&b).unwrap_or(core::cmp::Ordering::Equal))
        }
    }
}

fn index(store: &Store, base: Value, key: Value) -> Result<Value, RuntimeError> {
    let symbol = BinaryOp::Index.symbol();
    let key = operand(store, key, symbol)?;
    match base {
        Value::Variable(name) => Ok(Value::Variable(name.index(index_key(&key)?))),
        Value::String(text) => match key {
            Value::Integer(i) => {
                let len = text.chars().count();
                usize::try_from(i)
                    .ok()
                    .and_then(|position| text.chars().nth(position))
                    .map(|c| Value::string(c.encode_utf8(&mut [0; 4]) as &str))
                    .ok_or(RuntimeError::IndexOutOfBounds { index: i, len })
            }
            Value::String(field) if field == "length" => {
                Ok(Value::Integer(text.chars().count() as i64))
            }
            other => Err(RuntimeError::TypeMismatch {
                op: symbol,
                left: ValueType::String,
                right: other.ty(),
            }),
        },
        Value::None => Err(RuntimeError::NoneOperand { op: symbol }),
        other => Err(RuntimeError::TypeMismatch {
            op: symbol,
            left: other.ty(),
            right: key.ty(),
        }),
    }
}

/// Evaluate `op operand`.
pub(crate) fn unary(store: &Store, op: UnaryOp, value: Value) -> Result<Value, RuntimeError> {
    let symbol = op.symbol();
    match op {
        UnaryOp::Neg => match operand(store, value, symbol)? {
            Value::Integer(i) => Ok(Value::Integer(i.wrapping_neg())),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(RuntimeError::UnaryTypeMismatch {
                op: symbol,
                found: other.ty(),
            }),
        },
        UnaryOp::Not => Ok(Value::bool(!truthy(store, &value, symbol)?)),
        UnaryOp::Deref => {
            let name = container(value, symbol)?;
            load(store, Value::Variable(name))
        }
    }
}
