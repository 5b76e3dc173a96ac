use core::fmt;

use bitflags::bitflags;
use ecow::EcoString;

use crate::values::{Name, Symbol, format_float};
use crate::vm::RuntimeError;

/// A jump target, resolved to an instruction index through the label table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub(crate) u32);

impl Label {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// A runtime value: exactly one case is active.
///
/// `None` is "no value" (an `if` without `or`, a loop that never ran). It is
/// never a legal operator operand.
#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(EcoString),
    Label(Label),
    Variable(Name),
    BuiltIn(Symbol),
    Func(Symbol),
    None,
}

/// The dynamic type of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Integer,
    Float,
    String,
    Label,
    Variable,
    BuiltIn,
    Func,
    None,
}

impl ValueType {
    pub fn mask(self) -> TypeMask {
        match self {
            ValueType::Integer => TypeMask::INTEGER,
            ValueType::Float => TypeMask::FLOAT,
            ValueType::String => TypeMask::STRING,
            ValueType::Label => TypeMask::LABEL,
            ValueType::Variable => TypeMask::VARIABLE,
            ValueType::BuiltIn => TypeMask::BUILTIN,
            ValueType::Func => TypeMask::FUNC,
            ValueType::None => TypeMask::empty(),
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Float)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Integer => "Integer",
            ValueType::Float => "Float",
            ValueType::String => "String",
            ValueType::Label => "Label",
            ValueType::Variable => "Variable",
            ValueType::BuiltIn => "BuiltIn",
            ValueType::Func => "Func",
            ValueType::None => "None",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// Set of value types accepted by a built-in parameter.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TypeMask: u8 {
        const INTEGER = 1 << 0;
        const FLOAT = 1 << 1;
        const STRING = 1 << 2;
        const VARIABLE = 1 << 3;
        const LABEL = 1 << 4;
        const BUILTIN = 1 << 5;
        const FUNC = 1 << 6;

        const NUMBER = Self::INTEGER.bits() | Self::FLOAT.bits();
        const SCALAR = Self::NUMBER.bits() | Self::STRING.bits();
        const CALLABLE = Self::BUILTIN.bits() | Self::FUNC.bits();
    }
}

impl TypeMask {
    pub fn accepts(self, ty: ValueType) -> bool {
        self.intersects(ty.mask())
    }
}

impl fmt::Display for TypeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (TypeMask::INTEGER, "Integer"),
            (TypeMask::FLOAT, "Float"),
            (TypeMask::STRING, "String"),
            (TypeMask::VARIABLE, "Variable"),
            (TypeMask::LABEL, "Label"),
            (TypeMask::BUILTIN, "BuiltIn"),
            (TypeMask::FUNC, "Func"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("nothing")?;
        }
        Ok(())
    }
}

impl Value {
    pub fn bool(value: bool) -> Self {
        Value::Integer(value as i64)
    }

    pub fn string(value: impl Into<EcoString>) -> Self {
        Value::String(value.into())
    }

    pub fn ty(&self) -> ValueType {
        match self {
            Value::Integer(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::Label(_) => ValueType::Label,
            Value::Variable(_) => ValueType::Variable,
            Value::BuiltIn(_) => ValueType::BuiltIn,
            Value::Func(_) => ValueType::Func,
            Value::None => ValueType::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// The entity name carried by Label/Variable/BuiltIn/Func values.
    pub fn name(&self) -> Result<String, RuntimeError> {
        match self {
            Value::Label(label) => Ok(format!("{:?}", label)),
            Value::Variable(name) => Ok(name.to_string()),
            Value::BuiltIn(symbol) | Value::Func(symbol) => Ok(symbol.to_string()),
            other => Err(RuntimeError::NoName { found: other.ty() }),
        }
    }

    pub fn as_variable(&self) -> Option<&Name> {
        match self {
            Value::Variable(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<Label> {
        match self {
            Value::Label(label) => Some(*label),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view used by mixed Integer/Float comparisons.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text of a scalar value, as used by display, casts and concatenation.
    pub fn scalar_text(&self) -> Option<EcoString> {
        match self {
            Value::Integer(i) => Some(ecow::eco_format!("{}", i)),
            Value::Float(f) => Some(format_float(*f)),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Stringify a program result.
    ///
    /// Variables display as their encoded name; Func, BuiltIn, Label and None
    /// have no textual form.
    pub fn render(&self) -> Result<String, RuntimeError> {
        match self {
            Value::Variable(name) => Ok(name.to_string()),
            other => other
                .scalar_text()
                .map(|text| text.to_string())
                .ok_or(RuntimeError::NotDisplayable { found: other.ty() }),
        }
    }

    /// Structural equality used by `==`, `in` and `holds`.
    ///
    /// Numbers compare numerically across Integer/Float; named values compare
    /// equal only for the same kind and name. Any other pairing is unequal.
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Variable(a), Value::Variable(b)) => a == b,
            (Value::BuiltIn(a), Value::BuiltIn(b)) => a == b,
            (Value::Func(a), Value::Func(b)) => a == b,
            (Value::Label(a), Value::Label(b)) => a == b,
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "Int({})", i),
            Value::Float(x) => write!(f, "Float({})", format_float(*x)),
            Value::String(s) => write!(f, "Str({:?})", s.as_str()),
            Value::Label(label) => write!(f, "Label({:?})", label),
            Value::Variable(name) => write!(f, "Var({})", name),
            Value::BuiltIn(symbol) => write!(f, "BuiltIn({})", symbol),
            Value::Func(symbol) => write!(f, "Func({})", symbol),
            Value::None => write!(f, "None"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<Name> for Value {
    fn from(value: Name) -> Self {
        Value::Variable(value)
    }
}
