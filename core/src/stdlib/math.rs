//! Math Package
//!
//! Constants: math.pi()
//! Functions: math.abs, math.sqrt, math.pow, math.floor, math.ceil,
//!            math.round, math.sin, math.cos, math.min, math.max
//!
//! Functions taking a Number accept both Integer and Float. Rounding
//! functions return Integers; `abs`, `min` and `max` keep Integer inputs
//! Integer.

use crate::{
    api::Error,
    stdlib::{Builtin, BuiltinContext, BuiltinFn, Registry, number_arg},
    values::{TypeMask, Value},
    vm::RuntimeError,
};

const NUMBER: &[TypeMask] = &[TypeMask::NUMBER];
const TWO_NUMBERS: &[TypeMask] = &[TypeMask::NUMBER, TypeMask::NUMBER];

// ============================================================================
// Basic Operations
// ============================================================================

/// Absolute value
fn math_abs(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Integer(i) => Ok(Value::Integer(i.wrapping_abs())),
        _ => Ok(Value::Float(number_arg("math.abs", args, 0)?.abs())),
    }
}

/// Minimum of two numbers
fn math_min(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    if let (Value::Integer(a), Value::Integer(b)) = (&args[0], &args[1]) {
        return Ok(Value::Integer(*a.min(b)));
    }
    let a = number_arg("math.min", args, 0)?;
    let b = number_arg("math.min", args, 1)?;
    Ok(Value::Float(a.min(b)))
}

/// Maximum of two numbers
fn math_max(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    if let (Value::Integer(a), Value::Integer(b)) = (&args[0], &args[1]) {
        return Ok(Value::Integer(*a.max(b)));
    }
    let a = number_arg("math.max", args, 0)?;
    let b = number_arg("math.max", args, 1)?;
    Ok(Value::Float(a.max(b)))
}

fn math_sqrt(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Float(number_arg("math.sqrt", args, 0)?.sqrt()))
}

/// `base` raised to `exponent`, as a Float
fn math_pow(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    let base = number_arg("math.pow", args, 0)?;
    let exponent = number_arg("math.pow", args, 1)?;
    Ok(Value::Float(base.powf(exponent)))
}

// ============================================================================
// Rounding Functions
// ============================================================================

/// Floor function - returns largest integer <= x
fn math_floor(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Integer(number_arg("math.floor", args, 0)?.floor() as i64))
}

/// Ceiling function - returns smallest integer >= x
fn math_ceil(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Integer(number_arg("math.ceil", args, 0)?.ceil() as i64))
}

/// Round to nearest integer, halves away from zero
fn math_round(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Integer(number_arg("math.round", args, 0)?.round() as i64))
}

// ============================================================================
// Trigonometric Functions
// ============================================================================

fn math_sin(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Float(number_arg("math.sin", args, 0)?.sin()))
}

fn math_cos(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Float(number_arg("math.cos", args, 0)?.cos()))
}

fn math_pi(_ctx: &mut BuiltinContext<'_>, _args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Float(core::f64::consts::PI))
}

/// Register the math built-ins.
pub fn register_math_package(registry: &mut Registry) -> Result<(), Error> {
    let unary: [(&'static str, BuiltinFn); 7] = [
        ("math.abs", math_abs),
        ("math.sqrt", math_sqrt),
        ("math.floor", math_floor),
        ("math.ceil", math_ceil),
        ("math.round", math_round),
        ("math.sin", math_sin),
        ("math.cos", math_cos),
    ];
    for (name, func) in unary {
        registry.register(Builtin {
            name,
            params: NUMBER,
            func,
        })?;
    }

    let binary: [(&'static str, BuiltinFn); 3] = [
        ("math.pow", math_pow),
        ("math.min", math_min),
        ("math.max", math_max),
    ];
    for (name, func) in binary {
        registry.register(Builtin {
            name,
            params: TWO_NUMBERS,
            func,
        })?;
    }

    registry.register(Builtin {
        name: "math.pi",
        params: &[],
        func: math_pi,
    })?;
    Ok(())
}
