//! Tests for result stringification and debug listings of values.

use crate::values::{Label, Store, Value, format_float};
use crate::vm::RuntimeError;

#[test]
fn test_render_int() {
    assert_eq!(Value::Integer(42).render().unwrap(), "42");
    assert_eq!(Value::Integer(-100).render().unwrap(), "-100");
}

#[test]
fn test_render_float() {
    assert_eq!(Value::Float(3.14).render().unwrap(), "3.14");
    assert_eq!(Value::Float(42.0).render().unwrap(), "42");
    assert_eq!(Value::Float(-0.5).render().unwrap(), "-0.5");
}

#[test]
fn test_render_string_is_raw_text() {
    assert_eq!(Value::string("a \"b\"").render().unwrap(), "a \"b\"");
}

#[test]
fn test_render_variable_uses_encoded_name() {
    let mut store = Store::new();
    let element = store.dotted_name("a.b");
    assert_eq!(Value::Variable(element).render().unwrap(), "a#S#b");
}

#[test]
fn test_render_rejects_non_displayable() {
    let mut store = Store::new();
    let symbol = store.intern("print");
    for value in [
        Value::None,
        Value::Label(Label(0)),
        Value::BuiltIn(symbol.clone()),
        Value::Func(symbol),
    ] {
        assert!(matches!(
            value.render(),
            Err(RuntimeError::NotDisplayable { .. })
        ));
    }
}

#[test]
fn test_format_float_is_locale_invariant() {
    assert_eq!(format_float(1234.5), "1234.5");
    assert_eq!(format_float(0.1 + 0.2), "0.30000000000000004");
}

#[test]
fn test_debug_listing() {
    let mut store = Store::new();
    let name = store.name("x");
    assert_eq!(format!("{:?}", Value::Integer(1)), "Int(1)");
    assert_eq!(format!("{:?}", Value::string("hi")), "Str(\"hi\")");
    assert_eq!(format!("{:?}", Value::Variable(name)), "Var(x)");
    assert_eq!(format!("{:?}", Value::Label(Label(3))), "Label(L3)");
    assert_eq!(format!("{:?}", Value::None), "None");
}
