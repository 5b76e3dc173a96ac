//! String Package
//!
//! Functions: string.chr, string.ord

use crate::{
    api::Error,
    stdlib::{Builtin, BuiltinContext, Registry, int_arg, str_arg},
    values::{TypeMask, Value},
    vm::RuntimeError,
};

/// One-character string for a code point.
fn string_chr(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    let code = int_arg("string.chr", args, 0)?;
    let c = u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| RuntimeError::builtin("string.chr", format!("invalid code point {}", code)))?;
    let mut text = ecow::EcoString::new();
    text.push(c);
    Ok(Value::String(text))
}

/// Code point of the first character.
fn string_ord(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    let text = str_arg("string.ord", args, 0)?;
    let c = text
        .chars()
        .next()
        .ok_or_else(|| RuntimeError::builtin("string.ord", "empty string"))?;
    Ok(Value::Integer(c as i64))
}

/// Register the string built-ins.
pub fn register_string_package(registry: &mut Registry) -> Result<(), Error> {
    registry.register(Builtin {
        name: "string.chr",
        params: &[TypeMask::INTEGER],
        func: string_chr,
    })?;
    registry.register(Builtin {
        name: "string.ord",
        params: &[TypeMask::STRING],
        func: string_ord,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::BufferConsole;
    use crate::values::Store;

    #[test]
    fn test_chr_ord() {
        let mut store = Store::new();
        let mut console = BufferConsole::new();
        let mut ctx = BuiltinContext {
            store: &mut store,
            console: &mut console,
        };
        assert_eq!(
            string_chr(&mut ctx, &[Value::Integer(955)]).unwrap().as_str(),
            Some("λ")
        );
        assert_eq!(
            string_ord(&mut ctx, &[Value::string("λx")]).unwrap().as_int(),
            Some(955)
        );
        assert!(string_chr(&mut ctx, &[Value::Integer(0xD800)]).is_err());
        assert!(string_chr(&mut ctx, &[Value::Integer(-1)]).is_err());
        assert!(string_ord(&mut ctx, &[Value::string("")]).is_err());
    }
}
