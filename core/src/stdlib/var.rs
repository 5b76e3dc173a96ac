//! Var Package
//!
//! Functions: var.new, var.free, var.size
//!
//! Dynamic slots over the flat store. `var.new()` hands out a fresh name
//! that programs can index like any other variable; `var.free` drops it
//! together with every slot derived from it.

use crate::{
    api::Error,
    stdlib::{Builtin, BuiltinContext, Registry},
    values::{Name, TypeMask, Value},
    vm::RuntimeError,
};

fn variable_arg<'v>(
    name: &'static str,
    args: &'v [Value],
) -> Result<&'v Name, RuntimeError> {
    args.first()
        .and_then(Value::as_variable)
        .ok_or_else(|| RuntimeError::builtin(name, "argument 1 must be a Variable"))
}

fn var_new(ctx: &mut BuiltinContext<'_>, _args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Variable(ctx.store.allocate()))
}

/// Remove a slot and its derived slots; returns how many were removed.
fn var_free(ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    let name = variable_arg("var.free", args)?;
    Ok(Value::Integer(ctx.store.remove_tree(name) as i64))
}

/// Number of slots derived directly from a variable.
fn var_size(ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    let name = variable_arg("var.size", args)?;
    Ok(Value::Integer(ctx.store.child_count(name) as i64))
}

/// Register the var built-ins.
pub fn register_var_package(registry: &mut Registry) -> Result<(), Error> {
    registry.register(Builtin {
        name: "var.new",
        params: &[],
        func: var_new,
    })?;
    registry.register(Builtin {
        name: "var.free",
        params: &[TypeMask::VARIABLE],
        func: var_free,
    })?;
    registry.register(Builtin {
        name: "var.size",
        params: &[TypeMask::VARIABLE],
        func: var_size,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::BufferConsole;
    use crate::values::{IndexKey, Store};

    #[test]
    fn test_new_size_free() {
        let mut store = Store::new();
        let mut console = BufferConsole::new();
        let mut ctx = BuiltinContext {
            store: &mut store,
            console: &mut console,
        };

        let slot = var_new(&mut ctx, &[]).unwrap();
        let name = slot.as_variable().unwrap().clone();
        assert_eq!(name.to_string(), "<dyn0>");

        ctx.store.set(name.index(IndexKey::Integer(0)), Value::Integer(1));
        ctx.store.set(name.index(IndexKey::Integer(1)), Value::Integer(2));
        ctx.store.set(
            name.index(IndexKey::Integer(1)).index(IndexKey::Integer(0)),
            Value::Integer(3),
        );
        assert_eq!(var_size(&mut ctx, &[slot.clone()]).unwrap().as_int(), Some(2));
        assert_eq!(var_free(&mut ctx, &[slot.clone()]).unwrap().as_int(), Some(3));
        assert_eq!(var_size(&mut ctx, &[slot]).unwrap().as_int(), Some(0));

        let next = var_new(&mut ctx, &[]).unwrap();
        assert_eq!(next.as_variable().map(ToString::to_string).as_deref(), Some("<dyn1>"));
    }
}
