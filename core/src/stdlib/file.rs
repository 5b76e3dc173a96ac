//! File Package
//!
//! Functions: file.read, file.write, file.exists, file.delete
//!
//! Paths are taken as-is, relative to the process's working directory.

use std::fs;
use std::path::Path;

use crate::{
    api::Error,
    stdlib::{Builtin, BuiltinContext, Registry, str_arg, text_arg},
    values::{TypeMask, Value},
    vm::RuntimeError,
};

/// Whole file contents as a String.
fn file_read(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    let path = str_arg("file.read", args, 0)?;
    let contents = fs::read_to_string(path)
        .map_err(|err| RuntimeError::builtin("file.read", format!("{}: {}", path, err)))?;
    Ok(Value::string(contents))
}

/// Replace the file's contents; returns the number of bytes written.
fn file_write(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    let path = str_arg("file.write", args, 0)?;
    let contents = text_arg("file.write", args, 1)?;
    fs::write(path, contents.as_bytes())
        .map_err(|err| RuntimeError::builtin("file.write", format!("{}: {}", path, err)))?;
    Ok(Value::Integer(contents.len() as i64))
}

fn file_exists(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    let path = str_arg("file.exists", args, 0)?;
    Ok(Value::bool(Path::new(path).exists()))
}

/// Remove a file. Returns 1 if it was deleted, 0 if it did not exist.
fn file_delete(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    let path = str_arg("file.delete", args, 0)?;
    match fs::remove_file(path) {
        Ok(()) => Ok(Value::bool(true)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Value::bool(false)),
        Err(err) => Err(RuntimeError::builtin(
            "file.delete",
            format!("{}: {}", path, err),
        )),
    }
}

/// Register the file built-ins.
pub fn register_file_package(registry: &mut Registry) -> Result<(), Error> {
    const PATH: &[TypeMask] = &[TypeMask::STRING];

    registry.register(Builtin {
        name: "file.read",
        params: PATH,
        func: file_read,
    })?;
    registry.register(Builtin {
        name: "file.write",
        params: &[TypeMask::STRING, TypeMask::SCALAR],
        func: file_write,
    })?;
    registry.register(Builtin {
        name: "file.exists",
        params: PATH,
        func: file_exists,
    })?;
    registry.register(Builtin {
        name: "file.delete",
        params: PATH,
        func: file_delete,
    })?;
    Ok(())
}
