//! Process Package
//!
//! Functions: process.exec, process.sleep
//!
//! Both block the interpreter thread until they finish.

use std::process::Command;
use std::thread;
use std::time::Duration;

use crate::{
    api::Error,
    stdlib::{Builtin, BuiltinContext, Registry, int_arg, str_arg},
    values::{TypeMask, Value},
    vm::RuntimeError,
};

/// Run a command and return its standard output.
///
/// The command line is split on whitespace: the first word is the program,
/// the rest are its arguments. No shell is involved.
fn process_exec(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    let command_line = str_arg("process.exec", args, 0)?;
    let mut words = command_line.split_whitespace();
    let program = words
        .next()
        .ok_or_else(|| RuntimeError::builtin("process.exec", "empty command"))?;

    tracing::debug!(program, "process.exec");
    let output = Command::new(program)
        .args(words)
        .output()
        .map_err(|err| RuntimeError::builtin("process.exec", format!("{}: {}", program, err)))?;

    Ok(Value::string(
        String::from_utf8_lossy(&output.stdout).as_ref(),
    ))
}

/// Sleep for the given number of milliseconds; returns the argument.
fn process_sleep(_ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    let millis = int_arg("process.sleep", args, 0)?;
    let millis = u64::try_from(millis).map_err(|_| {
        RuntimeError::builtin("process.sleep", format!("negative duration {}", millis))
    })?;
    thread::sleep(Duration::from_millis(millis));
    Ok(Value::Integer(millis as i64))
}

/// Register the process built-ins.
pub fn register_process_package(registry: &mut Registry) -> Result<(), Error> {
    registry.register(Builtin {
        name: "process.exec",
        params: &[TypeMask::STRING],
        func: process_exec,
    })?;
    registry.register(Builtin {
        name: "process.sleep",
        params: &[TypeMask::INTEGER],
        func: process_sleep,
    })?;
    Ok(())
}
