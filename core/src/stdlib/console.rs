//! Console Package
//!
//! Functions: print, console.write, console.writeln, console.read
//!
//! Built-ins never touch stdin/stdout directly. They go through the
//! [`Console`] handed to the run, so hosts and tests can capture output.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::{
    api::Error,
    stdlib::{Builtin, BuiltinContext, Registry, text_arg},
    values::{TypeMask, Value},
    vm::RuntimeError,
};

/// Line-oriented program I/O.
pub trait Console {
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Read one line without its terminator. `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// The process's stdin and stdout.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

/// In-memory console: collects output, serves queued input lines.
#[derive(Debug, Default)]
pub struct BufferConsole {
    output: String,
    input: VecDeque<String>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            output: String::new(),
            input: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn take_output(&mut self) -> String {
        core::mem::take(&mut self.output)
    }
}

impl Console for BufferConsole {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.input.pop_front())
    }
}

fn write_text(
    name: &'static str,
    ctx: &mut BuiltinContext<'_>,
    args: &[Value],
    newline: bool,
) -> Result<Value, RuntimeError> {
    let mut text = text_arg(name, args, 0)?;
    if newline {
        text.push('\n');
    }
    ctx.console
        .write(&text)
        .map_err(|err| RuntimeError::builtin(name, err))?;
    Ok(args[0].clone())
}

/// Write a value followed by a newline; returns the value.
fn print(ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    write_text("print", ctx, args, true)
}

fn console_write(ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    write_text("console.write", ctx, args, false)
}

fn console_writeln(ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    write_text("console.writeln", ctx, args, true)
}

/// Read a line; the empty string at end of input.
fn console_read(ctx: &mut BuiltinContext<'_>, _args: &[Value]) -> Result<Value, RuntimeError> {
    let line = ctx
        .console
        .read_line()
        .map_err(|err| RuntimeError::builtin("console.read", err))?;
    Ok(Value::string(line.unwrap_or_default()))
}

/// Register the console built-ins.
pub fn register_console_package(registry: &mut Registry) -> Result<(), Error> {
    const SCALAR: &[TypeMask] = &[TypeMask::SCALAR];

    registry.register(Builtin {
        name: "print",
        params: SCALAR,
        func: print,
    })?;
    registry.register(Builtin {
        name: "console.write",
        params: SCALAR,
        func: console_write,
    })?;
    registry.register(Builtin {
        name: "console.writeln",
        params: SCALAR,
        func: console_writeln,
    })?;
    registry.register(Builtin {
        name: "console.read",
        params: &[],
        func: console_read,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Store;

    #[test]
    fn test_print_and_write() {
        let mut store = Store::new();
        let mut console = BufferConsole::new();
        let mut ctx = BuiltinContext {
            store: &mut store,
            console: &mut console,
        };
        let echoed = print(&mut ctx, &[Value::Integer(7)]).unwrap();
        assert_eq!(echoed.as_int(), Some(7));
        console_write(&mut ctx, &[Value::string("a")]).unwrap();
        console_write(&mut ctx, &[Value::Float(0.5)]).unwrap();
        assert_eq!(console.output(), "7\na0.5");
    }

    #[test]
    fn test_read_until_end_of_input() {
        let mut store = Store::new();
        let mut console = BufferConsole::with_input(["first"]);
        let mut ctx = BuiltinContext {
            store: &mut store,
            console: &mut console,
        };
        assert_eq!(console_read(&mut ctx, &[]).unwrap().as_str(), Some("first"));
        assert_eq!(console_read(&mut ctx, &[]).unwrap().as_str(), Some(""));
    }
}
