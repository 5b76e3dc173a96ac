//! Quill Standard Library
//!
//! This module holds the built-in registry contract and the standard
//! packages:
//! - Console: printing and reading lines
//! - File: whole-file read/write, existence checks, deletion
//! - Process: command execution and sleeping
//! - Math: numeric functions and constants
//! - String: character/code point conversion
//! - Var: dynamic slot allocation over the flat store
//!
//! A built-in is a native Rust function with a fixed parameter list. Each
//! parameter declares a [`TypeMask`]; the interpreter checks every argument
//! against it before the call, so the functions here can rely on the types
//! they declared.
//!
//! Built-ins are addressed by dotted names (`file.read`). Every program run
//! starts with one store slot per registered name, holding the matching
//! BuiltIn value.

use core::fmt;

use hashbrown::HashMap;

use crate::api::Error;
use crate::values::{Store, Symbol, TypeMask, Value};
use crate::vm::RuntimeError;

pub mod console;
pub mod file;
pub mod math;
pub mod process;
pub mod string;
pub mod var;

pub use console::{BufferConsole, Console, StdConsole, register_console_package};
pub use file::register_file_package;
pub use math::register_math_package;
pub use process::register_process_package;
pub use string::register_string_package;
pub use var::register_var_package;

/// Signature of a native built-in.
///
/// `args` has exactly as many elements as the built-in declares parameters,
/// each already checked against its mask.
pub type BuiltinFn = fn(&mut BuiltinContext<'_>, &[Value]) -> Result<Value, RuntimeError>;

/// What a built-in may touch while it runs.
pub struct BuiltinContext<'a> {
    pub store: &'a mut Store,
    pub console: &'a mut dyn Console,
}

/// A registered native operation.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub params: &'static [TypeMask],
    pub func: BuiltinFn,
}

impl Builtin {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, mask) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", mask)?;
        }
        f.write_str(")")
    }
}

/// The set of built-ins visible to programs.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<&'static str, Builtin>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a built-in. Registering the same name twice is an error.
    pub fn register(&mut self, builtin: Builtin) -> Result<(), Error> {
        if self.entries.contains_key(builtin.name) {
            return Err(Error::Api(format!(
                "built-in '{}' is already registered",
                builtin.name
            )));
        }
        self.entries.insert(builtin.name, builtin);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Builtin> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Bind every registered name in `store` to its BuiltIn value.
    pub fn seed(&self, store: &mut Store) {
        for name in self.names() {
            let symbol: Symbol = store.intern(name);
            let slot = store.dotted_name(name);
            store.set(slot, Value::BuiltIn(symbol));
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_unstable_by_key(|builtin| builtin.name);
        f.debug_list().entries(entries).finish()
    }
}

/// Register all standard library packages.
///
/// Use this in your Engine initialization to get the full standard library.
///
/// # Example
///
/// ```ignore
/// let engine = Engine::new(options, |registry| register_stdlib(registry))?;
/// ```
///
/// If you want more control over which packages to include, you can register
/// them individually using `register_math_package()`, etc.
pub fn register_stdlib(registry: &mut Registry) -> Result<(), Error> {
    register_console_package(registry)?;
    register_file_package(registry)?;
    register_process_package(registry)?;
    register_math_package(registry)?;
    register_string_package(registry)?;
    register_var_package(registry)?;
    Ok(())
}

// ============================================================================
// Argument helpers
// ============================================================================

// The interpreter has already checked every argument against its mask, so a
// mismatch here means a built-in declared one mask and reads another.

pub(crate) fn int_arg(name: &'static str, args: &[Value], i: usize) -> Result<i64, RuntimeError> {
    args.get(i)
        .and_then(Value::as_int)
        .ok_or_else(|| RuntimeError::builtin(name, format!("argument {} must be an Integer", i + 1)))
}

pub(crate) fn number_arg(
    name: &'static str,
    args: &[Value],
    i: usize,
) -> Result<f64, RuntimeError> {
    args.get(i)
        .and_then(Value::as_number)
        .ok_or_else(|| RuntimeError::builtin(name, format!("argument {} must be a number", i + 1)))
}

pub(crate) fn str_arg<'v>(
    name: &'static str,
    args: &'v [Value],
    i: usize,
) -> Result<&'v str, RuntimeError> {
    args.get(i)
        .and_then(Value::as_str)
        .ok_or_else(|| RuntimeError::builtin(name, format!("argument {} must be a String", i + 1)))
}

pub(crate) fn text_arg(
    name: &'static str,
    args: &[Value],
    i: usize,
) -> Result<ecow::EcoString, RuntimeError> {
    args.get(i)
        .and_then(Value::scalar_text)
        .ok_or_else(|| {
            RuntimeError::builtin(name, format!("argument {} must be displayable", i + 1))
        })
}
