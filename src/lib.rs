//! Quill - a small imperative scripting language
//!
//! # Overview
//!
//! Quill programs are compiled in a single pass into reverse-Polish
//! instructions and run on a stack machine. Variables live in a
//! hierarchical store: `a[1]` and `a.name` are child variables of `a`, and
//! every value is one of `Int`, `Float`, `String` or a reference to another
//! variable.
//!
//! # Quick Start
//!
//! ```
//! use quill::{BufferConsole, Engine, EngineOptions};
//!
//! let engine = Engine::with_stdlib(EngineOptions::default()).unwrap();
//! let program = engine
//!     .compile("loc fact = (n) => if (n < 2) 1 or $n * fact(n - 1); fact(5)")
//!     .unwrap();
//!
//! let outcome = program.execute(&mut BufferConsole::new()).unwrap();
//! assert_eq!(outcome.render().unwrap(), "120");
//! ```
//!
//! # Built-ins
//!
//! An engine is created with a registration callback; the standard library
//! is split into packages that can be registered one by one:
//!
//! ```
//! use quill::{Engine, EngineOptions};
//! use quill::stdlib::{register_math_package, register_string_package};
//!
//! let engine = Engine::new(EngineOptions::default(), |registry| {
//!     register_math_package(registry)?;
//!     register_string_package(registry)
//! })
//! .unwrap();
//! assert!(engine.registry().contains("math.sqrt"));
//! ```
//!
//! # Errors
//!
//! Every failure is an [`Error`] carrying a source position. Use
//! [`render_error_to_string_no_color`] or [`render_error`] to show it with
//! the offending source line.

mod error_renderer;

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};

// Re-export public API from quill_core
pub use quill_core::api::{
    Diagnostic, Engine, EngineOptions, Error, ExecutionOptions, ExecutionOptionsOverride, Outcome,
    Program, Severity,
};

pub use quill_core::compiler::{NoTrace, ParseTracer, TreeTracer};
pub use quill_core::scanner::{Location, Position, Span};
pub use quill_core::stdlib::{self, BufferConsole, Console, Registry, StdConsole};
pub use quill_core::values::{self, Store, Value, ValueType};
pub use quill_core::vm::{Code, Instruction};
