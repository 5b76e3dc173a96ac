//! Public API for the Quill language.
//!
//! An [`Engine`] owns the built-in registry and compiles source text into
//! [`Program`]s. A program runs any number of times, each run against a
//! fresh store, and yields an [`Outcome`].
//!
//! # Example
//!
//! ```
//! use quill_core::api::{Engine, EngineOptions};
//! use quill_core::stdlib::BufferConsole;
//!
//! let engine = Engine::with_stdlib(EngineOptions::default()).unwrap();
//! let program = engine.compile(r#"print("hi"); 6 * 7"#).unwrap();
//!
//! let mut console = BufferConsole::new();
//! let outcome = program.execute(&mut console).unwrap();
//! assert_eq!(outcome.render().unwrap(), "42");
//! assert_eq!(console.output(), "hi\n");
//! ```

pub mod engine;
pub mod error;
pub mod options;

pub use engine::{Engine, Outcome, Program};
pub use error::{Diagnostic, Error, Severity};
pub use options::{EngineOptions, ExecutionOptions, ExecutionOptionsOverride};
