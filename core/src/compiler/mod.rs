//! Single-pass code generation.
//!
//! Tokens go in, a [`Code`] comes out. The parser recognizes the grammar
//! and drives a creator that emits RPN instructions directly; no syntax
//! tree is built.
//!
//! ## Design
//!
//! - Operator precedence is resolved with an explicit expression stack of
//!   pending operators, scoped by bracket sentinels
//! - Control flow uses labels, resolved to positions when the program is
//!   finished
//! - Lambda bodies are emitted inline behind a jump and entered by `Eval`
//! - The operand stack depth is tracked at every point so `break`,
//!   `continue` and `return` unwind exactly

mod creator;
mod error;
mod operators;
mod parser;
mod trace;

#[cfg(test)]
mod compiler_test;

pub use error::{CompileError, StructureError, StructureErrorKind, SyntaxError, SyntaxErrorKind};
pub use trace::{NoTrace, ParseTracer, TreeTracer};

use tracing::debug;

use crate::{scanner::Token, vm::Code};

/// Compile a token stream into a program.
pub fn compile(tokens: &[Token]) -> Result<Code, CompileError> {
    compile_traced(tokens, &mut NoTrace)
}

/// Like [`compile`], reporting every grammar rule attempt to `tracer`.
pub fn compile_traced(tokens: &[Token], tracer: &mut dyn ParseTracer) -> Result<Code, CompileError> {
    let code = parser::Parser::new(tokens, tracer).parse()?;
    debug!(
        instructions = code.len(),
        labels = code.labels.len(),
        lambdas = code.lambdas.len(),
        max_stack_size = code.max_stack_size,
        "compiled"
    );
    Ok(code)
}
