//! Runtime execution errors.
//!
//! # Error Categories
//!
//! - **Runtime errors**: type, arity and lookup violations raised by an
//!   instruction or a built-in. These are the interpretation errors of the
//!   language.
//!
//! - **Resource exceeded errors**: limits configured through
//!   [`ExecutionOptions`](crate::api::ExecutionOptions) (operand stack size,
//!   step count). They are reported separately so hosts can tell a runaway
//!   program from a faulty one.

use thiserror::Error;

use crate::api::{Diagnostic, Severity};
use crate::casting::CastError;
use crate::scanner::{Location, Position, Span};
use crate::values::{TypeMask, ValueType};

/// Failure of a single instruction, tagged with its source position.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct ExecutionError {
    pub kind: ExecutionErrorKind,
    /// Position of the token that produced the failing instruction.
    pub position: Position,
    pub span: Span,
}

impl ExecutionError {
    pub fn new(kind: impl Into<ExecutionErrorKind>, location: &Location) -> Self {
        Self {
            kind: kind.into(),
            position: location.position,
            span: location.span.clone(),
        }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match &self.kind {
            ExecutionErrorKind::Runtime(RuntimeError::UndefinedVariable { .. }) => (
                "R002",
                vec!["declare it with `loc` or assign it before reading".to_string()],
            ),
            ExecutionErrorKind::Runtime(RuntimeError::NoneOperand { .. }) => (
                "R003",
                vec!["loops that never run and `if` without `or` leave None".to_string()],
            ),
            ExecutionErrorKind::Runtime(_) => ("R001", vec![]),
            ExecutionErrorKind::ResourceExceeded(_) => (
                "X001",
                vec!["raise the limit in ExecutionOptions if the program is expected to run this long".to_string()],
            ),
        };
        Diagnostic {
            severity: Severity::Error,
            message: self.kind.to_string(),
            position: self.position,
            span: self.span.clone(),
            help,
            code: Some(code.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExecutionErrorKind {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    ResourceExceeded(#[from] ResourceExceededError),
}

/// Interpretation errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("operator '{op}' cannot take a None operand")]
    NoneOperand { op: &'static str },

    #[error("operator '{op}' is not defined for {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: ValueType,
        right: ValueType,
    },

    #[error("operator '{op}' is not defined for {found}")]
    UnaryTypeMismatch { op: &'static str, found: ValueType },

    #[error("operator '{op}' requires a variable, found {found}")]
    NotAVariable { op: &'static str, found: ValueType },

    #[error("variable '{name}' is not defined")]
    UndefinedVariable { name: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("index {index} out of bounds (length: {len})")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("operator '{op}' requires a non-negative count, found {count}")]
    NegativeCount { op: &'static str, count: i64 },

    #[error("code point {code:#x} is not a valid character")]
    InvalidCodePoint { code: u32 },

    #[error(transparent)]
    Cast(#[from] CastError),

    #[error("{found} has no name")]
    NoName { found: ValueType },

    #[error("{found} value cannot be displayed")]
    NotDisplayable { found: ValueType },

    #[error("jump target must be a label, found {found}")]
    NotALabel { found: ValueType },

    #[error("label L{label} has no position")]
    UnresolvedLabel { label: u32 },

    #[error("{found} is not callable")]
    NotCallable { found: ValueType },

    #[error("unknown built-in '{name}'")]
    UnknownBuiltin { name: String },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("'{name}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("argument {position} of '{name}' must be {expected}, found {found}")]
    ArgumentType {
        name: String,
        position: usize,
        expected: TypeMask,
        found: ValueType,
    },

    #[error("operand stack underflow")]
    StackUnderflow,

    #[error("{name}: {message}")]
    Builtin { name: &'static str, message: String },
}

/// Resource limits that terminate a run.
#[derive(Debug, Error)]
pub enum ResourceExceededError {
    #[error("operand stack overflow: depth {depth} exceeds maximum of {max_depth}")]
    StackOverflow { depth: usize, max_depth: usize },

    #[error("step limit of {max_steps} exceeded")]
    StepLimit { max_steps: usize },
}

impl RuntimeError {
    pub(crate) fn builtin(name: &'static str, message: impl ToString) -> Self {
        RuntimeError::Builtin {
            name,
            message: message.to_string(),
        }
    }
}
