//! Public error types for the Quill API.
//!
//! Each stage keeps its own error type (scanner, code generator, machine);
//! this module unifies them for callers without conflating them, and turns
//! any of them into a [`Diagnostic`] at the API boundary.

use core::fmt;

use crate::compiler::{CompileError, StructureError, SyntaxError};
use crate::scanner::{LexicalError, Position, Span};
use crate::vm::ExecutionError;

/// Public error type for all Quill operations.
#[derive(Debug)]
pub enum Error {
    /// The scanner rejected the source text.
    Lexical(LexicalError),

    /// The parser committed to a rule and a required part is missing.
    Syntax(SyntaxError),

    /// The code generator's own bookkeeping failed. Indicates a bug.
    Structure(StructureError),

    /// The program failed while running, or exceeded a resource limit.
    Interpretation(ExecutionError),

    /// Invalid API usage (e.g. registering a built-in twice).
    Api(String),
}

impl Error {
    /// Source position of the failure, if it has one.
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::Lexical(err) => Some(err.position),
            Error::Syntax(err) => Some(err.position),
            Error::Structure(err) => Some(err.position),
            Error::Interpretation(err) => Some(err.position),
            Error::Api(_) => None,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Error::Lexical(err) => err.to_diagnostic(),
            Error::Syntax(err) => err.to_diagnostic(),
            Error::Structure(err) => err.to_diagnostic(),
            Error::Interpretation(err) => err.to_diagnostic(),
            Error::Api(message) => Diagnostic {
                severity: Severity::Error,
                message: message.clone(),
                position: Position::START,
                span: Span::default(),
                help: Vec::new(),
                code: Some("A001".to_string()),
            },
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Lexical(err) => write!(f, "{}: {}", err.position, err),
            Error::Syntax(err) => write!(f, "{}: {}", err.position, err),
            Error::Structure(err) => write!(f, "{}: {}", err.position, err),
            Error::Interpretation(err) => write!(f, "{}: {}", err.position, err),
            Error::Api(msg) => write!(f, "API error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Lexical(err) => Some(err),
            Error::Syntax(err) => Some(err),
            Error::Structure(err) => Some(err),
            Error::Interpretation(err) => Some(err),
            Error::Api(_) => None,
        }
    }
}

/// A diagnostic message with its source location.
///
/// Maps cleanly to editor diagnostics and to `ariadne` reports.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Line and column of the primary issue.
    pub position: Position,

    /// Source bytes of the primary issue. Empty when the failing code came
    /// from a synthetic token.
    pub span: Span,

    /// Suggestions on how to fix the issue.
    pub help: Vec<String>,

    /// Optional error code (e.g., "P001") for documentation lookup.
    pub code: Option<String>,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - the program cannot be compiled or run.
    Error,
    /// Warning - suspicious code that might be wrong.
    Warning,
    /// Info - informational message.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

// ============================================================================
// Conversion from internal errors
// ============================================================================

impl From<LexicalError> for Error {
    fn from(err: LexicalError) -> Self {
        Error::Lexical(err)
    }
}

impl From<SyntaxError> for Error {
    fn from(err: SyntaxError) -> Self {
        Error::Syntax(err)
    }
}

impl From<StructureError> for Error {
    fn from(err: StructureError) -> Self {
        Error::Structure(err)
    }
}

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        match err {
            CompileError::Syntax(err) => Error::Syntax(err),
            CompileError::Structure(err) => Error::Structure(err),
        }
    }
}

impl From<ExecutionError> for Error {
    fn from(err: ExecutionError) -> Self {
        Error::Interpretation(err)
    }
}
