//! Code generation errors.
//!
//! Two families, never conflated:
//! - [`SyntaxError`]: the parser committed to a production and a required
//!   token or sub-production is missing.
//! - [`StructureError`]: the generator's own bookkeeping (brackets, labels,
//!   lambda and loop contexts) is inconsistent at the end of compilation.
//!   This signals a generator defect, not a user mistake.

use thiserror::Error;

use crate::api::{Diagnostic, Severity};
use crate::scanner::{Position, Span, Token};

#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub position: Position,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("expected {expected}, found end of input")]
    UnexpectedEnd { expected: String },

    #[error("integer literal {text} does not fit in 64 bits")]
    IntegerOverflow { text: String },

    #[error("invalid float literal {text}")]
    InvalidFloat { text: String },

    #[error("'break' outside of a loop")]
    BreakOutsideLoop,

    #[error("'continue' outside of a loop")]
    ContinueOutsideLoop,

    #[error("'return' outside of a lambda")]
    ReturnOutsideLambda,

    #[error("operator '{op}' cannot be negated")]
    NotNegatable { op: String },

    #[error("operator '{op}' cannot be combined with an assignment")]
    NotCompoundable { op: String },

    #[error("a negated operator cannot be combined with an assignment")]
    NegatedCompound,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, position: Position, span: Span) -> Self {
        Self {
            kind,
            position,
            span,
        }
    }

    pub fn at(kind: SyntaxErrorKind, token: &Token) -> Self {
        Self::new(kind, token.position, token.span.clone())
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match &self.kind {
            SyntaxErrorKind::UnexpectedToken { .. } => ("P001", vec![]),
            SyntaxErrorKind::UnexpectedEnd { .. } => {
                ("P002", vec!["the program ends in the middle of an expression".to_string()])
            }
            SyntaxErrorKind::IntegerOverflow { .. } => (
                "P003",
                vec!["integers range from -9223372036854775808 to 9223372036854775807".to_string()],
            ),
            SyntaxErrorKind::InvalidFloat { .. } => ("P004", vec![]),
            SyntaxErrorKind::BreakOutsideLoop | SyntaxErrorKind::ContinueOutsideLoop => (
                "P005",
                vec!["loops are written as `as (condition) body`".to_string()],
            ),
            SyntaxErrorKind::ReturnOutsideLambda => ("P006", vec![]),
            SyntaxErrorKind::NotNegatable { .. } => (
                "P007",
                vec!["'!' applies to < > == & | in has holds".to_string()],
            ),
            SyntaxErrorKind::NotCompoundable { .. } | SyntaxErrorKind::NegatedCompound => {
                ("P008", vec![])
            }
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

/// Inconsistent generator state found when compilation finishes.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct StructureError {
    pub kind: StructureErrorKind,
    /// Where code generation stopped.
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureErrorKind {
    #[error("unbalanced bracket scope on the expression stack")]
    UnbalancedBracket,

    #[error("{what} context still open at end of program")]
    UnclosedContext { what: &'static str },

    #[error("label L{label} was never placed")]
    UnplacedLabel { label: u32 },
}

impl StructureError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            message: format!("internal compiler error: {}", self.kind),
            position: self.position,
            span: Span::default(),
            help: vec!["this is a bug in the code generator".to_string()],
            code: Some("C001".to_string()),
        }
    }
}

/// Any failure of [`compile`](crate::compiler::compile).
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Structure(#[from] StructureError),
}

impl CompileError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::Syntax(err) => err.to_diagnostic(),
            CompileError::Structure(err) => err.to_diagnostic(),
        }
    }
}
