use thiserror::Error;

use crate::api::{Diagnostic, Severity};
use crate::scanner::{Position, Span};

/// The scanner met a character its current state cannot consume.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct LexicalError {
    pub kind: LexicalErrorKind,
    pub position: Position,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexicalErrorKind {
    #[error("unexpected character {found:?}")]
    UnexpectedCharacter { found: char },

    #[error("unexpected {found:?} in number literal")]
    MalformedNumber { found: char },

    #[error("expected two hex digits after \\x, found {found:?}")]
    InvalidHexEscape { found: char },

    #[error("expected a field name after '.'")]
    MissingFieldName,

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unterminated raw string literal")]
    UnterminatedRawString,

    #[error("unterminated string interpolation")]
    UnterminatedInterpolation,
}

impl LexicalError {
    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match &self.kind {
            LexicalErrorKind::UnexpectedCharacter { .. } => ("L001", None),
            LexicalErrorKind::MalformedNumber { .. } => (
                "L002",
                Some("numbers are digits with an optional '.' and '_' separators"),
            ),
            LexicalErrorKind::InvalidHexEscape { .. } => ("L003", Some("write escapes as \\x41")),
            LexicalErrorKind::MissingFieldName => ("L004", None),
            LexicalErrorKind::UnterminatedString
            | LexicalErrorKind::UnterminatedRawString
            | LexicalErrorKind::UnterminatedInterpolation => {
                ("L005", Some("add the missing closing delimiter"))
            }
        };
        Diagnostic {
            severity: Severity::Error,
            message: self.kind.to_string(),
            position: self.position,
            span: self.span.clone(),
            help: help.map(String::from).into_iter().collect(),
            code: Some(code.to_string()),
        }
    }
}
