use core::fmt;
use core::ops::Range;

use ecow::EcoString;

/// Byte range into the source text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span(pub Range<usize>);

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self(start..end)
    }

    pub fn combine(a: &Span, b: &Span) -> Span {
        Span::new(a.0.start, b.0.end)
    }

    pub fn str_of<'a>(&self, source: &'a str) -> &'a str {
        &source[self.0.start..self.0.end]
    }
}

/// 1-based line and column of a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Where an instruction or error came from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    pub position: Position,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    String,
    Integer,
    Float,
    /// Punctuation, operators and keywords.
    Separator,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub text: EcoString,
    pub kind: TokenKind,
    pub position: Position,
    /// Source bytes the token was read from. Empty for the synthetic tokens
    /// produced by string interpolation.
    pub span: Span,
    /// Set only for `.name` field tokens.
    pub field: bool,
}

impl Token {
    /// True if this is the separator (operator, punctuation or keyword) `text`.
    pub fn is(&self, text: &str) -> bool {
        self.kind == TokenKind::Separator && self.text == text
    }

    pub fn is_field(&self) -> bool {
        self.field
    }

    pub fn location(&self) -> Location {
        Location {
            position: self.position,
            span: self.span.clone(),
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})@{}", self.kind, self.text.as_str(), self.position)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "{:?}", self.text.as_str()),
            _ => write!(f, "'{}'", self.text),
        }
    }
}

pub const KEYWORDS: &[&str] = &[
    "if", "or", "as", "loc", "ref", "in", "has", "holds", "break", "continue", "return",
];

pub(crate) fn is_single_separator(c: char) -> bool {
    matches!(
        c,
        '(' | ')' | '[' | ']' | '{' | '}' | ',' | ';' | '+' | '*' | '/' | '%' | '!' | '&' | '|'
            | ':' | '?' | '$'
    )
}

/// Characters that may start a two-character operator.
pub(crate) fn starts_two_char(c: char) -> bool {
    matches!(c, '=' | '-' | '<' | '>')
}

pub(crate) fn two_char_operator(first: char, second: char) -> Option<&'static str> {
    match (first, second) {
        ('=', '=') => Some("=="),
        ('=', '>') => Some("=>"),
        ('-', '>') => Some("->"),
        ('<', '<') => Some("<<"),
        ('>', '>') => Some(">>"),
        _ => None,
    }
}
