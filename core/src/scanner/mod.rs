//! Lexical scanner.
//!
//! An explicit state machine driven one character at a time, with no
//! lookahead. A character that ends the current token is handed back to the
//! machine (`step` returns `false`) so it can start the next one; a trailing
//! space is appended to the input to flush the last token.
//!
//! String interpolation is resolved here: `"a{e}b"` scans as the tokens of
//! `"a" + ( e ) + "b"`, so the parser never sees an interpolated string.

mod error;
mod token;

pub use error::{LexicalError, LexicalErrorKind};
pub use token::{KEYWORDS, Location, Position, Span, Token, TokenKind};

use ecow::EcoString;

use token::{is_single_separator, starts_two_char, two_char_operator};

const DEFAULT_DELIMITERS: (char, char) = ('{', '}');

/// Split `source` into tokens.
pub fn scan(source: &str) -> Result<Vec<Token>, LexicalError> {
    let mut scanner = Scanner::new();
    for c in source.chars().chain(core::iter::once(' ')) {
        while !scanner.step(c)? {}
        scanner.advance(c);
    }
    let tokens = scanner.finish()?;
    tracing::trace!(count = tokens.len(), "scanned source");
    Ok(tokens)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    None,
    Integer,
    Float,
    String,
    Escape,
    Hex { digits: u8, value: u32 },
    RawString,
    RawEscape,
    /// Just after a closing backtick: a raw string of two characters followed
    /// by `"` is a delimiter preamble, not a token.
    RawClosed,
    Identifier,
    Comment,
    TwoChar(char),
    Field,
}

/// An open interpolation inside a quoted string.
struct Frame {
    open: char,
    close: char,
    /// Unclosed `{` groups inside the interpolated expression.
    depth: u32,
}

struct Scanner {
    tokens: Vec<Token>,
    state: State,
    buffer: String,
    start: Position,
    start_offset: usize,
    position: Position,
    offset: usize,
    /// Interpolation delimiters of the quoted string being read.
    delimiters: (char, char),
    frames: Vec<Frame>,
    raw_column: u32,
    raw_indent: bool,
}

impl Scanner {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            state: State::None,
            buffer: String::new(),
            start: Position::START,
            start_offset: 0,
            position: Position::START,
            offset: 0,
            delimiters: DEFAULT_DELIMITERS,
            frames: Vec::new(),
            raw_column: 0,
            raw_indent: false,
        }
    }

    fn advance(&mut self, c: char) {
        self.offset += c.len_utf8();
        if c == '\n' {
            self.position.line += 1;
            self.position.column = 1;
        } else {
            self.position.column += 1;
        }
    }

    /// Error at the character `c` being fed.
    fn error(&self, kind: LexicalErrorKind, c: char) -> LexicalError {
        LexicalError {
            kind,
            position: self.position,
            span: Span::new(self.offset, self.offset + c.len_utf8()),
        }
    }

    fn begin(&mut self, state: State) {
        self.state = state;
        self.buffer.clear();
        self.start = self.position;
        self.start_offset = self.offset;
    }

    /// Emit the buffered token. `end` is the byte offset just past it.
    fn emit(&mut self, kind: TokenKind, end: usize) {
        let text = EcoString::from(self.buffer.as_str());
        self.emit_text(kind, text, end);
    }

    fn emit_text(&mut self, kind: TokenKind, text: EcoString, end: usize) {
        self.tokens.push(Token {
            text,
            kind,
            position: self.start,
            span: Span::new(self.start_offset, end),
            field: self.state == State::Field,
        });
        self.buffer.clear();
    }

    fn emit_synthetic(&mut self, text: &str) {
        self.tokens.push(Token {
            text: text.into(),
            kind: TokenKind::Separator,
            position: self.position,
            span: Span::new(self.offset, self.offset),
            field: false,
        });
    }

    /// Feed one character. Returns `false` when the character was not
    /// consumed and must be fed again in the new state.
    fn step(&mut self, c: char) -> Result<bool, LexicalError> {
        let next = self.offset + c.len_utf8();
        match self.state {
            State::None => self.dispatch(c),
            State::Integer | State::Float => self.number(c),
            State::Identifier => {
                if is_ident_continue(c) {
                    self.buffer.push(c);
                    return Ok(true);
                }
                let kind = if KEYWORDS.contains(&self.buffer.as_str()) {
                    TokenKind::Separator
                } else {
                    TokenKind::Identifier
                };
                self.emit(kind, self.offset);
                self.state = State::None;
                Ok(false)
            }
            State::Field => {
                if is_ident_continue(c) {
                    self.buffer.push(c);
                    return Ok(true);
                }
                if self.buffer.is_empty() {
                    return Err(self.error(LexicalErrorKind::MissingFieldName, c));
                }
                self.emit(TokenKind::String, self.offset);
                self.state = State::None;
                Ok(false)
            }
            State::Comment => {
                if c == '\n' {
                    self.state = State::None;
                }
                Ok(true)
            }
            State::TwoChar(first) => {
                self.state = State::None;
                if let Some(op) = two_char_operator(first, c) {
                    self.emit_text(TokenKind::Separator, op.into(), next);
                    return Ok(true);
                }
                let end = self.offset;
                self.emit_text(TokenKind::Separator, char_text(first), end);
                Ok(false)
            }
            State::String => self.string(c, next),
            State::Escape => {
                match c {
                    'n' => self.buffer.push('\n'),
                    't' => self.buffer.push('\t'),
                    'x' => {
                        self.state = State::Hex {
                            digits: 0,
                            value: 0,
                        };
                        return Ok(true);
                    }
                    other => self.buffer.push(other),
                }
                self.state = State::String;
                Ok(true)
            }
            State::Hex { digits, value } => {
                let digit = c.to_digit(16).ok_or_else(|| {
                    self.error(LexicalErrorKind::InvalidHexEscape { found: c }, c)
                })?;
                let value = value * 16 + digit;
                if digits == 1 {
                    self.buffer.push(char::from(value as u8));
                    self.state = State::String;
                } else {
                    self.state = State::Hex {
                        digits: digits + 1,
                        value,
                    };
                }
                Ok(true)
            }
            State::RawString => self.raw_string(c),
            State::RawEscape => {
                self.state = State::RawString;
                if c == '`' {
                    self.buffer.push('`');
                    return Ok(true);
                }
                self.buffer.push('\\');
                Ok(false)
            }
            State::RawClosed => {
                let mut chars = self.buffer.chars();
                if let (true, Some(open), Some(close), None) =
                    (c == '"', chars.next(), chars.next(), chars.next())
                {
                    self.delimiters = (open, close);
                    self.begin(State::String);
                    return Ok(true);
                }
                self.emit(TokenKind::String, self.offset);
                self.state = State::None;
                Ok(false)
            }
        }
    }

    fn dispatch(&mut self, c: char) -> Result<bool, LexicalError> {
        if let Some(frame) = self.frames.last_mut() {
            if c == frame.close && frame.depth == 0 {
                let delimiters = (frame.open, frame.close);
                self.frames.pop();
                self.emit_synthetic(")");
                self.emit_synthetic("+");
                self.delimiters = delimiters;
                self.begin(State::String);
                return Ok(true);
            }
            match c {
                '{' => frame.depth += 1,
                '}' if frame.depth > 0 => frame.depth -= 1,
                _ => {}
            }
        }

        match c {
            ' ' | '\t' | '\r' | '\n' => {}
            '0'..='9' => {
                self.begin(State::Integer);
                self.buffer.push(c);
            }
            c if c == '_' || c.is_alphabetic() => {
                self.begin(State::Identifier);
                self.buffer.push(c);
            }
            '"' => {
                self.delimiters = DEFAULT_DELIMITERS;
                self.begin(State::String);
            }
            '`' => {
                self.begin(State::RawString);
                self.raw_column = self.position.column;
                self.raw_indent = false;
            }
            '.' => self.begin(State::Field),
            '#' => self.begin(State::Comment),
            c if starts_two_char(c) => self.begin(State::TwoChar(c)),
            c if is_single_separator(c) => {
                self.begin(State::None);
                self.emit_text(TokenKind::Separator, char_text(c), self.offset + 1);
            }
            found => {
                return Err(self.error(LexicalErrorKind::UnexpectedCharacter { found }, found));
            }
        }
        Ok(true)
    }

    fn number(&mut self, c: char) -> Result<bool, LexicalError> {
        match c {
            '0'..='9' => self.buffer.push(c),
            '_' => {}
            '.' if self.state == State::Integer => {
                self.buffer.push('.');
                self.state = State::Float;
            }
            '.' => return Err(self.error(LexicalErrorKind::MalformedNumber { found: c }, c)),
            c if c.is_alphanumeric() => {
                return Err(self.error(LexicalErrorKind::MalformedNumber { found: c }, c));
            }
            _ => {
                let kind = if self.state == State::Float {
                    TokenKind::Float
                } else {
                    TokenKind::Integer
                };
                self.emit(kind, self.offset);
                self.state = State::None;
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn string(&mut self, c: char, next: usize) -> Result<bool, LexicalError> {
        let (open, close) = self.delimiters;
        if c == '"' {
            self.emit(TokenKind::String, next);
            self.state = State::None;
        } else if c == '\\' {
            self.state = State::Escape;
        } else if c == open {
            self.emit(TokenKind::String, self.offset);
            self.emit_synthetic("+");
            self.emit_synthetic("(");
            self.frames.push(Frame {
                open,
                close,
                depth: 0,
            });
            self.state = State::None;
        } else {
            self.buffer.push(c);
        }
        Ok(true)
    }

    fn raw_string(&mut self, c: char) -> Result<bool, LexicalError> {
        if self.raw_indent {
            if c == ' ' && self.position.column <= self.raw_column {
                return Ok(true);
            }
            self.raw_indent = false;
        }
        match c {
            '`' => self.state = State::RawClosed,
            '\\' => self.state = State::RawEscape,
            '\n' => {
                self.buffer.push(c);
                self.raw_indent = true;
            }
            _ => self.buffer.push(c),
        }
        Ok(true)
    }

    fn finish(self) -> Result<Vec<Token>, LexicalError> {
        let unterminated = match self.state {
            State::String | State::Escape | State::Hex { .. } => {
                Some(LexicalErrorKind::UnterminatedString)
            }
            State::RawString | State::RawEscape => Some(LexicalErrorKind::UnterminatedRawString),
            _ if !self.frames.is_empty() => Some(LexicalErrorKind::UnterminatedInterpolation),
            _ => None,
        };
        match unterminated {
            Some(kind) => Err(LexicalError {
                kind,
                position: self.start,
                span: Span::new(self.start_offset, self.offset),
            }),
            None => Ok(self.tokens),
        }
    }
}

fn char_text(c: char) -> EcoString {
    let mut text = EcoString::new();
    text.push(c);
    text
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

#[cfg(test)]
mod scanner_test;
