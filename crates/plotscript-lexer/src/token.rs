//! Token types for the plotscript lexer.

use plotscript_types::Span;
use std::fmt;

/// A single lexeme with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Every token kind in the language. There are only three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `(`
    Open,
    /// `)`
    Close,
    /// Any other maximal run of non-space, non-paren characters, or a
    /// double-quoted string including its quotes.
    Text(String),
}

impl TokenKind {
    /// The raw text of a [`TokenKind::Text`] token.
    pub fn text(&self) -> Option<&str> {
        match self {
            TokenKind::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Open => write!(f, "("),
            TokenKind::Close => write!(f, ")"),
            TokenKind::Text(s) => write!(f, "{s}"),
        }
    }
}
