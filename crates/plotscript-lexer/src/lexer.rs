//! Converts program text into a flat token stream.
//!
//! Rules:
//! - `(` and `)` are always single-character tokens
//! - a double-quoted string is one token, quotes included, and may contain
//!   spaces and parens; an unterminated string runs to end of input
//! - every other maximal run of non-whitespace, non-paren bytes is a token
//!
//! The lexer never fails. Malformed input is left for the parser to reject.

use plotscript_types::{Position, Span};

use crate::token::{Token, TokenKind};

/// The plotscript lexer.
pub struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    /// Current byte offset.
    pos: usize,
    /// Current line (1-based).
    line: u32,
    /// Current column (1-based).
    col: u32,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Lex the whole input. Empty or blank input yields an empty vector.
    pub fn lex(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.col)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|ch| ch.is_ascii_whitespace()) {
            self.advance();
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();
        let start_pos = self.pos;
        let start = self.position();
        let ch = self.peek()?;

        let kind = match ch {
            b'(' => {
                self.advance();
                TokenKind::Open
            }
            b')' => {
                self.advance();
                TokenKind::Close
            }
            b'"' => {
                self.scan_string();
                TokenKind::Text(self.source[start_pos..self.pos].to_string())
            }
            _ => {
                self.scan_text();
                TokenKind::Text(self.source[start_pos..self.pos].to_string())
            }
        };

        let end = Position::new(self.line, self.col.saturating_sub(1).max(1));
        Some(Token::new(kind, Span::new(start, end)))
    }

    /// Consume a string literal, opening and closing quote included.
    fn scan_string(&mut self) {
        self.advance();
        while let Some(ch) = self.advance() {
            if ch == b'"' {
                break;
            }
        }
    }

    fn scan_text(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_whitespace() || ch == b'(' || ch == b')' {
                break;
            }
            self.advance();
        }
    }
}

/// Convenience wrapper: lex `source` in one call.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).lex()
}
