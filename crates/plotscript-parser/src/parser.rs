//! Recursive-descent parser over the token stream.
//!
//! Grammar:
//! ```text
//! program := form EOF
//! form    := '(' ATOM child* ')'
//! child   := ATOM | form
//! ```
//! The whole stream must be exactly one form. The head of every form is a
//! single atom token; a nested form may not appear in head position.

use plotscript_lexer::{Token, TokenKind};
use plotscript_types::{Atom, Expression, SourceFile, Span};
use thiserror::Error;

/// Forms nested deeper than this are rejected rather than recursed into.
pub const MAX_NESTING: usize = 1024;

/// Why a token stream did not form a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{span}: {message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    /// The offending source line, when the source text is known.
    pub source_line: String,
}

/// The plotscript parser.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source_file: Option<&'src SourceFile>,
    depth: usize,
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file: None,
            depth: 0,
        }
    }

    /// Attach source text so errors can quote the offending line.
    pub fn with_source(mut self, source_file: &'src SourceFile) -> Self {
        self.source_file = Some(source_file);
        self
    }

    /// Parse exactly one top-level form.
    pub fn parse(mut self) -> Result<Expression, ParseError> {
        if self.tokens.is_empty() {
            return Err(self.error_at(Span::point(1, 1), "empty program"));
        }
        if !matches!(self.peek_kind(), Some(TokenKind::Open)) {
            return Err(self.error_here("program must start with '('"));
        }
        let expr = self.parse_form()?;
        if self.pos < self.tokens.len() {
            return Err(self.error_here("unexpected input after complete expression"));
        }
        Ok(expr)
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn end_span(&self) -> Span {
        self.tokens
            .last()
            .map(|t| Span::new(t.span.end, t.span.end))
            .unwrap_or_else(|| Span::point(1, 1))
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|t| t.span)
            .unwrap_or_else(|| self.end_span())
    }

    // ── Errors ────────────────────────────────────────────────────────────────

    fn error_at(&self, span: Span, message: impl Into<String>) -> ParseError {
        let source_line = self
            .source_file
            .and_then(|sf| sf.line(span.start.line))
            .unwrap_or("")
            .to_string();
        ParseError {
            message: message.into(),
            span,
            source_line,
        }
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        self.error_at(self.current_span(), message)
    }

    // ── Grammar ───────────────────────────────────────────────────────────────

    /// `'(' ATOM child* ')'`, with the cursor on the `(`.
    fn parse_form(&mut self) -> Result<Expression, ParseError> {
        let open = self.advance().map(|t| t.span).unwrap_or_else(|| self.end_span());
        if self.depth >= MAX_NESTING {
            return Err(self.error_at(open, "expression nested too deeply"));
        }
        self.depth += 1;

        let mut node = match self.advance() {
            Some(Token {
                kind: TokenKind::Text(text),
                span,
            }) => Expression::new(self.atom(&text, span)?),
            Some(Token {
                kind: TokenKind::Close,
                span,
            }) => return Err(self.error_at(open.to(span), "empty expression '()'")),
            Some(Token {
                kind: TokenKind::Open,
                span,
            }) => return Err(self.error_at(span, "expression head must be an atom")),
            None => return Err(self.error_at(open, "unbalanced '(': unexpected end of input")),
        };

        loop {
            match self.peek_kind() {
                Some(TokenKind::Close) => {
                    self.advance();
                    break;
                }
                Some(TokenKind::Open) => {
                    let child = self.parse_form()?;
                    node.append_expression(child);
                }
                Some(TokenKind::Text(_)) => {
                    if let Some(Token {
                        kind: TokenKind::Text(text),
                        span,
                    }) = self.advance()
                    {
                        let atom = self.atom(&text, span)?;
                        node.append(atom);
                    }
                }
                None => {
                    return Err(self.error_at(open, "unbalanced '(': unexpected end of input"));
                }
            }
        }

        self.depth -= 1;
        Ok(node)
    }

    fn atom(&self, text: &str, span: Span) -> Result<Atom, ParseError> {
        match Atom::from_token(text) {
            Atom::None => Err(self.error_at(span, format!("invalid atom '{text}'"))),
            atom => Ok(atom),
        }
    }
}

/// Parse a token stream, reporting why it failed.
pub fn try_parse(tokens: Vec<Token>) -> Result<Expression, ParseError> {
    Parser::new(tokens).parse()
}

/// Parse a token stream, returning the invalid sentinel
/// (`Expression::default()`) on any failure.
pub fn parse(tokens: Vec<Token>) -> Expression {
    try_parse(tokens).unwrap_or_default()
}

/// Lex and parse program text, with source lines in any error.
pub fn parse_str(source: &str) -> Result<Expression, ParseError> {
    let sf = SourceFile::new(source);
    let tokens = plotscript_lexer::tokenize(&sf.source);
    Parser::new(tokens).with_source(&sf).parse()
}
