//! Token definitions for the tally lexer

use crate::common::Span;
use logos::Logos;
use num_bigint::BigUint;

/// A token with its kind, span, and text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
    /// Literal value, present only on `Number` tokens
    pub value: Option<BigUint>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
            value: None,
        }
    }

    pub fn number(value: BigUint, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Number,
            span,
            text: text.into(),
            value: Some(value),
        }
    }

    pub fn eof(pos: usize) -> Self {
        Self::new(TokenKind::Eof, Span::point(pos), "")
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Number | TokenKind::Ident => write!(f, "{}({})", self.kind.name(), self.text),
            _ => write!(f, "{}", self.kind.name()),
        }
    }
}

/// Token kinds recognized by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos)]
#[logos(skip r"[ \t\r\n\f\x0B]+")]
pub enum TokenKind {
    // Keywords
    #[token("render")]
    Render,

    // Literals
    #[regex(r"[0-9]+")]
    Number,

    // Identifiers (an exact `render` match wins over this regex)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    // Operators
    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("!")]
    Bang,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    // Special
    Eof,
}

impl TokenKind {
    /// Get the string representation of the token
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Render => "render",
            TokenKind::Number => "<number>",
            TokenKind::Ident => "<identifier>",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Caret => "^",
            TokenKind::Bang => "!",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Eof => "<end of input>",
        }
    }

    /// Upper-case kind name, as printed by `tally tokens`
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Render => "RENDER",
            TokenKind::Number => "NUMBER",
            TokenKind::Ident => "IDENTIFIER",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "MULTIPLY",
            TokenKind::Slash => "DIVIDE",
            TokenKind::Percent => "MODULO",
            TokenKind::Caret => "EXPONENT",
            TokenKind::Bang => "FACTORIAL",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::Eof => "END",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
