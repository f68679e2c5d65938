//! Diagnostic reporting with source locations
//!
//! Every stage has its own error enum so callers can match on the exact
//! failure kind. All of them are miette diagnostics; lexer and parser errors
//! carry a label pointing into the source line.

use crate::common::Span;
use crate::lexer::TokenKind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use num_bigint::BigInt;
use std::sync::Arc;
use thiserror::Error;

/// Source text for error reporting
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: Arc<str>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Arc::from(content.into()),
        }
    }

    pub fn to_named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.content.to_string())
    }

    /// Attach this source to an error so the report shows the snippet
    pub fn report(&self, error: impl Diagnostic + Send + Sync + 'static) -> miette::Report {
        miette::Report::new(error).with_source_code(self.to_named_source())
    }
}

/// Convert our Span to miette's SourceSpan
impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.start.into(), span.len())
    }
}

/// Lexer failure
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unexpected character `{ch}` at position {position}")]
    #[diagnostic(code(lex::unexpected_character))]
    UnexpectedCharacter {
        ch: char,
        position: usize,
        #[label("not part of any token")]
        span: SourceSpan,
    },
}

/// Parser failure
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found}")]
    #[diagnostic(code(parse::unexpected_token))]
    UnexpectedToken {
        expected: String,
        found: TokenKind,
        #[label("unexpected token here")]
        span: SourceSpan,
    },

    #[error("Invalid assignment target: only a variable can appear left of `=`")]
    #[diagnostic(
        code(parse::invalid_assignment_target),
        help("assign to a plain name, e.g. `x = 5`")
    )]
    InvalidAssignmentTarget {
        #[label("cannot assign to this expression")]
        span: SourceSpan,
    },

    #[error("Unexpected end of input: expected {expected}")]
    #[diagnostic(code(parse::unexpected_eof))]
    UnexpectedEndOfInput {
        expected: String,
        #[label("expected more tokens")]
        span: SourceSpan,
    },

    #[error("Unexpected {found} after end of statement")]
    #[diagnostic(
        code(parse::trailing_tokens),
        help("each input holds exactly one expression or assignment")
    )]
    TrailingTokens {
        found: TokenKind,
        #[label("statement already ended")]
        span: SourceSpan,
    },

    #[error("Expression nested too deeply: more than {limit} levels")]
    #[diagnostic(
        code(parse::nesting_too_deep),
        help("split the expression using intermediate variables")
    )]
    NestingTooDeep {
        limit: usize,
        #[label("nesting limit reached here")]
        span: SourceSpan,
    },
}

/// Evaluation failure
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("Undefined variable `{name}`")]
    #[diagnostic(
        code(eval::undefined_variable),
        help("assign a value to it before reading it")
    )]
    UndefinedVariable { name: String },

    #[error("Division by zero")]
    #[diagnostic(code(eval::division_by_zero))]
    DivisionByZero,

    #[error("Modulo by zero")]
    #[diagnostic(code(eval::modulo_by_zero))]
    ModuloByZero,

    #[error("Factorial of negative number {value}")]
    #[diagnostic(code(eval::negative_factorial))]
    NegativeFactorial { value: BigInt },

    #[error("Negative exponent {exponent} is not supported for integers")]
    #[diagnostic(code(eval::negative_exponent))]
    NegativeExponent { exponent: BigInt },

    #[error("Exponent {exponent} exceeds the limit of {limit}")]
    #[diagnostic(code(eval::exponent_too_large))]
    ExponentTooLarge { exponent: BigInt, limit: u32 },

    #[error("Factorial operand {value} exceeds the limit of {limit}")]
    #[diagnostic(code(eval::factorial_too_large))]
    FactorialTooLarge { value: BigInt, limit: u64 },
}

/// Any failure of the lex → parse → evaluate pipeline
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum TallyError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Eval(#[from] EvalError),
}
