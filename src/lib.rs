//! tally: a small integer expression language
//!
//! - Arbitrary-precision integer arithmetic: `+ - * / % ^` and prefix `!`
//! - Floor division and floor-consistent remainder
//! - Variables that persist for the lifetime of an interpreter
//! - `render(expr)` to dump the parsed tree instead of evaluating it
//!
//! # Architecture
//!
//! ```text
//! Source → Lexer → Parser → AST → Interpreter (+ Environment) → integer
//!                                └→ Renderer → tree text
//! ```
//!
//! # Example
//!
//! ```
//! use tally::interp::Interpreter;
//!
//! let mut interp = Interpreter::new();
//! interp.run("x = y = 5").unwrap();
//! let value = interp.run("x * y + !3").unwrap();
//! assert_eq!(value.to_string(), "31");
//! ```

pub mod ast;
pub mod common;
pub mod config;
pub mod diagnostics;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod repl;
pub mod server;

// Re-export diagnostics for convenience
pub use diagnostics::{EvalError, LexError, ParseError, SourceFile, TallyError};

// Re-exports for convenience
pub use ast::{Expr, Stmt};
pub use interp::{Interpreter, Value};
pub use lexer::lex as tokenize;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse source code to a statement
pub fn parse_source(source: &str) -> Result<Stmt, TallyError> {
    let tokens = lexer::lex(source)?;
    let stmt = parser::parse(&tokens)?;
    Ok(stmt)
}

/// Evaluate one statement in a fresh interpreter
pub fn eval(source: &str) -> Result<Value, TallyError> {
    Interpreter::new().run(source)
}
