//! Tree-walking interpreter for the tally AST
//!
//! Evaluates expressions to arbitrary-precision integers against a
//! per-instance variable environment.

pub mod env;
pub mod eval;
pub mod value;

pub use env::Environment;
pub use eval::{Interpreter, Limits, evaluate};
pub use value::Value;
