//! Abstract Syntax Tree for the tally language
//!
//! This module defines the AST types produced by the parser. Nodes own
//! their children and carry no source positions.

use num_bigint::BigInt;
use serde::{Serialize, Serializer};

/// A complete input: one statement per evaluation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Stmt {
    /// `render(expr)`: dump the tree of `expr` instead of evaluating it
    Render(Expr),
    /// Plain expression or assignment
    Expr(Expr),
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Expr {
    /// Integer literal
    Number(#[serde(serialize_with = "serialize_decimal")] BigInt),
    /// Variable read
    Variable(String),
    /// Prefix operation
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Binary operation
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `name = value`
    Assign { name: String, value: Box<Expr> },
}

impl Expr {
    pub fn number(value: impl Into<BigInt>) -> Self {
        Expr::Number(value.into())
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn assign(name: impl Into<String>, value: Expr) -> Self {
        Expr::Assign {
            name: name.into(),
            value: Box::new(value),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
        }
    }
}

/// Unary (prefix) operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    Factorial,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Factorial => "!",
        }
    }
}

/// Literals dump as decimal strings so huge values survive JSON
fn serialize_decimal<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
