//! Runtime values for the interpreter

use std::fmt;

use num_bigint::BigInt;

/// Result of executing one statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Arbitrary-precision integer
    Int(BigInt),
    /// Rendered AST, produced by `render(...)`
    Tree(String),
}

impl Value {
    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Tree(_) => "tree",
        }
    }

    /// Try to get as integer
    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Value::Int(n) => Some(n),
            Value::Tree(_) => None,
        }
    }

    /// Try to get as rendered tree
    pub fn as_tree(&self) -> Option<&str> {
        match self {
            Value::Tree(text) => Some(text),
            Value::Int(_) => None,
        }
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::Int(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Tree(text) => write!(f, "{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(BigInt::from(-42)).to_string(), "-42");
        assert_eq!(Value::Tree("└── NUMBER(1)".into()).to_string(), "└── NUMBER(1)");
    }

    #[test]
    fn test_accessors() {
        let v = Value::from(BigInt::from(7));
        assert_eq!(v.type_name(), "int");
        assert_eq!(v.as_int(), Some(&BigInt::from(7)));
        assert_eq!(v.as_tree(), None);
    }
}
