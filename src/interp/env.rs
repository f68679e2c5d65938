//! Variable environment
//!
//! A flat name → integer store. It is owned by one [`Interpreter`] and
//! lives as long as that instance, so bindings persist across evaluations.
//!
//! [`Interpreter`]: super::Interpreter

use std::collections::HashMap;

use num_bigint::BigInt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    bindings: HashMap<String, BigInt>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a variable
    pub fn get(&self, name: &str) -> Option<&BigInt> {
        self.bindings.get(name)
    }

    /// Bind `name`, replacing any earlier value
    pub fn assign(&mut self, name: impl Into<String>, value: BigInt) {
        self.bindings.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Bindings sorted by name
    pub fn sorted(&self) -> Vec<(&str, &BigInt)> {
        let mut entries: Vec<_> = self
            .bindings
            .iter()
            .map(|(name, value)| (name.as_str(), value))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_overwrites() {
        let mut env = Environment::new();
        env.assign("x", BigInt::from(1));
        env.assign("x", BigInt::from(2));
        assert_eq!(env.get("x"), Some(&BigInt::from(2)));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_sorted_orders_by_name() {
        let mut env = Environment::new();
        env.assign("b", BigInt::from(2));
        env.assign("a", BigInt::from(1));
        let names: Vec<_> = env.sorted().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_clear() {
        let mut env = Environment::new();
        env.assign("x", BigInt::from(1));
        env.clear();
        assert!(env.is_empty());
        assert!(!env.contains("x"));
    }
}
