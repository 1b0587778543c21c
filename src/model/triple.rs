//! Triple: one (source, role, target) fact of a graph.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{normalize_role, Atom};

/// Name of a graph node.
pub type Variable = String;

/// A (source, role, target) fact.
///
/// Roles are stored without the leading ":". The target is an [`Atom`];
/// a `Symbol` target refers to a node when the owning graph lists it
/// among its variables (see `Graph::variables`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub source: Variable,
    pub role: String,
    pub target: Atom,
}

impl Triple {
    pub fn new(source: impl Into<Variable>, role: &str, target: impl Into<Atom>) -> Self {
        Self {
            source: source.into(),
            role: normalize_role(role).to_owned(),
            target: target.into(),
        }
    }

    /// The target as a symbol, if it is one.
    pub fn target_symbol(&self) -> Option<&str> {
        self.target.as_symbol()
    }

    /// The "other" end of the triple from the given variable.
    pub fn other_end(&self, from: &str) -> Option<&str> {
        if self.source == from {
            self.target_symbol()
        } else if self.target_symbol() == Some(from) {
            Some(&self.source)
        } else {
            None
        }
    }
}

impl<S, T> From<(S, &str, T)> for Triple
where
    S: Into<Variable>,
    T: Into<Atom>,
{
    fn from((source, role, target): (S, &str, T)) -> Self {
        Triple::new(source, role, target)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.source, self.role, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_is_normalized() {
        let t = Triple::new("a", ":instance", "alpha");
        assert_eq!(t.role, "instance");
        assert_eq!(t, Triple::new("a", "instance", "alpha"));
    }

    #[test]
    fn test_other_end() {
        let t = Triple::from(("a", "ARG0", "b"));
        assert_eq!(t.other_end("a"), Some("b"));
        assert_eq!(t.other_end("b"), Some("a"));
        assert_eq!(t.other_end("c"), None);
        let attr = Triple::from(("a", "quant", 5));
        assert_eq!(attr.other_end("a"), None);
    }
}
