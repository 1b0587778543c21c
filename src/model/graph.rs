//! Graph: the flat triple-store form of a decoded graph.

use std::fmt;

use hashbrown::{HashMap, HashSet};

use super::{Atom, Epidatum, Triple, Variable};

/// Default name of the concept (instance) role.
pub const INSTANCE_ROLE: &str = "instance";

/// A rooted graph: a top variable, ordered triples and their epidata.
///
/// Triple order is kept for round-trip fidelity but is not part of
/// equality, and neither are epidata: two graphs are equal when their tops
/// agree and they hold the same multiset of triples.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    top: Option<Variable>,
    triples: Vec<Triple>,
    epidata: HashMap<Triple, Vec<Epidatum>>,
}

impl Graph {
    /// Build a graph; the top defaults to the source of the first triple.
    pub fn new<T: Into<Triple>>(triples: impl IntoIterator<Item = T>) -> Self {
        let triples: Vec<Triple> = triples.into_iter().map(Into::into).collect();
        let top = triples.first().map(|t| t.source.clone());
        Self { top, triples, epidata: HashMap::new() }
    }

    pub fn with_top(mut self, top: impl Into<Variable>) -> Self {
        self.top = Some(top.into());
        self
    }

    pub fn without_top(mut self) -> Self {
        self.top = None;
        self
    }

    /// Append epidata for `triple` (which need not be in the graph yet).
    pub fn with_epidata(
        mut self,
        triple: impl Into<Triple>,
        epidata: impl IntoIterator<Item = Epidatum>,
    ) -> Self {
        self.epidata.entry(triple.into()).or_default().extend(epidata);
        self
    }

    pub(crate) fn from_parts(
        top: Option<Variable>,
        triples: Vec<Triple>,
        epidata: HashMap<Triple, Vec<Epidatum>>,
    ) -> Self {
        Self { top, triples, epidata }
    }

    pub fn top(&self) -> Option<&str> {
        self.top.as_deref()
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn epidata(&self) -> &HashMap<Triple, Vec<Epidatum>> {
        &self.epidata
    }

    /// Epidata of one triple, empty if it has none.
    pub fn epidata_for(&self, triple: &Triple) -> &[Epidatum] {
        self.epidata.get(triple).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty() && self.top.is_none()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }
}

// ============================================================================
// Queries
// ============================================================================

impl Graph {
    /// Variables in first-seen order: the top, then triple sources, then
    /// targets named by a `Push` layout hint on their own triple.
    pub fn variables(&self) -> Vec<&str> {
        let pushed = self.triples.iter().flat_map(|t| {
            self.epidata_for(t)
                .iter()
                .filter_map(Epidatum::pushed)
                .filter(move |v| t.target_symbol() == Some(*v))
        });
        let candidates = self
            .top()
            .into_iter()
            .chain(self.triples.iter().map(|t| t.source.as_str()))
            .chain(pushed);
        let mut seen = HashSet::new();
        candidates.filter(|v| seen.insert(*v)).collect()
    }

    pub fn is_variable(&self, name: &str) -> bool {
        self.variables().contains(&name)
    }

    /// Concept (instance) triples, for the given instance role.
    pub fn instances_with<'g>(&'g self, instance_role: &'g str) -> impl Iterator<Item = &'g Triple> {
        self.triples.iter().filter(move |t| t.role == instance_role)
    }

    pub fn instances(&self) -> Vec<&Triple> {
        self.instances_with(INSTANCE_ROLE).collect()
    }

    /// Non-instance triples whose target is a variable.
    pub fn edges(&self) -> Vec<&Triple> {
        let vars: HashSet<&str> = self.variables().into_iter().collect();
        self.triples
            .iter()
            .filter(|t| t.role != INSTANCE_ROLE)
            .filter(|t| t.target_symbol().is_some_and(|s| vars.contains(s)))
            .collect()
    }

    /// Non-instance triples whose target is a constant.
    pub fn attributes(&self) -> Vec<&Triple> {
        let vars: HashSet<&str> = self.variables().into_iter().collect();
        self.triples
            .iter()
            .filter(|t| t.role != INSTANCE_ROLE)
            .filter(|t| !t.target_symbol().is_some_and(|s| vars.contains(s)))
            .collect()
    }

    /// The concept of `var`, from its first instance triple.
    pub fn concept_of(&self, var: &str) -> Option<&Atom> {
        self.instances_with(INSTANCE_ROLE)
            .find(|t| t.source == var)
            .map(|t| &t.target)
    }

    /// Variables that are the target of more than one edge, or of any edge
    /// while also being the top.
    pub fn reentrancies(&self) -> HashMap<&str, usize> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        if let Some(top) = self.top() {
            counts.insert(top, 1);
        }
        for edge in self.edges() {
            if let Some(target) = edge.target_symbol() {
                *counts.entry(target).or_default() += 1;
            }
        }
        counts.retain(|_, n| *n > 1);
        counts
    }
}

// ============================================================================
// Equality
// ============================================================================

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        if self.top != other.top || self.triples.len() != other.triples.len() {
            return false;
        }
        let mut counts: HashMap<&Triple, isize> = HashMap::new();
        for t in &self.triples {
            *counts.entry(t).or_default() += 1;
        }
        for t in &other.triples {
            *counts.entry(t).or_default() -= 1;
        }
        counts.values().all(|n| *n == 0)
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Graph top={}", self.top().unwrap_or("None"))?;
        for (i, t) in self.triples.iter().enumerate() {
            f.write_str(if i == 0 { " " } else { ", " })?;
            write!(f, "{t}")?;
        }
        f.write_str(">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn want_go() -> Graph {
        Graph::new([
            ("w", "instance", "want-01"),
            ("w", "ARG0", "b"),
            ("w", "ARG1", "g"),
            ("b", "instance", "boy"),
            ("g", "instance", "go"),
            ("g", "ARG0", "b"),
            ("g", "polarity", "-"),
        ])
    }

    #[test]
    fn test_top_defaults_to_first_source() {
        assert_eq!(want_go().top(), Some("w"));
        assert_eq!(Graph::new(Vec::<Triple>::new()).top(), None);
        assert_eq!(Graph::default().with_top("a").top(), Some("a"));
    }

    #[test]
    fn test_variables() {
        assert_eq!(want_go().variables(), vec!["w", "b", "g"]);
        let pushed = Graph::new([("a", "", "b")])
            .with_epidata(("a", "", "b"), [Epidatum::Push("b".into())]);
        assert_eq!(pushed.variables(), vec!["a", "b"]);
        assert!(pushed.is_variable("b"));
    }

    #[test]
    fn test_edges_and_attributes() {
        let g = want_go();
        assert_eq!(g.instances().len(), 3);
        assert_eq!(g.edges().len(), 3);
        let attrs = g.attributes();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].role, "polarity");
    }

    #[test]
    fn test_concept_of_and_reentrancies() {
        let g = want_go();
        assert_eq!(g.concept_of("b"), Some(&Atom::symbol("boy")));
        assert_eq!(g.concept_of("x"), None);
        let re = g.reentrancies();
        assert_eq!(re.len(), 1);
        assert_eq!(re.get("b"), Some(&2));
    }

    #[test]
    fn test_equality_ignores_order_and_epidata() {
        let a = Graph::new([("a", "ARG", "b"), ("a", "instance", "x")]).with_top("a");
        let b = Graph::new([("a", "instance", "x"), ("a", "ARG", "b")])
            .with_epidata(("a", "ARG", "b"), [Epidatum::Pop]);
        assert_eq!(a, b);
        assert_ne!(a, b.clone().with_top("b"));
    }
}
