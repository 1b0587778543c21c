//! Tree: the parsed, strictly hierarchical form of a graph.

use serde::{Deserialize, Serialize};

use super::{Atom, Epidatum, Variable};

/// A node in the tree: an optional variable and its ordered branches.
///
/// `()` parses to a node with neither variable nor branches.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TreeNode {
    pub var: Option<Variable>,
    pub branches: Vec<Branch>,
}

/// One `role target` pair under a node.
///
/// `role` is kept as written (`/`, `:ARG0`, `:`); the formatter also
/// accepts roles without the leading ":".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub role: String,
    pub target: BranchTarget,
    pub epidata: Vec<Epidatum>,
}

/// Target of a branch: an atom or a nested node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BranchTarget {
    Atom(Atom),
    Node(Box<TreeNode>),
}

/// The concept branch role.
pub const CONCEPT_ROLE: &str = "/";

impl TreeNode {
    pub fn new(var: impl Into<Variable>) -> Self {
        Self { var: Some(var.into()), branches: Vec::new() }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_branch(mut self, branch: Branch) -> Self {
        self.branches.push(branch);
        self
    }

    /// Add a `/ concept` branch.
    pub fn with_concept(self, concept: impl Into<Atom>) -> Self {
        self.with_branch(Branch::atom(CONCEPT_ROLE, concept))
    }

    /// The concept branch, if the first branch is one.
    pub fn concept(&self) -> Option<&Atom> {
        match self.branches.first() {
            Some(Branch { role, target: BranchTarget::Atom(atom), .. }) if role == CONCEPT_ROLE => {
                Some(atom)
            }
            _ => None,
        }
    }

    /// All nodes in pre-order, starting with `self`.
    pub fn nodes(&self) -> Vec<&TreeNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            for branch in node.branches.iter().rev() {
                if let BranchTarget::Node(child) = &branch.target {
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Variables of all nodes in pre-order.
    pub fn variables(&self) -> Vec<&str> {
        self.nodes().into_iter().filter_map(|n| n.var.as_deref()).collect()
    }

    /// Nesting depth; a node without nested nodes has depth 1.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, d)) = stack.pop() {
            max = max.max(d);
            for branch in &node.branches {
                if let BranchTarget::Node(child) = &branch.target {
                    stack.push((child.as_ref(), d + 1));
                }
            }
        }
        max
    }
}

impl Branch {
    pub fn new(role: impl Into<String>, target: BranchTarget) -> Self {
        Self { role: role.into(), target, epidata: Vec::new() }
    }

    pub fn atom(role: impl Into<String>, atom: impl Into<Atom>) -> Self {
        Self::new(role, BranchTarget::Atom(atom.into()))
    }

    pub fn node(role: impl Into<String>, node: TreeNode) -> Self {
        Self::new(role, BranchTarget::Node(Box::new(node)))
    }

    pub fn with_epidatum(mut self, epidatum: Epidatum) -> Self {
        self.epidata.push(epidatum);
        self
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self.target, BranchTarget::Atom(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::new("a")
            .with_concept("alpha")
            .with_branch(Branch::node(
                ":ARG0",
                TreeNode::new("b").with_branch(Branch::node(":ARG1", TreeNode::new("c"))),
            ))
            .with_branch(Branch::node(":ARG1", TreeNode::new("d")))
    }

    #[test]
    fn test_variables_pre_order() {
        assert_eq!(sample().variables(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_depth() {
        assert_eq!(sample().depth(), 3);
        assert_eq!(TreeNode::anonymous().depth(), 1);
    }

    #[test]
    fn test_concept() {
        assert_eq!(sample().concept(), Some(&Atom::symbol("alpha")));
        assert_eq!(TreeNode::new("x").concept(), None);
    }
}
