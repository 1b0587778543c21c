//! Tree → Graph.
//!
//! Walks the tree depth-first and emits one triple per branch. A branch
//! whose target is a node emits its edge triple before the node's own
//! triples. Inverted roles (`:ARG0-of`) are turned around so the stored
//! triple always has its logical direction.
//!
//! Layout hints: the edge that introduces a nested node gets
//! `Push(var)`, and the last triple emitted inside that node gets `Pop`.

use hashbrown::HashMap;
use tracing::warn;

use crate::codec::CodecConfig;
use crate::model::{
    is_inverted, normalize_role, Atom, BranchTarget, Epidatum, Graph, TreeNode, Triple,
    CONCEPT_ROLE, INVERSE_SUFFIX,
};
use crate::{Error, Result};

/// Interpret a tree as a graph.
pub fn tree_to_graph(tree: &TreeNode, config: &CodecConfig) -> Result<Graph> {
    if tree.depth() > config.max_depth {
        return Err(Error::Layout(format!(
            "tree nesting exceeds the maximum depth of {}",
            config.max_depth
        )));
    }

    let mut builder = GraphBuilder { config, triples: Vec::new(), epidata: HashMap::new() };
    match tree.var.as_deref() {
        Some(var) => {
            check_variable(var)?;
            builder.walk(tree, var)?;
        }
        None if !tree.branches.is_empty() => {
            return Err(Error::Layout("anonymous node cannot have branches".into()));
        }
        None => {}
    }

    Ok(Graph::from_parts(tree.var.clone(), builder.triples, builder.epidata))
}

struct GraphBuilder<'c> {
    config: &'c CodecConfig,
    triples: Vec<Triple>,
    epidata: HashMap<Triple, Vec<Epidatum>>,
}

impl GraphBuilder<'_> {
    fn emit(&mut self, triple: Triple, epidata: Vec<Epidatum>) {
        if !epidata.is_empty() {
            self.epidata.entry(triple.clone()).or_default().extend(epidata);
        }
        self.triples.push(triple);
    }

    /// Resolve a surface role to (stored role, inverted?).
    fn role(&self, surface: &str) -> (String, bool) {
        let role = normalize_role(surface);
        let (base, inverted) = if is_inverted(role) {
            (&role[..role.len() - INVERSE_SUFFIX.len()], true)
        } else {
            (role, false)
        };
        if base.is_empty() {
            (self.config.anonymous_role.clone(), inverted)
        } else {
            (base.to_owned(), inverted)
        }
    }

    /// An inverted role whose target is not a variable keeps its `-of`
    /// and its surface direction.
    fn uninverted(&self, var: &str, surface: &str, target: Atom) -> Triple {
        warn!(var, role = surface, %target, "cannot invert role onto a non-variable target");
        let (base, _) = self.role(surface);
        Triple { source: var.to_owned(), role: format!("{base}{INVERSE_SUFFIX}"), target }
    }

    fn walk(&mut self, node: &TreeNode, var: &str) -> Result<()> {
        for branch in &node.branches {
            // layout hints are rebuilt from the tree shape
            let mut epidata: Vec<Epidatum> =
                branch.epidata.iter().filter(|e| !e.is_layout()).cloned().collect();

            if branch.role == CONCEPT_ROLE {
                let BranchTarget::Atom(concept) = &branch.target else {
                    return Err(Error::Layout(format!("concept of '{var}' cannot be a node")));
                };
                let instance = Triple {
                    source: var.to_owned(),
                    role: self.config.instance_role.clone(),
                    target: concept.clone(),
                };
                self.emit(instance, epidata);
                continue;
            }

            let (role, inverted) = self.role(&branch.role);
            match &branch.target {
                BranchTarget::Atom(atom) => {
                    let triple = match atom {
                        Atom::Symbol(source) if inverted => {
                            check_variable(source)?;
                            Triple { source: source.clone(), role, target: Atom::Symbol(var.to_owned()) }
                        }
                        _ if inverted => self.uninverted(var, &branch.role, atom.clone()),
                        _ => Triple { source: var.to_owned(), role, target: atom.clone() },
                    };
                    self.emit(triple, epidata);
                }
                BranchTarget::Node(child) => {
                    let Some(child_var) = child.var.as_deref() else {
                        if !child.branches.is_empty() {
                            return Err(Error::Layout(format!(
                                "anonymous node under '{var}' cannot carry branches"
                            )));
                        }
                        let triple = if inverted {
                            self.uninverted(var, &branch.role, Atom::Null)
                        } else {
                            Triple { source: var.to_owned(), role, target: Atom::Null }
                        };
                        self.emit(triple, epidata);
                        continue;
                    };
                    check_variable(child_var)?;
                    let triple = if inverted {
                        Triple { source: child_var.to_owned(), role, target: Atom::Symbol(var.to_owned()) }
                    } else {
                        Triple { source: var.to_owned(), role, target: Atom::Symbol(child_var.to_owned()) }
                    };
                    epidata.push(Epidatum::Push(child_var.to_owned()));
                    self.emit(triple, epidata);
                    self.walk(child, child_var)?;
                    if let Some(last) = self.triples.last().cloned() {
                        self.epidata.entry(last).or_default().push(Epidatum::Pop);
                    }
                }
            }
        }
        Ok(())
    }
}

/// A variable must be a non-empty, non-numeric bare symbol.
fn check_variable(var: &str) -> Result<()> {
    let bare = !var.is_empty() && !var.chars().any(crate::notation::lexer::is_delimiter);
    if bare && matches!(Atom::from_token(var), Atom::Symbol(_)) {
        Ok(())
    } else {
        Err(Error::Layout(format!("invalid variable '{var}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlignmentMarker, Branch};

    fn interpret(tree: &TreeNode) -> Graph {
        tree_to_graph(tree, &CodecConfig::default()).unwrap()
    }

    #[test]
    fn test_edge_before_nested_node() {
        let tree = TreeNode::new("g")
            .with_concept("go")
            .with_branch(Branch::node(":null_edge", TreeNode::new("x20").with_concept("876-9")));
        let g = interpret(&tree);
        assert_eq!(g.triples(), &[
            Triple::new("g", "instance", "go"),
            Triple::new("g", "null_edge", "x20"),
            Triple::new("x20", "instance", "876-9"),
        ]);
        assert_eq!(g.top(), Some("g"));
    }

    #[test]
    fn test_inversion() {
        let tree = TreeNode::new("b").with_branch(Branch::node(":ARG-of", TreeNode::new("a")));
        let g = interpret(&tree);
        assert_eq!(g.triples(), &[Triple::new("a", "ARG", "b")]);
        assert_eq!(g.top(), Some("b"));

        let tree = TreeNode::new("b").with_branch(Branch::node(":-of", TreeNode::new("a")));
        assert_eq!(interpret(&tree).triples(), &[Triple::new("a", "", "b")]);
    }

    #[test]
    fn test_layout_hints() {
        let tree = TreeNode::new("a").with_branch(Branch::node(
            ":ARG0",
            TreeNode::new("b").with_concept("beta"),
        ));
        let g = interpret(&tree);
        let edge = Triple::new("a", "ARG0", "b");
        let concept = Triple::new("b", "instance", "beta");
        assert_eq!(g.epidata_for(&edge), &[Epidatum::Push("b".into())]);
        assert_eq!(g.epidata_for(&concept), &[Epidatum::Pop]);
    }

    #[test]
    fn test_role_alignment_follows_inversion() {
        let tree = TreeNode::new("b").with_branch(
            Branch::node(":ARG-of", TreeNode::new("a"))
                .with_epidatum(Epidatum::RoleAlignment(AlignmentMarker::new([4]))),
        );
        let g = interpret(&tree);
        let edge = Triple::new("a", "ARG", "b");
        assert_eq!(g.epidata_for(&edge)[0], Epidatum::RoleAlignment(AlignmentMarker::new([4])));
    }

    #[test]
    fn test_invalid_layouts() {
        let cfg = CodecConfig::default();
        let bad_var = TreeNode::new("1").with_concept("one");
        assert!(matches!(tree_to_graph(&bad_var, &cfg), Err(Error::Layout(_))));
        let node_concept = TreeNode::new("a").with_branch(Branch::node("/", TreeNode::new("b")));
        assert!(matches!(tree_to_graph(&node_concept, &cfg), Err(Error::Layout(_))));
    }

    #[test]
    fn test_inverted_role_onto_non_variable() {
        let tree = TreeNode::new("a")
            .with_branch(Branch::atom(":ARG-of", 1))
            .with_branch(Branch::atom(":ARG0-of", Atom::Null))
            .with_branch(Branch::node(":mod-of", TreeNode::anonymous()));
        assert_eq!(interpret(&tree).triples(), &[
            Triple::new("a", "ARG-of", 1),
            Triple::new("a", "ARG0-of", Atom::Null),
            Triple::new("a", "mod-of", Atom::Null),
        ]);
    }

    #[test]
    fn test_anonymous_nodes() {
        let g = interpret(&TreeNode::anonymous());
        assert_eq!(g.top(), None);
        assert!(g.triples().is_empty());
        let tree = TreeNode::new("a").with_branch(Branch::node(":", TreeNode::anonymous()));
        assert_eq!(interpret(&tree).triples(), &[Triple::new("a", "", Atom::Null)]);
    }
}
