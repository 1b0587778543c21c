//! Tree → PENMAN text.
//!
//! The first branch of a node always shares the node's opening line.
//! Every later branch starts a new line, indented either under the first
//! character after the node's variable (adaptive) or by a fixed width
//! per nesting level. Compact mode keeps the atom-valued branches that
//! directly follow the first one on the opening line.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{surface_role, Branch, BranchTarget, EpiMode, TreeNode, CONCEPT_ROLE};

/// Indentation style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Indent {
    /// Everything on one line.
    None,
    /// Align branches under the column after the node's variable.
    #[default]
    Adaptive,
    /// Indent by a fixed number of columns per nesting level.
    Fixed(usize),
}

impl Indent {
    /// Map the numeric convention (`None` = one line, `-1` = adaptive,
    /// `n >= 0` = fixed width) to an [`Indent`].
    pub fn from_width(width: Option<i32>) -> Self {
        match width {
            None => Indent::None,
            Some(n) if n < 0 => Indent::Adaptive,
            Some(n) => Indent::Fixed(n as usize),
        }
    }
}

/// Formatter options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormatOptions {
    pub indent: Indent,
    pub compact: bool,
}

impl FormatOptions {
    pub fn new(indent: Indent, compact: bool) -> Self {
        Self { indent, compact }
    }

    pub fn single_line() -> Self {
        Self { indent: Indent::None, compact: false }
    }
}

/// Render a tree as PENMAN text.
///
/// The notation has no way to write branches on a node without a
/// variable, so an anonymous node is always rendered `()` and any
/// branches it carries are dropped with a warning. `tree_to_graph`
/// rejects such trees and `graph_to_tree` never builds them.
pub fn format_tree(tree: &TreeNode, options: &FormatOptions) -> String {
    format_node(tree, options, 0, 0)
}

/// `column` is where the node's `(` sits; `level` is the indentation of
/// the enclosing node's branches (used by fixed indentation).
fn format_node(node: &TreeNode, opts: &FormatOptions, column: usize, level: usize) -> String {
    let Some(var) = node.var.as_deref() else {
        if !node.branches.is_empty() {
            warn!(branches = node.branches.len(), "dropping branches of an anonymous node");
        }
        return "()".to_string();
    };
    if node.branches.is_empty() {
        return format!("({var})");
    }

    let head_column = column + var.chars().count() + 2;
    let branch_indent = match opts.indent {
        Indent::Adaptive => head_column,
        Indent::Fixed(n) => level + n,
        Indent::None => 0,
    };

    let mut rest = node.branches.iter();
    let mut head = String::new();
    if let Some(first) = rest.next() {
        head.push_str(&format_branch(first, opts, head_column, branch_indent));
    }
    let mut rest = rest.peekable();
    if opts.compact {
        while let Some(branch) = rest.next_if(|b| b.is_atomic()) {
            // an empty target leaves a trailing space
            head.truncate(head.trim_end().len());
            head.push(' ');
            head.push_str(&format_branch(branch, opts, 0, branch_indent));
        }
    }

    let mut parts = vec![head];
    parts.extend(rest.map(|b| format_branch(b, opts, branch_indent, branch_indent)));

    let separator = match opts.indent {
        Indent::None => " ".to_string(),
        _ => format!("\n{}", " ".repeat(branch_indent)),
    };
    let last = parts.len() - 1;
    let body: Vec<&str> = parts
        .iter()
        .enumerate()
        .map(|(i, part)| if i < last { part.trim_end() } else { part.as_str() })
        .collect();
    format!("({var} {})", body.join(&separator))
}

/// `column` is where the role token starts.
fn format_branch(branch: &Branch, opts: &FormatOptions, column: usize, level: usize) -> String {
    let mut role = match branch.role.as_str() {
        CONCEPT_ROLE => CONCEPT_ROLE.to_string(),
        other => surface_role(other),
    };
    for epi in branch.epidata.iter().filter(|e| e.mode() == EpiMode::Role) {
        role.push_str(&epi.to_string());
    }

    match &branch.target {
        BranchTarget::Atom(atom) => {
            let mut target = atom.to_string();
            for epi in branch.epidata.iter().filter(|e| e.mode() == EpiMode::Target) {
                target.push_str(&epi.to_string());
            }
            format!("{role} {target}")
        }
        BranchTarget::Node(child) => {
            let child_column = column + role.chars().count() + 1;
            format!("{role} {}", format_node(child, opts, child_column, level))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlignmentMarker, Atom, Epidatum};
    use pretty_assertions::assert_eq;

    fn b(role: &str, target: impl Into<Atom>) -> Branch {
        Branch::atom(role, target)
    }

    fn fmt(tree: &TreeNode) -> String {
        format_tree(tree, &FormatOptions::default())
    }

    #[test]
    fn test_anonymous_node_has_no_branches() {
        let tree = TreeNode { var: None, branches: vec![b(":ARG", "x")] };
        assert_eq!(fmt(&tree), "()");
        assert_eq!(fmt(&TreeNode::anonymous()), "()");
    }

    fn alpha_beta() -> TreeNode {
        TreeNode::new("a")
            .with_concept("alpha")
            .with_branch(Branch::node("ARG", TreeNode::new("b").with_concept("beta")))
    }

    #[test]
    fn test_format_basics() {
        assert_eq!(fmt(&TreeNode::anonymous()), "()");
        assert_eq!(fmt(&TreeNode::new("a")), "(a)");
        assert_eq!(fmt(&TreeNode::new("a").with_branch(b("/", Atom::Null))), "(a / )");
        assert_eq!(fmt(&TreeNode::new("a").with_branch(b("/", ""))), "(a / )");
        assert_eq!(fmt(&TreeNode::new("a").with_concept("alpha")), "(a / alpha)");
        assert_eq!(
            format_tree(
                &TreeNode::new("a").with_branch(b("/", Atom::Null)).with_branch(b("ARG", "b")),
                &FormatOptions::single_line()
            ),
            "(a / :ARG b)"
        );
        assert_eq!(fmt(&TreeNode::new("a").with_branch(b("", "b"))), "(a : b)");
        assert_eq!(fmt(&TreeNode::new("a").with_branch(b(":", "b"))), "(a : b)");
        assert_eq!(
            fmt(&TreeNode::new("a").with_branch(Branch::node("", TreeNode::new("b")))),
            "(a : (b))"
        );
        assert_eq!(fmt(&TreeNode::new("a").with_branch(b("ARG-of", "b"))), "(a :ARG-of b)");
        assert_eq!(fmt(&TreeNode::new("a").with_branch(b(":ARG-of", "b"))), "(a :ARG-of b)");
    }

    #[test]
    fn test_format_alignments() {
        let tree = TreeNode::new("a").with_branch(
            b("ARG", "b")
                .with_epidatum(Epidatum::RoleAlignment(AlignmentMarker::new([1])))
                .with_epidatum(Epidatum::Alignment(AlignmentMarker::new([2]))),
        );
        assert_eq!(fmt(&tree), "(a :ARG~1 b~2)");
    }

    #[test]
    fn test_layout_hints_are_not_rendered() {
        let tree = TreeNode::new("a").with_branch(
            Branch::node("ARG", TreeNode::new("b"))
                .with_epidatum(Epidatum::Push("b".into()))
                .with_epidatum(Epidatum::Pop),
        );
        assert_eq!(fmt(&tree), "(a :ARG (b))");
    }

    #[test]
    fn test_indent_styles() {
        let tree = alpha_beta();
        assert_eq!(format_tree(&tree, &FormatOptions::single_line()), "(a / alpha :ARG (b / beta))");
        assert_eq!(fmt(&tree), "(a / alpha\n   :ARG (b / beta))");
        assert_eq!(
            format_tree(&tree, &FormatOptions::new(Indent::Fixed(6), false)),
            "(a / alpha\n      :ARG (b / beta))"
        );
    }

    #[test]
    fn test_nested_indentation() {
        let tree = TreeNode::new("a").with_concept("aaa").with_branch(Branch::node(
            "ARG1",
            TreeNode::new("b")
                .with_concept("bbb")
                .with_branch(Branch::node("ARG1", TreeNode::new("c").with_concept("ccc"))),
        ));
        assert_eq!(
            fmt(&tree),
            "(a / aaa\n   :ARG1 (b / bbb\n            :ARG1 (c / ccc)))"
        );
        assert_eq!(
            format_tree(&tree, &FormatOptions::new(Indent::Fixed(0), false)),
            "(a / aaa\n:ARG1 (b / bbb\n:ARG1 (c / ccc)))"
        );
        assert_eq!(
            format_tree(&tree, &FormatOptions::new(Indent::Fixed(2), false)),
            "(a / aaa\n  :ARG1 (b / bbb\n    :ARG1 (c / ccc)))"
        );
    }

    #[test]
    fn test_compact_attributes() {
        let tree = TreeNode::new("a")
            .with_concept("alpha")
            .with_branch(b("polarity", "-"))
            .with_branch(Branch::node("ARG", TreeNode::new("b").with_concept("beta")));
        assert_eq!(fmt(&tree), "(a / alpha\n   :polarity -\n   :ARG (b / beta))");
        assert_eq!(
            format_tree(&tree, &FormatOptions::new(Indent::Adaptive, true)),
            "(a / alpha :polarity -\n   :ARG (b / beta))"
        );

        let tree = tree.with_branch(b("mode", "expressive"));
        assert_eq!(
            format_tree(&tree, &FormatOptions::new(Indent::Adaptive, true)),
            "(a / alpha :polarity -\n   :ARG (b / beta)\n   :mode expressive)"
        );
    }

    #[test]
    fn test_indent_from_width() {
        assert_eq!(Indent::from_width(None), Indent::None);
        assert_eq!(Indent::from_width(Some(-1)), Indent::Adaptive);
        assert_eq!(Indent::from_width(Some(4)), Indent::Fixed(4));
    }
}
