//! # PENMAN Notation
//!
//! Text ↔ tree. Pure functions with no graph semantics and no I/O.

pub mod format;
pub mod lexer;
pub mod parser;
pub mod triples;

pub use format::{format_tree, FormatOptions, Indent};
pub use triples::{format_triples, parse_triples};

use crate::model::TreeNode;
use crate::DecodeError;

/// Parse PENMAN text holding exactly one node into a tree.
pub fn parse(text: &str, max_depth: usize) -> Result<TreeNode, DecodeError> {
    let tokens = lexer::tokenize(text)?;
    parser::parse_tree(&tokens, text, max_depth)
}
