//! # Layout
//!
//! Conversion between the tree form (one parent per node, ordered) and
//! the graph form (reentrant, flat triples). Tree → graph is
//! interpretation; graph → tree is configuration.

pub mod configure;
pub mod interpret;

pub use configure::graph_to_tree;
pub use interpret::tree_to_graph;
