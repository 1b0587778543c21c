//! # Graph and Tree Model
//!
//! Plain data shared by every stage of the codec: the atoms and triples
//! of the graph form, the epidata riding along with them, and the tree
//! form produced by the parser.
//!
//! Design rule: pure data. No I/O, no state, no layout decisions here.

pub mod atom;
pub mod epigraph;
pub mod graph;
pub mod role;
pub mod tree;
pub mod triple;

pub use atom::Atom;
pub use epigraph::{AlignmentMarker, EpiMode, Epidatum};
pub use graph::{Graph, INSTANCE_ROLE};
pub use role::{invert_role, is_inverted, normalize_role, surface_role, INVERSE_SUFFIX};
pub use tree::{Branch, BranchTarget, TreeNode, CONCEPT_ROLE};
pub use triple::{Triple, Variable};
