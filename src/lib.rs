//! # penman: PENMAN Graph Notation Codec
//!
//! Reads and writes the parenthesized PENMAN notation used for semantic
//! graphs (e.g. Abstract Meaning Representation), and converts between
//! its tree form and a flat, reentrant triple graph.
//!
//! ## Design Principles
//!
//! 1. **Parser owns nothing**: text → tree is a pure function
//! 2. **Clean DTOs**: `TreeNode`, `Graph`, `Triple`, `Atom` cross all boundaries
//! 3. **Layout is separate**: tree ↔ graph conversion knows nothing about text
//! 4. **Explicit configuration**: role names and limits live in `CodecConfig`
//!
//! ## Quick Start
//!
//! ```rust
//! use penman::{FormatOptions, Triple};
//!
//! let graph = penman::decode("(b / boy :ARG0-of (w / want-01))")?;
//! assert!(graph.triples().contains(&Triple::new("w", "ARG0", "b")));
//!
//! let text = penman::encode(&graph, Some("w"), &FormatOptions::single_line())?;
//! assert_eq!(text, "(w / want-01 :ARG0 (b / boy))");
//! # Ok::<(), penman::Error>(())
//! ```
//!
//! ## Pipeline
//!
//! | Stage | Module | Direction |
//! |-------|--------|-----------|
//! | Lex + parse | `notation` | text → `TreeNode` |
//! | Interpret | `layout` | `TreeNode` → `Graph` |
//! | Configure | `layout` | `Graph` → `TreeNode` |
//! | Format | `notation` | `TreeNode` → text |

use std::fmt;

// ============================================================================
// Modules
// ============================================================================

pub mod codec;
pub mod layout;
pub mod model;
pub mod notation;
pub mod surface;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    AlignmentMarker, Atom, Branch, BranchTarget, Epidatum, Graph, TreeNode, Triple, Variable,
};

// ============================================================================
// Re-exports: Codec
// ============================================================================

pub use codec::{CodecConfig, GraphStream, PenmanCodec};
pub use layout::{graph_to_tree, tree_to_graph};
pub use notation::{FormatOptions, Indent};
pub use surface::{alignments, role_alignments};

// ============================================================================
// Convenience entry points (default configuration)
// ============================================================================

/// Parse PENMAN text into a tree.
pub fn parse(text: &str) -> Result<TreeNode> {
    PenmanCodec::default().parse(text)
}

/// Format a tree as PENMAN text.
pub fn format(tree: &TreeNode, options: &FormatOptions) -> String {
    PenmanCodec::default().format(tree, options)
}

/// Decode PENMAN text into a graph.
pub fn decode(text: &str) -> Result<Graph> {
    PenmanCodec::default().decode(text)
}

/// Encode a graph as PENMAN text, optionally rooted at `top`.
pub fn encode(graph: &Graph, top: Option<&str>, options: &FormatOptions) -> Result<String> {
    PenmanCodec::default().encode(graph, top, options)
}

/// Decode every graph in a text.
pub fn loads(text: &str) -> Result<Vec<Graph>> {
    PenmanCodec::default().loads(text)
}

/// Encode graphs separated by blank lines.
pub fn dumps(graphs: &[Graph], options: &FormatOptions) -> Result<String> {
    PenmanCodec::default().dumps(graphs, options)
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Malformed notation, with enough position data for a caret diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub message: String,
    pub filename: Option<String>,
    /// 1-based.
    pub lineno: Option<usize>,
    /// 0-based column, in characters.
    pub offset: Option<usize>,
    /// The offending line.
    pub text: Option<String>,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), filename: None, lineno: None, offset: None, text: None }
    }

    /// An error at byte position `pos` of `input`.
    pub fn at(input: &str, pos: usize, message: impl Into<String>) -> Self {
        let pos = pos.min(input.len());
        let line_start = input[..pos].rfind('\n').map_or(0, |i| i + 1);
        let line_end = input[pos..].find('\n').map_or(input.len(), |i| pos + i);
        Self {
            message: message.into(),
            filename: None,
            lineno: Some(input[..line_start].matches('\n').count() + 1),
            offset: Some(input[line_start..pos].chars().count()),
            text: Some(input[line_start..line_end].trim_end_matches('\r').to_string()),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  File \"{}\"", self.filename.as_deref().unwrap_or("<string>"))?;
        if let Some(lineno) = self.lineno {
            write!(f, ", line {lineno}")?;
        }
        match (&self.text, self.offset) {
            (Some(text), offset) => {
                write!(f, "\n    {text}")?;
                if let Some(offset) = offset {
                    write!(f, "\n    {}^", " ".repeat(offset))?;
                }
            }
            (None, Some(offset)) => write!(f, ", character {offset}")?,
            (None, None) => {}
        }
        write!(f, "\nDecodeError: {}", self.message)
    }
}

impl std::error::Error for DecodeError {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_error_position() {
        let err = DecodeError::at("(a\n  :ARG b c)", 12, "expected a role or ')'");
        assert_eq!(err.lineno, Some(2));
        assert_eq!(err.offset, Some(9));
        assert_eq!(err.text.as_deref(), Some("  :ARG b c)"));
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::at("(a b)", 3, "expected a role or ')', got 'b'").with_filename("x.penman");
        assert_eq!(
            err.to_string(),
            "  File \"x.penman\", line 1\n    (a b)\n       ^\nDecodeError: expected a role or ')', got 'b'"
        );
        let bare = DecodeError { offset: Some(4), ..DecodeError::new("oops") };
        assert_eq!(bare.to_string(), "  File \"<string>\", character 4\nDecodeError: oops");
    }

    #[test]
    fn test_error_wraps_decode_error() {
        let err = decode("(a").unwrap_err();
        assert!(matches!(err, Error::Decode(ref e) if e.lineno == Some(1)));
        assert!(err.to_string().contains("DecodeError:"));
    }
}
