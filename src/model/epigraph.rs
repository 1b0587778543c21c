//! Epigraph: surface data riding along with triples.
//!
//! Epidata never take part in graph identity. They carry token alignments
//! and the tree-layout hints needed to reproduce a tree after a trip
//! through the triple form.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::Variable;

/// Token indices plus an optional prefix, rendered `~prefix1,2`.
///
/// The prefix keeps its trailing dot (`~e.3` has prefix `e.`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlignmentMarker {
    pub indices: SmallVec<[usize; 4]>,
    pub prefix: Option<String>,
}

impl AlignmentMarker {
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        Self { indices: indices.into_iter().collect(), prefix: None }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Parse `~e.3`, `~1,2` or `~e.3.4`. Returns `None` on anything else.
    pub fn parse(text: &str) -> Option<Self> {
        let body = text.strip_prefix('~')?;
        let split = body.find(|c: char| c.is_ascii_digit())?;
        let (prefix, digits) = body.split_at(split);
        let mut indices = SmallVec::new();
        for group in digits.split([',', '.']) {
            indices.push(group.parse::<usize>().ok()?);
        }
        Some(Self {
            indices,
            prefix: (!prefix.is_empty()).then(|| prefix.to_owned()),
        })
    }
}

impl fmt::Display for AlignmentMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~{}", self.prefix.as_deref().unwrap_or(""))?;
        for (i, index) in self.indices.iter().enumerate() {
            if i > 0 { f.write_str(",")?; }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

/// What part of the surface form an epidatum describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EpiMode {
    /// Tree-layout hint, never rendered.
    Layout,
    /// Follows the role token.
    Role,
    /// Follows the target token.
    Target,
}

/// One piece of surface data attached to a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Epidatum {
    /// The named variable's node is expanded inline at this triple.
    Push(Variable),
    /// The most recently pushed node closes after this triple.
    Pop,
    /// Token alignment of the target (a concept or attribute value).
    Alignment(AlignmentMarker),
    /// Token alignment of the role.
    RoleAlignment(AlignmentMarker),
}

impl Epidatum {
    pub fn mode(&self) -> EpiMode {
        match self {
            Epidatum::Push(_) | Epidatum::Pop => EpiMode::Layout,
            Epidatum::RoleAlignment(_) => EpiMode::Role,
            Epidatum::Alignment(_) => EpiMode::Target,
        }
    }

    pub fn is_layout(&self) -> bool {
        self.mode() == EpiMode::Layout
    }

    /// The variable of a `Push`.
    pub fn pushed(&self) -> Option<&str> {
        match self {
            Epidatum::Push(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Epidatum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Epidatum::Push(v) => write!(f, "push({v})"),
            Epidatum::Pop => f.write_str("pop"),
            Epidatum::Alignment(a) | Epidatum::RoleAlignment(a) => write!(f, "{a}"),
        }
    }
}
