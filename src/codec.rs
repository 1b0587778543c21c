//! # Codec
//!
//! `PenmanCodec` bundles a [`CodecConfig`] with the parse → interpret and
//! configure → format pipelines, plus helpers for texts and readers that
//! hold many graphs.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::{graph_to_tree, tree_to_graph};
use crate::model::{Graph, TreeNode, INSTANCE_ROLE};
use crate::notation::lexer::{Lexer, Span, Token, TokenKind};
use crate::notation::parser::{parse_node, Parser};
use crate::notation::{self, format_tree, FormatOptions};
use crate::{Error, Result};

// ============================================================================
// Configuration
// ============================================================================

/// Role names and limits used by a codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Graph role for `/` concept branches.
    pub instance_role: String,
    /// Graph role for a bare `:` role.
    pub anonymous_role: String,
    /// Pseudo-variable of the top triple in triple-conjunction notation.
    pub top_variable: Option<String>,
    /// Role of the top triple in triple-conjunction notation.
    pub top_role: Option<String>,
    /// Maximum node nesting accepted by the parser and the layout.
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            instance_role: INSTANCE_ROLE.to_string(),
            anonymous_role: String::new(),
            top_variable: None,
            top_role: None,
            max_depth: 256,
        }
    }
}

// ============================================================================
// Codec
// ============================================================================

/// A configured PENMAN encoder/decoder.
#[derive(Debug, Clone, Default)]
pub struct PenmanCodec {
    config: CodecConfig,
}

impl PenmanCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Parse text holding one node into a tree.
    pub fn parse(&self, text: &str) -> Result<TreeNode> {
        Ok(notation::parse(text, self.config.max_depth)?)
    }

    pub fn format(&self, tree: &TreeNode, options: &FormatOptions) -> String {
        format_tree(tree, options)
    }

    /// Decode text holding one graph.
    pub fn decode(&self, text: &str) -> Result<Graph> {
        let tree = self.parse(text)?;
        tree_to_graph(&tree, &self.config)
    }

    /// Encode a graph, rooted at `top` if given.
    pub fn encode(&self, graph: &Graph, top: Option<&str>, options: &FormatOptions) -> Result<String> {
        let tree = graph_to_tree(graph, top, &self.config)?;
        Ok(self.format(&tree, options))
    }

    /// Decode graphs one at a time from a text that may hold several,
    /// with comments or free text between them.
    ///
    /// Text is tokenized one graph at a time. A graph that fails to
    /// decode yields an error and the stream moves on to the next one;
    /// an unterminated string or unbalanced parentheses run to the end of
    /// the input and so end the stream.
    pub fn iterdecode<'c, 's>(&'c self, text: &'s str) -> GraphStream<'c, 's> {
        GraphStream { codec: self, input: text, lexer: Lexer::new(text), count: 0, done: false }
    }

    /// Decode every graph in a text.
    pub fn loads(&self, text: &str) -> Result<Vec<Graph>> {
        self.iterdecode(text).collect()
    }

    /// Encode graphs separated by blank lines.
    pub fn dumps(&self, graphs: &[Graph], options: &FormatOptions) -> Result<String> {
        let encoded = graphs
            .iter()
            .map(|g| self.encode(g, None, options))
            .collect::<Result<Vec<_>>>()?;
        debug!(graphs = encoded.len(), "encoded graphs");
        Ok(encoded.join("\n\n"))
    }

    /// Decode every graph from a reader.
    pub fn load(&self, mut reader: impl Read) -> Result<Vec<Graph>> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.loads(&text)
    }

    /// Decode every graph in a file; decode errors name the file.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Vec<Graph>> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        self.loads(&text).map_err(|e| match e {
            Error::Decode(e) => Error::Decode(e.with_filename(path.display().to_string())),
            other => other,
        })
    }

    /// Encode graphs to a writer, followed by a newline.
    pub fn dump(&self, graphs: &[Graph], mut writer: impl Write, options: &FormatOptions) -> Result<()> {
        let text = self.dumps(graphs, options)?;
        writer.write_all(text.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    /// Decode triple-conjunction notation.
    pub fn decode_triples(&self, text: &str) -> Result<Vec<Graph>> {
        Ok(notation::parse_triples(text, &self.config)?)
    }

    /// Encode a graph in triple-conjunction notation.
    pub fn encode_triples(&self, graph: &Graph) -> String {
        notation::format_triples(graph, &self.config)
    }
}

// ============================================================================
// Streams
// ============================================================================

/// Iterator over the graphs of a multi-graph text. See
/// [`PenmanCodec::iterdecode`].
pub struct GraphStream<'c, 's> {
    codec: &'c PenmanCodec,
    input: &'s str,
    lexer: Lexer<'s>,
    count: usize,
    done: bool,
}

impl GraphStream<'_, '_> {
    /// Tokens of the next top-level node, from its `(` to the matching
    /// `)` (or end of input), closed with an `Eof`. `None` when no node
    /// remains.
    fn next_unit(&mut self) -> std::result::Result<Option<Vec<Token>>, crate::DecodeError> {
        let first = loop {
            let token = self.lexer.next_token()?;
            match token.kind {
                TokenKind::LParen => break token,
                TokenKind::Eof => return Ok(None),
                _ => {}
            }
        };

        let mut depth = 1usize;
        let mut end = first.span.end;
        let mut tokens = vec![first];
        while depth > 0 {
            let token = self.lexer.next_token()?;
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                TokenKind::Eof => break,
                _ => {}
            }
            end = token.span.end;
            tokens.push(token);
        }
        tokens.push(Token { kind: TokenKind::Eof, span: Span { start: end, end }, text: String::new() });
        Ok(Some(tokens))
    }
}

impl Iterator for GraphStream<'_, '_> {
    type Item = Result<Graph>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let tokens = match self.next_unit() {
            Ok(Some(tokens)) => tokens,
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };
        self.count += 1;

        let mut parser = Parser::new(&tokens, self.input, self.codec.config.max_depth);
        let tree = match parse_node(&mut parser) {
            Ok(tree) => tree,
            Err(e) => {
                debug!(index = self.count, "skipping graph that failed to parse");
                return Some(Err(e.into()));
            }
        };

        let graph = tree_to_graph(&tree, &self.codec.config);
        if let Ok(g) = &graph {
            debug!(index = self.count, triples = g.len(), "decoded graph");
        }
        Some(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Triple;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let cfg = CodecConfig::default();
        assert_eq!(cfg.instance_role, "instance");
        assert_eq!(cfg.anonymous_role, "");
        assert_eq!(cfg.max_depth, 256);
    }

    #[test]
    fn test_custom_roles() {
        let codec = PenmanCodec::new(CodecConfig {
            instance_role: "test".into(),
            anonymous_role: "unlabeled".into(),
            ..CodecConfig::default()
        });
        let g = codec.decode("(a / alpha : b)").unwrap();
        assert_eq!(g.triples(), &[Triple::new("a", "test", "alpha"), Triple::new("a", "unlabeled", "b")]);
        assert_eq!(
            codec.encode(&g, None, &FormatOptions::single_line()).unwrap(),
            "(a / alpha :unlabeled b)"
        );
    }

    #[test]
    fn test_iterdecode_skips_free_text() {
        let codec = PenmanCodec::default();
        let text = "# ::id 1\n(a / alpha)\nsome text, then (g / graph :quant (a / another))\n";
        let graphs: Vec<Graph> = codec.iterdecode(text).collect::<Result<_>>().unwrap();
        assert_eq!(graphs.len(), 2);
        assert_eq!(graphs[1].top(), Some("g"));
    }

    #[test]
    fn test_iterdecode_error_ends_only_its_graph() {
        let codec = PenmanCodec::default();
        let results: Vec<_> = codec.iterdecode("(a / alpha) (b / beta (c)) (d / delta)").collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::Decode(_))));
        assert_eq!(results[2].as_ref().unwrap().top(), Some("d"));
        assert!(codec.loads("(a / alpha) (b / beta (c))").is_err());
    }

    #[test]
    fn test_iterdecode_keeps_graphs_before_lex_error() {
        let codec = PenmanCodec::default();
        let results: Vec<_> = codec.iterdecode("(a / alpha) (b / beta) (c :x \"oops)").collect();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().top(), Some("a"));
        assert_eq!(results[1].as_ref().unwrap().top(), Some("b"));
        let Err(Error::Decode(err)) = &results[2] else { panic!("Expected decode error") };
        assert!(err.message.contains("unterminated string"));
        assert_eq!(err.offset, Some(29));
    }

    #[test]
    fn test_iterdecode_unbalanced_tail() {
        let codec = PenmanCodec::default();
        let results: Vec<_> = codec.iterdecode("(a / alpha) (b / beta").collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(&results[1], Err(Error::Decode(e)) if e.message.contains("end of input")));
    }

    #[test]
    fn test_dumps_and_dump() {
        let codec = PenmanCodec::default();
        let graphs = codec.loads("(a / alpha) (b / beta)").unwrap();
        let opts = FormatOptions::default();
        assert_eq!(codec.dumps(&graphs, &opts).unwrap(), "(a / alpha)\n\n(b / beta)");
        let mut out = Vec::new();
        codec.dump(&graphs, &mut out, &opts).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "(a / alpha)\n\n(b / beta)\n");
        assert_eq!(codec.load("(a / alpha)".as_bytes()).unwrap().len(), 1);
    }

    #[test]
    fn test_triples_round_trip() {
        let codec = PenmanCodec::default();
        let g = codec.decode("(a / alpha :ARG0 (b / beta))").unwrap();
        let text = codec.encode_triples(&g);
        assert_eq!(text, "instance(a, alpha) ^\nARG0(a, b) ^\ninstance(b, beta)");
        assert_eq!(codec.decode_triples(&text).unwrap(), vec![g]);
    }
}
