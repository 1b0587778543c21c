//! Triple-conjunction notation: `instance(a, alpha) ^ ARG0(a, b)`.
//!
//! A flat, layout-free rendering of a graph. Consecutive triples joined
//! by `^` belong to one graph; a triple that follows another without `^`
//! starts the next graph.

use crate::codec::CodecConfig;
use crate::model::{Atom, Graph, Triple};
use crate::DecodeError;

/// Render a graph as a conjunction of triples, one per line.
///
/// When both `top_role` and `top_variable` are configured the top is
/// written first as `top_role(top_variable, top)`.
pub fn format_triples(graph: &Graph, config: &CodecConfig) -> String {
    let mut parts = Vec::with_capacity(graph.len() + 1);
    if let (Some(role), Some(var), Some(top)) =
        (config.top_role.as_deref(), config.top_variable.as_deref(), graph.top())
    {
        parts.push(format!("{role}({var}, {top})"));
    }
    for triple in graph.triples() {
        parts.push(format!("{}({}, {})", triple.role, triple.source, triple.target));
    }
    parts.join(" ^\n")
}

/// Parse one or more conjunctions of triples.
pub fn parse_triples(text: &str, config: &CodecConfig) -> Result<Vec<Graph>, DecodeError> {
    let mut scanner = Scanner { input: text, pos: 0 };
    let mut graphs = Vec::new();
    let mut current: Vec<Triple> = Vec::new();

    loop {
        scanner.skip_trivia();
        if scanner.at_end() {
            break;
        }
        current.push(scanner.triple()?);
        scanner.skip_trivia();
        if !scanner.eat('^') {
            graphs.push(conjunction_to_graph(std::mem::take(&mut current), config));
        }
    }
    if !current.is_empty() {
        // a dangling `^` at the end of input
        return Err(DecodeError::at(text, text.len(), "expected a triple after '^'"));
    }
    Ok(graphs)
}

fn conjunction_to_graph(triples: Vec<Triple>, config: &CodecConfig) -> Graph {
    let is_top = |t: &Triple| {
        config.top_role.as_deref() == Some(t.role.as_str())
            && config.top_variable.as_deref() == Some(t.source.as_str())
    };
    let top = triples.iter().find(|t| is_top(t)).map(|t| t.target.to_string());
    let triples: Vec<Triple> = triples.into_iter().filter(|t| !is_top(t)).collect();
    let graph = Graph::new(triples);
    match top {
        Some(top) => graph.with_top(top),
        None => graph,
    }
}

struct Scanner<'s> {
    input: &'s str,
    pos: usize,
}

impl<'s> Scanner<'s> {
    fn rest(&self) -> &'s str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn error(&self, msg: impl Into<String>) -> DecodeError {
        DecodeError::at(self.input, self.pos, msg)
    }

    /// Skip whitespace and `#` comments.
    fn skip_trivia(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();
            if trimmed.starts_with('#') {
                self.pos += trimmed.find('\n').unwrap_or(trimmed.len());
            } else {
                break;
            }
        }
    }

    fn eat(&mut self, c: char) -> bool {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), DecodeError> {
        self.skip_trivia();
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{c}'")))
        }
    }

    /// A bare word or a quoted string (possibly empty).
    fn word(&mut self) -> Result<&'s str, DecodeError> {
        self.skip_trivia();
        let rest = self.rest();
        let len = if rest.starts_with('"') {
            let mut escaped = false;
            let close = rest
                .char_indices()
                .skip(1)
                .find(|&(_, c)| {
                    let done = c == '"' && !escaped;
                    escaped = c == '\\' && !escaped;
                    done
                })
                .map(|(i, _)| i);
            match close {
                Some(i) => i + 1,
                None => return Err(self.error("unterminated string literal")),
            }
        } else {
            rest.find(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | ',' | '^'))
                .unwrap_or(rest.len())
        };
        self.pos += len;
        Ok(&rest[..len])
    }

    fn triple(&mut self) -> Result<Triple, DecodeError> {
        let role = self.word()?;
        self.expect('(')?;
        let source = self.word()?;
        if source.is_empty() {
            return Err(self.error("expected a source"));
        }
        self.expect(',')?;
        let target = self.word()?;
        self.expect(')')?;
        Ok(Triple::new(source, role, Atom::from_token(target)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn top_config() -> CodecConfig {
        CodecConfig {
            instance_role: "test".into(),
            top_variable: Some("TOP".into()),
            top_role: Some("top".into()),
            ..CodecConfig::default()
        }
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_triples("", &CodecConfig::default()).unwrap().is_empty());
        assert!(parse_triples("# only a comment", &CodecConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn test_conjunction_splitting() {
        let cfg = CodecConfig::default();
        assert_eq!(parse_triples("instance(a, alpha)", &cfg).unwrap().len(), 1);
        let gs = parse_triples("instance(a, alpha)ARG(a, b)", &cfg).unwrap();
        assert_eq!(gs.len(), 2);
        assert_eq!(gs[0].triples(), &[Triple::new("a", "instance", "alpha")]);
        assert_eq!(gs[1].triples(), &[Triple::new("a", "ARG", "b")]);

        let gs = parse_triples("instance(a, alpha)^ARG(a, b)", &cfg).unwrap();
        assert_eq!(gs.len(), 1);
        assert_eq!(gs[0].len(), 2);
    }

    #[test]
    fn test_atom_sources_and_targets() {
        let cfg = CodecConfig::default();
        let gs = parse_triples(r#"string(a, "alpha beta") ^ quant(a, 1.5)"#, &cfg).unwrap();
        assert_eq!(gs[0].triples()[0].target, Atom::StringLiteral("\"alpha beta\"".into()));
        assert_eq!(gs[0].triples()[1].target, Atom::Float(1.5));
        let gs = parse_triples("instance(a, )", &cfg).unwrap();
        assert_eq!(gs[0].triples()[0].target, Atom::Null);
    }

    #[test]
    fn test_top_triple() {
        let gs = parse_triples("test(a, alpha)^test(b, beta)^ARG(a, b)^top(TOP, b)", &top_config()).unwrap();
        assert_eq!(gs.len(), 1);
        assert_eq!(gs[0].len(), 3);
        assert_eq!(gs[0].top(), Some("b"));

        let gs = parse_triples("test(a, alpha)^ARG(a, b)", &top_config()).unwrap();
        assert_eq!(gs[0].top(), Some("a"));
    }

    #[test]
    fn test_format() {
        let cfg = CodecConfig::default();
        let g = Graph::new([("a", "instance", Atom::Null), ("a", "ARG", Atom::symbol("b"))]);
        assert_eq!(format_triples(&g, &cfg), "instance(a, ) ^\nARG(a, b)");
        let g = Graph::new([("a", "ARG", "b")]);
        assert_eq!(format_triples(&g, &top_config()), "top(TOP, a) ^\nARG(a, b)");
    }

    #[test]
    fn test_errors() {
        let cfg = CodecConfig::default();
        assert!(parse_triples("instance(a alpha)", &cfg).is_err());
        assert!(parse_triples("instance(a, alpha) ^", &cfg).is_err());
        assert!(parse_triples("instance(, alpha)", &cfg).is_err());
        assert!(parse_triples("instance(a, \"alpha)", &cfg).is_err());
    }
}
