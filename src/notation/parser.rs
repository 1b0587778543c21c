//! PENMAN recursive descent parser.
//!
//! Parses token streams into [`TreeNode`]s:
//!
//! ```text
//! node   := "(" [ variable [ "/" concept? ] branch* ] ")"
//! branch := role alignment? target?
//! target := (symbol | string) alignment? | node
//! ```
//!
//! Missing targets become `Atom::Null`. Nesting is bounded by
//! `max_depth`; deeper input is a decode error, not a stack overflow.

use super::lexer::{Token, TokenKind};
use crate::model::{AlignmentMarker, Atom, Branch, BranchTarget, Epidatum, TreeNode, CONCEPT_ROLE};
use crate::DecodeError;

/// Parser state: a token slice and a cursor.
pub(crate) struct Parser<'t> {
    tokens: &'t [Token],
    input: &'t str,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(tokens: &'t [Token], input: &'t str, max_depth: usize) -> Self {
        Self { tokens, input, pos: 0, depth: 0, max_depth }
    }

    fn peek(&self) -> &'t Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn advance(&mut self) -> &'t Token {
        let tok = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<&'t Token, DecodeError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn error(&self, msg: impl Into<String>) -> DecodeError {
        DecodeError::at(self.input, self.peek().span.start, msg)
    }

    fn unexpected(&self, what: &str) -> DecodeError {
        let tok = self.peek();
        if tok.kind == TokenKind::Eof {
            self.error(format!("unexpected end of input; expected {what}"))
        } else {
            self.error(format!("expected {what}, got '{}'", tok.text))
        }
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Parse exactly one node from the token stream.
pub fn parse_tree(tokens: &[Token], input: &str, max_depth: usize) -> Result<TreeNode, DecodeError> {
    let mut p = Parser::new(tokens, input, max_depth);
    let node = parse_node(&mut p)?;
    if !p.at_eof() {
        return Err(p.unexpected("end of input"));
    }
    Ok(node)
}

/// Parse a node starting at the current `(`.
pub(crate) fn parse_node(p: &mut Parser) -> Result<TreeNode, DecodeError> {
    p.depth += 1;
    if p.depth > p.max_depth {
        return Err(p.error(format!("nesting exceeds the maximum depth of {}", p.max_depth)));
    }
    p.expect(TokenKind::LParen, "'('")?;

    if p.at(TokenKind::RParen) {
        p.advance();
        p.depth -= 1;
        return Ok(TreeNode::anonymous());
    }

    let var = parse_variable(p)?;
    let mut branches = Vec::new();

    if p.at(TokenKind::Slash) {
        branches.push(parse_concept(p)?);
    }

    loop {
        match p.peek_kind() {
            TokenKind::Role => branches.push(parse_branch(p)?),
            TokenKind::RParen => {
                p.advance();
                break;
            }
            TokenKind::Slash => return Err(p.error("concept must be the first branch of a node")),
            _ => return Err(p.unexpected("a role or ')'")),
        }
    }

    p.depth -= 1;
    Ok(TreeNode { var: Some(var), branches })
}

// ============================================================================
// Node parts
// ============================================================================

fn parse_variable(p: &mut Parser) -> Result<String, DecodeError> {
    let tok = p.peek();
    if tok.kind != TokenKind::Symbol {
        return Err(p.unexpected("a variable"));
    }
    if !matches!(Atom::from_token(&tok.text), Atom::Symbol(_)) {
        return Err(p.error(format!("invalid variable '{}'", tok.text)));
    }
    p.advance();
    Ok(tok.text.clone())
}

fn parse_concept(p: &mut Parser) -> Result<Branch, DecodeError> {
    p.expect(TokenKind::Slash, "'/'")?;
    let mut epidata = Vec::new();
    if p.at(TokenKind::Alignment) {
        epidata.push(Epidatum::RoleAlignment(parse_alignment(p)?));
    }
    let concept = match p.peek_kind() {
        TokenKind::Symbol | TokenKind::String => parse_atom(p, &mut epidata)?,
        TokenKind::Role | TokenKind::RParen => Atom::Null,
        TokenKind::LParen => return Err(p.error("a concept cannot be a node")),
        _ => return Err(p.unexpected("a concept")),
    };
    Ok(Branch { role: CONCEPT_ROLE.to_string(), target: BranchTarget::Atom(concept), epidata })
}

fn parse_branch(p: &mut Parser) -> Result<Branch, DecodeError> {
    let role = p.expect(TokenKind::Role, "a role")?.text.clone();
    let mut epidata = Vec::new();
    if p.at(TokenKind::Alignment) {
        epidata.push(Epidatum::RoleAlignment(parse_alignment(p)?));
    }
    let target = match p.peek_kind() {
        TokenKind::LParen => BranchTarget::Node(Box::new(parse_node(p)?)),
        TokenKind::Symbol | TokenKind::String => BranchTarget::Atom(parse_atom(p, &mut epidata)?),
        TokenKind::Role | TokenKind::RParen => BranchTarget::Atom(Atom::Null),
        _ => return Err(p.unexpected("a target")),
    };
    Ok(Branch { role, target, epidata })
}

/// A symbol or string, plus a trailing alignment if present.
fn parse_atom(p: &mut Parser, epidata: &mut Vec<Epidatum>) -> Result<Atom, DecodeError> {
    let atom = Atom::from_token(&p.advance().text);
    if p.at(TokenKind::Alignment) {
        epidata.push(Epidatum::Alignment(parse_alignment(p)?));
    }
    Ok(atom)
}

fn parse_alignment(p: &mut Parser) -> Result<AlignmentMarker, DecodeError> {
    let tok = p.peek();
    match AlignmentMarker::parse(&tok.text) {
        Some(marker) => {
            p.advance();
            Ok(marker)
        }
        None => Err(p.error(format!("invalid alignment '{}'", tok.text))),
    }
}

// ============================================================================
// Tests
// ============================================================================
