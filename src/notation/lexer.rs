//! PENMAN lexer: notation text to tokens.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::DecodeError;

/// A token from the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

/// Source span (byte offsets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    /// `/`, the concept role
    Slash,
    /// `:name`, or a bare `:` for the anonymous role
    Role,
    /// Bare word: variable, concept, number or other constant
    Symbol,
    /// Double-quoted string, quotes included in `text`
    String,
    /// `~e.1,2`
    Alignment,
    Eof,
}

/// Characters that end a symbol, role or alignment token. A `"` only
/// opens a string at the start of a token; inside a word it is literal.
pub fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '/' | ':' | '~')
}

/// Tokenize PENMAN text.
///
/// `#` starting a token opens a comment that runs to the end of the line.
pub fn tokenize(input: &str) -> Result<Vec<Token>, DecodeError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let eof = token.kind == TokenKind::Eof;
        tokens.push(token);
        if eof {
            return Ok(tokens);
        }
    }
}

/// On-demand tokenizer. Yields `Eof` once the input is exhausted.
pub struct Lexer<'s> {
    input: &'s str,
    chars: Peekable<CharIndices<'s>>,
}

impl<'s> Lexer<'s> {
    pub fn new(input: &'s str) -> Self {
        Self { input, chars: input.char_indices().peekable() }
    }

    pub fn next_token(&mut self) -> Result<Token, DecodeError> {
        let input = self.input;
        let chars = &mut self.chars;

        while let Some(&(pos, ch)) = chars.peek() {
            match ch {
                // Skip whitespace
                c if c.is_whitespace() => { chars.next(); }

                // Skip comments
                '#' => {
                    while chars.peek().is_some_and(|&(_, c)| c != '\n') {
                        chars.next();
                    }
                }

                // String literals, kept verbatim
                '"' => {
                    chars.next(); // consume opening quote
                    loop {
                        match chars.next() {
                            Some((_, '\\')) => { chars.next(); }
                            Some((end, '"')) => {
                                return Ok(Token {
                                    kind: TokenKind::String,
                                    span: Span { start: pos, end: end + 1 },
                                    text: input[pos..=end].to_string(),
                                });
                            }
                            Some(_) => {}
                            None => {
                                return Err(DecodeError::at(input, pos, "unterminated string literal"));
                            }
                        }
                    }
                }

                '(' => { chars.next(); return Ok(punct(TokenKind::LParen, pos, "(")); }
                ')' => { chars.next(); return Ok(punct(TokenKind::RParen, pos, ")")); }
                '/' => { chars.next(); return Ok(punct(TokenKind::Slash, pos, "/")); }

                // Roles and alignments: a sigil plus a (possibly empty) word
                ':' | '~' => {
                    chars.next();
                    let end = scan_word(chars, pos + 1);
                    let kind = if ch == ':' { TokenKind::Role } else { TokenKind::Alignment };
                    return Ok(Token {
                        kind,
                        span: Span { start: pos, end },
                        text: input[pos..end].to_string(),
                    });
                }

                _ => {
                    let end = scan_word(chars, pos);
                    return Ok(Token {
                        kind: TokenKind::Symbol,
                        span: Span { start: pos, end },
                        text: input[pos..end].to_string(),
                    });
                }
            }
        }

        Ok(Token {
            kind: TokenKind::Eof,
            span: Span { start: input.len(), end: input.len() },
            text: String::new(),
        })
    }
}

/// Consume non-delimiter characters; returns the end offset.
fn scan_word(chars: &mut Peekable<CharIndices<'_>>, start: usize) -> usize {
    let mut end = start;
    while let Some(&(i, c)) = chars.peek() {
        if is_delimiter(c) {
            return i;
        }
        chars.next();
        end = i + c.len_utf8();
    }
    end
}

fn punct(kind: TokenKind, pos: usize, text: &str) -> Token {
    Token {
        kind,
        span: Span { start: pos, end: pos + text.len() },
        text: text.to_string(),
    }
}
