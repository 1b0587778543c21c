//! Atomic values: concepts, attribute values and bare references.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A literal value in the notation.
///
/// - Scalars: Symbol, StringLiteral, Integer, Float
/// - Missing: Null (a dangling role or an empty concept slot)
///
/// `StringLiteral` keeps its surrounding double quotes (and any escapes)
/// exactly as written so that formatting reproduces the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Atom {
    Symbol(String),
    StringLiteral(String),
    Integer(i64),
    Float(f64),
    Null,
}

// ============================================================================
// Construction
// ============================================================================

impl Atom {
    /// Classify a bare token: integer, then float, else symbol.
    ///
    /// Numeric parsing never partially matches; `876-9` or `1.2.3` stay
    /// symbols. An empty token is `Null`.
    pub fn from_token(text: &str) -> Self {
        if text.is_empty() {
            return Atom::Null;
        }
        if text.starts_with('"') {
            return Atom::StringLiteral(text.to_owned());
        }
        if is_integer(text) {
            if let Ok(i) = text.parse::<i64>() {
                return Atom::Integer(i);
            }
        } else if is_float(text) {
            if let Ok(f) = text.parse::<f64>() {
                return Atom::Float(f);
            }
        }
        Atom::Symbol(text.to_owned())
    }

    /// Wrap `s` in double quotes, escaping embedded quotes and backslashes.
    pub fn quoted(s: &str) -> Self {
        let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
        Atom::StringLiteral(format!("\"{escaped}\""))
    }

    pub fn symbol(s: impl Into<String>) -> Self {
        Atom::Symbol(s.into())
    }
}

// ============================================================================
// Type checking
// ============================================================================

impl Atom {
    pub fn type_name(&self) -> &'static str {
        match self {
            Atom::Symbol(_) => "SYMBOL",
            Atom::StringLiteral(_) => "STRING",
            Atom::Integer(_) => "INTEGER",
            Atom::Float(_) => "FLOAT",
            Atom::Null => "NULL",
        }
    }

    pub fn is_null(&self) -> bool { matches!(self, Atom::Null) }
    pub fn is_numeric(&self) -> bool { matches!(self, Atom::Integer(_) | Atom::Float(_)) }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Atom::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Atom::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Atom::Float(f) => Some(*f),
            Atom::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// The string contents without quotes and with escapes resolved.
    pub fn unquoted(&self) -> Option<String> {
        let Atom::StringLiteral(raw) = self else { return None };
        let inner = raw
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(raw);
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else {
                out.push(c);
            }
        }
        Some(out)
    }
}

// ============================================================================
// Numeric token shapes
// ============================================================================

fn strip_sign(text: &str) -> &str {
    text.strip_prefix(['-', '+']).unwrap_or(text)
}

fn is_integer(text: &str) -> bool {
    let digits = strip_sign(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `[-+]? (digits '.' digits? | '.' digits | digits) ([eE] [-+]? digits)?`,
/// with at least a decimal point or an exponent.
fn is_float(text: &str) -> bool {
    let body = strip_sign(text);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !frac_part.is_none_or(all_digits) {
        return false;
    }
    let frac_len = frac_part.map_or(0, str::len);
    if int_part.is_empty() && frac_len == 0 {
        return false;
    }
    match exponent {
        Some(exp) => {
            let exp = strip_sign(exp);
            !exp.is_empty() && all_digits(exp)
        }
        None => frac_part.is_some(),
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<i64> for Atom { fn from(v: i64) -> Self { Atom::Integer(v) } }
impl From<i32> for Atom { fn from(v: i32) -> Self { Atom::Integer(v as i64) } }
impl From<f64> for Atom { fn from(v: f64) -> Self { Atom::Float(v) } }
impl From<&str> for Atom { fn from(v: &str) -> Self { Atom::from_token(v) } }
impl From<String> for Atom { fn from(v: String) -> Self { Atom::from_token(&v) } }
impl<T: Into<Atom>> From<Option<T>> for Atom {
    fn from(v: Option<T>) -> Self { v.map(Into::into).unwrap_or(Atom::Null) }
}

// ============================================================================
// Equality (floats compare bitwise so atoms can key hash maps)
// ============================================================================

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Atom::Symbol(a), Atom::Symbol(b)) => a == b,
            (Atom::StringLiteral(a), Atom::StringLiteral(b)) => a == b,
            (Atom::Integer(a), Atom::Integer(b)) => a == b,
            (Atom::Float(a), Atom::Float(b)) => a.to_bits() == b.to_bits(),
            (Atom::Null, Atom::Null) => true,
            _ => false,
        }
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Atom::Symbol(s) | Atom::StringLiteral(s) => s.hash(state),
            Atom::Integer(i) => i.hash(state),
            Atom::Float(f) => f.to_bits().hash(state),
            Atom::Null => {}
        }
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Symbol(s) | Atom::StringLiteral(s) => f.write_str(s),
            Atom::Integer(i) => write!(f, "{i}"),
            Atom::Float(v) => {
                let s = v.to_string();
                // keep a float a float when it is read back
                if v.is_finite() && !s.contains(['.', 'e', 'E']) {
                    write!(f, "{s}.0")
                } else {
                    f.write_str(&s)
                }
            }
            Atom::Null => Ok(()),
        }
    }
}
