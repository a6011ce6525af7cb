//! The tagged scalar value at the head of every expression node.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tagged scalar value.
///
/// `List` and `Lambda` carry no payload: their elements live in the tail of
/// the [`crate::Expression`] that owns the atom.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Atom {
    #[default]
    None,
    Number(f64),
    Complex(Complex64),
    Symbol(String),
    List,
    Lambda,
}

impl Atom {
    /// Build an atom from a raw token.
    ///
    /// Numbers win over everything else. A token with a numeric prefix but
    /// trailing characters (`1abc`) is rejected as `None`, and so is any
    /// other token starting with a digit, so the parser reports it instead
    /// of silently treating it as a symbol.
    pub fn from_token(text: &str) -> Atom {
        if text.is_empty() {
            return Atom::None;
        }
        let prefix = numeric_prefix_len(text);
        if prefix == text.len() {
            return text.parse::<f64>().map(Atom::Number).unwrap_or(Atom::None);
        }
        if prefix > 0 || text.as_bytes()[0].is_ascii_digit() {
            return Atom::None;
        }
        Atom::named(text)
    }

    /// Build a symbol-like atom: `list` and `lambda` become their tags.
    pub fn named(name: impl Into<String>) -> Atom {
        let name = name.into();
        match name.as_str() {
            "list" => Atom::List,
            "lambda" => Atom::Lambda,
            _ => Atom::Symbol(name),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Atom::None)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Atom::Number(_))
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Atom::Complex(_))
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Atom::Symbol(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Atom::List)
    }

    pub fn is_lambda(&self) -> bool {
        matches!(self, Atom::Lambda)
    }

    /// `true` for symbols written as double-quoted string literals.
    pub fn is_string_literal(&self) -> bool {
        match self {
            Atom::Symbol(s) => s.starts_with('"') && s.ends_with('"'),
            _ => false,
        }
    }

    /// The numeric payload, or `0.0` for non-numbers.
    pub fn as_number(&self) -> f64 {
        match self {
            Atom::Number(n) => *n,
            _ => 0.0,
        }
    }

    /// The complex payload, or `0+0i` for anything that is not complex.
    pub fn as_complex(&self) -> Complex64 {
        match self {
            Atom::Complex(c) => *c,
            _ => Complex64::new(0.0, 0.0),
        }
    }

    /// The symbol name; tags answer `"list"` / `"lambda"`, everything else `""`.
    pub fn as_symbol(&self) -> &str {
        match self {
            Atom::Symbol(s) => s,
            Atom::List => "list",
            Atom::Lambda => "lambda",
            _ => "",
        }
    }
}

/// Length of the longest prefix of `text` that reads as a decimal number:
/// optional sign, digits with an optional fraction, optional exponent.
/// Returns 0 when no digits are present.
fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        if digits > 0 {
            i = j;
        }
    }
    if digits == 0 {
        return 0;
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}

fn close_enough(diff: f64) -> bool {
    !diff.is_nan() && diff <= f64::EPSILON
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Atom::None, Atom::None) => true,
            (Atom::Number(a), Atom::Number(b)) => close_enough((a - b).abs()),
            (Atom::Complex(a), Atom::Complex(b)) => close_enough((a - b).norm()),
            (Atom::Symbol(a), Atom::Symbol(b)) => a == b,
            (Atom::List, Atom::List) | (Atom::Lambda, Atom::Lambda) => true,
            _ => false,
        }
    }
}

impl From<f64> for Atom {
    fn from(value: f64) -> Self {
        Atom::Number(value)
    }
}

impl From<Complex64> for Atom {
    fn from(value: Complex64) -> Self {
        Atom::Complex(value)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Number(n) => write!(f, "{n}"),
            Atom::Complex(c) => write!(f, "{},{}", c.re, c.im),
            Atom::Symbol(s) => write!(f, "{s}"),
            // Tags and None render as nothing; the owning expression
            // supplies the surrounding parentheses.
            Atom::None | Atom::List | Atom::Lambda => Ok(()),
        }
    }
}
