//! Expression trees: one head [`Atom`], ordered children, and a property list.
//!
//! Ownership is strictly top-down. Each node owns its children and its
//! property values by value, so cloning duplicates the whole subtree and
//! no node can be reached from two parents.

use crate::Atom;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A node of the abstract syntax tree, and also the runtime value type.
///
/// The default expression (head `None`, empty tail) doubles as the
/// "invalid" sentinel returned by a failed parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Expression {
    head: Atom,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tail: Vec<Expression>,
    /// Consumer-defined metadata keyed by the quoted key text (`"\"size\""`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, Expression>,
}

impl Expression {
    /// A leaf node with the given head.
    pub fn new(head: impl Into<Atom>) -> Self {
        Self {
            head: head.into(),
            tail: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    /// A node with the given head and children.
    pub fn with_tail(head: impl Into<Atom>, tail: Vec<Expression>) -> Self {
        Self {
            head: head.into(),
            tail,
            properties: BTreeMap::new(),
        }
    }

    /// A `List`-tagged node holding `items`.
    pub fn list(items: Vec<Expression>) -> Self {
        Self::with_tail(Atom::List, items)
    }

    /// `true` for the invalid sentinel: `None` head and no children.
    pub fn is_none(&self) -> bool {
        self.head.is_none() && self.tail.is_empty()
    }

    pub fn head(&self) -> &Atom {
        &self.head
    }

    pub fn tail(&self) -> &[Expression] {
        &self.tail
    }

    /// Append a leaf built from `atom`.
    pub fn append(&mut self, atom: impl Into<Atom>) {
        self.tail.push(Expression::new(atom));
    }

    /// Append a whole subtree.
    pub fn append_expression(&mut self, expr: Expression) {
        self.tail.push(expr);
    }

    /// The last child, if any.
    pub fn last_child_mut(&mut self) -> Option<&mut Expression> {
        self.tail.last_mut()
    }

    pub fn is_head_symbol(&self) -> bool {
        self.head.is_symbol()
    }

    pub fn is_head_list(&self) -> bool {
        self.head.is_list()
    }

    pub fn is_head_lambda(&self) -> bool {
        self.head.is_lambda()
    }

    /// A symbol leaf with no children, e.g. a parameter name.
    pub fn is_bare_symbol(&self) -> bool {
        self.head.is_symbol() && self.tail.is_empty()
    }

    pub fn properties(&self) -> &BTreeMap<String, Expression> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&Expression> {
        self.properties.get(key)
    }

    /// Attach `value` under `key`, replacing any previous value.
    pub fn set_property(&mut self, key: impl Into<String>, value: Expression) {
        self.properties.insert(key.into(), value);
    }
}

impl From<Atom> for Expression {
    fn from(atom: Atom) -> Self {
        Expression::new(atom)
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Expression::new(Atom::Number(value))
    }
}

impl From<Complex64> for Expression {
    fn from(value: Complex64) -> Self {
        Expression::new(Atom::Complex(value))
    }
}

/// Structural equality: heads and children, recursively.
/// Property lists are deliberately left out.
impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head && self.tail == other.tail
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.head.is_none() {
            return write!(f, "NONE");
        }
        write!(f, "({}", self.head)?;
        let tagged = self.head.is_list() || self.head.is_lambda();
        for (i, child) in self.tail.iter().enumerate() {
            if i > 0 || !tagged {
                write!(f, " ")?;
            }
            write!(f, "{child}")?;
        }
        write!(f, ")")
    }
}
