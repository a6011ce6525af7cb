//! Symbol table for the plotscript evaluator.

use crate::builtins::{Builtin, Procedure};
use num_complex::Complex64;
use plotscript_types::{Atom, ErrorKind, EvalResult, Expression, SemanticError};
use std::collections::BTreeMap;

/// What a name is bound to. A name holds exactly one of the two.
#[derive(Debug, Clone, PartialEq)]
enum Binding {
    Value(Expression),
    Procedure(Procedure),
}

/// Maps symbol names to stored values or built-in procedures.
///
/// A lambda call works on a clone of the caller's environment, so bindings
/// made inside the call never reach the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    bindings: BTreeMap<String, Binding>,
}

impl Environment {
    /// An environment holding the default constants and built-ins.
    pub fn new() -> Self {
        let mut env = Self {
            bindings: BTreeMap::new(),
        };
        env.reset();
        env
    }

    /// Drop every binding and reinstall `e`, `pi`, `I` and the built-ins.
    pub fn reset(&mut self) {
        self.bindings.clear();
        self.install_value("e", std::f64::consts::E.into());
        self.install_value("pi", std::f64::consts::PI.into());
        self.install_value("I", Complex64::new(0.0, 1.0).into());
        for builtin in Builtin::ALL {
            self.bindings.insert(
                builtin.name().to_string(),
                Binding::Procedure(Procedure::Builtin(builtin)),
            );
        }
    }

    fn install_value(&mut self, name: &str, value: Expression) {
        self.bindings.insert(name.to_string(), Binding::Value(value));
    }

    /// Binding key for an atom that can name a procedure: symbols by name,
    /// the List tag as `list`.
    fn proc_key(sym: &Atom) -> Option<&str> {
        match sym {
            Atom::Symbol(name) => Some(name.as_str()),
            Atom::List => Some(Builtin::List.name()),
            _ => None,
        }
    }

    /// Is `sym` a symbol with any binding?
    pub fn is_known(&self, sym: &Atom) -> bool {
        match sym {
            Atom::Symbol(name) => self.bindings.contains_key(name),
            _ => false,
        }
    }

    /// Is `sym` a symbol bound to a value?
    pub fn is_exp(&self, sym: &Atom) -> bool {
        self.lookup(sym).is_some()
    }

    /// Is `sym` bound to a procedure?
    pub fn is_proc(&self, sym: &Atom) -> bool {
        Self::proc_key(sym)
            .and_then(|name| self.bindings.get(name))
            .is_some_and(|b| matches!(b, Binding::Procedure(_)))
    }

    /// The value bound to `sym`, if any.
    pub fn lookup(&self, sym: &Atom) -> Option<&Expression> {
        let Atom::Symbol(name) = sym else {
            return None;
        };
        match self.bindings.get(name) {
            Some(Binding::Value(expr)) => Some(expr),
            _ => None,
        }
    }

    /// The value bound to `sym`, or the `None` expression.
    pub fn get_exp(&self, sym: &Atom) -> Expression {
        self.lookup(sym).cloned().unwrap_or_default()
    }

    /// The procedure bound to `sym`, or [`Procedure::Default`].
    pub fn get_proc(&self, sym: &Atom) -> Procedure {
        match Self::proc_key(sym).and_then(|name| self.bindings.get(name)) {
            Some(Binding::Procedure(p)) => *p,
            _ => Procedure::Default,
        }
    }

    /// Bind `sym` to `value`, replacing whatever it held before.
    pub fn add_exp(&mut self, sym: &Atom, value: Expression) -> EvalResult<()> {
        let Atom::Symbol(name) = sym else {
            return Err(SemanticError::new(
                ErrorKind::InvalidTarget,
                "Attempt to add non-symbol to environment",
            ));
        };
        self.bindings.insert(name.clone(), Binding::Value(value));
        Ok(())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
