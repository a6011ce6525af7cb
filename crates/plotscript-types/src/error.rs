use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What went wrong during evaluation.
///
/// Every evaluation failure is a [`SemanticError`]; the kind lets callers
/// branch on the cause without parsing the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A symbol with no value binding was looked up.
    UnknownSymbol,
    /// A terminal node whose head cannot stand alone (e.g. `None`).
    InvalidTerminal,
    /// Wrong number of arguments to a built-in or special form.
    ArgumentCount,
    /// An argument of the wrong kind to a built-in.
    InvalidArgument,
    /// `define`/`lambda` touching a special form, built-in or existing value.
    Redefinition,
    /// The head of a call does not name a procedure or closure.
    NotAProcedure,
    /// `(begin)` with nothing to evaluate.
    EmptyBegin,
    /// A `lambda` whose parameter list is not a list of symbols.
    MalformedLambda,
    /// Binding something other than a symbol in the environment.
    InvalidTarget,
    /// A property key that is not a double-quoted string.
    PropertyKey,
    /// `first`/`rest` on an empty list.
    EmptyList,
    /// `range` with a reversed interval or non-positive step.
    InvalidRange,
    /// An interrupt signal was observed mid-evaluation.
    Interrupted,
    /// Nesting went past the configured evaluation depth.
    DepthExceeded,
}

/// An evaluation-time failure carrying a human-readable message.
///
/// `Display` prints the message verbatim so embedding layers can show it
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct SemanticError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SemanticError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The error raised when an interrupt is observed.
    pub fn interrupted() -> Self {
        Self::new(ErrorKind::Interrupted, "Error: interpreter kernel interrupted")
    }

    pub fn argument_count(procedure: &str) -> Self {
        Self::new(
            ErrorKind::ArgumentCount,
            format!("Error in call to {procedure}: invalid number of arguments."),
        )
    }

    pub fn invalid_argument(procedure: &str) -> Self {
        Self::new(
            ErrorKind::InvalidArgument,
            format!("Error in call to {procedure}: invalid argument."),
        )
    }
}

/// Result alias for evaluation.
pub type EvalResult<T> = Result<T, SemanticError>;
