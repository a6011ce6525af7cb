//! Result records posted by the worker.

use plotscript_types::Expression;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Posted when a command does not parse.
pub const PARSE_FAILURE: &str = "Invalid Expression. Could not parse.";

/// The outcome of one command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum KernelOutput {
    Value(Expression),
    /// Parse failures, evaluation errors and caught panics, as display text.
    Error(String),
}

impl KernelOutput {
    pub fn is_error(&self) -> bool {
        matches!(self, KernelOutput::Error(_))
    }

    pub fn value(&self) -> Option<&Expression> {
        match self {
            KernelOutput::Value(expr) => Some(expr),
            KernelOutput::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            KernelOutput::Value(_) => None,
            KernelOutput::Error(message) => Some(message),
        }
    }
}

impl fmt::Display for KernelOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelOutput::Value(expr) => write!(f, "{expr}"),
            KernelOutput::Error(message) => write!(f, "{message}"),
        }
    }
}
