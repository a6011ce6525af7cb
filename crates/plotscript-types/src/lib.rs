//! Shared types for the plotscript interpreter.
//!
//! This crate defines the value model ([`Atom`]), the expression tree
//! ([`Expression`]), source spans, the semantic error type, and the
//! blocking [`MessageQueue`] used between the kernel and its worker.

mod atom;
mod error;
mod expression;
mod queue;
mod span;

pub use atom::Atom;
pub use error::{EvalResult, ErrorKind, SemanticError};
pub use expression::Expression;
pub use queue::MessageQueue;
pub use span::{Position, SourceFile, Span};

/// Re-exported so downstream crates name one complex type.
pub use num_complex::Complex64;
