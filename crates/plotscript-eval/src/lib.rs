//! Plotscript tree-walking evaluator.
//!
//! Holds the symbol table, the fixed built-in procedures, the evaluator
//! with its special forms, and the [`Interpreter`] that ties parsing and
//! evaluation together over a persistent environment.

pub mod builtins;
pub mod env;
pub mod evaluator;
pub mod interpreter;

pub use builtins::{Builtin, Procedure, MAX_RANGE_LEN};
pub use env::Environment;
pub use evaluator::{EvalConfig, Evaluator, DEFAULT_MAX_DEPTH};
pub use interpreter::Interpreter;
