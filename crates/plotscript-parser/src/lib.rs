//! Plotscript parser: converts a token stream into one expression tree.
//!
//! Parsing never panics or raises. [`try_parse`] explains a failure with a
//! [`ParseError`]; [`parse`] collapses it into the invalid sentinel
//! expression.

mod parser;

pub use parser::{parse, parse_str, try_parse, ParseError, Parser, MAX_NESTING};
