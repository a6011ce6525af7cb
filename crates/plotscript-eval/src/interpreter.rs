//! The parse/evaluate boundary used by front ends and the kernel.

use crate::env::Environment;
use crate::evaluator::{EvalConfig, Evaluator};
use plotscript_parser::{parse_str, ParseError};
use plotscript_types::{EvalResult, Expression, MessageQueue};

/// One program tree plus the environment it is evaluated in.
///
/// The environment persists across evaluations until [`Interpreter::reset`].
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    env: Environment,
    ast: Expression,
    config: EvalConfig,
    last_parse_error: Option<ParseError>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EvalConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Parse `text` as the next program to evaluate.
    ///
    /// Returns `false` on any lexical or grammatical failure; the stored tree
    /// is then the invalid sentinel and [`last_parse_error`] says why.
    ///
    /// [`last_parse_error`]: Interpreter::last_parse_error
    pub fn parse(&mut self, text: &str) -> bool {
        match parse_str(text) {
            Ok(ast) => {
                self.ast = ast;
                self.last_parse_error = None;
                true
            }
            Err(err) => {
                tracing::debug!(error = %err, "parse failed");
                self.ast = Expression::default();
                self.last_parse_error = Some(err);
                false
            }
        }
    }

    pub fn last_parse_error(&self) -> Option<&ParseError> {
        self.last_parse_error.as_ref()
    }

    /// The tree the last successful [`parse`](Interpreter::parse) produced.
    pub fn ast(&self) -> &Expression {
        &self.ast
    }

    /// Evaluate the parsed program.
    ///
    /// With `testing` set the interrupt queue is never polled.
    pub fn evaluate(
        &mut self,
        interrupt: &MessageQueue<bool>,
        testing: bool,
    ) -> EvalResult<Expression> {
        let queue = if testing { None } else { Some(interrupt) };
        Evaluator::new(queue, self.config).eval(&self.ast, &mut self.env)
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Direct access to the bindings, for hosts that predefine names.
    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn config(&self) -> EvalConfig {
        self.config
    }

    /// Restore the default environment.
    pub fn reset(&mut self) {
        self.env.reset();
    }
}
