//! Tree-walking evaluator over [`Expression`] nodes.
//!
//! Every call to [`Evaluator::eval`] first polls the interrupt queue, so a
//! pending interrupt aborts the evaluation at the next node visited.

use crate::builtins::Builtin;
use crate::env::Environment;
use plotscript_types::{Atom, ErrorKind, EvalResult, Expression, MessageQueue, SemanticError};
use serde::{Deserialize, Serialize};

/// Default bound on nested `eval` entries.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Names `define` and `lambda` may never bind.
const RESERVED: [&str; 3] = ["define", "begin", "lambda"];

/// Evaluator limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Nesting past this depth fails with [`ErrorKind::DepthExceeded`].
    pub max_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// The evaluator for one top-level evaluation.
pub struct Evaluator<'q> {
    /// Polled at each node; `None` disables polling.
    interrupt: Option<&'q MessageQueue<bool>>,
    config: EvalConfig,
    depth: usize,
}

impl<'q> Evaluator<'q> {
    pub fn new(interrupt: Option<&'q MessageQueue<bool>>, config: EvalConfig) -> Self {
        Self {
            interrupt,
            config,
            depth: 0,
        }
    }

    /// Evaluate `expr` in `env`.
    ///
    /// Bindings made before a failure stay in `env`.
    pub fn eval(&mut self, expr: &Expression, env: &mut Environment) -> EvalResult<Expression> {
        self.poll_interrupt()?;
        if self.depth >= self.config.max_depth {
            return Err(SemanticError::new(
                ErrorKind::DepthExceeded,
                "Error during evaluation: maximum evaluation depth exceeded",
            ));
        }
        self.depth += 1;
        let result = self.eval_node(expr, env);
        self.depth -= 1;
        result
    }

    fn poll_interrupt(&self) -> EvalResult<()> {
        if let Some(queue) = self.interrupt {
            if queue.try_pop().is_some() {
                tracing::debug!(depth = self.depth, "interrupt observed during evaluation");
                return Err(SemanticError::interrupted());
            }
        }
        Ok(())
    }

    fn eval_node(&mut self, expr: &Expression, env: &mut Environment) -> EvalResult<Expression> {
        // Special forms are matched before the terminal rule, so a bare
        // `(begin)` or `(define)` reports its own error rather than an
        // unknown symbol.
        if let Atom::Symbol(name) = expr.head() {
            match name.as_str() {
                "begin" => return self.eval_begin(expr, env),
                "define" => return self.eval_define(expr, env),
                "apply" => return self.eval_apply(expr, env),
                "map" => return self.eval_map(expr, env),
                _ => {}
            }
        }
        if expr.tail().is_empty() {
            return self.eval_terminal(expr, env);
        }
        if expr.is_head_lambda() {
            return eval_lambda(expr);
        }
        self.eval_call(expr, env)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Terminals
    // ══════════════════════════════════════════════════════════════════════

    fn eval_terminal(&self, expr: &Expression, env: &Environment) -> EvalResult<Expression> {
        let head = expr.head();
        if head.is_string_literal() {
            return Ok(expr.clone());
        }
        match head {
            Atom::Symbol(_) => env.lookup(head).cloned().ok_or_else(|| {
                SemanticError::new(
                    ErrorKind::UnknownSymbol,
                    "Error during evaluation: unknown symbol",
                )
            }),
            Atom::Number(_) | Atom::Complex(_) | Atom::List | Atom::Lambda => Ok(expr.clone()),
            Atom::None => Err(SemanticError::new(
                ErrorKind::InvalidTerminal,
                "Error during evaluation: Invalid type in terminal expression",
            )),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Special forms
    // ══════════════════════════════════════════════════════════════════════

    fn eval_begin(&mut self, expr: &Expression, env: &mut Environment) -> EvalResult<Expression> {
        let (last, init) = expr.tail().split_last().ok_or_else(|| {
            SemanticError::new(
                ErrorKind::EmptyBegin,
                "Error during evaluation: zero arguments to begin",
            )
        })?;
        for child in init {
            self.eval(child, env)?;
        }
        self.eval(last, env)
    }

    fn eval_define(&mut self, expr: &Expression, env: &mut Environment) -> EvalResult<Expression> {
        let [target, value] = expr.tail() else {
            return Err(SemanticError::new(
                ErrorKind::ArgumentCount,
                "Error during evaluation: invalid number of arguments to define",
            ));
        };
        if !target.is_bare_symbol() {
            return Err(SemanticError::new(
                ErrorKind::InvalidArgument,
                "Error during evaluation: first argument to define not symbol",
            ));
        }
        let name = target.head();
        check_not_reserved(name)?;
        if env.is_proc(name) {
            return Err(SemanticError::new(
                ErrorKind::Redefinition,
                "Error during evaluation: attempt to redefine a built-in procedure",
            ));
        }
        if env.is_exp(name) {
            return Err(SemanticError::new(
                ErrorKind::Redefinition,
                "Error during evaluation: attempt to redefine a previously defined symbol",
            ));
        }
        let result = self.eval(value, env)?;
        env.add_exp(name, result.clone())?;
        Ok(result)
    }

    /// `(apply proc (list ...))`: the arguments are taken as written and the
    /// built call is evaluated.
    fn eval_apply(&mut self, expr: &Expression, env: &mut Environment) -> EvalResult<Expression> {
        let call = Builtin::Apply.call(expr.tail())?;
        self.eval(&call, env)
    }

    /// `(map proc list)`: only the list is evaluated before the calls are
    /// built; the resulting list of calls is then evaluated.
    fn eval_map(&mut self, expr: &Expression, env: &mut Environment) -> EvalResult<Expression> {
        let mut args = expr.tail().to_vec();
        if args.len() == 2 {
            let list = self.eval(&args[1], env)?;
            args[1] = list;
        }
        let calls = Builtin::Map.call(&args)?;
        self.eval(&calls, env)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Calls
    // ══════════════════════════════════════════════════════════════════════

    fn eval_call(&mut self, expr: &Expression, env: &mut Environment) -> EvalResult<Expression> {
        let mut args = Vec::with_capacity(expr.tail().len());
        for child in expr.tail() {
            args.push(self.eval(child, env)?);
        }

        let head = expr.head();
        if let Some(closure) = env.lookup(head).filter(|v| v.is_head_lambda()) {
            let closure = closure.clone();
            return self.call_lambda(&closure, &args, env);
        }

        if !head.is_symbol() && !head.is_list() {
            return Err(SemanticError::new(
                ErrorKind::NotAProcedure,
                "Error during evaluation: procedure name not symbol",
            ));
        }
        if !env.is_proc(head) {
            return Err(SemanticError::new(
                ErrorKind::NotAProcedure,
                "Error during evaluation: symbol does not name a procedure or lambda function",
            ));
        }
        env.get_proc(head).call(&args)
    }

    /// Bind `args` to the closure's parameters in a copy of the caller's
    /// environment and evaluate the body there.
    fn call_lambda(
        &mut self,
        closure: &Expression,
        args: &[Expression],
        env: &Environment,
    ) -> EvalResult<Expression> {
        let [params, body] = closure.tail() else {
            return Err(malformed("Error during evaluation: stored lambda is malformed"));
        };
        if !params.is_head_list() {
            return Err(malformed("Error during evaluation: stored lambda is malformed"));
        }
        if params.tail().len() != args.len() {
            return Err(SemanticError::new(
                ErrorKind::ArgumentCount,
                "Error in call to function: invalid number of arguments.",
            ));
        }

        let mut local = env.clone();
        for (param, arg) in params.tail().iter().zip(args) {
            local.add_exp(param.head(), arg.clone())?;
        }
        self.eval(body, &mut local)
    }
}

// ── Lambda construction ──────────────────────────────────────────────────

/// `(lambda (x y) body)` becomes the closure `(lambda (list x y) body)`.
/// A closure that was already built is returned unchanged.
fn eval_lambda(expr: &Expression) -> EvalResult<Expression> {
    let [params, body] = expr.tail() else {
        return Err(SemanticError::new(
            ErrorKind::ArgumentCount,
            "Error during evaluation: invalid number of arguments to lambda",
        ));
    };
    if params.is_head_list() {
        return Ok(expr.clone());
    }
    if !params.is_head_symbol() {
        return Err(malformed(
            "Error during evaluation: first input argument to lambda not symbol",
        ));
    }

    let mut names = Vec::with_capacity(params.tail().len() + 1);
    names.push(Expression::new(params.head().clone()));
    for child in params.tail() {
        if !child.is_bare_symbol() {
            return Err(malformed(
                "Error during evaluation: input argument to lambda not symbol",
            ));
        }
        names.push(child.clone());
    }
    for name in &names {
        check_not_reserved(name.head())?;
    }

    Ok(Expression::with_tail(
        Atom::Lambda,
        vec![Expression::list(names), body.clone()],
    ))
}

fn check_not_reserved(name: &Atom) -> EvalResult<()> {
    if name.is_symbol() && RESERVED.contains(&name.as_symbol()) {
        return Err(SemanticError::new(
            ErrorKind::Redefinition,
            "Error during evaluation: attempt to redefine a special-form",
        ));
    }
    Ok(())
}

fn malformed(message: &str) -> SemanticError {
    SemanticError::new(ErrorKind::MalformedLambda, message)
}
