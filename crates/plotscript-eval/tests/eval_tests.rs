//! Integration tests for the plotscript evaluator.
//!
//! Covers:
//! - terminals and constants
//! - the numeric tower across plain and complex numbers
//! - list procedures and their boundaries
//! - special forms (begin, define, lambda)
//! - user-defined calls and environment isolation
//! - apply / map
//! - property lists
//! - interrupts and the depth limit

use plotscript_eval::{EvalConfig, Interpreter};
use plotscript_types::{Atom, Complex64, ErrorKind, Expression, MessageQueue, SemanticError};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

/// Parse and evaluate `source` in `interp` with interrupts disabled.
fn eval_in(interp: &mut Interpreter, source: &str) -> Result<Expression, SemanticError> {
    assert!(interp.parse(source), "failed to parse {source:?}");
    interp.evaluate(&MessageQueue::new(), true)
}

/// Evaluate `source` in a fresh interpreter.
fn eval(source: &str) -> Result<Expression, SemanticError> {
    eval_in(&mut Interpreter::new(), source)
}

fn eval_ok(source: &str) -> Expression {
    match eval(source) {
        Ok(expr) => expr,
        Err(e) => panic!("unexpected error for {source:?}: {e}"),
    }
}

fn eval_err(source: &str) -> ErrorKind {
    match eval(source) {
        Ok(expr) => panic!("expected an error for {source:?}, got {expr}"),
        Err(e) => e.kind,
    }
}

fn num(n: f64) -> Expression {
    n.into()
}

fn cplx(re: f64, im: f64) -> Expression {
    Complex64::new(re, im).into()
}

fn list(items: &[f64]) -> Expression {
    Expression::list(items.iter().map(|n| num(*n)).collect())
}

// ══════════════════════════════════════════════════════════════════════════════
// Terminals and constants
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn terminal_number() {
    assert_eq!(eval_ok("(4)"), num(4.0));
    assert_eq!(eval_ok("(-1.5e2)"), num(-150.0));
}

#[test]
fn terminal_constants() {
    assert_eq!(eval_ok("(pi)"), num(std::f64::consts::PI));
    assert_eq!(eval_ok("(e)"), num(std::f64::consts::E));
    assert_eq!(eval_ok("(I)"), cplx(0.0, 1.0));
}

#[test]
fn terminal_string_evaluates_to_itself() {
    let result = eval_ok("(\"a string\")");
    assert_eq!(result.head(), &Atom::named("\"a string\""));
}

#[test]
fn terminal_unknown_symbol() {
    let err = eval("(foo)").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownSymbol);
    assert_eq!(err.to_string(), "Error during evaluation: unknown symbol");
}

#[test]
fn procedure_name_as_terminal_is_unknown() {
    assert_eq!(eval_err("(+)"), ErrorKind::UnknownSymbol);
}

// ══════════════════════════════════════════════════════════════════════════════
// Numeric tower
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn add_plain_numbers() {
    assert_eq!(eval_ok("(+ 1 2)"), num(3.0));
    assert_eq!(eval_ok("(+ 1 2 3 4)"), num(10.0));
}

#[test]
fn add_complex_numbers() {
    let result = eval_ok("(+ (complex 0 1) (complex 0 2))");
    assert_eq!(result, cplx(0.0, 3.0));
    assert_eq!(result.to_string(), "(0,3)");
}

#[test]
fn sqrt_of_negative_is_complex() {
    assert_eq!(eval_ok("(sqrt -1)"), cplx(0.0, 1.0));
    assert_eq!(eval_ok("(sqrt 16)"), num(4.0));
}

#[test]
fn power_of_complex() {
    assert_eq!(eval_ok("(^ (complex 0 1) 2)"), cplx(-1.0, 0.0));
    assert_eq!(eval_ok("(^ 2 3)"), num(8.0));
}

#[test]
fn mixed_arithmetic_promotes() {
    assert_eq!(eval_ok("(* 2 I)"), cplx(0.0, 2.0));
    assert_eq!(eval_ok("(- 5 I)"), cplx(5.0, -1.0));
    assert_eq!(eval_ok("(/ I)"), cplx(0.0, -1.0));
}

#[test]
fn negation_and_reciprocal() {
    assert_eq!(eval_ok("(- 4)"), num(-4.0));
    assert_eq!(eval_ok("(/ 4)"), num(0.25));
    assert_eq!(eval_ok("(/ 1 4)"), num(0.25));
}

#[test]
fn trig_in_double_precision() {
    assert_eq!(eval_ok("(sin 0)"), num(0.0));
    assert_eq!(eval_ok("(cos 0)"), num(1.0));
    assert_eq!(eval_ok("(cos pi)"), num(-1.0));
    assert_eq!(eval_ok("(tan 0)"), num(0.0));
}

#[test]
fn complex_accessors() {
    assert_eq!(eval_ok("(real (complex 3 4))"), num(3.0));
    assert_eq!(eval_ok("(imag (complex 3 4))"), num(4.0));
    assert_eq!(eval_ok("(mag (complex 3 4))"), num(5.0));
    assert_eq!(eval_ok("(arg I)"), num(std::f64::consts::FRAC_PI_2));
    assert_eq!(eval_ok("(conj (complex 3 4))"), cplx(3.0, -4.0));
}

#[test]
fn arithmetic_rejects_non_numbers() {
    assert_eq!(eval_err("(+ 1 (list))"), ErrorKind::InvalidArgument);
    assert_eq!(eval_err("(sqrt 1 2)"), ErrorKind::ArgumentCount);
    assert_eq!(eval_err("(ln -1)"), ErrorKind::InvalidArgument);
    assert_eq!(eval_err("(real 1)"), ErrorKind::InvalidArgument);
}

// ══════════════════════════════════════════════════════════════════════════════
// Lists
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn list_builds_evaluated_elements() {
    assert_eq!(eval_ok("(list 1 (+ 1 1) 3)"), list(&[1.0, 2.0, 3.0]));
    assert_eq!(eval_ok("(list)"), list(&[]));
}

#[test]
fn first_of_empty_list_fails() {
    assert_eq!(eval_err("(first (list))"), ErrorKind::EmptyList);
    assert_eq!(eval_err("(rest (list))"), ErrorKind::EmptyList);
}

#[test]
fn first_and_rest() {
    assert_eq!(eval_ok("(first (list 7 8 9))"), num(7.0));
    assert_eq!(eval_ok("(rest (list 7 8 9))"), list(&[8.0, 9.0]));
    assert_eq!(eval_ok("(rest (list 7))"), list(&[]));
}

#[test]
fn length_append_join() {
    assert_eq!(eval_ok("(length (list 1 2 3))"), num(3.0));
    assert_eq!(eval_ok("(length (list))"), num(0.0));
    assert_eq!(eval_ok("(append (list 1 2) 3)"), list(&[1.0, 2.0, 3.0]));
    assert_eq!(
        eval_ok("(join (list 1) (list 2 3) (list 4))"),
        list(&[1.0, 2.0, 3.0, 4.0])
    );
    assert_eq!(eval_err("(join (list 1))"), ErrorKind::ArgumentCount);
    assert_eq!(eval_err("(append 1 2)"), ErrorKind::InvalidArgument);
}

#[test]
fn range_inclusive_of_end() {
    assert_eq!(eval_ok("(range 0 3 1)"), list(&[0.0, 1.0, 2.0, 3.0]));
    assert_eq!(eval_ok("(range -1 1 0.5)"), list(&[-1.0, -0.5, 0.0, 0.5, 1.0]));
    assert_eq!(eval_err("(range 3 0 1)"), ErrorKind::InvalidRange);
    assert_eq!(eval_err("(range 0 3 -1)"), ErrorKind::InvalidRange);
}

#[test]
fn range_rejects_non_finite_arguments() {
    assert_eq!(eval_err("(range 0 1 (/ 1 0))"), ErrorKind::InvalidRange);
    assert_eq!(eval_err("(range (- (/ 0 0)) 1 1)"), ErrorKind::InvalidRange);
    assert_eq!(eval_err("(range 0 (/ 1 0) 1)"), ErrorKind::InvalidRange);
    assert_eq!(eval_ok("(range 0 1 1)"), list(&[0.0, 1.0]));
}

#[test]
fn range_length_is_bounded() {
    assert_eq!(eval_err("(range 0 1e12 1)"), ErrorKind::InvalidRange);
}

// ══════════════════════════════════════════════════════════════════════════════
// Special forms
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn begin_returns_last() {
    assert_eq!(eval_ok("(begin 1 2 3)"), num(3.0));
    assert_eq!(eval_ok("(begin (define r 10) (* pi (* r r)))"), num(std::f64::consts::PI * 100.0));
    assert_eq!(eval_err("(begin)"), ErrorKind::EmptyBegin);
}

#[test]
fn define_returns_and_binds() {
    let mut interp = Interpreter::new();
    assert_eq!(eval_in(&mut interp, "(define a 1)").unwrap(), num(1.0));
    assert_eq!(eval_in(&mut interp, "(+ a a)").unwrap(), num(2.0));
}

#[test]
fn define_twice_fails_until_reset() {
    let mut interp = Interpreter::new();
    eval_in(&mut interp, "(define x (+ 1 2))").unwrap();
    let err = eval_in(&mut interp, "(define x (+ 1 2))").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Redefinition);
    interp.reset();
    assert_eq!(eval_in(&mut interp, "(define x (+ 1 2))").unwrap(), num(3.0));
}

#[test]
fn define_rejects_special_forms_and_builtins() {
    assert_eq!(eval_err("(define begin 1)"), ErrorKind::Redefinition);
    assert_eq!(eval_err("(define define 1)"), ErrorKind::Redefinition);
    assert_eq!(eval_err("(define sqrt 1)"), ErrorKind::Redefinition);
    assert_eq!(eval_err("(define pi 3)"), ErrorKind::Redefinition);
    assert_eq!(eval_err("(define 1 2)"), ErrorKind::InvalidArgument);
    assert_eq!(eval_err("(define a)"), ErrorKind::ArgumentCount);
}

#[test]
fn earlier_bindings_survive_failure() {
    let mut interp = Interpreter::new();
    let err = eval_in(&mut interp, "(begin (define a 1) (foo))").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownSymbol);
    assert_eq!(eval_in(&mut interp, "(a)").unwrap(), num(1.0));
}

// ══════════════════════════════════════════════════════════════════════════════
// Lambdas
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn lambda_call() {
    assert_eq!(
        eval_ok("(begin (define f (lambda (x y) (+ x y 1))) (f 2 3))"),
        num(6.0)
    );
}

#[test]
fn lambda_arity_mismatch() {
    let err = eval("(begin (define f (lambda (x y) (+ x y 1))) (f 2))").unwrap_err();
    assert_eq!(err.kind, ErrorKind::ArgumentCount);
    assert_eq!(err.message, "Error in call to function: invalid number of arguments.");
}

#[test]
fn lambda_body_define_does_not_leak() {
    let mut interp = Interpreter::new();
    eval_in(
        &mut interp,
        "(define f (lambda (x) (begin (define inner 12) (+ x inner))))",
    )
    .unwrap();
    assert_eq!(eval_in(&mut interp, "(f 1)").unwrap(), num(13.0));
    assert_eq!(eval_in(&mut interp, "(inner)").unwrap_err().kind, ErrorKind::UnknownSymbol);
    assert_eq!(eval_in(&mut interp, "(x)").unwrap_err().kind, ErrorKind::UnknownSymbol);
}

#[test]
fn lambda_params_shadow_caller_values() {
    let mut interp = Interpreter::new();
    eval_in(&mut interp, "(define x 100)").unwrap();
    eval_in(&mut interp, "(define f (lambda (x) (* 2 x)))").unwrap();
    assert_eq!(eval_in(&mut interp, "(f 4)").unwrap(), num(8.0));
    assert_eq!(eval_in(&mut interp, "(x)").unwrap(), num(100.0));
}

#[test]
fn lambda_sees_callers_environment() {
    let mut interp = Interpreter::new();
    eval_in(&mut interp, "(define f (lambda (x) (+ x y)))").unwrap();
    eval_in(&mut interp, "(define y 5)").unwrap();
    assert_eq!(eval_in(&mut interp, "(f 1)").unwrap(), num(6.0));
}

#[test]
fn lambda_closure_shape() {
    let closure = eval_ok("(lambda (x y) (+ x y))");
    assert!(closure.is_head_lambda());
    assert_eq!(closure.tail().len(), 2);
    assert!(closure.tail()[0].is_head_list());
}

#[test]
fn malformed_lambdas() {
    assert_eq!(eval_err("(lambda (x) (+ x 1) 3)"), ErrorKind::ArgumentCount);
    assert_eq!(eval_err("(lambda (define) 1)"), ErrorKind::Redefinition);
    assert_eq!(eval_err("(lambda (x (y 1)) 1)"), ErrorKind::MalformedLambda);
}

#[test]
fn calling_a_non_procedure() {
    assert_eq!(eval_err("(pi 1)"), ErrorKind::NotAProcedure);
    assert_eq!(eval_err("(nope 1)"), ErrorKind::NotAProcedure);
    assert_eq!(eval_err("(1 2)"), ErrorKind::NotAProcedure);
}

// ══════════════════════════════════════════════════════════════════════════════
// apply / map
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn apply_builtin() {
    assert_eq!(eval_ok("(apply + (list 1 2 3))"), num(6.0));
    assert_eq!(eval_ok("(apply list (list 1 2))"), list(&[1.0, 2.0]));
}

#[test]
fn apply_user_lambda() {
    assert_eq!(
        eval_ok("(begin (define f (lambda (x y) (- x y))) (apply f (list 5 2)))"),
        num(3.0)
    );
}

#[test]
fn apply_errors() {
    assert_eq!(eval_err("(apply 1 (list 1))"), ErrorKind::NotAProcedure);
    assert_eq!(eval_err("(apply + 3)"), ErrorKind::InvalidArgument);
    assert_eq!(eval_err("(apply +)"), ErrorKind::ArgumentCount);
}

#[test]
fn map_builtin() {
    assert_eq!(eval_ok("(map sqrt (list 1 4 9))"), list(&[1.0, 2.0, 3.0]));
}

#[test]
fn map_user_lambda_over_range() {
    assert_eq!(
        eval_ok("(begin (define sq (lambda (x) (* x x))) (map sq (range 1 4 1)))"),
        list(&[1.0, 4.0, 9.0, 16.0])
    );
}

#[test]
fn map_over_complex_results() {
    assert_eq!(
        eval_ok("(map sqrt (list -1 -4))"),
        Expression::list(vec![cplx(0.0, 1.0), cplx(0.0, 2.0)])
    );
}

#[test]
fn map_errors() {
    assert_eq!(eval_err("(map 3 (list 1))"), ErrorKind::NotAProcedure);
    assert_eq!(eval_err("(map sqrt 4)"), ErrorKind::InvalidArgument);
}

// ══════════════════════════════════════════════════════════════════════════════
// Properties
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn set_and_get_property() {
    let result = eval_ok("(get-property \"size\" (set-property \"size\" 20 (1)))");
    assert_eq!(result, num(20.0));
}

#[test]
fn property_survives_define() {
    let mut interp = Interpreter::new();
    eval_in(&mut interp, "(define p (set-property \"label\" \"origin\" (list 0 0)))").unwrap();
    let label = eval_in(&mut interp, "(get-property \"label\" p)").unwrap();
    assert_eq!(label.head(), &Atom::named("\"origin\""));
}

#[test]
fn missing_property_is_none() {
    assert!(eval_ok("(get-property \"nothing\" (1))").is_none());
}

#[test]
fn property_key_must_be_string() {
    assert_eq!(eval_err("(set-property size 20 (1))"), ErrorKind::UnknownSymbol);
    assert_eq!(eval_err("(set-property 1 20 (1))"), ErrorKind::PropertyKey);
}

// ══════════════════════════════════════════════════════════════════════════════
// Interrupts and limits
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn pending_interrupt_fails_evaluation() {
    let mut interp = Interpreter::new();
    assert!(interp.parse("(begin (define a 1) (+ a 2))"));
    let queue = MessageQueue::new();
    queue.push(true);
    let err = interp.evaluate(&queue, false).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Interrupted);
    assert_eq!(err.message, "Error: interpreter kernel interrupted");
    assert!(!interp.environment().is_known(&Atom::named("a")));
}

#[test]
fn interrupt_is_consumed_once() {
    let mut interp = Interpreter::new();
    assert!(interp.parse("(+ 1 2)"));
    let queue = MessageQueue::new();
    queue.push(true);
    assert!(interp.evaluate(&queue, false).is_err());
    assert_eq!(interp.evaluate(&queue, false).unwrap(), num(3.0));
}

#[test]
fn depth_limit_is_configurable() {
    let source = "(+ 1 (+ 1 (+ 1 (+ 1 (+ 1 1)))))";
    let mut interp = Interpreter::with_config(EvalConfig { max_depth: 4 });
    assert!(interp.parse(source));
    let err = interp.evaluate(&MessageQueue::new(), true).unwrap_err();
    assert_eq!(err.kind, ErrorKind::DepthExceeded);
    assert_eq!(eval_ok(source), num(6.0));
}

#[test]
fn evaluation_determinism_100_iterations() {
    let source = "(begin (define f (lambda (x) (^ x 2))) (map f (range 0 10 0.5)))";
    let first = eval_ok(source);
    for i in 0..100 {
        assert_eq!(first, eval_ok(source), "Determinism failure at iteration {i}");
    }
}
