//! The fixed table of built-in procedures.
//!
//! Each procedure receives its already-evaluated arguments, validates arity
//! and operand kinds, and returns a fresh [`Expression`]. `apply` and `map`
//! only *build* call nodes; the evaluator evaluates what they return.

use num_complex::Complex64;
use plotscript_types::{Atom, ErrorKind, EvalResult, Expression, SemanticError};

/// Largest list `range` will build.
pub const MAX_RANGE_LEN: usize = 1 << 24;

/// A built-in procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Sqrt,
    Ln,
    Sin,
    Cos,
    Tan,
    Real,
    Imag,
    Mag,
    Arg,
    Conj,
    Complex,
    List,
    First,
    Rest,
    Length,
    Append,
    Join,
    Range,
    Apply,
    Map,
    SetProperty,
    GetProperty,
}

impl Builtin {
    /// Every built-in, in the order they are installed.
    pub const ALL: [Builtin; 27] = [
        Builtin::Add,
        Builtin::Sub,
        Builtin::Mul,
        Builtin::Div,
        Builtin::Pow,
        Builtin::Sqrt,
        Builtin::Ln,
        Builtin::Sin,
        Builtin::Cos,
        Builtin::Tan,
        Builtin::Real,
        Builtin::Imag,
        Builtin::Mag,
        Builtin::Arg,
        Builtin::Conj,
        Builtin::Complex,
        Builtin::List,
        Builtin::First,
        Builtin::Rest,
        Builtin::Length,
        Builtin::Append,
        Builtin::Join,
        Builtin::Range,
        Builtin::Apply,
        Builtin::Map,
        Builtin::SetProperty,
        Builtin::GetProperty,
    ];

    /// The symbol this procedure is bound to.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Add => "+",
            Builtin::Sub => "-",
            Builtin::Mul => "*",
            Builtin::Div => "/",
            Builtin::Pow => "^",
            Builtin::Sqrt => "sqrt",
            Builtin::Ln => "ln",
            Builtin::Sin => "sin",
            Builtin::Cos => "cos",
            Builtin::Tan => "tan",
            Builtin::Real => "real",
            Builtin::Imag => "imag",
            Builtin::Mag => "mag",
            Builtin::Arg => "arg",
            Builtin::Conj => "conj",
            Builtin::Complex => "complex",
            Builtin::List => "list",
            Builtin::First => "first",
            Builtin::Rest => "rest",
            Builtin::Length => "length",
            Builtin::Append => "append",
            Builtin::Join => "join",
            Builtin::Range => "range",
            Builtin::Apply => "apply",
            Builtin::Map => "map",
            Builtin::SetProperty => "set-property",
            Builtin::GetProperty => "get-property",
        }
    }

    pub fn from_name(name: &str) -> Option<Builtin> {
        Builtin::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Run the procedure on already-evaluated arguments.
    pub fn call(self, args: &[Expression]) -> EvalResult<Expression> {
        match self {
            Builtin::Add => add(args),
            Builtin::Sub => sub(args),
            Builtin::Mul => mul(args),
            Builtin::Div => div(args),
            Builtin::Pow => pow(args),
            Builtin::Sqrt => sqrt(args),
            Builtin::Ln => ln(args),
            Builtin::Sin => real_unary(args, "sin", f64::sin),
            Builtin::Cos => real_unary(args, "cos", f64::cos),
            Builtin::Tan => real_unary(args, "tan", f64::tan),
            Builtin::Real => complex_unary(args, "real", |c| c.re.into()),
            Builtin::Imag => complex_unary(args, "imag", |c| c.im.into()),
            Builtin::Mag => complex_unary(args, "mag", |c| c.norm().into()),
            Builtin::Arg => complex_unary(args, "arg", |c| c.arg().into()),
            Builtin::Conj => complex_unary(args, "conj", |c| c.conj().into()),
            Builtin::Complex => complex(args),
            Builtin::List => Ok(Expression::list(args.to_vec())),
            Builtin::First => first(args),
            Builtin::Rest => rest(args),
            Builtin::Length => length(args),
            Builtin::Append => append(args),
            Builtin::Join => join(args),
            Builtin::Range => range(args),
            Builtin::Apply => apply(args),
            Builtin::Map => map(args),
            Builtin::SetProperty => set_property(args),
            Builtin::GetProperty => get_property(args),
        }
    }
}

/// What a name bound to a procedure resolves to.
///
/// `Default` answers lookups of names that are not procedures: it accepts
/// anything and returns the `None` expression, and two of them compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Procedure {
    #[default]
    Default,
    Builtin(Builtin),
}

impl Procedure {
    pub fn call(self, args: &[Expression]) -> EvalResult<Expression> {
        match self {
            Procedure::Default => Ok(Expression::default()),
            Procedure::Builtin(builtin) => builtin.call(args),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Numeric tower
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Num {
    Real(f64),
    Complex(Complex64),
}

impl Num {
    fn of(arg: &Expression) -> Option<Num> {
        match arg.head() {
            Atom::Number(n) => Some(Num::Real(*n)),
            Atom::Complex(c) => Some(Num::Complex(*c)),
            _ => None,
        }
    }

    fn promote(self) -> Complex64 {
        match self {
            Num::Real(n) => Complex64::new(n, 0.0),
            Num::Complex(c) => c,
        }
    }
}

fn numbers(args: &[Expression], procedure: &str) -> EvalResult<Vec<Num>> {
    args.iter()
        .map(|a| Num::of(a).ok_or_else(|| SemanticError::invalid_argument(procedure)))
        .collect()
}

fn any_complex(nums: &[Num]) -> bool {
    nums.iter().any(|n| matches!(n, Num::Complex(_)))
}

/// Fold `nums` with `op` starting at `identity`, promoting to complex if
/// any operand is complex.
fn fold(nums: &[Num], identity: f64, op: fn(Complex64, Complex64) -> Complex64) -> Expression {
    let total = nums
        .iter()
        .fold(Complex64::new(identity, 0.0), |acc, n| op(acc, n.promote()));
    if any_complex(nums) {
        total.into()
    } else {
        total.re.into()
    }
}

fn add(args: &[Expression]) -> EvalResult<Expression> {
    let nums = numbers(args, "add")?;
    if !any_complex(&nums) {
        let sum: f64 = nums.iter().map(|n| n.promote().re).sum();
        return Ok(sum.into());
    }
    Ok(fold(&nums, 0.0, |a, b| a + b))
}

fn mul(args: &[Expression]) -> EvalResult<Expression> {
    let nums = numbers(args, "mul")?;
    if !any_complex(&nums) {
        let product: f64 = nums.iter().map(|n| n.promote().re).product();
        return Ok(product.into());
    }
    Ok(fold(&nums, 1.0, |a, b| a * b))
}

fn sub(args: &[Expression]) -> EvalResult<Expression> {
    let nums = numbers(args, "subtraction")?;
    match nums.as_slice() {
        [Num::Real(a)] => Ok((-a).into()),
        [Num::Complex(a)] => Ok((-a).into()),
        [Num::Real(a), Num::Real(b)] => Ok((a - b).into()),
        [a, b] => Ok((a.promote() - b.promote()).into()),
        _ => Err(SemanticError::argument_count("subtraction or negation")),
    }
}

fn div(args: &[Expression]) -> EvalResult<Expression> {
    let nums = numbers(args, "division")?;
    match nums.as_slice() {
        [Num::Real(a)] => Ok((1.0 / a).into()),
        [Num::Complex(a)] => Ok((Complex64::new(1.0, 0.0) / a).into()),
        [Num::Real(a), Num::Real(b)] => Ok((a / b).into()),
        [a, b] => Ok((a.promote() / b.promote()).into()),
        _ => Err(SemanticError::argument_count("division")),
    }
}

fn pow(args: &[Expression]) -> EvalResult<Expression> {
    if args.len() != 2 {
        return Err(SemanticError::argument_count("exponentiation"));
    }
    let nums = numbers(args, "exponentiation")?;
    match (nums[0], nums[1]) {
        (Num::Real(base), Num::Real(exp)) => Ok(base.powf(exp).into()),
        (Num::Complex(base), Num::Real(exp)) => Ok(base.powf(exp).into()),
        (base, exp) => Ok(base.promote().powc(exp.promote()).into()),
    }
}

fn sqrt(args: &[Expression]) -> EvalResult<Expression> {
    let [arg] = args else {
        return Err(SemanticError::argument_count("sqrt"));
    };
    match Num::of(arg) {
        Some(Num::Real(n)) if n >= 0.0 => Ok(n.sqrt().into()),
        Some(Num::Real(n)) => Ok(Complex64::new(n, 0.0).sqrt().into()),
        Some(Num::Complex(c)) => Ok(c.sqrt().into()),
        None => Err(SemanticError::invalid_argument("sqrt")),
    }
}

fn ln(args: &[Expression]) -> EvalResult<Expression> {
    let [arg] = args else {
        return Err(SemanticError::argument_count("natural log"));
    };
    match arg.head() {
        Atom::Number(n) if *n < 0.0 => Err(SemanticError::new(
            ErrorKind::InvalidArgument,
            "Error in call to natural log: negative number.",
        )),
        Atom::Number(n) => Ok(n.ln().into()),
        _ => Err(SemanticError::invalid_argument("natural log")),
    }
}

fn real_unary(args: &[Expression], procedure: &str, op: fn(f64) -> f64) -> EvalResult<Expression> {
    let [arg] = args else {
        return Err(SemanticError::argument_count(procedure));
    };
    match arg.head() {
        Atom::Number(n) => Ok(op(*n).into()),
        _ => Err(SemanticError::invalid_argument(procedure)),
    }
}

fn complex_unary(
    args: &[Expression],
    procedure: &str,
    op: fn(Complex64) -> Expression,
) -> EvalResult<Expression> {
    let [arg] = args else {
        return Err(SemanticError::argument_count(procedure));
    };
    match arg.head() {
        Atom::Complex(c) => Ok(op(*c)),
        _ => Err(SemanticError::invalid_argument(procedure)),
    }
}

fn complex(args: &[Expression]) -> EvalResult<Expression> {
    match args {
        [re, im] => match (re.head(), im.head()) {
            (Atom::Number(re), Atom::Number(im)) => Ok(Complex64::new(*re, *im).into()),
            _ => Err(SemanticError::invalid_argument("complex")),
        },
        _ => Err(SemanticError::argument_count("complex")),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Lists
// ─────────────────────────────────────────────────────────────────────

fn single_list<'a>(args: &'a [Expression], procedure: &str) -> EvalResult<&'a Expression> {
    let [arg] = args else {
        return Err(SemanticError::argument_count(procedure));
    };
    if !arg.is_head_list() {
        return Err(SemanticError::new(
            ErrorKind::InvalidArgument,
            format!("Error in call to {procedure}: argument is not a list."),
        ));
    }
    Ok(arg)
}

fn first(args: &[Expression]) -> EvalResult<Expression> {
    let list = single_list(args, "first")?;
    list.tail().first().cloned().ok_or_else(|| {
        SemanticError::new(ErrorKind::EmptyList, "Error: argument to first is an empty list")
    })
}

fn rest(args: &[Expression]) -> EvalResult<Expression> {
    let list = single_list(args, "rest")?;
    match list.tail().split_first() {
        Some((_, rest)) => Ok(Expression::list(rest.to_vec())),
        None => Err(SemanticError::new(
            ErrorKind::EmptyList,
            "Error: argument to rest is an empty list",
        )),
    }
}

fn length(args: &[Expression]) -> EvalResult<Expression> {
    let list = single_list(args, "length")?;
    Ok((list.tail().len() as f64).into())
}

fn append(args: &[Expression]) -> EvalResult<Expression> {
    let [list, item] = args else {
        return Err(SemanticError::argument_count("append"));
    };
    if !list.is_head_list() {
        return Err(SemanticError::new(
            ErrorKind::InvalidArgument,
            "Error: first argument to append not a list",
        ));
    }
    let mut result = list.clone();
    result.append_expression(item.clone());
    Ok(result)
}

fn join(args: &[Expression]) -> EvalResult<Expression> {
    if args.len() < 2 {
        return Err(SemanticError::new(
            ErrorKind::ArgumentCount,
            "Error: too few arguments in call to join",
        ));
    }
    let mut items = Vec::new();
    for arg in args {
        if !arg.is_head_list() {
            return Err(SemanticError::new(
                ErrorKind::InvalidArgument,
                "Error: argument to join not a list",
            ));
        }
        items.extend(arg.tail().iter().cloned());
    }
    Ok(Expression::list(items))
}

fn range(args: &[Expression]) -> EvalResult<Expression> {
    let [start, end, step] = args else {
        return Err(SemanticError::argument_count("range"));
    };
    let (Atom::Number(start), Atom::Number(end), Atom::Number(step)) =
        (start.head(), end.head(), step.head())
    else {
        return Err(SemanticError::invalid_argument("range"));
    };
    if !(start.is_finite() && end.is_finite() && step.is_finite()) {
        return Err(SemanticError::new(
            ErrorKind::InvalidRange,
            "Error: non-finite bound or increment in range",
        ));
    }
    if start >= end {
        return Err(SemanticError::new(
            ErrorKind::InvalidRange,
            "Error: begin greater than end in range",
        ));
    }
    if *step <= 0.0 {
        return Err(SemanticError::new(
            ErrorKind::InvalidRange,
            "Error: negative or zero increment in range",
        ));
    }
    // Element count is fixed up front; values are `start + k*step` so the end
    // bound is not lost to accumulated rounding.
    let steps = ((end - start) / step + 1e-9).floor();
    if steps >= MAX_RANGE_LEN as f64 {
        return Err(SemanticError::new(
            ErrorKind::InvalidRange,
            "Error: too many elements in range",
        ));
    }
    let count = steps as usize + 1;
    let items = (0..count)
        .map(|k| Expression::from(start + k as f64 * step))
        .collect();
    Ok(Expression::list(items))
}

fn check_procedure_arg(proc: &Expression, procedure: &str) -> EvalResult<()> {
    let head = proc.head();
    if head.is_number() || head.is_complex() || head.is_none() {
        return Err(SemanticError::new(
            ErrorKind::NotAProcedure,
            format!("Error: 1st argument to {procedure} not a procedure"),
        ));
    }
    Ok(())
}

/// `(apply proc (list a b))` → `(proc a b)`.
fn apply(args: &[Expression]) -> EvalResult<Expression> {
    let [proc, list] = args else {
        return Err(SemanticError::argument_count("apply"));
    };
    check_procedure_arg(proc, "apply")?;
    if !list.is_head_list() {
        return Err(SemanticError::new(
            ErrorKind::InvalidArgument,
            "Error: 2nd argument to apply not a list",
        ));
    }
    let mut call = proc.clone();
    for item in list.tail() {
        call.append_expression(item.clone());
    }
    Ok(call)
}

/// `(map proc (list a b))` → `(list (proc a) (proc b))`.
fn map(args: &[Expression]) -> EvalResult<Expression> {
    let [proc, list] = args else {
        return Err(SemanticError::argument_count("map"));
    };
    check_procedure_arg(proc, "map")?;
    if !list.is_head_list() {
        return Err(SemanticError::new(
            ErrorKind::InvalidArgument,
            "Error: 2nd argument to map not a list",
        ));
    }
    let calls = list
        .tail()
        .iter()
        .map(|item| {
            let mut call = proc.clone();
            call.append_expression(item.clone());
            call
        })
        .collect();
    Ok(Expression::list(calls))
}

// ─────────────────────────────────────────────────────────────────────
// Properties
// ─────────────────────────────────────────────────────────────────────

fn property_key<'a>(key: &'a Expression) -> EvalResult<&'a str> {
    if !key.head().is_string_literal() {
        return Err(SemanticError::new(
            ErrorKind::PropertyKey,
            "Error: key is not a string",
        ));
    }
    Ok(key.head().as_symbol())
}

fn set_property(args: &[Expression]) -> EvalResult<Expression> {
    let [key, value, target] = args else {
        return Err(SemanticError::argument_count("set-property"));
    };
    let key = property_key(key)?;
    let mut result = target.clone();
    result.set_property(key, value.clone());
    Ok(result)
}

fn get_property(args: &[Expression]) -> EvalResult<Expression> {
    let [key, target] = args else {
        return Err(SemanticError::argument_count("get-property"));
    };
    let key = property_key(key)?;
    Ok(target.property(key).cloned().unwrap_or_default())
}
