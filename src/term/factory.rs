//! Term creation functions.

use hashconsing::HashConsign;

use crate::common::*;
use crate::term::{eval_op, Op, RTerm, Term, Typ};

hashconsing::consign! {
    /// Term factory.
    let factory = consign(conf.factory.term_capa) for RTerm;
}

/// Creates a variable.
#[inline]
pub fn var<V: Into<VarIdx>>(idx: V, typ: Typ) -> Term {
    factory.mk(RTerm::Var(typ, idx.into()))
}

/// Creates a constant.
#[inline]
pub fn cst<V: Into<Val>>(val: V) -> Term {
    factory.mk(RTerm::Cst(val.into()))
}

/// Creates an integer constant.
#[inline]
pub fn int<I: Into<Int>>(i: I) -> Term {
    cst(Val::I(i.into()))
}

/// Creates a boolean constant.
#[inline]
pub fn bool(b: bool) -> Term {
    cst(Val::B(b))
}

/// Creates the constant `true`.
#[inline]
pub fn tru() -> Term {
    bool(true)
}

/// Creates the constant `false`.
#[inline]
pub fn fls() -> Term {
    bool(false)
}

/// Creates an operator application.
///
/// Normalizes the term: constants fold, `and`/`or` flatten and drop their
/// neutral elements, double negations disappear, implications rewrite to
/// disjunctions.
pub fn app(op: Op, args: Vec<Term>) -> Term {
    normalize(op, args)
}

/// Creates an equality.
#[inline]
pub fn eq(lhs: Term, rhs: Term) -> Term {
    app(Op::Eql, vec![lhs, rhs])
}
/// Creates a `>`.
#[inline]
pub fn gt(lhs: Term, rhs: Term) -> Term {
    app(Op::Gt, vec![lhs, rhs])
}
/// Creates a `>=`.
#[inline]
pub fn ge(lhs: Term, rhs: Term) -> Term {
    app(Op::Ge, vec![lhs, rhs])
}
/// Creates a `<=`.
#[inline]
pub fn le(lhs: Term, rhs: Term) -> Term {
    app(Op::Le, vec![lhs, rhs])
}
/// Creates a `<`.
#[inline]
pub fn lt(lhs: Term, rhs: Term) -> Term {
    app(Op::Lt, vec![lhs, rhs])
}
/// Creates an addition.
#[inline]
pub fn add(args: Vec<Term>) -> Term {
    app(Op::Add, args)
}
/// Creates a subtraction.
#[inline]
pub fn sub(args: Vec<Term>) -> Term {
    app(Op::Sub, args)
}
/// Creates a multiplication.
#[inline]
pub fn mul(args: Vec<Term>) -> Term {
    app(Op::Mul, args)
}
/// Creates a negation.
#[inline]
pub fn not(term: Term) -> Term {
    app(Op::Not, vec![term])
}
/// Creates a conjunction.
#[inline]
pub fn and(args: Vec<Term>) -> Term {
    app(Op::And, args)
}
/// Creates a disjunction.
#[inline]
pub fn or(args: Vec<Term>) -> Term {
    app(Op::Or, args)
}
/// Creates an implication.
#[inline]
pub fn implies(lhs: Term, rhs: Term) -> Term {
    app(Op::Impl, vec![lhs, rhs])
}

/// Normalizing term constructor.
///
/// This function is not strongly normalizing, it only applies cheap local
/// rewrites at the top of the application.
fn normalize(op: Op, args: Vec<Term>) -> Term {
    match op {
        Op::And => {
            let mut nu_args = Vec::with_capacity(args.len());
            let mut seen: TermSet = TermSet::new();
            for arg in args {
                match arg.bool() {
                    Some(true) => continue,
                    Some(false) => return fls(),
                    None => (),
                }
                if let Some(kids) = arg.conj_inspect() {
                    for kid in kids {
                        if kid.bool() == Some(false) {
                            return fls();
                        }
                        if kid.bool() != Some(true) && seen.insert(kid.clone()) {
                            nu_args.push(kid.clone())
                        }
                    }
                } else if seen.insert(arg.clone()) {
                    nu_args.push(arg)
                }
            }
            match nu_args.len() {
                0 => tru(),
                1 => nu_args.pop().expect("pop on vector of length 1"),
                _ => factory.mk(RTerm::App {
                    op: Op::And,
                    args: nu_args,
                }),
            }
        }

        Op::Or => {
            let mut nu_args = Vec::with_capacity(args.len());
            let mut seen: TermSet = TermSet::new();
            for arg in args {
                match arg.bool() {
                    Some(false) => continue,
                    Some(true) => return tru(),
                    None => (),
                }
                if let RTerm::App {
                    op: Op::Or,
                    args: kids,
                } = arg.get()
                {
                    for kid in kids {
                        if kid.bool() == Some(true) {
                            return tru();
                        }
                        if kid.bool() != Some(false) && seen.insert(kid.clone()) {
                            nu_args.push(kid.clone())
                        }
                    }
                } else if seen.insert(arg.clone()) {
                    nu_args.push(arg)
                }
            }
            match nu_args.len() {
                0 => fls(),
                1 => nu_args.pop().expect("pop on vector of length 1"),
                _ => factory.mk(RTerm::App {
                    op: Op::Or,
                    args: nu_args,
                }),
            }
        }

        Op::Not => {
            debug_assert_eq! { args.len(), 1 }
            let arg = args
                .into_iter()
                .next()
                .expect("arity of `not` checked above");
            if let Some(b) = arg.bool() {
                return bool(!b);
            }
            if let RTerm::App {
                op: Op::Not,
                args: kids,
            } = arg.get()
            {
                return kids[0].clone();
            }
            factory.mk(RTerm::App {
                op: Op::Not,
                args: vec![arg],
            })
        }

        Op::Impl => {
            debug_assert_eq! { args.len(), 2 }
            let mut args = args;
            let rhs = args.pop().expect("arity of `=>` checked above");
            let lhs = args.pop().expect("arity of `=>` checked above");
            or(vec![not(lhs), rhs])
        }

        Op::Eql => {
            debug_assert_eq! { args.len(), 2 }
            if args[0] == args[1] {
                return tru();
            }
            cst_fold(Op::Eql, args)
        }

        Op::Gt | Op::Ge | Op::Le | Op::Lt | Op::Add | Op::Sub | Op::Mul => cst_fold(op, args),
    }
}

/// Folds an application when all arguments are constants.
fn cst_fold(op: Op, args: Vec<Term>) -> Term {
    if args.iter().all(|arg| arg.val().is_some()) {
        let vals: Vec<Val> = args
            .iter()
            .map(|arg| arg.val().expect("all arguments are values").clone())
            .collect();
        if let Ok(val) = eval_op(op, vals) {
            return cst(val);
        }
    }
    factory.mk(RTerm::App { op, args })
}
