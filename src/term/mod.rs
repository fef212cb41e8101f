//! Hashconsed terms.
//!
//! The factory is a `static_ref` for easy creation. The `R`eal term structure
//! is [`RTerm`](enum.RTerm.html) which is hashconsed into
//! [`Term`](type.Term.html). The factory is not directly accessible, terms
//! are created *via* the functions in this module, such as [var](fn.var.html),
//! [int](fn.int.html), [app](fn.app.html), *etc.*
//!
//! Terms are lightly normalized at creation: constants fold, conjunctions and
//! disjunctions flatten and drop their neutral elements, double negations
//! disappear. Terms are *not* rule atoms: a predicate application is not a
//! term, only operator applications are.
//!
//! A variable is a `usize` wrapped in a zero-cost
//! [`VarIdx`](../common/struct.VarIdx.html). Variables are given meaning by
//! the [`VarInfo`s](../info/struct.VarInfo.html) stored in a rule, and carry
//! their type so that substitution and unification can check sorts without a
//! context.

use hashconsing::HConsed;

use crate::common::*;

mod factory;
pub mod subst;

#[cfg(test)]
mod test;

pub use self::factory::*;

/// Types.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Typ {
    /// Integers.
    Int,
    /// Booleans.
    Bool,
}
impl Typ {
    /// True if the type is boolean.
    pub fn is_bool(self) -> bool {
        self == Typ::Bool
    }
    /// True if the type is integer.
    pub fn is_int(self) -> bool {
        self == Typ::Int
    }
}
impl ::std::fmt::Display for Typ {
    fn fmt(&self, fmt: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        match self {
            Typ::Int => write!(fmt, "Int"),
            Typ::Bool => write!(fmt, "Bool"),
        }
    }
}

/// Operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Ge,
    /// Less than or equal to.
    Le,
    /// Less than.
    Lt,
    /// Equality.
    Eql,
    /// Negation.
    Not,
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
    /// Implication.
    Impl,
}
impl Op {
    /// String representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Le => "<=",
            Op::Lt => "<",
            Op::Eql => "=",
            Op::Not => "not",
            Op::And => "and",
            Op::Or => "or",
            Op::Impl => "=>",
        }
    }
    /// True for `>`, `>=`, `<=`, `<` and `=`.
    pub fn is_relation(self) -> bool {
        match self {
            Op::Gt | Op::Ge | Op::Le | Op::Lt | Op::Eql => true,
            _ => false,
        }
    }
}
impl ::std::fmt::Display for Op {
    fn fmt(&self, fmt: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        write!(fmt, "{}", self.as_str())
    }
}

/// A real term.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum RTerm {
    /// A rule variable, with its type.
    Var(Typ, VarIdx),
    /// A constant.
    Cst(Val),
    /// An operator application.
    App {
        /// The operator.
        op: Op,
        /// The arguments.
        args: Vec<Term>,
    },
}

/// A hashconsed term.
pub type Term = HConsed<RTerm>;

impl RTerm {
    /// Type of the term.
    pub fn typ(&self) -> Typ {
        match self {
            RTerm::Var(typ, _) => *typ,
            RTerm::Cst(val) => val.typ(),
            RTerm::App { op, .. } => match op {
                Op::Add | Op::Sub | Op::Mul => Typ::Int,
                _ => Typ::Bool,
            },
        }
    }

    /// The variable index if the term is a variable.
    pub fn var_idx(&self) -> Option<VarIdx> {
        match self {
            RTerm::Var(_, idx) => Some(*idx),
            _ => None,
        }
    }

    /// The value if the term is a constant.
    pub fn val(&self) -> Option<&Val> {
        match self {
            RTerm::Cst(val) => Some(val),
            _ => None,
        }
    }

    /// Boolean a constant boolean term evaluates to.
    pub fn bool(&self) -> Option<bool> {
        self.val().and_then(Val::bool)
    }

    /// Integer a constant integer term evaluates to.
    pub fn int(&self) -> Option<Int> {
        self.val().and_then(|val| val.int().cloned())
    }

    /// The kids of the term, if any.
    pub fn kids(&self) -> Option<&[Term]> {
        if let RTerm::App { args, .. } = self {
            Some(args)
        } else {
            None
        }
    }

    /// The kids of a conjunction, if any.
    pub fn conj_inspect(&self) -> Option<&[Term]> {
        if let RTerm::App { op: Op::And, args } = self {
            Some(args)
        } else {
            None
        }
    }

    /// Variable substitution, total by construction of the map or not.
    ///
    /// Variables not in the map are left alone. Returns a boolean indicating
    /// whether any substitution happened.
    pub fn subst<Map: VarIndexed<Term>>(&self, map: &Map) -> (Term, bool) {
        match self {
            RTerm::Var(typ, idx) => {
                if let Some(term) = map.var_get(*idx) {
                    (term.clone(), true)
                } else {
                    (var(*idx, *typ), false)
                }
            }
            RTerm::Cst(val) => (cst(val.clone()), false),
            RTerm::App { op, args } => {
                let mut changed = false;
                let mut nu_args = Vec::with_capacity(args.len());
                for arg in args {
                    let (nu_arg, b) = arg.subst(map);
                    changed = changed || b;
                    nu_args.push(nu_arg)
                }
                (app(*op, nu_args), changed)
            }
        }
    }

    /// Total variable substitution.
    ///
    /// Returns `None` if some variable of the term is not in the map.
    pub fn subst_total<Map: VarIndexed<Term>>(&self, map: &Map) -> Option<Term> {
        match self {
            RTerm::Var(_, idx) => map.var_get(*idx).cloned(),
            RTerm::Cst(val) => Some(cst(val.clone())),
            RTerm::App { op, args } => {
                let mut nu_args = Vec::with_capacity(args.len());
                for arg in args {
                    nu_args.push(arg.subst_total(map)?)
                }
                Some(app(*op, nu_args))
            }
        }
    }

    /// Term evaluation.
    ///
    /// Fails on unbound variables and type clashes.
    pub fn eval<Map: VarIndexed<Val>>(&self, model: &Map) -> Res<Val> {
        match self {
            RTerm::Var(_, idx) => {
                if let Some(val) = model.var_get(*idx) {
                    Ok(val.clone())
                } else {
                    bail!("evaluation failed: unbound variable {}", idx.default_str())
                }
            }
            RTerm::Cst(val) => Ok(val.clone()),
            RTerm::App { op, args } => {
                let mut vals = Vec::with_capacity(args.len());
                for arg in args {
                    vals.push(arg.eval(model)?)
                }
                eval_op(*op, vals)
            }
        }
    }

    /// Writes the term with a special function for variables.
    pub fn write<W, WriteVar>(&self, w: &mut W, write_var: &WriteVar) -> IoRes<()>
    where
        W: Write,
        WriteVar: Fn(&mut W, VarIdx) -> IoRes<()>,
    {
        match self {
            RTerm::Var(_, idx) => write_var(w, *idx),
            RTerm::Cst(val) => write!(w, "{}", val),
            RTerm::App { op, args } => {
                write!(w, "({}", op)?;
                for arg in args {
                    write!(w, " ")?;
                    arg.write(w, write_var)?
                }
                write!(w, ")")
            }
        }
    }
}

impl ::std::fmt::Display for RTerm {
    fn fmt(&self, fmt: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        let mut buf = Vec::new();
        self.write(&mut buf, &|w, var| var.default_write(w))
            .map_err(|_| ::std::fmt::Error)?;
        write!(fmt, "{}", String::from_utf8_lossy(&buf))
    }
}

/// Evaluates an operator application over values.
pub fn eval_op(op: Op, vals: Vec<Val>) -> Res<Val> {
    macro_rules! ints {
        ($vals:expr) => {{
            let mut ints = Vec::with_capacity($vals.len());
            for val in &$vals {
                if let Some(i) = val.int() {
                    ints.push(i.clone())
                } else {
                    bail!("evaluation failed: expected Int argument for `{}`", op)
                }
            }
            ints
        }};
    }
    macro_rules! bools {
        ($vals:expr) => {{
            let mut bools = Vec::with_capacity($vals.len());
            for val in &$vals {
                if let Some(b) = val.bool() {
                    bools.push(b)
                } else {
                    bail!("evaluation failed: expected Bool argument for `{}`", op)
                }
            }
            bools
        }};
    }
    macro_rules! binary {
        ($vals:expr) => {{
            if $vals.len() != 2 {
                bail!("evaluation failed: `{}` expects two arguments", op)
            }
        }};
    }

    let res = match op {
        Op::Add => {
            let ints = ints!(vals);
            Val::I(ints.into_iter().sum())
        }
        Op::Sub => {
            let ints = ints!(vals);
            match ints.len() {
                1 => Val::I(-ints[0].clone()),
                2 => Val::I(ints[0].clone() - ints[1].clone()),
                _ => bail!("evaluation failed: `-` expects one or two arguments"),
            }
        }
        Op::Mul => {
            let ints = ints!(vals);
            Val::I(ints.into_iter().product())
        }
        Op::Gt => {
            binary!(vals);
            let ints = ints!(vals);
            Val::B(ints[0] > ints[1])
        }
        Op::Ge => {
            binary!(vals);
            let ints = ints!(vals);
            Val::B(ints[0] >= ints[1])
        }
        Op::Le => {
            binary!(vals);
            let ints = ints!(vals);
            Val::B(ints[0] <= ints[1])
        }
        Op::Lt => {
            binary!(vals);
            let ints = ints!(vals);
            Val::B(ints[0] < ints[1])
        }
        Op::Eql => {
            binary!(vals);
            Val::B(vals[0] == vals[1])
        }
        Op::Not => {
            if vals.len() != 1 {
                bail!("evaluation failed: `not` expects one argument")
            }
            let bools = bools!(vals);
            Val::B(!bools[0])
        }
        Op::And => {
            let bools = bools!(vals);
            Val::B(bools.into_iter().all(|b| b))
        }
        Op::Or => {
            let bools = bools!(vals);
            Val::B(bools.into_iter().any(|b| b))
        }
        Op::Impl => {
            binary!(vals);
            let bools = bools!(vals);
            Val::B(!bools[0] || bools[1])
        }
    };
    Ok(res)
}

/// Variables appearing in a term.
pub fn vars(term: &Term) -> VarSet {
    let mut set = VarSet::new();
    map_vars(term, &mut |idx, _| {
        set.insert(idx);
    });
    set
}

/// Applies a function to all variables of a term, left-to-right.
pub fn map_vars<F: FnMut(VarIdx, Typ)>(term: &Term, f: &mut F) {
    match term.get() {
        RTerm::Var(typ, idx) => f(*idx, *typ),
        RTerm::Cst(_) => (),
        RTerm::App { args, .. } => {
            for arg in args {
                map_vars(arg, f)
            }
        }
    }
}
