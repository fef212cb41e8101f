//! Two-offset substitution and unification.
//!
//! The two rules taking part in a resolution step keep their variables
//! disjoint by tagging each variable with an offset, `0` for the target and
//! `1` for the source, instead of renaming one of the rules. The offsets
//! disappear when the substitution is applied: surviving offset-`1` variables
//! shift up by a delta chosen above both rules' variable counts, and the
//! resolved rule's variable normalization makes indices dense again.

use crate::common::*;
use crate::term::{RTerm, Term, Typ};

/// A variable tagged with its offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffVar {
    /// Variable index.
    pub var: VarIdx,
    /// Offset, `0` or `1`.
    pub off: u8,
}
impl OffVar {
    /// Constructor.
    pub fn new<V: Into<VarIdx>>(var: V, off: u8) -> Self {
        OffVar {
            var: var.into(),
            off,
        }
    }
}

/// A substitution over two variable offsets.
///
/// Bindings map offset variables to terms that live at an offset themselves,
/// so unification never needs to rename anything. Bindings are chased lazily.
#[derive(Debug, Clone, Default)]
pub struct Subst {
    /// Bindings.
    map: HashMap<OffVar, (Term, u8)>,
}
impl Subst {
    /// Constructor.
    pub fn new() -> Self {
        Subst {
            map: HashMap::new(),
        }
    }

    /// Forgets all bindings.
    pub fn clear(&mut self) {
        self.map.clear()
    }

    /// True if there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Representative of a term at an offset: chases variable bindings.
    fn walk(&self, mut term: Term, mut off: u8) -> (Term, u8) {
        while let RTerm::Var(_, idx) = term.get() {
            if let Some((bound, bound_off)) = self.map.get(&OffVar {
                var: *idx,
                off,
            }) {
                term = bound.clone();
                off = *bound_off
            } else {
                break;
            }
        }
        (term, off)
    }

    /// Occurs check, modulo the current bindings.
    fn occurs(&self, var: OffVar, term: &Term, off: u8) -> bool {
        let (term, off) = self.walk(term.clone(), off);
        match term.get() {
            RTerm::Var(_, idx) => OffVar { var: *idx, off } == var,
            RTerm::Cst(_) => false,
            RTerm::App { args, .. } => args.iter().any(|arg| self.occurs(var, arg, off)),
        }
    }

    /// Binds a variable, with occurs and sort checks.
    fn bind(&mut self, var: OffVar, typ: Typ, term: Term, off: u8) -> bool {
        if term.typ() != typ || self.occurs(var, &term, off) {
            return false;
        }
        let prev = self.map.insert(var, (term, off));
        debug_assert! { prev.is_none() }
        true
    }

    /// Unifies two terms living at two offsets.
    ///
    /// Extends the current bindings on success. On failure the bindings are
    /// meaningless and the substitution must be `clear`ed before reuse.
    pub fn unify(&mut self, lhs: &Term, lhs_off: u8, rhs: &Term, rhs_off: u8) -> bool {
        let (lhs, lhs_off) = self.walk(lhs.clone(), lhs_off);
        let (rhs, rhs_off) = self.walk(rhs.clone(), rhs_off);

        if lhs_off == rhs_off && lhs == rhs {
            return true;
        }

        match (lhs.get(), rhs.get()) {
            (RTerm::Var(typ, idx), _) => self.bind(
                OffVar {
                    var: *idx,
                    off: lhs_off,
                },
                *typ,
                rhs.clone(),
                rhs_off,
            ),
            (_, RTerm::Var(typ, idx)) => self.bind(
                OffVar {
                    var: *idx,
                    off: rhs_off,
                },
                *typ,
                lhs.clone(),
                lhs_off,
            ),
            (RTerm::Cst(lft), RTerm::Cst(rgt)) => lft == rgt,
            (
                RTerm::App {
                    op: lft_op,
                    args: lft_args,
                },
                RTerm::App {
                    op: rgt_op,
                    args: rgt_args,
                },
            ) => {
                if lft_op != rgt_op || lft_args.len() != rgt_args.len() {
                    return false;
                }
                for (lft, rgt) in lft_args.iter().zip(rgt_args.iter()) {
                    if !self.unify(lft, lhs_off, rgt, rhs_off) {
                        return false;
                    }
                }
                true
            }
            _ => false,
        }
    }

    /// Applies the substitution to a term at an offset.
    ///
    /// Surviving offset-`1` variables shift up by `delta`, which must be at
    /// least the variable count of both offsets for the result to be free of
    /// captures.
    pub fn apply(&self, term: &Term, off: u8, delta: usize) -> Term {
        match term.get() {
            RTerm::Var(typ, idx) => {
                if let Some((bound, bound_off)) = self.map.get(&OffVar {
                    var: *idx,
                    off,
                }) {
                    self.apply(&bound.clone(), *bound_off, delta)
                } else if off == 0 {
                    term::var(*idx, *typ)
                } else {
                    term::var(*idx + delta, *typ)
                }
            }
            RTerm::Cst(_) => term.clone(),
            RTerm::App { op, args } => {
                let args = args.iter().map(|arg| self.apply(arg, off, delta)).collect();
                term::app(*op, args)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term;
    use crate::term::Op;

    #[test]
    fn same_var_different_offsets() {
        // v_0@0 and v_0@1 are different variables.
        let x = term::var(0, Typ::Int);
        let one = term::int(1);

        let mut subst = Subst::new();
        assert! { subst.unify(&x, 0, &one, 1) }
        assert_eq! { subst.apply(&x, 0, 10), one }

        subst.clear();
        assert! { subst.unify(&x, 0, &x, 1) }
        // v_0@0 resolves to v_0@1, which shifts by delta.
        assert_eq! { subst.apply(&x, 0, 10), term::var(10, Typ::Int) }
    }

    #[test]
    fn shared_bindings_propagate() {
        // v_0@0 = v_1@1, then v_1@1 = 7: both sides resolve to 7.
        let x = term::var(0, Typ::Int);
        let y = term::var(1, Typ::Int);
        let seven = term::int(7);

        let mut subst = Subst::new();
        assert! { subst.unify(&x, 0, &y, 1) }
        assert! { subst.unify(&y, 1, &seven, 0) }
        assert_eq! { subst.apply(&x, 0, 10), seven }
        assert_eq! { subst.apply(&y, 1, 10), seven }
    }

    #[test]
    fn occurs_check() {
        // v_0@0 against (+ v_0 1)@0 fails, same offset.
        let x = term::var(0, Typ::Int);
        let x_plus_one = term::add(vec![x.clone(), term::int(1)]);
        let mut subst = Subst::new();
        assert! { !subst.unify(&x, 0, &x_plus_one, 0) }

        // Different offsets are different variables, so this succeeds.
        subst.clear();
        assert! { subst.unify(&x, 0, &x_plus_one, 1) }
    }

    #[test]
    fn symbol_clash() {
        let x = term::var(0, Typ::Int);
        let add = term::app(Op::Add, vec![x.clone(), term::var(1, Typ::Int)]);
        let mul = term::app(Op::Mul, vec![x.clone(), term::var(1, Typ::Int)]);
        let mut subst = Subst::new();
        assert! { !subst.unify(&add, 0, &mul, 1) }
    }

    #[test]
    fn sort_clash() {
        let x = term::var(0, Typ::Bool);
        let seven = term::int(7);
        let mut subst = Subst::new();
        assert! { !subst.unify(&x, 0, &seven, 1) }
    }
}
