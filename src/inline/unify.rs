//! Rule-level unification.

use crate::common::*;
use crate::rules::{simplify, Atom, Rule, TailAtom};
use crate::term::subst::Subst;

/// Unifier between a caller's tail atom and a callee's head.
///
/// [`unify`](struct.RuleUnifier.html#method.unify) computes the most general
/// unifier of `target.tail[tail_index]` (offset `0`) and `source.head`
/// (offset `1`), [`apply`](struct.RuleUnifier.html#method.apply) produces the
/// resolved rule.
pub struct RuleUnifier {
    /// Two-offset substitution.
    subst: Subst,
    /// Shift for surviving offset-`1` variables.
    delta: usize,
    /// True after a successful `unify`.
    ready: bool,
}

impl Default for RuleUnifier {
    fn default() -> Self {
        RuleUnifier::new()
    }
}

impl RuleUnifier {
    /// Constructor.
    pub fn new() -> Self {
        RuleUnifier {
            subst: Subst::new(),
            delta: 0,
            ready: false,
        }
    }

    /// True after a successful `unify`.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Most general unifier of a target tail atom and a source head.
    ///
    /// On success the unifier is *ready* and `apply` can run. On failure
    /// (symbol mismatch, occurs check or sort clash) no state survives.
    pub fn unify(&mut self, tgt: &Rule, tail_index: usize, src: &Rule) -> bool {
        self.ready = false;
        self.subst.clear();
        self.delta = ::std::cmp::max(tgt.vars().len(), src.vars().len());

        let atom = &tgt.tail()[tail_index].atom;
        let head = src.head();
        if atom.pred() != head.pred() || atom.args().len() != head.args().len() {
            return false;
        }
        for (tgt_arg, src_arg) in atom.args().iter().zip(head.args().iter()) {
            if !self.subst.unify(tgt_arg, 0, src_arg, 1) {
                return false;
            }
        }
        self.ready = true;
        true
    }

    /// Produces the resolved rule of a ready unifier.
    ///
    /// The new head is the substituted target head; the new tail is the
    /// substituted target tail without position `tail_index`, followed by the
    /// substituted source tail, polarities preserved and duplicates removed.
    /// The resolvent derives from the target, has normalized variables, and
    /// goes through the interpreted simplifier: `None` means the interpreted
    /// tail is unsatisfiable and the resolvent is vacuous.
    pub fn apply(
        &self,
        tgt: &Rule,
        tail_index: usize,
        src: &Rule,
        cfg: &InlineConf,
    ) -> Option<Rule> {
        debug_assert! { self.ready }

        let head = self.apply_atom(tgt.head(), 0);

        let mut tail = Vec::with_capacity(tgt.tail().len() + src.tail().len() - 1);
        for (index, ta) in tgt.tail().iter().enumerate() {
            if index != tail_index {
                tail.push(TailAtom {
                    atom: self.apply_atom(&ta.atom, 0),
                    neg: ta.neg,
                })
            }
        }
        for ta in src.tail() {
            tail.push(TailAtom {
                atom: self.apply_atom(&ta.atom, 1),
                neg: ta.neg,
            })
        }
        remove_duplicate_tails(&mut tail);

        let mut terms = Vec::with_capacity(tgt.terms().len() + src.terms().len());
        for term in tgt.terms() {
            terms.push(self.subst.apply(term, 0, self.delta))
        }
        for term in src.terms() {
            terms.push(self.subst.apply(term, 1, self.delta))
        }

        let mut rule = Rule::new(head, tail, terms);
        rule.set_from(tgt.from());
        if cfg.fix_unbound_vars {
            rule.fix_unbound_vars()
        }

        simplify::rule(rule)
    }

    /// Applies the substitution to an atom at an offset.
    fn apply_atom(&self, atom: &Atom, off: u8) -> Atom {
        let mut args = VarMap::with_capacity(atom.args().len());
        for arg in atom.args().iter() {
            args.push(self.subst.apply(arg, off, self.delta));
        }
        Atom::new(atom.pred(), args)
    }

    /// Rule-scoped substitution recovered from the unifier.
    ///
    /// Maps every declared variable of the rule through the offset of its
    /// side of the resolution, `0` for the target and `1` for the source.
    pub fn rule_subst(&self, rule: &Rule, is_tgt: bool) -> VarMap<Term> {
        debug_assert! { self.ready }
        let off = if is_tgt { 0 } else { 1 };
        rule.vars()
            .iter()
            .map(|info| {
                self.subst
                    .apply(&term::var(info.idx, info.typ), off, self.delta)
            })
            .collect()
    }
}

/// De-duplicates tail atoms by structural equality of atom plus polarity.
///
/// Keeps first occurrences.
pub fn remove_duplicate_tails(tail: &mut Vec<TailAtom>) {
    let mut seen: HashSet<TailAtom> = HashSet::with_capacity(tail.len());
    tail.retain(|ta| seen.insert(ta.clone()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rules::RuleSet;
    use crate::term::Typ;

    fn atom(pred: PrdIdx, args: Vec<Term>) -> Atom {
        Atom::new(pred, args.into_iter().collect())
    }

    #[test]
    fn resolve_chain_link() {
        let mut rs = RuleSet::new();
        let sig: Sig = vec![Typ::Int].into_iter().collect();
        let p = rs.push_pred("p", sig.clone());
        let q = rs.push_pred("q", sig.clone());
        let r = rs.push_pred("r", sig);
        let x = || term::var(0, Typ::Int);

        // p(x) :- q(x), x > 0.
        let tgt = Rule::new(
            atom(p, vec![x()]),
            vec![TailAtom::pos(atom(q, vec![x()]))],
            vec![term::gt(x(), term::int(0))],
        );
        // q(x) :- r(x), x < 10.
        let src = Rule::new(
            atom(q, vec![x()]),
            vec![TailAtom::pos(atom(r, vec![x()]))],
            vec![term::lt(x(), term::int(10))],
        );

        let mut unifier = RuleUnifier::new();
        assert! { unifier.unify(& tgt, 0, & src) }
        let res = unifier
            .apply(&tgt, 0, &src, &InlineConf::default())
            .expect("satisfiable resolvent");

        // p(x) :- r(x), x > 0, x < 10.
        assert_eq! { res.head().pred(), p }
        assert_eq! { res.tail().len(), 1 }
        assert_eq! { res.tail()[0].atom.pred(), r }
        assert_eq! { res.terms().len(), 2 }
        assert_eq! { res.vars().len(), 1 }
    }

    #[test]
    fn unsat_resolvent_dropped() {
        let mut rs = RuleSet::new();
        let sig: Sig = vec![Typ::Int].into_iter().collect();
        let p = rs.push_pred("p", sig.clone());
        let q = rs.push_pred("q", sig);
        let x = || term::var(0, Typ::Int);

        // p(x) :- q(x), x > 0 resolved with q(x) :- x < 0.
        let tgt = Rule::new(
            atom(p, vec![x()]),
            vec![TailAtom::pos(atom(q, vec![x()]))],
            vec![term::gt(x(), term::int(0))],
        );
        let src = Rule::new(atom(q, vec![x()]), vec![], vec![term::lt(x(), term::int(0))]);

        let mut unifier = RuleUnifier::new();
        assert! { unifier.unify(& tgt, 0, & src) }
        assert! { unifier.apply(& tgt, 0, & src, & InlineConf::default()).is_none() }
    }

    #[test]
    fn mismatch_fails() {
        let mut rs = RuleSet::new();
        let sig: Sig = vec![Typ::Int].into_iter().collect();
        let p = rs.push_pred("p", sig.clone());
        let q = rs.push_pred("q", sig);
        let x = || term::var(0, Typ::Int);

        // p(x) :- q(3) does not unify with q(4) :- true.
        let tgt = Rule::new(
            atom(p, vec![x()]),
            vec![TailAtom::pos(atom(q, vec![term::int(3)]))],
            vec![],
        );
        let src = Rule::new(atom(q, vec![term::int(4)]), vec![], vec![]);

        let mut unifier = RuleUnifier::new();
        assert! { !unifier.unify(& tgt, 0, & src) }
        assert! { !unifier.is_ready() }
    }

    #[test]
    fn duplicate_tails_merge() {
        let mut rs = RuleSet::new();
        let sig: Sig = vec![Typ::Int].into_iter().collect();
        let p = rs.push_pred("p", sig.clone());
        let q = rs.push_pred("q", sig.clone());
        let r = rs.push_pred("r", sig);
        let x = || term::var(0, Typ::Int);

        // p(x) :- q(x), r(x) resolved with q(x) :- r(x) merges the two r(x).
        let tgt = Rule::new(
            atom(p, vec![x()]),
            vec![
                TailAtom::pos(atom(q, vec![x()])),
                TailAtom::pos(atom(r, vec![x()])),
            ],
            vec![],
        );
        let src = Rule::new(
            atom(q, vec![x()]),
            vec![TailAtom::pos(atom(r, vec![x()]))],
            vec![],
        );

        let mut unifier = RuleUnifier::new();
        assert! { unifier.unify(& tgt, 0, & src) }
        let res = unifier
            .apply(&tgt, 0, &src, &InlineConf::default())
            .expect("satisfiable resolvent");
        assert_eq! { res.tail().len(), 1 }
        assert_eq! { res.tail()[0].atom.pred(), r }
    }
}
