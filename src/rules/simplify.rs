//! Interpreted tail simplification.
//!
//! Solver-free: the simplifier only performs constant pruning, propagation of
//! variable equalities, syntactic `t ∧ ¬t` detection and single-variable
//! interval reasoning. Anything it cannot decide stays in the rule.

use crate::common::*;
use crate::rules::Rule;

/// Simplifies the interpreted tail of a rule.
///
/// Returns `None` when the interpreted tail is unsatisfiable. The resulting
/// rule has normalized variables.
pub fn rule(mut rule: Rule) -> Option<Rule> {
    loop {
        // Flatten conjunctions, prune constants, drop duplicates.
        let mut terms = Vec::with_capacity(rule.terms().len());
        let mut seen = TermSet::new();
        for term in rule.terms() {
            let kids = if let Some(kids) = term.conj_inspect() {
                kids.to_vec()
            } else {
                vec![term.clone()]
            };
            for kid in kids {
                match kid.bool() {
                    Some(true) => continue,
                    Some(false) => return None,
                    None => (),
                }
                if seen.insert(kid.clone()) {
                    terms.push(kid)
                }
            }
        }

        // Propagate one variable equality, if any.
        let mut eq = None;
        'find_eq: for term in &terms {
            if let RTerm::App { op: Op::Eql, args } = term.get() {
                for (lhs, rhs) in &[(&args[0], &args[1]), (&args[1], &args[0])] {
                    if let Some(var) = lhs.var_idx() {
                        if !term::vars(rhs).contains(&var) {
                            eq = Some((term.clone(), var, (*rhs).clone()));
                            break 'find_eq;
                        }
                    }
                }
            }
        }

        if let Some((eq_term, var, binding)) = eq {
            terms.retain(|term| term != &eq_term);
            rule.set_terms(terms);
            let mut map: VarHMap<Term> = VarHMap::with_capacity(1);
            map.insert(var, binding);
            rule.subst(&map);
        } else {
            rule.set_terms(terms);
            break;
        }
    }

    // Syntactic contradiction.
    let mut set = TermSet::new();
    for term in rule.terms() {
        set.insert(term.clone());
    }
    for term in rule.terms() {
        if set.contains(&term::not(term.clone())) {
            return None;
        }
    }

    // Single-variable interval reasoning.
    if bounds_unsat(rule.terms()) {
        return None;
    }

    rule.normalize_vars();
    Some(rule)
}

/// Lower or upper bound on a variable, with strictness.
type Bound = Option<(Int, bool)>;

/// Bounds of a variable.
#[derive(Default)]
struct Bounds {
    /// Lower bound.
    lo: Bound,
    /// Upper bound.
    hi: Bound,
}
impl Bounds {
    /// Tightens the lower bound.
    fn tighten_lo(&mut self, cst: Int, strict: bool) {
        let tighter = match &self.lo {
            None => true,
            Some((old, old_strict)) => cst > *old || (cst == *old && strict && !old_strict),
        };
        if tighter {
            self.lo = Some((cst, strict))
        }
    }
    /// Tightens the upper bound.
    fn tighten_hi(&mut self, cst: Int, strict: bool) {
        let tighter = match &self.hi {
            None => true,
            Some((old, old_strict)) => cst < *old || (cst == *old && strict && !old_strict),
        };
        if tighter {
            self.hi = Some((cst, strict))
        }
    }
    /// True if no integer fits between the bounds.
    fn is_empty(&self) -> bool {
        if let (Some((lo, lo_strict)), Some((hi, hi_strict))) = (&self.lo, &self.hi) {
            lo > hi || (lo == hi && (*lo_strict || *hi_strict))
        } else {
            false
        }
    }
}

/// True if the single-variable comparison atoms of a conjunction have an
/// empty solution set.
fn bounds_unsat(terms: &[Term]) -> bool {
    let mut bounds: VarHMap<Bounds> = VarHMap::new();

    for term in terms {
        let (term, positive) = match term.get() {
            RTerm::App { op: Op::Not, args } => (&args[0], false),
            _ => (term, true),
        };
        let (op, args) = if let RTerm::App { op, args } = term.get() {
            (*op, args)
        } else {
            continue;
        };
        if !op.is_relation() || args.len() != 2 {
            continue;
        }

        // `var ⋈ cst` or `cst ⋈ var`, nothing else contributes.
        let (var, cst, op) = match (args[0].var_idx(), args[1].int()) {
            (Some(var), Some(cst)) => (var, cst, op),
            _ => match (args[1].var_idx(), args[0].int()) {
                (Some(var), Some(cst)) => (var, cst, flip(op)),
                _ => continue,
            },
        };
        // Negation inverts the comparison; disequalities yield no bound.
        let op = if positive {
            op
        } else {
            match op {
                Op::Gt => Op::Le,
                Op::Ge => Op::Lt,
                Op::Le => Op::Gt,
                Op::Lt => Op::Ge,
                _ => continue,
            }
        };

        let entry = bounds.entry(var).or_insert_with(Bounds::default);
        match op {
            Op::Gt => entry.tighten_lo(cst, true),
            Op::Ge => entry.tighten_lo(cst, false),
            Op::Lt => entry.tighten_hi(cst, true),
            Op::Le => entry.tighten_hi(cst, false),
            Op::Eql => {
                entry.tighten_lo(cst.clone(), false);
                entry.tighten_hi(cst, false)
            }
            _ => unreachable!("operator filtered to a relation above"),
        }
        if entry.is_empty() {
            return true;
        }
    }

    false
}

/// Mirrors a comparison to put the variable on the left.
fn flip(op: Op) -> Op {
    match op {
        Op::Gt => Op::Lt,
        Op::Ge => Op::Le,
        Op::Le => Op::Ge,
        Op::Lt => Op::Gt,
        op => op,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rules::{Atom, RuleSet, TailAtom};
    use crate::term::Typ;

    fn setup() -> (RuleSet, PrdIdx) {
        let mut rs = RuleSet::new();
        let sig: Sig = vec![Typ::Int].into_iter().collect();
        let p = rs.push_pred("p", sig);
        (rs, p)
    }

    fn p_of(pred: PrdIdx, arg: Term) -> Atom {
        Atom::new(pred, vec![arg].into_iter().collect())
    }

    #[test]
    fn interval_contradiction() {
        let (_rs, p) = setup();
        let x = term::var(0, Typ::Int);
        // p(x) :- x > 0, x < 0.
        let r = Rule::new(
            p_of(p, x.clone()),
            vec![],
            vec![
                term::gt(x.clone(), term::int(0)),
                term::lt(x.clone(), term::int(0)),
            ],
        );
        assert! { rule(r).is_none() }
    }

    #[test]
    fn strict_bounds_meet() {
        let (_rs, p) = setup();
        let x = term::var(0, Typ::Int);
        // x >= 3, x <= 3 is satisfiable; x > 3, x <= 3 is not.
        let sat = Rule::new(
            p_of(p, x.clone()),
            vec![],
            vec![
                term::ge(x.clone(), term::int(3)),
                term::le(x.clone(), term::int(3)),
            ],
        );
        assert! { rule(sat).is_some() }

        let unsat = Rule::new(
            p_of(p, x.clone()),
            vec![],
            vec![
                term::gt(x.clone(), term::int(3)),
                term::le(x.clone(), term::int(3)),
            ],
        );
        assert! { rule(unsat).is_none() }
    }

    #[test]
    fn syntactic_clash() {
        let (_rs, p) = setup();
        let x = term::var(0, Typ::Int);
        let y = term::var(1, Typ::Int);
        let atom = term::gt(x.clone(), y.clone());
        let r = Rule::new(
            p_of(p, x.clone()),
            vec![],
            vec![atom.clone(), term::not(atom)],
        );
        assert! { rule(r).is_none() }
    }

    #[test]
    fn equality_propagation() {
        let (_rs, p) = setup();
        let x = term::var(0, Typ::Int);
        let y = term::var(1, Typ::Int);
        // p(x) :- x = y + 1, y > 0 rewrites the head argument.
        let r = Rule::new(
            p_of(p, x.clone()),
            vec![],
            vec![
                term::eq(x.clone(), term::add(vec![y.clone(), term::int(1)])),
                term::gt(y.clone(), term::int(0)),
            ],
        );
        let r = rule(r).expect("satisfiable");
        // One constraint left, head argument is now (+ v_0 1).
        assert_eq! { r.terms().len(), 1 }
        assert_eq! {
            r.head().args().iter().next().unwrap(),
            & term::add(vec![ term::var(0, Typ::Int), term::int(1) ])
        }
    }

    #[test]
    fn true_constraints_vanish() {
        let (_rs, p) = setup();
        let x = term::var(0, Typ::Int);
        let r = Rule::new(
            p_of(p, x.clone()),
            vec![],
            vec![term::eq(term::int(2), term::int(2))],
        );
        let r = rule(r).expect("satisfiable");
        assert! { r.terms().is_empty() }
    }
}
