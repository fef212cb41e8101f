//! Eager inlining: tail atoms with a unique inlining candidate.

use crate::common::*;
use crate::inline::{InlineOutcome, RuleInliner};
use crate::rules::{Rule, RuleSet, Stratifier};

/// What one eager step did to a rule.
enum EagerStep {
    /// Nothing to do.
    Unchanged,
    /// The rule got replaced by a resolvent.
    Replaced(Rule),
    /// The rule got deleted, some tail atom is underivable or the resolvent
    /// is unsatisfiable.
    Deleted,
}

impl<'a> RuleInliner<'a> {
    /// Checks that a rule is oriented in the rewrite ordering.
    ///
    /// The ordering is lexicographic, comparing atoms first on the stratum
    /// they are in, then on arity, then on the id of their predicate. Using a
    /// non-oriented rule as an unconditional rewriter could loop forever when
    /// a component was not fully broken.
    fn is_oriented_rewriter(&self, rule: &Rule, strat: &Stratifier) -> Res<bool> {
        let head_pred = rule.head().pred();
        let head_strat = strat.pred_strat(head_pred)?;
        let head_arity = self.source.preds()[head_pred].arity();

        for ta in rule.tail() {
            if ta.neg {
                continue;
            }
            let pred = ta.atom.pred();
            let pred_strat = strat.pred_strat(pred)?;
            debug_assert! { pred_strat <= head_strat }

            if pred_strat == head_strat {
                let arity = self.source.preds()[pred].arity();
                if arity > head_arity || (arity == head_arity && pred >= head_pred) {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// One eager step on one rule.
    ///
    /// Scans the positive tail for an atom whose predicate (different from
    /// the head, without facts) has a unique inlining candidate:
    ///
    /// - no defining rule: the atom is underivable, the rule is deleted;
    /// - one defining rule: that rule is the candidate;
    /// - otherwise, the rules that unify with the atom, if there is exactly
    ///   one; several unifying rules would duplicate the caller, skip.
    ///
    /// The candidate must be an oriented rewriter. An unsatisfiable resolvent
    /// deletes the rule; deletions go to the model converter.
    fn eager_step(&mut self, rule: &Rule, rules: &RuleSet) -> Res<EagerStep> {
        let strat = rules.stratifier()?;
        let head_pred = rule.head().pred();

        'tail_atoms: for (position, ta) in rule.tail().iter().enumerate() {
            if ta.neg {
                continue 'tail_atoms;
            }
            let pred = ta.atom.pred();
            if pred == head_pred || self.preds_with_facts.contains(&pred) {
                continue 'tail_atoms;
            }

            let pred_rules = rules.rules_of(pred);
            let candidate = if pred_rules.is_empty() {
                None
            } else if pred_rules.len() == 1 {
                Some(pred_rules[0])
            } else {
                let mut candidate = None;
                for idx in pred_rules {
                    if !self.unifier.unify(rule, position, &rules.rules()[*idx]) {
                        // Skip rules that do not unify with the tail atom.
                        continue;
                    }
                    if candidate.is_some() {
                        // Two rules can be inlined into this tail atom;
                        // inlining would increase the overall rule count.
                        continue 'tail_atoms;
                    }
                    candidate = Some(*idx)
                }
                candidate
            };

            let candidate = if let Some(idx) = candidate {
                rules.rules()[idx].clone()
            } else {
                // Nothing derives the atom and the predicate has no ground
                // facts: the rule is unsatisfiable.
                log! { @3 |
                    "nothing derives {}, deleting a rule of {}",
                    conf.emph(& self.source.preds()[pred].name),
                    conf.emph(& self.source.preds()[head_pred].name)
                }
                if let Some(mc) = self.mc.as_mut() {
                    mc.insert_rule(rule.clone())
                }
                if let Some(pc) = self.pc.as_mut() {
                    pc.deleted(rule.clone())
                }
                return Ok(EagerStep::Deleted);
            };

            if !self.is_oriented_rewriter(&candidate, strat)? {
                // Inlining with a non-simplifying rule may loop, skip.
                continue 'tail_atoms;
            }

            match self.try_to_inline(rule, &candidate, position)? {
                InlineOutcome::Rule(resolvent) => return Ok(EagerStep::Replaced(resolvent)),
                InlineOutcome::Quantified => continue 'tail_atoms,
                InlineOutcome::Mismatch | InlineOutcome::Unsat => {
                    if let Some(mc) = self.mc.as_mut() {
                        mc.insert_rule(rule.clone())
                    }
                    if let Some(pc) = self.pc.as_mut() {
                        pc.deleted(rule.clone())
                    }
                    return Ok(EagerStep::Deleted);
                }
            }
        }
        Ok(EagerStep::Unchanged)
    }

    /// One eager scan over a closed rule set.
    ///
    /// Each rule is stepped to fixpoint against the input set. Returns the
    /// new set if anything changed.
    fn eager_pass(&mut self, rules: &RuleSet) -> Res<Option<RuleSet>> {
        let mut res = rules.clone_empty();
        let mut done_something = false;

        for (_, rule) in rules.rules().index_iter() {
            let mut rule = rule.clone();
            let keep = loop {
                match self.eager_step(&rule, rules)? {
                    EagerStep::Replaced(nu_rule) => {
                        rule = nu_rule;
                        done_something = true
                    }
                    EagerStep::Deleted => {
                        done_something = true;
                        break false;
                    }
                    EagerStep::Unchanged => break true,
                }
            };
            if keep {
                res.push_rule(rule);
            }
        }

        Ok(if done_something { Some(res) } else { None })
    }

    /// Eager inlining driver: rescans until a full scan changes nothing.
    pub(crate) fn eager(&mut self, rules: &RuleSet) -> Res<Option<RuleSet>> {
        let mut current: Option<RuleSet> = None;
        loop {
            let nu = {
                let set = current.as_ref().unwrap_or(rules);
                self.eager_pass(set)?
            };
            if let Some(mut nu_set) = nu {
                nu_set.close()?;
                current = Some(nu_set)
            } else {
                break;
            }
        }
        Ok(current)
    }
}
