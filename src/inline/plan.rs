//! Inlining planner: occurrence analysis, admissibility, cycle breaking and
//! multiplier control.

use crate::common::*;
use crate::inline::RuleInliner;
use crate::rules::{Rule, RuleSet};

impl<'a> RuleInliner<'a> {
    /// Single pass over the source populating the occurrence counters.
    fn count_pred_occurrences(&mut self) {
        self.preds_with_facts = self.source.preds_with_facts();

        for (_, rule) in self.source.rules().index_iter() {
            let head_pred = rule.head().pred();
            *self.head_ctr.entry(head_pred).or_insert(0) += 1;

            if !rule.tail().is_empty() || !rule.terms().is_empty() {
                *self.head_nonempty_tail_ctr.entry(head_pred).or_insert(0) += 1;
            }

            for ta in rule.tail() {
                if ta.neg {
                    self.preds_with_neg.insert(ta.atom.pred());
                } else {
                    *self.tail_ctr.entry(ta.atom.pred()).or_insert(0) += 1;
                }
            }
        }
    }

    /// Number of rules with this head predicate.
    pub(crate) fn head_count(&self, pred: PrdIdx) -> usize {
        self.head_ctr.get(&pred).cloned().unwrap_or(0)
    }
    /// Number of positive tail occurrences of this predicate.
    fn tail_count(&self, pred: PrdIdx) -> usize {
        self.tail_ctr.get(&pred).cloned().unwrap_or(0)
    }

    /// True if the predicate may be inlined.
    ///
    /// Hard conditions keep the pass sound: the predicate is not a declared
    /// output, has no ground facts, never appears negated, and was not
    /// forbidden by the cycle breaker or the multiplier guard. The soft
    /// conditions bound the blowup: at most one defining rule, or at most one
    /// call site and at most four defining rules.
    pub(crate) fn inlining_allowed(&self, pred: PrdIdx) -> bool {
        if self.source.is_output(pred)
            || self.preds_with_facts.contains(&pred)
            || self.preds_with_neg.contains(&pred)
            || self.forbidden.contains(&pred)
        {
            return false;
        }

        self.head_count(pred) <= 1 || (self.tail_count(pred) <= 1 && self.head_count(pred) <= 4)
    }

    /// The closed sub-rule-set of the rules with an admissible head.
    ///
    /// The sub-set is stratifiable since the source, its superset, is.
    fn create_allowed_rule_set(&self) -> Res<RuleSet> {
        let mut res = self.source.clone_empty();
        for (_, rule) in self.source.rules().index_iter() {
            if self.inlining_allowed(rule.head().pred()) {
                res.push_rule(rule.clone());
            }
        }
        res.close()?;
        Ok(res)
    }

    /// Forbids one predicate of each non-trivial component.
    ///
    /// Returns true if some predicate was forbidden, false when the
    /// admissible sub-set is already acyclic.
    fn forbid_preds_from_cycles(&mut self, rules: &RuleSet) -> Res<bool> {
        let mut something_forbidden = false;

        let strat = rules.stratifier()?;
        for comp in strat.strats() {
            if !strat.is_non_trivial(comp) {
                continue;
            }
            log! { @3 |
                "breaking a cycle, forbidding {}",
                conf.emph(& self.source.preds()[comp[0]].name)
            }
            self.forbidden.insert(comp[0]);
            something_forbidden = true
        }
        Ok(something_forbidden)
    }

    /// Forbids predicates whose inlining would compound two multipliers.
    ///
    /// Walks the admissible sub-set in stratum order; a predicate that
    /// already has several defining rules may not absorb a multi-rule callee,
    /// and a predicate with several call sites forbids its multi-rule
    /// callees. Otherwise the predicate is promoted to multi-head with its
    /// rule count scaled by the callee's. Finally, the non-admissible rules
    /// may call at most one multi-rule admissible predicate each.
    fn forbid_multiple_multipliers(&mut self, candidates: &RuleSet) -> Res<bool> {
        let mut something_forbidden = false;

        let strats: Vec<PrdIdx> = candidates
            .stratifier()?
            .strats()
            .iter()
            .map(|comp| {
                debug_assert_eq! { comp.len(), 1 }
                comp[0]
            })
            .collect();

        'next_pred: for head_pred in strats {
            let mut is_multi_head = self.head_count(head_pred) > 1;
            let is_multi_occurrence = self.tail_count(head_pred) > 1;

            let idxs: Vec<RlIdx> = candidates.rules_of(head_pred).to_vec();
            for idx in idxs {
                let rule = &candidates.rules()[idx];
                for ta in rule.tail() {
                    if ta.neg {
                        continue;
                    }
                    let tail_pred = ta.atom.pred();
                    if !self.inlining_allowed(tail_pred) {
                        continue;
                    }
                    let tail_pred_head_cnt = self.head_count(tail_pred);
                    if tail_pred_head_cnt <= 1 {
                        continue;
                    }
                    if is_multi_head {
                        self.forbidden.insert(head_pred);
                        something_forbidden = true;
                        continue 'next_pred;
                    }
                    if is_multi_occurrence {
                        self.forbidden.insert(tail_pred);
                        something_forbidden = true
                    } else {
                        is_multi_head = true;
                        let count = self.head_count(head_pred) * tail_pred_head_cnt;
                        self.head_ctr.insert(head_pred, count);
                    }
                }
            }
        }

        for (_, rule) in self.source.rules().index_iter() {
            if self.inlining_allowed(rule.head().pred()) {
                // Already processed as an inlined rule.
                continue;
            }
            let mut has_multi_head_pred = false;
            for ta in rule.tail() {
                if ta.neg {
                    continue;
                }
                let pred = ta.atom.pred();
                if !self.inlining_allowed(pred) || self.head_count(pred) <= 1 {
                    continue;
                }
                if has_multi_head_pred {
                    self.forbidden.insert(pred);
                    something_forbidden = true
                } else {
                    has_multi_head_pred = true
                }
            }
        }

        Ok(something_forbidden)
    }

    /// Plans the inlining and fills `inlined_rules`.
    ///
    /// Once the admissible set is acyclic and multiplier-free, its strata are
    /// walked leaves first so that when a predicate's rules are transformed,
    /// the defining rules of everything they call are already fully inlined.
    pub(crate) fn plan_inlining(&mut self) -> Res<()> {
        self.count_pred_occurrences();

        let mut candidates = self.create_allowed_rule_set()?;
        while self.forbid_preds_from_cycles(&candidates)? {
            candidates = self.create_allowed_rule_set()?
        }

        if self.forbid_multiple_multipliers(&candidates)? {
            candidates = self.create_allowed_rule_set()?
        }

        log! { @3
            "planned inlined rules ({} forbidden, {} with non-empty tails):\n{}",
            self.forbidden.len(),
            self.head_nonempty_tail_ctr.len(),
            candidates.to_string_info()?
        }

        let strats: Vec<PrdIdx> = candidates
            .stratifier()?
            .strats()
            .iter()
            .map(|comp| comp[0])
            .collect();
        for pred in strats {
            let rules: Vec<Rule> = candidates
                .rules_of(pred)
                .iter()
                .map(|idx| candidates.rules()[*idx].clone())
                .collect();
            for rule in rules {
                let mut out = Vec::new();
                self.transform_rule(&rule, &mut out)?;
                for nu_rule in out {
                    self.inlined_rules.push_rule(nu_rule);
                }
            }
        }

        log! { @3
            "inlined rules after mutual inlining:\n{}",
            self.inlined_rules.to_string_info()?
        }

        Ok(())
    }
}
