//! The rule inlining pass.
//!
//! Eliminates intermediate predicates from a rule set by resolution, keeping
//! the semantics of the declared output predicates. Three stages:
//!
//! - **bulk inlining**: predicates selected by the [planner](plan) are
//!   resolved away bottom-up (strata order), each caller absorbing the
//!   defining rules of its admissible tail predicates;
//! - **eager inlining**: a tail atom whose predicate has a unique inlining
//!   candidate is resolved in place, provided the candidate is an oriented
//!   rewriter;
//! - **linear inlining**: chains where each link has a unique head-unifier
//!   and a unique tail-unifier are compressed through a unification index.
//!
//! The pass records every deleted rule in the
//! [model converter](../convert/struct.ModelConverter.html) and every
//! resolution in the [proof converter](../convert/struct.ProofConverter.html)
//! when those are supplied.

use crate::common::*;
use crate::convert::{ModelConverter, ProofConverter};
use crate::rules::{Rule, RuleSet};

mod eager;
mod linear;
mod plan;
pub mod unify;

pub use self::unify::RuleUnifier;

/// Outcome of one inlining attempt.
pub(crate) enum InlineOutcome {
    /// Resolution succeeded.
    Rule(Rule),
    /// The resolvent's interpreted tail is unsatisfiable.
    Unsat,
    /// The tail atom does not unify with the source head.
    Mismatch,
    /// One of the rules has a quantified interpreted tail.
    Quantified,
}

/// The inlining pass.
///
/// Owns the planner state and the unifier; borrows the source rule set and
/// the optional converters for the duration of the pass.
pub struct RuleInliner<'a> {
    /// The rule set being transformed.
    source: &'a RuleSet,
    /// Pass flags.
    conf: InlineConf,
    /// Rule unifier.
    unifier: RuleUnifier,
    /// Number of rules with each head predicate.
    head_ctr: PrdHMap<usize>,
    /// Number of rules with each head predicate and a non-empty tail.
    head_nonempty_tail_ctr: PrdHMap<usize>,
    /// Number of positive tail occurrences of each predicate.
    tail_ctr: PrdHMap<usize>,
    /// Predicates appearing negated somewhere.
    preds_with_neg: PrdSet,
    /// Predicates with at least one ground fact.
    preds_with_facts: PrdSet,
    /// Predicates we refuse to inline this pass.
    forbidden: PrdSet,
    /// Defining rules of the planned predicates, fully inlined bottom-up.
    inlined_rules: RuleSet,
    /// Model converter, extended with every deleted rule.
    mc: Option<&'a mut ModelConverter>,
    /// Proof converter, extended with every resolution.
    pc: Option<&'a mut ProofConverter>,
    /// Pass statistics.
    info: RedInfo,
}

impl<'a> RuleInliner<'a> {
    /// Constructor.
    pub fn new(
        source: &'a RuleSet,
        cfg: InlineConf,
        mc: Option<&'a mut ModelConverter>,
        pc: Option<&'a mut ProofConverter>,
    ) -> Self {
        let inlined_rules = source.clone_empty();
        RuleInliner {
            source,
            conf: cfg,
            unifier: RuleUnifier::new(),
            head_ctr: PrdHMap::new(),
            head_nonempty_tail_ctr: PrdHMap::new(),
            tail_ctr: PrdHMap::new(),
            preds_with_neg: PrdSet::new(),
            preds_with_facts: PrdSet::new(),
            forbidden: PrdSet::new(),
            inlined_rules,
            mc,
            pc,
            info: RedInfo::new(),
        }
    }

    /// Runs the pass.
    ///
    /// Returns `None` when nothing changed, in which case the host keeps the
    /// source rule set (and the converters are left untouched).
    pub fn run(mut self) -> Res<Option<RuleSet>> {
        if self.source.rules().is_empty() {
            return Ok(None);
        }

        self.plan_inlining()?;

        let mut res = self.source.clone_empty();
        let mut changed = self.transform_rules(&mut res)?;
        res.close()?;

        if self.conf.eager {
            if let Some(nu_res) = self.eager(&res)? {
                res = nu_res;
                changed = true;
                res.close()?
            }
        }

        if self.conf.linear {
            if let Some(nu_res) = self.linear(&res)? {
                res = nu_res;
                changed = true
            }
        }

        if changed {
            let (before, after) = (self.source.rules().len(), res.rules().len());
            if before >= after {
                self.info.rules_rmed += before - after
            } else {
                self.info.rules_added += after - before
            }
            log! { @1 |
                "inlining pass done, {} rule(s) to {} rule(s): {}",
                before, after, self.info
            }
            Ok(Some(res))
        } else {
            log! { @1 | "inlining pass done, no change" }
            Ok(None)
        }
    }

    /// Inlines the defining rule `src` at tail position `tail_index` of
    /// `tgt`.
    ///
    /// Both rules have normalized variables by construction. Emits a proof
    /// record on success.
    pub(crate) fn try_to_inline(
        &mut self,
        tgt: &Rule,
        src: &Rule,
        tail_index: usize,
    ) -> Res<InlineOutcome> {
        debug_assert! { tail_index < tgt.tail().len() }
        debug_assert! { !tgt.tail()[tail_index].neg }

        if tgt.has_quantifier() || src.has_quantifier() {
            return Ok(InlineOutcome::Quantified);
        }
        if !self.unifier.unify(tgt, tail_index, src) {
            return Ok(InlineOutcome::Mismatch);
        }
        match self.unifier.apply(tgt, tail_index, src, &self.conf) {
            Some(res) => {
                log! { @4
                    "resolved tail #{} of {}\nwith {}\nyielding {}",
                    tail_index,
                    tgt.to_string_info(self.source.preds())?,
                    src.to_string_info(self.source.preds())?,
                    res.to_string_info(self.source.preds())?
                }
                if let Some(pc) = self.pc.as_mut() {
                    let tgt_subst = self.unifier.rule_subst(tgt, true);
                    let src_subst = self.unifier.rule_subst(src, false);
                    pc.resolved(
                        tgt.clone(),
                        src.clone(),
                        tail_index,
                        tgt_subst,
                        src_subst,
                        res.clone(),
                    )
                }
                Ok(InlineOutcome::Rule(res))
            }
            None => {
                log! { @4 | "interpreted tail of the resolvent is unsat" }
                Ok(InlineOutcome::Unsat)
            }
        }
    }

    /// Resolves away every admissible tail predicate of a rule.
    ///
    /// Worklist: a resolvent whose tail still mentions admissible predicates
    /// is resolved further. Rules with a quantified interpreted tail are
    /// dropped. Returns true if anything was inlined.
    pub(crate) fn transform_rule(&mut self, r0: &Rule, out: &mut Vec<Rule>) -> Res<bool> {
        let mut modified = false;
        let mut todo = vec![r0.clone()];

        while let Some(rule) = todo.pop() {
            if rule.has_quantifier() {
                continue;
            }

            let position = rule.first_pos_tail(|pred| self.inlining_allowed(pred));

            let position = if let Some(position) = position {
                position
            } else {
                // Nothing left to inline in this rule.
                out.push(rule);
                continue;
            };
            modified = true;

            let pred = rule.tail()[position].atom.pred();
            let defs: Vec<Rule> = self
                .inlined_rules
                .rules_of(pred)
                .iter()
                .map(|idx| self.inlined_rules.rules()[*idx].clone())
                .collect();
            for def in defs {
                if let InlineOutcome::Rule(resolvent) = self.try_to_inline(&rule, &def, position)? {
                    todo.push(resolvent)
                }
            }
        }
        Ok(modified)
    }

    /// Builds the output rule set from the source.
    ///
    /// Rules whose head predicate is admissible are dropped: they live on
    /// only through `inlined_rules`, which the model converter records. The
    /// rest goes through `transform_rule`.
    pub(crate) fn transform_rules(&mut self, res: &mut RuleSet) -> Res<bool> {
        let mut changed = false;
        let mut recorded = PrdSet::new();

        for (_, rule) in self.source.rules().index_iter() {
            let pred = rule.head().pred();

            if self.inlining_allowed(pred) {
                // The predicate is eliminated through inlining, its rules do
                // not make it to the result. Record its inlined definition
                // so that models can be lifted back.
                if recorded.insert(pred) {
                    self.info.preds += 1;
                    let defs: Vec<Rule> = self
                        .inlined_rules
                        .rules_of(pred)
                        .iter()
                        .map(|idx| self.inlined_rules.rules()[*idx].clone())
                        .collect();
                    if let Some(mc) = self.mc.as_mut() {
                        for def in defs {
                            mc.insert_rule(def)
                        }
                    }
                }
                continue;
            }

            let mut out = Vec::new();
            let modified = self.transform_rule(rule, &mut out)?;
            changed = changed || modified;
            for nu_rule in out {
                res.push_rule(nu_rule);
            }
        }
        Ok(changed)
    }
}

/// Runs the inlining pass on a rule set.
///
/// Returns `None` when the pass changed nothing; the host keeps the source
/// set. When converters are supplied, the pass extends them with the records
/// needed to lift models and proofs of the result back to the source.
pub fn run(
    source: &RuleSet,
    cfg: &InlineConf,
    mc: Option<&mut ModelConverter>,
    pc: Option<&mut ProofConverter>,
) -> Res<Option<RuleSet>> {
    RuleInliner::new(source, cfg.clone(), mc, pc).run()
}
