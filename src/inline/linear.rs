//! Linear inlining: chain compression through unification indices.
//!
//! Targets chains `A → B → C → …` where each link has exactly one
//! head-unifier and exactly one tail-unifier. Two indices map atoms to the
//! positions of the rules containing them, one for heads and one for tail
//! atoms; queries return the positions whose atom unifies with the query
//! atom.

use crate::common::*;
use crate::inline::{InlineOutcome, RuleInliner};
use crate::rules::{Atom, Rule, RuleSet};
use crate::term::subst::Subst;

/// Position index: atoms of live rules, queried by unification.
#[derive(Debug, Default)]
struct UnifIndex {
    /// Entries, grouped by predicate, in insertion order.
    by_pred: PrdHMap<Vec<(Atom, usize)>>,
}
impl UnifIndex {
    /// Adds an atom of the rule at some position.
    fn insert(&mut self, atom: &Atom, pos: usize) {
        self.by_pred
            .entry(atom.pred())
            .or_insert_with(Vec::new)
            .push((atom.clone(), pos))
    }

    /// Removes one occurrence of an atom of the rule at some position.
    fn remove(&mut self, atom: &Atom, pos: usize) {
        if let Some(entries) = self.by_pred.get_mut(&atom.pred()) {
            if let Some(index) = entries
                .iter()
                .position(|(entry, entry_pos)| *entry_pos == pos && entry == atom)
            {
                entries.remove(index);
            }
        }
    }

    /// Positions whose atom unifies with the query atom.
    ///
    /// The query lives at offset `0`, the entries at offset `1`. One position
    /// appears once per unifying occurrence.
    fn unifiers(&self, atom: &Atom) -> Vec<usize> {
        let mut res = Vec::new();
        let entries = if let Some(entries) = self.by_pred.get(&atom.pred()) {
            entries
        } else {
            return res;
        };
        let mut subst = Subst::new();
        for (entry, pos) in entries {
            if entry.args().len() != atom.args().len() {
                continue;
            }
            subst.clear();
            let fits = atom
                .args()
                .iter()
                .zip(entry.args().iter())
                .all(|(query_arg, entry_arg)| subst.unify(query_arg, 0, entry_arg, 1));
            if fits {
                res.push(*pos)
            }
        }
        res
    }
}

impl<'a> RuleInliner<'a> {
    /// Registers a rule in the indices and computes its flags.
    ///
    /// `can_remove`: the head is neither an output predicate nor backed by
    /// facts, so the rule can be deleted once inlined into its unique caller.
    /// `can_expand`: the tail is a single positive atom whose predicate is
    /// neither an output nor backed by facts, so the rule can absorb its
    /// callee.
    fn index_rule(
        &self,
        head_index: &mut UnifIndex,
        tail_index: &mut UnifIndex,
        can_remove: &mut [bool],
        can_expand: &mut [bool],
        rule: &Rule,
        pos: usize,
    ) {
        let head_pred = rule.head().pred();
        head_index.insert(rule.head(), pos);

        if self.source.is_output(head_pred) || self.preds_with_facts.contains(&head_pred) {
            can_remove[pos] = false
        }

        for ta in rule.tail() {
            tail_index.insert(&ta.atom, pos)
        }

        can_expand[pos] = rule.tail().len() == 1 && !rule.tail()[0].neg && {
            let tail_pred = rule.tail()[0].atom.pred();
            !self.preds_with_facts.contains(&tail_pred) && !self.source.is_output(tail_pred)
        }
    }

    /// Removes a rule from the indices.
    fn unindex_rule(head_index: &mut UnifIndex, tail_index: &mut UnifIndex, rule: &Rule, pos: usize) {
        head_index.remove(rule.head(), pos);
        for ta in rule.tail() {
            tail_index.remove(&ta.atom, pos)
        }
    }

    /// Linear inlining driver.
    ///
    /// For each rule position, while the rule is a live expander: find the
    /// unique rule whose head unifies with its single tail atom, check that
    /// this head has a unique tail-unifier overall (unless branching is
    /// allowed), resolve, and when the link was unique, delete the absorbed
    /// rule. Returns the new set if anything changed.
    pub(crate) fn linear(&mut self, rules: &RuleSet) -> Res<Option<RuleSet>> {
        let size = rules.rules().len();
        let mut acc: Vec<Rule> = rules.rules().iter().cloned().collect();

        let mut head_index = UnifIndex::default();
        let mut tail_index = UnifIndex::default();
        let mut valid = vec![true; size];
        let mut can_remove = vec![true; size];
        let mut can_expand = vec![true; size];

        for (pos, rule) in acc.iter().enumerate() {
            self.index_rule(
                &mut head_index,
                &mut tail_index,
                &mut can_remove,
                &mut can_expand,
                rule,
                pos,
            )
        }

        let mut done_something = false;

        for current in 0..size {
            loop {
                if !valid[current] || !can_expand[current] {
                    break;
                }

                let head_unifiers = head_index.unifiers(&acc[current].tail()[0].atom);
                if head_unifiers.len() != 1 {
                    break;
                }
                let absorbed = head_unifiers[0];
                if !can_remove[absorbed] || !valid[absorbed] || current == absorbed {
                    break;
                }

                // The head of the absorbed rule must unify with this single
                // tail position only, unless branching is allowed.
                let tail_unifiers = tail_index.unifiers(acc[absorbed].head());
                let links = tail_unifiers.len();
                debug_assert! { links >= 1 }
                if !self.conf.linear_branch && links != 1 {
                    break;
                }

                let resolvent =
                    match self.try_to_inline(&acc[current], &acc[absorbed], 0)? {
                        InlineOutcome::Rule(resolvent) => resolvent,
                        _ => break,
                    };
                done_something = true;

                Self::unindex_rule(&mut head_index, &mut tail_index, &acc[current], current);
                acc[current] = resolvent;
                self.index_rule(
                    &mut head_index,
                    &mut tail_index,
                    &mut can_remove,
                    &mut can_expand,
                    &acc[current],
                    current,
                );
                // The new rule keeps expanding only if the absorbed one
                // could.
                can_expand[current] = can_expand[absorbed];

                if links == 1 {
                    // Its sole caller absorbed it.
                    valid[absorbed] = false;
                    if let Some(mc) = self.mc.as_mut() {
                        mc.insert_rule(acc[absorbed].clone())
                    }
                    Self::unindex_rule(
                        &mut head_index,
                        &mut tail_index,
                        &acc[absorbed],
                        absorbed,
                    );
                }
            }
        }

        if done_something {
            let mut res = rules.clone_empty();
            for (pos, rule) in acc.into_iter().enumerate() {
                if valid[pos] {
                    res.push_rule(rule);
                }
            }
            Ok(Some(res))
        } else {
            Ok(None)
        }
    }
}
