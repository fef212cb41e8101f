//! Stratification of the predicate dependency graph.
//!
//! The graph has an edge from a head predicate to every predicate appearing
//! positively in the tail of one of its rules. Strongly connected components
//! are emitted leaves first, so that walking the strata in order visits a
//! predicate's (positive) dependencies before the predicate itself.

use crate::common::*;
use crate::rules::RuleSet;

/// SCC decomposition of the positive dependency graph of a rule set.
///
/// Covers every predicate occurring in the rules, head or tail; predicates
/// with no rules form their own leaf components.
#[derive(Debug, Clone)]
pub struct Stratifier {
    /// Components in topological order, leaves first.
    strats: Vec<Vec<PrdIdx>>,
    /// Stratum index of each predicate.
    pred_strat: PrdHMap<usize>,
    /// Predicates with a positive dependency on themselves.
    self_rec: PrdSet,
}

impl Stratifier {
    /// Builds the stratification of a rule set.
    pub fn of(rules: &RuleSet) -> Self {
        // Nodes and successors in first-occurrence order: determinism.
        let mut nodes: Vec<PrdIdx> = Vec::new();
        let mut node_set = PrdSet::new();
        let mut adj: PrdHMap<Vec<PrdIdx>> = PrdHMap::new();
        let mut self_rec = PrdSet::new();

        let add_node = |node: PrdIdx, nodes: &mut Vec<PrdIdx>, node_set: &mut PrdSet| {
            if node_set.insert(node) {
                nodes.push(node)
            }
        };

        for (_, rule) in rules.rules().index_iter() {
            let head = rule.head().pred();
            add_node(head, &mut nodes, &mut node_set);
            for ta in rule.tail() {
                add_node(ta.atom.pred(), &mut nodes, &mut node_set);
                if !ta.neg {
                    let succs = adj.entry(head).or_insert_with(Vec::new);
                    if !succs.contains(&ta.atom.pred()) {
                        succs.push(ta.atom.pred())
                    }
                    if ta.atom.pred() == head {
                        self_rec.insert(head);
                    }
                }
            }
        }

        let (strats, pred_strat) = Self::sccs(&nodes, &adj);

        Stratifier {
            strats,
            pred_strat,
            self_rec,
        }
    }

    /// Components in topological order, leaves first.
    pub fn strats(&self) -> &[Vec<PrdIdx>] {
        &self.strats
    }

    /// Stratum index of a predicate.
    pub fn pred_strat(&self, pred: PrdIdx) -> Res<usize> {
        if let Some(strat) = self.pred_strat.get(&pred) {
            Ok(*strat)
        } else {
            bail!("predicate #{} does not appear in the stratification", pred)
        }
    }

    /// True if a component carries a cycle.
    ///
    /// Either the component has two or more predicates, or its single
    /// predicate depends positively on itself.
    pub fn is_non_trivial(&self, comp: &[PrdIdx]) -> bool {
        comp.len() > 1 || (comp.len() == 1 && self.self_rec.contains(&comp[0]))
    }

    /// Iterative Tarjan: emits components leaves first.
    fn sccs(
        nodes: &[PrdIdx],
        adj: &PrdHMap<Vec<PrdIdx>>,
    ) -> (Vec<Vec<PrdIdx>>, PrdHMap<usize>) {
        let mut strats: Vec<Vec<PrdIdx>> = Vec::new();
        let mut pred_strat: PrdHMap<usize> = PrdHMap::new();

        let mut index: PrdHMap<usize> = PrdHMap::new();
        let mut low: PrdHMap<usize> = PrdHMap::new();
        let mut on_stack = PrdSet::new();
        let mut stack: Vec<PrdIdx> = Vec::new();
        let mut counter = 0;

        let no_succs: Vec<PrdIdx> = Vec::new();

        for start in nodes {
            if index.contains_key(start) {
                continue;
            }

            // Explicit call stack: (node, next successor position).
            let mut calls: Vec<(PrdIdx, usize)> = vec![(*start, 0)];
            index.insert(*start, counter);
            low.insert(*start, counter);
            counter += 1;
            stack.push(*start);
            on_stack.insert(*start);

            loop {
                let (node, next_succ) = {
                    let (node, pos) = match calls.last_mut() {
                        Some((node, pos)) => (*node, pos),
                        None => break,
                    };
                    let succs = adj.get(&node).unwrap_or(&no_succs);
                    if *pos < succs.len() {
                        let succ = succs[*pos];
                        *pos += 1;
                        (node, Some(succ))
                    } else {
                        (node, None)
                    }
                };

                match next_succ {
                    Some(succ) => {
                        if !index.contains_key(&succ) {
                            index.insert(succ, counter);
                            low.insert(succ, counter);
                            counter += 1;
                            stack.push(succ);
                            on_stack.insert(succ);
                            calls.push((succ, 0))
                        } else if on_stack.contains(&succ) {
                            let entry = index[&succ];
                            let node_low =
                                low.get_mut(&node).expect("visited node has a lowlink");
                            if entry < *node_low {
                                *node_low = entry
                            }
                        }
                    }

                    None => {
                        calls.pop();
                        let node_low = low[&node];
                        if let Some((parent, _)) = calls.last() {
                            let parent_low =
                                low.get_mut(parent).expect("visited node has a lowlink");
                            if node_low < *parent_low {
                                *parent_low = node_low
                            }
                        }
                        if node_low == index[&node] {
                            // `node` is the root of a component.
                            let mut comp = Vec::new();
                            loop {
                                let elem = stack.pop().expect("non-empty component stack");
                                on_stack.remove(&elem);
                                comp.push(elem);
                                if elem == node {
                                    break;
                                }
                            }
                            comp.reverse();
                            for pred in &comp {
                                pred_strat.insert(*pred, strats.len());
                            }
                            strats.push(comp)
                        }
                    }
                }
            }
        }

        (strats, pred_strat)
    }
}
