//! Rule sets and predicate atoms.
//!
//! A [`RuleSet`](struct.RuleSet.html) stores rules in insertion order over a
//! fixed predicate signature, along with the declared output predicates and
//! the ground facts of the base extension. Rule indices can vary between rule
//! sets derived from each other, so `pred_to_rules` is maintained internally
//! and all fields are private.
//!
//! A rule set is *closed* once its [stratification](graph/struct.Stratifier.html)
//! is computed; cycle-breaking queries require a closed set. Pushing a rule
//! un-closes the set.

use hashconsing::{HConsed, HashConsign};

use crate::common::*;

pub mod graph;
mod rule;
pub mod simplify;

pub use self::graph::Stratifier;
pub use self::rule::Rule;

hashconsing::consign! {
    /// Factory for predicate application arguments.
    let arg_factory = consign(conf.factory.args_capa) for VarMap<Term> ;
}

/// Hashconsed arguments of a predicate application.
///
/// Tail de-duplication and the unification indices compare atoms
/// structurally; hashconsed argument vectors make that a pointer
/// comparison.
pub type PredArgs = HConsed<VarMap<Term>>;

/// An uninterpreted predicate atom: a predicate applied to arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    /// The predicate.
    pred: PrdIdx,
    /// The arguments.
    args: PredArgs,
}
impl Atom {
    /// Constructor.
    pub fn new(pred: PrdIdx, args: VarMap<Term>) -> Self {
        Atom {
            pred,
            args: arg_factory.mk(args),
        }
    }
    /// Predicate accessor.
    #[inline]
    pub fn pred(&self) -> PrdIdx {
        self.pred
    }
    /// Arguments accessor.
    #[inline]
    pub fn args(&self) -> &PredArgs {
        &self.args
    }

    /// Variable substitution over the arguments.
    ///
    /// Returns a boolean indicating whether anything changed.
    pub fn subst<Map: VarIndexed<Term>>(&self, map: &Map) -> (Self, bool) {
        let mut changed = false;
        let mut args = VarMap::with_capacity(self.args.len());
        for arg in self.args.iter() {
            let (arg, b) = arg.subst(map);
            changed = changed || b;
            args.push(arg);
        }
        (Atom::new(self.pred, args), changed)
    }

    /// Writes the atom, given some predicate information.
    pub fn write<W, WriteVar>(&self, w: &mut W, preds: &Preds, write_var: &WriteVar) -> IoRes<()>
    where
        W: Write,
        WriteVar: Fn(&mut W, VarIdx) -> IoRes<()>,
    {
        if self.args.is_empty() {
            return write!(w, "{}", preds[self.pred]);
        }
        write!(w, "({}", preds[self.pred])?;
        for arg in self.args.iter() {
            write!(w, " ")?;
            arg.write(w, write_var)?
        }
        write!(w, ")")
    }
}

/// A tail atom: a predicate atom with a polarity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TailAtom {
    /// The atom.
    pub atom: Atom,
    /// True if the atom is negated.
    pub neg: bool,
}
impl TailAtom {
    /// Positive tail atom.
    pub fn pos(atom: Atom) -> Self {
        TailAtom { atom, neg: false }
    }
    /// Negated tail atom.
    pub fn negated(atom: Atom) -> Self {
        TailAtom { atom, neg: true }
    }
}

/// Stores a rule set: the rules, the predicates and so on.
#[derive(Debug, Clone)]
pub struct RuleSet {
    /// Predicates.
    preds: Preds,
    /// Rules, in insertion order.
    rules: RlMap<Rule>,
    /// Rules of each head predicate, in insertion order.
    pred_to_rules: PrdHMap<Vec<RlIdx>>,
    /// Declared output predicates.
    output: PrdSet,
    /// Ground facts of the base extension.
    facts: PrdHMap<Vec<VarMap<Val>>>,
    /// Stratification, computed by `close`.
    strat: Option<Stratifier>,
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::new()
    }
}

impl RuleSet {
    /// Constructor.
    pub fn new() -> Self {
        RuleSet {
            preds: Preds::new(),
            rules: RlMap::new(),
            pred_to_rules: PrdHMap::new(),
            output: PrdSet::new(),
            facts: PrdHMap::new(),
            strat: None,
        }
    }

    /// Clones the predicate signature, outputs and facts, but no rules.
    pub fn clone_empty(&self) -> Self {
        RuleSet {
            preds: self.preds.clone(),
            rules: RlMap::new(),
            pred_to_rules: PrdHMap::new(),
            output: self.output.clone(),
            facts: self.facts.clone(),
            strat: None,
        }
    }

    /// Declares a predicate.
    pub fn push_pred<S: Into<String>>(&mut self, name: S, sig: Sig) -> PrdIdx {
        let idx = self.preds.next_index();
        self.preds.push(PrdInfo::new(name, idx, sig));
        idx
    }

    /// Declares a predicate as an output predicate.
    pub fn set_output(&mut self, pred: PrdIdx) {
        self.output.insert(pred);
    }
    /// True if the predicate is a declared output.
    pub fn is_output(&self, pred: PrdIdx) -> bool {
        self.output.contains(&pred)
    }
    /// Declared output predicates.
    pub fn outputs(&self) -> &PrdSet {
        &self.output
    }

    /// Adds a ground fact to the base extension of a predicate.
    pub fn add_fact(&mut self, pred: PrdIdx, vals: VarMap<Val>) -> Res<()> {
        if vals.len() != self.preds[pred].arity() {
            bail!(
                "fact arity mismatch on predicate {}: expected {} value(s), got {}",
                conf.bad(&self.preds[pred].name),
                self.preds[pred].arity(),
                vals.len()
            )
        }
        self.facts.entry(pred).or_insert_with(Vec::new).push(vals);
        Ok(())
    }
    /// Ground facts of a predicate.
    pub fn facts_of(&self, pred: PrdIdx) -> &[VarMap<Val>] {
        self.facts.get(&pred).map(|v| v.as_slice()).unwrap_or(&[])
    }
    /// Predicates with at least one ground fact.
    pub fn preds_with_facts(&self) -> PrdSet {
        self.facts
            .iter()
            .filter_map(|(pred, facts)| {
                if facts.is_empty() {
                    None
                } else {
                    Some(*pred)
                }
            })
            .collect()
    }

    /// Predicate information accessor.
    pub fn preds(&self) -> &Preds {
        &self.preds
    }
    /// Rules accessor.
    pub fn rules(&self) -> &RlMap<Rule> {
        &self.rules
    }
    /// Rules whose head is a given predicate, in insertion order.
    pub fn rules_of(&self, pred: PrdIdx) -> &[RlIdx] {
        self.pred_to_rules
            .get(&pred)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Pushes a rule. Un-closes the rule set.
    ///
    /// Rules that do not derive from anything yet are tagged as deriving from
    /// themselves.
    pub fn push_rule(&mut self, mut rule: Rule) -> RlIdx {
        let idx = self.rules.next_index();
        debug_assert_eq! {
            rule.head().args().len(), self.preds[rule.head().pred()].arity()
        }
        if rule.from().is_none() {
            rule.set_from(Some(idx))
        }
        self.pred_to_rules
            .entry(rule.head().pred())
            .or_insert_with(Vec::new)
            .push(idx);
        self.rules.push(rule);
        self.strat = None;
        idx
    }

    /// Computes the stratification, making the rule set closed.
    pub fn close(&mut self) -> Res<()> {
        self.strat = Some(Stratifier::of(self));
        Ok(())
    }
    /// True if the stratification is computed.
    pub fn is_closed(&self) -> bool {
        self.strat.is_some()
    }
    /// Stratification accessor, fails when the rule set is not closed.
    pub fn stratifier(&self) -> Res<&Stratifier> {
        if let Some(strat) = self.strat.as_ref() {
            Ok(strat)
        } else {
            bail!(ErrorKind::NotClosed)
        }
    }

    /// String representation of all the rules.
    pub fn to_string_info(&self) -> Res<String> {
        let mut buf = String::new();
        for (idx, rule) in self.rules.index_iter() {
            buf.push_str(&format!("#{}: {}\n", idx, rule.to_string_info(&self.preds)?))
        }
        Ok(buf)
    }
}
