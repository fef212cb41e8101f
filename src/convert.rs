//! Model and proof converters.
//!
//! The pass removes rules, so a model of its output is not in general a model
//! of its input: the interpretation of the eliminated predicates has to be
//! rebuilt. The [`ModelConverter`](struct.ModelConverter.html) records, for
//! every rule `P(x̄) :- body` it deletes, the subsumption `P := P ∨ ∃ȳ body`
//! where `ȳ` are the body-only variables; lifting evaluates the recorded
//! bodies against the model, most recent record first.
//!
//! The [`ProofConverter`](struct.ProofConverter.html) records one step per
//! successful resolution (with the rule-scoped substitutions of both
//! premises) and one step per rule deleted as unsatisfiable.

use crate::common::*;
use crate::rules::{Atom, Rule};

/// A finite model: ground tuples per predicate.
pub type Model = PrdHMap<Vec<VarMap<Val>>>;

/// Records the rules deleted by the pass, for model reconstruction.
#[derive(Debug, Clone, Default)]
pub struct ModelConverter {
    /// Deleted rules, in deletion order.
    entries: Vec<(PrdIdx, Rule)>,
}
impl ModelConverter {
    /// Constructor.
    pub fn new() -> Self {
        ModelConverter::default()
    }

    /// True if no rule was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// Number of recorded rules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Records a deleted rule `P(x̄) :- body` as `P := P ∨ ∃ȳ body`.
    pub fn insert_rule(&mut self, rule: Rule) {
        self.entries.push((rule.head().pred(), rule))
    }

    /// Lifts a model of the transformed rule set to the original one.
    ///
    /// Entries are processed in reverse insertion order, so that a rule
    /// deleted late (whose body mentions predicates eliminated earlier) is
    /// lifted before the records it depends on.
    ///
    /// Evaluation enumerates bindings from the positive body atoms over the
    /// current model, checks negated atoms by absence and interpreted
    /// constraints by evaluation. Fails when a constraint or the head cannot
    /// be evaluated under the bindings the body atoms provide.
    pub fn lift(&self, model: &mut Model) -> Res<()> {
        for (pred, rule) in self.entries.iter().rev() {
            let tuples = extension_of(rule, model)?;
            let entry = model.entry(*pred).or_insert_with(Vec::new);
            for tuple in tuples {
                if !entry.contains(&tuple) {
                    entry.push(tuple)
                }
            }
        }
        Ok(())
    }
}

/// Head tuples a rule body produces under a model.
fn extension_of(rule: &Rule, model: &Model) -> Res<Vec<VarMap<Val>>> {
    let pos: Vec<&Atom> = rule
        .tail()
        .iter()
        .filter(|ta| !ta.neg)
        .map(|ta| &ta.atom)
        .collect();
    let mut binding: VarHMap<Val> = VarHMap::new();
    let mut out = Vec::new();
    enumerate(rule, model, &pos, 0, &mut binding, &mut out)?;
    Ok(out)
}

/// Extends the binding over the positive atoms from `at` on, and emits the
/// head tuples of the complete bindings that satisfy the rest of the body.
fn enumerate(
    rule: &Rule,
    model: &Model,
    pos: &[&Atom],
    at: usize,
    binding: &mut VarHMap<Val>,
    out: &mut Vec<VarMap<Val>>,
) -> Res<()> {
    if at == pos.len() {
        // Negated atoms hold by absence.
        for ta in rule.tail() {
            if !ta.neg {
                continue;
            }
            let mut tuple = VarMap::with_capacity(ta.atom.args().len());
            for arg in ta.atom.args().iter() {
                let val = arg.eval(binding).chain_err(|| {
                    ErrorKind::Lift("negated atom with unbound arguments".into())
                })?;
                tuple.push(val);
            }
            if model
                .get(&ta.atom.pred())
                .map(|tuples| tuples.contains(&tuple))
                .unwrap_or(false)
            {
                return Ok(());
            }
        }
        // Interpreted constraints hold by evaluation.
        for term in rule.terms() {
            let val = term
                .eval(binding)
                .chain_err(|| ErrorKind::Lift("constraint with unbound variables".into()))?;
            match val.bool() {
                Some(true) => (),
                Some(false) => return Ok(()),
                None => bail!(ErrorKind::Lift("constraint is not boolean".into())),
            }
        }
        // Head tuple.
        let mut tuple = VarMap::with_capacity(rule.head().args().len());
        for arg in rule.head().args().iter() {
            let val = arg
                .eval(binding)
                .chain_err(|| ErrorKind::Lift("head argument with unbound variables".into()))?;
            tuple.push(val);
        }
        out.push(tuple);
        return Ok(());
    }

    let atom = pos[at];
    let no_tuples: Vec<VarMap<Val>> = Vec::new();
    let tuples = model.get(&atom.pred()).unwrap_or(&no_tuples);

    for tuple in tuples {
        let mut added: Vec<VarIdx> = Vec::new();
        let mut fits = true;
        for (arg, val) in atom.args().iter().zip(tuple.iter()) {
            if let Some(var) = arg.var_idx() {
                if let Some(bound) = binding.get(&var) {
                    if bound != val {
                        fits = false;
                        break;
                    }
                } else {
                    binding.insert(var, val.clone());
                    added.push(var)
                }
            } else {
                let value = arg.eval(binding).chain_err(|| {
                    ErrorKind::Lift("body atom argument with unbound variables".into())
                })?;
                if &value != val {
                    fits = false;
                    break;
                }
            }
        }
        if fits {
            enumerate(rule, model, pos, at + 1, binding, out)?
        }
        for var in added {
            binding.remove(&var);
        }
    }
    Ok(())
}

/// A single proof reconstruction step.
#[derive(Debug, Clone)]
pub enum ProofStep {
    /// A rule got replaced by the resolvent of two rules.
    Resolved {
        /// Target rule (caller).
        tgt: Rule,
        /// Source rule (callee).
        src: Rule,
        /// Resolved tail position in the target.
        pos: usize,
        /// Rule-scoped substitution of the target.
        tgt_subst: VarMap<Term>,
        /// Rule-scoped substitution of the source.
        src_subst: VarMap<Term>,
        /// The resolvent.
        res: Rule,
    },
    /// A rule got deleted, its tail is unsatisfiable.
    Deleted(Rule),
}

/// Records the resolution and deletion steps of the pass.
#[derive(Debug, Clone, Default)]
pub struct ProofConverter {
    /// Steps, in pass order.
    steps: Vec<ProofStep>,
}
impl ProofConverter {
    /// Constructor.
    pub fn new() -> Self {
        ProofConverter::default()
    }

    /// True if no step was recorded.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }
    /// Steps accessor.
    pub fn steps(&self) -> &[ProofStep] {
        &self.steps
    }

    /// Records a resolution step.
    pub fn resolved(
        &mut self,
        tgt: Rule,
        src: Rule,
        pos: usize,
        tgt_subst: VarMap<Term>,
        src_subst: VarMap<Term>,
        res: Rule,
    ) {
        self.steps.push(ProofStep::Resolved {
            tgt,
            src,
            pos,
            tgt_subst,
            src_subst,
            res,
        })
    }

    /// Records a deletion step.
    pub fn deleted(&mut self, rule: Rule) {
        self.steps.push(ProofStep::Deleted(rule))
    }

    /// Writes the steps, given some predicate information.
    pub fn write<W: Write>(&self, w: &mut W, preds: &Preds) -> IoRes<()> {
        for step in &self.steps {
            match step {
                ProofStep::Resolved {
                    tgt,
                    src,
                    pos,
                    tgt_subst,
                    src_subst,
                    res,
                } => {
                    write!(w, "(resolve (")?;
                    tgt.write(w, preds)?;
                    write!(w, ") at {} with (", pos)?;
                    src.write(w, preds)?;
                    writeln!(w, ")")?;
                    writeln!(w, "  tgt subst: ({})", tgt_subst)?;
                    writeln!(w, "  src subst: ({})", src_subst)?;
                    write!(w, "  yields (")?;
                    res.write(w, preds)?;
                    writeln!(w, "))")?
                }
                ProofStep::Deleted(rule) => {
                    write!(w, "(delete (")?;
                    rule.write(w, preds)?;
                    writeln!(w, "))")?
                }
            }
        }
        Ok(())
    }
}
