//! Contains the rule structure for encapsulation.

use crate::common::*;
use crate::rules::{Atom, TailAtom};

/// A rule: a head atom, an uninterpreted tail and an interpreted tail.
///
/// The uninterpreted tail is an ordered list of predicate atoms, each tagged
/// positive or negated. The interpreted tail is a conjunction of constraint
/// terms, possibly under an existential quantifier binding the variables of
/// `qvars`.
///
/// # Invariants
///
/// - variables are dense, `{0, 1, …, k}` with no gaps, in first-occurrence
///   order (head first)
/// - `qvars` only binds variables appearing in the interpreted tail
#[derive(Debug, Clone)]
pub struct Rule {
    /// Variables of the rule.
    vars: VarInfos,
    /// Head atom.
    head: Atom,
    /// Uninterpreted tail: predicate atoms with polarities.
    tail: Vec<TailAtom>,
    /// Interpreted tail: a conjunction of constraints.
    terms: Vec<Term>,
    /// Existentially quantified variables of the interpreted tail.
    qvars: Quantfed,
    /// Original rule this one derives from.
    from: Option<RlIdx>,
}

impl Rule {
    /// Constructor. Normalizes the variables.
    pub fn new(head: Atom, tail: Vec<TailAtom>, terms: Vec<Term>) -> Rule {
        let mut rule = Rule {
            vars: VarInfos::new(),
            head,
            tail,
            terms,
            qvars: Quantfed::new(),
            from: None,
        };
        rule.normalize_vars();
        rule
    }

    /// Variables accessor.
    #[inline]
    pub fn vars(&self) -> &VarInfos {
        &self.vars
    }
    /// Head accessor.
    #[inline]
    pub fn head(&self) -> &Atom {
        &self.head
    }
    /// Uninterpreted tail accessor.
    #[inline]
    pub fn tail(&self) -> &[TailAtom] {
        &self.tail
    }
    /// Interpreted tail accessor.
    #[inline]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }
    /// Quantified variables of the interpreted tail.
    #[inline]
    pub fn qvars(&self) -> &Quantfed {
        &self.qvars
    }
    /// Original rule this one derives from.
    #[inline]
    pub fn from(&self) -> Option<RlIdx> {
        self.from
    }
    /// Sets the original rule this one derives from.
    #[inline]
    pub fn set_from(&mut self, from: Option<RlIdx>) {
        self.from = from
    }

    /// Replaces the interpreted tail.
    pub fn set_terms(&mut self, terms: Vec<Term>) {
        self.terms = terms
    }

    /// True if the interpreted tail is quantified.
    #[inline]
    pub fn has_quantifier(&self) -> bool {
        !self.qvars.is_empty()
    }

    /// Index of the first positive tail atom whose predicate passes a test.
    pub fn first_pos_tail<Test>(&self, test: Test) -> Option<usize>
    where
        Test: Fn(PrdIdx) -> bool,
    {
        for (idx, ta) in self.tail.iter().enumerate() {
            if !ta.neg && test(ta.atom.pred()) {
                return Some(idx);
            }
        }
        None
    }

    /// Checks if two rules are the same, modulo `from`.
    pub fn same_as(&self, other: &Self) -> bool {
        self.head == other.head && self.tail == other.tail && self.terms == other.terms
    }

    /// Variable substitution, in the same variable scope.
    ///
    /// Applies to the head, the uninterpreted tail and the interpreted tail.
    /// Returns a boolean indicating whether anything changed. Does not
    /// re-normalize the variables, callers handle that.
    pub fn subst<Map: VarIndexed<Term>>(&mut self, map: &Map) -> bool {
        let mut changed = false;
        let (head, b) = self.head.subst(map);
        self.head = head;
        changed = changed || b;
        for ta in &mut self.tail {
            let (atom, b) = ta.atom.subst(map);
            ta.atom = atom;
            changed = changed || b
        }
        let mut terms = Vec::with_capacity(self.terms.len());
        for term in self.terms.drain(..) {
            let (term, b) = term.subst(map);
            terms.push(term);
            changed = changed || b
        }
        self.terms = terms;
        changed
    }

    /// Normalizes the variables of the rule.
    ///
    /// Variables are renamed to be dense starting at `0`, in first-occurrence
    /// order: head arguments first, then tail atoms, then the interpreted
    /// tail. Quantified variables follow their occurrences; the ones that no
    /// longer occur anywhere are dropped.
    pub fn normalize_vars(&mut self) {
        let mut order: Vec<(VarIdx, Typ)> = Vec::with_capacity(self.vars.len());
        let mut seen = VarSet::with_capacity(self.vars.len());
        {
            let mut register = |idx: VarIdx, typ: Typ| {
                if seen.insert(idx) {
                    order.push((idx, typ))
                }
            };
            for arg in self.head.args().iter() {
                term::map_vars(arg, &mut register)
            }
            for ta in &self.tail {
                for arg in ta.atom.args().iter() {
                    term::map_vars(arg, &mut register)
                }
            }
            for term in &self.terms {
                term::map_vars(term, &mut register)
            }
        }

        let mut map: VarHMap<Term> = VarHMap::with_capacity(order.len());
        let mut infos = VarInfos::with_capacity(order.len());
        let mut qvars = Quantfed::with_capacity(self.qvars.len());
        for (var, typ) in order {
            let idx = infos.next_index();
            infos.push(VarInfo::new(idx.default_str(), typ, idx));
            if self.qvars.contains_key(&var) {
                qvars.insert(idx, typ);
            }
            map.insert(var, term::var(idx, typ));
        }

        self.subst(&map);
        self.vars = infos;
        self.qvars = qvars
    }

    /// Existentially closes the variables bound by nothing.
    ///
    /// A variable is unbound when it appears in the interpreted tail but
    /// neither in the head nor in any tail atom. Unbound variables move under
    /// the rule's existential quantifier.
    pub fn fix_unbound_vars(&mut self) {
        let mut bound = VarSet::with_capacity(self.vars.len());
        {
            let mut register = |idx: VarIdx, _: Typ| {
                bound.insert(idx);
            };
            for arg in self.head.args().iter() {
                term::map_vars(arg, &mut register)
            }
            for ta in &self.tail {
                for arg in ta.atom.args().iter() {
                    term::map_vars(arg, &mut register)
                }
            }
        }
        let mut unbound: Vec<(VarIdx, Typ)> = Vec::new();
        for term in &self.terms {
            term::map_vars(term, &mut |idx, typ| {
                if !bound.contains(&idx) {
                    unbound.push((idx, typ))
                }
            })
        }
        for (var, typ) in unbound {
            self.qvars.entry(var).or_insert(typ);
        }
    }

    /// Writes the rule, given some predicate information.
    pub fn write<W: Write>(&self, w: &mut W, preds: &Preds) -> IoRes<()> {
        let write_var = |w: &mut W, var: VarIdx| -> IoRes<()> {
            if let Some(info) = self.vars.get(var) {
                write!(w, "{}", info.name)
            } else {
                var.default_write(w)
            }
        };

        self.head.write(w, preds, &write_var)?;
        write!(w, " :-")?;
        if self.tail.is_empty() && self.terms.is_empty() && self.qvars.is_empty() {
            write!(w, " true")?
        }
        for ta in &self.tail {
            write!(w, " ")?;
            if ta.neg {
                write!(w, "(not ")?;
                ta.atom.write(w, preds, &write_var)?;
                write!(w, ")")?
            } else {
                ta.atom.write(w, preds, &write_var)?
            }
        }
        if !self.qvars.is_empty() {
            let mut qvars: Vec<VarIdx> = self.qvars.keys().cloned().collect();
            qvars.sort();
            write!(w, " (exists (")?;
            for var in qvars {
                write!(w, " ({} {})", self.vars[var].name, self.vars[var].typ)?
            }
            write!(w, " )")?
        }
        for term in &self.terms {
            write!(w, " ")?;
            term.write(w, &write_var)?
        }
        if !self.qvars.is_empty() {
            write!(w, ")")?
        }
        Ok(())
    }

    /// String representation of the rule.
    pub fn to_string_info(&self, preds: &Preds) -> Res<String> {
        let mut buf = Vec::new();
        self.write(&mut buf, preds)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl ::std::ops::Index<VarIdx> for Rule {
    type Output = VarInfo;
    fn index(&self, index: VarIdx) -> &VarInfo {
        &self.vars[index]
    }
}
