//! A Datalog rule inliner.
//!
//! Given a set of Horn clauses `H(x̄) :- B₁(ȳ₁), …, Bₙ(ȳₙ), φ(…)` where the
//! `Bᵢ` are predicate atoms (positive or negated) and `φ` is an interpreted
//! constraint, the [inlining pass](inline/index.html) eliminates intermediate
//! predicates by resolution: it selects the predicates that can safely
//! disappear, resolves their defining rules into their callers, and
//! simplifies the resulting interpreted tails. The output is a smaller rule
//! set with the same semantics over the declared output predicates, together
//! with a [model converter](convert/struct.ModelConverter.html) and a
//! [proof converter](convert/struct.ProofConverter.html) lifting models and
//! proofs of the result back to the input.
//!
//! # Example
//!
//! ```
//! use hornline::common::*;
//! use hornline::rules::{Atom, Rule, RuleSet, TailAtom};
//! use hornline::term::Typ;
//!
//! let mut rules = RuleSet::new();
//! let sig: Sig = vec![ Typ::Int ].into_iter().collect();
//! let p = rules.push_pred("p", sig.clone());
//! let q = rules.push_pred("q", sig.clone());
//! let out = rules.push_pred("out", sig);
//! rules.set_output(out);
//!
//! let x = || term::var(0, Typ::Int);
//! let atom = |pred, arg: Term| Atom::new(
//!     pred, vec![ arg ].into_iter().collect()
//! );
//!
//! // out(x) :- p(x). p(x) :- q(x). q(x) :- x > 7.
//! rules.push_rule(
//!     Rule::new(atom(out, x()), vec![ TailAtom::pos(atom(p, x())) ], vec![])
//! );
//! rules.push_rule(
//!     Rule::new(atom(p, x()), vec![ TailAtom::pos(atom(q, x())) ], vec![])
//! );
//! rules.push_rule(
//!     Rule::new(atom(q, x()), vec![], vec![ term::gt(x(), term::int(7)) ])
//! );
//!
//! let res = hornline::run(& rules, & InlineConf::default(), None, None)
//!     .expect("pass cannot fail")
//!     .expect("pass makes progress");
//!
//! // `p` and `q` are gone: out(x) :- x > 7.
//! assert_eq! { res.rules().len(), 1 }
//! let idx: RlIdx = 0.into();
//! let rule = & res.rules()[idx];
//! assert_eq! { rule.head().pred(), out }
//! assert! { rule.tail().is_empty() }
//! ```

#![allow(non_upper_case_globals)]

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate lazy_static;

pub mod errors;
#[macro_use]
pub mod common;
pub mod convert;
pub mod info;
pub mod inline;
pub mod rules;
pub mod term;
pub mod val;

use crate::common::{InlineConf, Res};
use crate::convert::{ModelConverter, ProofConverter};
use crate::rules::RuleSet;

/// Runs the inlining pass on a rule set.
///
/// Returns `None` when the pass changed nothing, in which case the host
/// keeps the source set and the converters are left untouched. When
/// converters are supplied, the pass extends them with the records needed to
/// lift models and proofs of the result back to the source.
pub fn run(
    source: &RuleSet,
    conf: &InlineConf,
    mc: Option<&mut ModelConverter>,
    pc: Option<&mut ProofConverter>,
) -> Res<Option<RuleSet>> {
    inline::run(source, conf, mc, pc)
}
