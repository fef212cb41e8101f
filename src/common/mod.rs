//! Base types and functions.

pub use std::collections::{HashMap, HashSet};
pub use std::io::Result as IoRes;
pub use std::io::Write;

pub use hashconsing::coll::*;

pub use crate::errors::*;
pub use crate::info::{PrdInfo, VarInfo};
pub use crate::term;
pub use crate::term::{Op, RTerm, Term, Typ};
pub use crate::val::{Int, Val};

#[macro_use]
pub mod macros;
pub mod config;
mod wrappers;

pub use self::config::*;
pub use self::wrappers::*;

lazy_static! {
    /// Global configuration.
    pub static ref conf: Config = Config::new();
}

/// Maps variables to variable information.
pub type VarInfos = VarMap<VarInfo>;
/// Maps predicates to predicate information.
pub type Preds = PrdMap<PrdInfo>;
/// Signature of a predicate.
pub type Sig = VarMap<Typ>;
/// Existentially quantified variables of an interpreted tail.
pub type Quantfed = VarHMap<Typ>;
/// Set of terms.
pub type TermSet = HConSet<Term>;

/// Reduction information: statistics of a rewrite pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedInfo {
    /// Number of predicates eliminated.
    pub preds: usize,
    /// Number of rules removed.
    pub rules_rmed: usize,
    /// Number of rules created.
    pub rules_added: usize,
}
impl RedInfo {
    /// Constructor.
    pub fn new() -> Self {
        RedInfo::default()
    }
    /// True if one or more fields are non-zero.
    pub fn non_zero(&self) -> bool {
        self.preds > 0 || self.rules_rmed > 0 || self.rules_added > 0
    }
}
impl ::std::ops::AddAssign for RedInfo {
    fn add_assign(
        &mut self,
        RedInfo {
            preds,
            rules_rmed,
            rules_added,
        }: Self,
    ) {
        self.preds += preds;
        self.rules_rmed += rules_rmed;
        self.rules_added += rules_added
    }
}
impl ::std::fmt::Display for RedInfo {
    fn fmt(&self, fmt: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        write!(
            fmt,
            "{} predicate(s) eliminated, {} rule(s) removed, {} rule(s) added",
            self.preds, self.rules_rmed, self.rules_added
        )
    }
}

/// Indexed by variables, total or partial.
pub trait VarIndexed<T> {
    /// Whatever the variable maps to, if anything.
    fn var_get(&self, var: VarIdx) -> Option<&T>;
}
impl<T> VarIndexed<T> for VarMap<T> {
    #[inline]
    fn var_get(&self, var: VarIdx) -> Option<&T> {
        self.get(var)
    }
}
impl<T> VarIndexed<T> for VarHMap<T> {
    #[inline]
    fn var_get(&self, var: VarIdx) -> Option<&T> {
        self.get(&var)
    }
}
