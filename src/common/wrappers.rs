//! Index types: predicates of a rule set, variables of a rule, rules.

use std::fmt;
use std::io::Write;

use crate::common::IoRes;

wrap_usize! {
    #[doc = "Index of a predicate declared in a rule set."]
    PrdIdx
    #[doc = "Range over the predicates of a rule set."]
    range: PrdRange
    #[doc = "Set of predicate indices."]
    set: PrdSet
    #[doc = "Partial map from predicates to something."]
    hash map: PrdHMap
    #[doc = "Predicate-indexed vector."]
    map: PrdMap with iter: PrdMapIter
}

wrap_usize! {
    #[doc = "Index of a variable inside a single rule."]
    VarIdx
    #[doc = "Range over the variables of a rule."]
    range: VarRange
    #[doc = "Set of variable indices."]
    set: VarSet
    #[doc = "Partial map from variables to something."]
    hash map: VarHMap
    #[doc = "Variable-indexed vector."]
    map: VarMap with iter: VarMapIter
}
impl VarIdx {
    /// Writes a variable the way rules without naming information print
    /// them: `v_<idx>`.
    pub fn default_write<W>(&self, w: &mut W) -> IoRes<()>
    where
        W: Write,
    {
        write!(w, "v_{}", self)
    }
    /// String form of [`default_write`](#method.default_write).
    pub fn default_str(&self) -> String {
        format!("v_{}", self)
    }
}

impl<T: fmt::Display> fmt::Display for VarMap<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for elem in self {
            if !first {
                write!(fmt, " ")?
            }
            write!(fmt, "{}", elem)?;
            first = false
        }
        Ok(())
    }
}

wrap_usize! {
    #[doc = "Index of a rule in a rule set."]
    RlIdx
    #[doc = "Range over the rules of a rule set."]
    range: RlRange
    #[doc = "Set of rule indices."]
    set: RlSet
    #[doc = "Partial map from rules to something."]
    hash map: RlHMap
    #[doc = "Rule-indexed vector."]
    map: RlMap with iter: RlMapIter
}
