//! Values.

use std::fmt;

use crate::common::*;

/// Arbitrary precision integers.
pub type Int = ::num::BigInt;

/// A concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Val {
    /// Integer.
    I(Int),
    /// Boolean.
    B(bool),
}
impl Val {
    /// Type of the value.
    pub fn typ(&self) -> Typ {
        match self {
            Val::I(_) => Typ::Int,
            Val::B(_) => Typ::Bool,
        }
    }
    /// Integer accessor.
    pub fn int(&self) -> Option<&Int> {
        match self {
            Val::I(i) => Some(i),
            Val::B(_) => None,
        }
    }
    /// Boolean accessor.
    pub fn bool(&self) -> Option<bool> {
        match self {
            Val::B(b) => Some(*b),
            Val::I(_) => None,
        }
    }
}
impl From<Int> for Val {
    fn from(i: Int) -> Self {
        Val::I(i)
    }
}
impl From<i64> for Val {
    fn from(i: i64) -> Self {
        Val::I(i.into())
    }
}
impl From<bool> for Val {
    fn from(b: bool) -> Self {
        Val::B(b)
    }
}
impl fmt::Display for Val {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Val::I(i) => {
                if i < &Int::from(0) {
                    write!(fmt, "(- {})", -i)
                } else {
                    write!(fmt, "{}", i)
                }
            }
            Val::B(b) => write!(fmt, "{}", b),
        }
    }
}
