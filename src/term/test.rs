//! Tests for the term structure.

use crate::common::*;
use crate::term;

#[test]
fn cst_fold() {
    let term = term::add(vec![term::int(3), term::int(4)]);
    assert_eq! { term.int(), Some(Int::from(7)) }

    let term = term::gt(term::int(3), term::int(4));
    assert_eq! { term.bool(), Some(false) }

    let term = term::eq(term::int(9), term::int(9));
    assert_eq! { term.bool(), Some(true) }
}

#[test]
fn conjunction_normalization() {
    let x = term::var(0, Typ::Bool);
    let y = term::var(1, Typ::Bool);

    // Neutral element dropped.
    assert_eq! {
        term::and(vec![ x.clone(), term::tru() ]), x
    }
    // Absorbing element.
    assert_eq! {
        term::and(vec![ x.clone(), term::fls() ]), term::fls()
    }
    // Flattening.
    let inner = term::and(vec![x.clone(), y.clone()]);
    assert_eq! {
        term::and(vec![ inner.clone() ]), inner
    }
    // Empty conjunction is true.
    assert_eq! { term::and(vec![]), term::tru() }
}

#[test]
fn negation_normalization() {
    let x = term::var(0, Typ::Bool);
    assert_eq! { term::not(term::not(x.clone())), x }
    assert_eq! { term::not(term::tru()), term::fls() }
}

#[test]
fn implication_rewrites() {
    let x = term::var(0, Typ::Bool);
    let y = term::var(1, Typ::Bool);
    assert_eq! {
        term::implies(x.clone(), y.clone()),
        term::or(vec![ term::not(x), y ])
    }
}

#[test]
fn eval() {
    // v_0 + 2 > v_1 under { v_0 -> 1, v_1 -> 2 }
    let term = term::gt(
        term::add(vec![term::var(0, Typ::Int), term::int(2)]),
        term::var(1, Typ::Int),
    );
    let mut model: VarMap<Val> = VarMap::new();
    model.push(Val::I(1.into()));
    model.push(Val::I(2.into()));
    assert_eq! { term.eval(& model).unwrap(), Val::B(true) }
}

#[test]
fn subst() {
    let x = term::var(0, Typ::Int);
    let term = term::ge(x.clone(), term::int(0));
    let mut map: VarHMap<Term> = VarHMap::new();
    map.insert(0.into(), term::int(7));
    let (nu_term, changed) = term.subst(&map);
    assert! { changed }
    assert_eq! { nu_term.bool(), Some(true) }
}

#[test]
fn ordered_var_scan() {
    // Variables are scanned left-to-right.
    let term = term::eq(
        term::add(vec![term::var(3, Typ::Int), term::var(1, Typ::Int)]),
        term::var(2, Typ::Int),
    );
    let mut order = vec![];
    term::map_vars(&term, &mut |idx, _| order.push(*idx));
    assert_eq! { order, vec![3, 1, 2] }
}
