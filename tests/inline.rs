//! End-to-end tests for the inlining pass.

use hornline::common::*;
use hornline::convert::{Model, ModelConverter, ProofConverter};
use hornline::rules::{Atom, Rule, RuleSet, TailAtom};
use hornline::term::Typ;

/// Integer signature of some arity.
fn sig(arity: usize) -> Sig {
    (0..arity).map(|_| Typ::Int).collect()
}

/// Integer variable.
fn v(idx: usize) -> Term {
    term::var(idx, Typ::Int)
}

/// Atom from a list of arguments.
fn atom(pred: PrdIdx, args: Vec<Term>) -> Atom {
    Atom::new(pred, args.into_iter().collect())
}

/// Adds a unary ground fact.
fn fact(rules: &mut RuleSet, pred: PrdIdx, value: i64) {
    rules
        .add_fact(pred, vec![Val::from(value)].into_iter().collect())
        .unwrap()
}

/// Runs the pass with a configuration.
fn run_conf(rules: &RuleSet, cfg: &InlineConf) -> Option<RuleSet> {
    hornline::run(rules, cfg, None, None).unwrap()
}

/// Runs the pass with the default configuration.
fn run(rules: &RuleSet) -> Option<RuleSet> {
    run_conf(rules, &InlineConf::default())
}

/// Checks that the variables of a rule are dense.
fn assert_dense(rule: &Rule) {
    let mut seen = VarSet::new();
    let mut max = None;
    let mut register = |idx: VarIdx, _: Typ| {
        seen.insert(idx);
        if max.map(|m: VarIdx| m < idx).unwrap_or(true) {
            max = Some(idx)
        }
    };
    for arg in rule.head().args().iter() {
        term::map_vars(arg, &mut register)
    }
    for ta in rule.tail() {
        for arg in ta.atom.args().iter() {
            term::map_vars(arg, &mut register)
        }
    }
    for term in rule.terms() {
        term::map_vars(term, &mut register)
    }
    if let Some(max) = max {
        assert_eq! { seen.len(), *max + 1, "variables of the rule have gaps" }
        assert_eq! { rule.vars().len(), seen.len() }
    }
}

/// Bindings of the positive tail atoms of a rule over a model, with the
/// negated atoms and constraints checked; returns the head tuples produced.
fn head_tuples(rule: &Rule, model: &Model) -> Vec<VarMap<Val>> {
    fn go(
        rule: &Rule,
        model: &Model,
        pos: &[&Atom],
        at: usize,
        binding: &mut VarHMap<Val>,
        out: &mut Vec<VarMap<Val>>,
    ) {
        if at == pos.len() {
            for ta in rule.tail() {
                if !ta.neg {
                    continue;
                }
                let tuple: VarMap<Val> = ta
                    .atom
                    .args()
                    .iter()
                    .map(|arg| arg.eval(binding).expect("closed negated atom"))
                    .collect();
                if model
                    .get(&ta.atom.pred())
                    .map(|tuples| tuples.contains(&tuple))
                    .unwrap_or(false)
                {
                    return;
                }
            }
            for term in rule.terms() {
                match term.eval(binding).expect("closed constraint").bool() {
                    Some(true) => (),
                    _ => return,
                }
            }
            out.push(
                rule.head()
                    .args()
                    .iter()
                    .map(|arg| arg.eval(binding).expect("closed head"))
                    .collect(),
            );
            return;
        }
        let no_tuples = Vec::new();
        let tuples = model.get(&pos[at].pred()).unwrap_or(&no_tuples);
        'tuples: for tuple in tuples {
            let mut added = Vec::new();
            for (arg, val) in pos[at].args().iter().zip(tuple.iter()) {
                if let Some(var) = arg.var_idx() {
                    match binding.get(&var) {
                        Some(bound) if bound != val => {
                            for var in added {
                                binding.remove(&var);
                            }
                            continue 'tuples;
                        }
                        Some(_) => (),
                        None => {
                            binding.insert(var, val.clone());
                            added.push(var)
                        }
                    }
                } else if &arg.eval(binding).expect("closed argument") != val {
                    for var in added {
                        binding.remove(&var);
                    }
                    continue 'tuples;
                }
            }
            go(rule, model, pos, at + 1, binding, out);
            for var in added {
                binding.remove(&var);
            }
        }
    }

    let pos: Vec<&Atom> = rule
        .tail()
        .iter()
        .filter(|ta| !ta.neg)
        .map(|ta| &ta.atom)
        .collect();
    let mut out = Vec::new();
    go(rule, model, &pos, 0, &mut VarHMap::new(), &mut out);
    out
}

/// Least model of a rule set (naive iteration), seeded with the facts.
fn least_model(rules: &RuleSet) -> Model {
    let mut model = Model::new();
    for (pred, _) in rules.preds().index_iter() {
        let facts = rules.facts_of(pred).to_vec();
        if !facts.is_empty() {
            model.insert(pred, facts);
        }
    }
    loop {
        let mut changed = false;
        for (_, rule) in rules.rules().index_iter() {
            for tuple in head_tuples(rule, &model) {
                let entry = model.entry(rule.head().pred()).or_insert_with(Vec::new);
                if !entry.contains(&tuple) {
                    entry.push(tuple);
                    changed = true
                }
            }
        }
        if !changed {
            return model;
        }
    }
}

/// Checks that a model satisfies every rule of a rule set.
fn is_model_of(rules: &RuleSet, model: &Model) -> bool {
    for (_, rule) in rules.rules().index_iter() {
        let no_tuples = Vec::new();
        let extension = model.get(&rule.head().pred()).unwrap_or(&no_tuples);
        for tuple in head_tuples(rule, model) {
            if !extension.contains(&tuple) {
                return false;
            }
        }
    }
    true
}

/// Linear chain elimination: `p` and `q` disappear, `out` calls `r` directly.
#[test]
fn chain_elimination() {
    let mut rules = RuleSet::new();
    let p = rules.push_pred("p", sig(1));
    let q = rules.push_pred("q", sig(1));
    let r = rules.push_pred("r", sig(1));
    let out = rules.push_pred("out", sig(1));
    rules.set_output(out);
    fact(&mut rules, r, 1);
    fact(&mut rules, r, 5);

    // p(x) :- q(x). q(x) :- r(x). out(x) :- p(x).
    rules.push_rule(Rule::new(
        atom(p, vec![v(0)]),
        vec![TailAtom::pos(atom(q, vec![v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(q, vec![v(0)]),
        vec![TailAtom::pos(atom(r, vec![v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(out, vec![v(0)]),
        vec![TailAtom::pos(atom(p, vec![v(0)]))],
        vec![],
    ));

    let res = run(&rules).expect("chain gets inlined");
    assert_eq! { res.rules().len(), 1 }
    assert! { res.rules_of(p).is_empty() }
    assert! { res.rules_of(q).is_empty() }
    let rule = &res.rules()[res.rules_of(out)[0]];
    assert_eq! { rule.tail().len(), 1 }
    assert_eq! { rule.tail()[0].atom.pred(), r }
    assert! { !rule.tail()[0].neg }
    assert_dense(rule);

    // Idempotence: a second run changes nothing.
    assert! { run(& res).is_none() }
}

/// Cycle protection: a two-cycle is broken by forbidding one predicate, the
/// cycle itself survives the pass.
#[test]
fn cycle_protection() {
    let mut rules = RuleSet::new();
    let a = rules.push_pred("a", sig(1));
    let b = rules.push_pred("b", sig(1));
    let out = rules.push_pred("out", sig(1));
    rules.set_output(out);

    // a(x) :- b(x). b(x) :- a(x). out(x) :- a(x).
    rules.push_rule(Rule::new(
        atom(a, vec![v(0)]),
        vec![TailAtom::pos(atom(b, vec![v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(b, vec![v(0)]),
        vec![TailAtom::pos(atom(a, vec![v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(out, vec![v(0)]),
        vec![TailAtom::pos(atom(a, vec![v(0)]))],
        vec![],
    ));

    // The output rule survives, and some recursive dependency remains: the
    // pass must not have unfolded the cycle away.
    let res = match run(&rules) {
        Some(res) => res,
        None => rules,
    };
    assert_eq! { res.rules_of(out).len(), 1 }
    let recursive = res.rules().iter().any(|rule| {
        rule.tail()
            .iter()
            .any(|ta| !ta.neg && ta.atom.pred() == rule.head().pred())
    });
    let two_cycle = !res.rules_of(a).is_empty() && !res.rules_of(b).is_empty();
    assert! { recursive || two_cycle }
    for (_, rule) in res.rules().index_iter() {
        assert_dense(rule)
    }
}

/// Multiplier cap: a predicate with several defining rules and several call
/// sites is not inlined.
#[test]
fn multiplier_cap() {
    let mut rules = RuleSet::new();
    let p = rules.push_pred("p", sig(1));
    let q = rules.push_pred("q", sig(1));
    let r = rules.push_pred("r", sig(1));
    let s = rules.push_pred("s", sig(1));
    let out = rules.push_pred("out", sig(1));
    rules.set_output(out);
    fact(&mut rules, q, 1);
    fact(&mut rules, r, 2);

    // p(x) :- q(x). p(x) :- r(x). s(x) :- p(x), p(y). out(x) :- s(x).
    rules.push_rule(Rule::new(
        atom(p, vec![v(0)]),
        vec![TailAtom::pos(atom(q, vec![v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(p, vec![v(0)]),
        vec![TailAtom::pos(atom(r, vec![v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(s, vec![v(0)]),
        vec![
            TailAtom::pos(atom(p, vec![v(0)])),
            TailAtom::pos(atom(p, vec![v(1)])),
        ],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(out, vec![v(0)]),
        vec![TailAtom::pos(atom(s, vec![v(0)]))],
        vec![],
    ));

    let res = run(&rules).expect("s gets inlined");
    // p is not inlined: two definitions times two occurrences.
    assert_eq! { res.rules_of(p).len(), 2 }
    assert! { res.rules_of(s).is_empty() }
    let out_rule = &res.rules()[res.rules_of(out)[0]];
    assert_eq! { out_rule.tail().len(), 2 }
    for ta in out_rule.tail() {
        assert_eq! { ta.atom.pred(), p }
    }
}

/// Multiplier guard: a multi-rule predicate may not absorb a multi-rule
/// callee, but the callee still inlines where that is linear.
#[test]
fn multiplier_guard_compounding() {
    let mut rules = RuleSet::new();
    let q = rules.push_pred("q", sig(1));
    let p = rules.push_pred("p", sig(1));
    let c = rules.push_pred("c", sig(1));
    let out = rules.push_pred("out", sig(1));
    rules.set_output(out);

    // q(x) :- x > 0. q(x) :- x < 0.
    rules.push_rule(Rule::new(
        atom(q, vec![v(0)]),
        vec![],
        vec![term::gt(v(0), term::int(0))],
    ));
    rules.push_rule(Rule::new(
        atom(q, vec![v(0)]),
        vec![],
        vec![term::lt(v(0), term::int(0))],
    ));
    // p(x) :- q(x). p(x) :- x = 5.
    rules.push_rule(Rule::new(
        atom(p, vec![v(0)]),
        vec![TailAtom::pos(atom(q, vec![v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(p, vec![v(0)]),
        vec![],
        vec![term::eq(v(0), term::int(5))],
    ));
    // c(x) :- p(x). out(x) :- c(x).
    rules.push_rule(Rule::new(
        atom(c, vec![v(0)]),
        vec![TailAtom::pos(atom(p, vec![v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(out, vec![v(0)]),
        vec![TailAtom::pos(atom(c, vec![v(0)]))],
        vec![],
    ));

    let res = run(&rules).expect("q and c get inlined");
    // p was forbidden by the multiplier guard but absorbed q's two rules.
    assert_eq! { res.rules_of(p).len(), 3 }
    assert! { res.rules_of(q).is_empty() }
    assert! { res.rules_of(c).is_empty() }
    let out_rule = &res.rules()[res.rules_of(out)[0]];
    assert_eq! { out_rule.tail().len(), 1 }
    assert_eq! { out_rule.tail()[0].atom.pred(), p }
}

/// Unsat pruning: resolving yields a contradictory interpreted tail, the
/// rule disappears entirely.
#[test]
fn unsat_pruning() {
    let mut rules = RuleSet::new();
    let p = rules.push_pred("p", sig(1));
    let q = rules.push_pred("q", sig(1));
    let out = rules.push_pred("out", sig(1));
    rules.set_output(out);

    // p(x) :- q(x), x > 0. q(x) :- x < 0. out(x) :- p(x).
    rules.push_rule(Rule::new(
        atom(p, vec![v(0)]),
        vec![TailAtom::pos(atom(q, vec![v(0)]))],
        vec![term::gt(v(0), term::int(0))],
    ));
    rules.push_rule(Rule::new(
        atom(q, vec![v(0)]),
        vec![],
        vec![term::lt(v(0), term::int(0))],
    ));
    rules.push_rule(Rule::new(
        atom(out, vec![v(0)]),
        vec![TailAtom::pos(atom(p, vec![v(0)]))],
        vec![],
    ));

    let res = run(&rules).expect("everything prunes away");
    assert! { res.rules().is_empty() }
}

/// Negation blocks inlining: a predicate occurring negated is never
/// resolved away.
#[test]
fn negation_blocks_inlining() {
    let mut rules = RuleSet::new();
    let p = rules.push_pred("p", sig(1));
    let q = rules.push_pred("q", sig(1));
    let r = rules.push_pred("r", sig(1));
    let out = rules.push_pred("out", sig(1));
    rules.set_output(out);
    fact(&mut rules, q, 3);

    // p(x) :- q(x). r(x) :- not p(x). out(x) :- r(x).
    rules.push_rule(Rule::new(
        atom(p, vec![v(0)]),
        vec![TailAtom::pos(atom(q, vec![v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(r, vec![v(0)]),
        vec![TailAtom::negated(atom(p, vec![v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(out, vec![v(0)]),
        vec![TailAtom::pos(atom(r, vec![v(0)]))],
        vec![],
    ));

    let res = match run(&rules) {
        Some(res) => res,
        None => rules,
    };
    // p keeps its defining rule, and the negated occurrence is untouched.
    assert_eq! { res.rules_of(p).len(), 1 }
    let p_rule = &res.rules()[res.rules_of(p)[0]];
    assert_eq! { p_rule.tail().len(), 1 }
    assert_eq! { p_rule.tail()[0].atom.pred(), q }
    let negated = res
        .rules()
        .iter()
        .any(|rule| rule.tail().iter().any(|ta| ta.neg && ta.atom.pred() == p));
    assert! { negated }
}

/// Facts-bearing predicates are never eliminated or resolved as callees.
#[test]
fn facts_block_inlining() {
    let mut rules = RuleSet::new();
    let f = rules.push_pred("f", sig(1));
    let g = rules.push_pred("g", sig(1));
    let out = rules.push_pred("out", sig(1));
    rules.set_output(out);
    fact(&mut rules, f, 1);
    fact(&mut rules, g, 2);

    // f(x) :- g(x). out(x) :- f(x).
    rules.push_rule(Rule::new(
        atom(f, vec![v(0)]),
        vec![TailAtom::pos(atom(g, vec![v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(out, vec![v(0)]),
        vec![TailAtom::pos(atom(f, vec![v(0)]))],
        vec![],
    ));

    assert! { run(& rules).is_none() }
}

/// Eager inlining: a unique unifying candidate is resolved in place even
/// though the predicate is not admissible for bulk inlining.
#[test]
fn eager_unique_candidate() {
    let mut rules = RuleSet::new();
    let p = rules.push_pred("p", sig(2));
    let q = rules.push_pred("q", sig(1));
    let out = rules.push_pred("out", sig(1));
    let out2 = rules.push_pred("out2", sig(1));
    rules.set_output(out);
    rules.set_output(out2);
    fact(&mut rules, q, 4);

    // out(x) :- p(1, x), x > 0. out2(y) :- p(1, y), y < 0.
    // p(1, x) :- q(x). p(0, x) :- q(x).
    rules.push_rule(Rule::new(
        atom(out, vec![v(0)]),
        vec![TailAtom::pos(atom(p, vec![term::int(1), v(0)]))],
        vec![term::gt(v(0), term::int(0))],
    ));
    rules.push_rule(Rule::new(
        atom(out2, vec![v(0)]),
        vec![TailAtom::pos(atom(p, vec![term::int(1), v(0)]))],
        vec![term::lt(v(0), term::int(0))],
    ));
    rules.push_rule(Rule::new(
        atom(p, vec![term::int(1), v(0)]),
        vec![TailAtom::pos(atom(q, vec![v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(p, vec![term::int(0), v(0)]),
        vec![TailAtom::pos(atom(q, vec![v(0)]))],
        vec![],
    ));

    let res = run(&rules).expect("output rules absorb the unique candidate");
    for out_pred in &[out, out2] {
        let rule = &res.rules()[res.rules_of(*out_pred)[0]];
        assert_eq! { rule.tail().len(), 1 }
        assert_eq! { rule.tail()[0].atom.pred(), q }
        assert_dense(rule);
    }
    // p's rules survive, p itself was not bulk-inlined.
    assert_eq! { res.rules_of(p).len(), 2 }
}

/// Eager inlining: a tail atom nothing derives deletes its rule.
#[test]
fn eager_underivable_atom() {
    let mut rules = RuleSet::new();
    let w = rules.push_pred("w", sig(1));
    let out = rules.push_pred("out", sig(1));
    let out2 = rules.push_pred("out2", sig(1));
    rules.set_output(out);
    rules.set_output(out2);

    // out(x) :- w(x). out2(x) :- not w(x).
    // `w` has no rules and no facts, but appears negated, so only the eager
    // stage can conclude anything about out's rule.
    rules.push_rule(Rule::new(
        atom(out, vec![v(0)]),
        vec![TailAtom::pos(atom(w, vec![v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(out2, vec![v(0)]),
        vec![TailAtom::negated(atom(w, vec![v(0)]))],
        vec![],
    ));

    let mut mc = ModelConverter::new();
    let res = hornline::run(&rules, &InlineConf::default(), Some(&mut mc), None)
        .unwrap()
        .expect("out's rule is deleted");
    assert! { res.rules_of(out).is_empty() }
    assert_eq! { res.rules_of(out2).len(), 1 }
    // The deleted rule is recorded for model lifting.
    assert! { !mc.is_empty() }
}

/// Linear chain compression on a self-recursive predicate bulk and eager
/// inlining cannot touch.
#[test]
fn linear_chain_compression() {
    let mut rules = RuleSet::new();
    let p = rules.push_pred("p", sig(2));
    let q = rules.push_pred("q", sig(1));
    let out = rules.push_pred("out", sig(1));
    rules.set_output(out);
    fact(&mut rules, q, 0);

    // out(x) :- p(1, x). p(1, x) :- p(0, y), x = y + 1. p(0, x) :- q(x).
    rules.push_rule(Rule::new(
        atom(out, vec![v(0)]),
        vec![TailAtom::pos(atom(p, vec![term::int(1), v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(p, vec![term::int(1), v(0)]),
        vec![TailAtom::pos(atom(p, vec![term::int(0), v(1)]))],
        vec![term::eq(v(0), term::add(vec![v(1), term::int(1)]))],
    ));
    rules.push_rule(Rule::new(
        atom(p, vec![term::int(0), v(0)]),
        vec![TailAtom::pos(atom(q, vec![v(0)]))],
        vec![],
    ));

    let res = run(&rules).expect("the chain compresses");
    // Both links are absorbed into the output rule: out(y + 1) :- q(y),
    // the equality got propagated into the head.
    assert_eq! { res.rules().len(), 1 }
    let rule = &res.rules()[res.rules_of(out)[0]];
    assert_eq! { rule.tail().len(), 1 }
    assert_eq! { rule.tail()[0].atom.pred(), q }
    assert! { rule.terms().is_empty() }
    assert_eq! {
        rule.head().args().iter().next().unwrap(),
        & term::add(vec![ v(0), term::int(1) ])
    }
    assert_dense(rule);
}

/// Linear branching toggle: a link with two callers is only absorbed when
/// `linear_branch` is on.
#[test]
fn linear_branching_toggle() {
    let mut rules = RuleSet::new();
    let p = rules.push_pred("p", sig(2));
    let q = rules.push_pred("q", sig(1));
    let r = rules.push_pred("r", sig(1));
    let out = rules.push_pred("out", sig(1));
    let out2 = rules.push_pred("out2", sig(1));
    rules.set_output(out);
    rules.set_output(out2);
    fact(&mut rules, q, 1);
    fact(&mut rules, r, 2);

    // out(x) :- p(1, x). out2(x) :- p(1, x).
    // p(1, x) :- q(x). p(0, x) :- r(x).
    rules.push_rule(Rule::new(
        atom(out, vec![v(0)]),
        vec![TailAtom::pos(atom(p, vec![term::int(1), v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(out2, vec![v(0)]),
        vec![TailAtom::pos(atom(p, vec![term::int(1), v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(p, vec![term::int(1), v(0)]),
        vec![TailAtom::pos(atom(q, vec![v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(p, vec![term::int(0), v(0)]),
        vec![TailAtom::pos(atom(r, vec![v(0)]))],
        vec![],
    ));

    // Branching off, eager off so the linear stage is alone: the two
    // tail-unifiers of p(1, ·) block the chain.
    let cfg = InlineConf {
        eager: false,
        linear_branch: false,
        ..InlineConf::default()
    };
    assert! { run_conf(& rules, & cfg).is_none() }

    // Branching on: both callers absorb the link.
    let cfg = InlineConf {
        eager: false,
        linear_branch: true,
        ..InlineConf::default()
    };
    let res = run_conf(&rules, &cfg).expect("branching absorbs the link");
    for out_pred in &[out, out2] {
        let rule = &res.rules()[res.rules_of(*out_pred)[0]];
        assert_eq! { rule.tail().len(), 1 }
        assert_eq! { rule.tail()[0].atom.pred(), q }
    }
    // The p(0, ·) rule is untouched.
    let remaining = res.rules_of(p);
    assert_eq! { remaining.len(), 1 }
    assert_eq! {
        res.rules()[remaining[0]].head().args().iter().next().unwrap().int(),
        Some(Int::from(0))
    }
}

/// Round trip: lifting a model of the output through the model converter
/// yields a model of the input.
#[test]
fn model_round_trip() {
    let mut rules = RuleSet::new();
    let p = rules.push_pred("p", sig(1));
    let q = rules.push_pred("q", sig(1));
    let r = rules.push_pred("r", sig(1));
    let out = rules.push_pred("out", sig(1));
    rules.set_output(out);
    fact(&mut rules, r, 1);
    fact(&mut rules, r, 5);

    // p(x) :- q(x), x > 0. q(x) :- r(x). out(x) :- p(x).
    rules.push_rule(Rule::new(
        atom(p, vec![v(0)]),
        vec![TailAtom::pos(atom(q, vec![v(0)]))],
        vec![term::gt(v(0), term::int(0))],
    ));
    rules.push_rule(Rule::new(
        atom(q, vec![v(0)]),
        vec![TailAtom::pos(atom(r, vec![v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(out, vec![v(0)]),
        vec![TailAtom::pos(atom(p, vec![v(0)]))],
        vec![],
    ));

    let mut mc = ModelConverter::new();
    let res = hornline::run(&rules, &InlineConf::default(), Some(&mut mc), None)
        .unwrap()
        .expect("chain gets inlined");

    // Synthesize a model of the output by direct evaluation, lift it, check
    // it against the input by direct evaluation.
    let mut model = least_model(&res);
    assert! { is_model_of(& res, & model) }
    mc.lift(&mut model).expect("lifting succeeds");
    assert! { is_model_of(& rules, & model) }

    // The lifted model interprets the eliminated predicates.
    assert_eq! { model.get(& q).map(Vec::len), Some(2) }
    // p keeps only the positive tuples.
    assert_eq! { model.get(& p).map(Vec::len), Some(2) }
    assert! { model[& out].contains(& vec![ Val::from(1) ].into_iter().collect()) }
    assert! { model[& out].contains(& vec![ Val::from(5) ].into_iter().collect()) }
}

/// Proof converter records one resolution per inlining step.
#[test]
fn proof_records() {
    let mut rules = RuleSet::new();
    let p = rules.push_pred("p", sig(1));
    let r = rules.push_pred("r", sig(1));
    let out = rules.push_pred("out", sig(1));
    rules.set_output(out);
    fact(&mut rules, r, 1);

    // p(x) :- r(x). out(x) :- p(x).
    rules.push_rule(Rule::new(
        atom(p, vec![v(0)]),
        vec![TailAtom::pos(atom(r, vec![v(0)]))],
        vec![],
    ));
    rules.push_rule(Rule::new(
        atom(out, vec![v(0)]),
        vec![TailAtom::pos(atom(p, vec![v(0)]))],
        vec![],
    ));

    let mut pc = ProofConverter::new();
    let res = hornline::run(&rules, &InlineConf::default(), None, Some(&mut pc))
        .unwrap()
        .expect("p gets inlined");
    assert_eq! { res.rules().len(), 1 }
    assert! { !pc.is_empty() }

    use hornline::convert::ProofStep;
    let resolution = pc.steps().iter().any(|step| match step {
        ProofStep::Resolved {
            tgt,
            src,
            tgt_subst,
            src_subst,
            ..
        } => {
            tgt_subst.len() == tgt.vars().len()
                && src_subst.len() == src.vars().len()
                && src.head().pred() == p
        }
        ProofStep::Deleted(_) => false,
    });
    assert! { resolution }
}

/// Output rules are never deleted: an output predicate can still serve as a
/// callee (its defining rules survive), but none of its rules disappear.
#[test]
fn output_rules_survive() {
    let mut rules = RuleSet::new();
    let p = rules.push_pred("p", sig(1));
    let out = rules.push_pred("out", sig(1));
    rules.set_output(out);
    rules.set_output(p);

    // p(x) :- x > 0. out(x) :- p(x).
    rules.push_rule(Rule::new(
        atom(p, vec![v(0)]),
        vec![],
        vec![term::gt(v(0), term::int(0))],
    ));
    rules.push_rule(Rule::new(
        atom(out, vec![v(0)]),
        vec![TailAtom::pos(atom(p, vec![v(0)]))],
        vec![],
    ));

    // Eager inlining unfolds p into out's rule, but p keeps its own rule.
    let res = run(&rules).expect("out's body unfolds");
    assert_eq! { res.rules_of(p).len(), 1 }
    assert_eq! { res.rules_of(out).len(), 1 }
    let p_rule = &res.rules()[res.rules_of(p)[0]];
    assert! { p_rule.tail().is_empty() }
    assert_eq! { p_rule.terms(), & [ term::gt(v(0), term::int(0)) ][..] }
    let out_rule = &res.rules()[res.rules_of(out)[0]];
    assert! { out_rule.tail().is_empty() }
}
