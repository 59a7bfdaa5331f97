use std::{collections::HashSet, sync::Arc};

use codissolver::{Either, InterpolatingSolver, Solver, Z3Solver, config::SolverConfig};
use term::{Constant, Term, TermRef, Variable, eval::eval, transform::collect_variables};

fn clauses(terms: impl IntoIterator<Item = Term>) -> Vec<TermRef> {
    terms.into_iter().map(Arc::new).collect()
}

fn variables(terms: &[TermRef]) -> HashSet<Variable> {
    terms
        .iter()
        .flat_map(|term| collect_variables(term))
        .collect()
}

fn is_unsat(solver: &mut Z3Solver, terms: Vec<TermRef>) -> bool {
    solver.get_model(&terms).unwrap().is_none()
}

#[test]
fn test_core_of_direct_contradiction() {
    common::logging::init_logging(common::logging::LogStyle::Tree);
    let p = Variable::bool("p");
    let assumptions = clauses([Term::Var(p.clone()), Term::not(p.clone())]);

    let result = Z3Solver::new().get_model_or_core(&[], &assumptions).unwrap();

    assert_eq!(result, Either::Right(assumptions));
}

#[test]
fn test_core_is_an_ordered_subset() {
    let x = Variable::int("x");
    let y = Variable::int("y");
    let base = clauses([Term::greater(x.clone(), Term::int(10))]);
    let assumptions = clauses([
        Term::equal(y.clone(), Term::int(1)),
        Term::less(x.clone(), Term::int(5)),
        Term::greater(y.clone(), Term::int(0)),
        Term::less(x.clone(), Term::int(3)),
    ]);
    let mut solver = Z3Solver::new();

    let core = solver
        .get_model_or_core(&base, &assumptions)
        .unwrap()
        .right()
        .unwrap();

    assert!(!core.is_empty());
    let positions = core
        .iter()
        .map(|term| assumptions.iter().position(|a| a == term).unwrap())
        .collect::<Vec<_>>();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(is_unsat(&mut solver, [base, core].concat()));
}

#[test]
fn test_satisfiable_assumptions_give_a_model() {
    let x = Variable::int("x");
    let base = clauses([Term::greater(x.clone(), Term::int(0))]);
    let assumptions = clauses([Term::less(x.clone(), Term::int(2))]);

    let model = Z3Solver::new()
        .get_model_or_core(&base, &assumptions)
        .unwrap()
        .left()
        .unwrap();

    assert_eq!(model.len(), 1);
    assert_eq!(model[&x], Constant::Int(1));
}

#[test]
fn test_assumptions_do_not_persist() {
    let p = Variable::bool("p");
    let mut solver = Z3Solver::new();

    let conflicting = clauses([Term::Var(p.clone()), Term::not(p.clone())]);
    assert!(solver.get_model_or_core(&[], &conflicting).unwrap().is_right());

    let model = solver
        .get_model(&clauses([Term::not(p.clone())]))
        .unwrap()
        .unwrap();
    assert_eq!(model[&p], Constant::Bool(false));
}

#[test]
fn test_interpolant_over_integers() {
    let x = Variable::int("x");
    let y = Variable::int("y");
    let left = clauses([
        Term::equal(x.clone(), Term::add(y.clone(), Term::int(1))),
        Term::greater(y.clone(), Term::int(0)),
    ]);
    let right = clauses([Term::less_eq(x.clone(), Term::int(0))]);
    let mut solver = Z3Solver::new();

    let interpolant = Arc::new(
        solver
            .get_model_or_interpolant(&left, &right)
            .unwrap()
            .right()
            .unwrap(),
    );

    assert!(variables(&[interpolant.clone()]).is_subset(&HashSet::from([x])));
    let negated = Arc::new(Term::not(interpolant.clone()));
    assert!(is_unsat(&mut solver, [left, vec![negated]].concat()));
    assert!(is_unsat(&mut solver, [right, vec![interpolant]].concat()));
}

#[test]
fn test_interpolant_over_booleans() {
    let [p, q, r] = ["p", "q", "r"].map(Variable::bool);
    let left = clauses([
        Term::and(p.clone(), q.clone()),
        Term::implies(q.clone(), r.clone()),
    ]);
    let right = clauses([Term::not(r.clone())]);
    let mut solver = Z3Solver::with_config(SolverConfig::default());

    let interpolant = Arc::new(
        solver
            .get_model_or_interpolant(&left, &right)
            .unwrap()
            .right()
            .unwrap(),
    );

    assert!(variables(&[interpolant.clone()]).is_subset(&HashSet::from([r.clone()])));
    let model = codissolver::Assignment::from([(r, Constant::Bool(true))]);
    assert!(matches!(eval(&interpolant, &model), Ok(Constant::Bool(true))));
    assert!(is_unsat(&mut solver, [right, vec![interpolant]].concat()));
}

#[test]
fn test_interpolation_of_satisfiable_groups_gives_a_model() {
    let x = Variable::int("x");
    let left = clauses([Term::greater(x.clone(), Term::int(0))]);
    let right = clauses([Term::less(x.clone(), Term::int(2))]);

    let model = Z3Solver::new()
        .get_model_or_interpolant(&left, &right)
        .unwrap()
        .left()
        .unwrap();

    assert_eq!(model[&x], Constant::Int(1));
}

#[test]
fn test_interpolant_without_local_variables() {
    let x = Variable::int("x");
    let left = clauses([Term::greater(x.clone(), Term::int(5))]);
    let right = clauses([Term::less(x.clone(), Term::int(3))]);
    let mut solver = Z3Solver::new();

    let interpolant = Arc::new(
        solver
            .get_model_or_interpolant(&left, &right)
            .unwrap()
            .right()
            .unwrap(),
    );

    let negated = Arc::new(Term::not(interpolant.clone()));
    assert!(is_unsat(&mut solver, [left, vec![negated]].concat()));
    assert!(is_unsat(&mut solver, [right, vec![interpolant]].concat()));
}

fn assert_interpolates(left: Vec<TermRef>, right: Vec<TermRef>, shared: HashSet<Variable>) {
    let mut solver = Z3Solver::new();
    let interpolant = Arc::new(
        solver
            .get_model_or_interpolant(&left, &right)
            .unwrap()
            .right()
            .unwrap(),
    );

    assert!(variables(&[interpolant.clone()]).is_subset(&shared));
    let negated = Arc::new(Term::not(interpolant.clone()));
    assert!(is_unsat(&mut solver, [left, vec![negated]].concat()));
    assert!(is_unsat(&mut solver, [right, vec![interpolant]].concat()));
}

#[test]
fn test_interpolant_when_projection_needs_modulo() {
    let x = Variable::int("x");
    let y = Variable::int("y");
    let even = || clauses([Term::equal(x.clone(), Term::mul(Term::int(2), y.clone()))]);

    assert_interpolates(
        even(),
        clauses([Term::equal(x.clone(), Term::int(3))]),
        HashSet::from([x.clone()]),
    );

    let z = Variable::int("z");
    assert_interpolates(
        even(),
        clauses([
            Term::equal(x.clone(), z.clone()),
            Term::equal(z.clone(), Term::int(5)),
        ]),
        HashSet::from([x]),
    );
}
