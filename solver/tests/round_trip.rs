use std::sync::Arc;

use codissolver::{SolverError, Z3Solver};
use term::{HoleClass, Term, TermRef, Type, Uif, Variable, ast::ComponentId};

fn assert_round_trips(term: Term) {
    let decoded = Z3Solver::new().round_trip(&term).unwrap();
    assert_eq!(decoded, term, "`{term}` came back as `{decoded}`");
}

#[test]
fn test_integer_terms() {
    let x = Variable::int("x");
    let y = Variable::parameter("c", Type::Int);
    assert_round_trips(Term::int(-42));
    assert_round_trips(Term::add(x.clone(), Term::int(3)));
    assert_round_trips(Term::mul(x.clone(), y.clone()));
    assert_round_trips(Term::div(x.clone(), y.clone()));
    assert_round_trips(Term::minus(x.clone()));
    assert_round_trips(Term::less_eq(x.clone(), y.clone()));
    assert_round_trips(Term::equal(x.clone(), y.clone()));
    assert_round_trips(Term::ite(
        Term::less_eq(x.clone(), Term::int(0)),
        Term::minus(x.clone()),
        x.clone(),
    ));
}

#[test]
fn test_boolean_terms() {
    let p = Variable::bool("p");
    let q = Variable::selector();
    assert_round_trips(Term::bool(true));
    assert_round_trips(Term::bool(false));
    assert_round_trips(Term::and(p.clone(), q.clone()));
    assert_round_trips(Term::or(p.clone(), Term::not(q.clone())));
    assert_round_trips(Term::implies(p.clone(), q.clone()));
    assert_round_trips(Term::iff(p.clone(), q.clone()));
}

#[test]
fn test_bit_vector_terms() {
    let a = Variable::bv("a", 16);
    let b = Variable::branch_output(Type::BitVector(16));
    assert_round_trips(Term::bv(0xBEEF, 16));
    assert_round_trips(Term::bv((1 << 100) + 7, 101));
    let builders: [fn(TermRef, TermRef) -> Term; 21] = [
        Term::bv_add,
        Term::bv_sub,
        Term::bv_mul,
        Term::bv_sdiv,
        Term::bv_udiv,
        Term::bv_srem,
        Term::bv_urem,
        Term::bv_smod,
        Term::bv_and,
        Term::bv_or,
        Term::bv_xor,
        Term::bv_nand,
        Term::bv_nor,
        Term::bv_xnor,
        Term::bv_shl,
        Term::bv_lshr,
        Term::bv_ashr,
        Term::bv_slt,
        Term::bv_sle,
        Term::bv_ult,
        Term::bv_ule,
    ];
    for build in builders {
        assert_round_trips(build(a.clone().into(), b.clone().into()));
    }
    assert_round_trips(Term::bv_neg(a.clone()));
    assert_round_trips(Term::bv_not(a.clone()));
    assert_round_trips(Term::zero_extend(a.clone(), 16));
    assert_round_trips(Term::sign_extend(a.clone(), 8));
}

#[test]
fn test_indexed_component_variables() {
    let input = Variable::ComponentInput {
        component: ComponentId(2),
        index: 1,
        ty: Type::Int,
    }
    .indexed(3);
    let output = Variable::ComponentOutput {
        component: ComponentId(2),
        ty: Type::Int,
    }
    .indexed(3);
    assert_round_trips(Term::equal(output, Term::add(input, Term::int(1))));
}

#[test]
fn test_rewritten_operators() {
    let solver = Z3Solver::new();
    let x = Variable::int("x");
    let y = Variable::int("y");
    let a = Variable::bv("a", 8);
    let b = Variable::bv("b", 8);
    let p = Variable::bool("p");

    let cases = [
        (
            Term::sub(x.clone(), y.clone()),
            Term::add(x.clone(), Term::minus(y.clone())),
        ),
        (
            Term::less(x.clone(), y.clone()),
            Term::not(Term::less_eq(y.clone(), x.clone())),
        ),
        (
            Term::greater(x.clone(), y.clone()),
            Term::not(Term::less_eq(x.clone(), y.clone())),
        ),
        (
            Term::greater_eq(x.clone(), y.clone()),
            Term::less_eq(y.clone(), x.clone()),
        ),
        (
            Term::bv_sgt(a.clone(), b.clone()),
            Term::bv_slt(b.clone(), a.clone()),
        ),
        (
            Term::bv_uge(a.clone(), b.clone()),
            Term::bv_ule(b.clone(), a.clone()),
        ),
        (
            Term::equal(p.clone(), Term::bool(true)),
            Term::iff(p.clone(), Term::bool(true)),
        ),
    ];
    for (term, expected) in cases {
        assert_eq!(solver.round_trip(&term).unwrap(), expected, "decoding `{term}`");
    }
}

#[test]
fn test_uninterpreted_applications_do_not_decode() {
    let f = Arc::new(Uif::new("f", vec![Type::Int], Type::Bool));
    let term = Term::apply(f, [TermRef::from(Variable::int("x"))]);

    assert!(matches!(
        Z3Solver::new().round_trip(&term),
        Err(SolverError::Unsupported { .. })
    ));
}

#[test]
fn test_holes_and_ill_typed_terms_fail() {
    let solver = Z3Solver::new();
    let hole = Term::hole("h", Type::Int, HoleClass::Any);
    assert!(matches!(
        solver.round_trip(&Term::add(hole, Term::int(1))),
        Err(SolverError::Unsupported { .. })
    ));
    assert!(matches!(
        solver.round_trip(&Term::and(Term::int(1), Term::bool(true))),
        Err(SolverError::IllTyped { .. })
    ));
}
