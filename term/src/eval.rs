//! Evaluation of ground terms.
//!
//! Integers follow SMT-LIB integer semantics as far as `i64` reaches; leaving
//! that range is reported as an overflow rather than wrapped. Bit-vectors
//! follow the SMT-LIB bit-vector theory, including its total definitions of
//! division and remainder by zero.

use derive_more as dm;

use crate::{
    ast::{Assignment, BinaryOp, BitVector, Constant, Hole, Term, UnaryOp, Variable, mask},
    typing::{TypeError, type_of},
};

#[derive(Debug, Clone, PartialEq, Eq, dm::Display, dm::Error, dm::From)]
pub enum EvalError {
    #[display("no value assigned to {var}")]
    Unbound { var: Variable },
    #[display("value {value} assigned to {var} does not have type {}", var.ty())]
    Mismatch { var: Variable, value: Constant },
    #[display("cannot evaluate hole {hole}")]
    Hole { hole: Hole },
    #[display("cannot evaluate uninterpreted function `{func}`")]
    Uninterpreted { func: String },
    #[display("integer overflow in {term}")]
    Overflow { term: String },
    #[display("integer division by zero in {term}")]
    DivisionByZero { term: String },
    #[display("{source}")]
    #[from]
    IllTyped { source: TypeError },
}

/// Evaluates `term` under `assignment`.
pub fn eval(term: &Term, assignment: &Assignment) -> Result<Constant, EvalError> {
    type_of(term)?;
    Evaluator { assignment }.eval(term)
}

struct Evaluator<'a> {
    assignment: &'a Assignment,
}

impl Evaluator<'_> {
    fn eval(&self, term: &Term) -> Result<Constant, EvalError> {
        match term {
            Term::Const(constant) => Ok(*constant),
            Term::Var(var) => {
                let value = *self
                    .assignment
                    .get(var)
                    .ok_or_else(|| EvalError::Unbound { var: var.clone() })?;
                if value.ty() != var.ty() {
                    return Err(EvalError::Mismatch {
                        var: var.clone(),
                        value,
                    });
                }
                Ok(value)
            }
            Term::Hole(hole) => Err(EvalError::Hole { hole: hole.clone() }),
            Term::Unary { op, arg } => {
                let arg = self.eval(arg)?;
                unary(*op, arg).ok_or_else(|| ill_typed(term))?
            }
            Term::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                binary(term, *op, left, right)
            }
            // Only the taken branch is evaluated.
            Term::Ite {
                cond,
                then,
                otherwise,
            } => match self.eval(cond)? {
                Constant::Bool(true) => self.eval(then),
                Constant::Bool(false) => self.eval(otherwise),
                _ => Err(ill_typed(term)),
            },
            Term::Apply { func, .. } => Err(EvalError::Uninterpreted {
                func: func.name.to_string(),
            }),
        }
    }
}

fn ill_typed(term: &Term) -> EvalError {
    // Not reachable once `type_of` accepted the term.
    EvalError::IllTyped {
        source: TypeError::Operand {
            operator: term.kind_name(),
            found: term.to_string(),
        },
    }
}

fn unary(op: UnaryOp, arg: Constant) -> Option<Result<Constant, EvalError>> {
    use Constant::{BitVector as BV, Bool, Int};
    use UnaryOp::*;
    let value = match (op, arg) {
        (Minus, Int(value)) => {
            return Some(value.checked_neg().map(Int).ok_or(EvalError::Overflow {
                term: format!("-({value})"),
            }));
        }
        (Not, Bool(value)) => Bool(!value),
        (BVNeg, BV(a)) => BV(bv::neg(a)),
        (BVNot, BV(a)) => BV(bv::not(a)),
        (ZeroExtend(bits), BV(a)) => BV(BitVector::new(a.bits(), a.width() + bits)),
        (SignExtend(bits), BV(a)) => BV(BitVector::from_signed(a.to_signed(), a.width() + bits)),
        _ => return None,
    };
    Some(Ok(value))
}

fn binary(
    term: &Term,
    op: BinaryOp,
    left: Constant,
    right: Constant,
) -> Result<Constant, EvalError> {
    use BinaryOp::*;
    use Constant::{BitVector as BV, Bool, Int};

    let overflow = || EvalError::Overflow {
        term: term.to_string(),
    };
    let value = match (op, left, right) {
        (Equal, l, r) => Bool(l == r),

        (Add, Int(l), Int(r)) => Int(l.checked_add(r).ok_or_else(overflow)?),
        (Sub, Int(l), Int(r)) => Int(l.checked_sub(r).ok_or_else(overflow)?),
        (Mul, Int(l), Int(r)) => Int(l.checked_mul(r).ok_or_else(overflow)?),
        (Div, Int(_), Int(0)) => {
            return Err(EvalError::DivisionByZero {
                term: term.to_string(),
            });
        }
        (Div, Int(l), Int(r)) => Int(l.checked_div_euclid(r).ok_or_else(overflow)?),
        (Less, Int(l), Int(r)) => Bool(l < r),
        (LessOrEqual, Int(l), Int(r)) => Bool(l <= r),
        (Greater, Int(l), Int(r)) => Bool(l > r),
        (GreaterOrEqual, Int(l), Int(r)) => Bool(l >= r),

        (And, Bool(l), Bool(r)) => Bool(l && r),
        (Or, Bool(l), Bool(r)) => Bool(l || r),
        (Iff, Bool(l), Bool(r)) => Bool(l == r),
        (Implies, Bool(l), Bool(r)) => Bool(!l || r),

        (op, BV(l), BV(r)) if l.width() == r.width() => {
            bv::binary(op, l, r).ok_or_else(|| ill_typed(term))?
        }
        _ => return Err(ill_typed(term)),
    };
    Ok(value)
}

/// Bit-vector operations on equal widths.
mod bv {
    use super::*;

    fn make(bits: u128, like: BitVector) -> BitVector {
        BitVector::new(bits, like.width())
    }

    pub(super) fn neg(a: BitVector) -> BitVector {
        make(a.bits().wrapping_neg(), a)
    }

    pub(super) fn not(a: BitVector) -> BitVector {
        make(!a.bits(), a)
    }

    fn add(a: BitVector, b: BitVector) -> BitVector {
        make(a.bits().wrapping_add(b.bits()), a)
    }

    fn udiv(a: BitVector, b: BitVector) -> BitVector {
        match b.bits() {
            0 => make(mask(a.width()), a),
            divisor => make(a.bits() / divisor, a),
        }
    }

    fn urem(a: BitVector, b: BitVector) -> BitVector {
        match b.bits() {
            0 => a,
            divisor => make(a.bits() % divisor, a),
        }
    }

    fn abs(a: BitVector) -> BitVector {
        if a.msb() { neg(a) } else { a }
    }

    fn sdiv(a: BitVector, b: BitVector) -> BitVector {
        match (a.msb(), b.msb()) {
            (false, false) => udiv(a, b),
            (true, false) => neg(udiv(neg(a), b)),
            (false, true) => neg(udiv(a, neg(b))),
            (true, true) => udiv(neg(a), neg(b)),
        }
    }

    fn srem(a: BitVector, b: BitVector) -> BitVector {
        match (a.msb(), b.msb()) {
            (false, false) => urem(a, b),
            (true, false) => neg(urem(neg(a), b)),
            (false, true) => urem(a, neg(b)),
            (true, true) => neg(urem(neg(a), neg(b))),
        }
    }

    fn smod(a: BitVector, b: BitVector) -> BitVector {
        let u = urem(abs(a), abs(b));
        if u.bits() == 0 {
            return u;
        }
        match (a.msb(), b.msb()) {
            (false, false) => u,
            (true, false) => add(neg(u), b),
            (false, true) => add(u, b),
            (true, true) => neg(u),
        }
    }

    fn shift_amount(a: BitVector, b: BitVector) -> Option<u32> {
        u32::try_from(b.bits()).ok().filter(|amount| *amount < a.width())
    }

    fn shl(a: BitVector, b: BitVector) -> BitVector {
        match shift_amount(a, b) {
            Some(amount) => make(a.bits() << amount, a),
            None => make(0, a),
        }
    }

    fn lshr(a: BitVector, b: BitVector) -> BitVector {
        match shift_amount(a, b) {
            Some(amount) => make(a.bits() >> amount, a),
            None => make(0, a),
        }
    }

    fn ashr(a: BitVector, b: BitVector) -> BitVector {
        match shift_amount(a, b) {
            Some(amount) => BitVector::from_signed(a.to_signed() >> amount, a.width()),
            None if a.msb() => make(u128::MAX, a),
            None => make(0, a),
        }
    }

    pub(super) fn binary(op: BinaryOp, a: BitVector, b: BitVector) -> Option<Constant> {
        use BinaryOp::*;
        let (ua, ub) = (a.bits(), b.bits());
        let (sa, sb) = (a.to_signed(), b.to_signed());
        let value: Constant = match op {
            BVAdd => add(a, b).into(),
            BVSub => make(ua.wrapping_sub(ub), a).into(),
            BVMul => make(ua.wrapping_mul(ub), a).into(),
            BVSignedDiv => sdiv(a, b).into(),
            BVUnsignedDiv => udiv(a, b).into(),
            BVSignedRem => srem(a, b).into(),
            BVUnsignedRem => urem(a, b).into(),
            BVSignedMod => smod(a, b).into(),
            BVAnd => make(ua & ub, a).into(),
            BVOr => make(ua | ub, a).into(),
            BVXor => make(ua ^ ub, a).into(),
            BVNand => make(!(ua & ub), a).into(),
            BVNor => make(!(ua | ub), a).into(),
            BVXnor => make(!(ua ^ ub), a).into(),
            BVShl => shl(a, b).into(),
            BVLogicalShr => lshr(a, b).into(),
            BVArithmeticShr => ashr(a, b).into(),
            BVSignedLess => (sa < sb).into(),
            BVSignedLessOrEqual => (sa <= sb).into(),
            BVSignedGreater => (sa > sb).into(),
            BVSignedGreaterOrEqual => (sa >= sb).into(),
            BVUnsignedLess => (ua < ub).into(),
            BVUnsignedLessOrEqual => (ua <= ub).into(),
            BVUnsignedGreater => (ua > ub).into(),
            BVUnsignedGreaterOrEqual => (ua >= ub).into(),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground(term: Term) -> Constant {
        eval(&term, &Assignment::new()).unwrap()
    }

    fn bv8(value: u128) -> Term {
        Term::bv(value, 8)
    }

    fn bv8_value(term: Term) -> u128 {
        ground(term).as_bv().unwrap().bits()
    }

    #[test]
    fn integer_arithmetic() {
        assert_eq!(ground(Term::add(Term::int(3), Term::int(4))), Constant::Int(7));
        assert_eq!(ground(Term::div(Term::int(-7), Term::int(2))), Constant::Int(-4));
        assert_eq!(ground(Term::div(Term::int(7), Term::int(-2))), Constant::Int(-3));
        assert_eq!(ground(Term::sub(Term::int(1), Term::int(5))), Constant::Int(-4));
        assert_eq!(
            ground(Term::greater_eq(Term::int(1), Term::int(1))),
            Constant::Bool(true)
        );
    }

    #[test]
    fn integer_failures_are_errors() {
        let empty = Assignment::new();
        assert!(matches!(
            eval(&Term::div(Term::int(1), Term::int(0)), &empty),
            Err(EvalError::DivisionByZero { .. })
        ));
        assert!(matches!(
            eval(&Term::add(Term::int(i64::MAX), Term::int(1)), &empty),
            Err(EvalError::Overflow { .. })
        ));
        assert!(matches!(
            eval(&Term::minus(Term::int(i64::MIN)), &empty),
            Err(EvalError::Overflow { .. })
        ));
        assert!(matches!(
            eval(&Term::add(Term::int(1), Term::bool(true)), &empty),
            Err(EvalError::IllTyped { .. })
        ));
    }

    #[test]
    fn variables_come_from_the_assignment() {
        let x = Variable::int("x");
        let term = Term::equal(x.clone(), Term::add(Term::int(3), Term::int(4)));
        let mut assignment = Assignment::from([(x.clone(), Constant::Int(7))]);
        assert_eq!(eval(&term, &assignment), Ok(Constant::Bool(true)));

        assignment.insert(x.clone(), Constant::Bool(true));
        assert!(matches!(eval(&term, &assignment), Err(EvalError::Mismatch { .. })));

        assert_eq!(
            eval(&term, &Assignment::new()),
            Err(EvalError::Unbound { var: x })
        );
    }

    #[test]
    fn only_the_taken_branch_is_evaluated() {
        let term = Term::ite(
            Term::bool(true),
            Term::int(1),
            Term::div(Term::int(1), Term::int(0)),
        );
        assert_eq!(ground(term), Constant::Int(1));
    }

    #[test]
    fn bit_vector_arithmetic_wraps() {
        assert_eq!(bv8_value(Term::bv_add(bv8(200), bv8(100))), 44);
        assert_eq!(bv8_value(Term::bv_sub(bv8(0), bv8(1))), 255);
        assert_eq!(bv8_value(Term::bv_mul(bv8(16), bv8(16))), 0);
        assert_eq!(bv8_value(Term::bv_neg(bv8(1))), 255);
        assert_eq!(bv8_value(Term::bv_not(bv8(0x0f))), 0xf0);
        assert_eq!(bv8_value(Term::bv_nand(bv8(0xff), bv8(0x0f))), 0xf0);
        assert_eq!(bv8_value(Term::bv_xnor(bv8(0xff), bv8(0x0f))), 0x0f);
    }

    #[test]
    fn bit_vector_division_is_total() {
        assert_eq!(bv8_value(Term::bv_udiv(bv8(7), bv8(0))), 255);
        assert_eq!(bv8_value(Term::bv_urem(bv8(7), bv8(0))), 7);
        // -7 / 2 = -3, -7 rem 2 = -1, -7 mod 2 = 1
        assert_eq!(bv8_value(Term::bv_sdiv(bv8(0xf9), bv8(2))), 0xfd);
        assert_eq!(bv8_value(Term::bv_srem(bv8(0xf9), bv8(2))), 0xff);
        assert_eq!(bv8_value(Term::bv_smod(bv8(0xf9), bv8(2))), 1);
        // 7 mod -2 = -1
        assert_eq!(bv8_value(Term::bv_smod(bv8(7), bv8(0xfe))), 0xff);
        // Signed division of a negative number by zero gives 1.
        assert_eq!(bv8_value(Term::bv_sdiv(bv8(0xf9), bv8(0))), 1);
        assert_eq!(bv8_value(Term::bv_smod(bv8(0xf9), bv8(0))), 0xf9);
    }

    #[test]
    fn bit_vector_shifts_saturate() {
        assert_eq!(bv8_value(Term::bv_shl(bv8(1), bv8(7))), 0x80);
        assert_eq!(bv8_value(Term::bv_shl(bv8(1), bv8(8))), 0);
        assert_eq!(bv8_value(Term::bv_lshr(bv8(0x80), bv8(7))), 1);
        assert_eq!(bv8_value(Term::bv_ashr(bv8(0x80), bv8(7))), 0xff);
        assert_eq!(bv8_value(Term::bv_ashr(bv8(0x80), bv8(200))), 0xff);
        assert_eq!(bv8_value(Term::bv_ashr(bv8(0x40), bv8(200))), 0);
    }

    #[test]
    fn bit_vector_comparisons_and_extensions() {
        assert_eq!(ground(Term::bv_slt(bv8(0xff), bv8(0))), Constant::Bool(true));
        assert_eq!(ground(Term::bv_ult(bv8(0xff), bv8(0))), Constant::Bool(false));
        assert_eq!(ground(Term::bv_sge(bv8(0x7f), bv8(0x80))), Constant::Bool(true));
        assert_eq!(
            ground(Term::sign_extend(bv8(0x80), 8)),
            Constant::BitVector(BitVector::new(0xff80, 16))
        );
        assert_eq!(
            ground(Term::zero_extend(bv8(0x80), 8)),
            Constant::BitVector(BitVector::new(0x80, 16))
        );
        let wide = Term::bv(u128::MAX, 128);
        assert_eq!(
            ground(Term::bv_add(wide.clone(), Term::bv(1, 128))),
            Constant::BitVector(BitVector::new(0, 128))
        );
        assert_eq!(
            ground(Term::bv_ashr(wide, Term::bv(127, 128))),
            Constant::BitVector(BitVector::new(u128::MAX, 128))
        );
    }
}
