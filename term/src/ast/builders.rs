use std::sync::Arc;

use super::*;

macro_rules! unary_builders {
    ($($name:ident => $op:ident),* $(,)?) => {
        $(
            pub fn $name(arg: impl Into<TermRef>) -> Self {
                Self::Unary {
                    op: UnaryOp::$op,
                    arg: arg.into(),
                }
            }
        )*
    };
}

macro_rules! binary_builders {
    ($($name:ident => $op:ident),* $(,)?) => {
        $(
            pub fn $name(left: impl Into<TermRef>, right: impl Into<TermRef>) -> Self {
                Self::Binary {
                    op: BinaryOp::$op,
                    left: left.into(),
                    right: right.into(),
                }
            }
        )*
    };
}

impl Term {
    #[inline]
    pub fn bool(value: bool) -> Self {
        Self::Const(Constant::Bool(value))
    }

    #[inline]
    pub fn int(value: i64) -> Self {
        Self::Const(Constant::Int(value))
    }

    #[inline]
    pub fn bv(value: u128, width: u32) -> Self {
        Self::Const(Constant::BitVector(BitVector::new(value, width)))
    }

    pub fn hole(name: impl Into<Arc<str>>, ty: Type, class: HoleClass) -> Self {
        Self::Hole(Hole::new(name, ty, class))
    }

    pub fn ite(
        cond: impl Into<TermRef>,
        then: impl Into<TermRef>,
        otherwise: impl Into<TermRef>,
    ) -> Self {
        Self::Ite {
            cond: cond.into(),
            then: then.into(),
            otherwise: otherwise.into(),
        }
    }

    pub fn apply(func: impl Into<Arc<Uif>>, args: impl IntoIterator<Item = TermRef>) -> Self {
        Self::Apply {
            func: func.into(),
            args: args.into_iter().collect(),
        }
    }

    pub fn zero_extend(arg: impl Into<TermRef>, bits: u32) -> Self {
        Self::Unary {
            op: UnaryOp::ZeroExtend(bits),
            arg: arg.into(),
        }
    }

    pub fn sign_extend(arg: impl Into<TermRef>, bits: u32) -> Self {
        Self::Unary {
            op: UnaryOp::SignExtend(bits),
            arg: arg.into(),
        }
    }

    /// Conjunction of all `terms`, `true` if empty.
    pub fn and_all(terms: impl IntoIterator<Item = Term>) -> Self {
        terms
            .into_iter()
            .reduce(Term::and)
            .unwrap_or(Term::bool(true))
    }

    /// Disjunction of all `terms`, `false` if empty.
    pub fn or_all(terms: impl IntoIterator<Item = Term>) -> Self {
        terms
            .into_iter()
            .reduce(Term::or)
            .unwrap_or(Term::bool(false))
    }

    unary_builders! {
        minus => Minus,
        not => Not,
        bv_neg => BVNeg,
        bv_not => BVNot,
    }

    binary_builders! {
        add => Add,
        sub => Sub,
        mul => Mul,
        div => Div,
        equal => Equal,
        less => Less,
        less_eq => LessOrEqual,
        greater => Greater,
        greater_eq => GreaterOrEqual,
        and => And,
        or => Or,
        iff => Iff,
        implies => Implies,
        bv_add => BVAdd,
        bv_sub => BVSub,
        bv_mul => BVMul,
        bv_sdiv => BVSignedDiv,
        bv_udiv => BVUnsignedDiv,
        bv_srem => BVSignedRem,
        bv_urem => BVUnsignedRem,
        bv_smod => BVSignedMod,
        bv_and => BVAnd,
        bv_or => BVOr,
        bv_xor => BVXor,
        bv_nand => BVNand,
        bv_nor => BVNor,
        bv_xnor => BVXnor,
        bv_shl => BVShl,
        bv_lshr => BVLogicalShr,
        bv_ashr => BVArithmeticShr,
        bv_slt => BVSignedLess,
        bv_sle => BVSignedLessOrEqual,
        bv_sgt => BVSignedGreater,
        bv_sge => BVSignedGreaterOrEqual,
        bv_ult => BVUnsignedLess,
        bv_ule => BVUnsignedLessOrEqual,
        bv_ugt => BVUnsignedGreater,
        bv_uge => BVUnsignedGreaterOrEqual,
    }
}
