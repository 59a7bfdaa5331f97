use core::fmt::{Display, Formatter, Result};

use common::utils::comma_separated;

use super::*;

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::Const(constant) => constant.fmt(f),
            Self::Var(var) => var.fmt(f),
            Self::Hole(hole) => hole.fmt(f),
            Self::Unary { op, arg } => match op {
                UnaryOp::ZeroExtend(bits) => write!(f, "zext({arg}, {bits})"),
                UnaryOp::SignExtend(bits) => write!(f, "sext({arg}, {bits})"),
                _ => write!(f, "{op}{arg}"),
            },
            Self::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::Ite {
                cond,
                then,
                otherwise,
            } => write!(f, "({cond} ? {then} : {otherwise})"),
            Self::Apply { func, args } => {
                write!(f, "{}({})", func.name, comma_separated(args.iter()))
            }
        }
    }
}

impl Display for Constant {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::Bool(value) => value.fmt(f),
            Self::Int(value) => value.fmt(f),
            Self::BitVector(bv) => bv.fmt(f),
        }
    }
}

impl Display for BitVector {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}bv{}", self.bits, self.width)
    }
}

impl Display for Hole {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "?{}", self.name)
    }
}

impl Display for Uif {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "{}: ({}) -> {}",
            self.name,
            comma_separated(self.params.iter()),
            self.ret
        )
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::Minus => write!(f, "-"),
            Self::Not => write!(f, "!"),
            Self::BVNeg => write!(f, "bvneg "),
            Self::BVNot => write!(f, "~"),
            Self::ZeroExtend(bits) => write!(f, "zext{bits}"),
            Self::SignExtend(bits) => write!(f, "sext{bits}"),
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        use BinaryOp::*;
        let symbol = match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Equal => "==",
            Less => "<",
            LessOrEqual => "<=",
            Greater => ">",
            GreaterOrEqual => ">=",
            And => "&&",
            Or => "||",
            Iff => "<=>",
            Implies => "=>",
            BVAdd => "bvadd",
            BVSub => "bvsub",
            BVMul => "bvmul",
            BVSignedDiv => "bvsdiv",
            BVUnsignedDiv => "bvudiv",
            BVSignedRem => "bvsrem",
            BVUnsignedRem => "bvurem",
            BVSignedMod => "bvsmod",
            BVAnd => "&",
            BVOr => "|",
            BVXor => "^",
            BVNand => "bvnand",
            BVNor => "bvnor",
            BVXnor => "bvxnor",
            BVShl => "<<",
            BVLogicalShr => ">>",
            BVArithmeticShr => ">>s",
            BVSignedLess => "<s",
            BVSignedLessOrEqual => "<=s",
            BVSignedGreater => ">s",
            BVSignedGreaterOrEqual => ">=s",
            BVUnsignedLess => "<u",
            BVUnsignedLessOrEqual => "<=u",
            BVUnsignedGreater => ">u",
            BVUnsignedGreaterOrEqual => ">=u",
        };
        f.write_str(symbol)
    }
}
