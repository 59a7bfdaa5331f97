mod builders;
mod fmt;
mod var;

use std::{collections::HashMap, sync::Arc};

use derive_more as dm;

use crate::types::{MAX_BV_WIDTH, Type};

pub use var::{BranchOutput, ComponentId, Selector, Variable};

pub type TermRef = Arc<Term>;

/// A total or partial mapping of variables to values, e.g. a solver model.
pub type Assignment = HashMap<Variable, Constant>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Const(Constant),
    Var(Variable),
    Hole(Hole),
    Unary {
        op: UnaryOp,
        arg: TermRef,
    },
    Binary {
        op: BinaryOp,
        left: TermRef,
        right: TermRef,
    },
    Ite {
        cond: TermRef,
        then: TermRef,
        otherwise: TermRef,
    },
    Apply {
        func: Arc<Uif>,
        args: Vec<TermRef>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, dm::From)]
pub enum Constant {
    Bool(bool),
    Int(i64),
    BitVector(BitVector),
}

impl Constant {
    pub fn ty(&self) -> Type {
        match self {
            Self::Bool(_) => Type::Bool,
            Self::Int(_) => Type::Int,
            Self::BitVector(bv) => Type::BitVector(bv.width()),
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bv(&self) -> Option<BitVector> {
        match self {
            Self::BitVector(bv) => Some(*bv),
            _ => None,
        }
    }
}

/// A fixed-width two's-complement bit pattern.
/// Bits above `width` are always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitVector {
    bits: u128,
    width: u32,
}

impl BitVector {
    /// Truncates `value` to `width` bits.
    pub fn new(value: u128, width: u32) -> Self {
        Self {
            bits: value & mask(width),
            width,
        }
    }

    pub fn from_signed(value: i128, width: u32) -> Self {
        Self::new(value as u128, width)
    }

    #[inline]
    pub fn bits(&self) -> u128 {
        self.bits
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn msb(&self) -> bool {
        self.width > 0 && (self.bits >> (self.width - 1)) & 1 == 1
    }

    /// The value under the signed interpretation of the bits.
    pub fn to_signed(&self) -> i128 {
        if self.width >= MAX_BV_WIDTH || !self.msb() {
            self.bits as i128
        } else {
            self.bits as i128 - (1i128 << self.width)
        }
    }
}

#[inline]
pub(crate) fn mask(width: u32) -> u128 {
    if width >= MAX_BV_WIDTH {
        u128::MAX
    } else {
        (1u128 << width) - 1
    }
}

/// The run-time category of terms a hole may bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, dm::Display)]
pub enum HoleClass {
    #[default]
    #[display("any")]
    Any,
    #[display("var")]
    Variable,
    #[display("program var")]
    ProgramVariable,
    #[display("const")]
    Constant,
}

impl HoleClass {
    pub fn admits(&self, term: &Term) -> bool {
        match self {
            Self::Any => true,
            Self::Variable => matches!(term, Term::Var(_)),
            Self::ProgramVariable => matches!(term, Term::Var(var) if var.is_program()),
            Self::Constant => matches!(term, Term::Const(_)),
        }
    }
}

/// A typed metavariable. Holes only appear in patterns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hole {
    pub name: Arc<str>,
    pub ty: Type,
    pub class: HoleClass,
}

impl Hole {
    pub fn new(name: impl Into<Arc<str>>, ty: Type, class: HoleClass) -> Self {
        Self {
            name: name.into(),
            ty,
            class,
        }
    }
}

/// An uninterpreted function symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uif {
    pub name: Arc<str>,
    pub params: Vec<Type>,
    pub ret: Type,
}

impl Uif {
    pub fn new(name: impl Into<Arc<str>>, params: Vec<Type>, ret: Type) -> Self {
        Self {
            name: name.into(),
            params,
            ret,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Minus,
    Not,
    BVNeg,
    BVNot,
    /// Extends by the given number of bits.
    ZeroExtend(u32),
    SignExtend(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    And,
    Or,
    Iff,
    Implies,
    BVAdd,
    BVSub,
    BVMul,
    BVSignedDiv,
    BVUnsignedDiv,
    BVSignedRem,
    BVUnsignedRem,
    BVSignedMod,
    BVAnd,
    BVOr,
    BVXor,
    BVNand,
    BVNor,
    BVXnor,
    BVShl,
    BVLogicalShr,
    BVArithmeticShr,
    BVSignedLess,
    BVSignedLessOrEqual,
    BVSignedGreater,
    BVSignedGreaterOrEqual,
    BVUnsignedLess,
    BVUnsignedLessOrEqual,
    BVUnsignedGreater,
    BVUnsignedGreaterOrEqual,
}

/// Operand and result shape of a binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signature {
    /// Int x Int -> Int
    Arithmetic,
    /// Int x Int -> Bool
    Comparison,
    /// T x T -> Bool
    Equality,
    /// Bool x Bool -> Bool
    Logical,
    /// BV(w) x BV(w) -> BV(w)
    BitVector,
    /// BV(w) x BV(w) -> Bool
    BitVectorComparison,
}

impl BinaryOp {
    pub(crate) fn signature(&self) -> Signature {
        use BinaryOp::*;
        match self {
            Add | Sub | Mul | Div => Signature::Arithmetic,
            Less | LessOrEqual | Greater | GreaterOrEqual => Signature::Comparison,
            Equal => Signature::Equality,
            And | Or | Iff | Implies => Signature::Logical,
            BVAdd | BVSub | BVMul | BVSignedDiv | BVUnsignedDiv | BVSignedRem | BVUnsignedRem
            | BVSignedMod | BVAnd | BVOr | BVXor | BVNand | BVNor | BVXnor | BVShl
            | BVLogicalShr | BVArithmeticShr => Signature::BitVector,
            BVSignedLess
            | BVSignedLessOrEqual
            | BVSignedGreater
            | BVSignedGreaterOrEqual
            | BVUnsignedLess
            | BVUnsignedLessOrEqual
            | BVUnsignedGreater
            | BVUnsignedGreaterOrEqual => Signature::BitVectorComparison,
        }
    }
}

/// The constructor of a term, without its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermKind {
    Constant,
    Variable,
    Hole,
    Unary,
    Binary,
    Ite,
    Apply,
}

impl Term {
    pub fn kind(&self) -> TermKind {
        match self {
            Self::Const(_) => TermKind::Constant,
            Self::Var(_) => TermKind::Variable,
            Self::Hole(_) => TermKind::Hole,
            Self::Unary { .. } => TermKind::Unary,
            Self::Binary { .. } => TermKind::Binary,
            Self::Ite { .. } => TermKind::Ite,
            Self::Apply { .. } => TermKind::Apply,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Const(_) | Self::Var(_) | Self::Hole(_))
    }

    /// The direct children, left to right.
    pub fn children(&self) -> Vec<&TermRef> {
        match self {
            Self::Const(_) | Self::Var(_) | Self::Hole(_) => Vec::new(),
            Self::Unary { arg, .. } => vec![arg],
            Self::Binary { left, right, .. } => vec![left, right],
            Self::Ite {
                cond,
                then,
                otherwise,
            } => vec![cond, then, otherwise],
            Self::Apply { args, .. } => args.iter().collect(),
        }
    }

    /// Rebuilds this node with the given children, left to right.
    /// Positions not covered by `children` keep their current child.
    pub fn with_children(&self, children: impl IntoIterator<Item = TermRef>) -> Term {
        let mut children = children.into_iter();
        let mut next = |current: &TermRef| children.next().unwrap_or_else(|| current.clone());
        match self {
            Self::Const(_) | Self::Var(_) | Self::Hole(_) => self.clone(),
            Self::Unary { op, arg } => Self::Unary {
                op: *op,
                arg: next(arg),
            },
            Self::Binary { op, left, right } => {
                let left = next(left);
                let right = next(right);
                Self::Binary {
                    op: *op,
                    left,
                    right,
                }
            }
            Self::Ite {
                cond,
                then,
                otherwise,
            } => {
                let cond = next(cond);
                let then = next(then);
                let otherwise = next(otherwise);
                Self::Ite {
                    cond,
                    then,
                    otherwise,
                }
            }
            Self::Apply { func, args } => Self::Apply {
                func: func.clone(),
                args: args.iter().map(&mut next).collect(),
            },
        }
    }

    /// The static type of this term.
    #[inline]
    pub fn ty(&self) -> Result<Type, crate::typing::TypeError> {
        crate::typing::type_of(self)
    }
}

macro_rules! impl_into_term {
    ($($from:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$from> for Term {
                fn from(value: $from) -> Self {
                    Term::$variant(value.into())
                }
            }
        )*
    };
}

macro_rules! impl_into_term_ref {
    ($($from:ty),* $(,)?) => {
        $(
            impl From<$from> for TermRef {
                fn from(value: $from) -> Self {
                    Arc::new(Term::from(value))
                }
            }
        )*
    };
}

impl_into_term!(
    Constant => Const,
    Variable => Var,
    Hole => Hole,
    bool => Const,
    i64 => Const,
    BitVector => Const,
);
impl_into_term_ref!(Constant, Variable, Hole, BitVector);
