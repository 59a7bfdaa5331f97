use derive_more as dm;

use crate::{
    ast::{BinaryOp, Signature, Term, UnaryOp},
    traverse::fold_post_order,
    types::{MAX_BV_WIDTH, Type},
};

#[derive(Debug, Clone, PartialEq, Eq, dm::Display, dm::Error)]
pub enum TypeError {
    #[display("`{operator}` cannot be applied to ({found})")]
    Operand { operator: String, found: String },
    #[display("the condition of an if-then-else must be Bool, found {found}")]
    Condition { found: Type },
    #[display("`{func}` expects {expected} arguments, found {found}")]
    Arity {
        func: String,
        expected: usize,
        found: usize,
    },
    #[display("argument {index} of `{func}` must be {expected}, found {found}")]
    Argument {
        func: String,
        index: usize,
        expected: Type,
        found: Type,
    },
    #[display("bit-vector width {width} is not in the supported range 1..=128")]
    Width { width: u32 },
}

impl TypeError {
    fn operand(operator: impl ToString, found: &[Type]) -> Self {
        Self::Operand {
            operator: operator.to_string(),
            found: common::utils::comma_separated(found.iter()).to_string(),
        }
    }
}

/// Infers the type of `term`, checking every node on the way.
pub fn type_of(term: &Term) -> Result<Type, TypeError> {
    fold_post_order(term, &mut |node, children: Vec<Type>| {
        node_type(node, &children)
    })
}

/// The type of `node` given the types of its children, left to right.
fn node_type(node: &Term, children: &[Type]) -> Result<Type, TypeError> {
    let ty = match (node, children) {
        (Term::Const(constant), []) => constant.ty(),
        (Term::Var(var), []) => var.ty(),
        (Term::Hole(hole), []) => hole.ty,
        (Term::Unary { op, .. }, [arg]) => unary_type(*op, *arg)?,
        (Term::Binary { op, .. }, [left, right]) => binary_type(*op, *left, *right)?,
        (Term::Ite { .. }, [cond, then, otherwise]) => {
            if !cond.is_bool() {
                return Err(TypeError::Condition { found: *cond });
            }
            if then != otherwise {
                return Err(TypeError::operand("ite", &[*then, *otherwise]));
            }
            *then
        }
        (Term::Apply { func, .. }, args) => {
            if func.params.len() != args.len() {
                return Err(TypeError::Arity {
                    func: func.name.to_string(),
                    expected: func.params.len(),
                    found: args.len(),
                });
            }
            if let Some((index, (expected, found))) = func
                .params
                .iter()
                .zip(args)
                .enumerate()
                .find(|(_, (expected, found))| expected != found)
            {
                return Err(TypeError::Argument {
                    func: func.name.to_string(),
                    index,
                    expected: *expected,
                    found: *found,
                });
            }
            func.ret
        }
        (node, found) => return Err(TypeError::operand(node.kind_name(), found)),
    };

    match ty.bv_width() {
        Some(width) if !ty.has_valid_width() => Err(TypeError::Width { width }),
        _ => Ok(ty),
    }
}

fn unary_type(op: UnaryOp, arg: Type) -> Result<Type, TypeError> {
    use UnaryOp::*;
    match (op, arg) {
        (Minus, Type::Int) => Ok(Type::Int),
        (Not, Type::Bool) => Ok(Type::Bool),
        (BVNeg | BVNot, Type::BitVector(width)) => Ok(Type::BitVector(width)),
        (ZeroExtend(bits) | SignExtend(bits), Type::BitVector(width)) => {
            let width = width.saturating_add(bits);
            if width > MAX_BV_WIDTH {
                Err(TypeError::Width { width })
            } else {
                Ok(Type::BitVector(width))
            }
        }
        _ => Err(TypeError::operand(op, &[arg])),
    }
}

fn binary_type(op: BinaryOp, left: Type, right: Type) -> Result<Type, TypeError> {
    let mismatch = || TypeError::operand(op, &[left, right]);
    match op.signature() {
        Signature::Arithmetic if left.is_int() && right.is_int() => Ok(Type::Int),
        Signature::Comparison if left.is_int() && right.is_int() => Ok(Type::Bool),
        Signature::Equality if left == right => Ok(Type::Bool),
        Signature::Logical if left.is_bool() && right.is_bool() => Ok(Type::Bool),
        Signature::BitVector if left.bv_width().is_some() && left == right => Ok(left),
        Signature::BitVectorComparison if left.bv_width().is_some() && left == right => {
            Ok(Type::Bool)
        }
        _ => Err(mismatch()),
    }
}

impl Term {
    pub(crate) fn kind_name(&self) -> String {
        match self {
            Term::Unary { op, .. } => op.to_string(),
            Term::Binary { op, .. } => op.to_string(),
            _ => format!("{:?}", self.kind()),
        }
    }
}
