use std::collections::HashMap;

use z3::{
    Context, FuncDecl,
    ast::{self, Ast},
};

use common::log_trace;
use term::{
    BinaryOp, Constant, Term, Type, UnaryOp, Uif,
    traverse::{Visitor, walk_post_order},
    typing::type_of,
};

use super::{marshal::Marshaller, node::*};
use crate::SolverError;

/// Compiles terms into backend terms with an operand stack, in post-order.
pub(crate) struct Compiler<'ctx, 'm> {
    context: &'ctx Context,
    marshaller: &'m mut Marshaller,
    stack: Vec<AstNode<'ctx>>,
    functions: HashMap<Uif, FuncDecl<'ctx>>,
}

impl<'ctx, 'm> Compiler<'ctx, 'm> {
    pub fn new(context: &'ctx Context, marshaller: &'m mut Marshaller) -> Self {
        Self {
            context,
            marshaller,
            stack: Vec::new(),
            functions: HashMap::new(),
        }
    }

    /// Compiles a clause, which must be a boolean term.
    pub fn compile_clause(&mut self, clause: &Term) -> Result<ast::Bool<'ctx>, SolverError> {
        let ty = type_of(clause)?;
        if ty != Type::Bool {
            return Err(SolverError::IllTyped {
                source: term::typing::TypeError::Operand {
                    operator: "clause".to_owned(),
                    found: ty.to_string(),
                },
            });
        }
        let ast = self.compile(clause)?.as_bool()?.clone();
        log_trace!("Compiled clause `{clause}` into `{ast}`");
        Ok(ast)
    }

    /// Compiles a well-typed term.
    pub fn compile(&mut self, term: &Term) -> Result<AstNode<'ctx>, SolverError> {
        debug_assert!(self.stack.is_empty());
        walk_post_order(term, self)?;
        let result = self.pop()?;
        if !self.stack.is_empty() {
            self.stack.clear();
            return Err(SolverError::backend("operands left on the stack"));
        }
        Ok(result)
    }

    fn pop(&mut self) -> Result<AstNode<'ctx>, SolverError> {
        self.stack
            .pop()
            .ok_or_else(|| SolverError::backend("operand stack underflow"))
    }

    fn constant(&self, constant: &Constant) -> Result<AstNode<'ctx>, SolverError> {
        let ctx = self.context;
        Ok(match constant {
            Constant::Bool(value) => ast::Bool::from_bool(ctx, *value).into(),
            Constant::Int(value) => ast::Int::from_i64(ctx, *value).into(),
            Constant::BitVector(bv) if bv.width() <= 64 => {
                ast::BV::from_u64(ctx, bv.bits() as u64, bv.width()).into()
            }
            Constant::BitVector(bv) => {
                ast::BV::from_str(ctx, bv.width(), &bv.bits().to_string())
                    .ok_or_else(|| SolverError::backend(format!("invalid numeral {bv}")))?
                    .into()
            }
        })
    }

    fn unary(&self, op: UnaryOp, arg: AstNode<'ctx>) -> Result<AstNode<'ctx>, SolverError> {
        use UnaryOp::*;
        Ok(match op {
            Minus => arg.as_int()?.unary_minus().into(),
            Not => arg.as_bool()?.not().into(),
            BVNeg => arg.as_bit_vector()?.bvneg().into(),
            BVNot => arg.as_bit_vector()?.bvnot().into(),
            ZeroExtend(bits) => arg.as_bit_vector()?.zero_ext(bits).into(),
            SignExtend(bits) => arg.as_bit_vector()?.sign_ext(bits).into(),
        })
    }

    fn binary(
        &self,
        op: BinaryOp,
        left: AstNode<'ctx>,
        right: AstNode<'ctx>,
    ) -> Result<AstNode<'ctx>, SolverError> {
        use BinaryOp::*;
        let ctx = self.context;
        let node: AstNode = match op {
            Add => ast::Int::add(ctx, &[left.as_int()?, right.as_int()?]).into(),
            Sub => ast::Int::add(ctx, &[left.as_int()?, &right.as_int()?.unary_minus()]).into(),
            Mul => ast::Int::mul(ctx, &[left.as_int()?, right.as_int()?]).into(),
            Div => left.as_int()?.div(right.as_int()?).into(),
            Less => right.as_int()?.le(left.as_int()?).not().into(),
            LessOrEqual => left.as_int()?.le(right.as_int()?).into(),
            Greater => left.as_int()?.le(right.as_int()?).not().into(),
            GreaterOrEqual => right.as_int()?.le(left.as_int()?).into(),
            Equal => left.dyn_ast()._eq(&right.dyn_ast()).into(),
            And => ast::Bool::and(ctx, &[left.as_bool()?, right.as_bool()?]).into(),
            Or => ast::Bool::or(ctx, &[left.as_bool()?, right.as_bool()?]).into(),
            Iff => left.as_bool()?._eq(right.as_bool()?).into(),
            Implies => left.as_bool()?.implies(right.as_bool()?).into(),
            _ => {
                let (l, r) = (left.as_bit_vector()?, right.as_bit_vector()?);
                match op {
                    BVAdd => l.bvadd(r).into(),
                    BVSub => l.bvsub(r).into(),
                    BVMul => l.bvmul(r).into(),
                    BVSignedDiv => l.bvsdiv(r).into(),
                    BVUnsignedDiv => l.bvudiv(r).into(),
                    BVSignedRem => l.bvsrem(r).into(),
                    BVUnsignedRem => l.bvurem(r).into(),
                    BVSignedMod => l.bvsmod(r).into(),
                    BVAnd => l.bvand(r).into(),
                    BVOr => l.bvor(r).into(),
                    BVXor => l.bvxor(r).into(),
                    BVNand => l.bvnand(r).into(),
                    BVNor => l.bvnor(r).into(),
                    BVXnor => l.bvxnor(r).into(),
                    BVShl => l.bvshl(r).into(),
                    BVLogicalShr => l.bvlshr(r).into(),
                    BVArithmeticShr => l.bvashr(r).into(),
                    BVSignedLess => l.bvslt(r).into(),
                    BVSignedLessOrEqual => l.bvsle(r).into(),
                    BVSignedGreater => r.bvslt(l).into(),
                    BVSignedGreaterOrEqual => r.bvsle(l).into(),
                    BVUnsignedLess => l.bvult(r).into(),
                    BVUnsignedLessOrEqual => l.bvule(r).into(),
                    BVUnsignedGreater => r.bvult(l).into(),
                    BVUnsignedGreaterOrEqual => r.bvule(l).into(),
                    _ => return Err(SolverError::unsupported(op)),
                }
            }
        };
        Ok(node)
    }

    fn ite(
        &self,
        cond: AstNode<'ctx>,
        then: AstNode<'ctx>,
        otherwise: AstNode<'ctx>,
    ) -> Result<AstNode<'ctx>, SolverError> {
        let ite = cond.as_bool()?.ite(&then.dyn_ast(), &otherwise.dyn_ast());
        AstNode::from_dynamic(ite)
    }

    fn apply(
        &mut self,
        func: &Uif,
        args: Vec<AstNode<'ctx>>,
    ) -> Result<AstNode<'ctx>, SolverError> {
        let ctx = self.context;
        let decl = self.functions.entry(func.clone()).or_insert_with(|| {
            let domain = func
                .params
                .iter()
                .map(|ty| z3_sort(ctx, *ty))
                .collect::<Vec<_>>();
            FuncDecl::new(
                ctx,
                &*func.name,
                &domain.iter().collect::<Vec<_>>(),
                &z3_sort(ctx, func.ret),
            )
        });
        let args = args.iter().map(AstNode::ast).collect::<Vec<_>>();
        AstNode::from_dynamic(decl.apply(&args))
    }
}

impl<'t, 'ctx> Visitor<'t> for Compiler<'ctx, '_> {
    type Error = SolverError;

    fn visit(&mut self, term: &'t Term) -> Result<(), SolverError> {
        let node = match term {
            Term::Const(constant) => self.constant(constant)?,
            Term::Var(var) => {
                let ty = var.ty();
                AstNode::constant(self.context, self.marshaller.name_of(var), ty)
            }
            Term::Hole(hole) => {
                return Err(SolverError::unsupported(format!("hole {hole} in a query")));
            }
            Term::Unary { op, .. } => {
                let arg = self.pop()?;
                self.unary(*op, arg)?
            }
            Term::Binary { op, .. } => {
                let right = self.pop()?;
                let left = self.pop()?;
                self.binary(*op, left, right)?
            }
            Term::Ite { .. } => {
                let otherwise = self.pop()?;
                let then = self.pop()?;
                let cond = self.pop()?;
                self.ite(cond, then, otherwise)?
            }
            Term::Apply { func, args } => {
                let at = self
                    .stack
                    .len()
                    .checked_sub(args.len())
                    .ok_or_else(|| SolverError::backend("operand stack underflow"))?;
                let operands = self.stack.split_off(at);
                self.apply(func, operands)?
            }
        };
        self.stack.push(node);
        Ok(())
    }
}
