use derive_more as dm;
use z3::{
    Context, Sort,
    ast::{self, Ast},
};
use z3_sys::SortKind;

use term::Type;

use crate::SolverError;

/// A backend term together with the sort family it belongs to.
#[derive(Debug, Clone, dm::Display, dm::From)]
#[display("{_0}")]
pub(crate) enum AstNode<'ctx> {
    Bool(ast::Bool<'ctx>),
    Int(ast::Int<'ctx>),
    BitVector(ast::BV<'ctx>),
}

impl<'ctx> AstNode<'ctx> {
    /// Declares a constant named `name` of type `ty`.
    pub fn constant(context: &'ctx Context, name: &str, ty: Type) -> Self {
        match ty {
            Type::Bool => ast::Bool::new_const(context, name).into(),
            Type::Int => ast::Int::new_const(context, name).into(),
            Type::BitVector(width) => ast::BV::new_const(context, name, width).into(),
        }
    }

    pub fn from_dynamic(ast: ast::Dynamic<'ctx>) -> Result<Self, SolverError> {
        let node = match ast.sort_kind() {
            SortKind::Bool => ast.as_bool().map(Self::Bool),
            SortKind::Int => ast.as_int().map(Self::Int),
            SortKind::BV => ast.as_bv().map(Self::BitVector),
            _ => None,
        };
        node.ok_or_else(|| SolverError::unsupported(format!("term of sort {}", ast.get_sort())))
    }

    pub fn as_bool(&self) -> Result<&ast::Bool<'ctx>, SolverError> {
        match self {
            Self::Bool(ast) => Ok(ast),
            _ => Err(self.unexpected("Bool")),
        }
    }

    pub fn as_int(&self) -> Result<&ast::Int<'ctx>, SolverError> {
        match self {
            Self::Int(ast) => Ok(ast),
            _ => Err(self.unexpected("Int")),
        }
    }

    pub fn as_bit_vector(&self) -> Result<&ast::BV<'ctx>, SolverError> {
        match self {
            Self::BitVector(ast) => Ok(ast),
            _ => Err(self.unexpected("BitVec")),
        }
    }

    fn unexpected(&self, expected: &str) -> SolverError {
        SolverError::backend(format!("expected a {expected} term, found `{self}`"))
    }

    pub fn ast(&self) -> &dyn Ast<'ctx> {
        match self {
            Self::Bool(ast) => ast,
            Self::Int(ast) => ast,
            Self::BitVector(ast) => ast,
        }
    }

    pub fn dyn_ast(&self) -> ast::Dynamic<'ctx> {
        ast::Dynamic::from_ast(self.ast())
    }
}

pub(crate) fn z3_sort(context: &Context, ty: Type) -> Sort<'_> {
    match ty {
        Type::Bool => Sort::bool(context),
        Type::Int => Sort::int(context),
        Type::BitVector(width) => Sort::bitvector(context, width),
    }
}
