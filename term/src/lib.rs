pub mod ast;
pub mod cardinality;
pub mod eval;
pub mod transform;
pub mod traverse;
pub mod types;
pub mod typing;
pub mod unify;

pub use ast::{
    Assignment, BinaryOp, BitVector, Constant, Hole, HoleClass, Term, TermKind, TermRef, UnaryOp,
    Uif, Variable,
};
pub use types::Type;
