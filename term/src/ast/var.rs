use std::{
    hash::{Hash, Hasher},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use derive_more as dm;

use crate::types::Type;

/// Identifies a component instance inside a synthesis problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, dm::Display, dm::From)]
#[display("c{_0}")]
pub struct ComponentId(pub usize);

static NEXT_FRESH_ID: AtomicU64 = AtomicU64::new(0);

fn next_fresh_id() -> u64 {
    NEXT_FRESH_ID.fetch_add(1, Ordering::Relaxed)
}

/// A fresh boolean choice point.
/// Every call to [`Selector::fresh`] yields a distinct selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, dm::Display)]
#[display("selector<{id}>")]
pub struct Selector {
    id: u64,
}

impl Selector {
    pub fn fresh() -> Self {
        Self {
            id: next_fresh_id(),
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// The output of a branch in bounded synthesis.
/// Identity is the minted id; the type is carried along but never compared.
#[derive(Debug, Clone, Copy, dm::Display)]
#[display("branch<{id}>")]
pub struct BranchOutput {
    id: u64,
    ty: Type,
}

impl BranchOutput {
    pub fn fresh(ty: Type) -> Self {
        Self {
            id: next_fresh_id(),
            ty,
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn ty(&self) -> Type {
        self.ty
    }
}

impl PartialEq for BranchOutput {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for BranchOutput {}

impl Hash for BranchOutput {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, dm::Display)]
pub enum Variable {
    /// A named variable of the program under synthesis.
    #[display("{name}")]
    Program { name: Arc<str>, ty: Type },
    /// A constant the synthesizer is free to choose.
    #[display("{name}")]
    Parameter { name: Arc<str>, ty: Type },
    #[display("{component}.in{index}")]
    ComponentInput {
        component: ComponentId,
        index: usize,
        ty: Type,
    },
    #[display("{component}.out")]
    ComponentOutput { component: ComponentId, ty: Type },
    #[display("out")]
    ProgramOutput { ty: Type },
    /// The position of a component in a location-based encoding.
    #[display("{component}.loc")]
    Location { component: ComponentId },
    /// A copy of `var` instantiated for the test case at `index`.
    #[display("{var}@{index}")]
    Indexed { var: Arc<Variable>, index: usize },
    #[display("_")]
    Dummy { ty: Type },
    #[display("{_0}")]
    Selector(Selector),
    #[display("{_0}")]
    BranchOutput(BranchOutput),
}

impl Variable {
    pub fn program(name: impl Into<Arc<str>>, ty: Type) -> Self {
        Self::Program {
            name: name.into(),
            ty,
        }
    }

    pub fn parameter(name: impl Into<Arc<str>>, ty: Type) -> Self {
        Self::Parameter {
            name: name.into(),
            ty,
        }
    }

    #[inline]
    pub fn int(name: impl Into<Arc<str>>) -> Self {
        Self::program(name, Type::Int)
    }

    #[inline]
    pub fn bool(name: impl Into<Arc<str>>) -> Self {
        Self::program(name, Type::Bool)
    }

    #[inline]
    pub fn bv(name: impl Into<Arc<str>>, width: u32) -> Self {
        Self::program(name, Type::BitVector(width))
    }

    pub fn selector() -> Self {
        Self::Selector(Selector::fresh())
    }

    pub fn branch_output(ty: Type) -> Self {
        Self::BranchOutput(BranchOutput::fresh(ty))
    }

    pub fn indexed(self, index: usize) -> Self {
        Self::Indexed {
            var: Arc::new(self),
            index,
        }
    }

    pub fn ty(&self) -> Type {
        use Variable::*;
        match self {
            Program { ty, .. }
            | Parameter { ty, .. }
            | ComponentInput { ty, .. }
            | ComponentOutput { ty, .. }
            | ProgramOutput { ty }
            | Dummy { ty } => *ty,
            Location { .. } => Type::Int,
            Indexed { var, .. } => var.ty(),
            Selector(_) => Type::Bool,
            BranchOutput(branch) => branch.ty(),
        }
    }

    #[inline]
    pub fn is_program(&self) -> bool {
        matches!(self, Self::Program { .. })
    }
}
