use derive_more as dm;

/// The widest bit-vector the engine represents.
pub const MAX_BV_WIDTH: u32 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, dm::Display)]
pub enum Type {
    #[display("Bool")]
    Bool,
    #[display("Int")]
    Int,
    #[display("BV{_0}")]
    BitVector(u32),
}

impl Type {
    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, Self::Int)
    }

    #[inline]
    pub fn bv_width(&self) -> Option<u32> {
        match self {
            Self::BitVector(width) => Some(*width),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn has_valid_width(&self) -> bool {
        self.bv_width()
            .is_none_or(|width| (1..=MAX_BV_WIDTH).contains(&width))
    }
}
