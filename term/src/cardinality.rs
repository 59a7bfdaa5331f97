//! Clause generators that bound how many boolean indicators may be true.

use derive_more as dm;
use itertools::Itertools;

use crate::ast::{Term, Variable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, dm::Display, dm::Error)]
pub enum CardinalityError {
    #[display("the {encoding} encoding is not implemented")]
    Unimplemented { encoding: &'static str },
}

/// At-most-one over `bits`: `!b_i || !b_j` for every ordered pair of distinct
/// positions holding distinct variables.
pub fn pairwise(bits: &[Variable]) -> Vec<Term> {
    bits.iter()
        .permutations(2)
        .filter(|pair| pair[0] != pair[1])
        .map(|pair| Term::or(Term::not(pair[0].clone()), Term::not(pair[1].clone())))
        .collect()
}

/// At-most-`max` over `bits` through a sorting network.
pub fn sorting_network(_bits: &[Variable], _max: usize) -> Result<Vec<Term>, CardinalityError> {
    Err(CardinalityError::Unimplemented {
        encoding: "sorting network",
    })
}

/// At-most-`max` over `bits` through a counting circuit.
pub fn circuit(_bits: &[Variable], _max: usize) -> Result<Vec<Term>, CardinalityError> {
    Err(CardinalityError::Unimplemented {
        encoding: "circuit",
    })
}
