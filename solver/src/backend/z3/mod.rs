mod decode;
mod encode;
mod marshal;
mod node;
mod solve;

use itertools::Either;
use z3::{
    Config, Context,
    ast::{self, Ast},
};

use common::log_debug;
use term::{Assignment, Term, TermRef};

use crate::{
    SolverError,
    config::SolverConfig,
    solver::{InterpolatingSolver, Solver},
};
use solve::Query;

/// Numeral access for bit-vectors wider than 64 bits.
pub(crate) trait BVExt {
    fn as_u128(&self) -> Option<u128>;
}

impl<'ctx> BVExt for ast::BV<'ctx> {
    fn as_u128(&self) -> Option<u128> {
        let width = self.get_size();
        match width {
            0..=64 => self.as_u64().map(u128::from),
            65..=128 => {
                let high = self.extract(width - 1, 64).simplify().as_u64()?;
                let low = self.extract(63, 0).simplify().as_u64()?;
                Some(u128::from(high) << 64 | u128::from(low))
            }
            _ => None,
        }
    }
}

/// Applies backend parameters process-wide. Contexts created afterwards pick
/// them up.
pub fn set_global_params<'a>(params: impl IntoIterator<Item = (&'a str, &'a str)>) {
    for (name, value) in params {
        log_debug!("Z3 global parameter {name} = {value}");
        z3::set_global_param(name, value);
    }
}

/// Z3-based solver implementation. Every query runs in a context of its own,
/// so nothing carries over from one query to the next.
#[derive(Debug, Clone, Default)]
pub struct Z3Solver {
    config: SolverConfig,
}

impl Z3Solver {
    pub fn new() -> Self {
        Self::with_config(SolverConfig::default())
    }

    pub fn with_config(config: SolverConfig) -> Self {
        set_global_params(
            config
                .global_params
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        );
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn new_context(&self) -> Context {
        let mut config = Config::new();
        config.set_model_generation(true);
        if let Some(timeout) = self.config.timeout_ms {
            config.set_timeout_msec(timeout);
        }
        Context::new(&config)
    }

    /// Encodes `term` in a fresh context and decodes it back.
    pub fn round_trip(&self, term: &Term) -> Result<Term, SolverError> {
        let context = self.new_context();
        let decoded = Query::new(&context).round_trip(term);
        decoded
    }
}

impl Solver for Z3Solver {
    #[tracing::instrument(level = "debug", skip_all, fields(clauses = clauses.len()))]
    fn get_model(&mut self, clauses: &[TermRef]) -> Result<Option<Assignment>, SolverError> {
        let context = self.new_context();
        let mut query = Query::new(&context);
        let asts = query.compile(clauses)?;
        log_debug!("Sending {} clauses to Z3", asts.len());
        query.assert_all(&asts);
        query.check()
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(clauses = clauses.len(), assumptions = assumptions.len())
    )]
    fn get_model_or_core(
        &mut self,
        clauses: &[TermRef],
        assumptions: &[TermRef],
    ) -> Result<Either<Assignment, Vec<TermRef>>, SolverError> {
        let context = self.new_context();
        let mut query = Query::new(&context);
        let asts = query.compile(clauses)?;
        log_debug!("Sending {} clauses to Z3", asts.len());
        query.assert_all(&asts);
        query.check_with_core(assumptions)
    }
}

impl InterpolatingSolver for Z3Solver {
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(left = left.len(), right = right.len())
    )]
    fn get_model_or_interpolant(
        &mut self,
        left: &[TermRef],
        right: &[TermRef],
    ) -> Result<Either<Assignment, Term>, SolverError> {
        let context = self.new_context();
        let mut query = Query::new(&context);
        let left_asts = query.compile(left)?;
        let right_asts = query.compile(right)?;
        log_debug!(
            "Sending {} + {} clauses to Z3",
            left_asts.len(),
            right_asts.len()
        );
        query.assert_all(&left_asts);
        query.assert_all(&right_asts);
        match query.check()? {
            Some(model) => Ok(Either::Left(model)),
            None => query
                .interpolant(
                    (left, &left_asts),
                    (right, &right_asts),
                    &self.config.interpolation,
                )
                .map(Either::Right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_numerals_are_read_in_halves() {
        let context = Context::new(&Config::new());
        let narrow = ast::BV::from_u64(&context, 200, 8);
        assert_eq!(narrow.as_u128(), Some(200));

        let wide = ast::BV::from_u64(&context, 1, 36)
            .concat(&ast::BV::from_u64(&context, 7, 64))
            .simplify();
        assert_eq!(wide.get_size(), 100);
        assert_eq!(wide.as_u128(), Some(1 << 64 | 7));

        let full = ast::BV::from_u64(&context, u64::MAX, 64)
            .concat(&ast::BV::from_u64(&context, u64::MAX, 64))
            .simplify();
        assert_eq!(full.as_u128(), Some(u128::MAX));

        let symbolic = ast::BV::new_const(&context, "b", 80);
        assert_eq!(symbolic.as_u128(), None);
    }
}
