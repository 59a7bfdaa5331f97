pub mod backend;
pub mod config;
mod error;

pub use crate::backend::z3::Z3Solver;
pub use crate::error::SolverError;
pub use crate::solver::{InterpolatingSolver, Solver};
pub use term::Assignment;
pub use itertools::Either;

pub mod solver {
    use term::{Assignment, Term, TermRef};
    use itertools::Either;

    use crate::SolverError;

    /// Core solver trait that all backend implementations must provide.
    ///
    /// Every clause and assumption must be a well-typed boolean term without
    /// holes. Unsatisfiability is an ordinary answer; errors are reserved for
    /// queries the backend cannot handle.
    pub trait Solver {
        /// Checks the conjunction of `clauses`. A model maps every variable
        /// that occurs in the clauses to a value of its type.
        fn get_model(&mut self, clauses: &[TermRef]) -> Result<Option<Assignment>, SolverError>;

        /// Checks `clauses` under `assumptions`. If unsatisfiable, returns the
        /// assumptions that take part in the conflict, in their original
        /// order. The core is not necessarily minimal.
        fn get_model_or_core(
            &mut self,
            clauses: &[TermRef],
            assumptions: &[TermRef],
        ) -> Result<Either<Assignment, Vec<TermRef>>, SolverError>;
    }

    pub trait InterpolatingSolver: Solver {
        /// Checks `left` together with `right`. If unsatisfiable, returns a
        /// formula over their shared variables that `left` implies and that
        /// contradicts `right`.
        fn get_model_or_interpolant(
            &mut self,
            left: &[TermRef],
            right: &[TermRef],
        ) -> Result<Either<Assignment, Term>, SolverError>;
    }
}
