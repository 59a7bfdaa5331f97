use derive_more as dm;

use term::typing::TypeError;

/// Failures of a solver query. Unsatisfiability is not among them.
#[derive(Debug, dm::Display, dm::Error, dm::From)]
pub enum SolverError {
    /// The backend could not decide the query, e.g. because of a timeout.
    #[display("the solver returned unknown: {reason}")]
    Unknown { reason: String },
    #[display("solver backend failure: {reason}")]
    Backend { reason: String },
    /// A construct without an encoding or a decoding rule.
    #[display("unsupported construct: {construct}")]
    Unsupported { construct: String },
    #[display("ill-typed clause: {source}")]
    #[from]
    IllTyped { source: TypeError },
    #[display("invalid solver configuration: {source}")]
    #[from]
    Config { source: config::ConfigError },
}

impl SolverError {
    pub(crate) fn backend(reason: impl ToString) -> Self {
        Self::Backend {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn unsupported(construct: impl ToString) -> Self {
        Self::Unsupported {
            construct: construct.to_string(),
        }
    }
}
