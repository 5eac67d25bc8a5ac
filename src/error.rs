//! Application error taxonomy.
//!
//! Every stage of a run reports failures through [`AppError`]. The variants are
//! deliberately coarse: callers branch on the *kind* of failure (could not reach
//! the data, no data, fit did not converge, ...), while the payload carries the
//! human-readable detail.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Invalid flags or environment configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The data source could not be reached or opened.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The data source was reached but reading from it failed.
    #[error("Query error: {0}")]
    Query(String),

    /// The query succeeded but returned zero defect rows.
    #[error("No historical defects found")]
    EmptyDataset,

    /// The bounded least-squares fit could not produce a solution.
    #[error("{0}")]
    FitConvergence(String),

    /// The chart artifact could not be written.
    #[error("Render error: {0}")]
    Render(String),
}

impl AppError {
    /// Process exit code for this failure.
    ///
    /// Empty datasets and failed fits are expected outcomes of a batch run and
    /// therefore map to success.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::EmptyDataset | AppError::FitConvergence(_) => 0,
            AppError::Config(_) => 2,
            AppError::Connection(_) | AppError::Query(_) => 3,
            AppError::Render(_) => 4,
        }
    }

    /// `true` for failures a run recovers from and still completes normally.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::EmptyDataset | AppError::FitConvergence(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_kinds_exit_cleanly() {
        assert_eq!(AppError::EmptyDataset.exit_code(), 0);
        assert_eq!(AppError::FitConvergence("x".into()).exit_code(), 0);
        assert!(AppError::EmptyDataset.is_recoverable());
        assert!(!AppError::Connection("down".into()).is_recoverable());
        assert_eq!(AppError::Connection("down".into()).exit_code(), 3);
        assert_eq!(AppError::Render("disk".into()).exit_code(), 4);
    }
}
