use thiserror::Error;

/// Failures the optimizer reports to its caller.
///
/// Running out of bars that can usefully be cut is not an error; the planner
/// stops and reports the unsatisfied pieces as leftover inventory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CutError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("solver failure ({backend}): {detail}")]
    SolverFailure {
        backend: &'static str,
        detail: String,
    },
}

impl CutError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        CutError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn solver(backend: &'static str, detail: impl Into<String>) -> Self {
        CutError::SolverFailure {
            backend,
            detail: detail.into(),
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, CutError::InvalidInput { .. })
    }
}
