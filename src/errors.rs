//! Driver error taxonomy.
//!
//! Name-resolution and module-load failures are raised as typed errors so they map onto their own
//! outcome codes. Binding failures are recorded as a failure of the test-body scenario, and a boundary
//! teardown failure is appended to an outcome that already exists.

use thiserror::Error;

use testdriver_core::RunOutcome;

use crate::binder::BindError;
use crate::isolation::IsolationError;

/// Boxed error returned by fixture code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that end an execution or discovery call before (or outside of) the scenario sequence.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Module not found: {path}: {reason}")]
    ModuleNotFound { path: String, reason: String },

    #[error("Test not found: {name}")]
    TestNotFound { name: String },

    #[error(transparent)]
    ParameterBinding(#[from] BindError),

    #[error("{reason}")]
    Execution { reason: String, detail: String },

    /// The boundary did not release cleanly. Appended to an outcome, never the primary reason.
    #[error(transparent)]
    IsolationTeardown(IsolationError),
}

impl DriverError {
    pub fn module_not_found(path: impl Into<String>, reason: impl Into<String>) -> Self {
        DriverError::ModuleNotFound {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn test_not_found(name: impl Into<String>) -> Self {
        DriverError::TestNotFound { name: name.into() }
    }

    /// The run outcome this error is reported as.
    pub fn outcome(&self) -> RunOutcome {
        match self {
            DriverError::ModuleNotFound { .. } => RunOutcome::ModuleNotFound,
            DriverError::TestNotFound { .. } => RunOutcome::TestNotFound,
            DriverError::ParameterBinding(_) | DriverError::Execution { .. } | DriverError::IsolationTeardown(_) => {
                RunOutcome::ExecutionError
            }
        }
    }

    /// Extra context for the error-detail column, empty when there is none.
    pub fn detail(&self) -> String {
        match self {
            DriverError::Execution { detail, .. } => detail.clone(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_are_distinguishable() {
        assert_eq!(
            DriverError::module_not_found("m.bin", "missing").outcome(),
            RunOutcome::ModuleNotFound
        );
        assert_eq!(DriverError::test_not_found("A.b").outcome(), RunOutcome::TestNotFound);
        let exec = DriverError::Execution {
            reason: "boom".into(),
            detail: "at fixture".into(),
        };
        assert_eq!(exec.outcome(), RunOutcome::ExecutionError);
        assert_eq!(exec.to_string(), "boom");
        assert_eq!(exec.detail(), "at fixture");
    }

    #[test]
    fn binding_and_teardown_failures_are_execution_errors() {
        let bind = DriverError::from(BindError::Coercion {
            name: "x".into(),
            value: "four".into(),
            target: "int32",
        });
        assert_eq!(bind.outcome(), RunOutcome::ExecutionError);
        assert!(bind.to_string().contains("four"));

        let teardown = DriverError::IsolationTeardown(IsolationError::Crashed("stuck".into()));
        assert_eq!(teardown.outcome(), RunOutcome::ExecutionError);
        assert_eq!(teardown.to_string(), "boundary crashed: stuck");
    }
}
