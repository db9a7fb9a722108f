//! Execution results and first-failure-wins aggregation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use testdriver_core::{ErrorCategory, RunOutcome, ScenarioOutcome};

use crate::errors::DriverError;

/// One recorded scenario (a pipeline phase or a sub-scenario declared by the test body).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub description: String,
    pub outcome: ScenarioOutcome,
    pub failure_reason: String,
    pub failure_detail: String,
    pub error_category: ErrorCategory,
    pub error_detail: String,
}

impl ScenarioResult {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            outcome: ScenarioOutcome::Pass,
            failure_reason: String::new(),
            failure_detail: String::new(),
            error_category: ErrorCategory::default(),
            error_detail: String::new(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.outcome.is_failure()
    }

    /// `[description, outcome, reason, detail]`.
    pub fn to_row(&self) -> [String; 4] {
        [
            self.description.clone(),
            self.outcome.as_str().to_string(),
            self.failure_reason.clone(),
            self.failure_detail.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub description: String,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub name: String,
    pub value: f64,
}

/// Result of one execution request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub outcome: RunOutcome,
    pub failure_reason: String,
    pub error_category: ErrorCategory,
    pub error_detail: String,
    pub scenarios: Vec<ScenarioResult>,
    pub verifications: Vec<Verification>,
    pub counters: Vec<Counter>,
    pub elapsed: Option<Duration>,
}

impl ExecutionResult {
    /// Result for an error that ended the run before any scenario was recorded.
    pub fn from_error(err: &DriverError) -> Self {
        Self {
            outcome: err.outcome(),
            failure_reason: err.to_string(),
            error_detail: err.detail(),
            ..Self::default()
        }
    }

    pub fn is_pass(&self) -> bool {
        self.outcome.is_pass()
    }

    pub fn rows(&self) -> Vec<[String; 4]> {
        self.scenarios.iter().map(ScenarioResult::to_row).collect()
    }

    pub fn to_flat(&self) -> FlatExecution {
        FlatExecution {
            scenarios: self.rows(),
            failure_reason: self.failure_reason.clone(),
            outcome: self.outcome,
            error_category: self.error_category,
            error_detail: self.error_detail.clone(),
        }
    }
}

/// Fold scenarios into a result. The earliest failing scenario sets outcome, reason, category and
/// detail; later failures never overwrite them.
pub fn aggregate(scenarios: Vec<ScenarioResult>, verifications: Vec<Verification>, counters: Vec<Counter>) -> ExecutionResult {
    let mut result = ExecutionResult::default();
    if let Some(first) = scenarios.iter().find(|s| s.is_failure()) {
        result.outcome = RunOutcome::ExecutionError;
        result.failure_reason = first.failure_reason.clone();
        result.error_category = first.error_category;
        result.error_detail = first.error_detail.clone();
    }
    result.scenarios = scenarios;
    result.verifications = verifications;
    result.counters = counters;
    result
}

/// Tabular result form: the outbound packet of the isolation boundary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlatExecution {
    pub scenarios: Vec<[String; 4]>,
    pub failure_reason: String,
    pub outcome: RunOutcome,
    pub error_category: ErrorCategory,
    pub error_detail: String,
}

impl FlatExecution {
    /// Packet for a run that never produced scenarios.
    pub fn failed(outcome: RunOutcome, failure_reason: impl Into<String>) -> Self {
        Self {
            outcome,
            failure_reason: failure_reason.into(),
            ..Self::default()
        }
    }

    /// Append a teardown failure to the reason without replacing what is already there.
    pub fn append_teardown_failure(&mut self, err: &DriverError) {
        self.failure_reason
            .push_str(&format!("\n=== isolation teardown failed ===\n{err}"));
        if self.outcome.is_pass() {
            self.outcome = err.outcome();
        }
    }
}
