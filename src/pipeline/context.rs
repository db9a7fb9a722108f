//! The scenario recorder handed to fixture methods.

use thiserror::Error;

use testdriver_core::{ErrorCategory, ScenarioOutcome};

use crate::StringMap;
use crate::logging::{LogLevel, RunLog};
use crate::pipeline::invoke::FailureRecord;
use crate::result::{Counter, ScenarioResult, Verification};

/// A categorized failure fixture code may return (or pass to [`TestContext::fail`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TestFailure {
    pub message: String,
    pub category: ErrorCategory,
    pub detail: String,
}

impl TestFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category: ErrorCategory::Unresolved,
            detail: String::new(),
        }
    }

    pub fn with_category(mut self, category: ErrorCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }
}

/// Per-execution recorder. Scenarios are kept in the order they were opened.
pub struct TestContext<'a> {
    test_name: &'a str,
    configs: &'a StringMap,
    parameters: &'a StringMap,
    log: &'a dyn RunLog,
    scenarios: Vec<ScenarioResult>,
    open: Option<ScenarioResult>,
    verifications: Vec<Verification>,
    counters: Vec<Counter>,
}

impl<'a> TestContext<'a> {
    pub fn new(test_name: &'a str, configs: &'a StringMap, parameters: &'a StringMap, log: &'a dyn RunLog) -> Self {
        Self {
            test_name,
            configs,
            parameters,
            log,
            scenarios: Vec::new(),
            open: None,
            verifications: Vec::new(),
            counters: Vec::new(),
        }
    }

    pub fn test_name(&self) -> &str {
        self.test_name
    }

    pub fn config(&self, key: &str) -> Option<&str> {
        self.configs.get(key).map(String::as_str)
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// Finish the open scenario and start a new one.
    pub fn scenario(&mut self, description: impl Into<String>) {
        self.finish_scenario();
        let description = description.into();
        self.log.write(LogLevel::TestApi, &format!("Scenario: {description}"));
        self.open = Some(ScenarioResult::new(description));
    }

    /// Record a check. A failed check marks the open scenario failed but does not stop the body.
    pub fn verify(&mut self, description: impl Into<String>, passed: bool) -> bool {
        let description = description.into();
        if !passed {
            self.log.write(LogLevel::Error, &format!("Verification failed: {description}"));
            self.mark_failed(FailureRecord {
                reason: format!("Verification failed: {description}"),
                detail: String::new(),
                category: ErrorCategory::Unresolved,
                error_detail: String::new(),
            });
        }
        self.verifications.push(Verification { description, passed });
        passed
    }

    pub fn counter(&mut self, name: impl Into<String>, value: f64) {
        self.counters.push(Counter {
            name: name.into(),
            value,
        });
    }

    /// Mark the open scenario failed without returning from the body.
    pub fn fail(&mut self, failure: TestFailure) {
        self.log.write(LogLevel::Error, &failure.message);
        self.mark_failed(FailureRecord {
            reason: failure.message,
            detail: String::new(),
            category: failure.category,
            error_detail: failure.detail,
        });
    }

    pub fn log(&self, message: &str) {
        self.log.write(LogLevel::Test, message);
    }

    /// Record a failure on the open scenario. The first failure of a scenario is kept.
    pub(crate) fn mark_failed(&mut self, record: FailureRecord) {
        let test_name = self.test_name;
        let scenario = self.open.get_or_insert_with(|| ScenarioResult::new(test_name));
        if scenario.is_failure() {
            return;
        }
        scenario.outcome = ScenarioOutcome::Fail;
        scenario.failure_reason = record.reason;
        scenario.failure_detail = record.detail;
        scenario.error_category = record.category;
        scenario.error_detail = record.error_detail;
    }

    pub(crate) fn finish_scenario(&mut self) {
        if let Some(done) = self.open.take() {
            self.scenarios.push(done);
        }
    }

    pub(crate) fn into_parts(mut self) -> (Vec<ScenarioResult>, Vec<Verification>, Vec<Counter>) {
        self.finish_scenario();
        (self.scenarios, self.verifications, self.counters)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::memory::MemoryLog;

    #[test]
    fn scenarios_close_in_order_and_keep_first_failure() {
        let log = MemoryLog::default();
        let (configs, params) = (StringMap::new(), StringMap::new());
        let mut ctx = TestContext::new("T", &configs, &params, &log);

        ctx.scenario("one");
        assert!(ctx.verify("fine", true));
        ctx.scenario("two");
        assert!(!ctx.verify("broken", false));
        ctx.fail(TestFailure::new("later").with_category(ErrorCategory::Product));
        ctx.counter("ms", 12.0);

        let (scenarios, verifications, counters) = ctx.into_parts();
        assert_eq!(scenarios.len(), 2);
        assert!(!scenarios[0].is_failure());
        assert_eq!(scenarios[1].failure_reason, "Verification failed: broken");
        assert_eq!(scenarios[1].error_category, ErrorCategory::Unresolved);
        assert_eq!(verifications.len(), 2);
        assert_eq!(counters[0].value, 12.0);
    }

    #[test]
    fn failure_without_open_scenario_opens_one_named_after_the_test() {
        let log = MemoryLog::default();
        let (configs, params) = (StringMap::new(), StringMap::new());
        let mut ctx = TestContext::new("Suite.Case", &configs, &params, &log);
        ctx.fail(TestFailure::new("no scenario yet"));
        let (scenarios, _, _) = ctx.into_parts();
        assert_eq!(scenarios[0].description, "Suite.Case");
        assert!(scenarios[0].is_failure());
    }

    #[test]
    fn exposes_maps_and_logs_at_test_level() {
        let log = MemoryLog::default();
        let configs: StringMap = [("env".to_string(), "lab".to_string())].into_iter().collect();
        let params = StringMap::new();
        let ctx = TestContext::new("T", &configs, &params, &log);
        assert_eq!(ctx.config("env"), Some("lab"));
        assert_eq!(ctx.parameter("env"), None);
        ctx.log("hi");
        assert_eq!(log.lines(), vec![(LogLevel::Test, "hi".to_string())]);
    }
}
