//! Execution pipeline through the in-process driver.

mod common;

use common::{MISSING_MODULE, MODULE, driver};
use testdriver::{ErrorCategory, ExecutionRequest, RunOutcome, ScenarioOutcome};

fn run(name: &str) -> testdriver::ExecutionResult {
    driver().execute(&ExecutionRequest::new(name, MODULE))
}

#[test]
fn setup_test_teardown_in_order() {
    let result = driver().execute(&ExecutionRequest::new("Suite.Alpha.DoesMath", MODULE).parameter("x", "4"));

    assert_eq!(result.outcome, RunOutcome::Pass, "{}", result.failure_reason);
    let names: Vec<&str> = result.scenarios.iter().map(|s| s.description.as_str()).collect();
    assert_eq!(names, vec!["[SetUp]", "DoesMath", "[TearDown]"]);
    assert!(result.scenarios.iter().all(|s| s.outcome == ScenarioOutcome::Pass));
    assert_eq!(result.verifications.len(), 2);
    assert_eq!(result.counters[0].value, 4.0);
    assert!(result.elapsed.is_some());
}

#[test]
fn name_matching_is_case_insensitive() {
    let result = driver().execute(&ExecutionRequest::new("suite.alpha.doesmath", MODULE).parameter("x", "4"));
    assert_eq!(result.outcome, RunOutcome::Pass);
    assert_eq!(result.scenarios[1].description, "DoesMath");
}

#[test]
fn failed_verification_fails_the_body_scenario() {
    let result = driver().execute(&ExecutionRequest::new("Suite.Alpha.DoesMath", MODULE).parameter("x", "5"));
    assert_eq!(result.outcome, RunOutcome::ExecutionError);
    assert_eq!(result.failure_reason, "Verification failed: two plus two");
    assert_eq!(result.scenarios[1].outcome, ScenarioOutcome::Fail);
    assert_eq!(result.scenarios[2].outcome, ScenarioOutcome::Pass);
}

#[test]
fn setup_failure_skips_body_but_teardown_runs() {
    let result = run("Suite.Broken.Body");
    let names: Vec<&str> = result.scenarios.iter().map(|s| s.description.as_str()).collect();
    assert_eq!(names, vec!["[SetUp]", "[TearDown]"]);

    assert_eq!(result.outcome, RunOutcome::ExecutionError);
    assert_eq!(result.failure_reason, "lab is offline");
    assert_eq!(result.error_category, ErrorCategory::Environment);
    assert_eq!(result.error_detail, "ping timed out");

    // The teardown keeps its own reason; it does not overwrite the setup failure.
    assert_eq!(result.scenarios[1].outcome, ScenarioOutcome::Fail);
    assert_eq!(result.scenarios[1].failure_reason, "teardown also failed");
}

#[test]
fn instantiation_failure_has_no_scenarios() {
    let result = run("Suite.Broken.Anything");
    assert_eq!(result.outcome, RunOutcome::ExecutionError);
    assert!(result.scenarios.is_empty());
    assert_eq!(result.failure_reason, "constructor refused");
}

#[test]
fn first_failing_sub_scenario_wins() {
    let result = run("Suite.Alpha.Multi");
    let names: Vec<&str> = result.scenarios.iter().map(|s| s.description.as_str()).collect();
    assert_eq!(names, vec!["Multi", "first step", "second step"]);
    assert_eq!(result.failure_reason, "first problem");
    assert_eq!(result.error_category, ErrorCategory::Product);
    assert_eq!(result.scenarios[2].failure_reason, "second problem");
}

#[test]
fn panics_are_reported_as_failures() {
    let result = run("Suite.Panic.Boom");
    assert_eq!(result.outcome, RunOutcome::ExecutionError);
    assert_eq!(result.failure_reason, "gamma exploded");
}

#[test]
fn invocation_wrappers_are_unwrapped() {
    let result = run("Suite.Panic.Nested");
    assert_eq!(result.failure_reason, "deep cause");
    assert!(!result.failure_reason.contains("invocation of"));
}

#[test]
fn bad_scalar_fails_the_body_only() {
    let result = driver().execute(&ExecutionRequest::new("Suite.Alpha.DoesMath", MODULE).parameter("x", "four"));
    assert_eq!(result.outcome, RunOutcome::ExecutionError);
    assert!(result.failure_reason.contains("int32"), "{}", result.failure_reason);
    assert_eq!(result.scenarios.len(), 3);
    assert_eq!(result.scenarios[2].outcome, ScenarioOutcome::Pass);
}

#[test]
fn missing_parameter_binds_null() {
    let result = run("Suite.Alpha.DoesMath");
    assert_eq!(result.failure_reason, "x was not bound");
}

#[test]
fn resolution_failures_have_their_own_outcomes() {
    assert_eq!(run("Suite.Alpha.Missing").outcome, RunOutcome::TestNotFound);
    assert_eq!(run("NoNamespace").outcome, RunOutcome::TestNotFound);
    // The class name is not part of the test name.
    assert_eq!(run("Suite.Alpha.AlphaTests.DoesMath").outcome, RunOutcome::TestNotFound);
    // Tests at the root namespace are discoverable but not resolvable.
    assert_eq!(run("Rootless.Orphan").outcome, RunOutcome::TestNotFound);

    let missing = driver().execute(&ExecutionRequest::new("Suite.Alpha.DoesMath", MISSING_MODULE));
    assert_eq!(missing.outcome, RunOutcome::ModuleNotFound);
    assert!(!missing.failure_reason.is_empty());
}

#[test]
fn flat_form_has_one_row_per_scenario() {
    let flat = driver().execute_flat(&ExecutionRequest::new("Suite.Broken.Body", MODULE));
    assert_eq!(flat.scenarios.len(), 2);
    assert_eq!(flat.scenarios[0][0], "[SetUp]");
    assert_eq!(flat.scenarios[0][1], "Fail");
    assert_eq!(flat.scenarios[0][2], "lab is offline");
    assert_eq!(flat.outcome, RunOutcome::ExecutionError);
    assert_eq!(flat.error_category, ErrorCategory::Environment);
}
