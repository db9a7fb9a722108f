//! Execution pipeline: resolve, instantiate, then setup → test → teardown.
//!
//! ## Phases
//!
//! `Created → SetupRunning → TestRunning → TearDownRunning → Finished`. Setup and teardown are
//! skipped when the fixture declares none. Each phase is recorded as its own scenario and failures
//! are contained per phase:
//!
//! - setup failure: the `[SetUp]` scenario fails, the test body is skipped, teardown still runs
//! - body failure: the open scenario fails (the one named after the method, or a sub-scenario)
//! - teardown failure: the `[TearDown]` scenario fails; earlier failures stay authoritative
//!
//! Resolution and module-load failures end the run before any scenario with their own outcome.
//! Instantiation failure ends it with `ExecutionError` and no scenarios.

pub mod context;
pub mod invoke;

use std::any::Any;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::StringMap;
use crate::binder::{self, ExpressionEvaluator};
use crate::errors::DriverError;
use crate::logging::{LogLevel, RunLog};
use crate::module::loader::{self, ModuleSource};
use crate::module::params::Args;
use crate::module::{FixtureDef, MethodDef};
use crate::result::{ExecutionResult, aggregate};
use context::TestContext;
use invoke::{FailureRecord, invoke};

/// Scenario name of the setup phase.
pub const SETUP_SCENARIO: &str = "[SetUp]";
/// Scenario name of the teardown phase.
pub const TEARDOWN_SCENARIO: &str = "[TearDown]";

/// What the caller asks to run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionRequest {
    pub test_full_name: String,
    pub module: PathBuf,
    pub configs: StringMap,
    pub parameters: StringMap,
}

impl ExecutionRequest {
    pub fn new(test_full_name: impl Into<String>, module: impl Into<PathBuf>) -> Self {
        Self {
            test_full_name: test_full_name.into(),
            module: module.into(),
            ..Self::default()
        }
    }

    pub fn with_configs(mut self, configs: StringMap) -> Self {
        self.configs = configs;
        self
    }

    pub fn with_parameters(mut self, parameters: StringMap) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.configs.insert(key.into(), value.into());
        self
    }

    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    SetupRunning,
    TestRunning,
    TearDownRunning,
    Finished,
}

struct PhaseTracker {
    current: Phase,
}

impl PhaseTracker {
    fn advance(&mut self, next: Phase) {
        tracing::debug!(from = ?self.current, to = ?next, "phase transition");
        self.current = next;
    }
}

/// Runs one request against a module source.
pub struct Pipeline<'a> {
    source: &'a dyn ModuleSource,
    log: &'a dyn RunLog,
    evaluator: &'a dyn ExpressionEvaluator,
}

impl<'a> Pipeline<'a> {
    pub fn new(source: &'a dyn ModuleSource, log: &'a dyn RunLog, evaluator: &'a dyn ExpressionEvaluator) -> Self {
        Self { source, log, evaluator }
    }

    #[tracing::instrument(skip_all, fields(test = %request.test_full_name, module = %request.module.display()))]
    pub fn run(&self, request: &ExecutionRequest) -> ExecutionResult {
        match self.try_run(request) {
            Ok(result) => result,
            Err(err) => {
                self.log.write(LogLevel::Error, &format!("Exception when trying to execute test: {err}"));
                ExecutionResult::from_error(&err)
            }
        }
    }

    fn try_run(&self, request: &ExecutionRequest) -> Result<ExecutionResult, DriverError> {
        let module = loader::load_checked(self.source, &request.module)?;
        let (fixture, method) = module.find_test(&request.test_full_name)?;
        tracing::debug!(fixture = %fixture.full_name(), method = %method.name, "resolved test");

        let mut instance = invoke(&fixture.full_name(), || fixture.instantiate()).map_err(|err| {
            let record = FailureRecord::from_error(&err);
            DriverError::Execution {
                reason: record.reason,
                detail: record.detail,
            }
        })?;

        let mut ctx = TestContext::new(&request.test_full_name, &request.configs, &request.parameters, self.log);
        let elapsed = self.run_phases(fixture, method, &mut *instance, &mut ctx, request);

        let (scenarios, verifications, counters) = ctx.into_parts();
        let mut result = aggregate(scenarios, verifications, counters);
        result.elapsed = Some(elapsed);
        Ok(result)
    }

    fn run_phases(
        &self,
        fixture: &FixtureDef,
        method: &MethodDef,
        instance: &mut dyn Any,
        ctx: &mut TestContext<'_>,
        request: &ExecutionRequest,
    ) -> Duration {
        let started = Instant::now();
        let mut phase = PhaseTracker { current: Phase::Created };
        self.log
            .write(LogLevel::Driver, &format!("{}: Test Execution started", method.name));

        let mut setup_ok = true;
        if let Some(setup) = fixture.setup() {
            phase.advance(Phase::SetupRunning);
            setup_ok = self.run_phase(SETUP_SCENARIO, setup, instance, ctx, &Args::new());
        }

        phase.advance(Phase::TestRunning);
        if setup_ok {
            ctx.scenario(method.name.as_str());
            self.log.write(LogLevel::Driver, "Invoke Test");
            match binder::bind(&method.params, &request.parameters, self.evaluator, self.log) {
                Ok(args) => self.call(method, instance, ctx, &args),
                Err(err) => self.record_failure(ctx, &DriverError::from(err)),
            };
            ctx.finish_scenario();
        } else {
            self.log
                .write(LogLevel::Warning, &format!("Skipping {} because setup failed", method.name));
        }

        if let Some(teardown) = fixture.teardown() {
            phase.advance(Phase::TearDownRunning);
            self.run_phase(TEARDOWN_SCENARIO, teardown, instance, ctx, &Args::new());
        }

        phase.advance(Phase::Finished);
        let elapsed = started.elapsed();
        self.log.write(
            LogLevel::TestApi,
            &format!("Finished execution in {:.3} seconds", elapsed.as_secs_f64()),
        );
        elapsed
    }

    /// Run a setup/teardown method in its own scenario. Returns whether it passed.
    fn run_phase(
        &self,
        scenario: &str,
        method: &MethodDef,
        instance: &mut dyn Any,
        ctx: &mut TestContext<'_>,
        args: &Args,
    ) -> bool {
        ctx.scenario(scenario);
        let passed = self.call(method, instance, ctx, args);
        ctx.finish_scenario();
        passed
    }

    fn call(&self, method: &MethodDef, instance: &mut dyn Any, ctx: &mut TestContext<'_>, args: &Args) -> bool {
        match invoke(&method.name, || method.call(instance, ctx, args)) {
            Ok(()) => true,
            Err(err) => {
                self.record_failure(ctx, &err);
                false
            }
        }
    }

    fn record_failure(&self, ctx: &mut TestContext<'_>, err: &(dyn std::error::Error + 'static)) -> bool {
        let record = FailureRecord::from_error(err);
        self.log.write(
            LogLevel::Error,
            &format!("Exception when trying to execute test: {}", record.reason),
        );
        ctx.mark_failed(record);
        false
    }
}
