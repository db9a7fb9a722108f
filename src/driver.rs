//! Entry points for tooling and for the boundary side of the isolation protocol.
//!
//! Discovery never raises: failures are logged and reported as `None`. Execution never raises
//! either: every failure ends up in the returned result.

use std::path::Path;
use std::sync::Arc;

use crate::binder::{ExpressionEvaluator, PassThrough};
use crate::catalog::{FlatTestEntry, TestArea, TestModule, flat_list};
use crate::logging::{LogLevel, LogSession, LogSettings, Logger, RunLog, SinkFactory, TracingSinkFactory};
use crate::module::loader::ModuleSource;
use crate::pipeline::{ExecutionRequest, Pipeline};
use crate::result::{ExecutionResult, FlatExecution};
use crate::version::DRIVER_VERSION;

#[derive(Clone)]
pub struct Driver {
    source: Arc<dyn ModuleSource>,
    logger: &'static Logger,
    sinks: Arc<dyn SinkFactory>,
    evaluator: Arc<dyn ExpressionEvaluator>,
}

impl Driver {
    /// Driver over `source` using the process-wide logger, tracing sinks and no expression evaluation.
    pub fn new(source: Arc<dyn ModuleSource>) -> Self {
        Self {
            source,
            logger: Logger::global(),
            sinks: Arc::new(TracingSinkFactory),
            evaluator: Arc::new(PassThrough),
        }
    }

    pub fn with_logger(mut self, logger: &'static Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_sink_factory(mut self, sinks: Arc<dyn SinkFactory>) -> Self {
        self.sinks = sinks;
        self
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn logger(&self) -> &'static Logger {
        self.logger
    }

    /// Hierarchical catalog of the module at `path`.
    pub fn list(&self, path: &Path) -> Option<TestArea> {
        match TestModule::build(self.source.as_ref(), path) {
            Ok(module) => Some(module.root),
            Err(err) => {
                tracing::warn!(module = %path.display(), error = %err, "test discovery failed");
                None
            }
        }
    }

    pub fn flat_list(&self, path: &Path) -> Option<Vec<FlatTestEntry>> {
        match flat_list(self.source.as_ref(), path) {
            Ok(entries) => Some(entries),
            Err(err) => {
                tracing::warn!(module = %path.display(), error = %err, "flat test listing failed");
                None
            }
        }
    }

    /// Run one test and return the full result.
    pub fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        let session = self.open_log(request);
        self.announce(request);

        let result = Pipeline::new(self.source.as_ref(), self.logger, self.evaluator.as_ref()).run(request);
        self.logger.write(
            LogLevel::Driver,
            &format!("{} finished: {}", request.test_full_name, result.outcome),
        );

        if let Some(session) = session {
            if let Err(err) = session.cleanup() {
                tracing::warn!(error = %err, "log cleanup failed");
            }
        }
        result
    }

    /// Run one test and return the tabular form.
    pub fn execute_flat(&self, request: &ExecutionRequest) -> FlatExecution {
        self.execute(request).to_flat()
    }

    fn open_log(&self, request: &ExecutionRequest) -> Option<LogSession<'static>> {
        let opened = LogSettings::from_config(&request.configs)
            .and_then(|settings| LogSession::initialize(self.logger, &settings, self.sinks.as_ref()));
        match opened {
            Ok(session) => Some(session),
            Err(err) => {
                tracing::warn!(error = %err, "log initialization failed, continuing without run log sinks");
                None
            }
        }
    }

    fn announce(&self, request: &ExecutionRequest) {
        let user = env_first(&["USER", "USERNAME"]);
        let host = env_first(&["HOSTNAME", "COMPUTERNAME"]);
        self.logger
            .write(LogLevel::Driver, &format!("Runner: {user} on {host}"));
        self.logger
            .write(LogLevel::Driver, &format!("Test: {}", request.test_full_name));
        self.logger
            .write(LogLevel::Driver, &format!("Module: {}", request.module.display()));
        self.logger
            .write(LogLevel::Driver, &format!("Driver version: {DRIVER_VERSION}"));
    }
}

fn env_first(keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}
