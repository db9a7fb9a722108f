#![forbid(unsafe_code)]
// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
//! testdriver: isolated test discovery and execution.
//!
//! Given a test module and a fully-qualified test name, the driver locates the test through its
//! declarative metadata, runs it inside an isolation boundary that can be torn down independently
//! of the caller, and returns a structured, serialisable outcome. A discovery mode enumerates every
//! test in a module without running anything.
//!
//! ## Layers (leaves first)
//!
//! - [`testdriver_core`] - category mask, metadata resolver, outcome vocabulary, config keys
//! - [`module`] - the registry form of a compiled test module (fixtures, methods, parameters)
//! - [`catalog`] - hierarchical and flat discovery
//! - [`binder`] - string parameter map → typed argument list
//! - [`pipeline`] - setup / test / teardown sequencing with failure isolation
//! - [`result`] - first-failure-wins aggregation and the tabular result form
//! - [`isolation`] - boundary coordinator (thread or child process)
//! - [`driver`] - entry points used by tooling and by the boundary itself
//!
//! ## Panic Policy
//!
//! - **Production code**: `Result` with `?` / `map_err`. Panics raised by fixture code are caught at
//!   the invocation layer and reported as failures.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

// Lets `#[derive(ParamEnum)]` expansions resolve `::testdriver` inside this crate too.
extern crate self as testdriver;

pub mod binder;
pub mod catalog;
pub mod driver;
pub mod errors;
pub mod harness;
pub mod isolation;
pub mod logging;
pub mod module;
pub mod pipeline;
pub mod result;
pub mod version;

/// Caller-supplied string maps (configuration and test parameters). Keys are case-sensitive.
pub type StringMap = std::collections::BTreeMap<String, String>;

pub use testdriver_core::{CategoryMask, ConfigDecl, ErrorCategory, Metadata, RunOutcome, ScenarioOutcome};
pub use testdriver_derive::ParamEnum;

pub use binder::{ExpressionEvaluator, PassThrough};
pub use catalog::{FlatTestEntry, TestArea, TestCase, TestModule};
pub use driver::Driver;
pub use errors::{BoxError, DriverError};
pub use isolation::{IsolationCoordinator, ProcessBoundaryFactory, ThreadBoundaryFactory};
pub use logging::{LogLevel, LogSink, Logger, RunLog};
pub use module::loader::{ModuleRegistry, ModuleSource, SelfModule};
pub use module::params::{ArgValue, Args, Param, ParamEnum, ParamType};
pub use module::{FixtureBuilder, FixtureDef, MethodDecl, MethodDef, MethodKind, ModuleDefinition, Visibility};
pub use pipeline::context::{TestContext, TestFailure};
pub use pipeline::ExecutionRequest;
pub use result::{Counter, ExecutionResult, FlatExecution, ScenarioResult, Verification};
