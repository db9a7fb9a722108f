//! Isolation coordinator.
//!
//! Every call creates exactly one boundary scoped to the module's directory, writes the inbound
//! slots, sends a zero-argument signal, reads the outbound slots and tears the boundary down. The
//! teardown happens on every exit path through [`BoundaryGuard`]; a teardown failure is appended to
//! the failure reason instead of replacing it.

pub mod boundary;
pub mod process;
pub mod slots;
pub mod thread;

use std::path::Path;

use thiserror::Error;

use testdriver_core::RunOutcome;

use crate::catalog::TestArea;
use crate::driver::Driver;
use crate::errors::DriverError;
use crate::pipeline::ExecutionRequest;
use crate::result::FlatExecution;
pub use boundary::{Boundary, BoundaryFactory};
pub use process::{ProcessBoundary, ProcessBoundaryFactory};
use slots::{SlotMap, SlotValue};
pub use thread::{ThreadBoundary, ThreadBoundaryFactory};

/// Signal sent into a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EntryPoint {
    Execute,
    List,
}

impl EntryPoint {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryPoint::Execute => "execute",
            EntryPoint::List => "list",
        }
    }
}

#[derive(Debug, Error)]
pub enum IsolationError {
    #[error("failed to start boundary process `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("boundary crashed: {0}")]
    Crashed(String),

    #[error("boundary `{name}` has been torn down")]
    Unloaded { name: String },

    #[error("boundary slot `{0}` is missing")]
    MissingSlot(&'static str),

    #[error("boundary slot `{key}` holds an unexpected value {value:?}")]
    BadSlot { key: &'static str, value: String },

    #[error("boundary protocol error: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IsolationError {
    /// The run outcome a coordinator reports for this error. A module binary that is missing or
    /// cannot be read or executed is reported as not found.
    pub fn outcome(&self) -> RunOutcome {
        use std::io::ErrorKind;

        match self {
            IsolationError::Spawn { source, .. }
                if matches!(
                    source.kind(),
                    ErrorKind::NotFound
                        | ErrorKind::PermissionDenied
                        | ErrorKind::IsADirectory
                        | ErrorKind::NotADirectory
                ) =>
            {
                RunOutcome::ModuleNotFound
            }
            _ => RunOutcome::ExecutionError,
        }
    }
}

/// Boundary-side dispatch: run `entry` against `inbound` and produce the outbound slots.
pub fn run_entry(entry: EntryPoint, inbound: &SlotMap, driver: &Driver) -> SlotMap {
    match entry {
        EntryPoint::Execute => {
            let flat = match slots::request_from(inbound) {
                Ok(request) => driver.execute_flat(&request),
                Err(err) => FlatExecution::failed(RunOutcome::ExecutionError, err.to_string()),
            };
            slots::execution_outbound(&flat)
        }
        EntryPoint::List => {
            let mut outbound = SlotMap::new();
            if let Some(area) = inbound.text(slots::MODULE_PATH).and_then(|path| driver.list(Path::new(path))) {
                outbound.set(slots::CATALOG, SlotValue::Catalog(area));
            }
            outbound
        }
    }
}

/// Tears the boundary down when released or dropped, whichever comes first.
struct BoundaryGuard {
    boundary: Box<dyn Boundary>,
    released: bool,
}

impl BoundaryGuard {
    fn new(boundary: Box<dyn Boundary>) -> Self {
        Self {
            boundary,
            released: false,
        }
    }

    fn boundary(&mut self) -> &mut dyn Boundary {
        &mut *self.boundary
    }

    fn release(mut self) -> Result<(), IsolationError> {
        self.released = true;
        self.boundary.teardown()
    }
}

impl Drop for BoundaryGuard {
    fn drop(&mut self) {
        if !self.released {
            if let Err(err) = self.boundary.teardown() {
                tracing::warn!(boundary = %self.boundary.name(), error = %err, "boundary teardown failed");
            }
        }
    }
}

pub struct IsolationCoordinator<F> {
    factory: F,
}

impl<F: BoundaryFactory> IsolationCoordinator<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Run one request inside a fresh boundary. Never fails: every problem becomes part of the packet.
    #[tracing::instrument(skip_all, fields(test = %request.test_full_name))]
    pub fn run_isolated(&self, request: &ExecutionRequest) -> FlatExecution {
        let mut guard = match self.acquire(&request.module) {
            Ok(guard) => guard,
            Err(err) => {
                tracing::error!(error = %err, "failed to create isolation boundary");
                return FlatExecution::failed(err.outcome(), err.to_string());
            }
        };

        let mut packet = match execute_in(guard.boundary(), request) {
            Ok(packet) => packet,
            Err(err) => {
                tracing::error!(error = %err, "isolated execution failed");
                FlatExecution::failed(err.outcome(), err.to_string())
            }
        };

        if let Err(err) = guard.release() {
            tracing::warn!(error = %err, "boundary teardown failed");
            packet.append_teardown_failure(&DriverError::IsolationTeardown(err));
        }
        packet
    }

    /// Build the catalog inside a fresh boundary. `None` on any failure.
    #[tracing::instrument(skip_all, fields(module = %path.display()))]
    pub fn list_isolated(&self, path: &Path) -> Option<TestArea> {
        let mut guard = match self.acquire(path) {
            Ok(guard) => guard,
            Err(err) => {
                tracing::warn!(error = %err, "failed to create isolation boundary");
                return None;
            }
        };

        let listed = list_in(guard.boundary(), path);
        if let Err(err) = guard.release() {
            tracing::warn!(error = %err, "boundary teardown failed");
        }
        match listed {
            Ok(area) => area,
            Err(err) => {
                tracing::warn!(error = %err, "isolated discovery failed");
                None
            }
        }
    }

    fn acquire(&self, module: &Path) -> Result<BoundaryGuard, IsolationError> {
        let base_dir = module
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = format!(
            "{}-boundary",
            module.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
        );
        Ok(BoundaryGuard::new(self.factory.create(base_dir, &name)?))
    }
}

fn execute_in(boundary: &mut dyn Boundary, request: &ExecutionRequest) -> Result<FlatExecution, IsolationError> {
    for (key, value) in slots::execute_inbound(request).iter() {
        boundary.set_data(key, value.clone())?;
    }
    boundary.invoke(EntryPoint::Execute)?;

    let mut outbound = SlotMap::new();
    for key in slots::EXECUTE_OUTBOUND {
        if let Some(value) = boundary.get_data(key)? {
            outbound.set(key, value);
        }
    }
    slots::execution_from(&outbound)
}

fn list_in(boundary: &mut dyn Boundary, path: &Path) -> Result<Option<TestArea>, IsolationError> {
    boundary.set_data(slots::MODULE_PATH, SlotValue::Text(path.display().to_string()))?;
    boundary.invoke(EntryPoint::List)?;
    match boundary.get_data(slots::CATALOG)? {
        Some(SlotValue::Catalog(area)) => Ok(Some(area)),
        _ => Ok(None),
    }
}
