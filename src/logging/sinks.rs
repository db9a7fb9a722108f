//! Sink construction per backend.

use std::sync::Arc;

use super::{LogBackend, LogError, LogLevel, LogSink};

/// Builds the sink for one backend.
pub trait SinkFactory: Send + Sync {
    fn create(&self, backend: &LogBackend) -> Result<Arc<dyn LogSink>, LogError>;
}

/// Default factory: every backend becomes a [`TracingSink`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSinkFactory;

impl SinkFactory for TracingSinkFactory {
    fn create(&self, backend: &LogBackend) -> Result<Arc<dyn LogSink>, LogError> {
        Ok(Arc::new(TracingSink::new(backend.clone())))
    }
}

/// Forwards run-log lines to `tracing`, tagged with the backend they were meant for.
#[derive(Debug, Clone)]
pub struct TracingSink {
    backend: LogBackend,
}

impl TracingSink {
    pub fn new(backend: LogBackend) -> Self {
        Self { backend }
    }
}

impl LogSink for TracingSink {
    fn start(&self) -> Result<(), LogError> {
        tracing::debug!(sink = self.backend.label(), backend = ?self.backend, "log sink started");
        Ok(())
    }

    fn write(&self, level: LogLevel, message: &str) {
        tracing::trace!(sink = self.backend.label(), level = level.as_str(), "{message}");
    }

    fn end(&self) -> Result<(), LogError> {
        tracing::debug!(sink = self.backend.label(), "log sink ended");
        Ok(())
    }
}
