//! One run's attachment to the [`Logger`].

use std::sync::Arc;

use super::{ListenerId, LogBackend, LogError, LogLevels, LogSettings, LogSink, Logger, SinkFactory};

/// Sinks attached for the current run. Call [`LogSession::cleanup`] when the run ends; dropping the
/// session without it detaches the sinks and releases the logger without ending them.
pub struct LogSession<'l> {
    logger: &'l Logger,
    attached: Vec<(ListenerId, Arc<dyn LogSink>)>,
}

impl<'l> LogSession<'l> {
    /// Start and attach the configured backend, plus the real-time listener when requested.
    ///
    /// Fails with [`LogError::AlreadyInitialized`] if another session holds the logger or sinks are
    /// attached. On any later failure the sinks attached so far are detached again.
    pub fn initialize(logger: &'l Logger, settings: &LogSettings, factory: &dyn SinkFactory) -> Result<Self, LogError> {
        if !logger.try_claim() {
            return Err(LogError::AlreadyInitialized);
        }

        let mut session = LogSession {
            logger,
            attached: Vec::new(),
        };
        let mut plan = vec![(settings.backend(), settings.levels)];
        if settings.real_time {
            plan.push((LogBackend::RealTime, LogLevels::REAL_TIME));
        }

        for (backend, levels) in plan {
            if let Err(err) = session.attach(factory, &backend, levels) {
                session.detach_all();
                return Err(err);
            }
        }
        Ok(session)
    }

    fn attach(&mut self, factory: &dyn SinkFactory, backend: &LogBackend, levels: LogLevels) -> Result<(), LogError> {
        let sink = factory.create(backend)?;
        sink.start()?;
        let id = self.logger.attach(levels, Arc::clone(&sink));
        self.attached.push((id, sink));
        Ok(())
    }

    fn detach_all(&mut self) {
        for (id, _) in self.attached.drain(..) {
            self.logger.detach(id);
        }
    }

    /// End every sink and detach it. All sinks are detached even if one fails to end; the first
    /// failure is returned.
    pub fn cleanup(mut self) -> Result<(), LogError> {
        let mut first_err = None;
        for (id, sink) in self.attached.drain(..) {
            if let Err(err) = sink.end() {
                first_err.get_or_insert(err);
            }
            self.logger.detach(id);
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl Drop for LogSession<'_> {
    fn drop(&mut self) {
        self.detach_all();
        self.logger.release();
    }
}
