//! In-memory log targets, handy for embedding and for tests.

use std::sync::{Mutex, PoisonError};

use super::{LogError, LogLevel, LogSink, RunLog};

/// A [`RunLog`] that records every line.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLog {
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl RunLog for MemoryLog {
    fn write(&self, level: LogLevel, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}

/// A [`LogSink`] that records its lifecycle and every line delivered to it.
#[derive(Debug, Default)]
pub struct MemorySink {
    state: Mutex<SinkState>,
}

#[derive(Debug, Default, Clone)]
struct SinkState {
    started: usize,
    ended: usize,
    messages: Vec<String>,
}

impl MemorySink {
    pub fn messages(&self) -> Vec<String> {
        self.state().messages.clone()
    }

    pub fn started(&self) -> usize {
        self.state().started
    }

    pub fn ended(&self) -> usize {
        self.state().ended
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for MemorySink {
    fn start(&self) -> Result<(), LogError> {
        self.state().started += 1;
        Ok(())
    }

    fn write(&self, _level: LogLevel, message: &str) {
        self.state().messages.push(message.to_string());
    }

    fn end(&self) -> Result<(), LogError> {
        self.state().ended += 1;
        Ok(())
    }
}
