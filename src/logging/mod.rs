//! Run log service.
//!
//! The pipeline only sees [`RunLog`]. Behind it, [`Logger`] is a process-scoped service object with
//! an attach/detach lifecycle: a run attaches the sinks its configuration selects, writes through
//! them, and detaches them during cleanup. Every write is also mirrored to `tracing`.

pub mod memory;
pub mod session;
pub mod settings;
pub mod sinks;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

pub use session::LogSession;
pub use settings::{LogBackend, LogSettings};
pub use sinks::{SinkFactory, TracingSink, TracingSinkFactory};

/// Severity / channel of one run-log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Driver,
    TestApi,
    Test,
    Web,
    Warning,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Driver,
        LogLevel::TestApi,
        LogLevel::Test,
        LogLevel::Web,
        LogLevel::Warning,
        LogLevel::Error,
    ];

    pub const fn bit(self) -> u32 {
        match self {
            LogLevel::Driver => 1 << 0,
            LogLevel::TestApi => 1 << 1,
            LogLevel::Test => 1 << 2,
            LogLevel::Web => 1 << 3,
            LogLevel::Warning => 1 << 4,
            LogLevel::Error => 1 << 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Driver => "Driver",
            LogLevel::TestApi => "TestApi",
            LogLevel::Test => "Test",
            LogLevel::Web => "Web",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogLevels(u32);

impl LogLevels {
    pub const NONE: LogLevels = LogLevels(0);

    /// Baseline set used when `__loglevel` is absent or names nothing known.
    pub const DEFAULT: LogLevels = LogLevels(
        LogLevel::Driver.bit() | LogLevel::TestApi.bit() | LogLevel::Test.bit() | LogLevel::Warning.bit() | LogLevel::Error.bit(),
    );

    pub const ALL: LogLevels = LogLevels(0b11_1111);

    /// Levels forwarded to the real-time listener.
    pub const REAL_TIME: LogLevels =
        LogLevels(LogLevel::Driver.bit() | LogLevel::TestApi.bit() | LogLevel::Test.bit() | LogLevel::Web.bit());

    pub const fn contains(self, level: LogLevel) -> bool {
        self.0 & level.bit() != 0
    }

    pub const fn with(self, level: LogLevel) -> LogLevels {
        LogLevels(self.0 | level.bit())
    }

    /// Parse comma-separated level names, case-insensitively.
    ///
    /// Besides the single level names, `Default` and `All` name the predefined sets. Unknown names
    /// are ignored; if nothing known remains the result is [`LogLevels::DEFAULT`].
    pub fn parse(names: &str) -> LogLevels {
        let mut set = LogLevels::NONE;
        for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if name.eq_ignore_ascii_case("default") {
                set.0 |= LogLevels::DEFAULT.0;
            } else if name.eq_ignore_ascii_case("all") {
                set.0 |= LogLevels::ALL.0;
            } else if let Some(level) = LogLevel::ALL.iter().find(|l| l.as_str().eq_ignore_ascii_case(name)) {
                set = set.with(*level);
            }
        }
        if set == LogLevels::NONE { LogLevels::DEFAULT } else { set }
    }
}

impl Default for LogLevels {
    fn default() -> Self {
        LogLevels::DEFAULT
    }
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("logger is already initialized")]
    AlreadyInitialized,

    #[error("invalid value {value:?} for log setting `{key}`")]
    InvalidSetting { key: &'static str, value: String },

    #[error("log sink `{sink}` failed: {reason}")]
    Sink { sink: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Minimal write capability handed to the pipeline and binder.
pub trait RunLog: Send + Sync {
    fn write(&self, level: LogLevel, message: &str);
}

/// A log backend.
pub trait LogSink: Send + Sync {
    fn start(&self) -> Result<(), LogError>;
    fn write(&self, level: LogLevel, message: &str);
    fn end(&self) -> Result<(), LogError>;
}

/// Handle returned by [`Logger::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    levels: LogLevels,
    sink: Arc<dyn LogSink>,
}

/// Process-scoped log service.
pub struct Logger {
    listeners: Mutex<Vec<Listener>>,
    next_id: AtomicU64,
    /// Held by the one [`LogSession`] currently attached.
    claimed: AtomicBool,
}

static GLOBAL: Logger = Logger::new();

impl Logger {
    pub const fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            claimed: AtomicBool::new(false),
        }
    }

    /// The process-wide instance.
    pub fn global() -> &'static Logger {
        &GLOBAL
    }

    /// True while a session holds the logger or any sink is attached.
    pub fn is_initialized(&self) -> bool {
        self.claimed.load(Ordering::Acquire) || !self.lock().is_empty()
    }

    /// Claim the logger for one session. Check and claim happen under the listener lock, so of two
    /// concurrent callers exactly one wins.
    pub(crate) fn try_claim(&self) -> bool {
        let listeners = self.lock();
        listeners.is_empty()
            && self
                .claimed
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
    }

    pub(crate) fn release(&self) {
        self.claimed.store(false, Ordering::Release);
    }

    pub fn attach(&self, levels: LogLevels, sink: Arc<dyn LogSink>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push(Listener { id, levels, sink });
        id
    }

    pub fn detach(&self, id: ListenerId) -> Option<Arc<dyn LogSink>> {
        let mut listeners = self.lock();
        let index = listeners.iter().position(|l| l.id == id)?;
        Some(listeners.remove(index).sink)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Listener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLog for Logger {
    fn write(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error => tracing::error!(target: "testdriver::run", "{message}"),
            LogLevel::Warning => tracing::warn!(target: "testdriver::run", "{message}"),
            _ => tracing::info!(target: "testdriver::run", level = level.as_str(), "{message}"),
        }

        // Deliver outside the lock so a sink may log back through the service.
        let targets: Vec<Arc<dyn LogSink>> = self
            .lock()
            .iter()
            .filter(|l| l.levels.contains(level))
            .map(|l| Arc::clone(&l.sink))
            .collect();
        for sink in targets {
            sink.write(level, message);
        }
    }
}
