//! Leveled logger capability.
//!
//! A [`Logger`] is a threshold plus a [`LogSink`]. It is handed to the
//! resolver at construction instead of being read from process-global state,
//! so tests can inject a [`MemorySink`] and production code forwards to
//! `tracing` through [`TracingSink`].
//!
//! Every message passes through one gate, [`Logger::write`], which drops it
//! unless its level is at or above the configured threshold.

use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable read by [`Logger::from_env`].
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// `tracing` target used by [`TracingSink`].
pub const LOG_TARGET: &str = "busybee";

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

/// Log severity, ordered by threshold value.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    /// Numeric threshold: `DEBUG = 0` through `ERROR = 3`.
    pub fn threshold(self) -> u8 {
        self as u8
    }

    /// Upper-case name, as written in configuration and log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Returns `true` if `value` names a level, ignoring case.
    pub fn is_log_level(value: &str) -> bool {
        value.parse::<LogLevel>().is_ok()
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that does not name a [`LogLevel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level '{0}' (expected DEBUG, INFO, WARN or ERROR)")]
pub struct UnknownLogLevel(pub String);

impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(UnknownLogLevel(s.to_owned())),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = UnknownLogLevel;

    fn try_from(value: String) -> Result<Self, UnknownLogLevel> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Destination for messages that passed the level gate.
pub trait LogSink: Send + Sync {
    fn emit(&self, level: LogLevel, message: &str);
}

/// Forwards to `tracing` events under the [`LOG_TARGET`] target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(target: LOG_TARGET, "{message}"),
            LogLevel::Info => tracing::info!(target: LOG_TARGET, "{message}"),
            LogLevel::Warn => tracing::warn!(target: LOG_TARGET, "{message}"),
            LogLevel::Error => tracing::error!(target: LOG_TARGET, "{message}"),
        }
    }
}

/// Keeps every emitted message in memory.
///
/// For callers that want to inspect or forward log output themselves, and
/// for asserting on log output in tests. Grows without bound.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemorySink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of `(level, message)` pairs in emission order.
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages emitted at exactly `level`.
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, level: LogLevel, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_owned()));
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Threshold-gated logger handle. Cheap to clone.
#[derive(Clone)]
pub struct Logger {
    threshold: LogLevel,
    sink: Arc<dyn LogSink>,
}

impl Logger {
    /// Creates a logger writing to `sink` at or above `threshold`.
    pub fn new(threshold: LogLevel, sink: Arc<dyn LogSink>) -> Self {
        Self { threshold, sink }
    }

    /// A [`TracingSink`] logger at `threshold`.
    pub fn tracing(threshold: LogLevel) -> Self {
        Self::new(threshold, Arc::new(TracingSink))
    }

    /// A [`TracingSink`] logger whose threshold comes from `LOG_LEVEL`.
    ///
    /// Unset or unrecognised values fall back to `INFO`.
    pub fn from_env() -> Self {
        let threshold = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        Self::tracing(threshold)
    }

    pub fn threshold(&self) -> LogLevel {
        self.threshold
    }

    /// Returns `true` if a message at `level` would be written.
    pub fn passes_level(&self, level: LogLevel) -> bool {
        level.threshold() >= self.threshold.threshold()
    }

    /// The single gate every message goes through.
    pub fn write(&self, level: LogLevel, message: &str) {
        if !self.passes_level(level) {
            return;
        }
        self.sink.emit(level, message);
    }

    /// Writes `label: <json>` if `level` passes. The value is only
    /// serialised when it will actually be written.
    pub fn write_json<T: Serialize + ?Sized>(
        &self,
        level: LogLevel,
        label: &str,
        value: &T,
        pretty: bool,
    ) {
        if !self.passes_level(level) {
            return;
        }
        let rendered = if pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        let message = match rendered {
            Ok(json) => format!("{label}: {json}"),
            Err(e) => format!("{label}: <unserializable: {e}>"),
        };
        self.write(level, &message);
    }

    pub fn debug(&self, message: &str) {
        self.write(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.write(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.write(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.write(LogLevel::Error, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::tracing(LogLevel::default())
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}
