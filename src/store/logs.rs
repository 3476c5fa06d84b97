//! Bounded, leveled message log shared between producers and the dashboard.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::ring::BoundedRing;

/// Severity of a log entry. Closed set; the renderer switches on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Routine progress.
    #[default]
    Info,
    /// Parsed from `warning` or `warn`.
    #[serde(alias = "warn")]
    Warning,
    /// Failures the user should act on.
    Error,
}

impl LogLevel {
    /// Fixed-width label used by the log panel.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Rejected level name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level {0:?} (expected info, warning or error)")]
pub struct UnknownLogLevel(pub String);

impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(UnknownLogLevel(raw.to_string())),
        }
    }
}

/// One retained message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Severity chosen by the producer.
    pub level: LogLevel,
    /// Message text as recorded; may span several lines.
    pub text: String,
    /// Wall-clock time the store accepted the entry.
    pub recorded_at: DateTime<Utc>,
}

/// Thread-safe ring of [`LogEntry`] values.
pub struct LogStore {
    entries: Mutex<BoundedRing<LogEntry>>,
}

impl LogStore {
    /// Empty store retaining at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(BoundedRing::new(capacity)),
        }
    }

    /// Append a message, evicting the oldest when full. Never fails.
    pub fn record(&self, text: impl Into<String>, level: LogLevel) {
        let entry = LogEntry {
            level,
            text: text.into(),
            recorded_at: Utc::now(),
        };
        self.entries.lock().push(entry);
    }

    /// Every retained entry, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.lock().to_vec()
    }

    /// The newest `n` entries, oldest first.
    #[must_use]
    pub fn tail(&self, n: usize) -> Vec<LogEntry> {
        self.entries.lock().tail(n)
    }

    /// Entries currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True before the first message.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of retained entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.lock().capacity()
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new(crate::core::config::StoreConfig::default().log_capacity)
    }
}

impl fmt::Debug for LogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ring = self.entries.lock();
        f.debug_struct("LogStore")
            .field("len", &ring.len())
            .field("capacity", &ring.capacity())
            .finish()
    }
}
