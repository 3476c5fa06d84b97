//! CLOG-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, ClogError>;

/// Top-level error type for clog.
///
/// Ingestion never produces one of these; only configuration loading and the
/// dashboard lifecycle do.
#[derive(Debug, Error)]
pub enum ClogError {
    #[error("[CLOG-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[CLOG-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[CLOG-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[CLOG-2001] dashboard already running for this tracker")]
    AlreadyRunning,

    #[error("[CLOG-2002] terminal unavailable: {details}")]
    TerminalUnavailable { details: String },

    #[error("[CLOG-2003] render failure: {details}")]
    RenderFailure { details: String },

    #[error("[CLOG-2004] terminal lost during render: {source}")]
    TerminalLost {
        #[source]
        source: std::io::Error,
    },

    #[error("[CLOG-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[CLOG-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[CLOG-3003] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[CLOG-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl ClogError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "CLOG-1001",
            Self::MissingConfig { .. } => "CLOG-1002",
            Self::ConfigParse { .. } => "CLOG-1003",
            Self::AlreadyRunning => "CLOG-2001",
            Self::TerminalUnavailable { .. } => "CLOG-2002",
            Self::RenderFailure { .. } => "CLOG-2003",
            Self::TerminalLost { .. } => "CLOG-2004",
            Self::Serialization { .. } => "CLOG-2101",
            Self::Io { .. } => "CLOG-3002",
            Self::ChannelClosed { .. } => "CLOG-3003",
            Self::Runtime { .. } => "CLOG-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    ///
    /// `AlreadyRunning` is retryable: once the active loop exits a new start
    /// succeeds.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::AlreadyRunning
                | Self::RenderFailure { .. }
                | Self::Io { .. }
                | Self::ChannelClosed { .. }
                | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Wrap a terminal setup failure.
    #[must_use]
    pub fn terminal_unavailable(details: impl Into<String>) -> Self {
        Self::TerminalUnavailable {
            details: details.into(),
        }
    }
}

impl From<serde_json::Error> for ClogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for ClogError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
