//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use clog::prelude::*;
//! ```

// Core
pub use crate::core::config::{CaptureConfig, Config, DashboardConfig, StoreConfig};
pub use crate::core::errors::{ClogError, Result};

// Stores
pub use crate::store::{LogEntry, LogLevel, LogStore, MetricPoint, MetricStore};

// Facade
pub use crate::logger::LogCaptureLayer;
pub use crate::tracker::Tracker;

// Dashboard
#[cfg(feature = "tui")]
pub use crate::tui::surface::{HeadlessKeys, Surface};
