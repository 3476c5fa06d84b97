#![forbid(unsafe_code)]

//! clog: a live telemetry dashboard that runs inside the process it watches.
//!
//! Worker threads record numeric metrics and log lines into bounded,
//! thread-safe stores; a single render loop draws them in the terminal as a
//! searchable metric list, a min/max-downsampled chart of the selected series
//! and a colored log tail.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use clog::prelude::*;
//!
//! let tracker = Tracker::new();
//! tracker.record_metric("loss", 0.42, 1);
//! tracker.warn("learning rate clipped");
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use clog::core::config::Config;
//! use clog::store::metrics::MetricStore;
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod store;
pub mod tracker;
#[cfg(feature = "tui")]
pub mod tui;

pub use crate::core::errors::{ClogError, Result};
pub use crate::tracker::Tracker;
