//! Ingestion stores: bounded metric series and a bounded message log.
//!
//! Both are written by any number of producer threads and read by the
//! dashboard through copy-out snapshots taken under short critical sections.

pub mod logs;
pub mod metrics;
pub mod ring;

#[cfg(test)]
mod test_properties;

pub use logs::{LogEntry, LogLevel, LogStore};
pub use metrics::{MetricPoint, MetricStore};
