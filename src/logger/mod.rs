//! Bridges between host logging and the dashboard's log store.

pub mod capture;

pub use capture::LogCaptureLayer;
