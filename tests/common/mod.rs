#![allow(dead_code)]

use std::time::Duration;

use clog::core::config::Config;
use clog::Tracker;

/// Upper bound for anything a headless loop should do within a few ticks.
pub const SETTLE: Duration = Duration::from_secs(5);

/// Tracker with a 10 ms tick so headless loops react quickly.
pub fn fast_tracker() -> Tracker {
    Tracker::with_config(fast_config())
}

pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.dashboard.tick_interval_ms = 10;
    config.dashboard.handle_signals = false;
    config
}

/// Tracker with small rings for eviction scenarios.
pub fn small_tracker(metric_capacity: usize, log_capacity: usize) -> Tracker {
    let mut config = fast_config();
    config.store.metric_capacity = metric_capacity;
    config.store.log_capacity = log_capacity;
    Tracker::with_config(config)
}

pub fn steps(tracker: &Tracker, name: &str) -> Vec<u64> {
    tracker
        .metrics()
        .snapshot(name)
        .iter()
        .map(|p| p.step)
        .collect()
}
