//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{ClogError, Result};
use crate::store::logs::LogLevel;

/// Full clog configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub dashboard: DashboardConfig,
    pub capture: CaptureConfig,
}

/// Ring-buffer capacities for the ingestion stores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    /// Points retained per metric series before the oldest is evicted.
    pub metric_capacity: usize,
    /// Log entries retained before the oldest is evicted.
    pub log_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            metric_capacity: 10_000,
            log_capacity: 1_000,
        }
    }
}

/// Render loop cadence and layout knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Delay between frames; also the upper bound on key-event latency.
    pub tick_interval_ms: u64,
    /// Width of the metric list as a percentage of the terminal width.
    pub list_width_pct: u16,
    /// Height of the log panel in rows, borders included.
    pub log_panel_rows: u16,
    /// Consecutive skipped frames tolerated before the loop gives up.
    pub max_consecutive_render_failures: u32,
    /// Route SIGINT/SIGTERM into the loop's cancellation token while a
    /// terminal surface is active.
    pub handle_signals: bool,
    /// Use the high-contrast palette.
    pub high_contrast: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            list_width_pct: 30,
            log_panel_rows: 10,
            max_consecutive_render_failures: 20,
            handle_signals: true,
            high_contrast: false,
        }
    }
}

/// Accepted range for `dashboard.tick_interval_ms`.
pub const TICK_INTERVAL_RANGE_MS: std::ops::RangeInclusive<u64> = 10..=10_000;

impl DashboardConfig {
    /// Pull the loop-safety knobs back into range: a zero tick would spin the
    /// loop and a zero failure budget would end it on the first bad frame.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.tick_interval_ms = self
            .tick_interval_ms
            .clamp(*TICK_INTERVAL_RANGE_MS.start(), *TICK_INTERVAL_RANGE_MS.end());
        self.max_consecutive_render_failures = self.max_consecutive_render_failures.max(1);
        self
    }

    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Bridge settings for forwarding host `tracing` events into the log store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CaptureConfig {
    /// Events below this level are dropped by the capture layer.
    pub min_level: LogLevel,
    /// Prefix captured messages with the event target.
    pub include_target: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            include_target: false,
        }
    }
}

impl Config {
    /// Load config from an explicit TOML file (or defaults), then apply env
    /// overrides and validate.
    ///
    /// Unlike a daemon, a library has no implicit config location: `None`
    /// means "defaults plus environment".
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(path) if path.exists() => {
                let raw = fs::read_to_string(path).map_err(|source| ClogError::io(path, source))?;
                toml::from_str::<Self>(&raw)?
            }
            Some(path) => {
                return Err(ClogError::MissingConfig {
                    path: path.to_path_buf(),
                });
            }
            None => Self::default(),
        };

        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a TOML document without consulting the environment.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for diagnostics.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_env_overrides_from(env_var)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        // store
        if let Some(raw) = lookup("CLOG_STORE_METRIC_CAPACITY") {
            self.store.metric_capacity = parse_env("CLOG_STORE_METRIC_CAPACITY", &raw)?;
        }
        if let Some(raw) = lookup("CLOG_STORE_LOG_CAPACITY") {
            self.store.log_capacity = parse_env("CLOG_STORE_LOG_CAPACITY", &raw)?;
        }

        // dashboard
        if let Some(raw) = lookup("CLOG_DASHBOARD_TICK_INTERVAL_MS") {
            self.dashboard.tick_interval_ms = parse_env("CLOG_DASHBOARD_TICK_INTERVAL_MS", &raw)?;
        }
        if let Some(raw) = lookup("CLOG_DASHBOARD_LIST_WIDTH_PCT") {
            self.dashboard.list_width_pct = parse_env("CLOG_DASHBOARD_LIST_WIDTH_PCT", &raw)?;
        }
        if let Some(raw) = lookup("CLOG_DASHBOARD_LOG_PANEL_ROWS") {
            self.dashboard.log_panel_rows = parse_env("CLOG_DASHBOARD_LOG_PANEL_ROWS", &raw)?;
        }
        if let Some(raw) = lookup("CLOG_DASHBOARD_MAX_CONSECUTIVE_RENDER_FAILURES") {
            self.dashboard.max_consecutive_render_failures =
                parse_env("CLOG_DASHBOARD_MAX_CONSECUTIVE_RENDER_FAILURES", &raw)?;
        }
        if let Some(raw) = lookup("CLOG_DASHBOARD_HANDLE_SIGNALS") {
            self.dashboard.handle_signals = parse_env("CLOG_DASHBOARD_HANDLE_SIGNALS", &raw)?;
        }
        if let Some(raw) = lookup("CLOG_DASHBOARD_HIGH_CONTRAST") {
            self.dashboard.high_contrast = parse_env("CLOG_DASHBOARD_HIGH_CONTRAST", &raw)?;
        }

        // capture
        if let Some(raw) = lookup("CLOG_CAPTURE_MIN_LEVEL") {
            self.capture.min_level = parse_env("CLOG_CAPTURE_MIN_LEVEL", &raw)?;
        }
        if let Some(raw) = lookup("CLOG_CAPTURE_INCLUDE_TARGET") {
            self.capture.include_target = parse_env("CLOG_CAPTURE_INCLUDE_TARGET", &raw)?;
        }

        Ok(())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.store.metric_capacity == 0 || self.store.log_capacity == 0 {
            return Err(ClogError::InvalidConfig {
                details: "store.metric_capacity and store.log_capacity must be > 0".to_string(),
            });
        }

        if !TICK_INTERVAL_RANGE_MS.contains(&self.dashboard.tick_interval_ms) {
            return Err(ClogError::InvalidConfig {
                details: format!(
                    "dashboard.tick_interval_ms must be in [10, 10000], got {}",
                    self.dashboard.tick_interval_ms
                ),
            });
        }

        if !(10..=80).contains(&self.dashboard.list_width_pct) {
            return Err(ClogError::InvalidConfig {
                details: format!(
                    "dashboard.list_width_pct must be in [10, 80], got {}",
                    self.dashboard.list_width_pct
                ),
            });
        }

        // Two border rows plus at least one entry.
        if self.dashboard.log_panel_rows < 3 {
            return Err(ClogError::InvalidConfig {
                details: format!(
                    "dashboard.log_panel_rows must be >= 3, got {}",
                    self.dashboard.log_panel_rows
                ),
            });
        }

        if self.dashboard.max_consecutive_render_failures == 0 {
            return Err(ClogError::InvalidConfig {
                details: "dashboard.max_consecutive_render_failures must be >= 1".to_string(),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|error| ClogError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

#[cfg(test)]
mod tests {
    use super::{ClogError, Config, LogLevel};
    use std::collections::HashMap;
    use std::io::Write as _;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn default_config_is_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_capacity_rejected() {
        let mut cfg = Config::default();
        cfg.store.metric_capacity = 0;
        let err = cfg.validate().expect_err("expected invalid capacity");
        match err {
            ClogError::InvalidConfig { details } => assert!(details.contains("capacity")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn tick_interval_bounds_enforced() {
        let mut cfg = Config::default();
        cfg.dashboard.tick_interval_ms = 5;
        assert!(cfg.validate().is_err());
        cfg.dashboard.tick_interval_ms = 10;
        assert!(cfg.validate().is_ok());
        cfg.dashboard.tick_interval_ms = 60_000;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn clamping_restores_loop_safety_limits() {
        let mut cfg = Config::default();
        cfg.dashboard.tick_interval_ms = 0;
        cfg.dashboard.max_consecutive_render_failures = 0;
        let dashboard = cfg.dashboard.clamped();
        assert_eq!(dashboard.tick_interval_ms, 10);
        assert_eq!(dashboard.max_consecutive_render_failures, 1);

        cfg = Config::default();
        cfg.dashboard.tick_interval_ms = 60_000;
        assert_eq!(cfg.dashboard.clone().clamped().tick_interval_ms, 10_000);
        assert_eq!(cfg.dashboard.clone().clamped().list_width_pct, 30);
        assert_eq!(Config::default().dashboard.clamped(), Config::default().dashboard);
    }

    #[test]
    fn tiny_log_panel_rejected() {
        let mut cfg = Config::default();
        cfg.dashboard.log_panel_rows = 2;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn toml_partial_document_keeps_defaults() {
        let cfg = Config::from_toml_str(
            r#"
            [store]
            metric_capacity = 64

            [capture]
            min_level = "warning"
            "#,
        )
        .expect("valid toml");
        assert_eq!(cfg.store.metric_capacity, 64);
        assert_eq!(cfg.store.log_capacity, 1_000);
        assert_eq!(cfg.capture.min_level, LogLevel::Warning);
        assert_eq!(cfg.dashboard.tick_interval_ms, 100);
    }

    #[test]
    fn toml_unknown_level_is_parse_error() {
        let err = Config::from_toml_str("[capture]\nmin_level = \"loud\"\n")
            .expect_err("unknown level");
        assert_eq!(err.code(), "CLOG-1003");
    }

    #[test]
    fn env_overrides_apply_and_validate() {
        let env = vars(&[
            ("CLOG_STORE_LOG_CAPACITY", "42"),
            ("CLOG_DASHBOARD_HANDLE_SIGNALS", "false"),
            ("CLOG_CAPTURE_MIN_LEVEL", "error"),
        ]);
        let mut cfg = Config::default();
        cfg.apply_env_overrides_from(|name| env.get(name).cloned())
            .expect("overrides should apply");
        assert_eq!(cfg.store.log_capacity, 42);
        assert!(!cfg.dashboard.handle_signals);
        assert_eq!(cfg.capture.min_level, LogLevel::Error);
    }

    #[test]
    fn env_override_parse_error_names_variable() {
        let env = vars(&[("CLOG_DASHBOARD_TICK_INTERVAL_MS", "fast")]);
        let mut cfg = Config::default();
        let err = cfg
            .apply_env_overrides_from(|name| env.get(name).cloned())
            .expect_err("non-numeric tick");
        assert!(err.to_string().contains("CLOG_DASHBOARD_TICK_INTERVAL_MS"));
    }

    #[test]
    fn load_from_file_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "[dashboard]\nlist_width_pct = 40").expect("write config");

        let cfg = Config::load(Some(file.path())).expect("load config");
        assert_eq!(cfg.dashboard.list_width_pct, 40);

        let missing = file.path().with_extension("absent");
        let err = Config::load(Some(&missing)).expect_err("missing file");
        assert_eq!(err.code(), "CLOG-1002");
    }

    #[test]
    fn stable_hash_changes_when_config_changes() {
        let cfg = Config::default();
        let before = cfg.stable_hash().expect("hash should compute");
        let mut changed = cfg.clone();
        changed.store.metric_capacity += 1;
        let after = changed.stable_hash().expect("hash should compute");
        assert_ne!(before, after);
        assert_eq!(before, cfg.stable_hash().expect("hash should compute"));
    }
}
