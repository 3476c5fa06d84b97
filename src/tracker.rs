//! The public facade: ingestion from any thread, one dashboard at a time.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::thread;
//!
//! let tracker = Arc::new(clog::Tracker::new());
//! let worker = {
//!     let tracker = Arc::clone(&tracker);
//!     thread::spawn(move || {
//!         for step in 0..1_000 {
//!             tracker.record_metric("loss", 1.0 / (step as f64 + 1.0), step);
//!         }
//!         tracker.log("training finished");
//!     })
//! };
//! tracker.start_dashboard(false)?;
//! worker.join().ok();
//! tracker.wait_dashboard()?;
//! # Ok::<(), clog::ClogError>(())
//! ```

use std::fmt;
use std::sync::Arc;
#[cfg(feature = "tui")]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(feature = "tui")]
use std::thread::{self, JoinHandle};

#[cfg(feature = "tui")]
use parking_lot::Mutex;
#[cfg(feature = "tui")]
use tracing::{debug, warn};

use crate::core::config::Config;
#[cfg(feature = "tui")]
use crate::core::errors::{ClogError, Result};
use crate::logger::LogCaptureLayer;
use crate::store::{LogLevel, LogStore, MetricStore};
#[cfg(feature = "tui")]
use crate::tui::input::InputRouter;
#[cfg(feature = "tui")]
use crate::tui::render::render_to_string;
#[cfg(feature = "tui")]
use crate::tui::runtime::{CancellationToken, LoopContext};
#[cfg(feature = "tui")]
use crate::tui::surface::Surface;
#[cfg(feature = "tui")]
use crate::tui::theme::{AccessibilityProfile, Theme};

/// Name of the thread a non-blocking dashboard runs on.
pub const DASHBOARD_THREAD_NAME: &str = "clog-dashboard";

/// One started dashboard: its stop flag and, when detached, its thread.
#[cfg(feature = "tui")]
struct Session {
    token: CancellationToken,
    handle: Option<JoinHandle<Result<()>>>,
}

/// Clears the running flag however the loop ends.
#[cfg(feature = "tui")]
struct RunningGuard(Arc<AtomicBool>);

#[cfg(feature = "tui")]
impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Shared stores plus the lifecycle of at most one dashboard.
pub struct Tracker {
    metrics: Arc<MetricStore>,
    logs: Arc<LogStore>,
    config: Config,
    #[cfg(feature = "tui")]
    running: Arc<AtomicBool>,
    #[cfg(feature = "tui")]
    session: Mutex<Option<Session>>,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Tracker");
        out.field("metrics", &self.metrics)
            .field("logs", &self.logs)
            .field("config", &self.config);
        #[cfg(feature = "tui")]
        out.field("dashboard_running", &self.is_dashboard_running());
        out.finish()
    }
}

impl Tracker {
    /// Tracker with default capacities and dashboard settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Tracker sized and tuned by `config`.
    ///
    /// [`Config::load`] is the validated entry point. Here a zero capacity
    /// becomes 1, and the tick and failure budget are clamped with
    /// [`DashboardConfig::clamped`](crate::core::config::DashboardConfig::clamped).
    #[must_use]
    pub fn with_config(mut config: Config) -> Self {
        config.dashboard = config.dashboard.clamped();
        Self {
            metrics: Arc::new(MetricStore::new(config.store.metric_capacity)),
            logs: Arc::new(LogStore::new(config.store.log_capacity)),
            config,
            #[cfg(feature = "tui")]
            running: Arc::new(AtomicBool::new(false)),
            #[cfg(feature = "tui")]
            session: Mutex::new(None),
        }
    }

    /// Effective configuration, after clamping.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The metric store shared with the render loop.
    #[must_use]
    pub fn metrics(&self) -> &MetricStore {
        &self.metrics
    }

    /// The log store shared with the render loop.
    #[must_use]
    pub fn logs(&self) -> &LogStore {
        &self.logs
    }

    /// Append one point to `name`, creating the series on first use.
    pub fn record_metric(&self, name: &str, value: f64, step: u64) {
        self.metrics.record(name, value, step);
    }

    /// Append a message at `level`, evicting the oldest when full.
    pub fn record_message(&self, text: impl Into<String>, level: LogLevel) {
        self.logs.record(text, level);
    }

    /// [`Tracker::record_message`] at [`LogLevel::Info`].
    pub fn log(&self, text: impl Into<String>) {
        self.record_message(text, LogLevel::Info);
    }

    /// [`Tracker::record_message`] at [`LogLevel::Warning`].
    pub fn warn(&self, text: impl Into<String>) {
        self.record_message(text, LogLevel::Warning);
    }

    /// [`Tracker::record_message`] at [`LogLevel::Error`].
    pub fn error(&self, text: impl Into<String>) {
        self.record_message(text, LogLevel::Error);
    }

    /// A `tracing` layer writing host events into this tracker's log store.
    #[must_use]
    pub fn capture_layer(&self) -> LogCaptureLayer {
        LogCaptureLayer::new(Arc::clone(&self.logs), &self.config.capture)
    }
}

#[cfg(feature = "tui")]
impl Tracker {
    /// Start the dashboard on the controlling terminal.
    ///
    /// Blocking mode renders on the calling thread until the user quits or
    /// [`Tracker::request_shutdown`] is called from elsewhere. Non-blocking
    /// mode renders on a [`DASHBOARD_THREAD_NAME`] thread and returns once the
    /// terminal has been acquired.
    ///
    /// # Errors
    /// [`ClogError::AlreadyRunning`] while another loop is active,
    /// [`ClogError::TerminalUnavailable`] when the terminal cannot be taken
    /// over, and in blocking mode whatever ended the loop.
    pub fn start_dashboard(&self, blocking: bool) -> Result<()> {
        self.start_dashboard_on(blocking, Surface::Terminal)
    }

    /// [`Tracker::start_dashboard`] with an explicit surface.
    ///
    /// # Errors
    /// As [`Tracker::start_dashboard`].
    pub fn start_dashboard_on(&self, blocking: bool, surface: Surface) -> Result<()> {
        // Taken before the running flag flips so `request_shutdown` can never
        // observe a running loop without its token. The loop thread never
        // touches it.
        let mut slot = self.session.lock();
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ClogError::AlreadyRunning);
        }
        let guard = RunningGuard(Arc::clone(&self.running));

        let token = CancellationToken::new();
        let ctx = LoopContext {
            metrics: Arc::clone(&self.metrics),
            logs: Arc::clone(&self.logs),
            config: self.config.dashboard.clone(),
            token: token.clone(),
        };
        reap_finished(slot.take());
        *slot = Some(Session {
            token,
            handle: None,
        });

        if blocking {
            drop(slot);
            let result = surface.open().and_then(|screen| screen.run(&ctx));
            drop(guard);
            return result.map(drop);
        }

        let (ack_tx, ack_rx) = crossbeam_channel::bounded::<Result<()>>(1);
        let handle = thread::Builder::new()
            .name(DASHBOARD_THREAD_NAME.to_string())
            .spawn(move || {
                let _guard = guard;
                let screen = match surface.open() {
                    Ok(screen) => {
                        let _ = ack_tx.send(Ok(()));
                        screen
                    }
                    Err(e) => {
                        let _ = ack_tx.send(Err(e));
                        return Ok(());
                    }
                };
                let result = screen.run(&ctx).map(drop);
                if let Err(e) = &result {
                    warn!(code = e.code(), error = %e, "dashboard loop ended with an error");
                }
                result
            })
            .map_err(|e| ClogError::Runtime {
                details: format!("spawn {DASHBOARD_THREAD_NAME}: {e}"),
            })?;

        match ack_rx.recv() {
            Ok(Ok(())) => {
                if let Some(session) = slot.as_mut() {
                    session.handle = Some(handle);
                }
                debug!("dashboard started on background thread");
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(ClogError::ChannelClosed {
                    component: "dashboard start",
                })
            }
        }
    }

    /// Ask the active loop to stop. Idempotent; a no-op when nothing runs.
    pub fn request_shutdown(&self) {
        if let Some(session) = self.session.lock().as_ref() {
            session.token.cancel();
        }
    }

    /// Join a non-blocking loop and return how it ended.
    ///
    /// Returns `Ok(())` immediately when no detached loop exists.
    ///
    /// # Errors
    /// The loop's own error, or [`ClogError::Runtime`] if its thread panicked.
    pub fn wait_dashboard(&self) -> Result<()> {
        let handle = self
            .session
            .lock()
            .as_mut()
            .and_then(|session| session.handle.take());
        let Some(handle) = handle else {
            return Ok(());
        };
        handle.join().map_err(|_| ClogError::Runtime {
            details: format!("{DASHBOARD_THREAD_NAME} thread panicked"),
        })?
    }

    /// [`Tracker::request_shutdown`] followed by [`Tracker::wait_dashboard`].
    ///
    /// # Errors
    /// As [`Tracker::wait_dashboard`].
    pub fn shutdown_dashboard(&self) -> Result<()> {
        self.request_shutdown();
        self.wait_dashboard()
    }

    /// True from a successful start until the loop has fully exited.
    #[must_use]
    pub fn is_dashboard_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Render the current state once, as plain text, without starting a loop.
    ///
    /// # Errors
    /// [`ClogError::RenderFailure`] if the in-memory frame cannot be drawn.
    pub fn render_snapshot(&self, cols: u16, rows: u16) -> Result<String> {
        let mut router = InputRouter::new();
        let theme = Theme::new(AccessibilityProfile::new(
            true,
            self.config.dashboard.high_contrast,
        ));
        render_to_string(
            &self.metrics,
            &self.logs,
            &mut router,
            (&self.config.dashboard).into(),
            &theme,
            cols,
            rows,
        )
        .map_err(|e| ClogError::RenderFailure {
            details: format!("snapshot {cols}x{rows}: {e}"),
        })
    }
}

/// Join a previous detached loop that has already stopped.
#[cfg(feature = "tui")]
fn reap_finished(previous: Option<Session>) {
    if let Some(handle) = previous.and_then(|session| session.handle) {
        match handle.join() {
            Ok(Err(e)) => debug!(code = e.code(), "previous dashboard run had ended with an error"),
            Err(_) => warn!("previous dashboard thread panicked"),
            Ok(Ok(())) => {}
        }
    }
}

#[cfg(feature = "tui")]
impl Drop for Tracker {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown_dashboard() {
            warn!(code = e.code(), error = %e, "dashboard ended with an error during drop");
        }
    }
}
