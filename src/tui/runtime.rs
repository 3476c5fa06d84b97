//! The dashboard render loop.
//!
//! One loop per tracker. Each tick: drain pending input, check the terminal
//! size against the cached layout, snapshot the stores, draw, then wait for
//! input for at most one tick interval. The loop exits when its
//! [`CancellationToken`] is set, on `q`/`Esc`/`Ctrl-C`, or when the terminal
//! goes away.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::event::Event;
use ratatui::layout::Rect;
use tracing::{debug, error, warn};

use super::input::{InputRouter, RouterOutcome};
use super::layout::{LayoutCache, LayoutParams};
use super::render::{FrameView, render_frame};
use super::signals::SignalRegistration;
use super::surface::{OpenScreen, Screen};
use super::theme::{AccessibilityProfile, Theme};
use crate::core::config::DashboardConfig;
use crate::core::errors::{ClogError, Result};
use crate::store::{LogStore, MetricStore};

/// Cooperative stop flag for one loop run.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub(crate) const fn flag(&self) -> &Arc<AtomicBool> {
        &self.flag
    }
}

/// Everything a loop run reads besides its screen.
#[derive(Debug, Clone)]
pub(crate) struct LoopContext {
    pub metrics: Arc<MetricStore>,
    pub logs: Arc<LogStore>,
    pub config: DashboardConfig,
    pub token: CancellationToken,
}

/// Counters reported when a loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LoopStats {
    pub frames: u64,
    pub skipped_frames: u64,
    pub layout_rebuilds: u64,
}

impl OpenScreen {
    /// Run the loop to completion on the current thread.
    pub(crate) fn run(self, ctx: &LoopContext) -> Result<LoopStats> {
        match self {
            Self::Terminal(mut screen) => run_loop(&mut screen, ctx),
            Self::Headless(mut screen) => run_loop(&mut screen, ctx),
        }
    }
}

/// I/O kinds after which the terminal is gone for good.
fn is_terminal_lost(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected
            | io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
    )
}

/// Consecutive-failure budget shared by drawing and event polling.
struct FailurePolicy {
    consecutive: u32,
    limit: u32,
}

impl FailurePolicy {
    const fn new(limit: u32) -> Self {
        Self {
            consecutive: 0,
            limit,
        }
    }

    const fn succeeded(&mut self) {
        self.consecutive = 0;
    }

    /// Classify one failure: `Ok` means skip and retry next tick.
    fn failed(&mut self, err: io::Error, stage: &'static str) -> Result<()> {
        if is_terminal_lost(&err) {
            error!(stage, error = %err, "terminal lost; stopping dashboard");
            return Err(ClogError::TerminalLost { source: err });
        }
        self.consecutive += 1;
        warn!(
            stage,
            error = %err,
            consecutive = self.consecutive,
            limit = self.limit,
            "dashboard frame skipped"
        );
        if self.consecutive >= self.limit {
            return Err(ClogError::RenderFailure {
                details: format!(
                    "{} consecutive failures, last during {stage}: {err}",
                    self.consecutive
                ),
            });
        }
        Ok(())
    }
}

fn handle_event<S: Screen>(
    screen: &mut S,
    router: &mut InputRouter,
    token: &CancellationToken,
    event: &Event,
) -> io::Result<()> {
    match event {
        Event::Key(key) => {
            if router.handle_key(key) == RouterOutcome::Quit {
                debug!("quit requested from keyboard");
                token.cancel();
            }
        }
        Event::Resize(cols, rows) => screen.resize(*cols, *rows)?,
        _ => {}
    }
    Ok(())
}

/// Drive `screen` until cancellation or a fatal surface error.
pub(crate) fn run_loop<S: Screen>(screen: &mut S, ctx: &LoopContext) -> Result<LoopStats> {
    let LoopContext {
        metrics,
        logs,
        config,
        token,
    } = ctx;
    let _signals = (config.handle_signals && screen.wants_signals())
        .then(|| SignalRegistration::register(token.flag()));

    let params = LayoutParams::from(config);
    let theme = Theme::new(AccessibilityProfile::from_environment(config.high_contrast));
    let tick = config.tick_interval();
    let mut router = InputRouter::new();
    let mut layouts = LayoutCache::new();
    let mut failures = FailurePolicy::new(config.max_consecutive_render_failures);
    let mut stats = LoopStats::default();

    debug!(tick_ms = config.tick_interval_ms, "dashboard loop started");

    while !token.is_cancelled() {
        router.sync_names(&metrics.names());

        loop {
            match screen.next_event(Duration::ZERO) {
                Ok(Some(event)) => {
                    if let Err(e) = handle_event(screen, &mut router, token, &event) {
                        failures.failed(e, "resize")?;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    failures.failed(e, "input")?;
                    break;
                }
            }
        }
        if token.is_cancelled() {
            break;
        }

        let area = match screen.size() {
            Ok(size) => Rect::new(0, 0, size.width, size.height),
            Err(e) => {
                failures.failed(e, "size")?;
                wait_for_tick(screen, &mut router, token, tick, &mut failures)?;
                continue;
            }
        };
        if layouts.is_stale_for(area) {
            debug!(cols = area.width, rows = area.height, "terminal size changed");
        }
        let layout = layouts.resolve(area, router.state().mode(), params);
        let view = layout.as_ref().map(|layout| {
            router.set_page_rows(layout.list_rows());
            router.state_mut().ensure_visible(layout.list_rows());
            FrameView::capture(metrics, logs, &router, layout)
        });

        let drawn = screen.draw(|frame| {
            render_frame(frame, layout.as_ref().zip(view.as_ref()), &theme);
        });
        match drawn {
            Ok(()) => {
                failures.succeeded();
                stats.frames += 1;
                screen.frame_drawn();
            }
            Err(e) => {
                stats.skipped_frames += 1;
                failures.failed(e, "draw")?;
            }
        }

        wait_for_tick(screen, &mut router, token, tick, &mut failures)?;
    }

    stats.layout_rebuilds = layouts.rebuilds();
    debug!(
        frames = stats.frames,
        skipped = stats.skipped_frames,
        layout_rebuilds = stats.layout_rebuilds,
        "dashboard loop stopped"
    );
    Ok(stats)
}

/// Sleep until the next tick, waking early for input.
fn wait_for_tick<S: Screen>(
    screen: &mut S,
    router: &mut InputRouter,
    token: &CancellationToken,
    tick: Duration,
    failures: &mut FailurePolicy,
) -> Result<()> {
    if token.is_cancelled() {
        return Ok(());
    }
    match screen.next_event(tick) {
        Ok(Some(event)) => {
            if let Err(e) = handle_event(screen, router, token, &event) {
                failures.failed(e, "resize")?;
            }
        }
        Ok(None) => {}
        Err(e) => failures.failed(e, "input")?,
    }
    Ok(())
}
