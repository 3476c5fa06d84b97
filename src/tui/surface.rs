//! Rendering surfaces: the real terminal, or an in-memory buffer fed by an
//! injectable key channel.
//!
//! The render loop only sees the [`Screen`] trait, so the same loop drives a
//! crossterm terminal in production and a ratatui `TestBackend` under tests
//! or on hosts without a TTY.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use parking_lot::Mutex;
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend, TestBackend};
use ratatui::layout::Size;

use super::render::buffer_to_string;
use super::terminal_guard::TerminalGuard;
use crate::core::errors::{ClogError, Result};

/// What the render loop needs from a surface.
pub(crate) trait Screen {
    type Backend: Backend;

    fn terminal(&mut self) -> &mut Terminal<Self::Backend>;

    /// Wait up to `timeout` for one input event. A zero timeout never blocks.
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<Event>>;

    fn size(&mut self) -> io::Result<Size> {
        self.terminal().size()
    }

    fn draw(&mut self, render: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal().draw(render).map(|_| ())
    }

    /// React to a resize event. Real terminals report their size on their own.
    fn resize(&mut self, _cols: u16, _rows: u16) -> io::Result<()> {
        Ok(())
    }

    /// Called after every successful draw.
    fn frame_drawn(&mut self) {}

    /// Whether process signals should cancel the loop on this surface.
    fn wants_signals(&self) -> bool {
        false
    }
}

/// Where a dashboard renders.
#[derive(Debug, Default)]
pub enum Surface {
    /// The process's controlling terminal, via crossterm.
    #[default]
    Terminal,
    /// A fixed-size in-memory buffer; see [`Surface::headless`].
    Headless(HeadlessSurface),
}

impl Surface {
    /// An in-memory surface of `cols` x `rows` cells, plus the handle that
    /// feeds it keys and reads back the frames it draws.
    #[must_use]
    pub fn headless(cols: u16, rows: u16) -> (Self, HeadlessKeys) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let shared = Arc::new(HeadlessShared::default());
        let surface = HeadlessSurface {
            cols: cols.max(1),
            rows: rows.max(1),
            events: rx,
            shared: Arc::clone(&shared),
        };
        (Self::Headless(surface), HeadlessKeys { events: tx, shared })
    }

    /// Acquire the surface. Must run on the thread that renders.
    pub(crate) fn open(self) -> Result<OpenScreen> {
        match self {
            Self::Terminal => TerminalScreen::open().map(OpenScreen::Terminal),
            Self::Headless(surface) => surface.open().map(OpenScreen::Headless),
        }
    }
}

/// An acquired surface, ready for the render loop.
pub(crate) enum OpenScreen {
    Terminal(TerminalScreen),
    Headless(HeadlessScreen),
}

/// Raw-mode terminal plus the guard that restores it.
pub(crate) struct TerminalScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    _guard: TerminalGuard,
}

impl TerminalScreen {
    fn open() -> Result<Self> {
        let guard = TerminalGuard::acquire()?;
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
            .map_err(|e| ClogError::terminal_unavailable(format!("create terminal: {e}")))?;
        Ok(Self {
            terminal,
            _guard: guard,
        })
    }
}

impl Screen for TerminalScreen {
    type Backend = CrosstermBackend<Stdout>;

    fn terminal(&mut self) -> &mut Terminal<Self::Backend> {
        &mut self.terminal
    }

    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        if event::poll(timeout)? {
            event::read().map(Some)
        } else {
            Ok(None)
        }
    }

    fn wants_signals(&self) -> bool {
        true
    }
}

#[derive(Debug, Default)]
struct HeadlessShared {
    last_frame: Mutex<String>,
    frames: AtomicU64,
}

/// Unopened in-memory surface.
#[derive(Debug)]
pub struct HeadlessSurface {
    cols: u16,
    rows: u16,
    events: Receiver<Event>,
    shared: Arc<HeadlessShared>,
}

impl HeadlessSurface {
    pub(crate) fn open(self) -> Result<HeadlessScreen> {
        let terminal = Terminal::new(TestBackend::new(self.cols, self.rows))
            .map_err(|e| ClogError::terminal_unavailable(format!("headless buffer: {e}")))?;
        Ok(HeadlessScreen {
            terminal,
            events: self.events,
            disconnected: false,
            shared: self.shared,
        })
    }
}

pub(crate) struct HeadlessScreen {
    terminal: Terminal<TestBackend>,
    events: Receiver<Event>,
    disconnected: bool,
    shared: Arc<HeadlessShared>,
}

impl Screen for HeadlessScreen {
    type Backend = TestBackend;

    fn terminal(&mut self) -> &mut Terminal<Self::Backend> {
        &mut self.terminal
    }

    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        if self.disconnected {
            // Keep the tick cadence once every sender is gone.
            thread::sleep(timeout);
            return Ok(None);
        }
        let received = if timeout.is_zero() {
            self.events.try_recv().map_err(|e| match e {
                TryRecvError::Empty => RecvTimeoutError::Timeout,
                TryRecvError::Disconnected => RecvTimeoutError::Disconnected,
            })
        } else {
            self.events.recv_timeout(timeout)
        };
        match received {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                self.disconnected = true;
                Ok(None)
            }
        }
    }

    fn resize(&mut self, cols: u16, rows: u16) -> io::Result<()> {
        self.terminal.backend_mut().resize(cols.max(1), rows.max(1));
        Ok(())
    }

    fn frame_drawn(&mut self) {
        *self.shared.last_frame.lock() = buffer_to_string(self.terminal.backend().buffer());
        self.shared.frames.fetch_add(1, Ordering::SeqCst);
    }
}

/// Test and automation handle for a headless dashboard.
#[derive(Debug, Clone)]
pub struct HeadlessKeys {
    events: Sender<Event>,
    shared: Arc<HeadlessShared>,
}

impl HeadlessKeys {
    /// Inject one raw terminal event.
    ///
    /// # Errors
    /// [`ClogError::ChannelClosed`] once the surface has been dropped.
    pub fn send(&self, event: Event) -> Result<()> {
        self.events
            .send(event)
            .map_err(|_| ClogError::ChannelClosed {
                component: "headless keys",
            })
    }

    /// Press `code` without modifiers.
    ///
    /// # Errors
    /// See [`HeadlessKeys::send`].
    pub fn press(&self, code: KeyCode) -> Result<()> {
        self.send(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    /// Press one key per character of `text`.
    ///
    /// # Errors
    /// See [`HeadlessKeys::send`].
    pub fn type_text(&self, text: &str) -> Result<()> {
        text.chars().try_for_each(|c| self.press(KeyCode::Char(c)))
    }

    /// Resize the in-memory screen.
    ///
    /// # Errors
    /// See [`HeadlessKeys::send`].
    pub fn resize(&self, cols: u16, rows: u16) -> Result<()> {
        self.send(Event::Resize(cols, rows))
    }

    /// Text of the most recently drawn frame, one line per row.
    #[must_use]
    pub fn last_frame(&self) -> String {
        self.shared.last_frame.lock().clone()
    }

    #[must_use]
    pub fn frames_drawn(&self) -> u64 {
        self.shared.frames.load(Ordering::SeqCst)
    }

    /// Block until the frame counter passes `target` or `timeout` elapses.
    pub fn wait_for_frames(&self, target: u64, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.frames_drawn() < target {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
        true
    }

    /// Block until the last frame contains `needle` or `timeout` elapses.
    pub fn wait_for_text(&self, needle: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.last_frame().contains(needle) {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
        true
    }
}
