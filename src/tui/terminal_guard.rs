//! RAII terminal lifecycle guard backed by crossterm.
//!
//! [`TerminalGuard`] enters raw mode and the alternate screen on construction
//! and restores the terminal on [`Drop`], including early error returns. A
//! process-wide panic hook restores the terminal before the previous hook
//! prints, so a panic on any thread leaves a readable shell behind.

use std::io::{self, IsTerminal, Write};
use std::panic;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

use crate::core::errors::{ClogError, Result};

/// Set while a guard owns the terminal. Checked by the panic hook.
static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

static PANIC_HOOK: Once = Once::new();

/// Owns raw mode and the alternate screen for its lifetime.
#[derive(Debug)]
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    /// Take over the terminal.
    ///
    /// # Errors
    /// [`ClogError::TerminalUnavailable`] when stdout is not a terminal or raw
    /// mode cannot be entered. Partial setup is undone before returning.
    pub fn acquire() -> Result<Self> {
        if !io::stdout().is_terminal() {
            return Err(ClogError::terminal_unavailable("stdout is not a terminal"));
        }
        enable_raw_mode()
            .map_err(|e| ClogError::terminal_unavailable(format!("enable raw mode: {e}")))?;
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);
        install_panic_hook();

        // From here on `Drop` undoes whatever succeeded.
        let guard = Self { _private: () };
        execute!(io::stdout(), EnterAlternateScreen, Hide)
            .map_err(|e| ClogError::terminal_unavailable(format!("enter alternate screen: {e}")))?;
        Ok(guard)
    }

    /// Whether some guard currently owns the terminal.
    #[must_use]
    pub fn is_active() -> bool {
        RAW_MODE_ACTIVE.load(Ordering::SeqCst)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

/// Chain a restoring hook in front of whatever hook the host installed.
/// Installed once per process and never removed.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let prev = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal_best_effort();
            prev(info);
        }));
    });
}

/// Leave the alternate screen, show the cursor and drop raw mode.
/// Safe to call repeatedly; only the first call after acquisition acts.
fn restore_terminal_best_effort() {
    if RAW_MODE_ACTIVE.swap(false, Ordering::SeqCst) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen, Show);
        let _ = stdout.flush();
        let _ = disable_raw_mode();
    }
}
