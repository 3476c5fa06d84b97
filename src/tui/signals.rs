//! SIGINT/SIGTERM → dashboard cancellation.
//!
//! Uses `signal-hook` to set the loop's cancellation flag directly; the loop
//! polls it every tick like any other cancellation. Registrations are scoped
//! to one loop run and removed when the [`SignalRegistration`] drops.
//!
//! signal-hook cannot uninstall its process handler, so the first
//! registration also adds a conditional default action per signal. It is
//! armed whenever no loop holds a registration: a signal arriving then
//! terminates the process the way the platform default would.

#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
#[cfg(feature = "signals")]
use std::sync::atomic::Ordering;
#[cfg(feature = "signals")]
use std::sync::OnceLock;

#[cfg(feature = "signals")]
use parking_lot::Mutex;
#[cfg(feature = "signals")]
use signal_hook::consts::{SIGINT, SIGTERM};

#[cfg(feature = "signals")]
const HANDLED: [(i32, &str); 2] = [(SIGINT, "SIGINT"), (SIGTERM, "SIGTERM")];

/// Process-wide fallback shared by every registration.
#[cfg(feature = "signals")]
struct DefaultFallback {
    /// True while no loop is registered; read from the signal handler.
    armed: Arc<AtomicBool>,
    live: Mutex<usize>,
}

#[cfg(feature = "signals")]
fn fallback() -> &'static DefaultFallback {
    static FALLBACK: OnceLock<DefaultFallback> = OnceLock::new();
    FALLBACK.get_or_init(|| {
        let armed = Arc::new(AtomicBool::new(true));
        for (signal, name) in HANDLED {
            if let Err(e) = signal_hook::flag::register_conditional_default(signal, Arc::clone(&armed)) {
                tracing::warn!(signal = name, error = %e, "failed to install default fallback");
            }
        }
        DefaultFallback {
            armed,
            live: Mutex::new(0),
        }
    })
}

/// Handler registrations owned by one render loop.
#[derive(Debug, Default)]
pub struct SignalRegistration {
    #[cfg(feature = "signals")]
    ids: Vec<signal_hook::SigId>,
}

impl SignalRegistration {
    /// Route SIGINT and SIGTERM into `flag`.
    ///
    /// Registration is best-effort; failures are logged and the loop runs
    /// without signal cancellation.
    #[cfg(feature = "signals")]
    pub fn register(flag: &Arc<AtomicBool>) -> Self {
        let fallback = fallback();
        {
            let mut live = fallback.live.lock();
            *live += 1;
            fallback.armed.store(false, Ordering::SeqCst);
        }
        let mut ids = Vec::with_capacity(HANDLED.len());
        for (signal, name) in HANDLED {
            match signal_hook::flag::register(signal, Arc::clone(flag)) {
                Ok(id) => ids.push(id),
                Err(e) => tracing::warn!(signal = name, error = %e, "failed to register signal handler"),
            }
        }
        Self { ids }
    }

    #[cfg(not(feature = "signals"))]
    pub fn register(_flag: &Arc<AtomicBool>) -> Self {
        tracing::debug!("built without signal support; only keys and request_shutdown cancel");
        Self::default()
    }

    /// Number of live handler registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        #[cfg(feature = "signals")]
        {
            self.ids.len()
        }
        #[cfg(not(feature = "signals"))]
        {
            0
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(feature = "signals")]
impl Drop for SignalRegistration {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            signal_hook::low_level::unregister(id);
        }
        let fallback = fallback();
        let mut live = fallback.live.lock();
        *live = live.saturating_sub(1);
        if *live == 0 {
            fallback.armed.store(true, Ordering::SeqCst);
        }
    }
}
