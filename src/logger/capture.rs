//! `tracing` layer that feeds host-program events into a [`LogStore`].
//!
//! Install it next to whatever other layers the host uses:
//!
//! ```rust,no_run
//! use tracing_subscriber::layer::SubscriberExt;
//!
//! let tracker = clog::Tracker::new();
//! let subscriber = tracing_subscriber::registry().with(tracker.capture_layer());
//! tracing::subscriber::set_global_default(subscriber).ok();
//! tracing::warn!(epoch = 3, "validation loss went up");
//! ```

use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::core::config::CaptureConfig;
use crate::store::{LogLevel, LogStore};

/// Level a `tracing` event is stored under. DEBUG and TRACE fold into Info.
#[must_use]
pub fn level_for(level: &Level) -> LogLevel {
    match *level {
        Level::ERROR => LogLevel::Error,
        Level::WARN => LogLevel::Warning,
        _ => LogLevel::Info,
    }
}

/// Forwards every event at or above a minimum level into a [`LogStore`].
#[derive(Debug, Clone)]
pub struct LogCaptureLayer {
    store: Arc<LogStore>,
    min_level: LogLevel,
    include_target: bool,
}

impl LogCaptureLayer {
    /// Layer writing into `store`, filtered and formatted per `config`.
    #[must_use]
    pub fn new(store: Arc<LogStore>, config: &CaptureConfig) -> Self {
        Self {
            store,
            min_level: config.min_level,
            include_target: config.include_target,
        }
    }

    /// Replace the minimum captured level.
    #[must_use]
    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Events below this level are ignored.
    #[must_use]
    pub const fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

impl<S> Layer<S> for LogCaptureLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = level_for(metadata.level());
        if level < self.min_level {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let mut text = String::new();
        if self.include_target {
            let _ = write!(text, "{}: ", metadata.target());
        }
        text.push_str(&visitor.finish());
        self.store.record(text, level);
    }
}

/// Collects the `message` field followed by `key=value` for the rest.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }
}
