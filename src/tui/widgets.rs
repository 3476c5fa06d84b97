//! Text helpers shared across dashboard panes.

#![allow(missing_docs)]

use chrono::{DateTime, Local, Utc};

/// Shown in place of a value that cannot be plotted.
pub const NON_FINITE_MARKER: &str = "⚠";

/// Compact numeric rendering for list rows and axis labels.
///
/// Non-finite values render as `NaN`, `+inf`, `-inf`; the chart flags them
/// separately with [`NON_FINITE_MARKER`].
#[must_use]
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+inf" } else { "-inf" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-3..1e6).contains(&magnitude) {
        format!("{value:.3e}")
    } else {
        format!("{value:.4}")
    }
}

/// Clip `text` to `width` display cells, ending with `…` when clipped.
#[must_use]
pub fn ellipsize(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('…');
    out
}

/// Wall-clock time of a log entry in the local timezone.
#[must_use]
pub fn clock_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Chart title suffix announcing skipped points, empty when there are none.
#[must_use]
pub fn non_finite_badge(count: usize) -> String {
    if count == 0 {
        String::new()
    } else {
        format!(" {NON_FINITE_MARKER} {count} non-finite")
    }
}
