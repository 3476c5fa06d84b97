//! Pane geometry for the dashboard.
//!
//! Layout is a pure function of the terminal area, the input mode, and the
//! configured proportions. [`LayoutCache`] keeps the last result and rebuilds
//! it whenever the area or mode changes, so no geometry survives a resize.

#![allow(missing_docs)]

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use super::model::UiMode;
use crate::core::config::DashboardConfig;

/// Minimum terminal width below which the dashboard shows a "too small" message.
pub const MIN_USABLE_COLS: u16 = 40;
/// Minimum terminal height below which the dashboard shows a "too small" message.
pub const MIN_USABLE_ROWS: u16 = 10;

/// Cells reserved left of the plot for y-axis labels.
pub const Y_LABEL_COLS: u16 = 10;

const SEARCH_ROWS: u16 = 3;
const FOOTER_ROWS: u16 = 1;
const BORDER: u16 = 2;

/// Returns `true` if the terminal is below the minimum usable size.
#[must_use]
pub const fn is_terminal_too_small(cols: u16, rows: u16) -> bool {
    cols < MIN_USABLE_COLS || rows < MIN_USABLE_ROWS
}

/// Proportions taken from [`DashboardConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    pub list_width_pct: u16,
    pub log_panel_rows: u16,
}

impl From<&DashboardConfig> for LayoutParams {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            list_width_pct: config.list_width_pct,
            log_panel_rows: config.log_panel_rows,
        }
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

/// Placement of every pane for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLayout {
    pub area: Rect,
    pub search: Option<Rect>,
    pub list: Rect,
    pub chart: Rect,
    pub logs: Rect,
    pub footer: Rect,
}

impl DashboardLayout {
    /// Metric rows visible inside the list border.
    #[must_use]
    pub fn list_rows(&self) -> usize {
        usize::from(self.list.height.saturating_sub(BORDER))
    }

    /// Log entries visible inside the log border.
    #[must_use]
    pub fn log_rows(&self) -> usize {
        usize::from(self.logs.height.saturating_sub(BORDER))
    }

    /// Plot columns available to the chart; one downsampling bucket each.
    #[must_use]
    pub fn chart_columns(&self) -> usize {
        usize::from(
            self.chart
                .width
                .saturating_sub(BORDER + Y_LABEL_COLS)
                .max(1),
        )
    }
}

/// Build the layout, or `None` when the area is below the usable minimum.
#[must_use]
pub fn build_layout(area: Rect, mode: UiMode, params: LayoutParams) -> Option<DashboardLayout> {
    if is_terminal_too_small(area.width, area.height) {
        return None;
    }

    let search_rows = if mode == UiMode::Searching {
        SEARCH_ROWS
    } else {
        0
    };
    // Keep at least a third of the screen for the list and chart.
    let log_rows = params
        .log_panel_rows
        .min(area.height / 3)
        .max(BORDER + 1);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(search_rows),
            Constraint::Min(BORDER + 1),
            Constraint::Length(log_rows),
            Constraint::Length(FOOTER_ROWS),
        ])
        .split(area);

    let pct = params.list_width_pct.clamp(1, 99);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(pct), Constraint::Percentage(100 - pct)])
        .split(rows[1]);

    Some(DashboardLayout {
        area,
        search: (search_rows > 0).then_some(rows[0]),
        list: columns[0],
        chart: columns[1],
        logs: rows[2],
        footer: rows[3],
    })
}

/// Last computed layout plus the inputs it was computed from.
#[derive(Debug, Clone, Default)]
pub struct LayoutCache {
    key: Option<(Rect, UiMode)>,
    layout: Option<DashboardLayout>,
    rebuilds: u64,
}

impl LayoutCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout for `area`/`mode`, recomputed only when either changed.
    pub fn resolve(
        &mut self,
        area: Rect,
        mode: UiMode,
        params: LayoutParams,
    ) -> Option<DashboardLayout> {
        if self.key != Some((area, mode)) {
            self.key = Some((area, mode));
            self.layout = build_layout(area, mode, params);
            self.rebuilds += 1;
        }
        self.layout
    }

    /// Whether `area` differs from the one the cached layout was built for.
    #[must_use]
    pub fn is_stale_for(&self, area: Rect) -> bool {
        self.key.is_none_or(|(cached, _)| cached != area)
    }

    /// Number of times the layout was recomputed.
    #[must_use]
    pub const fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(width: u16, height: u16) -> Rect {
        Rect::new(0, 0, width, height)
    }

    #[test]
    fn too_small_terminal_has_no_layout() {
        assert!(build_layout(area(30, 40), UiMode::Browsing, LayoutParams::default()).is_none());
        assert!(build_layout(area(120, 8), UiMode::Browsing, LayoutParams::default()).is_none());
    }

    #[test]
    fn browsing_layout_has_no_search_line() {
        let layout = build_layout(area(120, 40), UiMode::Browsing, LayoutParams::default())
            .expect("layout");
        assert!(layout.search.is_none());
        assert_eq!(layout.list.y, 0);
        assert_eq!(layout.footer.height, 1);
        assert_eq!(layout.footer.y, 39);
        assert_eq!(layout.logs.height, 10);
    }

    #[test]
    fn searching_layout_reserves_query_line() {
        let layout = build_layout(area(120, 40), UiMode::Searching, LayoutParams::default())
            .expect("layout");
        let search = layout.search.expect("search pane");
        assert_eq!(search.height, SEARCH_ROWS);
        assert_eq!(layout.list.y, SEARCH_ROWS);
    }

    #[test]
    fn panes_tile_the_width() {
        let layout = build_layout(area(100, 30), UiMode::Browsing, LayoutParams::default())
            .expect("layout");
        assert_eq!(layout.list.width + layout.chart.width, 100);
        assert_eq!(layout.list.width, 30);
        assert_eq!(layout.chart_columns(), usize::from(70 - BORDER - Y_LABEL_COLS));
        assert_eq!(layout.list_rows(), usize::from(layout.list.height - 2));
    }

    #[test]
    fn log_panel_shrinks_on_short_terminals() {
        let layout = build_layout(area(80, 12), UiMode::Browsing, LayoutParams::default())
            .expect("layout");
        assert_eq!(layout.logs.height, 4);
    }

    #[test]
    fn cache_rebuilds_on_resize_and_mode_change_only() {
        let mut cache = LayoutCache::new();
        let params = LayoutParams::default();
        cache.resolve(area(100, 30), UiMode::Browsing, params);
        cache.resolve(area(100, 30), UiMode::Browsing, params);
        assert_eq!(cache.rebuilds(), 1);

        assert!(cache.is_stale_for(area(120, 30)));
        let resized = cache
            .resolve(area(120, 30), UiMode::Browsing, params)
            .expect("layout");
        assert_eq!(resized.area.width, 120);
        assert_eq!(cache.rebuilds(), 2);

        cache.resolve(area(120, 30), UiMode::Searching, params);
        assert_eq!(cache.rebuilds(), 3);
    }
}
