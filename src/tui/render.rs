//! Frame composition for the dashboard.
//!
//! Two steps: [`FrameView::capture`] copies everything a frame needs out of
//! the stores (one short lock per copy), then [`render_frame`] draws that view
//! with ratatui widgets. Drawing never touches a lock.

#![allow(missing_docs)]

use ratatui::Frame;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, Paragraph, Wrap,
};
use ratatui::Terminal;

use super::downsample::{ChartData, ChartTrace, downsample};
use super::input::{InputRouter, help_bindings};
use super::layout::{DashboardLayout, LayoutParams, MIN_USABLE_COLS, MIN_USABLE_ROWS, build_layout};
use super::model::UiMode;
use super::theme::{SemanticToken, Theme};
use super::widgets::{clock_time, ellipsize, format_value, non_finite_badge};
use crate::store::{LogEntry, LogStore, MetricStore};

/// One row of the metric list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRow {
    pub name: String,
    pub latest: Option<f64>,
    pub selected: bool,
}

/// The selected series, reduced to the chart width.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub name: String,
    pub data: ChartData,
}

/// Everything one frame draws, copied out of the stores.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub mode: UiMode,
    pub query: String,
    pub rows: Vec<ListRow>,
    pub filtered_total: usize,
    pub names_total: usize,
    pub chart: Option<ChartView>,
    pub logs: Vec<LogEntry>,
}

impl FrameView {
    /// Snapshot the stores for `layout`.
    ///
    /// Only the visible slice of the list, the visible tail of the log and
    /// the selected series are copied.
    #[must_use]
    pub fn capture(
        metrics: &MetricStore,
        logs: &LogStore,
        router: &InputRouter,
        layout: &DashboardLayout,
    ) -> Self {
        let state = router.state();
        let filtered = state.filtered_names();
        let selected = state.selected_name();

        let rows = filtered
            .iter()
            .skip(state.scroll_offset())
            .take(layout.list_rows())
            .map(|name| ListRow {
                latest: metrics.latest(name).map(|p| p.value),
                selected: Some(name.as_str()) == selected,
                name: name.clone(),
            })
            .collect();

        let chart = selected.map(|name| ChartView {
            name: name.to_string(),
            data: downsample(&metrics.snapshot(name), layout.chart_columns()),
        });

        Self {
            mode: state.mode(),
            query: state.search_query().to_string(),
            rows,
            filtered_total: filtered.len(),
            names_total: metrics.len(),
            chart,
            logs: logs.tail(layout.log_rows()),
        }
    }
}

/// Draw one frame. `None` means the terminal is below the usable minimum.
pub fn render_frame(
    frame: &mut Frame<'_>,
    content: Option<(&DashboardLayout, &FrameView)>,
    theme: &Theme,
) {
    let Some((layout, view)) = content else {
        let area = frame.area();
        render_too_small(frame, area, theme);
        return;
    };

    if let Some(search) = layout.search {
        render_search(frame, search, &view.query, theme);
    }
    render_list(frame, layout.list, view, theme);
    render_chart(frame, layout.chart, view, theme);
    render_logs(frame, layout.logs, &view.logs, theme);
    render_footer(frame, layout.footer, view.mode, theme);
}

fn render_too_small(frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let message = format!(
        "terminal too small: need {MIN_USABLE_COLS}x{MIN_USABLE_ROWS}, got {}x{}",
        area.width, area.height
    );
    let widget = Paragraph::new(message)
        .style(theme.fg(SemanticToken::Warning))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_search(frame: &mut Frame<'_>, area: Rect, query: &str, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled("/", theme.fg(SemanticToken::Accent)),
        Span::raw(query.to_string()),
        Span::styled("▏", theme.fg(SemanticToken::Accent)),
    ]);
    let widget = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Search")
            .border_style(theme.fg(SemanticToken::Warning)),
    );
    frame.render_widget(widget, area);
}

fn render_list(frame: &mut Frame<'_>, area: Rect, view: &FrameView, theme: &Theme) {
    let inner_width = usize::from(area.width.saturating_sub(2));
    let items: Vec<ListItem<'_>> = view
        .rows
        .iter()
        .map(|row| {
            let value = row.latest.map_or_else(String::new, format_value);
            let name_width = inner_width.saturating_sub(value.chars().count() + 1);
            let name = ellipsize(&row.name, name_width);
            let pad = inner_width.saturating_sub(name.chars().count() + value.chars().count());
            let text = format!("{name}{}{value}", " ".repeat(pad));
            let style = if row.selected {
                theme.selection()
            } else {
                Style::default()
            };
            ListItem::new(Line::from(text)).style(style)
        })
        .collect();

    let title = if view.filtered_total == view.names_total {
        format!("Metrics ({})", view.names_total)
    } else {
        format!("Metrics ({}/{})", view.filtered_total, view.names_total)
    };

    if items.is_empty() {
        let hint = if view.names_total == 0 {
            "waiting for metrics…"
        } else {
            "no metric matches the filter"
        };
        let widget = Paragraph::new(hint)
            .style(theme.fg(SemanticToken::Muted))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(widget, area);
        return;
    }

    let widget = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(widget, area);
}

fn render_chart(frame: &mut Frame<'_>, area: Rect, view: &FrameView, theme: &Theme) {
    let Some(chart) = &view.chart else {
        let widget = Paragraph::new("Select a metric to view")
            .style(theme.fg(SemanticToken::Muted))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Chart"));
        frame.render_widget(widget, area);
        return;
    };

    let data = &chart.data;
    let mode = if data.is_bucketed() { ", min/max" } else { "" };
    let title = Line::from(vec![
        Span::styled(
            chart.name.clone(),
            theme.fg(SemanticToken::Accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" ({} pts{mode})", data.total_points)),
        Span::styled(
            non_finite_badge(data.non_finite),
            theme.fg(SemanticToken::Warning),
        ),
    ]);
    let block = Block::default().borders(Borders::ALL).title(title);

    let Some([y_lo, y_hi]) = data.y_bounds else {
        let widget = Paragraph::new("no finite values to plot")
            .style(theme.fg(SemanticToken::Warning))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(widget, area);
        return;
    };

    let datasets = match &data.trace {
        ChartTrace::Direct(points) => vec![
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(theme.fg(SemanticToken::Accent))
                .data(points),
        ],
        ChartTrace::MinMax { min, max } => vec![
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(theme.fg(SemanticToken::Accent))
                .data(max),
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(theme.fg(SemanticToken::Muted))
                .data(min),
        ],
    };

    let step_label = |step: Option<u64>| step.map_or_else(String::new, |s| format!("step {s}"));
    let x_axis = Axis::default()
        .style(theme.fg(SemanticToken::Muted))
        .bounds(data.x_bounds)
        .labels(vec![step_label(data.first_step), step_label(data.last_step)]);
    let y_axis = Axis::default()
        .style(theme.fg(SemanticToken::Muted))
        .bounds([y_lo, y_hi])
        .labels(vec![
            format_value(y_lo),
            format_value((y_lo + y_hi) / 2.0),
            format_value(y_hi),
        ]);

    let widget = Chart::new(datasets)
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis);
    frame.render_widget(widget, area);
}

fn render_logs(frame: &mut Frame<'_>, area: Rect, entries: &[LogEntry], theme: &Theme) {
    let items: Vec<ListItem<'_>> = entries
        .iter()
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("[{}] ", clock_time(entry.recorded_at)),
                    theme.fg(SemanticToken::Muted),
                ),
                Span::styled(format!("{:<5} ", entry.level.label()), theme.level(entry.level)),
                Span::styled(entry.text.clone(), theme.level(entry.level)),
            ]))
        })
        .collect();
    let widget = List::new(items).block(Block::default().borders(Borders::ALL).title("Logs"));
    frame.render_widget(widget, area);
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, mode: UiMode, theme: &Theme) {
    let mut spans = Vec::new();
    for binding in help_bindings(mode) {
        spans.push(Span::styled(
            format!(" {} ", binding.keys),
            theme.fg(SemanticToken::Accent).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("{} ", binding.description),
            theme.fg(SemanticToken::Muted),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Flatten a buffer into newline-separated rows of symbols.
#[must_use]
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let width = usize::from(buffer.area.width.max(1));
    buffer
        .content
        .chunks(width)
        .map(|row| row.iter().map(ratatui::buffer::Cell::symbol).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render one frame of the stores' current state into plain text.
///
/// Used for headless snapshots; `router` provides selection and filter.
pub fn render_to_string(
    metrics: &MetricStore,
    logs: &LogStore,
    router: &mut InputRouter,
    params: LayoutParams,
    theme: &Theme,
    cols: u16,
    rows: u16,
) -> std::io::Result<String> {
    let mut terminal = Terminal::new(TestBackend::new(cols, rows))?;
    router.sync_names(&metrics.names());
    let area = Rect::new(0, 0, cols, rows);
    let layout = build_layout(area, router.state().mode(), params);
    let view = layout.map(|layout| {
        router.set_page_rows(layout.list_rows());
        router.state_mut().ensure_visible(layout.list_rows());
        FrameView::capture(metrics, logs, router, &layout)
    });
    terminal.draw(|frame| render_frame(frame, layout.as_ref().zip(view.as_ref()), theme))?;
    Ok(buffer_to_string(terminal.backend().buffer()))
}
