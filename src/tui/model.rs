//! Render-loop-owned UI state.
//!
//! [`UiState`] lives on the dashboard thread only and is passed through the
//! loop as a plain value; producers never touch it.
//!
//! **Design invariant:** no I/O happens here.

/// Input mode of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UiMode {
    #[default]
    Browsing,
    Searching,
}

/// Navigation and search state for the metric list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    mode: UiMode,
    selected_index: usize,
    scroll_offset: usize,
    search_query: String,
    all_names: Vec<String>,
    filtered_names: Vec<String>,
}

impl UiState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn mode(&self) -> UiMode {
        self.mode
    }

    #[must_use]
    pub const fn selected_index(&self) -> usize {
        self.selected_index
    }

    #[must_use]
    pub const fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    #[must_use]
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Names passing the current filter, in first-seen order.
    #[must_use]
    pub fn filtered_names(&self) -> &[String] {
        &self.filtered_names
    }

    /// The metric under the cursor; the selection is the chart view.
    #[must_use]
    pub fn selected_name(&self) -> Option<&str> {
        self.filtered_names
            .get(self.selected_index)
            .map(String::as_str)
    }

    /// Replace the underlying name set with a fresh store snapshot.
    ///
    /// Returns `true` when the set changed and the filter was recomputed.
    pub fn sync_names(&mut self, names: &[String]) -> bool {
        if self.all_names == names {
            return false;
        }
        self.all_names = names.to_vec();
        self.refilter();
        true
    }

    pub(crate) fn set_mode(&mut self, mode: UiMode) {
        self.mode = mode;
    }

    pub(crate) fn move_selection(&mut self, delta: isize) {
        let Some(last) = self.filtered_names.len().checked_sub(1) else {
            self.selected_index = 0;
            return;
        };
        self.selected_index = self.selected_index.saturating_add_signed(delta).min(last);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected_index = self.filtered_names.len().saturating_sub(1);
    }

    pub(crate) fn push_query_char(&mut self, c: char) {
        self.search_query.push(c);
        self.refilter();
    }

    pub(crate) fn pop_query_char(&mut self) {
        if self.search_query.pop().is_some() {
            self.refilter();
        }
    }

    pub(crate) fn clear_query(&mut self) {
        self.search_query.clear();
        self.refilter();
    }

    /// Adjust the scroll offset so the selection is inside a window of
    /// `visible_rows` list rows.
    pub fn ensure_visible(&mut self, visible_rows: usize) {
        if visible_rows == 0 {
            self.scroll_offset = self.selected_index;
            return;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + visible_rows {
            self.scroll_offset = self.selected_index + 1 - visible_rows;
        }
        let max_offset = self.filtered_names.len().saturating_sub(visible_rows);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    fn refilter(&mut self) {
        self.filtered_names = filter_names(&self.all_names, &self.search_query);
        if self.selected_index >= self.filtered_names.len() {
            self.selected_index = 0;
        }
        if self.scroll_offset > self.selected_index {
            self.scroll_offset = self.selected_index;
        }
    }
}

/// Names containing `query` case-insensitively, original order kept.
/// An empty query passes everything.
#[must_use]
pub fn filter_names(names: &[String], query: &str) -> Vec<String> {
    if query.is_empty() {
        return names.to_vec();
    }
    let needle = query.to_lowercase();
    names
        .iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn lo_filters_loss_and_lr() {
        let all = names(&["loss", "accuracy", "lr"]);
        assert_eq!(filter_names(&all, "lo"), names(&["loss", "lr"]));
    }

    #[test]
    fn filter_is_case_insensitive_both_ways() {
        let all = names(&["Val_Loss", "train_loss", "ACC"]);
        assert_eq!(filter_names(&all, "LOSS"), names(&["Val_Loss", "train_loss"]));
        assert_eq!(filter_names(&all, "acc"), names(&["ACC"]));
    }

    #[test]
    fn empty_query_passes_everything() {
        let all = names(&["b", "a"]);
        assert_eq!(filter_names(&all, ""), all);
    }

    #[test]
    fn sync_names_reports_changes_only() {
        let mut state = UiState::new();
        assert!(state.sync_names(&names(&["loss"])));
        assert!(!state.sync_names(&names(&["loss"])));
        assert!(state.sync_names(&names(&["loss", "acc"])));
        assert_eq!(state.filtered_names(), names(&["loss", "acc"]).as_slice());
        assert_eq!(state.selected_name(), Some("loss"));
    }

    #[test]
    fn selection_clamps_without_wrapping() {
        let mut state = UiState::new();
        state.sync_names(&names(&["a", "b", "c"]));
        state.move_selection(-1);
        assert_eq!(state.selected_index(), 0);
        state.move_selection(1);
        state.move_selection(1);
        state.move_selection(1);
        assert_eq!(state.selected_index(), 2);
    }

    #[test]
    fn selection_on_empty_list_stays_zero() {
        let mut state = UiState::new();
        state.move_selection(3);
        assert_eq!(state.selected_index(), 0);
        assert_eq!(state.selected_name(), None);
    }

    #[test]
    fn narrowing_filter_resets_out_of_range_selection() {
        let mut state = UiState::new();
        state.sync_names(&names(&["loss", "accuracy", "lr"]));
        state.move_selection(2);
        assert_eq!(state.selected_name(), Some("lr"));
        state.push_query_char('a');
        state.push_query_char('c');
        assert_eq!(state.filtered_names(), names(&["accuracy"]).as_slice());
        assert_eq!(state.selected_index(), 0);
    }

    #[test]
    fn in_range_selection_survives_refilter() {
        let mut state = UiState::new();
        state.sync_names(&names(&["loss", "lr", "accuracy"]));
        state.move_selection(1);
        state.push_query_char('l');
        assert_eq!(state.selected_name(), Some("lr"));
    }

    #[test]
    fn ensure_visible_scrolls_both_directions() {
        let mut state = UiState::new();
        let many: Vec<String> = (0..20).map(|i| format!("m{i}")).collect();
        state.sync_names(&many);
        state.move_selection(12);
        state.ensure_visible(5);
        assert_eq!(state.scroll_offset(), 8);
        state.move_selection(-10);
        state.ensure_visible(5);
        assert_eq!(state.scroll_offset(), 2);
    }

    #[test]
    fn ensure_visible_never_scrolls_past_end() {
        let mut state = UiState::new();
        state.sync_names(&names(&["a", "b", "c"]));
        state.select_last();
        state.ensure_visible(10);
        assert_eq!(state.scroll_offset(), 0);
    }
}
