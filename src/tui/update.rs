//! Pure transition function for the navigation/search state machine.
//!
//! **Design invariant:** this module performs zero I/O. Effects are described
//! as [`UiCmd`] values for the runtime to execute.

use super::input::InputAction;
use super::model::{UiMode, UiState};

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCmd {
    None,
    /// Cancel the render loop after the current frame.
    Quit,
}

/// Apply `action` to `state`. `page_rows` is the list height used by paging.
pub fn apply_input_action(state: &mut UiState, action: InputAction, page_rows: usize) -> UiCmd {
    let page = isize::try_from(page_rows.max(1)).unwrap_or(isize::MAX);
    match action {
        InputAction::Quit => return UiCmd::Quit,
        InputAction::SelectPrev => state.move_selection(-1),
        InputAction::SelectNext => state.move_selection(1),
        InputAction::PagePrev => state.move_selection(-page),
        InputAction::PageNext => state.move_selection(page),
        InputAction::SelectFirst => state.select_first(),
        InputAction::SelectLast => state.select_last(),
        InputAction::Confirm => {}
        InputAction::OpenSearch => {
            state.clear_query();
            state.set_mode(UiMode::Searching);
        }
        InputAction::QueryPush(c) => state.push_query_char(c),
        InputAction::QueryPop => state.pop_query_char(),
        InputAction::CommitSearch => state.set_mode(UiMode::Browsing),
        InputAction::CancelSearch => {
            state.clear_query();
            state.set_mode(UiMode::Browsing);
        }
    }
    UiCmd::None
}
