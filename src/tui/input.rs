//! Input routing for the dashboard: raw key events → UI actions.
//!
//! [`resolve_key_event`] is a pure mapping that depends only on the current
//! [`UiMode`]; [`InputRouter`] pairs it with the [`UiState`] it mutates. Neither
//! performs I/O. Quitting is reported as [`RouterOutcome::Quit`] and turned
//! into a cancellation by the runtime.

#![allow(missing_docs)]

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::model::{UiMode, UiState};
use super::update::{UiCmd, apply_input_action};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    SelectPrev,
    SelectNext,
    PagePrev,
    PageNext,
    SelectFirst,
    SelectLast,
    /// Enter while browsing: the selection already is the view.
    Confirm,
    OpenSearch,
    QueryPush(char),
    QueryPop,
    CommitSearch,
    CancelSearch,
}

/// Map a key event to an action under `mode`. `None` means the key is ignored.
#[must_use]
pub fn resolve_key_event(key: &KeyEvent, mode: UiMode) -> Option<InputAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(InputAction::Quit);
    }
    match mode {
        UiMode::Browsing => resolve_browsing_key(key),
        UiMode::Searching => resolve_searching_key(key),
    }
}

fn resolve_browsing_key(key: &KeyEvent) -> Option<InputAction> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(InputAction::Quit),
        KeyCode::Up | KeyCode::Char('k') => Some(InputAction::SelectPrev),
        KeyCode::Down | KeyCode::Char('j') => Some(InputAction::SelectNext),
        KeyCode::PageUp => Some(InputAction::PagePrev),
        KeyCode::PageDown => Some(InputAction::PageNext),
        KeyCode::Home => Some(InputAction::SelectFirst),
        KeyCode::End => Some(InputAction::SelectLast),
        KeyCode::Enter => Some(InputAction::Confirm),
        KeyCode::Char('/') => Some(InputAction::OpenSearch),
        _ => None,
    }
}

fn resolve_searching_key(key: &KeyEvent) -> Option<InputAction> {
    match key.code {
        KeyCode::Esc => Some(InputAction::CancelSearch),
        KeyCode::Enter => Some(InputAction::CommitSearch),
        KeyCode::Backspace => Some(InputAction::QueryPop),
        KeyCode::Char(c)
            if !c.is_control()
                && !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(InputAction::QueryPush(c))
        }
        _ => None,
    }
}

/// What the runtime must do after a key was routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterOutcome {
    Continue,
    Quit,
}

/// Navigation/search state machine fed by the render loop.
#[derive(Debug, Clone)]
pub struct InputRouter {
    state: UiState,
    page_rows: usize,
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl InputRouter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: UiState::new(),
            page_rows: 1,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &UiState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut UiState {
        &mut self.state
    }

    /// Rows visible in the metric list; PageUp/PageDown move by this much.
    pub fn set_page_rows(&mut self, rows: usize) {
        self.page_rows = rows.max(1);
    }

    /// Refresh the name set from a store snapshot.
    pub fn sync_names(&mut self, names: &[String]) -> bool {
        self.state.sync_names(names)
    }

    /// Route one key event.
    pub fn handle_key(&mut self, key: &KeyEvent) -> RouterOutcome {
        let Some(action) = resolve_key_event(key, self.state.mode()) else {
            return RouterOutcome::Continue;
        };
        match apply_input_action(&mut self.state, action, self.page_rows) {
            UiCmd::None => RouterOutcome::Continue,
            UiCmd::Quit => RouterOutcome::Quit,
        }
    }
}

/// One key binding for the footer hint line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpBinding {
    pub keys: &'static str,
    pub description: &'static str,
}

const BROWSING_BINDINGS: [HelpBinding; 3] = [
    HelpBinding {
        keys: "↑/↓",
        description: "select",
    },
    HelpBinding {
        keys: "/",
        description: "search",
    },
    HelpBinding {
        keys: "q",
        description: "quit",
    },
];

const SEARCHING_BINDINGS: [HelpBinding; 3] = [
    HelpBinding {
        keys: "type",
        description: "filter",
    },
    HelpBinding {
        keys: "Enter",
        description: "keep filter",
    },
    HelpBinding {
        keys: "Esc",
        description: "clear",
    },
];

/// Bindings relevant in `mode`, in display order.
#[must_use]
pub const fn help_bindings(mode: UiMode) -> &'static [HelpBinding] {
    match mode {
        UiMode::Browsing => &BROWSING_BINDINGS,
        UiMode::Searching => &SEARCHING_BINDINGS,
    }
}
