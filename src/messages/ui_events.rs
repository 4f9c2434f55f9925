//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Application tabs
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum AppTab {
    #[default]
    Browse,
    Create,
}

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Tab navigation
    SwitchTab(AppTab),

    // Browse list
    SelectNext,
    SelectPrev,
    Refresh,
    OpenEdit,
    RequestDelete,
    ConfirmDelete,
    CancelDelete,

    // Form editing
    StartEditing,
    StopEditing,
    NextField,
    PrevField,
    CharInput(char),
    Backspace,
    Submit,
    CancelEdit,

    // Popups
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(
    key: KeyEvent,
    active_tab: AppTab,
    input_mode: InputMode,
    show_help: bool,
    editing_listing: bool,
    confirming_delete: bool,
) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Global Ctrl shortcuts
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return Some(UiEvent::Quit),
            KeyCode::Char('s') if editing_listing || active_tab == AppTab::Create => {
                return Some(UiEvent::Submit)
            }
            _ => {}
        }
    }

    // Popups first
    if show_help {
        return Some(UiEvent::CloseHelp);
    }

    if confirming_delete {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Enter => Some(UiEvent::ConfirmDelete),
            KeyCode::Char('n') | KeyCode::Esc => Some(UiEvent::CancelDelete),
            _ => None,
        };
    }

    if editing_listing {
        return handle_form_keys(key, true);
    }

    // Tab switching: 1 and 2 keys (only in normal mode, not editing)
    if input_mode == InputMode::Normal {
        match key.code {
            KeyCode::Char('1') => return Some(UiEvent::SwitchTab(AppTab::Browse)),
            KeyCode::Char('2') => return Some(UiEvent::SwitchTab(AppTab::Create)),
            _ => {}
        }
    }

    match active_tab {
        AppTab::Browse => handle_browse_keys(key),
        AppTab::Create => match input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => Some(UiEvent::Quit),
                KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
                KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::StartEditing),
                KeyCode::Char('s') => Some(UiEvent::Submit),
                KeyCode::Tab | KeyCode::Down => Some(UiEvent::NextField),
                KeyCode::BackTab | KeyCode::Up => Some(UiEvent::PrevField),
                _ => None,
            },
            InputMode::Editing => handle_form_keys(key, false),
        },
    }
}

/// Handle keys for the listing table
fn handle_browse_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Char('q') => Some(UiEvent::Quit),
        KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
        KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::SelectNext),
        KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::SelectPrev),
        KeyCode::Char('r') => Some(UiEvent::Refresh),
        KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::OpenEdit),
        KeyCode::Char('d') | KeyCode::Delete => Some(UiEvent::RequestDelete),
        _ => None,
    }
}

/// Handle keys while typing into a form field
fn handle_form_keys(key: KeyEvent, overlay: bool) -> Option<UiEvent> {
    match key.code {
        KeyCode::Esc if overlay => Some(UiEvent::CancelEdit),
        KeyCode::Esc => Some(UiEvent::StopEditing),
        KeyCode::Enter if overlay => Some(UiEvent::Submit),
        KeyCode::Enter => Some(UiEvent::StopEditing),
        KeyCode::Tab | KeyCode::Down => Some(UiEvent::NextField),
        KeyCode::BackTab | KeyCode::Up => Some(UiEvent::PrevField),
        KeyCode::Backspace => Some(UiEvent::Backspace),
        KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
        _ => None,
    }
}
