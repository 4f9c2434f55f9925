//! Render state - data structure sent from App layer to UI for rendering

use crate::app::form::TurfForm;
use crate::app::state::Status;
use crate::messages::ui_events::{AppTab, InputMode};
use crate::models::Turf;
use crate::store::Phase;

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    // Tab
    pub active_tab: AppTab,
    pub input_mode: InputMode,

    // Browse list
    pub items: Vec<Turf>,
    pub selected: usize,
    pub phase: Phase,
    pub is_loading: bool,

    // Forms
    pub create_form: TurfForm,
    pub create_pending: bool,
    pub edit_form: Option<TurfForm>,
    pub edit_pending: bool,

    // Popups
    pub confirm_delete: Option<Turf>,
    pub show_help: bool,

    // Status bar
    pub status: Option<Status>,
    pub api_base_url: String,
    pub authenticated: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        use crate::constants::DEFAULT_API_BASE_URL;
        RenderState {
            active_tab: AppTab::Browse,
            input_mode: InputMode::Normal,
            items: Vec::new(),
            selected: 0,
            phase: Phase::Empty,
            is_loading: false,
            create_form: TurfForm::create(),
            create_pending: false,
            edit_form: None,
            edit_pending: false,
            confirm_delete: None,
            show_help: false,
            status: None,
            api_base_url: String::from(DEFAULT_API_BASE_URL),
            authenticated: false,
        }
    }
}
