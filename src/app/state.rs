//! App state - pure data structure with no I/O logic

use crate::app::form::TurfForm;
use crate::messages::ui_events::{AppTab, InputMode};
use crate::messages::RenderState;
use crate::models::TurfId;
use crate::store::ListingStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// One-line message shown in the status bar
#[derive(Clone, Debug, PartialEq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    pub fn info(text: impl Into<String>) -> Self {
        Status {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Status {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Status {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

/// The browse tab while it is mounted. Dropped when the tab is left.
#[derive(Debug, Default)]
pub struct BrowseScreen {
    pub store: ListingStore,
    pub selected: usize,
}

impl BrowseScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_id(&self) -> Option<TurfId> {
        self.store.items().get(self.selected).map(|t| t.id)
    }

    /// Keep the selection inside the list after removals
    pub fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.store.len().saturating_sub(1));
    }
}

/// Main application state - pure data, no I/O
pub struct AppState {
    // Tab navigation
    pub active_tab: AppTab,
    pub input_mode: InputMode,

    // Browse tab, `None` while unmounted
    pub browse: Option<BrowseScreen>,

    // Create tab
    pub create_form: TurfForm,
    pub pending_create: Option<u64>,

    // Edit overlay on the browse tab
    pub edit_form: Option<TurfForm>,
    pub pending_update: Option<u64>,

    // Delete confirmation
    pub confirm_delete: Option<TurfId>,

    pub next_request_id: u64,
    pub status: Option<Status>,
    pub show_help: bool,

    // Connection info for the status bar
    pub api_base_url: String,
    pub authenticated: bool,
}

impl AppState {
    pub fn new(api_base_url: impl Into<String>, authenticated: bool) -> Self {
        AppState {
            active_tab: AppTab::Browse,
            input_mode: InputMode::Normal,
            browse: None,
            create_form: TurfForm::create(),
            pending_create: None,
            edit_form: None,
            pending_update: None,
            confirm_delete: None,
            next_request_id: 1,
            status: None,
            show_help: false,
            api_base_url: api_base_url.into(),
            authenticated,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        let (items, selected, phase, is_loading) = match &self.browse {
            Some(browse) => (
                browse.store.items().to_vec(),
                browse.selected,
                browse.store.phase(),
                browse.store.is_loading(),
            ),
            None => (Vec::new(), 0, crate::store::Phase::Empty, false),
        };

        let confirm_delete = self.confirm_delete.and_then(|id| {
            self.browse
                .as_ref()
                .and_then(|b| b.store.get(id))
                .cloned()
        });

        RenderState {
            active_tab: self.active_tab,
            input_mode: self.input_mode,
            items,
            selected,
            phase,
            is_loading,
            create_form: self.create_form.clone(),
            create_pending: self.pending_create.is_some(),
            edit_form: self.edit_form.clone(),
            edit_pending: self.pending_update.is_some(),
            confirm_delete,
            show_help: self.show_help,
            status: self.status.clone(),
            api_base_url: self.api_base_url.clone(),
            authenticated: self.authenticated,
        }
    }
}
