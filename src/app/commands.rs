//! Command handlers - business logic for processing UI events

use crate::app::form::{FormMode, TurfForm};
use crate::app::state::{BrowseScreen, Status, StatusKind};
use crate::app::AppState;
use crate::constants::PREFETCH_THRESHOLD;
use crate::messages::ui_events::{AppTab, InputMode};
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::{TurfId, TurfPatch};
use crate::store::ListingError;

impl AppState {
    // ========================
    // Tabs
    // ========================

    pub fn switch_tab(&mut self, tab: AppTab) -> Option<NetworkCommand> {
        if tab == self.active_tab {
            return None;
        }
        self.active_tab = tab;
        self.input_mode = InputMode::Normal;
        self.edit_form = None;
        self.confirm_delete = None;

        match tab {
            AppTab::Browse => self.mount_browse(),
            AppTab::Create => {
                if self.browse.take().is_some() {
                    tracing::debug!("Browse screen unmounted, listing cache dropped");
                }
                None
            }
        }
    }

    /// Fresh store for the browse tab, starting at page 1
    pub fn mount_browse(&mut self) -> Option<NetworkCommand> {
        self.browse = Some(BrowseScreen::new());
        self.request_next_page()
    }

    /// Ask for the next page unless one is already on its way
    pub fn request_next_page(&mut self) -> Option<NetworkCommand> {
        let ticket = self.browse.as_mut()?.store.begin_fetch()?;
        tracing::debug!(page = ticket.page(), "Requesting page");
        Some(NetworkCommand::FetchPage { ticket })
    }

    // ========================
    // Browse list
    // ========================

    pub fn select_next(&mut self) -> Option<NetworkCommand> {
        let browse = self.browse.as_mut()?;
        if browse.selected + 1 < browse.store.len() {
            browse.selected += 1;
        }
        let near_end = browse.selected + PREFETCH_THRESHOLD >= browse.store.len();
        if near_end {
            self.request_next_page()
        } else {
            None
        }
    }

    pub fn select_prev(&mut self) {
        if let Some(browse) = self.browse.as_mut() {
            browse.selected = browse.selected.saturating_sub(1);
        }
    }

    /// Pull-to-refresh: drop the cache and start again from page 1
    pub fn refresh(&mut self) -> Option<NetworkCommand> {
        let browse = self.browse.as_mut()?;
        browse.store.reset();
        browse.selected = 0;
        self.status = Some(Status::info("Refreshing..."));
        self.request_next_page()
    }

    pub fn open_edit(&mut self) {
        let Some(browse) = self.browse.as_ref() else {
            return;
        };
        if let Some(turf) = browse.store.items().get(browse.selected) {
            self.edit_form = Some(TurfForm::edit(turf));
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit_form = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn request_delete(&mut self) {
        self.confirm_delete = self.browse.as_ref().and_then(BrowseScreen::selected_id);
    }

    pub fn confirm_delete(&mut self) -> Option<NetworkCommand> {
        let turf_id = self.confirm_delete.take()?;
        let id = self.next_id();
        self.status = Some(Status::info(format!("Deleting turf #{}...", turf_id)));
        Some(NetworkCommand::DeleteTurf { id, turf_id })
    }

    pub fn cancel_delete(&mut self) {
        self.confirm_delete = None;
    }

    // ========================
    // Form editing
    // ========================

    /// The edit overlay when open, otherwise the create form on its tab
    fn active_form_mut(&mut self) -> Option<&mut TurfForm> {
        if self.edit_form.is_some() {
            return self.edit_form.as_mut();
        }
        (self.active_tab == AppTab::Create).then_some(&mut self.create_form)
    }

    pub fn start_editing(&mut self) {
        if self.active_form_mut().is_some() {
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn next_field(&mut self) {
        if let Some(form) = self.active_form_mut() {
            form.next_field();
        }
    }

    pub fn prev_field(&mut self) {
        if let Some(form) = self.active_form_mut() {
            form.prev_field();
        }
    }

    pub fn enter_char(&mut self, c: char) {
        if let Some(form) = self.active_form_mut() {
            form.push_char(c);
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(form) = self.active_form_mut() {
            form.backspace();
        }
    }

    /// Validate the active form and turn it into a request
    pub fn submit(&mut self) -> Option<NetworkCommand> {
        if let Some(form) = &self.edit_form {
            if self.pending_update.is_some() {
                return None;
            }
            let FormMode::Edit(original) = &form.mode else {
                return None;
            };
            let turf_id = original.id;

            return match form.to_patch() {
                Err(e) => {
                    self.status = Some(Status::error(e.to_string()));
                    None
                }
                Ok(None) => {
                    self.cancel_edit();
                    self.status = Some(Status::info("No changes to save"));
                    None
                }
                Ok(Some(patch)) => {
                    let id = self.next_id();
                    self.pending_update = Some(id);
                    self.status = Some(Status::info("Saving changes..."));
                    Some(NetworkCommand::UpdateTurf { id, turf_id, patch })
                }
            };
        }

        if self.active_tab != AppTab::Create || self.pending_create.is_some() {
            return None;
        }
        match self.create_form.to_draft() {
            Err(e) => {
                self.status = Some(Status::error(e.to_string()));
                None
            }
            Ok(draft) => {
                let id = self.next_id();
                self.pending_create = Some(id);
                self.status = Some(Status::info("Please wait..."));
                Some(NetworkCommand::CreateTurf { id, draft })
            }
        }
    }

    // ========================
    // Popups
    // ========================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    // ========================
    // Network responses
    // ========================

    pub fn handle_response(&mut self, response: NetworkResponse) {
        match response {
            NetworkResponse::PageFetched { ticket, result } => {
                let Some(browse) = self.browse.as_mut() else {
                    tracing::debug!(page = ticket.page(), "Dropping page for unmounted browse screen");
                    return;
                };
                match browse.store.complete_fetch(ticket, result) {
                    Ok(page) if page.is_empty() && browse.store.is_empty() => {
                        self.status = Some(Status::info("No turfs listed yet"));
                    }
                    Ok(_) => {
                        if matches!(self.status, Some(ref s) if s.kind != StatusKind::Success) {
                            self.status = None;
                        }
                    }
                    Err(ListingError::Discarded { .. }) => {}
                    Err(e) => {
                        tracing::warn!(page = ticket.page(), error = %e, "Page fetch failed");
                        self.status = Some(Status::error(format!(
                            "Could not load page {}: {} (r to retry)",
                            ticket.page(),
                            e
                        )));
                    }
                }
            }

            NetworkResponse::Created { id, result } => {
                if self.pending_create != Some(id) {
                    return;
                }
                self.pending_create = None;
                match result {
                    Ok(turf) => {
                        tracing::info!(id = turf.id, name = %turf.name, "Turf created");
                        self.create_form.clear();
                        if self.active_tab == AppTab::Create {
                            self.input_mode = InputMode::Normal;
                        }
                        self.status = Some(Status::success("Your turf has been created successfully!"));
                    }
                    Err(e) => {
                        self.status = Some(Status::error(format!("Failed to create your turf: {}", e)));
                    }
                }
            }

            NetworkResponse::Updated { id, turf_id, result } => {
                if self.pending_update == Some(id) {
                    self.pending_update = None;
                }
                match result {
                    Ok(turf) => {
                        self.reconcile_update(turf_id, TurfPatch::from(turf));
                        if self.editing_turf() == Some(turf_id) {
                            self.cancel_edit();
                        }
                    }
                    Err(e) => {
                        self.status = Some(Status::error(format!("Update failed: {}", e)));
                    }
                }
            }

            NetworkResponse::Deleted { id: _, turf_id, result } => match result {
                Ok(()) | Err(ListingError::NotFound(_)) => self.reconcile_delete(turf_id),
                Err(e) => {
                    self.status = Some(Status::error(format!("Delete failed: {}", e)));
                }
            },
        }
    }

    fn editing_turf(&self) -> Option<TurfId> {
        match self.edit_form.as_ref().map(|f| &f.mode) {
            Some(FormMode::Edit(turf)) => Some(turf.id),
            _ => None,
        }
    }

    fn reconcile_update(&mut self, turf_id: TurfId, patch: TurfPatch) {
        let saved = Status::success(format!("Saved turf #{}", turf_id));
        let Some(browse) = self.browse.as_mut() else {
            self.status = Some(saved);
            return;
        };
        match browse.store.apply_update(turf_id, &patch) {
            Ok(turf) => {
                self.status = Some(Status::success(format!("Saved {}", turf.name)));
            }
            Err(ListingError::NotFound(_)) => {
                tracing::debug!(turf_id, "Updated listing is no longer cached");
                self.status = Some(saved);
            }
            Err(e) => {
                tracing::warn!(turf_id, error = %e, "Could not reconcile update");
                self.status = Some(Status::error(e.to_string()));
            }
        }
    }

    fn reconcile_delete(&mut self, turf_id: TurfId) {
        let Some(browse) = self.browse.as_mut() else {
            return;
        };
        match browse.store.apply_delete(turf_id) {
            Ok(()) | Err(ListingError::NotFound(_)) => {
                browse.clamp_selection();
                self.status = Some(Status::success(format!("Deleted turf #{}", turf_id)));
            }
            Err(e) => {
                self.status = Some(Status::error(e.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sample_turf, Turf};

    fn state() -> AppState {
        AppState::new("http://127.0.0.1:8000/api", true)
    }

    fn deliver(state: &mut AppState, cmd: Option<NetworkCommand>, items: Vec<Turf>) {
        let Some(NetworkCommand::FetchPage { ticket }) = cmd else {
            panic!("expected a page fetch, got {:?}", cmd);
        };
        state.handle_response(NetworkResponse::PageFetched {
            ticket,
            result: Ok(items),
        });
    }

    fn loaded(ids: &[u64]) -> AppState {
        let mut state = state();
        let cmd = state.mount_browse();
        deliver(&mut state, cmd, ids.iter().map(|&id| sample_turf(id, 300.0)).collect());
        state
    }

    #[test]
    fn test_mount_loads_first_page() {
        let state = loaded(&[1, 2]);
        let render = state.to_render_state();
        assert_eq!(render.items.len(), 2);
        assert_eq!(render.phase, crate::store::Phase::Loaded);
        assert!(!render.is_loading);
    }

    #[test]
    fn test_scrolling_near_end_requests_once() {
        let mut state = loaded(&[1, 2]);
        let cmd = state.select_next();
        assert!(matches!(cmd, Some(NetworkCommand::FetchPage { ticket }) if ticket.page() == 2));
        // Repeated trigger while pending is coalesced
        assert!(state.select_next().is_none());
        assert!(state.to_render_state().is_loading);
    }

    #[test]
    fn test_page_for_unmounted_screen_is_dropped() {
        let mut state = state();
        let stale = state.mount_browse();
        state.switch_tab(AppTab::Create);
        let fresh = state.switch_tab(AppTab::Browse);

        deliver(&mut state, stale, vec![sample_turf(99, 1.0)]);
        assert!(state.to_render_state().items.is_empty());

        deliver(&mut state, fresh, vec![sample_turf(1, 1.0)]);
        assert_eq!(state.to_render_state().items[0].id, 1);
    }

    #[test]
    fn test_fetch_error_sets_status() {
        let mut state = state();
        let Some(NetworkCommand::FetchPage { ticket }) = state.mount_browse() else {
            panic!("expected fetch");
        };
        state.handle_response(NetworkResponse::PageFetched {
            ticket,
            result: Err(ListingError::fetch_failed("Connection failed")),
        });
        assert_eq!(state.status.as_ref().unwrap().kind, StatusKind::Error);
        // Retry is allowed right away
        assert!(state.request_next_page().is_some());
    }

    #[test]
    fn test_edit_submit_and_reconcile() {
        let mut state = loaded(&[1, 2]);
        state.open_edit();
        assert_eq!(state.input_mode, InputMode::Editing);

        state.edit_form.as_mut().unwrap().price = String::from("500");
        let Some(NetworkCommand::UpdateTurf { id, turf_id, patch }) = state.submit() else {
            panic!("expected update");
        };
        assert_eq!(turf_id, 1);
        assert_eq!(patch.price, Some(500.0));
        // No double submit while pending
        assert!(state.submit().is_none());

        let mut confirmed = sample_turf(1, 300.0);
        confirmed.merge(&patch);
        state.handle_response(NetworkResponse::Updated {
            id,
            turf_id,
            result: Ok(confirmed),
        });

        assert!(state.edit_form.is_none());
        let render = state.to_render_state();
        assert_eq!(render.items[0].price, 500.0);
        assert_eq!(render.items[0].name, "Turf 1");
        assert_eq!(render.items[1].id, 2);
    }

    #[test]
    fn test_update_confirmed_after_unmount_clears_saving() {
        let mut state = loaded(&[1]);
        state.open_edit();
        state.edit_form.as_mut().unwrap().name = String::from("Arena");
        let Some(NetworkCommand::UpdateTurf { id, turf_id, patch }) = state.submit() else {
            panic!("expected update");
        };
        assert_eq!(state.status.as_ref().unwrap().text, "Saving changes...");

        state.switch_tab(AppTab::Create);
        let mut confirmed = sample_turf(1, 300.0);
        confirmed.merge(&patch);
        state.handle_response(NetworkResponse::Updated {
            id,
            turf_id,
            result: Ok(confirmed),
        });

        let status = state.status.as_ref().unwrap();
        assert_eq!(status.kind, StatusKind::Success);
        assert_eq!(status.text, "Saved turf #1");
        assert!(state.pending_update.is_none());
    }

    #[test]
    fn test_update_for_uncached_listing_clears_saving() {
        let mut state = loaded(&[1]);
        state.pending_update = Some(7);
        state.status = Some(Status::info("Saving changes..."));

        state.handle_response(NetworkResponse::Updated {
            id: 7,
            turf_id: 42,
            result: Ok(sample_turf(42, 100.0)),
        });

        assert_eq!(state.status.as_ref().unwrap().text, "Saved turf #42");
    }

    #[test]
    fn test_edit_refreshes_updated_timestamp() {
        let mut state = loaded(&[1]);
        let mut confirmed = sample_turf(1, 450.0);
        confirmed.updated_at = chrono::DateTime::parse_from_rfc3339("2024-06-01T08:30:00Z")
            .ok()
            .map(|t| t.with_timezone(&chrono::Utc));

        state.handle_response(NetworkResponse::Updated {
            id: 1,
            turf_id: 1,
            result: Ok(confirmed.clone()),
        });

        assert_eq!(state.to_render_state().items[0].updated_at, confirmed.updated_at);
    }

    #[test]
    fn test_unchanged_edit_sends_nothing() {
        let mut state = loaded(&[1]);
        state.open_edit();
        assert!(state.submit().is_none());
        assert!(state.edit_form.is_none());
    }

    #[test]
    fn test_delete_flow() {
        let mut state = loaded(&[1, 2]);
        state.select_next();
        state.request_delete();
        assert_eq!(state.confirm_delete, Some(2));

        let Some(NetworkCommand::DeleteTurf { id, turf_id }) = state.confirm_delete() else {
            panic!("expected delete");
        };
        state.handle_response(NetworkResponse::Deleted {
            id,
            turf_id,
            result: Ok(()),
        });

        let render = state.to_render_state();
        assert_eq!(render.items.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(render.selected, 0);

        // Already gone on the server: treated as done
        state.handle_response(NetworkResponse::Deleted {
            id: 99,
            turf_id: 2,
            result: Err(ListingError::NotFound(2)),
        });
        assert_eq!(state.status.as_ref().unwrap().kind, StatusKind::Success);
    }

    #[test]
    fn test_refresh_resets_pagination() {
        let mut state = loaded(&[1, 2]);
        let cmd = state.refresh();
        assert!(matches!(cmd, Some(NetworkCommand::FetchPage { ticket }) if ticket.page() == 1));
        assert!(state.to_render_state().items.is_empty());
    }

    #[test]
    fn test_create_validation_and_success() {
        let mut state = state();
        state.switch_tab(AppTab::Create);
        assert!(state.browse.is_none());

        assert!(state.submit().is_none());
        assert_eq!(state.status.as_ref().unwrap().text, "Name is required");

        state.create_form.name = String::from("Arena");
        state.create_form.location = String::from("Kilimani");
        state.create_form.description = String::from("Floodlit");
        state.create_form.price = String::from("300");
        let Some(NetworkCommand::CreateTurf { id, draft }) = state.submit() else {
            panic!("expected create");
        };
        assert_eq!(draft.price, 300.0);

        state.handle_response(NetworkResponse::Created {
            id,
            result: Ok(sample_turf(10, 300.0)),
        });
        assert_eq!(state.create_form, TurfForm::create());
        assert_eq!(state.status.as_ref().unwrap().kind, StatusKind::Success);
    }
}
