//! Main application model with state management

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use super::content::{BrowseState, PlayerViewState};
use super::context::FolderContext;
use super::session::PlaybackSession;
use super::types::{BrowseEntry, FolderListing, UiState, ViewTag};

/// Seconds an error stays on screen unless dismissed
const ERROR_DISPLAY_SECS: u64 = 5;

/// Main application model containing all state
pub struct AppModel {
    pub ui_state: Arc<Mutex<UiState>>,
    browse_state: Arc<Mutex<BrowseState>>,
    player_state: Arc<Mutex<PlayerViewState>>,
    should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new(server: &str) -> Self {
        Self {
            ui_state: Arc::new(Mutex::new(UiState {
                server: server.to_string(),
                ..UiState::default()
            })),
            browse_state: Arc::new(Mutex::new(BrowseState::default())),
            player_state: Arc::new(Mutex::new(PlayerViewState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn active_view(&self) -> ViewTag {
        self.ui_state.lock().await.active_view
    }

    pub async fn set_active_view(&self, view: ViewTag) {
        let mut state = self.ui_state.lock().await;
        state.active_view = view;
    }

    // ========================================================================
    // Errors & overlays
    // ========================================================================

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() > ERROR_DISPLAY_SECS {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn show_help_popup(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    // ========================================================================
    // Browse view
    // ========================================================================

    pub async fn get_browse_state(&self) -> BrowseState {
        self.browse_state.lock().await.clone()
    }

    /// Context of the folder currently shown
    pub async fn browse_context(&self) -> FolderContext {
        self.browse_state.lock().await.context.clone()
    }

    pub async fn set_browse_loading(&self, loading: bool) {
        let mut state = self.browse_state.lock().await;
        state.is_loading = loading;
    }

    /// Show `listing` for `context`. Re-showing the same folder keeps the selection.
    pub async fn show_listing(&self, context: FolderContext, listing: Arc<FolderListing>) {
        let mut state = self.browse_state.lock().await;
        let same_folder = state.context.folder_id == context.folder_id
            && state.context.cache.shares_storage_with(&context.cache);
        let entries = listing.entries();
        state.selected_index = if same_folder {
            state.selected_index.min(entries.len().saturating_sub(1))
        } else {
            0
        };
        state.context = context;
        state.entries = entries;
        state.listing = Some(listing);
        state.is_loading = false;
    }

    pub async fn browse_move_up(&self) {
        let mut state = self.browse_state.lock().await;
        if state.selected_index > 0 {
            state.selected_index -= 1;
        }
    }

    pub async fn browse_move_down(&self) {
        let mut state = self.browse_state.lock().await;
        if state.selected_index < state.entries.len().saturating_sub(1) {
            state.selected_index += 1;
        }
    }

    pub async fn get_selected_entry(&self) -> Option<BrowseEntry> {
        self.browse_state.lock().await.selected_entry().cloned()
    }

    /// Parent link of the folder currently shown
    pub async fn parent_entry(&self) -> Option<BrowseEntry> {
        let state = self.browse_state.lock().await;
        state
            .entries
            .iter()
            .find(|e| matches!(e, BrowseEntry::Parent { .. }))
            .cloned()
    }

    // ========================================================================
    // Player view
    // ========================================================================

    pub async fn get_player_state(&self) -> PlayerViewState {
        self.player_state.lock().await.clone()
    }

    pub async fn update_from_session(&self, session: &PlaybackSession) {
        let mut state = self.player_state.lock().await;
        state.refresh_from(session);
    }

    pub async fn clear_player(&self) {
        *self.player_state.lock().await = PlayerViewState::default();
    }

    pub async fn focus_next_control(&self) {
        let mut state = self.player_state.lock().await;
        let with_subtitle = state.variant.has_subtitle_control();
        state.focused = state.focused.next(with_subtitle);
    }

    pub async fn focus_prev_control(&self) {
        let mut state = self.player_state.lock().await;
        let with_subtitle = state.variant.has_subtitle_control();
        state.focused = state.focused.prev(with_subtitle);
    }
}
