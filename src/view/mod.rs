//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (truncation, scrollable lists)
//! - `layout`: Main layout structure (top bar, status bar)
//! - `browse`: Folder listing
//! - `player`: Player panel with the playback controls
//! - `overlays`: Modal overlays (error, help)

mod utils;
mod layout;
mod browse;
mod player;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{BrowseState, PlayerViewState, UiState, ViewTag};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, ui_state: &UiState, browse: &BrowseState, player: &PlayerViewState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Server + current folder
                Constraint::Min(0),    // Listing or player
                Constraint::Length(3), // Status line
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state, browse);

        match ui_state.active_view {
            ViewTag::Browse => browse::render_listing(frame, chunks[1], browse),
            ViewTag::MediaPlayer => player::render_player(frame, chunks[1], player),
        }

        layout::render_status_bar(frame, chunks[2], ui_state, browse, player);

        // Error notification overlay (if there's an error)
        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }

        // Help popup overlay (if open)
        if ui_state.show_help_popup {
            overlays::render_help_popup(frame, ui_state.active_view);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::model::{FolderContext, FolderListing, PlaybackSession};
    use crate::player::PlayerVariant;
    use crate::testing::{RecordingBackend, ScriptedLibrary};

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn draw(ui: &UiState, browse: &BrowseState, player: &PlayerViewState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| AppView::render(f, ui, browse, player)).unwrap();
        screen(&terminal)
    }

    #[test]
    fn renders_folder_listing() {
        let listing: FolderListing =
            serde_json::from_str(&ScriptedLibrary::default_listing(Some(3))).unwrap();
        let browse = BrowseState {
            context: FolderContext::at(Some(3)),
            entries: listing.entries(),
            listing: Some(Arc::new(listing)),
            ..Default::default()
        };
        let ui = UiState {
            server: "http://media.local:8069".to_string(),
            ..Default::default()
        };

        let text = draw(&ui, &browse, &PlayerViewState::default());
        assert!(text.contains("/srv/3"));
        assert!(text.contains("sub31/"));
        assert!(text.contains("video301.mkv"));
        assert!(text.contains("media.local"));
    }

    #[tokio::test]
    async fn renders_player_controls_for_variant() {
        let library = Arc::new(ScriptedLibrary::new());
        let backend = Arc::new(RecordingBackend::new());
        let mut session = PlaybackSession::new(
            FolderContext::at(None),
            42,
            PlayerVariant::Subtitled,
            library,
            backend,
        );
        session.start().await.unwrap();
        let mut player = PlayerViewState::default();
        player.refresh_from(&session);
        let ui = UiState {
            active_view: ViewTag::MediaPlayer,
            ..Default::default()
        };

        let text = draw(&ui, &BrowseState::default(), &player);
        assert!(text.contains("heat"));
        assert!(text.contains("500 kb/s"));
        assert!(text.contains("heat.en.srt"));
        assert!(text.contains("/stream/42.m3u8?br=500&res=360p&lang=en"));
    }

    #[test]
    fn renders_error_overlay() {
        let ui = UiState {
            error_message: Some("Server error: nope".to_string()),
            ..Default::default()
        };
        let text = draw(&ui, &BrowseState::default(), &PlayerViewState::default());
        assert!(text.contains("Server error: nope"));
    }
}
