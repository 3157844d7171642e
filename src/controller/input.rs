//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{BrowseEntry, ViewTag};
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        let model = &self.model;

        // Handle error message first (blocks all other interactions)
        if model.has_error().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                model.clear_error().await;
            }
            return Ok(());
        }

        // Handle help popup
        if model.is_help_popup_open().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?')) {
                model.hide_help_popup().await;
            }
            return Ok(());
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
                return Ok(());
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                model.set_should_quit(true).await;
                return Ok(());
            }
            KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => {
                model.show_help_popup().await;
                return Ok(());
            }
            _ => {}
        }

        match model.active_view().await {
            ViewTag::Browse => self.handle_browse_key(key).await,
            ViewTag::MediaPlayer => self.handle_player_key(key).await,
        }
        Ok(())
    }

    async fn handle_browse_key(&self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.model.browse_move_up().await,
            KeyCode::Down | KeyCode::Char('j') => self.model.browse_move_down().await,
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                if let Some(BrowseEntry::Media { .. }) = self.model.get_selected_entry().await {
                    // Started in the background so Esc can abandon it
                    let controller = self.clone();
                    tokio::spawn(async move {
                        controller.open_selected_entry().await;
                    });
                } else {
                    self.open_selected_entry().await;
                }
            }
            KeyCode::Backspace | KeyCode::Left => self.open_parent_folder().await,
            KeyCode::Esc => {
                self.close_session().await;
                self.model.set_browse_loading(false).await;
            }
            _ => {}
        }
    }

    async fn handle_player_key(&self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::BackTab | KeyCode::Char('k') => self.model.focus_prev_control().await,
            KeyCode::Down | KeyCode::Tab | KeyCode::Char('j') => self.model.focus_next_control().await,
            KeyCode::Left => self.edit_focused_control(false).await,
            KeyCode::Right | KeyCode::Enter => self.edit_focused_control(true).await,
            KeyCode::Char(' ') => self.toggle_raw().await,
            KeyCode::Char('r') | KeyCode::Char('R') => self.reload().await,
            KeyCode::Esc | KeyCode::Backspace => self.back_to_folder().await,
            _ => {}
        }
    }
}
