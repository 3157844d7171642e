//! Player control edits and reloads

use anyhow::Result;

use crate::model::PlayerControl;
use super::AppController;

impl AppController {
    /// Step the focused control to its next (or previous) value and reload
    pub async fn edit_focused_control(&self, forward: bool) {
        let focused = self.model.get_player_state().await.focused;
        if let Err(e) = self.edit_control(focused, forward).await {
            self.report("Reloading player", &e).await;
            self.back_to_folder().await;
        }
    }

    /// Flip the raw file checkbox wherever the focus is
    pub async fn toggle_raw(&self) {
        if let Err(e) = self.edit_control(PlayerControl::Raw, true).await {
            self.report("Reloading player", &e).await;
            self.back_to_folder().await;
        }
    }

    async fn edit_control(&self, control: PlayerControl, forward: bool) -> Result<()> {
        let mut slot = self.session.lock().await;
        let Some(session) = slot.as_mut() else {
            return Ok(());
        };
        let (Some(mut controls), Some(caps)) = (session.controls().cloned(), session.capabilities()) else {
            return Ok(());
        };

        if !controls.step(control, &caps, forward) {
            tracing::debug!(control = control.label(), "Control unchanged");
            return Ok(());
        }
        tracing::debug!(control = control.label(), value = %controls.display(control), "Control edited");

        let result = session.reload(controls).await;
        self.model.update_from_session(session).await;
        result
    }

    /// Rebuild the player from the current control values
    pub async fn reload(&self) {
        if let Err(e) = self.reload_current().await {
            self.report("Reloading player", &e).await;
            self.back_to_folder().await;
        }
    }

    async fn reload_current(&self) -> Result<()> {
        let mut slot = self.session.lock().await;
        let Some(session) = slot.as_mut() else {
            return Ok(());
        };
        let Some(controls) = session.controls().cloned() else {
            return Ok(());
        };
        let result = session.reload(controls).await;
        self.model.update_from_session(session).await;
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::{AppModel, FolderContext, NavigationAction, SessionPhase, ViewTag};
    use crate::player::PlayerVariant;
    use crate::testing::{PlayerLog, RecordingBackend, ScriptedLibrary};

    async fn playing(variant: PlayerVariant) -> (AppController, RecordingBackend) {
        let library = Arc::new(ScriptedLibrary::new());
        let backend = RecordingBackend::new();
        let controller = AppController::new(
            Arc::new(AppModel::new("")),
            library,
            Arc::new(backend.clone()),
            variant,
        );
        controller
            .navigate(NavigationAction::media_player(FolderContext::at(None), 42))
            .await;
        (controller, backend)
    }

    #[tokio::test]
    async fn editing_a_control_reloads_the_player() {
        let (controller, backend) = playing(PlayerVariant::Plain).await;

        // bitrates [4200, 250, 500, 1000], starting at 500
        controller.edit_focused_control(true).await;

        let player = controller.model.get_player_state().await;
        assert_eq!(player.controls.as_ref().map(|c| c.bitrate), Some(1000));
        assert_eq!(
            backend.log(),
            vec![
                PlayerLog::Attached("/stream/42.m3u8?br=500&res=360p&lang=en".to_string()),
                PlayerLog::Destroyed("/stream/42.m3u8?br=500&res=360p&lang=en".to_string()),
                PlayerLog::Attached("/stream/42.m3u8?br=1000&res=360p&lang=en".to_string()),
            ]
        );
        assert_eq!(backend.max_live(), 1);
    }

    #[tokio::test]
    async fn raw_toggle_reloads_and_locks_controls() {
        let (controller, backend) = playing(PlayerVariant::Plain).await;
        for _ in 0..3 {
            controller.model.focus_next_control().await;
        }
        assert_eq!(controller.model.get_player_state().await.focused, PlayerControl::Raw);

        controller.edit_focused_control(true).await;
        assert_eq!(
            backend.last_source().map(|s| s.url),
            Some("/stream/42.mp4?br=500&res=360p&lang=en".to_string())
        );

        controller.model.focus_prev_control().await;
        controller.edit_focused_control(true).await;
        assert_eq!(backend.log().len(), 3, "language is locked while raw is on");
    }

    #[tokio::test]
    async fn explicit_reload_restarts_same_stream() {
        let (controller, backend) = playing(PlayerVariant::Subtitled).await;
        controller.reload().await;

        let log = backend.log();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0], log[2]);
        assert_eq!(backend.live(), 1);
        assert_eq!(controller.model.get_player_state().await.phase, SessionPhase::Ready);
    }

    #[tokio::test]
    async fn failed_reload_returns_to_folder() {
        let (controller, backend) = playing(PlayerVariant::Plain).await;
        backend.fail_next_attach();

        controller.edit_focused_control(false).await;

        assert_eq!(backend.live(), 0);
        assert!(controller.model.has_error().await);
        assert_eq!(controller.model.active_view().await, ViewTag::Browse);
        assert_eq!(controller.model.get_player_state().await.controls, None);
    }
}
