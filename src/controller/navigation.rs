//! Navigation between the browse and player views

use crate::error::SessionError;
use crate::model::{BrowseEntry, FolderContext, MediaId, NavigationAction, PlaybackSession, ViewTag};
use super::AppController;

impl AppController {
    /// Carry out a navigation action. Errors are reported to the user.
    pub async fn navigate(&self, action: NavigationAction) {
        match action.view {
            ViewTag::Browse => self.show_folder(action.context).await,
            ViewTag::MediaPlayer => match action.media_id {
                Some(media_id) => self.open_media(action.context, media_id).await,
                None => tracing::warn!("Media player action without a media id"),
            },
        }
    }

    async fn show_folder(&self, context: FolderContext) {
        self.close_session().await;
        self.model.set_active_view(ViewTag::Browse).await;

        if context.cache.is_empty().await {
            tracing::info!(folder = ?context.folder_id, "Starting a new browsing lineage");
        }
        let cached = context.cache.contains(context.folder_id).await;
        if !cached {
            self.model.set_browse_loading(true).await;
        }
        tracing::debug!(folder = ?context.folder_id, cached, "Showing folder");
        match context.cache.ensure_fetched(self.library.as_ref(), context.folder_id).await {
            Ok(listing) => {
                let cached_folders = context.cache.len().await;
                tracing::info!(
                    folder = ?context.folder_id,
                    entries = listing.folders.len() + listing.media.len(),
                    cached_folders,
                    "Folder shown"
                );
                self.model.show_listing(context, listing).await;
            }
            Err(e) => {
                self.model.set_browse_loading(false).await;
                self.report("Browsing folder", &anyhow::Error::from(e)).await;
            }
        }
    }

    async fn open_media(&self, context: FolderContext, media_id: MediaId) {
        self.close_session().await;

        let mut session = PlaybackSession::new(
            context,
            media_id,
            self.variant,
            self.library.clone(),
            self.backend.clone(),
        );
        let cancel = session.cancel_handle();
        *self.session_cancel.lock().await = Some(cancel.clone());
        self.model.set_browse_loading(true).await;

        let started = session.start().await;

        let mut slot = self.session.lock().await;
        if cancel.is_cancelled() {
            // Superseded while starting
            drop(slot);
            if let Err(e) = session.dispose().await {
                tracing::warn!(media_id, error = %e, "Disposing superseded session failed");
            }
            return;
        }

        self.model.set_browse_loading(false).await;
        match started {
            Ok(()) => {
                self.model.update_from_session(&session).await;
                *slot = Some(session);
                drop(slot);
                self.model.set_active_view(ViewTag::MediaPlayer).await;
                tracing::info!(media_id, "Player view opened");
            }
            Err(e) => {
                drop(slot);
                if !matches!(e.downcast_ref::<SessionError>(), Some(SessionError::Disposed)) {
                    self.report("Opening media", &e).await;
                }
            }
        }
    }

    /// Cancel and dispose the live session, if any
    pub(crate) async fn close_session(&self) {
        if let Some(cancel) = self.session_cancel.lock().await.take() {
            cancel.cancel();
        }
        let session = self.session.lock().await.take();
        if let Some(mut session) = session {
            tracing::debug!(
                media_id = session.media_id(),
                folder = ?session.context().folder_id,
                "Closing playback session"
            );
            if let Err(e) = session.dispose().await {
                self.report("Stopping player", &e).await;
            }
        }
        self.model.clear_player().await;
    }

    /// Open the entry under the cursor in the browse view
    pub async fn open_selected_entry(&self) {
        let Some(entry) = self.model.get_selected_entry().await else {
            return;
        };
        let context = self.model.browse_context().await;
        self.navigate(NavigationAction::for_entry(&context, &entry)).await;
    }

    /// Go to the parent folder; no-op at the root
    pub async fn open_parent_folder(&self) {
        if let Some(parent @ BrowseEntry::Parent { .. }) = self.model.parent_entry().await {
            let context = self.model.browse_context().await;
            self.navigate(NavigationAction::for_entry(&context, &parent)).await;
        }
    }

    /// Leave the player and return to the folder it was opened from
    pub async fn back_to_folder(&self) {
        let action = {
            let slot = self.session.lock().await;
            match slot.as_ref() {
                Some(session) => session.back_to_folder(),
                None => NavigationAction::browse(self.model.browse_context().await),
            }
        };
        self.navigate(action).await;
    }
}
