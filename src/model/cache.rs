//! Cache of browsed folder listings, shared by every view of one browsing lineage

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

use crate::error::LibraryError;
use super::library_client::LibraryService;
use super::types::{FolderId, FolderListing};

type Slot = Arc<OnceCell<Arc<FolderListing>>>;

/// Folder listings keyed by folder id (`None` is the root listing).
///
/// Clones share the same storage. A key only counts as cached once its slot
/// holds a listing. An empty slot is being fetched; a failed fetch drops its
/// slot once no other caller is waiting on it.
#[derive(Clone, Debug, Default)]
pub struct FolderCache {
    slots: Arc<RwLock<HashMap<Option<FolderId>, Slot>>>,
}

impl FolderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the listing for `folder`, fetching and decoding it on a miss.
    ///
    /// Concurrent callers asking for the same uncached folder share one
    /// in-flight request.
    pub async fn ensure_fetched(
        &self,
        service: &dyn LibraryService,
        folder: Option<FolderId>,
    ) -> Result<Arc<FolderListing>, LibraryError> {
        let slot = self.slot(folder).await;

        if let Some(listing) = slot.get() {
            tracing::debug!(folder_id = ?folder, "Folder cache hit");
            return Ok(listing.clone());
        }

        let fetched = slot
            .get_or_try_init(|| async {
                tracing::debug!(folder_id = ?folder, "Folder cache miss, fetching listing");
                let raw = service.browse_folder(folder).await?;
                let listing: FolderListing = serde_json::from_str(&raw)?;
                tracing::info!(
                    folder_id = ?folder,
                    folders = listing.folders.len(),
                    media = listing.media.len(),
                    "Folder listing cached"
                );
                Ok::<_, LibraryError>(Arc::new(listing))
            })
            .await;
        match fetched {
            Ok(listing) => Ok(listing.clone()),
            Err(e) => {
                self.discard_failed(folder, &slot).await;
                Err(e)
            }
        }
    }

    async fn discard_failed(&self, folder: Option<FolderId>, slot: &Slot) {
        let mut slots = self.slots.write().await;
        // Held by the map and by us only; other holders retry the fetch themselves
        let unused = slots
            .get(&folder)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && Arc::strong_count(slot) == 2);
        if unused && !slot.initialized() {
            slots.remove(&folder);
        }
    }

    async fn slot(&self, folder: Option<FolderId>) -> Slot {
        if let Some(slot) = self.slots.read().await.get(&folder) {
            return slot.clone();
        }
        let mut slots = self.slots.write().await;
        slots.entry(folder).or_default().clone()
    }

    /// The cached listing for `folder`, without fetching
    pub async fn get(&self, folder: Option<FolderId>) -> Option<Arc<FolderListing>> {
        let slots = self.slots.read().await;
        slots.get(&folder).and_then(|slot| slot.get().cloned())
    }

    pub async fn contains(&self, folder: Option<FolderId>) -> bool {
        self.get(folder).await.is_some()
    }

    /// Number of folders with a fetched listing
    pub async fn len(&self) -> usize {
        let slots = self.slots.read().await;
        slots.values().filter(|slot| slot.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// True when both handles point at the same storage
    pub fn shares_storage_with(&self, other: &FolderCache) -> bool {
        Arc::ptr_eq(&self.slots, &other.slots)
    }

    #[cfg(test)]
    async fn slot_count(&self) -> usize {
        self.slots.read().await.len()
    }
}
