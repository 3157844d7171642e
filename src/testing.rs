//! Test doubles for the library server and the player

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Semaphore;

use crate::error::LibraryError;
use crate::model::{FolderId, LibraryService, MediaCapabilities, MediaId};
use crate::player::{PlayerBackend, PlayerInstance, PlayerSource};

/// Holds calls until opened
#[derive(Clone)]
pub struct Gate(Arc<Semaphore>);

impl Gate {
    fn new() -> Self {
        Self(Arc::new(Semaphore::new(0)))
    }

    pub fn open(&self) {
        self.0.add_permits(1);
    }

    async fn pass(&self) {
        let _permit = self.0.acquire().await;
    }
}

/// In-memory library server with call counters and failure injection
#[derive(Default)]
pub struct ScriptedLibrary {
    raw_listings: Mutex<HashMap<Option<FolderId>, String>>,
    failing_folders: Mutex<HashSet<Option<FolderId>>>,
    browse_calls: Mutex<HashMap<Option<FolderId>, usize>>,
    browse_gate: Mutex<Option<Gate>>,
    media: Mutex<HashMap<MediaId, MediaCapabilities>>,
    failing_media: Mutex<HashSet<MediaId>>,
    media_calls: AtomicUsize,
    media_gate: Mutex<Option<Gate>>,
}

impl ScriptedLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listing served for a folder nobody scripted: one sub-folder, one media item
    pub fn default_listing(folder: Option<FolderId>) -> String {
        let base = folder.unwrap_or(0);
        let parent = folder.map(|_| json!({"id": false, "name": "/srv"}));
        json!({
            "parent_id": parent,
            "current_id": folder.map(|id| json!({"id": id, "name": format!("/srv/{}", id)})),
            "child_ids": [{"id": base * 10 + 1, "name": format!("sub{}", base * 10 + 1)}],
            "media_ids": [{"id": base * 100 + 1, "name": format!("video{}.mkv", base * 100 + 1)}],
        })
        .to_string()
    }

    pub fn set_raw_listing(&self, folder: Option<FolderId>, raw: &str) {
        self.raw_listings.lock().unwrap().insert(folder, raw.to_string());
    }

    pub fn fail_browse(&self, folder: Option<FolderId>) {
        self.failing_folders.lock().unwrap().insert(folder);
    }

    pub fn heal_browse(&self, folder: Option<FolderId>) {
        self.failing_folders.lock().unwrap().remove(&folder);
    }

    pub fn browse_calls(&self, folder: Option<FolderId>) -> usize {
        self.browse_calls.lock().unwrap().get(&folder).copied().unwrap_or(0)
    }

    pub fn total_browse_calls(&self) -> usize {
        self.browse_calls.lock().unwrap().values().sum()
    }

    /// Hold every browse call until the returned gate opens
    pub fn hold_browse(&self) -> Gate {
        let gate = Gate::new();
        *self.browse_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn set_media(&self, media: MediaId, caps: MediaCapabilities) {
        self.media.lock().unwrap().insert(media, caps);
    }

    pub fn fail_media(&self, media: MediaId) {
        self.failing_media.lock().unwrap().insert(media);
    }

    pub fn media_calls(&self) -> usize {
        self.media_calls.load(Ordering::SeqCst)
    }

    /// Hold every media info call until the returned gate opens
    pub fn hold_media(&self) -> Gate {
        let gate = Gate::new();
        *self.media_gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

/// Capabilities used when a test does not script its own
pub fn sample_capabilities() -> MediaCapabilities {
    serde_json::from_value(json!({
        "name": "heat",
        "width": 1920,
        "height": 1080,
        "br_list": [4200, 250, 500, 1000],
        "res_list": ["Original", "240p", "360p", "720p"],
        "audio_tracks_lang": ["en:ac3", "fr"],
        "sub_list": [
            {"srclang": "en", "kind": "subtitles", "label": "heat.en.srt", "src": "/sub/42.srt?sub=heat.en.srt"},
            {"srclang": "en", "kind": "subtitles", "label": "heat.fr.srt", "src": "/sub/42.srt?sub=heat.fr.srt"}
        ]
    }))
    .unwrap()
}

fn scripted_error(what: String) -> LibraryError {
    LibraryError::Rpc { message: what }
}

#[async_trait]
impl LibraryService for ScriptedLibrary {
    async fn browse_folder(&self, folder: Option<FolderId>) -> Result<String, LibraryError> {
        *self.browse_calls.lock().unwrap().entry(folder).or_default() += 1;
        let gate = self.browse_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if self.failing_folders.lock().unwrap().contains(&folder) {
            return Err(scripted_error(format!("folder {:?} unavailable", folder)));
        }
        let raw = self.raw_listings.lock().unwrap().get(&folder).cloned();
        Ok(raw.unwrap_or_else(|| Self::default_listing(folder)))
    }

    async fn media_info(&self, media: MediaId) -> Result<MediaCapabilities, LibraryError> {
        self.media_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.media_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if self.failing_media.lock().unwrap().contains(&media) {
            return Err(scripted_error(format!("media {} unavailable", media)));
        }
        let caps = self.media.lock().unwrap().get(&media).cloned();
        Ok(caps.unwrap_or_else(sample_capabilities))
    }
}

/// What happened to the players, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerLog {
    Attached(String),
    Destroyed(String),
}

/// Player backend that records attach/destroy calls and counts live instances
#[derive(Clone, Default)]
pub struct RecordingBackend {
    log: Arc<Mutex<Vec<PlayerLog>>>,
    live: Arc<AtomicUsize>,
    max_live: Arc<AtomicUsize>,
    fail_attach: Arc<AtomicBool>,
    sources: Arc<Mutex<Vec<PlayerSource>>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Vec<PlayerLog> {
        self.log.lock().unwrap().clone()
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously live instances seen
    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    pub fn last_source(&self) -> Option<PlayerSource> {
        self.sources.lock().unwrap().last().cloned()
    }

    pub fn fail_next_attach(&self) {
        self.fail_attach.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PlayerBackend for RecordingBackend {
    async fn attach(&self, source: &PlayerSource) -> Result<Box<dyn PlayerInstance>> {
        if self.fail_attach.swap(false, Ordering::SeqCst) {
            anyhow::bail!("player refused {}", source.url);
        }
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(live, Ordering::SeqCst);
        self.log.lock().unwrap().push(PlayerLog::Attached(source.url.clone()));
        self.sources.lock().unwrap().push(source.clone());
        Ok(Box::new(RecordingPlayer {
            url: source.url.clone(),
            log: self.log.clone(),
            live: self.live.clone(),
        }))
    }
}

struct RecordingPlayer {
    url: String,
    log: Arc<Mutex<Vec<PlayerLog>>>,
    live: Arc<AtomicUsize>,
}

#[async_trait]
impl PlayerInstance for RecordingPlayer {
    async fn destroy(self: Box<Self>) -> Result<()> {
        self.live.fetch_sub(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(PlayerLog::Destroyed(self.url.clone()));
        Ok(())
    }
}
