//! Persisting the playback state between runs
//!
//! Only the durable subset is written: current track, rate, both queues,
//! repeat mode, shuffle flag, volume and a truncated history. Transport fields
//! (`is_playing`, position, duration, buffering) are never restored, so a cold
//! start is always paused at zero.

use crate::error::{PlaybackError, Result};
use crate::shared::SharedStore;
use crate::store::PlaybackStateStore;
use crate::types::{PlaybackConfig, PlaybackState, RepeatMode};
use async_trait::async_trait;
use mediacore_core::MediaItem;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Durable subset of [`PlaybackState`]
///
/// Unknown fields are ignored on load, so blobs that still carry transport
/// fields deserialize fine and those fields are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedPlaybackState {
    pub current_track: Option<MediaItem>,
    pub playback_rate: f32,
    pub queue: Vec<MediaItem>,
    pub original_queue: Vec<MediaItem>,
    pub repeat_mode: RepeatMode,
    pub is_shuffled: bool,
    pub volume: f32,
    pub history: Vec<MediaItem>,
}

impl PersistedPlaybackState {
    /// Extract the durable subset, keeping at most `history_limit` entries
    pub fn from_state(state: &PlaybackState, history_limit: usize) -> Self {
        Self {
            current_track: state.current_track.clone(),
            playback_rate: state.playback_rate,
            queue: state.queue.clone(),
            original_queue: state.original_queue.clone(),
            repeat_mode: state.repeat_mode,
            is_shuffled: state.is_shuffled,
            volume: state.volume,
            history: state.history.iter().take(history_limit).cloned().collect(),
        }
    }

    /// Expand into a full state with transport fields at their defaults
    ///
    /// The cursor is not persisted; it is recomputed when the state is loaded
    /// into a store.
    pub fn into_state(self, config: &PlaybackConfig) -> PlaybackState {
        PlaybackState {
            current_track: self.current_track,
            playback_rate: self.playback_rate,
            queue: self.queue,
            original_queue: self.original_queue,
            repeat_mode: self.repeat_mode,
            is_shuffled: self.is_shuffled,
            volume: self.volume,
            history: self.history,
            ..PlaybackState::with_config(config)
        }
    }
}

impl Default for PersistedPlaybackState {
    fn default() -> Self {
        Self::from_state(&PlaybackState::default(), 0)
    }
}

/// Key-value storage for the persisted blob
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Read the blob stored under `key`, if any
    async fn load(&self, key: &str) -> Result<Option<String>>;

    /// Store `blob` under `key`, replacing any previous value
    async fn save(&self, key: &str, blob: &str) -> Result<()>;

    /// Delete `key`; missing keys are not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(PlaybackError::Storage(format!("invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl StateStorage for JsonFileStorage {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &str, blob: &str) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write then rename so readers never see a half-written file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, blob).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(path = %path.display(), bytes = blob.len(), "Saved state blob");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage, for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStorage for MemoryStorage {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, blob: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// Read and decode the blob under `key`
///
/// Missing, unreadable or corrupt blobs yield `None`; the last two are
/// logged.
pub(crate) async fn load_json<T: DeserializeOwned>(storage: &dyn StateStorage, key: &str) -> Option<T> {
    let blob = match storage.load(key).await {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            debug!(key = %key, "Nothing persisted");
            return None;
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to read persisted state");
            return None;
        }
    };

    match serde_json::from_str(&blob) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key = %key, error = %e, "Discarding corrupt persisted state");
            None
        }
    }
}

impl PlaybackStateStore {
    /// Load the persisted state, falling back to an empty store
    ///
    /// Missing, unreadable or corrupt blobs never fail startup; they are
    /// logged and replaced by defaults.
    pub async fn rehydrate(config: PlaybackConfig, storage: &dyn StateStorage) -> Self {
        let Some(persisted) = load_json::<PersistedPlaybackState>(storage, &config.storage_key).await else {
            return Self::new(config);
        };

        let state = persisted.into_state(&config);
        debug!(
            queue_len = state.queue.len(),
            history_len = state.history.len(),
            "Rehydrated playback state"
        );
        Self::from_state(config, state)
    }

    /// The subset written to storage
    pub fn to_persisted(&self) -> PersistedPlaybackState {
        PersistedPlaybackState::from_state(&self.snapshot(), self.config().persisted_history_size)
    }

    /// Write the durable subset under the configured key
    pub async fn persist(&self, storage: &dyn StateStorage) -> Result<()> {
        let blob = serde_json::to_string(&self.to_persisted())?;
        storage.save(&self.config().storage_key, &blob).await
    }
}

impl SharedStore {
    /// Persist the current state without holding the cell across the write
    pub async fn persist(&self, storage: &dyn StateStorage) -> Result<()> {
        let (key, blob) = self.read(|store| {
            serde_json::to_string(&store.to_persisted())
                .map(|blob| (store.config().storage_key.clone(), blob))
        })?;
        storage.save(&key, &blob).await
    }
}
