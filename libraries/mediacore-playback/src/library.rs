//! Liked songs
//!
//! A small persisted collection kept next to the playback state: most recent
//! first, one entry per id. It shares the [`StateStorage`] backend with the
//! playback store but lives under its own key.

use crate::error::Result;
use crate::persist::{load_json, StateStorage};
use mediacore_core::MediaItem;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default storage key for the library blob
pub const DEFAULT_LIBRARY_KEY: &str = "library-storage";

/// Persisted form of [`LibraryStore`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedLibrary {
    pub liked_songs: Vec<MediaItem>,
}

/// User's liked songs
#[derive(Debug, Clone)]
pub struct LibraryStore {
    storage_key: String,
    liked: Vec<MediaItem>,
}

impl LibraryStore {
    /// Create an empty library persisted under `storage_key`
    pub fn new(storage_key: impl Into<String>) -> Self {
        Self {
            storage_key: storage_key.into(),
            liked: Vec::new(),
        }
    }

    /// Build from a persisted blob, dropping repeated ids
    pub fn from_persisted(storage_key: impl Into<String>, persisted: PersistedLibrary) -> Self {
        let mut library = Self::new(storage_key);
        for item in persisted.liked_songs {
            if !library.is_liked(&item.id) {
                library.liked.push(item);
            }
        }
        library
    }

    /// Like `item`, or unlike it if already liked
    ///
    /// Returns whether the item is liked afterwards.
    pub fn toggle_like(&mut self, item: MediaItem) -> bool {
        if self.remove_from_library(&item.id) {
            false
        } else {
            self.liked.insert(0, item);
            true
        }
    }

    pub fn is_liked(&self, id: &str) -> bool {
        self.liked.iter().any(|item| item.id == id)
    }

    /// Add to the front; already liked items stay where they are
    pub fn add_to_library(&mut self, item: MediaItem) -> bool {
        if self.is_liked(&item.id) {
            return false;
        }
        self.liked.insert(0, item);
        true
    }

    /// Returns `false` when `id` was not liked
    pub fn remove_from_library(&mut self, id: &str) -> bool {
        let before = self.liked.len();
        self.liked.retain(|item| item.id != id);
        self.liked.len() != before
    }

    /// Liked songs, most recent first
    pub fn liked_songs(&self) -> &[MediaItem] {
        &self.liked
    }

    pub fn len(&self) -> usize {
        self.liked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.liked.is_empty()
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn to_persisted(&self) -> PersistedLibrary {
        PersistedLibrary {
            liked_songs: self.liked.clone(),
        }
    }

    /// Load the library under `storage_key`, empty if missing or corrupt
    pub async fn rehydrate(storage_key: impl Into<String>, storage: &dyn StateStorage) -> Self {
        let storage_key = storage_key.into();
        match load_json::<PersistedLibrary>(storage, &storage_key).await {
            Some(persisted) => {
                let library = Self::from_persisted(storage_key, persisted);
                debug!(liked = library.len(), "Rehydrated library");
                library
            }
            None => Self::new(storage_key),
        }
    }

    pub async fn persist(&self, storage: &dyn StateStorage) -> Result<()> {
        let blob = serde_json::to_string(&self.to_persisted())?;
        storage.save(&self.storage_key, &blob).await
    }
}

impl Default for LibraryStore {
    fn default() -> Self {
        Self::new(DEFAULT_LIBRARY_KEY)
    }
}
