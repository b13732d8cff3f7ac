//! MediaCore - Playback
//!
//! Playback state and audio session management for MediaCore.
//!
//! This crate provides:
//! - [`PlaybackStateStore`]: queue, shuffle, repeat, history, volume and
//!   transport intent, all synchronous and engine-free
//! - [`SharedStore`]: the store in a `tokio::sync::watch` cell, cloned into
//!   the controller and the UI
//! - [`AudioSessionController`]: owns the engine handle, mirrors intent to the
//!   engine and engine reports back into the store
//! - Persistence of the durable subset through [`StateStorage`]
//! - [`LibraryStore`]: liked songs, persisted under their own key
//!
//! # Architecture
//!
//! The store is the single arbiter. The UI writes intent to it; the
//! controller is the only component that commands the engine and the only
//! one that reads raw engine reports. Engines plug in through the
//! [`AudioEngine`] and [`EngineHandle`] traits.
//!
//! # Example: Queue Navigation
//!
//! ```rust
//! use mediacore_core::MediaItem;
//! use mediacore_playback::{PlaybackStateStore, RepeatMode};
//!
//! let mut store = PlaybackStateStore::default();
//! store.set_queue(vec![
//!     MediaItem::audio("1", "Intro", "Artist", "https://cdn.example.com/1.mp3"),
//!     MediaItem::audio("2", "Outro", "Artist", "https://cdn.example.com/2.mp3"),
//! ]);
//!
//! assert_eq!(store.play_next().map(|t| t.id), Some("2".to_string()));
//! assert!(store.play_next().is_none());
//!
//! store.set_repeat_mode(RepeatMode::All);
//! assert_eq!(store.play_next().map(|t| t.id), Some("1".to_string()));
//! ```
//!
//! # Example: Persistence
//!
//! ```rust
//! use mediacore_playback::{MemoryStorage, PlaybackConfig, PlaybackStateStore};
//!
//! # block_on(async {
//! let storage = MemoryStorage::new();
//! let mut store = PlaybackStateStore::default();
//! store.set_volume(0.3);
//! store.persist(&storage).await.unwrap();
//!
//! let restored = PlaybackStateStore::rehydrate(PlaybackConfig::default(), &storage).await;
//! assert_eq!(restored.volume(), 0.3);
//! # });
//! # fn block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod controller;
pub mod engine;
pub mod error;
pub mod guard;
pub mod history;
pub mod library;
pub mod persist;
pub mod queue;
pub mod shared;
pub mod shuffle;
pub mod store;
pub mod types;

pub use controller::{
    AudioSessionController, SessionCommand, SessionHandle, SessionOutput, SessionPhase,
};
pub use engine::{AudioEngine, EngineHandle, EngineStatus, LoadOptions, StatusReport, StatusSink};
pub use error::{PlaybackError, Result};
pub use guard::SyncGuard;
pub use history::History;
pub use library::{LibraryStore, PersistedLibrary, DEFAULT_LIBRARY_KEY};
pub use persist::{JsonFileStorage, MemoryStorage, PersistedPlaybackState, StateStorage};
pub use queue::Queue;
pub use shared::SharedStore;
pub use store::PlaybackStateStore;
pub use types::{PlaybackConfig, PlaybackState, RepeatMode};
