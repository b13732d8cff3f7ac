//! Shared handle to the playback state store
//!
//! The store lives in a `tokio::sync::watch` cell. Writers mutate it in place
//! and every write bumps the revision, which is what wakes the session
//! controller. Readers either borrow briefly or take a snapshot.

use crate::store::PlaybackStateStore;
use crate::types::{PlaybackConfig, PlaybackState};
use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable handle to one [`PlaybackStateStore`]
///
/// Construct one at startup and hand clones to the controller and the UI.
#[derive(Debug, Clone)]
pub struct SharedStore {
    cell: Arc<watch::Sender<PlaybackStateStore>>,
}

impl SharedStore {
    pub fn new(store: PlaybackStateStore) -> Self {
        let (cell, _) = watch::channel(store);
        Self {
            cell: Arc::new(cell),
        }
    }

    pub fn with_config(config: PlaybackConfig) -> Self {
        Self::new(PlaybackStateStore::new(config))
    }

    /// Run `f` against the current store
    ///
    /// Holds a read lock for the duration of `f`; do not await inside.
    pub fn read<R>(&self, f: impl FnOnce(&PlaybackStateStore) -> R) -> R {
        f(&self.cell.borrow())
    }

    /// Mutate the store and notify subscribers
    pub fn update<R>(&self, f: impl FnOnce(&mut PlaybackStateStore) -> R) -> R {
        let mut output = None;
        self.cell.send_modify(|store| output = Some(f(store)));
        match output {
            Some(output) => output,
            None => unreachable!("send_modify always runs its closure"),
        }
    }

    /// Receiver that wakes on every store write
    pub fn subscribe(&self) -> watch::Receiver<PlaybackStateStore> {
        self.cell.subscribe()
    }

    pub fn snapshot(&self) -> PlaybackState {
        self.read(PlaybackStateStore::snapshot)
    }
}

impl Default for SharedStore {
    fn default() -> Self {
        Self::new(PlaybackStateStore::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediacore_core::MediaItem;

    #[test]
    fn update_returns_closure_output() {
        let shared = SharedStore::default();
        let added = shared.update(|store| {
            store.set_queue(vec![MediaItem::audio("1", "One", "A", "https://a/1.mp3")]);
            store.queue().len()
        });
        assert_eq!(added, 1);
        assert_eq!(shared.read(PlaybackStateStore::queue_index), Some(0));
    }

    #[test]
    fn clones_share_state() {
        let shared = SharedStore::default();
        let other = shared.clone();
        other.update(|store| store.set_volume(0.25));
        assert_eq!(shared.snapshot().volume, 0.25);
    }

    #[tokio::test]
    async fn subscribers_wake_on_update() {
        let shared = SharedStore::default();
        let mut rx = shared.subscribe();

        shared.update(|store| store.set_is_playing(true));
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_playing());
    }
}
