//! Integration tests for the liked-songs library

use mediacore_core::MediaItem;
use mediacore_playback::{
    JsonFileStorage, LibraryStore, MemoryStorage, PlaybackConfig, PlaybackStateStore, StateStorage,
    DEFAULT_LIBRARY_KEY,
};
use tempfile::TempDir;

fn create_test_track(id: &str) -> MediaItem {
    MediaItem::audio(id, format!("Track {id}"), "Test Artist", format!("https://cdn.example.com/{id}.mp3"))
}

fn ids(library: &LibraryStore) -> Vec<&str> {
    library.liked_songs().iter().map(|t| t.id.as_str()).collect()
}

#[tokio::test]
async fn test_library_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let storage = JsonFileStorage::new(dir.path());

    let mut library = LibraryStore::default();
    library.toggle_like(create_test_track("1"));
    library.toggle_like(create_test_track("2"));
    library.add_to_library(create_test_track("3"));
    library.persist(&storage).await.unwrap();

    assert!(dir.path().join(format!("{DEFAULT_LIBRARY_KEY}.json")).exists());

    let restored = LibraryStore::rehydrate(DEFAULT_LIBRARY_KEY, &storage).await;
    assert_eq!(ids(&restored), vec!["3", "2", "1"]);
    assert!(restored.is_liked("2"));
}

#[tokio::test]
async fn test_library_and_player_state_do_not_collide() {
    let storage = MemoryStorage::new();

    let mut store = PlaybackStateStore::default();
    store.set_queue(vec![create_test_track("q")]);
    store.persist(&storage).await.unwrap();

    let mut library = LibraryStore::default();
    library.toggle_like(create_test_track("liked"));
    library.persist(&storage).await.unwrap();

    let store = PlaybackStateStore::rehydrate(PlaybackConfig::default(), &storage).await;
    let library = LibraryStore::rehydrate(DEFAULT_LIBRARY_KEY, &storage).await;
    assert_eq!(store.queue()[0].id, "q");
    assert_eq!(ids(&library), vec!["liked"]);
}

#[tokio::test]
async fn test_corrupt_library_starts_empty() {
    let storage = MemoryStorage::new();
    storage.save(DEFAULT_LIBRARY_KEY, "[1, 2").await.unwrap();

    let library = LibraryStore::rehydrate(DEFAULT_LIBRARY_KEY, &storage).await;
    assert!(library.is_empty());
    assert_eq!(library.storage_key(), DEFAULT_LIBRARY_KEY);
}

#[tokio::test]
async fn test_unlike_is_persisted() {
    let storage = MemoryStorage::new();
    let mut library = LibraryStore::default();
    library.toggle_like(create_test_track("1"));
    library.persist(&storage).await.unwrap();

    let mut library = LibraryStore::rehydrate(DEFAULT_LIBRARY_KEY, &storage).await;
    assert!(!library.toggle_like(create_test_track("1")));
    library.persist(&storage).await.unwrap();

    let library = LibraryStore::rehydrate(DEFAULT_LIBRARY_KEY, &storage).await;
    assert!(library.is_empty());
}
