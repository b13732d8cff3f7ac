//! Integration tests for the playback state store
//!
//! Queue, navigation, shuffle and history workflows as a UI would drive them.

use mediacore_core::MediaItem;
use mediacore_playback::{PlaybackConfig, PlaybackStateStore, RepeatMode};
use std::time::Duration;

// ===== Test Helpers =====

fn create_test_track(id: &str) -> MediaItem {
    MediaItem::audio(
        id,
        format!("Track {id}"),
        "Test Artist",
        format!("https://cdn.example.com/{id}.mp3"),
    )
    .with_duration_ms(180_000)
}

fn store_with_queue(ids: &[&str]) -> PlaybackStateStore {
    let mut store = PlaybackStateStore::new(PlaybackConfig::default());
    store.set_queue(ids.iter().map(|id| create_test_track(id)).collect());
    store
}

fn queue_ids(store: &PlaybackStateStore) -> Vec<String> {
    store.queue().iter().map(|t| t.id.clone()).collect()
}

fn history_ids(store: &PlaybackStateStore) -> Vec<String> {
    store.history().to_vec().into_iter().map(|t| t.id).collect()
}

// ===== Navigation =====

#[test]
fn test_play_next_at_end_without_repeat_returns_none() {
    let mut store = store_with_queue(&["1", "2", "3"]);
    store.skip_to(2);

    assert!(store.play_next().is_none());
    assert_eq!(store.queue_index(), Some(2));
    assert_eq!(store.current_track_id(), Some("3"));
}

#[test]
fn test_play_next_at_end_with_repeat_all_wraps() {
    let mut store = store_with_queue(&["1", "2", "3"]);
    store.set_repeat_mode(RepeatMode::All);
    store.skip_to(2);

    let next = store.play_next().unwrap();
    assert_eq!(next.id, "1");
    assert_eq!(store.queue_index(), Some(0));
    assert_eq!(store.current_track_id(), Some("1"));
}

#[test]
fn test_repeat_one_navigates_like_off() {
    let mut store = store_with_queue(&["1", "2"]);
    store.set_repeat_mode(RepeatMode::One);
    store.skip_to(1);

    assert!(store.play_next().is_none());
    assert_eq!(store.queue_index(), Some(1));
}

#[test]
fn test_play_previous_restarts_current_track() {
    let mut store = store_with_queue(&["1", "2", "3"]);
    store.skip_to(1);
    store.set_position(Duration::from_millis(5000));

    let track = store.play_previous().unwrap();

    assert_eq!(track.id, "2");
    assert_eq!(store.position(), Duration::ZERO);
    assert_eq!(store.queue_index(), Some(1));
    assert_eq!(store.current_track_id(), Some("2"));
}

#[test]
fn test_play_previous_clamps_at_start() {
    let mut store = store_with_queue(&["1", "2", "3"]);

    let track = store.play_previous().unwrap();
    assert_eq!(track.id, "1");
    assert_eq!(store.queue_index(), Some(0));
}

#[test]
fn test_play_previous_wraps_with_repeat_all() {
    let mut store = store_with_queue(&["1", "2", "3"]);
    store.set_repeat_mode(RepeatMode::All);

    assert_eq!(store.play_previous().unwrap().id, "3");
    assert_eq!(store.queue_index(), Some(2));
}

#[test]
fn test_queue_steps_leave_history_alone() {
    let mut store = store_with_queue(&["1", "2", "3"]);
    store.skip_to(0);
    store.play_next();
    store.play_next();
    store.play_previous();
    store.skip_to(2);

    assert_eq!(store.current_track_id(), Some("3"));
    assert!(history_ids(&store).is_empty());
}

#[test]
fn test_explicit_track_change_records_history() {
    let mut store = store_with_queue(&["1", "2", "3"]);
    store.skip_to(1);
    store.set_current_track(Some(create_test_track("x")));

    assert_eq!(history_ids(&store), vec!["2"]);
}

// ===== Queue Editing =====

#[test]
fn test_add_to_empty_queue_sets_cursor() {
    let mut store = PlaybackStateStore::default();
    store.add_to_queue(create_test_track("1"));

    assert_eq!(store.queue_index(), Some(0));
    assert_eq!(store.original_queue().len(), 1);
}

#[test]
fn test_add_to_queue_next_on_empty_queue() {
    let mut store = PlaybackStateStore::default();
    store.add_to_queue_next(create_test_track("1"));

    assert_eq!(queue_ids(&store), vec!["1"]);
    assert_eq!(store.queue_index(), Some(0));
}

#[test]
fn test_add_to_queue_next_inserts_after_cursor() {
    let mut store = store_with_queue(&["1", "2", "3"]);
    store.skip_to(1);
    store.add_to_queue_next(create_test_track("x"));

    assert_eq!(queue_ids(&store), vec!["1", "2", "x", "3"]);
    assert_eq!(store.queue_index(), Some(1));
    assert_eq!(store.play_next().unwrap().id, "x");
}

#[test]
fn test_remove_before_cursor_keeps_current() {
    let mut store = store_with_queue(&["1", "2", "3", "4"]);
    store.skip_to(2);

    assert!(store.remove_from_queue("1"));
    assert_eq!(store.queue_index(), Some(1));
    assert_eq!(store.queue()[1].id, "3");
}

#[test]
fn test_remove_unknown_id_is_noop() {
    let mut store = store_with_queue(&["1", "2"]);
    assert!(!store.remove_from_queue("nope"));
    assert_eq!(queue_ids(&store), vec!["1", "2"]);
}

#[test]
fn test_remove_everything_empties_cursor() {
    let mut store = store_with_queue(&["1"]);
    store.remove_from_queue("1");

    assert!(store.queue().is_empty());
    assert_eq!(store.queue_index(), None);
    assert!(store.play_next().is_none());
    assert!(store.play_previous().is_none());
}

#[test]
fn test_reorder_follows_current_track() {
    let mut store = store_with_queue(&["1", "2", "3", "4"]);
    store.skip_to(1);

    store.reorder_queue(3, 0);
    assert_eq!(queue_ids(&store), vec!["4", "1", "2", "3"]);
    assert_eq!(store.queue()[store.queue_index().unwrap()].id, "2");

    store.reorder_queue(0, 3);
    assert_eq!(queue_ids(&store), vec!["1", "2", "3", "4"]);
    assert_eq!(store.queue()[store.queue_index().unwrap()].id, "2");
}

#[test]
fn test_reorder_out_of_range_is_noop() {
    let mut store = store_with_queue(&["1", "2"]);
    assert!(!store.reorder_queue(5, 0));
    assert_eq!(queue_ids(&store), vec!["1", "2"]);
}

#[test]
fn test_clear_queue() {
    let mut store = store_with_queue(&["1", "2"]);
    store.clear_queue();

    assert!(store.queue().is_empty());
    assert!(store.original_queue().is_empty());
    assert_eq!(store.queue_index(), None);
}

// ===== Shuffle =====

#[test]
fn test_shuffle_keeps_current_track_in_place() {
    let ids: Vec<String> = (0..20).map(|i| i.to_string()).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let mut store = store_with_queue(&refs);
    store.skip_to(5);

    store.toggle_shuffle();

    assert!(store.is_shuffled());
    assert_eq!(store.queue_index(), Some(5));
    assert_eq!(store.queue()[5].id, "5");
    assert_eq!(store.queue().len(), 20);
}

#[test]
fn test_shuffle_round_trip_restores_order() {
    let mut store = store_with_queue(&["1", "2", "3", "4", "5", "6"]);
    store.skip_to(3);

    store.toggle_shuffle();
    store.play_next();
    let current = store.current_track_id().unwrap().to_string();
    store.toggle_shuffle();

    assert!(!store.is_shuffled());
    assert_eq!(queue_ids(&store), vec!["1", "2", "3", "4", "5", "6"]);
    assert_eq!(store.queue()[store.queue_index().unwrap()].id, current);
}

#[test]
fn test_unshuffle_after_removing_current_defaults_to_first() {
    let mut store = store_with_queue(&["1", "2", "3"]);
    store.skip_to(2);
    store.toggle_shuffle();
    store.remove_from_queue("3");
    store.toggle_shuffle();

    assert_eq!(queue_ids(&store), vec!["1", "2"]);
    assert_eq!(store.queue_index(), Some(0));
}

#[test]
fn test_set_queue_clears_shuffle() {
    let mut store = store_with_queue(&["1", "2", "3"]);
    store.toggle_shuffle();
    store.set_queue(vec![create_test_track("a"), create_test_track("b")]);

    assert!(!store.is_shuffled());
    assert_eq!(queue_ids(&store), vec!["a", "b"]);
    assert_eq!(store.original_queue().len(), 2);
}

// ===== History =====

#[test]
fn test_history_dedups_most_recent_first() {
    let mut store = PlaybackStateStore::default();
    for id in ["A", "B", "A", "C"] {
        store.add_to_history(create_test_track(id));
    }

    assert_eq!(history_ids(&store), vec!["C", "A", "B"]);
}

#[test]
fn test_history_limited_to_max_size() {
    let mut store = PlaybackStateStore::default();
    for i in 0..60 {
        store.add_to_history(create_test_track(&i.to_string()));
    }

    assert_eq!(store.history().len(), 50);
    assert_eq!(store.history().latest().unwrap().id, "59");

    store.clear_history();
    assert!(store.history().is_empty());
}

// ===== Settings =====

#[test]
fn test_volume_clamped_to_unit_range() {
    let mut store = PlaybackStateStore::default();
    store.set_volume(2.0);
    assert_eq!(store.volume(), 1.0);
    store.set_volume(-1.0);
    assert_eq!(store.volume(), 0.0);
}

#[test]
fn test_custom_restart_threshold() {
    let config = PlaybackConfig {
        restart_threshold: Duration::from_secs(10),
        ..PlaybackConfig::default()
    };
    let mut store = PlaybackStateStore::new(config);
    store.set_queue(vec![create_test_track("1"), create_test_track("2")]);
    store.skip_to(1);
    store.set_position(Duration::from_secs(5));

    assert_eq!(store.play_previous().unwrap().id, "1");
}
