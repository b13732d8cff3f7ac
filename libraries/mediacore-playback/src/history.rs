//! Playback history tracking
//!
//! Keeps recently played tracks, most recent first, unique by id.

use mediacore_core::MediaItem;
use std::collections::VecDeque;

/// Bounded, de-duplicated playback history
///
/// Re-adding a track that is already present moves it to the front instead of
/// storing it twice. When full, the oldest entry falls off the back.
#[derive(Debug, Clone)]
pub struct History {
    /// Most recent = front
    tracks: VecDeque<MediaItem>,

    max_size: usize,
}

impl History {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            tracks: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Rebuild from a most-recent-first list (e.g. persisted state)
    ///
    /// Later duplicates are dropped and the list is cut to `max_size`.
    pub fn from_recent(tracks: Vec<MediaItem>, max_size: usize) -> Self {
        let mut history = Self::new(max_size);
        for track in tracks.into_iter().rev() {
            history.push(track);
        }
        history
    }

    /// Record a track as the most recently played one
    pub fn push(&mut self, track: MediaItem) {
        self.tracks.retain(|existing| !existing.same_item(&track));
        self.tracks.push_front(track);
        self.tracks.truncate(self.max_size);
    }

    /// Most recently played track
    pub fn latest(&self) -> Option<&MediaItem> {
        self.tracks.front()
    }

    /// All entries, most recent first
    pub fn to_vec(&self) -> Vec<MediaItem> {
        self.tracks.iter().cloned().collect()
    }

    /// First `limit` entries, most recent first
    pub fn recent(&self, limit: usize) -> Vec<MediaItem> {
        self.tracks.iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> MediaItem {
        MediaItem::audio(id, format!("Track {id}"), "Test Artist", format!("https://a/{id}.mp3"))
    }

    fn ids(history: &History) -> Vec<String> {
        history.to_vec().into_iter().map(|t| t.id).collect()
    }

    #[test]
    fn create_history() {
        let history = History::new(10);
        assert_eq!(history.max_size(), 10);
        assert!(history.is_empty());
        assert!(history.latest().is_none());
    }

    #[test]
    fn most_recent_first() {
        let mut history = History::new(10);
        history.push(track("1"));
        history.push(track("2"));
        history.push(track("3"));

        assert_eq!(ids(&history), vec!["3", "2", "1"]);
        assert_eq!(history.latest().unwrap().id, "3");
    }

    #[test]
    fn re_adding_moves_to_front() {
        let mut history = History::new(50);
        for id in ["A", "B", "A", "C"] {
            history.push(track(id));
        }

        assert_eq!(ids(&history), vec!["C", "A", "B"]);
    }

    #[test]
    fn history_bounded() {
        let mut history = History::new(3);
        for i in 1..=4 {
            history.push(track(&i.to_string()));
        }

        // Oldest (1) discarded
        assert_eq!(ids(&history), vec!["4", "3", "2"]);
    }

    #[test]
    fn recent_limits_without_mutating() {
        let mut history = History::new(50);
        for i in 1..=30 {
            history.push(track(&i.to_string()));
        }

        let recent = history.recent(20);
        assert_eq!(recent.len(), 20);
        assert_eq!(recent[0].id, "30");
        assert_eq!(recent[19].id, "11");
        assert_eq!(history.len(), 30);
    }

    #[test]
    fn from_recent_preserves_order_and_dedups() {
        let history = History::from_recent(vec![track("3"), track("2"), track("3"), track("1")], 2);
        assert_eq!(ids(&history), vec!["3", "2"]);
    }

    #[test]
    fn clear_history() {
        let mut history = History::new(10);
        history.push(track("1"));
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn default_history() {
        assert_eq!(History::default().max_size(), 50);
    }
}
