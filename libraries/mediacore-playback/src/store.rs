//! Playback state store
//!
//! Single source of truth for what should be playing. Every transition is
//! synchronous and never touches the audio engine; the session controller
//! observes the store and drives the engine from it.

use crate::history::History;
use crate::queue::Queue;
use crate::types::{PlaybackConfig, PlaybackState, RepeatMode};
use mediacore_core::MediaItem;
use std::time::Duration;

/// Playback state plus its transition rules
///
/// Edge cases are deliberately not uniform: `play_next` and `skip_to` return
/// `None` when they cannot move, `play_previous` clamps at the first entry,
/// and `remove_from_queue`/`reorder_queue` quietly ignore unknown ids and
/// indices. None of them panic.
#[derive(Debug, Clone)]
pub struct PlaybackStateStore {
    config: PlaybackConfig,

    // Current playback
    current_track: Option<MediaItem>,
    is_playing: bool,
    position: Duration,
    duration: Duration,
    playback_rate: f32,
    is_buffering: bool,

    // Queue and history
    queue: Queue,
    history: History,

    // Settings
    repeat_mode: RepeatMode,
    volume: f32,
}

impl PlaybackStateStore {
    /// Create an empty store
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            current_track: None,
            is_playing: false,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            playback_rate: config.default_rate,
            is_buffering: false,
            queue: Queue::new(),
            history: History::new(config.history_size),
            repeat_mode: RepeatMode::Off,
            volume: config.default_volume.clamp(0.0, 1.0),
            config,
        }
    }

    /// Build a store from a state snapshot
    ///
    /// Used for rehydration. The cursor is recomputed from `current_track`
    /// and the volume clamped, so a hand-edited snapshot cannot break the
    /// store's invariants.
    pub fn from_state(config: PlaybackConfig, state: PlaybackState) -> Self {
        let queue = Queue::restore(
            state.queue,
            state.original_queue,
            state.is_shuffled,
            state.current_track.as_ref(),
        );
        let mut store = Self::new(config);
        store.history = History::from_recent(state.history, store.config.history_size);
        store.current_track = state.current_track;
        store.is_playing = state.is_playing;
        store.position = state.position;
        store.duration = state.duration;
        store.is_buffering = state.is_buffering;
        store.queue = queue;
        store.repeat_mode = state.repeat_mode;
        store.set_playback_rate(state.playback_rate);
        store.set_volume(state.volume);
        store
    }

    /// Clone the full state for readers
    pub fn snapshot(&self) -> PlaybackState {
        PlaybackState {
            current_track: self.current_track.clone(),
            is_playing: self.is_playing,
            position: self.position,
            duration: self.duration,
            playback_rate: self.playback_rate,
            volume: self.volume,
            is_buffering: self.is_buffering,
            queue: self.queue.items().to_vec(),
            queue_index: self.queue.index(),
            original_queue: self.queue.original().to_vec(),
            repeat_mode: self.repeat_mode,
            is_shuffled: self.queue.is_shuffled(),
            history: self.history.to_vec(),
        }
    }

    // ===== Playback =====

    /// Replace the current track
    ///
    /// A different, non-null current track is pushed to history first. The
    /// queue is left alone, so this also serves ad-hoc playback of items that
    /// are not queued.
    pub fn set_current_track(&mut self, track: Option<MediaItem>) {
        if let (Some(current), Some(next)) = (&self.current_track, &track) {
            if !current.same_item(next) {
                self.history.push(current.clone());
            }
        }
        self.current_track = track;
    }

    pub fn set_is_playing(&mut self, is_playing: bool) {
        self.is_playing = is_playing;
    }

    pub fn set_position(&mut self, position: Duration) {
        self.position = position;
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Set the desired rate; non-finite or non-positive rates are ignored
    pub fn set_playback_rate(&mut self, rate: f32) {
        if rate.is_finite() && rate > 0.0 {
            self.playback_rate = rate;
        }
    }

    pub fn set_is_buffering(&mut self, is_buffering: bool) {
        self.is_buffering = is_buffering;
    }

    // ===== Queue =====

    /// Replace the queue; cursor on the first entry, shuffle cleared
    pub fn set_queue(&mut self, items: Vec<MediaItem>) {
        self.queue.set(items);
    }

    /// Append to the end of the queue
    pub fn add_to_queue(&mut self, track: MediaItem) {
        self.queue.push_back(track);
    }

    /// Insert right after the current entry
    pub fn add_to_queue_next(&mut self, track: MediaItem) {
        self.queue.insert_next(track);
    }

    /// Remove every queued entry with `id`
    ///
    /// Returns `false` when nothing matched.
    pub fn remove_from_queue(&mut self, id: &str) -> bool {
        self.queue.remove_id(id) > 0
    }

    /// Move a queued entry; the cursor keeps pointing at the same track
    pub fn reorder_queue(&mut self, from: usize, to: usize) -> bool {
        self.queue.reorder(from, to)
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    // ===== Navigation =====

    /// Advance to the next queued track
    ///
    /// Returns `None` on an empty queue, and at the end of the queue unless
    /// repeat-all wraps around. In both cases nothing changes. Queue steps do
    /// not record history; only `set_current_track` does.
    pub fn play_next(&mut self) -> Option<MediaItem> {
        let wrap = self.repeat_mode == RepeatMode::All;
        let next = self.queue.advance(wrap).cloned()?;
        self.current_track = Some(next.clone());
        Some(next)
    }

    /// Go back one track, or restart the current one
    ///
    /// Past the restart threshold only the position is reset and the current
    /// track is returned. Otherwise the cursor moves back, wrapping on
    /// repeat-all and clamping to the first entry otherwise.
    pub fn play_previous(&mut self) -> Option<MediaItem> {
        if self.queue.is_empty() {
            return None;
        }

        if self.position > self.config.restart_threshold {
            self.position = Duration::ZERO;
            return self.current_track.clone();
        }

        let wrap = self.repeat_mode == RepeatMode::All;
        let previous = self.queue.retreat(wrap).cloned()?;
        self.current_track = Some(previous.clone());
        Some(previous)
    }

    /// Jump to a queue index; `None` if out of range
    pub fn skip_to(&mut self, index: usize) -> Option<MediaItem> {
        let track = self.queue.jump(index).cloned()?;
        self.current_track = Some(track.clone());
        Some(track)
    }

    // ===== Settings =====

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat_mode = mode;
    }

    /// Flip shuffle
    ///
    /// On: the current track keeps its slot, everything else is shuffled.
    /// Off: the original order comes back and the cursor follows the current
    /// track (first entry if it was removed meanwhile).
    pub fn toggle_shuffle(&mut self) {
        if self.queue.is_shuffled() {
            self.queue.unshuffle(self.current_track.as_ref());
        } else {
            self.queue
                .shuffle(self.current_track.as_ref(), &mut rand::thread_rng());
        }
    }

    /// Set volume, clamped to [0, 1]
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_nan() {
            self.volume
        } else {
            volume.clamp(0.0, 1.0)
        };
    }

    // ===== History =====

    pub fn add_to_history(&mut self, track: MediaItem) {
        self.history.push(track);
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // ===== State Queries =====

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn current_track(&self) -> Option<&MediaItem> {
        self.current_track.as_ref()
    }

    pub fn current_track_id(&self) -> Option<&str> {
        self.current_track.as_ref().map(|track| track.id.as_str())
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn playback_rate(&self) -> f32 {
        self.playback_rate
    }

    pub fn is_buffering(&self) -> bool {
        self.is_buffering
    }

    pub fn queue(&self) -> &[MediaItem] {
        self.queue.items()
    }

    pub fn original_queue(&self) -> &[MediaItem] {
        self.queue.original()
    }

    pub fn queue_index(&self) -> Option<usize> {
        self.queue.index()
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub fn is_shuffled(&self) -> bool {
        self.queue.is_shuffled()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}

impl Default for PlaybackStateStore {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}
