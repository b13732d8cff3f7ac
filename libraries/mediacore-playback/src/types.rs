//! Core types for playback management

use mediacore_core::MediaItem;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Repeat mode
///
/// Only `All` changes queue navigation. `One` is carried for the UI and the
/// engine loop flag; the store treats it like `Off` when moving through the
/// queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when queue ends
    #[default]
    Off,

    /// Loop entire queue
    All,

    /// Loop current track only
    One,
}

impl RepeatMode {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::All => "all",
            Self::One => "one",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "off" => Some(Self::Off),
            "all" => Some(Self::All),
            "one" => Some(Self::One),
            _ => None,
        }
    }

    /// Next mode in the off → all → one cycle used by the repeat button
    #[must_use]
    pub fn cycle(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }
}

impl std::fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of everything the store knows about playback
///
/// Transport fields (`is_playing`, `playback_rate`, `volume`) describe
/// intent. `position`, `duration` and `is_buffering` are whatever the engine
/// last reported.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Track the controller should have loaded
    pub current_track: Option<MediaItem>,

    pub is_playing: bool,

    pub position: Duration,

    pub duration: Duration,

    pub playback_rate: f32,

    /// Always within [0, 1]
    pub volume: f32,

    pub is_buffering: bool,

    pub queue: Vec<MediaItem>,

    /// Cursor into `queue`; `None` exactly when the queue is empty
    pub queue_index: Option<usize>,

    /// Queue order before shuffling
    pub original_queue: Vec<MediaItem>,

    pub repeat_mode: RepeatMode,

    pub is_shuffled: bool,

    /// Most recent first, unique by id
    pub history: Vec<MediaItem>,
}

impl PlaybackState {
    /// Fresh state built from configured defaults
    pub fn with_config(config: &PlaybackConfig) -> Self {
        Self {
            current_track: None,
            is_playing: false,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            playback_rate: config.default_rate,
            volume: config.default_volume.clamp(0.0, 1.0),
            is_buffering: false,
            queue: Vec::new(),
            queue_index: None,
            original_queue: Vec::new(),
            repeat_mode: RepeatMode::Off,
            is_shuffled: false,
            history: Vec::new(),
        }
    }

    /// Id of the current track, if any
    pub fn current_track_id(&self) -> Option<&str> {
        self.current_track.as_ref().map(|track| track.id.as_str())
    }

    /// Queue entry under the cursor
    pub fn queue_current(&self) -> Option<&MediaItem> {
        self.queue_index.and_then(|index| self.queue.get(index))
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::with_config(&PlaybackConfig::default())
    }
}

/// Configuration for the playback store and session controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Maximum in-memory history size (default: 50)
    pub history_size: usize,

    /// History entries written to storage (default: 20)
    pub persisted_history_size: usize,

    /// Past this position, "previous" restarts the current track (default: 3s)
    #[serde(with = "duration_ms")]
    pub restart_threshold: Duration,

    /// Interval the engine is asked to report status at (default: 250ms)
    #[serde(with = "duration_ms")]
    pub status_interval: Duration,

    /// Initial volume in [0, 1] (default: 1.0)
    pub default_volume: f32,

    /// Initial playback rate (default: 1.0)
    pub default_rate: f32,

    /// Advance the queue when a track ends (default: false)
    pub auto_advance: bool,

    /// Storage key of the persisted state blob
    pub storage_key: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            history_size: 50,
            persisted_history_size: 20,
            restart_threshold: Duration::from_secs(3),
            status_interval: Duration::from_millis(250),
            default_volume: 1.0,
            default_rate: 1.0,
            auto_advance: false,
            storage_key: "mediacore-player-storage".to_string(),
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
