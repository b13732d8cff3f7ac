/// Media item domain types
use serde::{Deserialize, Serialize};

/// Kind of media an item carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Audio,
    Video,
}

/// Delivery format of the primary media URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    #[default]
    File,
    Hls,
    Dash,
}

/// Alternative rendition of an item ("1080p", "Audio Only", ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaQuality {
    pub label: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u32>,
}

/// Subtitle track (WebVTT)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    /// Language code, e.g. "en"
    pub language: String,
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub is_default: bool,
}

/// A playable catalog entry
///
/// Produced by the catalog collaborator and treated as immutable by the
/// playback core. Two items are the same track when their `id`s match, see
/// [`MediaItem::same_item`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// Catalog identifier
    pub id: String,

    pub title: String,

    pub artist: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,

    #[serde(default)]
    pub cover_url: String,

    /// Formatted duration ("4:03")
    #[serde(default)]
    pub duration: String,

    /// Duration in milliseconds, when the catalog knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    #[serde(rename = "type", default)]
    pub media_type: MediaType,

    #[serde(default)]
    pub category: String,

    /// Primary media URL (audio or video)
    pub audio_url: String,

    /// Separate video URL, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    #[serde(default)]
    pub is_live: bool,

    #[serde(default)]
    pub is_explicit: bool,

    /// ISO-8601 date string as delivered by the catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,

    #[serde(default)]
    pub stream_type: StreamType,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualities: Vec<MediaQuality>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub captions: Vec<CaptionTrack>,
}

impl MediaItem {
    /// Create an audio item with minimal metadata
    pub fn audio(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            audio_url: audio_url.into(),
            category: "Music".to_string(),
            ..Self::default()
        }
    }

    /// Create a video item with minimal metadata
    pub fn video(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        video_url: impl Into<String>,
    ) -> Self {
        let url = video_url.into();
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            audio_url: url.clone(),
            video_url: Some(url),
            media_type: MediaType::Video,
            category: "Video".to_string(),
            ..Self::default()
        }
    }

    /// Set the duration, keeping `duration` and `duration_ms` consistent
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self.duration = crate::catalog::format_duration(duration_ms / 1000);
        self
    }

    pub fn is_video(&self) -> bool {
        self.media_type == MediaType::Video
    }

    /// Identity comparison used throughout the playback core
    pub fn same_item(&self, other: &MediaItem) -> bool {
        self.id == other.id
    }

    /// URL the media engine should load
    pub fn playable_url(&self) -> &str {
        match (self.media_type, self.video_url.as_deref()) {
            (MediaType::Video, Some(url)) => url,
            _ => &self.audio_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ignores_metadata() {
        let a = MediaItem::audio("1", "Midnight City", "M83", "https://a/1.mp3");
        let mut b = a.clone();
        b.title = "Midnight City (Remastered)".to_string();

        assert!(a.same_item(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn video_prefers_video_url() {
        let mut item = MediaItem::video("v1", "Clip", "Someone", "https://v/1.m3u8");
        item.audio_url = "https://a/1.mp3".to_string();

        assert!(item.is_video());
        assert_eq!(item.playable_url(), "https://v/1.m3u8");
    }

    #[test]
    fn serializes_with_catalog_field_names() {
        let item = MediaItem::audio("1", "Ocean Drive", "Duke Dumont", "https://a/2.mp3")
            .with_duration_ms(205_000);
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["type"], "audio");
        assert_eq!(json["audioUrl"], "https://a/2.mp3");
        assert_eq!(json["durationMs"], 205_000);
        assert_eq!(json["duration"], "3:25");
        assert_eq!(json["streamType"], "file");
    }
}
