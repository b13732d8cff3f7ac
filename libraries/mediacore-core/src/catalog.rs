//! Catalog feed mapping
//!
//! Converts entries of the catalog's public feed endpoint into [`MediaItem`]s.
//! Only the mapping lives here; fetching the feed is the caller's business.

use crate::error::{CatalogError, Result};
use crate::types::{MediaItem, MediaType, StreamType};
use serde::{Deserialize, Serialize};

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const PLACEHOLDER_COVER: &str = "https://via.placeholder.com/300";

/// One page of the feed endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub data: Vec<FeedEntry>,
}

/// Raw feed entry as served by the catalog API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Length in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub stream_url: Option<String>,
    #[serde(default)]
    pub is_hls: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl FeedPage {
    /// Parse a feed response body
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Map every entry that has a playable URL, in feed order
    pub fn into_media_items(self) -> Vec<MediaItem> {
        self.data
            .into_iter()
            .filter_map(|entry| entry.into_media_item().ok())
            .collect()
    }
}

impl FeedEntry {
    /// Map this entry into a [`MediaItem`]
    ///
    /// Fails with [`CatalogError::MissingUrl`] when neither `fileUrl` nor
    /// `streamUrl` is present.
    pub fn into_media_item(self) -> Result<MediaItem> {
        let raw_url = self
            .file_url
            .as_deref()
            .or(self.stream_url.as_deref())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| CatalogError::MissingUrl {
                id: self.id.clone(),
            })?;
        let url = encode_url(raw_url);

        let seconds = self.duration.unwrap_or(0.0).max(0.0);
        let is_video = self.kind.as_deref() == Some("video");

        Ok(MediaItem {
            id: self.id,
            title: self.title,
            artist: self
                .artist_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            album: Some("Single".to_string()),
            cover_url: self
                .thumbnail_url
                .filter(|cover| !cover.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_COVER.to_string()),
            duration: format_duration(seconds as u64),
            duration_ms: Some((seconds * 1000.0).round() as u64),
            media_type: if is_video {
                MediaType::Video
            } else {
                MediaType::Audio
            },
            category: if is_video { "Video" } else { "Music" }.to_string(),
            genre: Some("Unknown".to_string()),
            audio_url: url.clone(),
            video_url: Some(url),
            stream_type: if self.is_hls {
                StreamType::Hls
            } else {
                StreamType::File
            },
            release_date: self.created_at,
            ..MediaItem::default()
        })
    }
}

/// Format whole seconds as `m:ss`
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Percent-encode a URL the way a browser would before requesting it.
/// Strings that do not parse as absolute URLs are passed through untouched.
fn encode_url(raw: &str) -> String {
    url::Url::parse(raw)
        .map(|parsed| parsed.to_string())
        .unwrap_or_else(|_| raw.to_string())
}
