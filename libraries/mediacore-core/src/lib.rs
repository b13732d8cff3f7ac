//! MediaCore Core
//!
//! Platform-agnostic media types and catalog mapping for MediaCore.
//!
//! The playback core never talks to the catalog service itself. It only
//! consumes the [`MediaItem`] values produced here, and compares them by `id`.
//!
//! # Example
//!
//! ```rust
//! use mediacore_core::{FeedPage, MediaType};
//!
//! let body = r#"{"data":[{"id":"42","title":"Night Drive","artistName":"Kavinsky",
//!     "duration":185,"type":"audio","fileUrl":"https://cdn.example.com/night drive.mp3",
//!     "isHls":false}]}"#;
//!
//! let page = FeedPage::from_json(body).unwrap();
//! let items = page.into_media_items();
//!
//! assert_eq!(items[0].duration, "3:05");
//! assert_eq!(items[0].duration_ms, Some(185_000));
//! assert_eq!(items[0].media_type, MediaType::Audio);
//! ```

#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod types;

pub use catalog::{format_duration, FeedEntry, FeedPage};
pub use error::{CatalogError, Result};
pub use types::{CaptionTrack, MediaItem, MediaQuality, MediaType, StreamType};
