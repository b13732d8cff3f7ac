mod media;

pub use media::{CaptionTrack, MediaItem, MediaQuality, MediaType, StreamType};
