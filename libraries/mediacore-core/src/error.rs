/// Core error types for MediaCore
use thiserror::Error;

/// Result type alias using `CatalogError`
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised while turning catalog payloads into media items
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Feed body was not valid JSON for the expected shape
    #[error("Malformed feed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Entry has neither a file URL nor a stream URL
    #[error("Feed entry {id} has no playable URL")]
    MissingUrl { id: String },
}
