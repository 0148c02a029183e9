//! Error types for the block preview core.

use thiserror::Error;

/// Result type alias using PreviewError.
pub type Result<T> = std::result::Result<T, PreviewError>;

/// Main error type for pack and selection operations.
#[derive(Error, Debug)]
pub enum PreviewError {
    /// Failed to read or parse a ZIP archive.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A pack with this id is already loaded.
    #[error("Duplicate pack id: {0}")]
    DuplicatePackId(String),

    /// No loaded pack has this id.
    #[error("Pack not found: {0}")]
    PackNotFound(String),

    /// A reorder request was not a permutation of the loaded pack ids.
    #[error("Invalid pack permutation: {0}")]
    InvalidPermutation(String),

    /// Invalid resource pack structure.
    #[error("Invalid resource pack: {0}")]
    InvalidResourcePack(String),

    /// The property name is not part of the current block's domain.
    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    /// The value is not in the property's allowed set.
    #[error("Invalid value {value:?} for property {property:?}")]
    InvalidPropertyValue { property: String, value: String },

    /// The condition key does not belong to any active model group.
    #[error("No active model group for condition {0:?}")]
    GroupNotActive(String),

    /// A requested candidate index exceeds the group's model count.
    #[error("Candidate index {index} out of bounds for group {condition:?} ({len} models)")]
    IndexOutOfBounds {
        condition: String,
        index: usize,
        len: usize,
    },
}
