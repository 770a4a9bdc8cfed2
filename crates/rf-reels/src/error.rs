//! Error types for rf-reels

use thiserror::Error;

/// Reel core error type
///
/// Only setup can fail. Runtime operations (spin, stop, start, advance)
/// absorb guard violations as no-ops instead of returning errors.
#[derive(Error, Debug)]
pub enum ReelError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Texture table mismatch: {sharp} sharp vs {blurred} blurred textures")]
    TextureMismatch { sharp: usize, blurred: usize },

    #[error("Texture table is empty")]
    EmptyTextureTable,

    #[error("Asset error: {0}")]
    Asset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

/// Result type alias
pub type ReelResult<T> = Result<T, ReelError>;
