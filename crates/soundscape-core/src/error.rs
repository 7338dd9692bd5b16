//! Error types for the soundscape engine.

use thiserror::Error;

use crate::catalog::Pack;

/// Main error type for soundscape operations.
///
/// `Load`, `Closed` and `UnresolvedAsset` are contained inside the engine:
/// they are logged and degrade to "this one sound doesn't play".
#[derive(Error, Debug)]
pub enum SoundscapeError {
    /// Fetching or decoding an audio asset failed.
    #[error("Failed to load {url}: {reason}")]
    Load { url: String, reason: String },

    /// An audio operation was attempted after the graph was torn down.
    #[error("Audio graph is closed")]
    Closed,

    /// No asset mapping exists for a source yet.
    #[error("No audio asset for '{source_id}' in pack {pack}")]
    UnresolvedAsset { pack: Pack, source_id: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decoder error: {0}")]
    Decode(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Audio device error: {0}")]
    Device(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SoundscapeError {
    /// Build a load error from any displayable cause.
    pub fn load(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Load {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error is an expected soft failure that should be
    /// skipped silently rather than reported.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::Load { .. } | Self::UnresolvedAsset { .. } | Self::Decode(_)
        )
    }
}

/// Result type alias for soundscape operations.
pub type Result<T> = std::result::Result<T, SoundscapeError>;
