//! Errors raised while encoding or decoding a [`SavedState`](super::SavedState).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    /// `to_json` or `to_bytes` could not encode the saved state
    #[error("Cannot encode saved state: {0}")]
    SerializationFailed(String),

    /// `from_json` or `from_bytes` got input that is not a saved state
    #[error("Cannot decode saved state: {0}")]
    DeserializationFailed(String),
}
