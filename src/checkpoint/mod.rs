//! Persisted position of a machine.
//!
//! A machine is persisted as the name of its current state only. Restoring
//! it requires the same template it was saved from; history and the current
//! transition are not carried over.

use serde::{Deserialize, Serialize};

pub mod error;

pub use error::CheckpointError;

/// Saved position of a machine, as returned by
/// [`Machine::save`](crate::engine::Machine::save).
///
/// # Example
///
/// ```rust
/// use waypoint::checkpoint::SavedState;
///
/// let saved = SavedState::new("counting");
/// let json = saved.to_json()?;
/// assert_eq!(json, r#"{"current_state":"counting"}"#);
///
/// let bytes = saved.to_bytes()?;
/// assert_eq!(SavedState::from_bytes(&bytes)?, saved);
/// # Ok::<(), waypoint::checkpoint::CheckpointError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedState {
    pub current_state: String,
}

impl SavedState {
    pub fn new(current_state: impl Into<String>) -> Self {
        Self {
            current_state: current_state.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json).map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }
}
