//! Errors raised while chaining transition builder calls.

use thiserror::Error;

/// Errors that indicate a malformed builder chain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Source state already set to '{0}'")]
    SourceAlreadySet(String),

    #[error("Target state already set to '{0}'")]
    TargetAlreadySet(String),

    #[error("Cannot create an else branch without a condition. Call .when(condition) first")]
    ElseWithoutCondition,

    #[error("Cannot stay without a source state. Call .from(state) first")]
    StayWithoutSource,
}
