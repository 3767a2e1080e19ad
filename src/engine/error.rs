//! Errors raised while instantiating and stepping machines.

use std::fmt;
use thiserror::Error;

/// Value an action returns to request a deferred failure.
///
/// The transition still commits; the failure is reported to the caller of
/// `step` afterwards.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct Failure {
    message: String,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Failure::new(message)
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure::new(message)
    }
}

/// Kind of callable a handler failed to resolve by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableKind {
    Condition,
    Action,
    Hook,
}

impl fmt::Display for CallableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallableKind::Condition => f.write_str("condition"),
            CallableKind::Action => f.write_str("action"),
            CallableKind::Hook => f.write_str("hook"),
        }
    }
}

/// Errors surfaced by machines. None of them is retried internally.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Cannot transition anywhere from {state}")]
    NoMoreTransitions { state: String },

    #[error(
        "Cannot deterministically transition anywhere from {state}. Possibilities are {}",
        .destinations.join(", ")
    )]
    NoDeterministicTransition {
        state: String,
        destinations: Vec<String>,
    },

    #[error("There is no initial state")]
    NoInitialState,

    #[error("Cannot determine initial state. Possibilities are {}", .states.join(", "))]
    NoDeterministicInitialState { states: Vec<String> },

    #[error("Unknown state '{name}'")]
    UnknownState { name: String },

    #[error("Handler does not know {kind} '{name}'")]
    UnknownCallback { kind: CallableKind, name: String },

    #[error("Transition {from} -> {to} failed: {failure}")]
    CallbackFailed {
        from: String,
        to: String,
        failure: Failure,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_states() {
        let error = EngineError::NoDeterministicTransition {
            state: "a".into(),
            destinations: vec!["b".into(), "c".into()],
        };
        assert_eq!(
            error.to_string(),
            "Cannot deterministically transition anywhere from a. Possibilities are b, c"
        );

        let error = EngineError::NoDeterministicInitialState {
            states: vec!["x".into(), "y".into()],
        };
        assert_eq!(
            error.to_string(),
            "Cannot determine initial state. Possibilities are x, y"
        );
    }

    #[test]
    fn callback_failure_wraps_message() {
        let error = EngineError::CallbackFailed {
            from: "a".into(),
            to: "b".into(),
            failure: "disk full".into(),
        };

        assert_eq!(error.to_string(), "Transition a -> b failed: disk full");
    }

    #[test]
    fn unknown_callback_names_kind() {
        let error = EngineError::UnknownCallback {
            kind: CallableKind::Hook,
            name: "audit".into(),
        };

        assert_eq!(error.to_string(), "Handler does not know hook 'audit'");
    }
}
