//! State values for state machine templates.
//!
//! A state is a named node carrying three independent flags. States are
//! immutable once declared and are shared between cloned templates.

use serde::{Deserialize, Serialize};

/// Flags a state is declared with.
///
/// All flags default to `false`. The type is deserializable so state tables
/// can be described in configuration data.
///
/// # Example
///
/// ```rust
/// use waypoint::core::StateOptions;
///
/// let options = StateOptions::new().initial();
/// assert!(options.initial);
/// assert!(!options.r#final);
///
/// let parsed: StateOptions = serde_json::from_str(r#"{"final": true}"#).unwrap();
/// assert!(parsed.r#final);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateOptions {
    /// The machine starts in this state
    pub initial: bool,
    /// The machine may finish in this state
    pub r#final: bool,
    /// `run` passes through this state without waiting for an event
    pub transient: bool,
}

impl StateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial(mut self) -> Self {
        self.initial = true;
        self
    }

    pub fn final_state(mut self) -> Self {
        self.r#final = true;
        self
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }
}

/// A named node of a state machine graph.
///
/// # Example
///
/// ```rust
/// use waypoint::core::{State, StateOptions};
///
/// let state = State::new("counting", StateOptions::new().transient());
///
/// assert_eq!(state.name(), "counting");
/// assert!(state.is_transient());
/// assert!(!state.is_final());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    name: String,
    options: StateOptions,
}

impl State {
    pub fn new(name: impl Into<String>, options: StateOptions) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    /// Get the state's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> StateOptions {
        self.options
    }

    /// Check if the machine starts in this state.
    pub fn is_initial(&self) -> bool {
        self.options.initial
    }

    /// Check if this is a final state.
    ///
    /// A machine with no eligible transitions left completes cleanly only
    /// when it sits in a final, non-transient state.
    pub fn is_final(&self) -> bool {
        self.options.r#final
    }

    /// Check if `run` advances through this state automatically.
    pub fn is_transient(&self) -> bool {
        self.options.transient
    }

    /// Check if `run` keeps stepping once the machine lands here.
    ///
    /// A state that is both transient and final stops the loop.
    pub fn advances(&self) -> bool {
        self.is_transient() && !self.is_final()
    }
}
