//! Core value types of the state machine graph.
//!
//! This module contains the definition-time and runtime values shared by
//! the builder, the template and the engine:
//! - `State` nodes and their flags
//! - `Transition` edges with guards and actions
//! - Callables (`Condition`, `Action`, `Hook`) resolved against a handler
//! - In-memory transition history

mod guard;
mod history;
mod state;
mod transition;

pub use guard::{Action, Callback, Condition, Hook, HookFn, HookPhase, Predicate};
pub use history::{StateHistory, TransitionRecord};
pub use state::{State, StateOptions};
pub use transition::Transition;
