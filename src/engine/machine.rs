//! Live machine instances bound to a template.

use crate::checkpoint::SavedState;
use crate::core::{State, StateHistory, Transition};
use crate::engine::{EngineError, Handler};
use crate::template::Template;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// One live instance of a [`Template`].
///
/// A machine sits in exactly one state at a time. It is advanced by
/// [`Machine::step`] and [`Machine::run`]; its persisted position is the
/// [`SavedState`] returned by [`Machine::save`].
pub struct Machine<H: Handler> {
    pub(super) template: Arc<Template<H>>,
    pub(super) current_state: Arc<State>,
    pub(super) current_transition: Option<Transition<H>>,
    pub(super) history: StateHistory,
}

impl<H: Handler> Machine<H> {
    /// Create a machine positioned at the template's initial state.
    ///
    /// Fails with [`EngineError::NoInitialState`] when no state is flagged
    /// initial and [`EngineError::NoDeterministicInitialState`] when several
    /// are.
    pub fn new(template: Arc<Template<H>>) -> Result<Self, EngineError> {
        let current_state = initial_state(&template)?;
        Ok(Self {
            template,
            current_state,
            current_transition: None,
            history: StateHistory::new(),
        })
    }

    /// Move back to the initial state, forgetting the current transition
    /// and the history.
    pub fn resolve_initial_state(&mut self) -> Result<(), EngineError> {
        self.current_state = initial_state(&self.template)?;
        self.current_transition = None;
        self.history = self.history.cleared();
        Ok(())
    }

    /// Keep only the `limit` most recent transitions in the history.
    pub fn limit_history(&mut self, limit: usize) {
        let mut history = StateHistory::with_limit(limit);
        for record in self.history.transitions() {
            history.push(record.clone());
        }
        self.history = history;
    }

    pub fn current_state(&self) -> &State {
        &self.current_state
    }

    /// The transition most recently performed, if any since creation or
    /// the last restore.
    pub fn current_transition(&self) -> Option<&Transition<H>> {
        self.current_transition.as_ref()
    }

    pub fn possible_transitions(&self) -> Vec<&Transition<H>> {
        self.template.possible_transitions(self.current_state.name())
    }

    pub fn template(&self) -> &Arc<Template<H>> {
        &self.template
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    /// Check if the machine may finish in its current state.
    pub fn can_end(&self) -> bool {
        self.current_state.is_final()
    }

    /// Persisted position of the machine.
    pub fn save(&self) -> SavedState {
        SavedState::new(self.current_state.name())
    }

    /// Reposition the machine at a saved state.
    ///
    /// Fails with [`EngineError::UnknownState`] and leaves the machine
    /// untouched when the template has no state of that name.
    pub fn restore(&mut self, saved: &SavedState) -> Result<(), EngineError> {
        let state = self
            .template
            .state(&saved.current_state)
            .cloned()
            .ok_or_else(|| EngineError::UnknownState {
                name: saved.current_state.clone(),
            })?;
        debug!(state = %state.name(), "restored machine");
        self.current_state = state;
        self.current_transition = None;
        self.history = self.history.cleared();
        Ok(())
    }
}

fn initial_state<H: Handler>(template: &Template<H>) -> Result<Arc<State>, EngineError> {
    let initial: Vec<&Arc<State>> = template
        .states()
        .iter()
        .filter(|state| state.is_initial())
        .collect();

    match initial.as_slice() {
        [state] => Ok(Arc::clone(state)),
        [] => Err(EngineError::NoInitialState),
        states => Err(EngineError::NoDeterministicInitialState {
            states: states.iter().map(|s| s.name().to_string()).collect(),
        }),
    }
}

impl<H: Handler> fmt::Debug for Machine<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("current_state", &self.current_state)
            .field("current_transition", &self.current_transition)
            .field("history", &self.history)
            .finish()
    }
}
