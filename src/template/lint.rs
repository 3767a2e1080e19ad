//! Structural validation of templates.
//!
//! Problems are accumulated with `Validation` so one call reports every
//! issue of a template instead of the first one found.

use crate::engine::Handler;
use crate::template::Template;
use std::collections::{HashSet, VecDeque};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A structural problem found in a template.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateViolation {
    #[error("No state is flagged initial")]
    NoInitialState,

    #[error("Several states are flagged initial: {}", .states.join(", "))]
    SeveralInitialStates { states: Vec<String> },

    #[error("State '{state}' is not final and has no outgoing transitions")]
    DeadEnd { state: String },

    #[error("State '{state}' cannot be reached from the initial state")]
    Unreachable { state: String },
}

impl<H: Handler> Template<H> {
    /// Check the template for structural problems.
    ///
    /// Reports a missing or ambiguous initial state, non-final states
    /// without outgoing transitions, and states the initial state cannot
    /// reach. Reachability ignores conditions.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<TemplateViolation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<TemplateViolation>>> = Vec::new();

        let initial: Vec<&str> = self
            .states()
            .iter()
            .filter(|state| state.is_initial())
            .map(|state| state.name())
            .collect();

        checks.push(match initial.as_slice() {
            [] => Validation::fail(TemplateViolation::NoInitialState),
            [_] => Validation::success(()),
            states => Validation::fail(TemplateViolation::SeveralInitialStates {
                states: states.iter().map(|s| s.to_string()).collect(),
            }),
        });

        for state in self.states() {
            let check = if !state.is_final() && self.possible_transitions(state.name()).is_empty()
            {
                Validation::fail(TemplateViolation::DeadEnd {
                    state: state.name().to_string(),
                })
            } else {
                Validation::success(())
            };
            checks.push(check);
        }

        if let [start] = initial.as_slice() {
            let reachable = self.reachable_from(start);
            for state in self.states() {
                if !reachable.contains(state.name()) {
                    checks.push(Validation::fail(TemplateViolation::Unreachable {
                        state: state.name().to_string(),
                    }));
                }
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }

    fn reachable_from<'a>(&'a self, start: &'a str) -> HashSet<&'a str> {
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(name) = queue.pop_front() {
            for transition in self.possible_transitions(name) {
                if seen.insert(transition.to.as_str()) {
                    queue.push_back(transition.to.as_str());
                }
            }
        }
        seen
    }
}
