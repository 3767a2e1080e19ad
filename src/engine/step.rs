//! Step and run: the execution protocol of a machine.

use crate::core::{Hook, HookPhase, Transition, TransitionRecord};
use crate::engine::{CallableKind, EngineError, Handler, Machine};
use crate::template::Template;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// A transition that has been performed and committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    pub from: String,
    pub to: String,
    /// Failure recorded while performing the transition, reported after
    /// the state committed to `to`
    pub deferred: Option<EngineError>,
}

/// Result of executing a single step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// Exactly one transition was eligible and has been performed
    Transitioned(Committed),

    /// No transition was eligible from a final, non-transient state
    Finished { state: String },
}

impl StepResult {
    /// Name of the state the machine is in after the step.
    pub fn state(&self) -> &str {
        match self {
            StepResult::Transitioned(committed) => &committed.to,
            StepResult::Finished { state } => state,
        }
    }

    /// Turn a deferred failure into an error.
    pub fn propagate(self) -> Result<Self, EngineError> {
        match self {
            StepResult::Transitioned(Committed {
                deferred: Some(error),
                ..
            }) => Err(error),
            other => Ok(other),
        }
    }
}

/// Why `run` handed control back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The handler's `on_finish` was called
    Finished,
    /// The machine stopped in a final state
    Final,
    /// The machine waits in a non-final state for the next event
    Suspended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub state: String,
    /// Number of `step` calls, the first one included
    pub steps: usize,
    pub status: RunStatus,
}

impl<H: Handler> Machine<H> {
    /// Perform at most one transition.
    ///
    /// Every transition leaving the current state is evaluated against
    /// `handler` and `event`. With none eligible the step either finishes
    /// (final, non-transient state) or fails with
    /// [`EngineError::NoMoreTransitions`]; with several it fails with
    /// [`EngineError::NoDeterministicTransition`]. The single eligible
    /// transition is performed: hooks before, action, hooks after, commit.
    ///
    /// A failure recorded by the action does not prevent the commit; it is
    /// carried in [`Committed::deferred`].
    pub fn step(
        &mut self,
        handler: &mut H,
        event: Option<&H::Event>,
    ) -> Result<StepResult, EngineError> {
        let template = Arc::clone(&self.template);
        let state = Arc::clone(&self.current_state);

        let mut eligible = Vec::new();
        for transition in template.possible_transitions(state.name()) {
            let verdict = transition.is_eligible(handler, event).ok_or_else(|| {
                EngineError::UnknownCallback {
                    kind: CallableKind::Condition,
                    name: transition
                        .condition
                        .as_ref()
                        .map(|c| c.tag().to_string())
                        .unwrap_or_default(),
                }
            })?;
            trace!(%transition, eligible = verdict, "evaluated transition");
            if verdict {
                eligible.push(transition);
            }
        }

        match eligible.as_slice() {
            [] => {
                if state.is_transient() || !state.is_final() {
                    return Err(EngineError::NoMoreTransitions {
                        state: state.name().to_string(),
                    });
                }
                info!(state = %state.name(), "state machine finished");
                handler.on_finish();
                Ok(StepResult::Finished {
                    state: state.name().to_string(),
                })
            }
            [transition] => self
                .perform(&template, transition, handler, event)
                .map(StepResult::Transitioned),
            _ => Err(EngineError::NoDeterministicTransition {
                state: state.name().to_string(),
                destinations: eligible.iter().map(|t| t.to.clone()).collect(),
            }),
        }
    }

    /// Step repeatedly while the machine lands in transient, non-final
    /// states.
    ///
    /// The same event is offered to every step. A deferred failure stops the
    /// loop and is returned as an error once its transition has committed.
    pub fn run(
        &mut self,
        handler: &mut H,
        event: Option<&H::Event>,
    ) -> Result<RunOutcome, EngineError> {
        let mut steps = 0;
        loop {
            steps += 1;
            match self.step(handler, event)? {
                StepResult::Finished { state } => {
                    return Ok(RunOutcome {
                        state,
                        steps,
                        status: RunStatus::Finished,
                    });
                }
                StepResult::Transitioned(committed) => {
                    if let Some(error) = committed.deferred {
                        warn!(state = %committed.to, %error, "run stopped by deferred failure");
                        return Err(error);
                    }
                }
            }
            if !self.current_state.advances() {
                break;
            }
        }

        let status = if self.current_state.is_final() {
            RunStatus::Final
        } else {
            RunStatus::Suspended
        };
        debug!(state = %self.current_state.name(), steps, ?status, "run stopped");
        Ok(RunOutcome {
            state: self.current_state.name().to_string(),
            steps,
            status,
        })
    }

    fn perform(
        &mut self,
        template: &Template<H>,
        transition: &Transition<H>,
        handler: &mut H,
        event: Option<&H::Event>,
    ) -> Result<Committed, EngineError> {
        let target = template
            .state(&transition.to)
            .cloned()
            .ok_or_else(|| EngineError::UnknownState {
                name: transition.to.clone(),
            })?;

        debug!(from = %transition.from, to = %transition.to, "performing transition");
        self.current_transition = Some(transition.clone());

        let mut deferred = None;
        fire_hooks(template.hooks(), HookPhase::Before, transition, handler, event, &mut deferred);

        if let Some(action) = &transition.action {
            match action.invoke(handler, event) {
                Some(Ok(())) => {}
                Some(Err(failure)) => {
                    warn!(%transition, %failure, "transition action failed");
                    deferred.get_or_insert(EngineError::CallbackFailed {
                        from: transition.from.clone(),
                        to: transition.to.clone(),
                        failure,
                    });
                }
                None => {
                    deferred.get_or_insert(EngineError::UnknownCallback {
                        kind: CallableKind::Action,
                        name: action.label().to_string(),
                    });
                }
            }
        }

        fire_hooks(template.hooks(), HookPhase::After, transition, handler, event, &mut deferred);

        self.current_state = target;
        self.history.push(TransitionRecord {
            from: transition.from.clone(),
            to: transition.to.clone(),
            timestamp: Utc::now(),
        });

        Ok(Committed {
            from: transition.from.clone(),
            to: transition.to.clone(),
            deferred,
        })
    }
}

fn fire_hooks<H: Handler>(
    hooks: &[Hook<H>],
    phase: HookPhase,
    transition: &Transition<H>,
    handler: &mut H,
    event: Option<&H::Event>,
    deferred: &mut Option<EngineError>,
) {
    for hook in hooks {
        if !hook.fire(handler, phase, transition, event) {
            deferred.get_or_insert(EngineError::UnknownCallback {
                kind: CallableKind::Hook,
                name: hook.label().to_string(),
            });
        }
    }
    trace!(%transition, %phase, count = hooks.len(), "fired hooks");
}
