//! Fully specified transitions between two states.

use crate::core::{Action, Condition};
use crate::engine::Handler;
use std::fmt;

/// An edge of the state machine graph.
///
/// A transition without a condition is always eligible. With a condition it
/// is eligible when the condition evaluates to `true`, or to `false` when
/// `negate` is set.
pub struct Transition<H: Handler> {
    pub from: String,
    pub to: String,
    pub condition: Option<Condition<H>>,
    pub negate: bool,
    pub action: Option<Action<H>>,
    pub description: Option<String>,
}

impl<H: Handler> Transition<H> {
    /// Create an unconditional transition without an action.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            condition: None,
            negate: false,
            action: None,
            description: None,
        }
    }

    pub fn with_condition(mut self, condition: Condition<H>, negate: bool) -> Self {
        self.condition = Some(condition);
        self.negate = negate;
        self
    }

    pub fn with_action(mut self, action: Action<H>) -> Self {
        self.action = Some(action);
        self
    }

    /// Check whether the transition can be taken.
    ///
    /// Returns `None` when the condition names something the handler cannot
    /// resolve.
    pub fn is_eligible(&self, handler: &H, event: Option<&H::Event>) -> Option<bool> {
        match &self.condition {
            None => Some(true),
            Some(condition) => condition
                .evaluate(handler, event)
                .map(|result| result != self.negate),
        }
    }

    /// Human-readable guard label, `!` prefixed when negated.
    pub fn guard_label(&self) -> Option<String> {
        self.condition.as_ref().map(|condition| {
            let bang = if self.negate { "!" } else { "" };
            format!("{}{}", bang, condition.tag())
        })
    }
}

impl<H: Handler> Clone for Transition<H> {
    fn clone(&self) -> Self {
        Self {
            from: self.from.clone(),
            to: self.to.clone(),
            condition: self.condition.clone(),
            negate: self.negate,
            action: self.action.clone(),
            description: self.description.clone(),
        }
    }
}

impl<H: Handler> fmt::Debug for Transition<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("condition", &self.condition)
            .field("negate", &self.negate)
            .field("action", &self.action)
            .field("description", &self.description)
            .finish()
    }
}

impl<H: Handler> fmt::Display for Transition<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
