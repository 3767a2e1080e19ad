//! In-memory history of performed transitions.
//!
//! History is bookkeeping for the live machine only. It is never part of
//! the persisted position, which is the current state name alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single performed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The state being transitioned from
    pub from: String,
    /// The state being transitioned to
    pub to: String,
    /// When the transition committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of performed transitions.
///
/// `record` returns a new history with the transition added and leaves the
/// original untouched; `push` appends in place. A history built with
/// [`StateHistory::with_limit`] keeps only the most recent records.
///
/// # Example
///
/// ```rust
/// use waypoint::core::{StateHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let history = StateHistory::new()
///     .record(TransitionRecord {
///         from: "start".into(),
///         to: "counting".into(),
///         timestamp: Utc::now(),
///     })
///     .record(TransitionRecord {
///         from: "counting".into(),
///         to: "final".into(),
///         timestamp: Utc::now(),
///     });
///
/// assert_eq!(history.get_path(), vec!["start", "counting", "final"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: VecDeque<TransitionRecord>,
    #[serde(default)]
    limit: Option<usize>,
}

impl StateHistory {
    pub fn new() -> Self {
        Self {
            transitions: VecDeque::new(),
            limit: None,
        }
    }

    /// Create a history retaining at most `limit` records.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            transitions: VecDeque::new(),
            limit: Some(limit),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Empty history with the same retention limit.
    pub fn cleared(&self) -> Self {
        Self {
            transitions: VecDeque::new(),
            limit: self.limit,
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: TransitionRecord) -> Self {
        let mut history = self.clone();
        history.push(transition);
        history
    }

    /// Append a transition in place, evicting the oldest record once the
    /// limit is exceeded.
    pub fn push(&mut self, transition: TransitionRecord) {
        self.transitions.push_back(transition);
        if let Some(limit) = self.limit {
            while self.transitions.len() > limit {
                self.transitions.pop_front();
            }
        }
    }

    /// Names of the states traversed: the first retained source, then the
    /// target of each transition.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.front() {
            path.push(first.from.as_str());
        }
        for transition in &self.transitions {
            path.push(transition.to.as_str());
        }
        path
    }

    /// Time between the first and last retained transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.front(), self.transitions.back()) {
            last.timestamp
                .signed_duration_since(first.timestamp)
                .to_std()
                .ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &VecDeque<TransitionRecord> {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
