//! Callables attached to transitions: conditions, actions and hooks.
//!
//! Every callable is a tagged variant. A `Named` callable is resolved
//! against the driving [`Handler`] at execution time, a closure callable is
//! called with the handler as its first argument. Either way the handler is
//! the execution context, so callables can read (conditions) or mutate
//! (actions, hooks) the state of the object driving the machine.

use crate::core::Transition;
use crate::engine::{Failure, Handler};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Closure form of a condition.
pub type Predicate<H> = Arc<dyn Fn(&H, Option<&<H as Handler>::Event>) -> bool + Send + Sync>;

/// Closure form of a transition action.
pub type Callback<H> =
    Arc<dyn Fn(&mut H, Option<&<H as Handler>::Event>) -> Result<(), Failure> + Send + Sync>;

/// Closure form of an around-transition hook.
pub type HookFn<H> = Arc<
    dyn Fn(&mut H, HookPhase, &Transition<H>, Option<&<H as Handler>::Event>) + Send + Sync,
>;

/// Guard deciding whether a transition is eligible.
///
/// # Example
///
/// ```rust
/// use waypoint::core::Condition;
/// use waypoint::engine::Handler;
///
/// struct Counter {
///     value: u32,
/// }
///
/// impl Handler for Counter {
///     type Event = ();
///
///     fn condition(&self, name: &str, _event: Option<&()>) -> Option<bool> {
///         match name {
///             "done" => Some(self.value >= 3),
///             _ => None,
///         }
///     }
/// }
///
/// let named: Condition<Counter> = Condition::named("done");
/// let closure = Condition::new("value is even", |c: &Counter, _| c.value % 2 == 0);
///
/// let counter = Counter { value: 4 };
/// assert_eq!(named.evaluate(&counter, None), Some(true));
/// assert_eq!(closure.evaluate(&counter, None), Some(true));
/// assert_eq!(closure.tag(), "value is even");
/// ```
pub enum Condition<H: Handler> {
    /// Resolved through [`Handler::condition`]
    Named(String),
    /// Evaluated directly; `tag` is its human-readable label
    Predicate { tag: String, predicate: Predicate<H> },
}

impl<H: Handler> Condition<H> {
    pub fn named(name: impl Into<String>) -> Self {
        Condition::Named(name.into())
    }

    pub fn new<F>(tag: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&H, Option<&H::Event>) -> bool + Send + Sync + 'static,
    {
        Condition::Predicate {
            tag: tag.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Stable label used by diagnostics.
    pub fn tag(&self) -> &str {
        match self {
            Condition::Named(name) => name,
            Condition::Predicate { tag, .. } => tag,
        }
    }

    /// Evaluate against the handler. `None` means the handler does not know
    /// a named condition.
    pub fn evaluate(&self, handler: &H, event: Option<&H::Event>) -> Option<bool> {
        match self {
            Condition::Named(name) => handler.condition(name, event),
            Condition::Predicate { predicate, .. } => Some(predicate(handler, event)),
        }
    }
}

impl<H: Handler> Clone for Condition<H> {
    fn clone(&self) -> Self {
        match self {
            Condition::Named(name) => Condition::Named(name.clone()),
            Condition::Predicate { tag, predicate } => Condition::Predicate {
                tag: tag.clone(),
                predicate: Arc::clone(predicate),
            },
        }
    }
}

impl<H: Handler> fmt::Debug for Condition<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Condition::Predicate { tag, .. } => f.debug_tuple("Predicate").field(tag).finish(),
        }
    }
}

impl<H: Handler> From<&str> for Condition<H> {
    fn from(name: &str) -> Self {
        Condition::named(name)
    }
}

impl<H: Handler> From<String> for Condition<H> {
    fn from(name: String) -> Self {
        Condition::Named(name)
    }
}

/// Callback executed while a transition is performed.
///
/// Returning `Err(Failure)` records a deferred failure: the transition still
/// commits and the failure is reported afterwards.
pub enum Action<H: Handler> {
    /// Resolved through [`Handler::action`]
    Named(String),
    Callback(Callback<H>),
}

impl<H: Handler> Action<H> {
    pub fn named(name: impl Into<String>) -> Self {
        Action::Named(name.into())
    }

    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&mut H, Option<&H::Event>) -> Result<(), Failure> + Send + Sync + 'static,
    {
        Action::Callback(Arc::new(callback))
    }

    /// Build an action that cannot fail.
    pub fn infallible<F>(callback: F) -> Self
    where
        F: Fn(&mut H, Option<&H::Event>) + Send + Sync + 'static,
    {
        Action::new(move |handler, event| {
            callback(handler, event);
            Ok(())
        })
    }

    /// Name of a named action, `<closure>` otherwise.
    pub fn label(&self) -> &str {
        match self {
            Action::Named(name) => name,
            Action::Callback(_) => "<closure>",
        }
    }

    /// Run the action. `None` means the handler does not know a named action.
    pub fn invoke(&self, handler: &mut H, event: Option<&H::Event>) -> Option<Result<(), Failure>> {
        match self {
            Action::Named(name) => handler.action(name, event),
            Action::Callback(callback) => Some(callback(handler, event)),
        }
    }
}

impl<H: Handler> Clone for Action<H> {
    fn clone(&self) -> Self {
        match self {
            Action::Named(name) => Action::Named(name.clone()),
            Action::Callback(callback) => Action::Callback(Arc::clone(callback)),
        }
    }
}

impl<H: Handler> fmt::Debug for Action<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Action::Callback(_) => f.write_str("Callback(<closure>)"),
        }
    }
}

impl<H: Handler> From<&str> for Action<H> {
    fn from(name: &str) -> Self {
        Action::named(name)
    }
}

/// Which side of a performed transition a hook is called on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookPhase {
    Before,
    After,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::Before => f.write_str("before"),
            HookPhase::After => f.write_str("after"),
        }
    }
}

/// Callback wrapped around every performed transition.
pub enum Hook<H: Handler> {
    /// Resolved through [`Handler::hook`]
    Named(String),
    Callback(HookFn<H>),
}

impl<H: Handler> Hook<H> {
    pub fn named(name: impl Into<String>) -> Self {
        Hook::Named(name.into())
    }

    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&mut H, HookPhase, &Transition<H>, Option<&H::Event>) + Send + Sync + 'static,
    {
        Hook::Callback(Arc::new(hook))
    }

    /// Name of a named hook, `<closure>` otherwise.
    pub fn label(&self) -> &str {
        match self {
            Hook::Named(name) => name,
            Hook::Callback(_) => "<closure>",
        }
    }

    /// Fire the hook. Returns `false` when the handler does not know a
    /// named hook.
    pub fn fire(
        &self,
        handler: &mut H,
        phase: HookPhase,
        transition: &Transition<H>,
        event: Option<&H::Event>,
    ) -> bool {
        match self {
            Hook::Named(name) => handler.hook(name, phase, transition, event),
            Hook::Callback(hook) => {
                hook(handler, phase, transition, event);
                true
            }
        }
    }
}

impl<H: Handler> Clone for Hook<H> {
    fn clone(&self) -> Self {
        match self {
            Hook::Named(name) => Hook::Named(name.clone()),
            Hook::Callback(hook) => Hook::Callback(Arc::clone(hook)),
        }
    }
}

impl<H: Handler> fmt::Debug for Hook<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Hook::Callback(_) => f.write_str("Callback(<closure>)"),
        }
    }
}
