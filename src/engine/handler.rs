//! The object driving a machine.

use crate::core::{HookPhase, Transition};
use crate::engine::Failure;

/// Execution context of every condition, action and hook.
///
/// Closure callables receive the handler as their first argument. Named
/// callables are dispatched through `condition`, `action` and `hook`; the
/// defaults know no names, so a handler only overrides the ones its
/// templates refer to. Returning `None` (or `false` for hooks) reports an
/// unknown name.
///
/// # Example
///
/// ```rust
/// use waypoint::engine::{Failure, Handler};
///
/// struct Upload {
///     retries: u32,
///     finished: bool,
/// }
///
/// impl Handler for Upload {
///     type Event = String;
///
///     fn condition(&self, name: &str, _event: Option<&String>) -> Option<bool> {
///         match name {
///             "exhausted" => Some(self.retries >= 3),
///             _ => None,
///         }
///     }
///
///     fn action(&mut self, name: &str, _event: Option<&String>) -> Option<Result<(), Failure>> {
///         match name {
///             "retry" => {
///                 self.retries += 1;
///                 Some(Ok(()))
///             }
///             _ => None,
///         }
///     }
///
///     fn on_finish(&mut self) {
///         self.finished = true;
///     }
/// }
/// ```
pub trait Handler: Sized + 'static {
    /// External input passed to `step` and `run`.
    type Event;

    /// Evaluate a named condition.
    fn condition(&self, name: &str, event: Option<&Self::Event>) -> Option<bool> {
        let _ = (name, event);
        None
    }

    /// Run a named action.
    fn action(&mut self, name: &str, event: Option<&Self::Event>) -> Option<Result<(), Failure>> {
        let _ = (name, event);
        None
    }

    /// Run a named hook. Returns whether the name was known.
    fn hook(
        &mut self,
        name: &str,
        phase: HookPhase,
        transition: &Transition<Self>,
        event: Option<&Self::Event>,
    ) -> bool {
        let _ = (name, phase, transition, event);
        false
    }

    /// Called when a step finds no eligible transition while the machine
    /// sits in a final, non-transient state.
    fn on_finish(&mut self) {}
}
