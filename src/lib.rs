//! Waypoint: a finite state machine definition and execution engine
//!
//! States and conditional transitions are declared on a [`Template`] through
//! a builder DSL. Any number of [`Machine`]s are instantiated from a shared
//! template and driven one step at a time by a [`Handler`], the object whose
//! data the transition conditions read and whose methods the actions call.
//!
//! # Core Concepts
//!
//! - **State**: named node flagged initial, final and/or transient
//! - **Transition**: edge with an optional condition and an optional action
//! - **Hook**: callback fired before and after every performed transition
//! - **Transient state**: `run` moves on from it without waiting for an event
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use waypoint::core::{Action, StateOptions};
//! use waypoint::engine::{Handler, RunStatus};
//! use waypoint::template::Template;
//!
//! struct Counter {
//!     value: u32,
//! }
//!
//! impl Handler for Counter {
//!     type Event = ();
//!
//!     fn condition(&self, name: &str, _event: Option<&()>) -> Option<bool> {
//!         match name {
//!             "done" => Some(self.value >= 3),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut template = Template::<Counter>::new();
//! template.declare_state("start", StateOptions::new().initial());
//! template.declare_state("counting", StateOptions::new().transient());
//! template.declare_state("final", StateOptions::new().final_state());
//! template.define_transitions(|t| {
//!     t.from("start")?.goto("counting")?;
//!     t.from("counting")?
//!         .when("done")
//!         .goto("final")?
//!         .otherwise()?
//!         .stay()?
//!         .action(Action::infallible(|c: &mut Counter, _| c.value += 1));
//!     Ok(())
//! })?;
//!
//! let template = Arc::new(template);
//! let mut machine = template.instantiate()?;
//! let mut counter = Counter { value: 0 };
//!
//! let outcome = machine.run(&mut counter, None)?;
//! assert_eq!(outcome.status, RunStatus::Final);
//! assert_eq!(outcome.state, "final");
//! assert_eq!(counter.value, 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod engine;
pub mod template;

// Re-export commonly used types
pub use builder::{BuildError, TransitionBuilder};
pub use checkpoint::{CheckpointError, SavedState};
pub use self::core::{Action, Condition, Hook, HookPhase, State, StateOptions, Transition};
pub use engine::{EngineError, Failure, Handler, Machine, RunOutcome, RunStatus, StepResult};
pub use template::{Template, TemplateError, TransitionOptions};
