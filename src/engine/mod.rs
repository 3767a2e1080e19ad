//! Machine instances and the step/run execution protocol.
//!
//! A [`Machine`] is created from a shared [`Template`](crate::template::Template)
//! and driven by a [`Handler`], which is the execution context of every
//! condition, action and hook the template declares.

pub mod error;
pub mod handler;
pub mod machine;
pub mod step;

pub use error::{CallableKind, EngineError, Failure};
pub use handler::Handler;
pub use machine::Machine;
pub use step::{Committed, RunOutcome, RunStatus, StepResult};
