//! Builder API for ergonomic transition definition.
//!
//! [`TransitionBuilder`] turns chains such as
//! `from("a").when(c).goto("b").otherwise().goto("c")` into flat lists of
//! fully specified transitions. The [`states!`](crate::states) macro
//! declares several states in one go.

pub mod error;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use transition::TransitionBuilder;
