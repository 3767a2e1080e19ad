//! Errors raised while declaring templates.

use crate::builder::BuildError;
use std::fmt;
use thiserror::Error;

/// Side of a transition that names a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    From,
    To,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::From => f.write_str("from"),
            Direction::To => f.write_str("to"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Cannot create transition {direction} unknown state '{state}'")]
    UnknownStateTransition { direction: Direction, state: String },

    #[error(transparent)]
    Build(#[from] BuildError),
}
