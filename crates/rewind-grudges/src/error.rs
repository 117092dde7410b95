#![forbid(unsafe_code)]

use thiserror::Error;

use crate::grudge::GrudgeId;

pub type Result<T> = std::result::Result<T, GrudgeError>;

/// Raised when the grudge transition cannot handle an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrudgeError {
    #[error("no grudge with id {id}")]
    UnknownGrudge { id: GrudgeId },

    #[error("{action} is handled by the history, not the grudge list")]
    ReservedAction { action: &'static str },
}
