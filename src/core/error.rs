//! Core capability errors (parsing, validation).
//!
//! These are bounded and stable: core errors represent domain/refusal states,
//! not library implementation details.

use thiserror::Error;

use crate::error::{Effect, Transience};

/// Invalid identifier.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum InvalidId {
    #[error("record id `{raw}` is invalid: {reason}")]
    Record { raw: String, reason: String },
    #[error("link id `{raw}` is invalid: {reason}")]
    Link { raw: String, reason: String },
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    #[error(transparent)]
    InvalidId(#[from] InvalidId),
}

impl CoreError {
    pub fn transience(&self) -> Transience {
        match self {
            CoreError::InvalidId(_) => Transience::Permanent,
        }
    }

    pub fn effect(&self) -> Effect {
        match self {
            CoreError::InvalidId(_) => Effect::None,
        }
    }
}
