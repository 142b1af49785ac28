use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Typed failures produced by the level and session engines.
///
/// Every variant maps to a stable human-readable message; the HTTP layer
/// owns the status-code mapping. Only `Internal` represents an unexpected
/// store failure.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum EngineError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("level is not unlocked yet")]
    Locked,
    #[error("{0}")]
    InvalidState(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    PreconditionFailed(&'static str),
    #[error("you already joined this session")]
    AlreadyJoined,
    #[error("session is full")]
    Full,
    #[error("not enough active words to start the game")]
    InsufficientContent,
    #[error("{0}")]
    Conflict(&'static str),
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Wrap an unexpected store or decoding failure.
    pub fn internal(err: impl Display) -> Self {
        EngineError::Internal(err.to_string())
    }
}
