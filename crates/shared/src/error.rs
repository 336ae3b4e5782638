use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ControlId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Storage,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadinessError {
    #[error("unknown control id '{id}'")]
    UnknownControl { id: ControlId },
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl ReadinessError {
    pub fn unknown_control(id: impl Into<String>) -> Self {
        Self::UnknownControl {
            id: ControlId(id.into()),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownControl { .. } => ErrorCode::NotFound,
            Self::Storage { .. } => ErrorCode::Storage,
        }
    }
}

/// Reasons a decoded snapshot is rejected on load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("expected {expected} controls, found {actual}")]
    ControlCount { expected: usize, actual: usize },
    #[error("control at position {position} is '{actual}', expected '{expected}'")]
    ControlMismatch {
        position: usize,
        expected: String,
        actual: ControlId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized control status '{input}' (expected not-started, in-progress or done)")]
pub struct ParseStatusError {
    pub input: String,
}
