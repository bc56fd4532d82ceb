use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningErrorKind {
    Invalid,
    Overflow,
    NotFound,
    InvalidState,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningError {
    pub kind: PlanningErrorKind,
    pub message: String,
}

impl PlanningError {
    pub fn new(kind: PlanningErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == PlanningErrorKind::NotFound
    }
}

impl fmt::Display for PlanningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for PlanningError {}

pub fn invalid(message: impl Into<String>) -> PlanningError {
    PlanningError::new(PlanningErrorKind::Invalid, message)
}

pub fn overflow(message: impl Into<String>) -> PlanningError {
    PlanningError::new(PlanningErrorKind::Overflow, message)
}

pub fn not_found(message: impl Into<String>) -> PlanningError {
    PlanningError::new(PlanningErrorKind::NotFound, message)
}

pub fn invalid_state(message: impl Into<String>) -> PlanningError {
    PlanningError::new(PlanningErrorKind::InvalidState, message)
}

pub fn internal_error(message: impl Into<String>) -> PlanningError {
    PlanningError::new(PlanningErrorKind::Internal, message)
}
