//! @acp:module "Errors"
//! @acp:summary "Error types for allocation, configuration and collaborator failures"
//! @acp:domain engine
//! @acp:layer types

use std::time::Duration;

use thiserror::Error;

/// Errors raised by the engine, the planner and the store adapters
#[derive(Debug, Error)]
pub enum GamePlanError {
    #[error("invalid configuration for section '{section}': {reason}")]
    InvalidConfiguration { section: String, reason: String },

    #[error("unknown section: {0}")]
    UnknownSection(String),

    #[error("section '{0}' is already being regenerated")]
    RegenerationInProgress(String),

    #[error("section '{section}' has no slot at position {position}")]
    InvalidPosition { section: String, position: usize },

    #[error("section '{0}' has no empty slot")]
    SectionFull(String),

    #[error("slot {position} of section '{section}' is locked")]
    SlotLocked { section: String, position: usize },

    #[error("unknown play: {0}")]
    UnknownPlay(String),

    #[error("failed to persist section '{section}': {reason}")]
    Persistence { section: String, reason: String },

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("collaborator failure: {0}")]
    Source(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GamePlanError {
    pub(crate) fn invalid(section: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            section: section.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was rejected before any allocation ran
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }
}

pub type Result<T> = std::result::Result<T, GamePlanError>;
