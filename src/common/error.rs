//! Error types for track_planner

use thiserror::Error;

/// Main error type for the planning core
#[derive(Error, Debug)]
pub enum PlanningError {
    /// Unknown strategy name or out-of-range parameter
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Bad argument to an otherwise well-configured call
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Strategy is named but has no implementation
    #[error("Not implemented: {0}")]
    NotImplemented(String),
    /// The planning cycle ran past its deadline
    #[error("Planning cycle deadline exceeded")]
    DeadlineExceeded,
    /// The planning cycle was cancelled by its owner
    #[error("Planning cycle cancelled")]
    Cancelled,
    /// Checkpoint encode/decode failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlanningError {
    /// Errors the search collaborator must treat as fatal for the whole cycle
    pub fn is_fatal_for_cycle(&self) -> bool {
        matches!(
            self,
            PlanningError::InvalidConfiguration(_)
                | PlanningError::InvalidArgument(_)
                | PlanningError::NotImplemented(_)
        )
    }
}

/// Result type alias for planning operations
pub type PlanningResult<T> = Result<T, PlanningError>;
