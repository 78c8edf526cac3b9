//! Batch planning and reading error types

use palisade_coordinator::CoordinatorError;
use thiserror::Error;

/// Split planning errors
///
/// Planning never partially succeeds: either a full split list comes back or
/// one of these does.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// No coordinator bound to the planner.
    #[error("no palisade coordinator bound")]
    MissingCoordinator,

    /// The job configuration carries no registered data requests.
    #[error("no data requests registered in the job configuration")]
    NoRequests,

    /// The stored or supplied max-map hint is not a non-negative integer.
    #[error("invalid max-map hint: {0}")]
    InvalidHint(String),

    /// Job configuration could not be (de)serialised.
    #[error("job configuration serialisation failed: {0}")]
    Serialisation(#[from] serde_json::Error),

    /// A registration fanned out to the coordinator failed.
    #[error(transparent)]
    Registration(#[from] CoordinatorError),

    /// A registration task was cancelled or panicked.
    #[error("registration cancelled: {0}")]
    Cancelled(String),
}

impl PlannerError {
    pub fn error_code(&self) -> &'static str {
        match self {
            PlannerError::MissingCoordinator => "MISSING_COORDINATOR",
            PlannerError::NoRequests => "NO_REQUESTS",
            PlannerError::InvalidHint(_) => "INVALID_HINT",
            PlannerError::Serialisation(_) => "SERIALISATION",
            PlannerError::Registration(e) => e.error_code(),
            PlannerError::Cancelled(_) => "CANCELLED",
        }
    }
}

/// Result type for planning operations
pub type PlannerResult<T> = std::result::Result<T, PlannerError>;

/// Record reader errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReaderError {
    /// The split handed to the reader is not a Palisade split.
    #[error("input split is not a palisade input split")]
    SplitTypeMismatch,

    /// The split carries no resources to read.
    #[error("no resources in input split")]
    EmptySplit,
}

impl ReaderError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ReaderError::SplitTypeMismatch => "SPLIT_TYPE_MISMATCH",
            ReaderError::EmptySplit => "EMPTY_SPLIT",
        }
    }
}
