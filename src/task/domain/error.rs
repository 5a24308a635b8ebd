//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned by domain task operations and value construction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task is not in a claimable state.
    #[error("task {id} cannot be claimed from status {status}")]
    NotClaimable {
        /// Identifier of the task that rejected the claim.
        id: TaskId,
        /// Status the task was in when the claim was attempted.
        status: TaskStatus,
    },

    /// The topic title normalizes to an empty slug.
    #[error("title '{0}' normalizes to an empty slug")]
    EmptySlug(String),

    /// The slug value contains characters outside `[a-z0-9-]`.
    #[error("invalid slug '{0}', expected lowercase letters, digits, and hyphens")]
    InvalidSlug(String),
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task types from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task type: {0}")]
pub struct ParseTaskTypeError(pub String);
