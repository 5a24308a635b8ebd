//! Repository port for task persistence and the atomic claim transition.

use crate::task::domain::{AgentId, CommentId, EntryId, Task, TaskId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// [`claim`](TaskRepository::claim) is the single concurrency-critical
/// operation in the subsystem; everything else is plain row access. Listing
/// methods take `now` as a parameter so adapters stay clock-free and tests
/// stay deterministic.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID
    /// already exists.
    async fn create(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns unclaimed, non-expired tasks ordered by priority descending,
    /// then creation time ascending.
    ///
    /// The ordering is a correctness-relevant contract: oldest-first within
    /// a priority tier is what keeps old low-priority tasks from starving
    /// once higher-priority work is drained.
    async fn list_pending(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns pending, non-expired tasks pre-assigned to `agent`, with the
    /// same ordering as [`list_pending`](TaskRepository::list_pending).
    async fn list_pending_for_agent(
        &self,
        agent: AgentId,
        now: DateTime<Utc>,
        limit: i64,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns tasks ever assigned to `agent`, newest first.
    async fn list_by_agent(
        &self,
        agent: AgentId,
        limit: i64,
        offset: i64,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Transitions the task from `pending` to `claimed` for `agent`.
    ///
    /// Implementations MUST evaluate the "status is still pending" guard and
    /// the write as one atomic step — a conditional `UPDATE`, or the domain
    /// guard under a lock. Reading the row, checking, and writing back from
    /// the caller reintroduces the double-claim race this port exists to
    /// prevent.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::ClaimConflict`] when the guard fails —
    /// the task was no longer pending (or no longer present) when the write
    /// landed.
    async fn claim(
        &self,
        id: TaskId,
        agent: AgentId,
        claimed_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<()>;

    /// Marks the task completed and stamps the result references.
    ///
    /// Unconditional: the engine has already verified assignment and state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn complete(
        &self,
        id: TaskId,
        result_entry: Option<EntryId>,
        result_comment: Option<CommentId>,
        completed_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<()>;

    /// Moves every overdue `pending` or `claimed` task to `expired` and
    /// returns how many rows transitioned.
    async fn expire_overdue(&self, now: DateTime<Utc>) -> TaskRepositoryResult<u64>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The claim guard failed: the task was not pending when the
    /// conditional write landed.
    #[error("task {0} was no longer pending when the claim landed")]
    ClaimConflict(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
