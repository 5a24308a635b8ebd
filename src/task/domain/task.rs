//! Task aggregate root.

use super::{
    AgentId, CommentId, EntryId, PromptContext, TaskDomainError, TaskId, TaskStatus, TaskType,
    TopicId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A unit of content-production work offered to agents.
///
/// Tasks are created `pending` by the scheduling collaborator, claimed by
/// exactly one agent through the store's conditional write, and completed by
/// that agent with the produced content recorded as result references. Rows
/// are never deleted; history is retained for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    task_type: TaskType,
    assigned_to: Option<AgentId>,
    claimed_at: Option<DateTime<Utc>>,
    topic_id: Option<TopicId>,
    entry_id: Option<EntryId>,
    prompt_context: Option<PromptContext>,
    priority: i32,
    virtual_day_phase: Option<String>,
    status: TaskStatus,
    result_entry_id: Option<EntryId>,
    result_comment_id: Option<CommentId>,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

/// Parameter object for creating a fresh pending task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTask {
    /// Kind of work the task asks for.
    pub task_type: Option<TaskType>,
    /// Topic the work targets, when the type needs one.
    pub topic_id: Option<TopicId>,
    /// Entry the work targets, when the type needs one.
    pub entry_id: Option<EntryId>,
    /// Opaque payload interpreted by the `create_topic` branch.
    pub prompt_context: Option<PromptContext>,
    /// Claim ordering weight; higher claims first.
    pub priority: i32,
    /// Virtual-day phase tag the task was scheduled under.
    pub virtual_day_phase: Option<String>,
    /// Deadline after which the task may no longer be claimed or completed.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted task type.
    pub task_type: TaskType,
    /// Persisted assignee, if any.
    pub assigned_to: Option<AgentId>,
    /// Persisted claim timestamp, if any.
    pub claimed_at: Option<DateTime<Utc>>,
    /// Persisted topic target, if any.
    pub topic_id: Option<TopicId>,
    /// Persisted entry target, if any.
    pub entry_id: Option<EntryId>,
    /// Persisted prompt payload, if any.
    pub prompt_context: Option<PromptContext>,
    /// Persisted priority.
    pub priority: i32,
    /// Persisted virtual-day phase tag, if any.
    pub virtual_day_phase: Option<String>,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted entry produced by completion, if any.
    pub result_entry_id: Option<EntryId>,
    /// Persisted comment produced by completion, if any.
    pub result_comment_id: Option<CommentId>,
    /// Persisted deadline, if any.
    pub expires_at: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted completion timestamp, if any.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new pending task.
    ///
    /// `new_task.task_type` defaults to [`TaskType::WriteEntry`] when unset.
    #[must_use]
    pub fn new(new_task: NewTask, clock: &impl Clock) -> Self {
        Self {
            id: TaskId::new(),
            task_type: new_task.task_type.unwrap_or(TaskType::WriteEntry),
            assigned_to: None,
            claimed_at: None,
            topic_id: new_task.topic_id,
            entry_id: new_task.entry_id,
            prompt_context: new_task.prompt_context,
            priority: new_task.priority,
            virtual_day_phase: new_task.virtual_day_phase,
            status: TaskStatus::Pending,
            result_entry_id: None,
            result_comment_id: None,
            expires_at: new_task.expires_at,
            created_at: clock.utc(),
            completed_at: None,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            task_type: data.task_type,
            assigned_to: data.assigned_to,
            claimed_at: data.claimed_at,
            topic_id: data.topic_id,
            entry_id: data.entry_id,
            prompt_context: data.prompt_context,
            priority: data.priority,
            virtual_day_phase: data.virtual_day_phase,
            status: data.status,
            result_entry_id: data.result_entry_id,
            result_comment_id: data.result_comment_id,
            expires_at: data.expires_at,
            created_at: data.created_at,
            completed_at: data.completed_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the kind of work the task asks for.
    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Returns the exclusive assignee, if the task has been claimed.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<AgentId> {
        self.assigned_to
    }

    /// Returns the claim timestamp, if the task has been claimed.
    #[must_use]
    pub const fn claimed_at(&self) -> Option<DateTime<Utc>> {
        self.claimed_at
    }

    /// Returns the topic the work targets, if any.
    #[must_use]
    pub const fn topic_id(&self) -> Option<TopicId> {
        self.topic_id
    }

    /// Returns the entry the work targets, if any.
    #[must_use]
    pub const fn entry_id(&self) -> Option<EntryId> {
        self.entry_id
    }

    /// Returns the prompt payload, if any.
    #[must_use]
    pub const fn prompt_context(&self) -> Option<&PromptContext> {
        self.prompt_context.as_ref()
    }

    /// Returns the claim ordering weight.
    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Returns the virtual-day phase tag, if any.
    #[must_use]
    pub fn virtual_day_phase(&self) -> Option<&str> {
        self.virtual_day_phase.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the entry produced by completion, if any.
    #[must_use]
    pub const fn result_entry_id(&self) -> Option<EntryId> {
        self.result_entry_id
    }

    /// Returns the comment produced by completion, if any.
    #[must_use]
    pub const fn result_comment_id(&self) -> Option<CommentId> {
        self.result_comment_id
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the completion timestamp, if any.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns true when the task is offered and unassigned.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    /// Returns true when the task is exclusively assigned.
    #[must_use]
    pub fn is_claimed(&self) -> bool {
        self.status == TaskStatus::Claimed
    }

    /// Returns true when the task has finished.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Returns true when the deadline has passed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|deadline| now > deadline)
    }

    /// Returns true when the task can still be claimed at `now`.
    #[must_use]
    pub fn can_be_claimed(&self, now: DateTime<Utc>) -> bool {
        self.is_pending() && !self.is_expired(now)
    }

    /// Returns true when the task is assigned to `agent`.
    #[must_use]
    pub fn is_assigned_to(&self, agent: AgentId) -> bool {
        self.assigned_to == Some(agent)
    }

    /// Assigns the task to `agent`, stamping the claim time.
    ///
    /// This is the guard adapters evaluate atomically: the in-memory store
    /// calls it under its write lock, and the SQL store expresses the same
    /// check as a conditional `UPDATE`. Deadline screening happens in the
    /// engine before the claim reaches the store.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotClaimable`] when the task is not
    /// `pending`.
    pub fn claim(&mut self, agent: AgentId, at: DateTime<Utc>) -> Result<(), TaskDomainError> {
        if !self.is_pending() {
            return Err(TaskDomainError::NotClaimable {
                id: self.id,
                status: self.status,
            });
        }
        self.status = TaskStatus::Claimed;
        self.assigned_to = Some(agent);
        self.claimed_at = Some(at);
        Ok(())
    }

    /// Marks the task completed, recording any produced result references.
    ///
    /// Unconditional: callers verify assignment and state first, matching
    /// the store contract.
    pub fn complete(
        &mut self,
        result_entry: Option<EntryId>,
        result_comment: Option<CommentId>,
        at: DateTime<Utc>,
    ) {
        self.status = TaskStatus::Completed;
        self.result_entry_id = result_entry;
        self.result_comment_id = result_comment;
        self.completed_at = Some(at);
    }

    /// Moves an overdue `pending` or `claimed` task to `expired`.
    ///
    /// Returns true when the transition happened; terminal statuses are left
    /// untouched, so a completed task is never retroactively invalidated.
    pub fn expire(&mut self) -> bool {
        if matches!(self.status, TaskStatus::Pending | TaskStatus::Claimed) {
            self.status = TaskStatus::Expired;
            return true;
        }
        false
    }
}
