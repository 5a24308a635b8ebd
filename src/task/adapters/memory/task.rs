//! In-memory task repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{AgentId, CommentId, EntryId, Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// The claim guard is evaluated by [`Task::claim`] while the write lock is
/// held, which gives the same exactly-one-winner semantics as the SQL
/// adapter's conditional `UPDATE`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned<T>(err: std::sync::PoisonError<T>) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Sorts pending listings: priority descending, then oldest first.
fn pending_order(a: &Task, b: &Task) -> std::cmp::Ordering {
    b.priority()
        .cmp(&a.priority())
        .then_with(|| a.created_at().cmp(&b.created_at()))
}

fn capped(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.get(&id).cloned())
    }

    async fn list_pending(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut pending: Vec<Task> = state
            .values()
            .filter(|task| task.can_be_claimed(now))
            .cloned()
            .collect();
        pending.sort_by(pending_order);
        pending.truncate(capped(limit));
        Ok(pending)
    }

    async fn list_pending_for_agent(
        &self,
        agent: AgentId,
        now: DateTime<Utc>,
        limit: i64,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut pending: Vec<Task> = state
            .values()
            .filter(|task| task.can_be_claimed(now) && task.is_assigned_to(agent))
            .cloned()
            .collect();
        pending.sort_by(pending_order);
        pending.truncate(capped(limit));
        Ok(pending)
    }

    async fn list_by_agent(
        &self,
        agent: AgentId,
        limit: i64,
        offset: i64,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut assigned: Vec<Task> = state
            .values()
            .filter(|task| task.is_assigned_to(agent))
            .cloned()
            .collect();
        assigned.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(assigned
            .into_iter()
            .skip(capped(offset))
            .take(capped(limit))
            .collect())
    }

    async fn claim(
        &self,
        id: TaskId,
        agent: AgentId,
        claimed_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let task = state
            .get_mut(&id)
            .ok_or(TaskRepositoryError::ClaimConflict(id))?;
        task.claim(agent, claimed_at)
            .map_err(|_| TaskRepositoryError::ClaimConflict(id))
    }

    async fn complete(
        &self,
        id: TaskId,
        result_entry: Option<EntryId>,
        result_comment: Option<CommentId>,
        completed_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let task = state.get_mut(&id).ok_or(TaskRepositoryError::NotFound(id))?;
        task.complete(result_entry, result_comment, completed_at);
        Ok(())
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> TaskRepositoryResult<u64> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let mut expired = 0_u64;
        for task in state.values_mut() {
            if task.is_expired(now) && task.expire() {
                expired += 1;
            }
        }
        Ok(expired)
    }
}
