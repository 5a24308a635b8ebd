//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{NewTaskRow, TaskRow},
    schema::tasks,
};
use crate::task::{
    domain::{
        AgentId, CommentId, EntryId, PersistedTaskData, PromptContext, Task, TaskId, TaskStatus,
        TaskType, TopicId,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
///
/// The claim transition is a conditional `UPDATE` guarded by
/// `status = 'pending'`, evaluated by the database in one round trip; zero
/// affected rows means another agent won the race.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task);

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_pending(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::status.eq(TaskStatus::Pending.as_str()))
                .filter(
                    tasks::expires_at
                        .is_null()
                        .or(tasks::expires_at.assume_not_null().gt(now)),
                )
                .order((tasks::priority.desc(), tasks::created_at.asc()))
                .limit(limit)
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list_pending_for_agent(
        &self,
        agent: AgentId,
        now: DateTime<Utc>,
        limit: i64,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::assigned_to.eq(Some(agent.into_inner())))
                .filter(tasks::status.eq(TaskStatus::Pending.as_str()))
                .filter(
                    tasks::expires_at
                        .is_null()
                        .or(tasks::expires_at.assume_not_null().gt(now)),
                )
                .order((tasks::priority.desc(), tasks::created_at.asc()))
                .limit(limit)
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list_by_agent(
        &self,
        agent: AgentId,
        limit: i64,
        offset: i64,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::assigned_to.eq(Some(agent.into_inner())))
                .order(tasks::created_at.desc())
                .limit(limit)
                .offset(offset)
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn claim(
        &self,
        id: TaskId,
        agent: AgentId,
        claimed_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            // The pending-status guard and the write are one statement; the
            // database evaluates them atomically, so exactly one concurrent
            // claimant sees a non-zero row count.
            let updated = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(id.into_inner()))
                    .filter(tasks::status.eq(TaskStatus::Pending.as_str())),
            )
            .set((
                tasks::assigned_to.eq(Some(agent.into_inner())),
                tasks::claimed_at.eq(Some(claimed_at)),
                tasks::status.eq(TaskStatus::Claimed.as_str()),
            ))
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;

            if updated == 0 {
                return Err(TaskRepositoryError::ClaimConflict(id));
            }
            Ok(())
        })
        .await
    }

    async fn complete(
        &self,
        id: TaskId,
        result_entry: Option<EntryId>,
        result_comment: Option<CommentId>,
        completed_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .set((
                    tasks::status.eq(TaskStatus::Completed.as_str()),
                    tasks::result_entry_id.eq(result_entry.map(EntryId::into_inner)),
                    tasks::result_comment_id.eq(result_comment.map(CommentId::into_inner)),
                    tasks::completed_at.eq(Some(completed_at)),
                ))
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;

            if updated == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> TaskRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let expired = diesel::update(
                tasks::table
                    .filter(tasks::status.eq_any([
                        TaskStatus::Pending.as_str(),
                        TaskStatus::Claimed.as_str(),
                    ]))
                    .filter(tasks::expires_at.is_not_null())
                    .filter(tasks::expires_at.assume_not_null().lt(now)),
            )
            .set(tasks::status.eq(TaskStatus::Expired.as_str()))
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;
            u64::try_from(expired).map_err(TaskRepositoryError::persistence)
        })
        .await
    }
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        task_type: task.task_type().as_str().to_owned(),
        assigned_to: task.assigned_to().map(AgentId::into_inner),
        claimed_at: task.claimed_at(),
        topic_id: task.topic_id().map(TopicId::into_inner),
        entry_id: task.entry_id().map(EntryId::into_inner),
        prompt_context: task.prompt_context().map(|ctx| ctx.as_value().clone()),
        priority: task.priority(),
        virtual_day_phase: task.virtual_day_phase().map(ToOwned::to_owned),
        status: task.status().as_str().to_owned(),
        result_entry_id: task.result_entry_id().map(EntryId::into_inner),
        result_comment_id: task.result_comment_id().map(CommentId::into_inner),
        expires_at: task.expires_at(),
        created_at: task.created_at(),
        completed_at: task.completed_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let task_type =
        TaskType::try_from(row.task_type.as_str()).map_err(TaskRepositoryError::persistence)?;
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(TaskRepositoryError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        task_type,
        assigned_to: row.assigned_to.map(AgentId::from_uuid),
        claimed_at: row.claimed_at,
        topic_id: row.topic_id.map(TopicId::from_uuid),
        entry_id: row.entry_id.map(EntryId::from_uuid),
        prompt_context: row.prompt_context.map(PromptContext::new),
        priority: row.priority,
        virtual_day_phase: row.virtual_day_phase,
        status,
        result_entry_id: row.result_entry_id.map(EntryId::from_uuid),
        result_comment_id: row.result_comment_id.map(CommentId::from_uuid),
        expires_at: row.expires_at,
        created_at: row.created_at,
        completed_at: row.completed_at,
    };
    Ok(Task::from_persisted(data))
}
