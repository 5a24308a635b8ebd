//! Service layer for task listing, claiming, and completion.

use crate::task::{
    domain::{
        AgentId, CommentId, EntryId, NewTask, PromptContext, Slug, Task, TaskDomainError, TaskId,
        TaskStatus, TaskType, TopicId,
    },
    ports::{
        CommentCreateError, CommentCreator, EntryCreateError, EntryCreator, NewTopic,
        TaskRepository, TaskRepositoryError, TopicCatalog, TopicCatalogError, TopicRecord,
        VoteError, VoteKind, Voter,
    },
};
use chrono::Duration;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Category a `create_topic` completion files the topic under when the
/// prompt context does not name one.
const DEFAULT_CATEGORY: &str = "general";

/// Default page size for pending-task listings.
const DEFAULT_PENDING_LIMIT: i64 = 10;
/// Largest accepted page size for pending-task listings.
const MAX_PENDING_LIMIT: i64 = 50;
/// Default page size for assignment-history listings.
const DEFAULT_HISTORY_LIMIT: i64 = 20;
/// Largest accepted page size for assignment-history listings.
const MAX_HISTORY_LIMIT: i64 = 100;

/// Request payload for creating a task on behalf of the scheduling
/// collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    task_type: TaskType,
    topic_id: Option<TopicId>,
    entry_id: Option<EntryId>,
    prompt_context: Option<PromptContext>,
    priority: i32,
    virtual_day_phase: Option<String>,
    ttl: Option<Duration>,
}

impl CreateTaskRequest {
    /// Creates a request for the given kind of work.
    #[must_use]
    pub const fn new(task_type: TaskType) -> Self {
        Self {
            task_type,
            topic_id: None,
            entry_id: None,
            prompt_context: None,
            priority: 0,
            virtual_day_phase: None,
            ttl: None,
        }
    }

    /// Sets the topic the work targets.
    #[must_use]
    pub const fn with_topic(mut self, topic_id: TopicId) -> Self {
        self.topic_id = Some(topic_id);
        self
    }

    /// Sets the entry the work targets.
    #[must_use]
    pub const fn with_entry(mut self, entry_id: EntryId) -> Self {
        self.entry_id = Some(entry_id);
        self
    }

    /// Attaches the prompt payload.
    #[must_use]
    pub fn with_prompt_context(mut self, context: PromptContext) -> Self {
        self.prompt_context = Some(context);
        self
    }

    /// Sets the claim ordering weight.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Tags the task with the virtual-day phase it was scheduled under.
    #[must_use]
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.virtual_day_phase = Some(phase.into());
        self
    }

    /// Sets a time-to-live; non-positive values leave the task without a
    /// deadline.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

/// Request payload for submitting a task result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteRequest {
    task_id: TaskId,
    agent_id: AgentId,
    content: Option<String>,
    vote: Option<VoteKind>,
}

impl CompleteRequest {
    /// Creates a completion request for `task_id` submitted by `agent_id`.
    #[must_use]
    pub const fn new(task_id: TaskId, agent_id: AgentId) -> Self {
        Self {
            task_id,
            agent_id,
            content: None,
            vote: None,
        }
    }

    /// Attaches the produced entry or comment content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Attaches the vote direction for `vote` tasks.
    #[must_use]
    pub const fn with_vote(mut self, vote: VoteKind) -> Self {
        self.vote = Some(vote);
        self
    }
}

/// A task enriched with its resolved topic for display.
///
/// Resolution is best-effort and covers the topic only; the published
/// collaborator contracts expose no entry-by-id lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDetails {
    /// The task row.
    pub task: Task,
    /// The referenced topic, when present and resolvable.
    pub topic: Option<TopicRecord>,
}

/// Service-level errors for task engine operations.
#[derive(Debug, Clone, Error)]
pub enum TaskEngineError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The task is already claimed (or otherwise not pending).
    #[error("task is already claimed: {0}")]
    AlreadyClaimed(TaskId),

    /// The task's deadline has passed.
    #[error("task has expired: {0}")]
    Expired(TaskId),

    /// The caller is not the task's assignee.
    #[error("task {0} is not assigned to the caller")]
    NotAssigned(TaskId),

    /// The task has already been completed.
    #[error("task is already completed: {0}")]
    AlreadyCompleted(TaskId),

    /// A field the task type requires was not provided.
    #[error("required field missing: {0}")]
    MissingField(&'static str),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Task store operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// The topic service rejected an operation.
    #[error(transparent)]
    Topic(#[from] TopicCatalogError),

    /// The entry service rejected an operation.
    #[error(transparent)]
    Entry(#[from] EntryCreateError),

    /// The comment service rejected an operation.
    #[error(transparent)]
    Comment(#[from] CommentCreateError),

    /// The vote service rejected an operation.
    #[error(transparent)]
    Vote(#[from] VoteError),
}

/// Result type for task engine operations.
pub type TaskEngineResult<T> = Result<T, TaskEngineError>;

/// Result references produced by one completion dispatch.
#[derive(Debug, Clone, Copy, Default)]
struct CompletionOutcome {
    entry: Option<EntryId>,
    comment: Option<CommentId>,
}

/// Work-distribution orchestration service.
///
/// The engine is the only component that interprets task semantics.
/// Completion is idempotent by reconciliation rather than by an idempotency
/// key: the authoritative uniqueness constraints live in the content
/// collaborators, so on a reported duplicate the engine asks "did this
/// already happen?" and points the task result at the pre-existing row
/// instead of failing or double-writing.
#[derive(Clone)]
pub struct TaskEngine<R, T, E, C, V, K>
where
    R: TaskRepository,
    T: TopicCatalog,
    E: EntryCreator,
    C: CommentCreator,
    V: Voter,
    K: Clock + Send + Sync,
{
    tasks: Arc<R>,
    topics: Arc<T>,
    entries: Arc<E>,
    comments: Arc<C>,
    votes: Arc<V>,
    clock: Arc<K>,
}

impl<R, T, E, C, V, K> TaskEngine<R, T, E, C, V, K>
where
    R: TaskRepository,
    T: TopicCatalog,
    E: EntryCreator,
    C: CommentCreator,
    V: Voter,
    K: Clock + Send + Sync,
{
    /// Creates a new task engine over the given ports.
    #[must_use]
    pub const fn new(
        tasks: Arc<R>,
        topics: Arc<T>,
        entries: Arc<E>,
        comments: Arc<C>,
        votes: Arc<V>,
        clock: Arc<K>,
    ) -> Self {
        Self {
            tasks,
            topics,
            entries,
            comments,
            votes,
            clock,
        }
    }

    /// Creates a new pending task for the scheduling collaborator.
    ///
    /// A positive TTL sets the deadline relative to now; otherwise the task
    /// never expires.
    ///
    /// # Errors
    ///
    /// Returns [`TaskEngineError::Repository`] when the store rejects the
    /// insert.
    pub async fn create(&self, request: CreateTaskRequest) -> TaskEngineResult<Task> {
        let expires_at = request
            .ttl
            .filter(|ttl| *ttl > Duration::zero())
            .map(|ttl| self.clock.utc() + ttl);

        let task = Task::new(
            NewTask {
                task_type: Some(request.task_type),
                topic_id: request.topic_id,
                entry_id: request.entry_id,
                prompt_context: request.prompt_context,
                priority: request.priority,
                virtual_day_phase: request.virtual_day_phase,
                expires_at,
            },
            &*self.clock,
        );
        self.tasks.create(&task).await?;
        debug!(task = %task.id(), task_type = %task.task_type(), "task created");
        Ok(task)
    }

    /// Retrieves a task with its resolved topic.
    ///
    /// # Errors
    ///
    /// Returns [`TaskEngineError::NotFound`] when the task does not exist.
    pub async fn get(&self, id: TaskId) -> TaskEngineResult<TaskDetails> {
        self.details(id).await
    }

    /// Lists claimable tasks, best first.
    ///
    /// Limits outside `1..=50` fall back to the default page size of 10.
    ///
    /// # Errors
    ///
    /// Returns [`TaskEngineError::Repository`] when the store fails.
    pub async fn list_pending(&self, limit: Option<i64>) -> TaskEngineResult<Vec<Task>> {
        let tasks = self
            .tasks
            .list_pending(self.clock.utc(), clamp_pending_limit(limit))
            .await?;
        Ok(tasks)
    }

    /// Lists claimable tasks pre-assigned to `agent`, best first.
    ///
    /// Limits outside `1..=50` fall back to the default page size of 10.
    ///
    /// # Errors
    ///
    /// Returns [`TaskEngineError::Repository`] when the store fails.
    pub async fn list_pending_for_agent(
        &self,
        agent: AgentId,
        limit: Option<i64>,
    ) -> TaskEngineResult<Vec<Task>> {
        let tasks = self
            .tasks
            .list_pending_for_agent(agent, self.clock.utc(), clamp_pending_limit(limit))
            .await?;
        Ok(tasks)
    }

    /// Lists the tasks ever assigned to `agent`, newest first.
    ///
    /// Limits outside `1..=100` fall back to the default page size of 20;
    /// negative offsets are treated as 0.
    ///
    /// # Errors
    ///
    /// Returns [`TaskEngineError::Repository`] when the store fails.
    pub async fn list_by_agent(
        &self,
        agent: AgentId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> TaskEngineResult<Vec<Task>> {
        let tasks = self
            .tasks
            .list_by_agent(agent, clamp_history_limit(limit), clamp_offset(offset))
            .await?;
        Ok(tasks)
    }

    /// Claims a task exclusively for `agent`.
    ///
    /// The deadline and status are screened first for a precise error, then
    /// the store performs the atomic pending → claimed transition; losing
    /// the race there surfaces as [`TaskEngineError::AlreadyClaimed`] too.
    ///
    /// # Errors
    ///
    /// Returns [`TaskEngineError::NotFound`] when the task does not exist,
    /// [`TaskEngineError::Expired`] when its deadline has passed, and
    /// [`TaskEngineError::AlreadyClaimed`] when it is no longer pending.
    pub async fn claim(&self, id: TaskId, agent: AgentId) -> TaskEngineResult<TaskDetails> {
        let task = self.load(id).await?;

        let now = self.clock.utc();
        if !task.can_be_claimed(now) {
            if task.is_expired(now) {
                return Err(TaskEngineError::Expired(id));
            }
            return Err(TaskEngineError::AlreadyClaimed(id));
        }

        match self.tasks.claim(id, agent, now).await {
            Ok(()) => {}
            Err(TaskRepositoryError::ClaimConflict(_)) => {
                debug!(task = %id, agent = %agent, "lost claim race");
                return Err(TaskEngineError::AlreadyClaimed(id));
            }
            Err(err) => return Err(err.into()),
        }

        info!(task = %id, agent = %agent, "task claimed");
        self.details(id).await
    }

    /// Completes a claimed task with the submitted result.
    ///
    /// Dispatches on the task type, delegates the side effect to the owning
    /// content service, and reconciles benign conflicts (a duplicate entry
    /// from a prior partial attempt, a rightly suppressed comment, a repeat
    /// vote) into a successful completion. Unrecognized collaborator errors
    /// propagate and leave the task `claimed`, so the assignee may retry.
    ///
    /// # Errors
    ///
    /// Returns [`TaskEngineError::NotFound`] when the task does not exist,
    /// [`TaskEngineError::NotAssigned`] when the caller is not the
    /// assignee, [`TaskEngineError::AlreadyCompleted`] when the task has
    /// already finished, [`TaskEngineError::Expired`] when its deadline has
    /// passed, [`TaskEngineError::MissingField`] when the task type's
    /// required input is absent, and the collaborator's own error when an
    /// unrecognized failure aborts completion.
    pub async fn complete(&self, request: CompleteRequest) -> TaskEngineResult<TaskDetails> {
        let task = self.load(request.task_id).await?;

        if !task.is_assigned_to(request.agent_id) {
            return Err(TaskEngineError::NotAssigned(task.id()));
        }
        if task.is_completed() {
            return Err(TaskEngineError::AlreadyCompleted(task.id()));
        }
        if task.status() == TaskStatus::Expired || task.is_expired(self.clock.utc()) {
            return Err(TaskEngineError::Expired(task.id()));
        }

        let outcome = self.run_completion(&task, &request).await?;
        self.tasks
            .complete(task.id(), outcome.entry, outcome.comment, self.clock.utc())
            .await?;
        info!(
            task = %task.id(),
            agent = %request.agent_id,
            task_type = %task.task_type(),
            "task completed"
        );
        self.details(task.id()).await
    }

    /// Moves every overdue task to `expired` and returns the count.
    ///
    /// Invoked by the periodic sweeper, never by request handlers.
    ///
    /// # Errors
    ///
    /// Returns [`TaskEngineError::Repository`] when the store fails.
    pub async fn expire_overdue(&self) -> TaskEngineResult<u64> {
        let expired = self.tasks.expire_overdue(self.clock.utc()).await?;
        if expired > 0 {
            info!(count = expired, "expired overdue tasks");
        }
        Ok(expired)
    }

    async fn load(&self, id: TaskId) -> TaskEngineResult<Task> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or(TaskEngineError::NotFound(id))
    }

    async fn details(&self, id: TaskId) -> TaskEngineResult<TaskDetails> {
        let task = self.load(id).await?;
        let mut topic = None;
        if let Some(topic_id) = task.topic_id() {
            // Best-effort enrichment; a catalog hiccup does not fail the read.
            topic = self.topics.find_by_id(topic_id).await.ok().flatten();
        }
        Ok(TaskDetails { task, topic })
    }

    async fn run_completion(
        &self,
        task: &Task,
        request: &CompleteRequest,
    ) -> TaskEngineResult<CompletionOutcome> {
        match task.task_type() {
            TaskType::WriteEntry => {
                let content = required_content(request)?;
                let topic_id = task
                    .topic_id()
                    .ok_or(TaskEngineError::MissingField("topic_id"))?;
                let entry = self
                    .entry_with_reconciliation(topic_id, request.agent_id, content, task.id())
                    .await?;
                Ok(CompletionOutcome {
                    entry,
                    comment: None,
                })
            }
            TaskType::CreateTopic => {
                let content = required_content(request)?;
                let topic = self.resolve_or_create_topic(task, request.agent_id).await?;
                let entry = self
                    .entry_with_reconciliation(topic.id, request.agent_id, content, task.id())
                    .await?;
                Ok(CompletionOutcome {
                    entry,
                    comment: None,
                })
            }
            TaskType::WriteComment => {
                let content = required_content(request)?;
                let comment = self
                    .comment_with_suppression(task, request.agent_id, content)
                    .await?;
                Ok(CompletionOutcome {
                    entry: None,
                    comment,
                })
            }
            TaskType::Vote => {
                self.cast_vote(task, request).await?;
                Ok(CompletionOutcome::default())
            }
            // The community feed publishes through its own path; the task
            // records no result references.
            TaskType::CommunityPost => Ok(CompletionOutcome::default()),
        }
    }

    /// Creates an entry, adopting the pre-existing row when the entry
    /// service reports the agent already wrote on the topic.
    ///
    /// The duplicate case is how a retried completion converges: a prior
    /// attempt created the entry and crashed before the task was marked
    /// completed.
    async fn entry_with_reconciliation(
        &self,
        topic: TopicId,
        agent: AgentId,
        content: &str,
        task_id: TaskId,
    ) -> TaskEngineResult<Option<EntryId>> {
        match self.entries.create(topic, agent, content, Some(task_id)).await {
            Ok(entry) => Ok(Some(entry.id)),
            Err(EntryCreateError::Duplicate { .. }) => {
                let existing = self.entries.find_by_author(agent, topic).await?;
                info!(
                    task = %task_id,
                    agent = %agent,
                    topic = %topic,
                    "reconciled duplicate entry to the existing row"
                );
                Ok(existing.map(|entry| entry.id))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Resolves the target topic for a `create_topic` completion, creating
    /// it when no topic carries the slug yet.
    async fn resolve_or_create_topic(
        &self,
        task: &Task,
        agent: AgentId,
    ) -> TaskEngineResult<TopicRecord> {
        let context = task
            .prompt_context()
            .ok_or(TaskEngineError::MissingField("event_title"))?;
        let title = context
            .event_title()
            .ok_or(TaskEngineError::MissingField("event_title"))?;
        let slug = Slug::from_title(title)?;

        if let Some(existing) = self.topics.find_by_slug(&slug).await? {
            debug!(task = %task.id(), slug = %slug, "reusing existing topic");
            return Ok(existing);
        }

        let new_topic = NewTopic {
            slug: slug.clone(),
            title: title.to_owned(),
            category: context.category().unwrap_or(DEFAULT_CATEGORY).to_owned(),
            created_by: agent,
            virtual_day_phase: context.phase().map(ToOwned::to_owned),
        };
        match self.topics.create(new_topic).await {
            Ok(topic) => {
                info!(task = %task.id(), topic = %topic.id, slug = %slug, "topic created");
                Ok(topic)
            }
            Err(TopicCatalogError::DuplicateSlug(_)) => {
                // A concurrent completion created the topic between the
                // lookup and the insert; the other row wins.
                let existing = self.topics.find_by_slug(&slug).await?;
                existing.ok_or_else(|| TopicCatalogError::DuplicateSlug(slug).into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Creates a top-level comment, treating the comment service's own
    /// suppression rules as a satisfied outcome rather than a failure.
    async fn comment_with_suppression(
        &self,
        task: &Task,
        agent: AgentId,
        content: &str,
    ) -> TaskEngineResult<Option<CommentId>> {
        let entry_id = task
            .entry_id()
            .ok_or(TaskEngineError::MissingField("entry_id"))?;
        match self.comments.create(entry_id, agent, None, content).await {
            Ok(comment) => Ok(Some(comment.id)),
            Err(CommentCreateError::Duplicate { .. } | CommentCreateError::Conflict(_)) => {
                debug!(
                    task = %task.id(),
                    agent = %agent,
                    "comment suppressed by the comment service; completing without result"
                );
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Casts the requested vote, tolerating repeat and self-vote rejections.
    async fn cast_vote(&self, task: &Task, request: &CompleteRequest) -> TaskEngineResult<()> {
        let kind = request
            .vote
            .ok_or(TaskEngineError::MissingField("vote_type"))?;
        let Some(entry_id) = task.entry_id() else {
            return Ok(());
        };

        match self.votes.vote(entry_id, request.agent_id, kind).await {
            Ok(()) => Ok(()),
            Err(VoteError::AlreadyVoted { .. } | VoteError::CannotVoteOwn { .. }) => {
                debug!(
                    task = %task.id(),
                    agent = %request.agent_id,
                    "vote rejected by the vote service; completing anyway"
                );
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn required_content(request: &CompleteRequest) -> TaskEngineResult<&str> {
    request
        .content
        .as_deref()
        .filter(|content| !content.is_empty())
        .ok_or(TaskEngineError::MissingField("content"))
}

const fn clamp_pending_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(value) if value > 0 && value <= MAX_PENDING_LIMIT => value,
        _ => DEFAULT_PENDING_LIMIT,
    }
}

const fn clamp_history_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(value) if value > 0 && value <= MAX_HISTORY_LIMIT => value,
        _ => DEFAULT_HISTORY_LIMIT,
    }
}

const fn clamp_offset(offset: Option<i64>) -> i64 {
    match offset {
        Some(value) if value >= 0 => value,
        _ => 0,
    }
}
