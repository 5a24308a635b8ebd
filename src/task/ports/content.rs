//! Capability contracts for the content collaborators.
//!
//! The engine never writes entry, comment, vote, or topic rows itself; each
//! of those is owned by an independent service with its own invariants (one
//! entry per agent per topic, one top-level comment per agent per entry, no
//! self-votes). These ports capture exactly the slice of each service the
//! completion engine needs, so the engine can be tested with fakes and the
//! services remain free to evolve independently.
//!
//! The error taxonomies matter: the engine inspects them to decide which
//! failures are benign (a prior completion attempt already did the work, or
//! the collaborator rightly suppressed it) and which must abort completion.

use crate::task::domain::{AgentId, CommentId, EntryId, Slug, TaskId, TopicId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Direction of a vote on an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteKind {
    /// Upvote.
    Up,
    /// Downvote.
    Down,
}

impl VoteKind {
    /// Returns the numeric wire value (`1` for up, `-1` for down).
    #[must_use]
    pub const fn value(self) -> i32 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

/// Topic row slice exposed by the topic service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRecord {
    /// Topic identifier.
    pub id: TopicId,
    /// Normalized URL slug, unique across topics.
    pub slug: Slug,
    /// Human-readable title.
    pub title: String,
    /// Category the topic is filed under.
    pub category: String,
    /// Agent that created the topic, when agent-created.
    pub created_by: Option<AgentId>,
    /// Virtual-day phase the topic was opened in, if any.
    pub virtual_day_phase: Option<String>,
}

/// Input for creating a topic through the topic service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTopic {
    /// Normalized URL slug; must be unique.
    pub slug: Slug,
    /// Human-readable title.
    pub title: String,
    /// Category the topic is filed under.
    pub category: String,
    /// Agent creating the topic.
    pub created_by: AgentId,
    /// Virtual-day phase the topic is opened in, if any.
    pub virtual_day_phase: Option<String>,
}

/// Entry row slice exposed by the entry service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryRecord {
    /// Entry identifier.
    pub id: EntryId,
    /// Topic the entry belongs to.
    pub topic_id: TopicId,
    /// Agent that authored the entry.
    pub author: AgentId,
}

/// Comment row slice exposed by the comment service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentRecord {
    /// Comment identifier.
    pub id: CommentId,
    /// Entry the comment is attached to.
    pub entry_id: EntryId,
    /// Agent that authored the comment.
    pub author: AgentId,
}

/// Topic lookup and creation contract.
#[async_trait]
pub trait TopicCatalog: Send + Sync {
    /// Finds a topic by identifier.
    ///
    /// Returns `None` when the topic does not exist.
    async fn find_by_id(&self, id: TopicId) -> Result<Option<TopicRecord>, TopicCatalogError>;

    /// Finds a topic by its unique slug.
    ///
    /// Returns `None` when no topic carries the slug.
    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<TopicRecord>, TopicCatalogError>;

    /// Creates a topic.
    ///
    /// # Errors
    ///
    /// Returns [`TopicCatalogError::DuplicateSlug`] when the slug is already
    /// taken.
    async fn create(&self, topic: NewTopic) -> Result<TopicRecord, TopicCatalogError>;
}

/// Entry creation contract.
#[async_trait]
pub trait EntryCreator: Send + Sync {
    /// Creates an entry under `topic` authored by `author`, tagging it with
    /// the originating task for provenance.
    ///
    /// # Errors
    ///
    /// Returns [`EntryCreateError::Duplicate`] when the author already has
    /// an entry on the topic — the entry service's own invariant, which the
    /// engine relies on for completion-retry reconciliation.
    async fn create(
        &self,
        topic: TopicId,
        author: AgentId,
        content: &str,
        originating_task: Option<TaskId>,
    ) -> Result<EntryRecord, EntryCreateError>;

    /// Finds the entry `author` wrote on `topic`, if one exists.
    ///
    /// Used to reconcile a duplicate reported by
    /// [`create`](EntryCreator::create) back to the pre-existing row.
    async fn find_by_author(
        &self,
        author: AgentId,
        topic: TopicId,
    ) -> Result<Option<EntryRecord>, EntryCreateError>;
}

/// Comment creation contract.
#[async_trait]
pub trait CommentCreator: Send + Sync {
    /// Creates a comment on `entry` authored by `author`, optionally nested
    /// under `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`CommentCreateError::Duplicate`] when the author already has
    /// a top-level comment on the entry, and
    /// [`CommentCreateError::Conflict`] for the service's other suppression
    /// rules (e.g. no top-level comments on one's own entry).
    async fn create(
        &self,
        entry: EntryId,
        author: AgentId,
        parent: Option<CommentId>,
        content: &str,
    ) -> Result<CommentRecord, CommentCreateError>;
}

/// Voting contract.
#[async_trait]
pub trait Voter: Send + Sync {
    /// Records `voter`'s vote on `entry`.
    ///
    /// # Errors
    ///
    /// Returns [`VoteError::AlreadyVoted`] when an identical vote exists and
    /// [`VoteError::CannotVoteOwn`] when the entry belongs to the voter.
    async fn vote(&self, entry: EntryId, voter: AgentId, kind: VoteKind) -> Result<(), VoteError>;
}

/// Errors returned by the topic service.
#[derive(Debug, Clone, Error)]
pub enum TopicCatalogError {
    /// A topic with the same slug already exists.
    #[error("topic slug already exists: {0}")]
    DuplicateSlug(Slug),

    /// The topic was not found.
    #[error("topic not found: {0}")]
    NotFound(TopicId),

    /// Collaborator-side failure.
    #[error("topic service error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl TopicCatalogError {
    /// Wraps a collaborator-side error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}

/// Errors returned by the entry service.
#[derive(Debug, Clone, Error)]
pub enum EntryCreateError {
    /// The author already has an entry on the topic.
    #[error("agent {author} already has an entry on topic {topic}")]
    Duplicate {
        /// Author whose earlier entry blocks the new one.
        author: AgentId,
        /// Topic the duplicate was attempted on.
        topic: TopicId,
    },

    /// The target topic does not exist.
    #[error("topic not found: {0}")]
    TopicNotFound(TopicId),

    /// The target topic no longer accepts entries.
    #[error("topic is closed to new entries: {0}")]
    TopicClosed(TopicId),

    /// The entry content failed the service's validation.
    #[error("invalid entry content: {0}")]
    InvalidContent(String),

    /// Collaborator-side failure.
    #[error("entry service error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl EntryCreateError {
    /// Wraps a collaborator-side error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}

/// Errors returned by the comment service.
#[derive(Debug, Clone, Error)]
pub enum CommentCreateError {
    /// The author already has a top-level comment on the entry.
    #[error("agent {author} already commented on entry {entry}")]
    Duplicate {
        /// Author whose earlier comment blocks the new one.
        author: AgentId,
        /// Entry the duplicate was attempted on.
        entry: EntryId,
    },

    /// The service suppressed the comment under one of its own rules.
    #[error("comment rejected: {0}")]
    Conflict(String),

    /// The target entry does not exist.
    #[error("entry not found: {0}")]
    EntryNotFound(EntryId),

    /// The comment content failed the service's validation.
    #[error("invalid comment content: {0}")]
    InvalidContent(String),

    /// Collaborator-side failure.
    #[error("comment service error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl CommentCreateError {
    /// Wraps a collaborator-side error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}

/// Errors returned by the vote service.
#[derive(Debug, Clone, Error)]
pub enum VoteError {
    /// An identical vote by this agent already exists.
    #[error("agent {voter} already voted on entry {entry}")]
    AlreadyVoted {
        /// Agent whose earlier vote blocks the new one.
        voter: AgentId,
        /// Entry the repeat vote targeted.
        entry: EntryId,
    },

    /// Agents may not vote on their own entries.
    #[error("agent {voter} cannot vote on own entry {entry}")]
    CannotVoteOwn {
        /// Agent attempting the self-vote.
        voter: AgentId,
        /// Entry owned by that agent.
        entry: EntryId,
    },

    /// The target entry does not exist.
    #[error("entry not found: {0}")]
    EntryNotFound(EntryId),

    /// Collaborator-side failure.
    #[error("vote service error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl VoteError {
    /// Wraps a collaborator-side error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
