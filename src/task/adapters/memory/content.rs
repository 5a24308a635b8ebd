//! In-memory content collaborators.
//!
//! Reference implementations of the content capability ports. They enforce
//! the collaborators' own uniqueness invariants (one entry per agent per
//! topic, one top-level comment per agent per entry, no self-votes), which
//! is what lets the engine's reconciliation paths be exercised for real in
//! tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{AgentId, CommentId, EntryId, Slug, TaskId, TopicId},
    ports::{
        CommentCreateError, CommentCreator, CommentRecord, EntryCreateError, EntryCreator,
        EntryRecord, NewTopic, TopicCatalog, TopicCatalogError, TopicRecord, VoteError, VoteKind,
        Voter,
    },
};

/// Thread-safe in-memory topic catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTopicCatalog {
    state: Arc<RwLock<TopicState>>,
}

#[derive(Debug, Default)]
struct TopicState {
    topics: HashMap<TopicId, TopicRecord>,
    slug_index: HashMap<String, TopicId>,
}

impl InMemoryTopicCatalog {
    /// Creates an empty in-memory catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many topics exist.
    ///
    /// # Errors
    ///
    /// Returns [`TopicCatalogError::Backend`] when the state lock is
    /// poisoned.
    pub fn topic_count(&self) -> Result<usize, TopicCatalogError> {
        let state = self.state.read().map_err(topic_lock_poisoned)?;
        Ok(state.topics.len())
    }
}

fn topic_lock_poisoned<T>(err: std::sync::PoisonError<T>) -> TopicCatalogError {
    TopicCatalogError::backend(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TopicCatalog for InMemoryTopicCatalog {
    async fn find_by_id(&self, id: TopicId) -> Result<Option<TopicRecord>, TopicCatalogError> {
        let state = self.state.read().map_err(topic_lock_poisoned)?;
        Ok(state.topics.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<TopicRecord>, TopicCatalogError> {
        let state = self.state.read().map_err(topic_lock_poisoned)?;
        let topic = state
            .slug_index
            .get(slug.as_str())
            .and_then(|id| state.topics.get(id))
            .cloned();
        Ok(topic)
    }

    async fn create(&self, topic: NewTopic) -> Result<TopicRecord, TopicCatalogError> {
        let mut state = self.state.write().map_err(topic_lock_poisoned)?;
        if state.slug_index.contains_key(topic.slug.as_str()) {
            return Err(TopicCatalogError::DuplicateSlug(topic.slug));
        }

        let record = TopicRecord {
            id: TopicId::new(),
            slug: topic.slug,
            title: topic.title,
            category: topic.category,
            created_by: Some(topic.created_by),
            virtual_day_phase: topic.virtual_day_phase,
        };
        state
            .slug_index
            .insert(record.slug.as_str().to_owned(), record.id);
        state.topics.insert(record.id, record.clone());
        Ok(record)
    }
}

/// Thread-safe in-memory entry, comment, and vote store.
///
/// One store implements all three content capabilities because the comment
/// and vote rules need to see entry authorship.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContentStore {
    state: Arc<RwLock<ContentState>>,
}

#[derive(Debug, Default)]
struct ContentState {
    entries: HashMap<EntryId, EntryRecord>,
    entry_index: HashMap<(AgentId, TopicId), EntryId>,
    comments: HashMap<CommentId, CommentRecord>,
    top_level_comments: HashMap<(AgentId, EntryId), CommentId>,
    votes: HashMap<(AgentId, EntryId), VoteKind>,
}

impl InMemoryContentStore {
    /// Creates an empty in-memory content store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many entries exist.
    ///
    /// # Errors
    ///
    /// Returns [`EntryCreateError::Backend`] when the state lock is
    /// poisoned.
    pub fn entry_count(&self) -> Result<usize, EntryCreateError> {
        let state = self.state.read().map_err(entry_lock_poisoned)?;
        Ok(state.entries.len())
    }

    /// Returns how many comments exist.
    ///
    /// # Errors
    ///
    /// Returns [`CommentCreateError::Backend`] when the state lock is
    /// poisoned.
    pub fn comment_count(&self) -> Result<usize, CommentCreateError> {
        let state = self.state.read().map_err(comment_lock_poisoned)?;
        Ok(state.comments.len())
    }

    /// Returns the vote `voter` has on `entry`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`VoteError::Backend`] when the state lock is poisoned.
    pub fn find_vote(
        &self,
        voter: AgentId,
        entry: EntryId,
    ) -> Result<Option<VoteKind>, VoteError> {
        let state = self.state.read().map_err(vote_lock_poisoned)?;
        Ok(state.votes.get(&(voter, entry)).copied())
    }
}

fn entry_lock_poisoned<T>(err: std::sync::PoisonError<T>) -> EntryCreateError {
    EntryCreateError::backend(std::io::Error::other(err.to_string()))
}

fn comment_lock_poisoned<T>(err: std::sync::PoisonError<T>) -> CommentCreateError {
    CommentCreateError::backend(std::io::Error::other(err.to_string()))
}

fn vote_lock_poisoned<T>(err: std::sync::PoisonError<T>) -> VoteError {
    VoteError::backend(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl EntryCreator for InMemoryContentStore {
    async fn create(
        &self,
        topic: TopicId,
        author: AgentId,
        content: &str,
        _originating_task: Option<TaskId>,
    ) -> Result<EntryRecord, EntryCreateError> {
        if content.is_empty() {
            return Err(EntryCreateError::InvalidContent(
                "entry content cannot be empty".to_owned(),
            ));
        }

        let mut state = self.state.write().map_err(entry_lock_poisoned)?;
        if state.entry_index.contains_key(&(author, topic)) {
            return Err(EntryCreateError::Duplicate { author, topic });
        }

        let record = EntryRecord {
            id: EntryId::new(),
            topic_id: topic,
            author,
        };
        state.entry_index.insert((author, topic), record.id);
        state.entries.insert(record.id, record);
        Ok(record)
    }

    async fn find_by_author(
        &self,
        author: AgentId,
        topic: TopicId,
    ) -> Result<Option<EntryRecord>, EntryCreateError> {
        let state = self.state.read().map_err(entry_lock_poisoned)?;
        let entry = state
            .entry_index
            .get(&(author, topic))
            .and_then(|id| state.entries.get(id))
            .copied();
        Ok(entry)
    }
}

#[async_trait]
impl CommentCreator for InMemoryContentStore {
    async fn create(
        &self,
        entry: EntryId,
        author: AgentId,
        parent: Option<CommentId>,
        content: &str,
    ) -> Result<CommentRecord, CommentCreateError> {
        if content.is_empty() {
            return Err(CommentCreateError::InvalidContent(
                "comment content cannot be empty".to_owned(),
            ));
        }

        let mut state = self.state.write().map_err(comment_lock_poisoned)?;
        let target = *state
            .entries
            .get(&entry)
            .ok_or(CommentCreateError::EntryNotFound(entry))?;

        // The collaborator's own suppression rules: no top-level comments on
        // one's own entry, and at most one top-level comment per agent per
        // entry.
        if parent.is_none() {
            if target.author == author {
                return Err(CommentCreateError::Conflict(
                    "cannot write a top-level comment on own entry".to_owned(),
                ));
            }
            if state.top_level_comments.contains_key(&(author, entry)) {
                return Err(CommentCreateError::Duplicate { author, entry });
            }
        }

        let record = CommentRecord {
            id: CommentId::new(),
            entry_id: entry,
            author,
        };
        if parent.is_none() {
            state.top_level_comments.insert((author, entry), record.id);
        }
        state.comments.insert(record.id, record);
        Ok(record)
    }
}

#[async_trait]
impl Voter for InMemoryContentStore {
    async fn vote(&self, entry: EntryId, voter: AgentId, kind: VoteKind) -> Result<(), VoteError> {
        let mut state = self.state.write().map_err(vote_lock_poisoned)?;
        let target = *state
            .entries
            .get(&entry)
            .ok_or(VoteError::EntryNotFound(entry))?;

        if target.author == voter {
            return Err(VoteError::CannotVoteOwn { voter, entry });
        }
        if state.votes.get(&(voter, entry)) == Some(&kind) {
            return Err(VoteError::AlreadyVoted { voter, entry });
        }

        // A vote in the opposite direction replaces the previous one.
        state.votes.insert((voter, entry), kind);
        Ok(())
    }
}
