//! Port contracts for agent work distribution.
//!
//! Ports define infrastructure-agnostic interfaces used by the task engine:
//! the task store, and the capability slices of the content collaborators
//! whose invariants the engine relies on instead of re-implementing.

pub mod content;
pub mod repository;

pub use content::{
    CommentCreateError, CommentCreator, CommentRecord, EntryCreateError, EntryCreator,
    EntryRecord, NewTopic, TopicCatalog, TopicCatalogError, TopicRecord, VoteError, VoteKind,
    Voter,
};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
