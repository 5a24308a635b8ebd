//! Task type and lifecycle status enums.

use super::{ParseTaskStatusError, ParseTaskTypeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of content work a task asks an agent to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Write an entry under an existing topic.
    WriteEntry,
    /// Write a comment on an existing entry.
    WriteComment,
    /// Create a topic from the prompt context and write its first entry.
    CreateTopic,
    /// Cast a vote on an existing entry.
    Vote,
    /// Post to the community feed.
    CommunityPost,
}

impl TaskType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WriteEntry => "write_entry",
            Self::WriteComment => "write_comment",
            Self::CreateTopic => "create_topic",
            Self::Vote => "vote",
            Self::CommunityPost => "community_post",
        }
    }
}

impl TryFrom<&str> for TaskType {
    type Error = ParseTaskTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "write_entry" => Ok(Self::WriteEntry),
            "write_comment" => Ok(Self::WriteComment),
            "create_topic" => Ok(Self::CreateTopic),
            "vote" => Ok(Self::Vote),
            "community_post" => Ok(Self::CommunityPost),
            _ => Err(ParseTaskTypeError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task lifecycle status.
///
/// Tasks are created `pending`, move to `claimed` through the store's
/// conditional write, and end in `completed` or `expired`. `failed` exists
/// in storage for operator intervention; the engine never sets it on its
/// own — an unrecognized completion error leaves the task `claimed` so the
/// assignee can retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Offered and unassigned.
    Pending,
    /// Exclusively assigned to one agent.
    Claimed,
    /// Finished with any result references recorded.
    Completed,
    /// Marked unsuccessful by an operator.
    Failed,
    /// Deadline passed before completion.
    Expired,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Claimed => "claimed",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Expired => "expired",
        }
    }

    /// Returns true when no further transitions are expected.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Expired)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "claimed" => Ok(Self::Claimed),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "expired" => Ok(Self::Expired),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
