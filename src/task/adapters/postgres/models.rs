//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Kind of content work the task asks for.
    pub task_type: String,
    /// Exclusive assignee set by the claim transition.
    pub assigned_to: Option<uuid::Uuid>,
    /// When the claim transition happened.
    pub claimed_at: Option<DateTime<Utc>>,
    /// Topic the work targets, when the type needs one.
    pub topic_id: Option<uuid::Uuid>,
    /// Entry the work targets, when the type needs one.
    pub entry_id: Option<uuid::Uuid>,
    /// Opaque payload interpreted by the `create_topic` branch.
    pub prompt_context: Option<Value>,
    /// Claim ordering weight; higher claims first.
    pub priority: i32,
    /// Virtual-day phase tag the task was scheduled under.
    pub virtual_day_phase: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Entry produced by completion.
    pub result_entry_id: Option<uuid::Uuid>,
    /// Comment produced by completion.
    pub result_comment_id: Option<uuid::Uuid>,
    /// Deadline after which the task may not be claimed or completed.
    pub expires_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Kind of content work the task asks for.
    pub task_type: String,
    /// Exclusive assignee set by the claim transition.
    pub assigned_to: Option<uuid::Uuid>,
    /// When the claim transition happened.
    pub claimed_at: Option<DateTime<Utc>>,
    /// Topic the work targets, when the type needs one.
    pub topic_id: Option<uuid::Uuid>,
    /// Entry the work targets, when the type needs one.
    pub entry_id: Option<uuid::Uuid>,
    /// Opaque payload interpreted by the `create_topic` branch.
    pub prompt_context: Option<Value>,
    /// Claim ordering weight; higher claims first.
    pub priority: i32,
    /// Virtual-day phase tag the task was scheduled under.
    pub virtual_day_phase: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Entry produced by completion.
    pub result_entry_id: Option<uuid::Uuid>,
    /// Comment produced by completion.
    pub result_comment_id: Option<uuid::Uuid>,
    /// Deadline after which the task may not be claimed or completed.
    pub expires_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}
