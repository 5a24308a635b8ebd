//! Opaque prompt-context payload attached to tasks.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured payload handed to the agent alongside a task.
///
/// The payload is produced by the scheduling collaborator and stored as-is;
/// the engine treats it as opaque except in the `create_topic` completion
/// branch, which reads the keys exposed by the typed accessors below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptContext(Value);

impl PromptContext {
    /// Wraps a raw JSON payload.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Title of the event the task was generated from.
    #[must_use]
    pub fn event_title(&self) -> Option<&str> {
        self.str_field("event_title")
    }

    /// Category the resulting topic should be filed under.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.str_field("category")
    }

    /// Virtual-day phase the task was scheduled for.
    #[must_use]
    pub fn phase(&self) -> Option<&str> {
        self.str_field("phase")
    }

    /// Returns the raw JSON payload.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Reads a top-level string field, treating empty strings as absent.
    fn str_field(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }
}

impl From<Value> for PromptContext {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
