//! Core data types for Task Genius.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a task's content, in characters.
pub const MAX_CONTENT_CHARS: usize = 500;

/// One learning task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier: "tk-" + 10 hex chars, assigned by the store
    pub id: String,

    /// Owning user, set once at creation
    pub owner_id: String,

    /// Free-text description of the task
    pub content: String,

    #[serde(default)]
    pub completed: bool,

    /// Position among the owner's tasks; absent until the first reorder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,

    /// Client-local hint, never persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Client-local hint, never persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    pub created_at: DateTime<Utc>,
}

/// Priority hint shown next to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}': expected low, medium or high", other)),
        }
    }
}

/// Validation errors for task input.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyContent,
    ContentTooLong,
    InvalidCharacters,
    EmptyTopic,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyContent => write!(f, "content cannot be empty"),
            ValidationError::ContentTooLong => {
                write!(f, "content exceeds {} characters", MAX_CONTENT_CHARS)
            }
            ValidationError::InvalidCharacters => write!(f, "content contains control characters"),
            ValidationError::EmptyTopic => write!(f, "Topic is required"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate task content before it is sent or stored.
pub fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(ValidationError::ContentTooLong);
    }
    if content.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidCharacters);
    }
    Ok(())
}

/// Validate a generation topic.
pub fn validate_topic(topic: &str) -> Result<(), ValidationError> {
    if topic.trim().is_empty() {
        return Err(ValidationError::EmptyTopic);
    }
    Ok(())
}

/// Completion summary over a task list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Tasks not yet completed.
    pub fn pending(&self) -> usize {
        self.total - self.completed
    }

    /// Completion percentage, 0 for an empty list.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub content: String,
}

/// Body of `PATCH /tasks/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTask {
    pub completed: bool,
}

/// Body of `POST /tasks/reorder`: the moved task and its index in the final list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTask {
    pub task_id: String,
    pub new_order: i64,
}

/// Body of `POST /generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub topic: String,
}

/// Successful `POST /generate` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub tasks: Vec<String>,
}

/// Error body returned by every failing route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
