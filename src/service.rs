//! The remote task service as seen by the client.

use crate::store::{StoreError, TaskStore};
use crate::types::Task;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Failure of a single service call.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Missing or malformed input; rejected before or by the service.
    Validation(String),
    /// Caller is not authenticated.
    Auth,
    /// Mutation target no longer exists (or belongs to someone else).
    NotFound(String),
    /// Network failure, non-success status, or undecodable response.
    Transport(String),
}

impl ServiceError {
    /// Whether the caller may retry the action or reload to recover.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ServiceError::Auth)
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Validation(msg) => write!(f, "invalid input: {}", msg),
            ServiceError::Auth => write!(f, "not authenticated"),
            ServiceError::NotFound(id) => write!(f, "task not found: {}", id),
            ServiceError::Transport(msg) => write!(f, "request failed: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<eyre::Report> for ServiceError {
    fn from(err: eyre::Report) -> Self {
        match err.downcast_ref::<StoreError>() {
            Some(StoreError::TaskNotFound(id)) => ServiceError::NotFound(id.clone()),
            Some(e @ StoreError::Validation(_)) | Some(e @ StoreError::InvalidOrder(_)) => {
                ServiceError::Validation(e.to_string())
            }
            None => ServiceError::Transport(format!("{:#}", err)),
        }
    }
}

/// Operations the client needs from the task service. All calls act on
/// behalf of the service's authenticated owner.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// All of the owner's tasks, in display order.
    async fn list(&self) -> Result<Vec<Task>, ServiceError>;

    /// Create a task; the returned record carries the assigned ID.
    async fn create(&self, content: &str) -> Result<Task, ServiceError>;

    /// Set a task's completion flag, returning the updated record.
    async fn set_completed(&self, id: &str, completed: bool) -> Result<Task, ServiceError>;

    async fn delete(&self, id: &str) -> Result<(), ServiceError>;

    /// Move one task to `new_order`, its index in the final list. The service
    /// renumbers the owner's other tasks.
    async fn reorder(&self, id: &str, new_order: i64) -> Result<(), ServiceError>;
}

/// In-process task service over a [`TaskStore`].
#[derive(Clone)]
pub struct LocalTaskService {
    store: Arc<Mutex<TaskStore>>,
    owner_id: String,
}

impl LocalTaskService {
    pub fn new(store: Arc<Mutex<TaskStore>>, owner_id: impl Into<String>) -> Self {
        Self {
            store,
            owner_id: owner_id.into(),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

#[async_trait]
impl TaskService for LocalTaskService {
    async fn list(&self) -> Result<Vec<Task>, ServiceError> {
        let store = self.store.lock().await;
        Ok(store.list(&self.owner_id)?)
    }

    async fn create(&self, content: &str) -> Result<Task, ServiceError> {
        let mut store = self.store.lock().await;
        Ok(store.create(&self.owner_id, content)?)
    }

    async fn set_completed(&self, id: &str, completed: bool) -> Result<Task, ServiceError> {
        let mut store = self.store.lock().await;
        Ok(store.set_completed(&self.owner_id, id, completed)?)
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let mut store = self.store.lock().await;
        Ok(store.delete(&self.owner_id, id)?)
    }

    async fn reorder(&self, id: &str, new_order: i64) -> Result<(), ServiceError> {
        let mut store = self.store.lock().await;
        Ok(store.reorder(&self.owner_id, id, new_order)?)
    }
}
