//! High-level, owner-scoped task store.

use crate::id::generate_id;
use crate::storage::Storage;
use crate::types::{Task, ValidationError, validate_content};
use chrono::Utc;
use eyre::{Context, Result};
use std::path::Path;

/// Errors that can occur during store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Task not found, or owned by someone else.
    TaskNotFound(String),
    /// Reorder target is negative.
    InvalidOrder(i64),
    /// Validation error.
    Validation(ValidationError),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::TaskNotFound(id) => write!(f, "task not found: {}", id),
            StoreError::InvalidOrder(order) => write!(f, "invalid order: {}", order),
            StoreError::Validation(e) => write!(f, "validation error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

/// The task store. Every operation acts on behalf of one owner.
pub struct TaskStore {
    storage: Storage,
}

impl TaskStore {
    /// Open (creating if needed) a store backed by the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let storage = Storage::open(path)?;
        Ok(Self { storage })
    }

    /// Open a throwaway in-memory store.
    pub fn in_memory() -> Result<Self> {
        let storage = Storage::in_memory()?;
        Ok(Self { storage })
    }

    /// Create a task for `owner_id`.
    pub fn create(&mut self, owner_id: &str, content: &str) -> Result<Task> {
        validate_content(content).map_err(|e| eyre::eyre!(StoreError::Validation(e)))?;

        let now = Utc::now();
        let task = Task {
            id: generate_id(content, now),
            owner_id: owner_id.to_string(),
            content: content.to_string(),
            completed: false,
            order: None,
            due_date: None,
            priority: None,
            created_at: now,
        };

        self.storage.insert_task(&task).context("Failed to persist task")?;
        log::debug!("Created task {} for {}", task.id, owner_id);

        Ok(task)
    }

    /// Get a task by ID.
    pub fn get(&self, owner_id: &str, id: &str) -> Result<Option<Task>> {
        self.storage.get_task(owner_id, id)
    }

    /// List all of an owner's tasks in display order.
    pub fn list(&self, owner_id: &str) -> Result<Vec<Task>> {
        self.storage.list_tasks(owner_id)
    }

    /// Set a task's completion flag, returning the updated task.
    pub fn set_completed(&mut self, owner_id: &str, id: &str, completed: bool) -> Result<Task> {
        if !self.storage.set_completed(owner_id, id, completed)? {
            return Err(eyre::eyre!(StoreError::TaskNotFound(id.to_string())));
        }

        self.storage
            .get_task(owner_id, id)?
            .ok_or_else(|| eyre::eyre!(StoreError::TaskNotFound(id.to_string())))
    }

    /// Delete a task.
    pub fn delete(&mut self, owner_id: &str, id: &str) -> Result<()> {
        if !self.storage.delete_task(owner_id, id)? {
            return Err(eyre::eyre!(StoreError::TaskNotFound(id.to_string())));
        }
        log::debug!("Deleted task {} for {}", id, owner_id);
        Ok(())
    }

    /// Move one task to `new_order` (its index in the final list) and
    /// renumber the owner's tasks `0..N-1`. Targets past the end move the
    /// task last.
    pub fn reorder(&mut self, owner_id: &str, id: &str, new_order: i64) -> Result<()> {
        let Ok(position) = usize::try_from(new_order) else {
            return Err(eyre::eyre!(StoreError::InvalidOrder(new_order)));
        };

        if !self
            .storage
            .reorder(owner_id, id, position)
            .context("Failed to persist reorder")?
        {
            return Err(eyre::eyre!(StoreError::TaskNotFound(id.to_string())));
        }

        log::debug!("Moved task {} to {} for {}", id, position, owner_id);
        Ok(())
    }
}
