//! Storage layer for Task Genius: a single SQLite table of owner-scoped tasks.

use crate::reorder::{Move, relocate};
use crate::types::Task;
use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fs;
use std::path::Path;

/// Columns selected for every task read, in `row_to_task` order.
const TASK_COLUMNS: &str = "id, owner_id, content, completed, sort_order, created_at";

/// Display order: ordered tasks first, then never-reordered ones by insertion.
const DISPLAY_ORDER: &str = "ORDER BY sort_order IS NULL, sort_order ASC, seq ASC";

/// Storage handle for reading/writing tasks.
pub struct Storage {
    db: Connection,
}

impl Storage {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let db = Connection::open(path).context("Failed to open SQLite database")?;
        let storage = Self { db };
        storage.init_schema()?;

        log::debug!("Opened task database at {}", path.display());
        Ok(storage)
    }

    /// Open a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let storage = Self { db };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Initialize SQLite schema.
    fn init_schema(&self) -> Result<()> {
        self.db
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS tasks (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    id TEXT NOT NULL UNIQUE,
                    owner_id TEXT NOT NULL,
                    content TEXT NOT NULL,
                    completed INTEGER NOT NULL DEFAULT 0,
                    sort_order INTEGER,
                    created_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_tasks_owner ON tasks(owner_id);
            "#,
            )
            .context("Failed to initialize schema")?;

        Ok(())
    }

    fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
        let created_at_str: String = row.get(5)?;
        Ok(Task {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            content: row.get(2)?,
            completed: row.get(3)?,
            order: row.get(4)?,
            due_date: None,
            priority: None,
            created_at: chrono::DateTime::parse_from_rfc3339(&created_at_str)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }

    /// Insert a new task.
    pub fn insert_task(&self, task: &Task) -> Result<()> {
        self.db.execute(
            r#"
            INSERT INTO tasks (id, owner_id, content, completed, sort_order, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                task.id,
                task.owner_id,
                task.content,
                task.completed,
                task.order,
                task.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a task by ID, only if it belongs to `owner_id`.
    pub fn get_task(&self, owner_id: &str, id: &str) -> Result<Option<Task>> {
        let sql = format!("SELECT {} FROM tasks WHERE id = ? AND owner_id = ?", TASK_COLUMNS);
        let task = self
            .db
            .query_row(&sql, params![id, owner_id], Self::row_to_task)
            .optional()?;
        Ok(task)
    }

    /// List an owner's tasks in display order.
    pub fn list_tasks(&self, owner_id: &str) -> Result<Vec<Task>> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE owner_id = ? {}",
            TASK_COLUMNS, DISPLAY_ORDER
        );
        let mut stmt = self.db.prepare(&sql)?;
        let tasks = stmt
            .query_map(params![owner_id], Self::row_to_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    /// Set a task's completion flag. Returns false if no owned task matched.
    pub fn set_completed(&self, owner_id: &str, id: &str, completed: bool) -> Result<bool> {
        let changed = self.db.execute(
            "UPDATE tasks SET completed = ? WHERE id = ? AND owner_id = ?",
            params![completed, id, owner_id],
        )?;
        Ok(changed > 0)
    }

    /// Delete a task. Returns false if no owned task matched.
    pub fn delete_task(&self, owner_id: &str, id: &str) -> Result<bool> {
        let changed = self
            .db
            .execute("DELETE FROM tasks WHERE id = ? AND owner_id = ?", params![id, owner_id])?;
        Ok(changed > 0)
    }

    /// Splice one task to `new_order` among its owner's tasks and renumber
    /// all of them `0..N-1`, atomically. Returns false if no owned task matched.
    pub fn reorder(&mut self, owner_id: &str, id: &str, new_order: usize) -> Result<bool> {
        let tx = self.db.transaction().context("Failed to begin reorder transaction")?;

        let ids: Vec<String> = {
            let sql = format!("SELECT id FROM tasks WHERE owner_id = ? {}", DISPLAY_ORDER);
            let mut stmt = tx.prepare(&sql)?;
            stmt.query_map(params![owner_id], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let Some(from) = ids.iter().position(|existing| existing == id) else {
            return Ok(false);
        };

        let to = new_order.min(ids.len() - 1);
        let ordered = if from == to {
            ids
        } else {
            relocate(&ids, Move { from, to })
        };

        for (index, task_id) in ordered.iter().enumerate() {
            tx.execute(
                "UPDATE tasks SET sort_order = ? WHERE id = ? AND owner_id = ?",
                params![index as i64, task_id, owner_id],
            )?;
        }

        tx.commit().context("Failed to commit reorder")?;
        Ok(true)
    }
}
