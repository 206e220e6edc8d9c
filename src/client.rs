//! Task list client: local snapshot, optimistic reordering, and recovery.
//!
//! The client owns the session's view of the task list as an immutable
//! [`TaskList`] snapshot and keeps it consistent with a [`TaskService`].
//! Mutations take `&mut self`, so a client runs at most one operation at a
//! time; each call settles (success or failure) before the next begins.

use crate::config::{ClientConfig, SyncPolicy};
use crate::generate::Generator;
use crate::list::TaskList;
use crate::reorder::{Move, ReorderEvent, ReorderPhase};
use crate::service::{ServiceError, TaskService};
use crate::types::{Priority, Progress, Task, validate_content, validate_topic};
use chrono::NaiveDate;

/// How prominently a notice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    /// Recoverable failure.
    Error,
    /// Failure the user must resolve before continuing (e.g. signing in).
    Blocking,
}

/// A transient, user-facing notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Result of a reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// Nothing to do: same position, unknown task, or undefined target.
    Unchanged,
    /// The move was applied and acknowledged.
    Confirmed,
}

/// Client for one owner's task list.
pub struct TaskClient<S> {
    service: S,
    config: ClientConfig,
    tasks: TaskList,
    phase: ReorderPhase,
    notices: Vec<Notice>,
}

impl<S: TaskService> TaskClient<S> {
    pub fn new(service: S, config: ClientConfig) -> Self {
        Self {
            service,
            config,
            tasks: TaskList::default(),
            phase: ReorderPhase::Stable,
            notices: Vec::new(),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> TaskList {
        self.tasks.clone()
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.tasks()
    }

    pub fn progress(&self) -> Progress {
        self.tasks.progress()
    }

    /// Reorder state machine position; `Stable` whenever no call is in flight.
    pub fn phase(&self) -> ReorderPhase {
        self.phase
    }

    /// Take all notices raised since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Info => log::info!("{}", message),
            NoticeLevel::Error | NoticeLevel::Blocking => log::warn!("{}", message),
        }
        self.notices.push(Notice { level, message });
    }

    fn notify_failure(&mut self, action: &str, err: &ServiceError) {
        let level = if err.is_recoverable() {
            NoticeLevel::Error
        } else {
            NoticeLevel::Blocking
        };
        self.notify(level, format!("Failed to {}: {}", action, err));
    }

    async fn fetch(&mut self) -> Result<TaskList, ServiceError> {
        let tasks = self.service.list().await?;
        Ok(TaskList::new(tasks).with_hints_from(&self.tasks))
    }

    /// Replace the local list with the service's. On failure the list keeps
    /// its prior state.
    pub async fn load(&mut self) -> Result<TaskList, ServiceError> {
        match self.fetch().await {
            Ok(list) => {
                log::debug!("Loaded {} tasks", list.len());
                self.tasks = list;
                Ok(self.snapshot())
            }
            Err(e) => {
                self.notify_failure("fetch tasks", &e);
                Err(e)
            }
        }
    }

    /// Create a task and append the service's record. No optimistic insert.
    pub async fn create(&mut self, content: &str) -> Result<Task, ServiceError> {
        if let Err(e) = validate_content(content) {
            let err = ServiceError::Validation(e.to_string());
            self.notify_failure("create task", &err);
            return Err(err);
        }

        match self.service.create(content).await {
            Ok(task) => {
                self.tasks = self.tasks.appended(task.clone());
                Ok(task)
            }
            Err(e) => {
                self.notify_failure("create task", &e);
                Err(e)
            }
        }
    }

    /// Flip a task's completion flag. Unknown IDs are ignored.
    ///
    /// The local flag is not flipped optimistically; it changes only once
    /// the service has accepted the update.
    pub async fn toggle_completion(&mut self, id: &str) -> Result<TaskList, ServiceError> {
        let Some(task) = self.tasks.get(id) else {
            return Ok(self.snapshot());
        };
        let completed = !task.completed;

        match self.service.set_completed(id, completed).await {
            Ok(updated) => match self.config.sync {
                SyncPolicy::Reload => self.load().await,
                SyncPolicy::ApplyReturned => {
                    self.tasks = self.tasks.replaced(updated);
                    Ok(self.snapshot())
                }
            },
            Err(e) => {
                self.notify_failure("update task", &e);
                Err(e)
            }
        }
    }

    /// Delete a task, then resynchronise.
    pub async fn delete(&mut self, id: &str) -> Result<TaskList, ServiceError> {
        if let Err(e) = self.service.delete(id).await {
            self.notify_failure("delete task", &e);
            return Err(e);
        }

        self.notify(NoticeLevel::Info, "Task deleted");
        match self.config.sync {
            SyncPolicy::Reload => self.load().await,
            SyncPolicy::ApplyReturned => {
                self.tasks = self.tasks.without(id);
                Ok(self.snapshot())
            }
        }
    }

    /// Move the task `id` to `new_position` in the displayed list.
    pub async fn reorder(&mut self, id: &str, new_position: usize) -> Result<ReorderOutcome, ServiceError> {
        let Some(from) = self.tasks.position(id) else {
            return Ok(ReorderOutcome::Unchanged);
        };
        self.move_task(from, Some(new_position)).await
    }

    /// Move the task at display index `from` to `to`, as reported by a
    /// drag-end event. `to` is `None` when the drop landed outside the list.
    ///
    /// The relocated, renumbered list is applied before the service call.
    /// On failure it is discarded and the list is reloaded; if that reload
    /// fails too, the pre-move snapshot is restored.
    pub async fn move_task(&mut self, from: usize, to: Option<usize>) -> Result<ReorderOutcome, ServiceError> {
        let Some(mv) = Move::plan(self.tasks.len(), from, to) else {
            return Ok(ReorderOutcome::Unchanged);
        };

        let before = self.snapshot();
        let moved_id = before.tasks()[mv.from].id.clone();

        self.tasks = before.relocated(mv);
        self.phase = self.phase.on(ReorderEvent::Applied);

        match self.service.reorder(&moved_id, mv.new_order()).await {
            Ok(()) => {
                self.phase = self.phase.on(ReorderEvent::Confirmed);
                log::debug!("Moved {} from {} to {}", moved_id, mv.from, mv.to);
                Ok(ReorderOutcome::Confirmed)
            }
            Err(e) => {
                self.phase = self.phase.on(ReorderEvent::Failed);
                self.notify_failure("reorder tasks", &e);

                match self.fetch().await {
                    Ok(list) => self.tasks = list,
                    Err(reload_err) => {
                        log::warn!("Reload after failed reorder also failed: {}", reload_err);
                        self.tasks = before;
                    }
                }
                self.phase = self.phase.on(ReorderEvent::Reloaded);
                Err(e)
            }
        }
    }

    /// Set client-local hints on a task. Nothing is sent to the service.
    pub fn annotate(&mut self, id: &str, due_date: Option<NaiveDate>, priority: Option<Priority>) -> TaskList {
        self.tasks = self.tasks.annotated(id, due_date, priority);
        self.snapshot()
    }

    /// Ask `generator` for suggestions about `topic`. Nothing is persisted.
    pub async fn generate(&mut self, generator: &dyn Generator, topic: &str) -> Result<Vec<String>, ServiceError> {
        if let Err(e) = validate_topic(topic) {
            let err = ServiceError::Validation(e.to_string());
            self.notify_failure("generate tasks", &err);
            return Err(err);
        }

        match generator.generate(topic).await {
            Ok(tasks) => Ok(tasks),
            Err(e) => {
                self.notify_failure("generate tasks", &e);
                Err(e)
            }
        }
    }

    /// Create each suggestion in order, stopping at the first failure.
    /// Returns the tasks created before that point.
    pub async fn add_generated(&mut self, suggestions: &[String]) -> Vec<Task> {
        let mut created = Vec::new();
        for content in suggestions {
            match self.create(content).await {
                Ok(task) => created.push(task),
                Err(_) => break,
            }
        }
        created
    }
}
