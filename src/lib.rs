//! Task Genius: LLM-generated learning tasks with an optimistic, reorderable list.
//!
//! The library has two sides:
//! - the persisted side: an owner-scoped SQLite [`TaskStore`], served over
//!   HTTP by the [`server`] module;
//! - the client side: a [`TaskClient`] that holds an immutable [`TaskList`]
//!   snapshot and keeps it in step with any [`TaskService`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskgenius::{ClientConfig, LocalTaskService, TaskClient, TaskStore};
//! use tokio::sync::Mutex;
//!
//! # async fn run() -> eyre::Result<()> {
//! let store = Arc::new(Mutex::new(TaskStore::in_memory()?));
//! let service = LocalTaskService::new(store, "user-1");
//! let mut client = TaskClient::new(service, ClientConfig::default());
//!
//! client.create("Install Python").await?;
//! client.create("Learn basic syntax").await?;
//! let last = client.create("Practice with exercises").await?;
//!
//! // Move the last task to the top; the list updates before the call returns.
//! client.reorder(&last.id, 0).await?;
//! assert_eq!(client.tasks()[0].id, last.id);
//! # Ok(())
//! # }
//! ```

mod id;
mod storage;
mod store;
mod types;

pub mod client;
pub mod config;
pub mod generate;
pub mod http;
pub mod list;
pub mod reorder;
pub mod server;
pub mod service;

// Re-export public API
pub use client::{Notice, NoticeLevel, ReorderOutcome, TaskClient};
pub use config::{ClientConfig, ServerConfig, SyncPolicy};
pub use generate::{GeminiGenerator, Generator, clean_generated};
pub use http::HttpTaskService;
pub use list::TaskList;
pub use reorder::{Move, ReorderEvent, ReorderPhase};
pub use service::{LocalTaskService, ServiceError, TaskService};
pub use store::{StoreError, TaskStore};
pub use types::{
    CreateTask, GenerateRequest, GenerateResponse, Priority, Progress, ReorderTask, Task, UpdateTask, ValidationError,
};
