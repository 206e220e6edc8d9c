//! Shared test infrastructure for Task Genius integration tests.
//!
//! Provides TestEnv (a tempdir-backed store) and ScriptedService, a task
//! service that records calls and fails on demand.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use taskgenius::{
    ClientConfig, LocalTaskService, ServiceError, Task, TaskClient, TaskService, TaskStore,
};
use tempfile::TempDir;
use tokio::sync::Mutex;

pub const OWNER: &str = "user-1";

/// Test environment with automatic cleanup.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub store: Arc<Mutex<TaskStore>>,
}

impl TestEnv {
    /// Create a new test environment with an empty store.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = TaskStore::open(&temp_dir.path().join("tasks.db")).expect("Failed to open store");
        Self {
            temp_dir,
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// A service acting as `owner`.
    pub fn service(&self, owner: &str) -> LocalTaskService {
        LocalTaskService::new(Arc::clone(&self.store), owner)
    }

    /// A scripted service acting as the default owner.
    pub fn scripted(&self) -> ScriptedService {
        ScriptedService::new(self.service(OWNER))
    }

    /// Seed tasks directly in the store, bypassing any client.
    pub async fn seed(&self, contents: &[&str]) -> Vec<Task> {
        let mut store = self.store.lock().await;
        contents
            .iter()
            .map(|c| store.create(OWNER, c).expect("Failed to create task"))
            .collect()
    }

    /// What the store holds for the default owner right now.
    pub async fn stored(&self) -> Vec<Task> {
        self.store.lock().await.list(OWNER).expect("Failed to list tasks")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// A call observed by [`ScriptedService`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Create(String),
    SetCompleted(String, bool),
    Delete(String),
    Reorder(String, i64),
}

/// Delegates to a real service, recording every call and failing the
/// operations whose flag is set.
#[derive(Clone)]
pub struct ScriptedService {
    inner: LocalTaskService,
    calls: Arc<StdMutex<Vec<Call>>>,
    pub fail_list: Arc<AtomicBool>,
    pub fail_create: Arc<AtomicBool>,
    pub fail_update: Arc<AtomicBool>,
    pub fail_delete: Arc<AtomicBool>,
    pub fail_reorder: Arc<AtomicBool>,
    pub unauthenticated: Arc<AtomicBool>,
}

impl ScriptedService {
    pub fn new(inner: LocalTaskService) -> Self {
        Self {
            inner,
            calls: Arc::new(StdMutex::new(Vec::new())),
            fail_list: Arc::new(AtomicBool::new(false)),
            fail_create: Arc::new(AtomicBool::new(false)),
            fail_update: Arc::new(AtomicBool::new(false)),
            fail_delete: Arc::new(AtomicBool::new(false)),
            fail_reorder: Arc::new(AtomicBool::new(false)),
            unauthenticated: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call, fail: &AtomicBool) -> Result<(), ServiceError> {
        self.calls.lock().unwrap().push(call);
        if self.unauthenticated.load(Ordering::SeqCst) {
            return Err(ServiceError::Auth);
        }
        if fail.load(Ordering::SeqCst) {
            return Err(ServiceError::Transport("500 Internal Server Error: Internal Error".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskService for ScriptedService {
    async fn list(&self) -> Result<Vec<Task>, ServiceError> {
        self.record(Call::List, &self.fail_list)?;
        self.inner.list().await
    }

    async fn create(&self, content: &str) -> Result<Task, ServiceError> {
        self.record(Call::Create(content.to_string()), &self.fail_create)?;
        self.inner.create(content).await
    }

    async fn set_completed(&self, id: &str, completed: bool) -> Result<Task, ServiceError> {
        self.record(Call::SetCompleted(id.to_string(), completed), &self.fail_update)?;
        self.inner.set_completed(id, completed).await
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.record(Call::Delete(id.to_string()), &self.fail_delete)?;
        self.inner.delete(id).await
    }

    async fn reorder(&self, id: &str, new_order: i64) -> Result<(), ServiceError> {
        self.record(Call::Reorder(id.to_string(), new_order), &self.fail_reorder)?;
        self.inner.reorder(id, new_order).await
    }
}

/// Build a client over `service` and load it.
pub async fn loaded_client<S: TaskService>(service: S, config: ClientConfig) -> TaskClient<S> {
    let mut client = TaskClient::new(service, config);
    client.load().await.expect("Failed to load tasks");
    client
}

/// IDs of tasks in display order.
pub fn ids(tasks: &[Task]) -> Vec<String> {
    tasks.iter().map(|t| t.id.clone()).collect()
}
