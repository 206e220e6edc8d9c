//! HTTP task service.
//!
//! Routes:
//! - `GET /tasks`, `POST /tasks`
//! - `PATCH /tasks/:id`, `DELETE /tasks/:id`
//! - `POST /tasks/reorder`
//! - `POST /generate`
//! - `GET /health`
//!
//! Task routes act on behalf of the owner named in the `x-owner-id` header;
//! requests without it are rejected with 401. Tasks of other owners are
//! reported as not found.

use crate::config::ServerConfig;
use crate::generate::{GeminiGenerator, Generator, UnconfiguredGenerator};
use crate::service::ServiceError;
use crate::store::{StoreError, TaskStore};
use crate::types::{
    CreateTask, ErrorBody, GenerateRequest, GenerateResponse, ReorderTask, Task, UpdateTask, validate_topic,
};
use axum::{
    Json, Router, async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request, State, rejection::JsonRejection},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use eyre::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

/// Header carrying the authenticated owner's opaque identifier.
pub const OWNER_HEADER: &str = "x-owner-id";

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<TaskStore>>,
    generator: Arc<dyn Generator>,
}

impl AppState {
    pub fn new(store: TaskStore, generator: Arc<dyn Generator>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            generator,
        }
    }
}

/// Error response: a status code and a JSON `{error}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Map a store failure, logging it under `tag`.
    fn from_store(tag: &str, err: eyre::Report) -> Self {
        match err.downcast_ref::<StoreError>() {
            Some(StoreError::TaskNotFound(_)) => Self::new(StatusCode::NOT_FOUND, "Task not found"),
            Some(e @ (StoreError::Validation(_) | StoreError::InvalidOrder(_))) => {
                Self::new(StatusCode::BAD_REQUEST, e.to_string())
            }
            None => {
                log::error!("[{}] {:#}", tag, err);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error")
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            ServiceError::Auth => Self::new(StatusCode::UNAUTHORIZED, "Unauthorized"),
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Task not found"),
            ServiceError::Transport(msg) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

/// The authenticated caller.
pub struct Owner(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Owner(v.to_string()))
            .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

/// JSON request body whose rejections are reported as `{error}` with 400.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/reorder", post(reorder_tasks))
        .route("/tasks/:id", patch(update_task).delete(delete_task))
        .route("/generate", post(generate))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Build state from configuration: open the store and pick a generator.
pub fn state_from_config(config: &ServerConfig) -> Result<AppState> {
    let store = TaskStore::open(&config.db_path).context("Failed to open task store")?;

    let generator: Arc<dyn Generator> = match &config.generator.api_key {
        Some(key) => Arc::new(GeminiGenerator::new(
            key.clone(),
            config.generator.model.clone(),
            config.generator.max_output_tokens,
        )),
        None => {
            log::warn!("GEMINI_API_KEY not set; /generate will fail");
            Arc::new(UnconfiguredGenerator)
        }
    };

    Ok(AppState::new(store, generator))
}

/// Serve on an already-bound listener until the future resolves.
pub async fn serve_on(
    listener: TcpListener,
    state: AppState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = listener.local_addr().context("Failed to read listener address")?;
    log::info!("Task service listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    log::info!("Task service shut down");
    Ok(())
}

/// Bind per `config` and serve until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = state_from_config(&config)?;
    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;

    serve_on(listener, state, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn health() -> &'static str {
    "ok"
}

async fn list_tasks(State(state): State<AppState>, Owner(owner): Owner) -> Result<Json<Vec<Task>>, ApiError> {
    let store = state.store.lock().await;
    let tasks = store.list(&owner).map_err(|e| ApiError::from_store("TASK_GET", e))?;
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<AppState>,
    Owner(owner): Owner,
    AppJson(body): AppJson<CreateTask>,
) -> Result<Json<Task>, ApiError> {
    let mut store = state.store.lock().await;
    let task = store
        .create(&owner, &body.content)
        .map_err(|e| ApiError::from_store("TASK_POST", e))?;
    log::info!("Created task {} for {}", task.id, owner);
    Ok(Json(task))
}

async fn update_task(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    AppJson(body): AppJson<UpdateTask>,
) -> Result<Json<Task>, ApiError> {
    let mut store = state.store.lock().await;
    let task = store
        .set_completed(&owner, &id, body.completed)
        .map_err(|e| ApiError::from_store("TASK_PATCH", e))?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.lock().await;
    store
        .delete(&owner, &id)
        .map_err(|e| ApiError::from_store("TASK_DELETE", e))?;
    log::info!("Deleted task {} for {}", id, owner);
    Ok(StatusCode::NO_CONTENT)
}

async fn reorder_tasks(
    State(state): State<AppState>,
    Owner(owner): Owner,
    AppJson(body): AppJson<ReorderTask>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut store = state.store.lock().await;
    store
        .reorder(&owner, &body.task_id, body.new_order)
        .map_err(|e| ApiError::from_store("TASK_REORDER", e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

async fn generate(
    State(state): State<AppState>,
    AppJson(body): AppJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    validate_topic(&body.topic).map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
    let tasks = state.generator.generate(&body.topic).await?;
    Ok(Json(GenerateResponse { tasks }))
}
