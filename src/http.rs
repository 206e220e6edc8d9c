//! HTTP client for a remote task service.

use crate::generate::Generator;
use crate::server::OWNER_HEADER;
use crate::service::{ServiceError, TaskService};
use crate::types::{CreateTask, ErrorBody, GenerateRequest, GenerateResponse, ReorderTask, Task, UpdateTask};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

/// Talks to a task service over HTTP, identifying as one owner.
#[derive(Clone)]
pub struct HttpTaskService {
    client: Client,
    base_url: String,
    owner_id: String,
}

impl HttpTaskService {
    pub fn new(base_url: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            owner_id: owner_id.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL of one task, with the ID percent-encoded as a single path segment.
    fn task_url(&self, id: &str) -> Result<Url, ServiceError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ServiceError::Transport(format!("invalid base URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ServiceError::Transport(format!("invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .push("tasks")
            .push(id);
        Ok(url)
    }

    /// Send a request and turn transport failures and error statuses into
    /// [`ServiceError`]s.
    async fn send(&self, request: RequestBuilder, target: &str) -> Result<Response, ServiceError> {
        let response = request
            .header(OWNER_HEADER, &self.owner_id)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ServiceError::Transport(format!("connection failed: {}", e))
                } else {
                    ServiceError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        log::warn!("{} failed with {}: {}", target, status, message);

        Err(match status {
            StatusCode::UNAUTHORIZED => ServiceError::Auth,
            StatusCode::NOT_FOUND => ServiceError::NotFound(target.to_string()),
            StatusCode::BAD_REQUEST => ServiceError::Validation(message),
            _ => ServiceError::Transport(format!("{}: {}", status, message)),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
        response
            .json()
            .await
            .map_err(|e| ServiceError::Transport(format!("invalid response body: {}", e)))
    }
}

#[async_trait]
impl TaskService for HttpTaskService {
    async fn list(&self) -> Result<Vec<Task>, ServiceError> {
        let response = self.send(self.client.get(self.url("/tasks")), "/tasks").await?;
        Self::decode(response).await
    }

    async fn create(&self, content: &str) -> Result<Task, ServiceError> {
        let body = CreateTask {
            content: content.to_string(),
        };
        let response = self
            .send(self.client.post(self.url("/tasks")).json(&body), "/tasks")
            .await?;
        Self::decode(response).await
    }

    async fn set_completed(&self, id: &str, completed: bool) -> Result<Task, ServiceError> {
        let url = self.task_url(id)?;
        let response = self
            .send(self.client.patch(url).json(&UpdateTask { completed }), id)
            .await?;
        Self::decode(response).await
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let url = self.task_url(id)?;
        self.send(self.client.delete(url), id).await?;
        Ok(())
    }

    async fn reorder(&self, id: &str, new_order: i64) -> Result<(), ServiceError> {
        let body = ReorderTask {
            task_id: id.to_string(),
            new_order,
        };
        self.send(self.client.post(self.url("/tasks/reorder")).json(&body), id)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Generator for HttpTaskService {
    async fn generate(&self, topic: &str) -> Result<Vec<String>, ServiceError> {
        let body = GenerateRequest {
            topic: topic.to_string(),
        };
        let response = self
            .send(self.client.post(self.url("/generate")).json(&body), "/generate")
            .await?;
        let generated: GenerateResponse = Self::decode(response).await?;
        Ok(generated.tasks)
    }
}
