//! End-to-end tests: the axum task service driven by the HTTP client.

mod common;

use async_trait::async_trait;
use common::ids;
use std::sync::Arc;
use taskgenius::server::{AppState, OWNER_HEADER, serve_on};
use taskgenius::{
    ClientConfig, Generator, HttpTaskService, ReorderOutcome, ServiceError, TaskClient, TaskService, TaskStore,
    clean_generated,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Generator returning canned model output, or failing like an upstream outage.
/// Accepts any topic; checking it is left to the server.
struct CannedGenerator {
    output: Option<&'static str>,
}

#[async_trait]
impl Generator for CannedGenerator {
    async fn generate(&self, _topic: &str) -> Result<Vec<String>, ServiceError> {
        match self.output {
            Some(text) => Ok(clean_generated(text)),
            None => Err(ServiceError::Transport("API Error - Check your API key and billing".to_string())),
        }
    }
}

/// A running server on an ephemeral port; shuts down on drop.
struct TestServer {
    base_url: String,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    async fn start(output: Option<&'static str>) -> Self {
        let store = TaskStore::in_memory().unwrap();
        let state = AppState::new(store, Arc::new(CannedGenerator { output }));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            serve_on(listener, state, async {
                let _ = rx.await;
            })
            .await
            .unwrap();
        });

        Self {
            base_url,
            _shutdown: tx,
        }
    }

    fn service(&self, owner: &str) -> HttpTaskService {
        HttpTaskService::new(self.base_url.clone(), owner)
    }
}

#[tokio::test]
async fn test_crud_over_http() {
    let server = TestServer::start(None).await;
    let service = server.service("alice");

    let a = service.create("Install Python").await.unwrap();
    let b = service.create("Learn basic syntax").await.unwrap();
    assert_eq!(a.owner_id, "alice");

    let listed = service.list().await.unwrap();
    assert_eq!(ids(&listed), vec![a.id.clone(), b.id.clone()]);

    let updated = service.set_completed(&a.id, true).await.unwrap();
    assert!(updated.completed);

    service.delete(&a.id).await.unwrap();
    assert_eq!(ids(&service.list().await.unwrap()), vec![b.id.clone()]);
}

#[tokio::test]
async fn test_missing_owner_is_unauthorized() {
    let server = TestServer::start(None).await;

    let response = reqwest::get(format!("{}/tasks", server.base_url)).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    let blank = server.service("");
    assert_eq!(blank.list().await, Err(ServiceError::Auth));
}

#[tokio::test]
async fn test_foreign_task_is_not_found() {
    let server = TestServer::start(None).await;
    let alice = server.service("alice");
    let bob = server.service("bob");

    let task = alice.create("Private").await.unwrap();

    assert!(bob.list().await.unwrap().is_empty());
    assert!(matches!(bob.set_completed(&task.id, true).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(bob.delete(&task.id).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(bob.reorder(&task.id, 0).await, Err(ServiceError::NotFound(_))));

    assert!(!alice.list().await.unwrap()[0].completed);
}

#[tokio::test]
async fn test_invalid_content_is_bad_request() {
    let server = TestServer::start(None).await;
    let service = server.service("alice");

    let result = service.create("").await;
    assert!(matches!(result, Err(ServiceError::Validation(msg)) if msg.contains("empty")));
}

#[tokio::test]
async fn test_reorder_over_http() {
    let server = TestServer::start(None).await;
    let service = server.service("alice");
    for content in ["A", "B", "C"] {
        service.create(content).await.unwrap();
    }

    let mut client = TaskClient::new(service.clone(), ClientConfig::default());
    client.load().await.unwrap();
    let c_id = client.tasks()[2].id.clone();

    assert_eq!(client.reorder(&c_id, 0).await.unwrap(), ReorderOutcome::Confirmed);

    let server_view = service.list().await.unwrap();
    let contents: Vec<_> = server_view.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, vec!["C", "A", "B"]);
    let orders: Vec<_> = server_view.iter().map(|t| t.order).collect();
    assert_eq!(orders, vec![Some(0), Some(1), Some(2)]);
    assert_eq!(ids(&server_view), ids(client.tasks()));
}

#[tokio::test]
async fn test_reorder_of_deleted_task_recovers() {
    let server = TestServer::start(None).await;
    let service = server.service("alice");
    for content in ["A", "B", "C"] {
        service.create(content).await.unwrap();
    }

    let mut client = TaskClient::new(service.clone(), ClientConfig::default());
    client.load().await.unwrap();
    let a_id = client.tasks()[0].id.clone();

    // Deleted behind the client's back
    service.delete(&a_id).await.unwrap();

    let result = client.reorder(&a_id, 2).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
    assert_eq!(client.tasks(), service.list().await.unwrap().as_slice());
}

#[tokio::test]
async fn test_generate_over_http() {
    let server = TestServer::start(Some(
        "  Install Python\n\nLearn basic syntax  \nWrite a script\nRead docs\nBuild a project\nShare it\n",
    ))
    .await;
    let service = server.service("alice");

    let tasks = service.generate("Learn Python").await.unwrap();
    assert!(tasks.len() <= 5);
    assert!(tasks.iter().all(|t| !t.is_empty() && t.trim() == t));
    assert_eq!(tasks[0], "Install Python");
}

#[tokio::test]
async fn test_generate_errors() {
    let server = TestServer::start(None).await;
    let client = reqwest::Client::new();

    let missing = client
        .post(format!("{}/generate", server.base_url))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = missing.json().await.unwrap();
    assert_eq!(body["error"], "Topic is required");

    let upstream = client
        .post(format!("{}/generate", server.base_url))
        .header(OWNER_HEADER, "alice")
        .json(&serde_json::json!({ "topic": "Rust" }))
        .send()
        .await
        .unwrap();
    assert_eq!(upstream.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = upstream.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("API Error"));
}

#[tokio::test]
async fn test_malformed_bodies_are_json_bad_requests() {
    let server = TestServer::start(Some("Install Python")).await;
    let client = reqwest::Client::new();

    let missing_content = client
        .post(format!("{}/tasks", server.base_url))
        .header(OWNER_HEADER, "alice")
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_content.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = missing_content.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("content"));

    let not_json = client
        .post(format!("{}/generate", server.base_url))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(not_json.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = not_json.json().await.unwrap();
    assert!(body["error"].is_string());

    let bad_reorder = client
        .post(format!("{}/tasks/reorder", server.base_url))
        .header(OWNER_HEADER, "alice")
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{\"taskId\": 7}")
        .send()
        .await
        .unwrap();
    assert_eq!(bad_reorder.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = bad_reorder.json().await.unwrap();
    assert!(body["error"].is_string());

    assert!(server.service("alice").list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_topic_rejected_before_generation() {
    let server = TestServer::start(Some("Install Python")).await;

    let result = server.service("alice").generate("   ").await;
    assert_eq!(result, Err(ServiceError::Validation("Topic is required".to_string())));
}

#[tokio::test]
async fn test_delete_returns_no_content() {
    let server = TestServer::start(None).await;
    let service = server.service("alice");
    let task = service.create("A").await.unwrap();

    let response = reqwest::Client::new()
        .delete(format!("{}/tasks/{}", server.base_url, task.id))
        .header(OWNER_HEADER, "alice")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);
}
