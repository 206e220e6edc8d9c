//! Learning-task generation through an LLM.

use crate::service::ServiceError;
use crate::types::validate_topic;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Maximum number of suggestions kept from one generation.
pub const MAX_GENERATED_TASKS: usize = 5;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Message returned to callers when the upstream model call fails.
const UPSTREAM_FAILURE: &str = "API Error - Check your API key and billing";

/// Maps a topic to at most [`MAX_GENERATED_TASKS`] short task descriptions.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, topic: &str) -> Result<Vec<String>, ServiceError>;
}

/// Build the prompt sent to the model.
pub fn prompt_for(topic: &str) -> String {
    format!(
        "Generate exactly {} concise tasks to learn about {}.\n\
         Return ONLY the tasks separated by newlines, NO numbering, NO extra text.\n\
         Example response:\n\
         Install Python\n\
         Learn basic syntax\n\
         Practice with exercises",
        MAX_GENERATED_TASKS,
        topic.trim()
    )
}

/// Turn raw model output into task suggestions: one per line, trimmed, empty
/// lines dropped, at most [`MAX_GENERATED_TASKS`].
pub fn clean_generated(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_GENERATED_TASKS)
        .map(String::from)
        .collect()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

impl GeminiResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| c.content.parts.iter().map(|p| p.text.as_str()).collect::<String>())
            .unwrap_or_default()
    }
}

/// Generator backed by the Google Generative Language API.
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model: String,
    max_output_tokens: u32,
}

impl GeminiGenerator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, max_output_tokens: u32) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            max_output_tokens,
        }
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, topic: &str) -> Result<Vec<String>, ServiceError> {
        validate_topic(topic).map_err(|e| ServiceError::Validation(e.to_string()))?;

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt_for(topic) }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
            },
        };

        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                log::error!("[GEMINI_API_ERROR] request failed: {}", e);
                ServiceError::Transport(UPSTREAM_FAILURE.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("[GEMINI_API_ERROR] status {}: {}", status, body);
            return Err(ServiceError::Transport(UPSTREAM_FAILURE.to_string()));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            log::error!("[GEMINI_API_ERROR] undecodable response: {}", e);
            ServiceError::Transport(UPSTREAM_FAILURE.to_string())
        })?;

        let tasks = clean_generated(&parsed.text());
        log::info!("Generated {} tasks for topic '{}'", tasks.len(), topic.trim());
        Ok(tasks)
    }
}

/// Generator used when no model is configured; every call fails upstream.
pub struct UnconfiguredGenerator;

#[async_trait]
impl Generator for UnconfiguredGenerator {
    async fn generate(&self, topic: &str) -> Result<Vec<String>, ServiceError> {
        validate_topic(topic).map_err(|e| ServiceError::Validation(e.to_string()))?;
        log::error!("[GEMINI_API_ERROR] GEMINI_API_KEY is not set");
        Err(ServiceError::Transport(UPSTREAM_FAILURE.to_string()))
    }
}
