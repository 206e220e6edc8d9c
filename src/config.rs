//! Configuration for the task server and client.
//!
//! The server reads environment variables:
//! - `TASKGENIUS_HOST` - Optional. Bind host. Defaults to `127.0.0.1`.
//! - `TASKGENIUS_PORT` - Optional. Bind port. Defaults to `3000`.
//! - `TASKGENIUS_DB` - Optional. SQLite database path. Defaults to the
//!   platform data directory (`.../taskgenius/tasks.db`).
//! - `GEMINI_API_KEY` - Optional. Without it `/generate` always fails upstream.
//! - `GEMINI_MODEL` - Optional. Defaults to `gemini-1.5-flash`.
//! - `GEMINI_MAX_OUTPUT_TOKENS` - Optional. Defaults to `200`.

use eyre::{Context, Result};
use std::path::PathBuf;

/// Default bind host.
const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bind port.
const DEFAULT_PORT: u16 = 3000;

/// Default generation model.
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default output token budget for one generation.
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 200;

/// Directory name under the platform data directory.
const APP_DIR: &str = "taskgenius";

/// Application data directory (`~/.local/share/taskgenius` on Linux).
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Default SQLite database path.
pub fn default_db_path() -> PathBuf {
    data_dir().join("tasks.db")
}

/// Settings for the generation model.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub max_output_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl GeneratorConfig {
    pub fn from_env() -> Result<Self> {
        let max_output_tokens = match std::env::var("GEMINI_MAX_OUTPUT_TOKENS") {
            Ok(v) => v.parse().context("Invalid value for GEMINI_MAX_OUTPUT_TOKENS")?,
            Err(_) => DEFAULT_MAX_OUTPUT_TOKENS,
        };

        Ok(Self {
            api_key: std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            max_output_tokens,
        })
    }
}

/// Configuration for `tg serve`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub generator: GeneratorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_path: default_db_path(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("TASKGENIUS_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());

        let port = match std::env::var("TASKGENIUS_PORT") {
            Ok(v) => v.parse().context("Invalid value for TASKGENIUS_PORT")?,
            Err(_) => DEFAULT_PORT,
        };

        let db_path = std::env::var("TASKGENIUS_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_db_path());

        Ok(Self {
            host,
            port,
            db_path,
            generator: GeneratorConfig::from_env()?,
        })
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// How the client resynchronises after a successful toggle or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// Re-fetch the whole list.
    #[default]
    Reload,
    /// Apply the returned record (or the removal) locally.
    ApplyReturned,
}

/// Owner used when none is given.
pub const DEFAULT_OWNER: &str = "local";

/// Configuration for a [`crate::TaskClient`] and the service behind it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of a remote task service; `None` uses the local store.
    pub base_url: Option<String>,
    /// Owner the client acts on behalf of.
    pub owner_id: String,
    pub sync: SyncPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            owner_id: DEFAULT_OWNER.to_string(),
            sync: SyncPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = owner_id.into();
        self
    }

    pub fn with_sync(mut self, sync: SyncPolicy) -> Self {
        self.sync = sync;
        self
    }
}
