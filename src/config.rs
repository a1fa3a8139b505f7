use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend, e.g. `http://localhost:8000`.
    pub base_url: String,
    #[serde(default = "default_compare_path")]
    pub compare_path: String,
    #[serde(default = "default_authoring_path")]
    pub authoring_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Key for the admin-only log-clearing endpoint.
    #[serde(default)]
    pub admin_key: Option<String>,
}

fn default_compare_path() -> String {
    "/api/similarity-matcher".to_string()
}
fn default_authoring_path() -> String {
    "/api/teacher-assistant".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingConfig {
    /// Fixed delay between status fetches, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Maximum number of status fetches before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1500,
            max_attempts: 40,
        }
    }
}

fn default_interval_ms() -> u64 {
    1500
}
fn default_max_attempts() -> u32 {
    40
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubmissionConfig {
    /// Opaque identifier sent as `user_id` with every compare call.
    #[serde(default = "default_issuer_id")]
    pub issuer_id: String,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            issuer_id: default_issuer_id(),
        }
    }
}

fn default_issuer_id() -> String {
    "anonymous".to_string()
}

impl Config {
    /// A config pointing at a local backend with all defaults. Used by
    /// commands that can run without a config file (health, metrics).
    pub fn minimal() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://localhost:8000".to_string(),
                compare_path: default_compare_path(),
                authoring_path: default_authoring_path(),
                timeout_secs: default_timeout_secs(),
                admin_key: None,
            },
            polling: PollingConfig::default(),
            submission: SubmissionConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate backend
    if config.backend.base_url.trim().is_empty() {
        anyhow::bail!("backend.base_url must not be empty");
    }
    if !config.backend.base_url.starts_with("http://") && !config.backend.base_url.starts_with("https://")
    {
        anyhow::bail!(
            "backend.base_url must start with http:// or https://, got '{}'",
            config.backend.base_url
        );
    }
    if config.backend.timeout_secs == 0 {
        anyhow::bail!("backend.timeout_secs must be > 0");
    }

    // Validate polling
    if config.polling.interval_ms == 0 {
        anyhow::bail!("polling.interval_ms must be > 0");
    }
    if config.polling.max_attempts == 0 {
        anyhow::bail!("polling.max_attempts must be >= 1");
    }

    Ok(config)
}
