//! HTTP access to the matching backend.
//!
//! One [`ApiClient`] is shared by every component. It owns the base URL, the
//! per-tool path prefixes, a single reqwest client with the configured
//! timeout, and the error contract: a non-2xx response is parsed for a JSON
//! `error` field, which becomes the failure message, with `"Server error"`
//! as the fallback.

use std::time::Duration;

use reqwest::multipart;

use crate::config::Config;
use crate::error::{Error, Result};

/// Which tool prefix a path hangs off.
///
/// The backend groups its endpoints under two prefixes: the compare tool
/// (queries, tabular datasets, monitoring) and the authoring tool (document
/// datasets, deletion, test generation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Compare,
    Authoring,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    compare_path: String,
    authoring_path: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.backend.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.backend.base_url.trim_end_matches('/').to_string(),
            compare_path: config.backend.compare_path.clone(),
            authoring_path: config.backend.authoring_path.clone(),
        })
    }

    /// Absolute URL for a path under the given tool prefix.
    pub fn url(&self, tool: Tool, path: &str) -> String {
        let prefix = match tool {
            Tool::Compare => &self.compare_path,
            Tool::Authoring => &self.authoring_path,
        };
        format!("{}{}{}", self.base_url, prefix, path)
    }

    pub async fn get_json(&self, tool: Tool, path: &str) -> Result<serde_json::Value> {
        let resp = self.http.get(self.url(tool, path)).send().await?;
        Self::into_json(resp).await
    }

    pub async fn post_multipart(
        &self,
        tool: Tool,
        path: &str,
        form: multipart::Form,
    ) -> Result<serde_json::Value> {
        let resp = self
            .http
            .post(self.url(tool, path))
            .multipart(form)
            .send()
            .await?;
        Self::into_json(resp).await
    }

    pub async fn post_json(
        &self,
        tool: Tool,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let resp = self
            .http
            .post(self.url(tool, path))
            .json(body)
            .send()
            .await?;
        Self::into_json(resp).await
    }

    /// POST with an `Admin-Key` header and no body (log clearing).
    pub async fn post_admin(
        &self,
        tool: Tool,
        path: &str,
        admin_key: &str,
    ) -> Result<serde_json::Value> {
        let resp = self
            .http
            .post(self.url(tool, path))
            .header("Admin-Key", admin_key)
            .send()
            .await?;
        Self::into_json(resp).await
    }

    /// DELETE a named resource, percent-encoding the name as a path segment.
    pub async fn delete_by_name(
        &self,
        tool: Tool,
        path: &str,
        name: &str,
    ) -> Result<serde_json::Value> {
        let mut url = reqwest::Url::parse(&self.url(tool, path))
            .map_err(|e| Error::Network(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| Error::Network("base URL cannot carry path segments".to_string()))?
            .push(name);

        let resp = self.http.delete(url).send().await?;
        Self::into_json(resp).await
    }

    /// Apply the error contract, then deserialize the body.
    async fn into_json(resp: reqwest::Response) -> Result<serde_json::Value> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or_else(|| "Server error".to_string());
            return Err(Error::Network(message));
        }
        Ok(resp.json().await?)
    }
}
