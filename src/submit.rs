//! Query submission and dual-mode response resolution.
//!
//! The compare endpoint answers in one of two shapes: the full result set
//! right away, or a job id that must be polled. [`classify_response`] is the
//! single place that decides which shape arrived; downstream code only ever
//! sees the resolved [`RequestEnvelope`].

use reqwest::multipart;

use crate::client::{ApiClient, Tool};
use crate::error::{Error, Result};
use crate::models::{CompareResponse, Query, RequestEnvelope};

pub struct QuerySubmitter<'a> {
    client: &'a ApiClient,
}

impl<'a> QuerySubmitter<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Send the query plus the full dataset-name set as one multipart
    /// request and resolve the response shape.
    pub async fn submit(&self, query: &Query) -> Result<RequestEnvelope> {
        let mut form = multipart::Form::new()
            .text("query", query.text.clone())
            .text("user_id", query.issuer_id.clone());
        for name in &query.dataset_names {
            form = form.text("project_name", name.clone());
        }

        let body = self
            .client
            .post_multipart(Tool::Compare, "/compare", form)
            .await?;
        let resp: CompareResponse =
            serde_json::from_value(body).map_err(|_| Error::UnexpectedResponseShape)?;
        classify_response(resp)
    }
}

/// Resolve the dual-shape compare body into its tagged form.
///
/// Order matters: a populated match collection wins over a job id, so a
/// backend that answers synchronously is never polled.
pub fn classify_response(resp: CompareResponse) -> Result<RequestEnvelope> {
    if let Some(matches) = resp.top_matches.filter(|m| !m.is_empty()) {
        return Ok(RequestEnvelope::Immediate {
            summary: resp.summary,
            matches,
        });
    }
    if let Some(job_id) = resp.request_id.filter(|id| !id.is_empty()) {
        return Ok(RequestEnvelope::Pending { job_id });
    }
    Err(Error::UnexpectedResponseShape)
}
