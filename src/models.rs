//! Core data types for the inquiry-matching workflow.
//!
//! Wire field names follow the backend contract (`match`, `project_name`,
//! `top_matches`, `request_id`); the Rust-side names describe the domain.

use serde::{Deserialize, Serialize};

/// Where a dataset's items came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Rows ingested from a tabular upload.
    Tabular,
    /// Discrete items parsed out of an uploaded document.
    Document,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Tabular => "tabular",
            SourceKind::Document => "document",
        }
    }
}

/// A named, server-held collection of searchable items.
///
/// Names are case-sensitive identifiers. Tabular listings carry no item
/// counts, so `item_count` is 0 for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub name: String,
    pub item_count: u64,
    pub source_kind: SourceKind,
    /// True for datasets auto-created to serve a single one-shot query.
    pub ephemeral: bool,
}

/// A validated inquiry, ready for submission.
#[derive(Debug, Clone)]
pub struct Query {
    pub text: String,
    /// Non-empty; order irrelevant to the backend.
    pub dataset_names: Vec<String>,
    /// Opaque identifier sent as `user_id`.
    pub issuer_id: String,
}

/// One ranked result for a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    #[serde(default)]
    pub id: Option<String>,
    /// Similarity in [0, 1]; absent when the backend could not score.
    #[serde(rename = "match", default)]
    pub score: Option<f64>,
    /// Ordered key/value pairs; backend order is preserved end to end.
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "project_name", default)]
    pub dataset_name: String,
}

impl Match {
    /// Metadata pairs in backend order; empty when the backend sent none.
    pub fn metadata_pairs(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.metadata.iter().flat_map(|map| map.iter())
    }
}

/// Raw body shared by the compare and status endpoints.
///
/// Every field is optional on the wire; [`crate::submit::classify_response`]
/// is the single place that decides what the shape means.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareResponse {
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub top_matches: Option<Vec<Match>>,
}

/// How the backend acknowledged a submission: already resolved, or a job
/// that must be polled. Resolved once at the boundary, never re-inspected
/// downstream.
#[derive(Debug, Clone)]
pub enum RequestEnvelope {
    Immediate {
        summary: Option<String>,
        matches: Vec<Match>,
    },
    Pending {
        job_id: String,
    },
}

/// Snapshot of an asynchronous comparison job.
#[derive(Debug, Clone)]
pub struct JobStatus {
    pub summary: Option<String>,
    pub matches: Vec<Match>,
}

impl JobStatus {
    /// A job is terminal once it carries a non-empty match collection.
    /// There is no explicit failure status in the contract.
    pub fn is_terminal(&self) -> bool {
        !self.matches.is_empty()
    }
}

impl From<CompareResponse> for JobStatus {
    fn from(resp: CompareResponse) -> Self {
        JobStatus {
            summary: resp.summary,
            matches: resp.top_matches.unwrap_or_default(),
        }
    }
}

/// Final result of a completed submission, whichever branch produced it.
/// Replaced wholesale on the next submission; never merged incrementally.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub summary: Option<String>,
    pub matches: Vec<Match>,
    /// True when the result arrived through the asynchronous branch.
    pub polled: bool,
}

/// Outcome of a create-dataset call, including the post-create refresh.
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub dataset: Dataset,
    /// True when the name collided with an existing dataset and the backend
    /// appended instead of erroring.
    pub merged: bool,
    /// Fresh listing taken after the mutation, so selection stays consistent.
    pub datasets: Vec<Dataset>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_deserializes_backend_field_names() {
        let m: Match = serde_json::from_value(serde_json::json!({
            "id": "a1b2",
            "match": 0.91,
            "metadata": {"summary": "duplicate refund", "created_date": "2023-04-01"},
            "content": "customer asked about refunds",
            "project_name": "support_2023"
        }))
        .unwrap();
        assert_eq!(m.id.as_deref(), Some("a1b2"));
        assert_eq!(m.score, Some(0.91));
        assert_eq!(m.dataset_name, "support_2023");
        let keys: Vec<&str> = m.metadata_pairs().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["summary", "created_date"]);
    }

    #[test]
    fn match_tolerates_null_fields() {
        let m: Match = serde_json::from_value(serde_json::json!({
            "id": null,
            "match": null,
            "metadata": null,
            "content": "text",
            "project_name": "p"
        }))
        .unwrap();
        assert!(m.id.is_none());
        assert!(m.score.is_none());
        assert_eq!(m.metadata_pairs().count(), 0);
    }

    #[test]
    fn metadata_order_is_preserved() {
        let m: Match = serde_json::from_str(
            r#"{"match": 0.5, "metadata": {"zeta": "1", "alpha": "2", "mid": "3"}}"#,
        )
        .unwrap();
        let keys: Vec<&str> = m.metadata_pairs().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn job_status_terminal_only_with_matches() {
        let pending = JobStatus {
            summary: None,
            matches: vec![],
        };
        assert!(!pending.is_terminal());

        let done = JobStatus {
            summary: Some("found one".to_string()),
            matches: vec![serde_json::from_value(serde_json::json!({"match": 0.4})).unwrap()],
        };
        assert!(done.is_terminal());
    }
}
