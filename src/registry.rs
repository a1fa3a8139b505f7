//! Dataset lifecycle: list, create from uploads, delete.
//!
//! The registry keeps no local cache: every successful create or delete is
//! followed by a fresh listing so selection stays consistent with the
//! backend. Creating a dataset whose name already exists is a **merge**, not
//! an error — the collision is detected against the pre-create listing and
//! surfaced as an advisory.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Context;
use reqwest::multipart;

use crate::client::{ApiClient, Tool};
use crate::config::Config;
use crate::error::{Advisory, Result};
use crate::models::{CreateReport, Dataset, SourceKind};

pub struct DatasetRegistry<'a> {
    client: &'a ApiClient,
}

impl<'a> DatasetRegistry<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// List every dataset the backend knows about.
    ///
    /// Tabular listings carry names only; document listings also carry item
    /// counts and override the tabular entry for the same name. An empty
    /// collection is a valid answer.
    pub async fn list(&self) -> Result<Vec<Dataset>> {
        let tabular = self.client.get_json(Tool::Compare, "/getProjects").await?;
        let mut datasets: Vec<Dataset> = tabular
            .get("projects")
            .and_then(|p| p.as_array())
            .map(|names| {
                names
                    .iter()
                    .filter_map(|n| n.as_str())
                    .map(|name| Dataset {
                        name: name.to_string(),
                        item_count: 0,
                        source_kind: SourceKind::Tabular,
                        ephemeral: false,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let documents = self
            .client
            .get_json(Tool::Authoring, "/get-teacher-projects")
            .await?;
        if let Some(entries) = documents.get("projects").and_then(|p| p.as_array()) {
            for entry in entries {
                let name = match entry.get("name").and_then(|n| n.as_str()) {
                    Some(n) => n,
                    None => continue,
                };
                let count = entry
                    .get("problems_count")
                    .and_then(|c| c.as_u64())
                    .unwrap_or(0);
                match datasets.iter_mut().find(|d| d.name == name) {
                    Some(existing) => {
                        existing.source_kind = SourceKind::Document;
                        existing.item_count = count;
                    }
                    None => datasets.push(Dataset {
                        name: name.to_string(),
                        item_count: count,
                        source_kind: SourceKind::Document,
                        ephemeral: false,
                    }),
                }
            }
        }

        Ok(datasets)
    }

    /// Create (or merge into) a dataset from a tabular upload.
    pub async fn create_from_tabular(
        &self,
        name: &str,
        file_name: &str,
        bytes: Vec<u8>,
        ephemeral: bool,
    ) -> Result<CreateReport> {
        let merged = self.name_exists(name).await?;

        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new()
            .part("csv_file", part)
            .text("project_name", name.to_string());
        let body = self
            .client
            .post_multipart(Tool::Compare, "/createProject", form)
            .await?;

        let added = body
            .get("added_documents")
            .and_then(|n| n.as_u64())
            .unwrap_or(0);

        self.report(name, added, SourceKind::Tabular, ephemeral, merged)
            .await
    }

    /// Create (or merge into) a dataset from a document upload. The backend
    /// parses the document into discrete items and reports how many.
    pub async fn create_from_document(
        &self,
        name: &str,
        file_name: &str,
        bytes: Vec<u8>,
        ephemeral: bool,
    ) -> Result<CreateReport> {
        let merged = self.name_exists(name).await?;

        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new()
            .part("pdf_file", part)
            .text("project_name", name.to_string());
        let body = self
            .client
            .post_multipart(Tool::Authoring, "/create-project-from-pdf", form)
            .await?;

        let count = body
            .get("problems_count")
            .and_then(|n| n.as_u64())
            .unwrap_or(0);

        self.report(name, count, SourceKind::Document, ephemeral, merged)
            .await
    }

    /// Delete a dataset by name. Destructive and irreversible — callers must
    /// confirm with the user before invoking. Unknown names fail with the
    /// backend's error message verbatim.
    pub async fn delete(&self, name: &str) -> Result<Vec<Dataset>> {
        self.client
            .delete_by_name(Tool::Authoring, "/delete-project", name)
            .await?;
        self.list().await
    }

    async fn name_exists(&self, name: &str) -> Result<bool> {
        Ok(self.list().await?.iter().any(|d| d.name == name))
    }

    async fn report(
        &self,
        name: &str,
        item_count: u64,
        source_kind: SourceKind,
        ephemeral: bool,
        merged: bool,
    ) -> Result<CreateReport> {
        // Refresh after the mutation so selection stays consistent.
        let datasets = self.list().await?;
        Ok(CreateReport {
            dataset: Dataset {
                name: name.to_string(),
                item_count,
                source_kind,
                ephemeral,
            },
            merged,
            datasets,
        })
    }
}

// ============ CLI entry points ============

pub async fn run_list(config: &Config) -> anyhow::Result<()> {
    let client = ApiClient::new(config)?;
    let registry = DatasetRegistry::new(&client);
    let datasets = registry.list().await?;

    if datasets.is_empty() {
        println!("No datasets.");
        return Ok(());
    }

    println!("{:<28} {:<10} {:>8}", "NAME", "KIND", "ITEMS");
    for d in &datasets {
        let items = match d.source_kind {
            SourceKind::Tabular => "-".to_string(),
            SourceKind::Document => d.item_count.to_string(),
        };
        println!("{:<28} {:<10} {:>8}", d.name, d.source_kind.as_str(), items);
    }

    Ok(())
}

pub async fn run_create(
    config: &Config,
    name: &str,
    csv: Option<&Path>,
    pdf: Option<&Path>,
) -> anyhow::Result<()> {
    let (path, kind) = match (csv, pdf) {
        (Some(path), None) => (path, SourceKind::Tabular),
        (None, Some(path)) => (path, SourceKind::Document),
        _ => anyhow::bail!("provide exactly one of --csv or --pdf"),
    };

    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read upload file: {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());

    let client = ApiClient::new(config)?;
    let registry = DatasetRegistry::new(&client);
    let report = match kind {
        SourceKind::Tabular => {
            registry
                .create_from_tabular(name, &file_name, bytes, false)
                .await?
        }
        SourceKind::Document => {
            registry
                .create_from_document(name, &file_name, bytes, false)
                .await?
        }
    };

    if report.merged {
        eprintln!(
            "note: {}",
            Advisory::MergedIntoExisting {
                name: name.to_string()
            }
        );
    }

    println!(
        "Created dataset '{}' ({}, {} item(s) added).",
        report.dataset.name,
        report.dataset.source_kind.as_str(),
        report.dataset.item_count
    );
    println!("Datasets now available: {}", report.datasets.len());

    Ok(())
}

pub async fn run_delete(config: &Config, name: &str, yes: bool) -> anyhow::Result<()> {
    if !yes && !confirm_delete(name)? {
        println!("Aborted.");
        return Ok(());
    }

    let client = ApiClient::new(config)?;
    let registry = DatasetRegistry::new(&client);
    let datasets = registry.delete(name).await?;

    println!("Deleted dataset '{}'.", name);
    println!("Datasets remaining: {}", datasets.len());

    Ok(())
}

/// Deletion is irreversible; ask before acting unless `--yes` was given.
fn confirm_delete(name: &str) -> anyhow::Result<bool> {
    print!("Delete dataset '{}'? This cannot be undone. [y/N] ", name);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
