//! Test-case generation against the authoring tool.
//!
//! Unlike compare, this endpoint takes a JSON body and always answers
//! synchronously with the generated text.

use crate::client::{ApiClient, Tool};
use crate::config::Config;
use crate::error::{Error, Result};

/// Response of a generation request.
#[derive(Debug, Clone)]
pub struct GeneratedTests {
    pub response: String,
    pub dataset_name: String,
}

pub async fn generate(client: &ApiClient, prompt: &str, dataset: &str) -> Result<GeneratedTests> {
    if prompt.trim().is_empty() {
        return Err(Error::Validation("please provide a prompt".to_string()));
    }

    let body = serde_json::json!({
        "prompt": prompt,
        "project_name": dataset,
    });
    let value = client
        .post_json(Tool::Authoring, "/testcases/generate", &body)
        .await?;

    let response = match value.get("response").and_then(|r| r.as_str()) {
        Some(r) => r.to_string(),
        None => return Err(Error::UnexpectedResponseShape),
    };
    let dataset_name = value
        .get("project_name")
        .and_then(|p| p.as_str())
        .unwrap_or(dataset)
        .to_string();

    Ok(GeneratedTests {
        response,
        dataset_name,
    })
}

// ============ CLI entry point ============

pub async fn run_generate(config: &Config, prompt: &str, dataset: &str) -> anyhow::Result<()> {
    let client = ApiClient::new(config)?;
    match generate(&client, prompt, dataset).await {
        Ok(generated) => {
            println!("--- Generated Tests ({}) ---", generated.dataset_name);
            println!("{}", generated.response);
            Ok(())
        }
        Err(Error::Validation(message)) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}
