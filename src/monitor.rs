//! Backend health, metrics, and admin operations.

use crate::client::{ApiClient, Tool};
use crate::config::Config;

pub async fn run_health(config: &Config) -> anyhow::Result<()> {
    let client = ApiClient::new(config)?;
    let body = client.get_json(Tool::Compare, "/health").await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

pub async fn run_metrics(config: &Config) -> anyhow::Result<()> {
    let client = ApiClient::new(config)?;
    let body = client.get_json(Tool::Compare, "/metrics").await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

/// Clear the backend's log files. The admin key comes from the flag when
/// given, otherwise from `backend.admin_key` in the config.
pub async fn run_clear_logs(config: &Config, admin_key: Option<String>) -> anyhow::Result<()> {
    let key = match admin_key.or_else(|| config.backend.admin_key.clone()) {
        Some(key) => key,
        None => anyhow::bail!("no admin key: pass --admin-key or set backend.admin_key"),
    };

    let client = ApiClient::new(config)?;
    client
        .post_admin(Tool::Compare, "/admin/logs/clear", &key)
        .await?;
    println!("Logs cleared.");
    Ok(())
}
