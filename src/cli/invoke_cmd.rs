use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::cli::config_cmd;
use crate::cli::output::{print_json, OutputOptions};
use crate::core::aws::load_sdk_config;
use crate::handlers::{run_handler, HandlerKind};

pub struct InvokeArgs {
    pub handler: HandlerKind,
    pub period: Option<String>,
    pub event: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

fn build_payload(period: Option<&str>, event: Option<&Path>) -> Result<serde_json::Value> {
    let mut payload = match event {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read event file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Event file {} is not valid JSON", path.display()))?
        }
        None => serde_json::json!({}),
    };
    if let Some(period) = period {
        match payload.as_object_mut() {
            Some(object) => {
                object.insert("time_period".to_string(), period.into());
            }
            None => anyhow::bail!("--period needs the event to be a JSON object"),
        }
    }
    Ok(payload)
}

/// Run one handler locally and print its response. Exits 1 on a failure status.
pub async fn run(args: InvokeArgs, opts: &OutputOptions) -> Result<()> {
    let payload = build_payload(args.period.as_deref(), args.event.as_deref())?;
    let (path, config) = config_cmd::resolve(args.config.as_deref());
    if let Some(path) = &path {
        tracing::debug!(path = %path.display(), "Loaded config file");
    }

    let sdk = load_sdk_config().await;
    let today = chrono::Utc::now().date_naive();
    let response = run_handler(args.handler, &sdk, config, payload, today).await;

    print_json(&response, opts)?;
    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
