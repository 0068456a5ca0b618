use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::cli::output::{print_json, OutputOptions};
use crate::core::config::{AppConfig, ConfigError};

/// Pick the config source for a local run: an explicit file, the default
/// file when it exists, or the environment alone.
pub fn resolve(explicit: Option<&Path>) -> (Option<PathBuf>, Result<AppConfig, ConfigError>) {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(AppConfig::config_path()).filter(|p| p.exists()),
    };
    let config = match &path {
        Some(path) => AppConfig::load_file(path),
        None => AppConfig::from_env(),
    };
    (path, config)
}

fn source_label(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "environment".to_string(),
    }
}

pub fn check(explicit: Option<&Path>) -> Result<()> {
    let (path, config) = resolve(explicit);
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let issues = config.validate();
    if issues.is_empty() {
        println!("{} {}", "Config is valid:".green().bold(), source_label(&path));
        println!("  Notification channel: {:?}", config.notification.channel);
        if config.notification.enable_slack {
            println!(
                "  Slack mirror: {}",
                config.notification.slack_webhook_parameter
            );
        }
        if let Some(table) = &config.report.idempotency_table {
            println!("  Idempotency table: {}", table);
        }
    } else {
        eprintln!("{} {}:", "Config issues found in".red().bold(), source_label(&path));
        for issue in &issues {
            eprintln!("  {} {}", "-".red(), issue);
        }
        std::process::exit(1);
    }
    Ok(())
}

/// Print the effective config after file and environment overrides.
pub fn show(explicit: Option<&Path>, opts: &OutputOptions) -> Result<()> {
    let (_, config) = resolve(explicit);
    print_json(&config?, opts)
}
