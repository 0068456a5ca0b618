use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

use crate::core::period::ReportingPeriod;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
    #[error("{0} must be set")]
    Missing(&'static str),
}

pub const DEFAULT_SLACK_WEBHOOK_PARAMETER: &str = "/billing_report/slack_webhook_url";

/// Primary notification channel for cost reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    #[default]
    Sns,
    Ses,
}

impl ChannelKind {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_lowercase().as_str() {
            "sns" => Some(Self::Sns),
            "ses" | "email" => Some(Self::Ses),
            _ => None,
        }
    }
}

/// Ordering of the per-category breakdown in rendered reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryOrder {
    #[default]
    Discovery,
    Alphabetical,
}

impl CategoryOrder {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_lowercase().as_str() {
            "discovery" => Some(Self::Discovery),
            "alphabetical" | "alpha" => Some(Self::Alphabetical),
            _ => None,
        }
    }
}

fn default_threshold() -> Decimal {
    Decimal::new(1, 2)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_threshold")]
    pub daily: Decimal,
    #[serde(default = "default_threshold")]
    pub weekly: Decimal,
    #[serde(default = "default_threshold")]
    pub monthly: Decimal,
    #[serde(default = "default_threshold")]
    pub yearly: Decimal,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            daily: default_threshold(),
            weekly: default_threshold(),
            monthly: default_threshold(),
            yearly: default_threshold(),
        }
    }
}

impl Thresholds {
    pub fn for_period(&self, period: ReportingPeriod) -> Decimal {
        match period {
            ReportingPeriod::Daily => self.daily,
            ReportingPeriod::Weekly => self.weekly,
            ReportingPeriod::Monthly => self.monthly,
            ReportingPeriod::Yearly => self.yearly,
        }
    }

    fn slot_mut(&mut self, period: ReportingPeriod) -> &mut Decimal {
        match period {
            ReportingPeriod::Daily => &mut self.daily,
            ReportingPeriod::Weekly => &mut self.weekly,
            ReportingPeriod::Monthly => &mut self.monthly,
            ReportingPeriod::Yearly => &mut self.yearly,
        }
    }
}

fn default_slack_parameter() -> String {
    DEFAULT_SLACK_WEBHOOK_PARAMETER.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub channel: ChannelKind,
    pub sns_topic_arn: Option<String>,
    pub ses_sender: Option<String>,
    #[serde(default)]
    pub ses_recipients: Vec<String>,
    #[serde(default)]
    pub enable_slack: bool,
    #[serde(default = "default_slack_parameter")]
    pub slack_webhook_parameter: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            channel: ChannelKind::default(),
            sns_topic_arn: None,
            ses_sender: None,
            ses_recipients: Vec::new(),
            enable_slack: false,
            slack_webhook_parameter: default_slack_parameter(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSettings {
    #[serde(default)]
    pub category_order: CategoryOrder,
    #[serde(default)]
    pub include_account_id: bool,
    /// DynamoDB table holding the last processed window end per period.
    pub idempotency_table: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceSettings {
    pub distribution_id: Option<String>,
    pub container_service_name: Option<String>,
}

/// Settings for one invocation. Built fresh per invocation and passed down.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub notification: NotificationSettings,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub resources: ResourceSettings,
}

impl AppConfig {
    /// Default location of the local config file, respecting XDG_CONFIG_HOME.
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("billwatch").join("config.toml")
    }

    /// Build from the process environment on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup on top of the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Load a TOML file, then apply environment overrides on top of it.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overwrite settings for every key the lookup returns a value for.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for period in ReportingPeriod::all() {
            let key = threshold_key(*period);
            if let Some(raw) = lookup(key) {
                let value = Decimal::from_str(raw.trim())
                    .map_err(|_| ConfigError::InvalidValue { key, value: raw.clone() })?;
                *self.thresholds.slot_mut(*period) = value;
            }
        }

        if let Some(raw) = lookup("NOTIFICATION_CHANNEL") {
            self.notification.channel = ChannelKind::from_id(&raw).ok_or(
                ConfigError::InvalidValue {
                    key: "NOTIFICATION_CHANNEL",
                    value: raw,
                },
            )?;
        }
        if let Some(value) = non_empty(lookup("SNS_TOPIC_ARN")) {
            self.notification.sns_topic_arn = Some(value);
        }
        if let Some(value) = non_empty(lookup("SES_SENDER")) {
            self.notification.ses_sender = Some(value);
        }
        if let Some(raw) = lookup("SES_RECIPIENTS") {
            self.notification.ses_recipients = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(raw) = lookup("ENABLE_SLACK") {
            self.notification.enable_slack = parse_flag("ENABLE_SLACK", &raw);
        }
        if let Some(value) = non_empty(lookup("SLACK_WEBHOOK_PARAMETER")) {
            self.notification.slack_webhook_parameter = value;
        }

        if let Some(raw) = lookup("CATEGORY_ORDER") {
            self.report.category_order = CategoryOrder::from_id(&raw).ok_or(
                ConfigError::InvalidValue {
                    key: "CATEGORY_ORDER",
                    value: raw,
                },
            )?;
        }
        if let Some(raw) = lookup("INCLUDE_ACCOUNT_ID") {
            self.report.include_account_id = parse_flag("INCLUDE_ACCOUNT_ID", &raw);
        }
        if let Some(value) = non_empty(lookup("IDEMPOTENCY_TABLE")) {
            self.report.idempotency_table = Some(value);
        }

        if let Some(value) = non_empty(lookup("DISTRIBUTION_ID")) {
            self.resources.distribution_id = Some(value);
        }
        if let Some(value) = non_empty(lookup("CONTAINER_SERVICE_NAME")) {
            self.resources.container_service_name = Some(value);
        }
        Ok(())
    }

    pub fn sns_topic_arn(&self) -> Result<&str, ConfigError> {
        self.notification
            .sns_topic_arn
            .as_deref()
            .ok_or(ConfigError::Missing("SNS_TOPIC_ARN"))
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for period in ReportingPeriod::all() {
            if self.thresholds.for_period(*period).is_sign_negative() {
                issues.push(format!("{}: threshold must not be negative", threshold_key(*period)));
            }
        }
        match self.notification.channel {
            ChannelKind::Sns => {
                if self.notification.sns_topic_arn.is_none() {
                    issues.push("SNS_TOPIC_ARN must be set when NOTIFICATION_CHANNEL is sns".into());
                }
            }
            ChannelKind::Ses => {
                if self.notification.ses_sender.is_none() {
                    issues.push("SES_SENDER must be set when NOTIFICATION_CHANNEL is ses".into());
                }
                if self.notification.ses_recipients.is_empty() {
                    issues.push("SES_RECIPIENTS must list at least one address".into());
                }
            }
        }
        if self.notification.enable_slack && self.notification.slack_webhook_parameter.is_empty() {
            issues.push("SLACK_WEBHOOK_PARAMETER must not be empty when Slack is enabled".into());
        }
        issues
    }
}

fn threshold_key(period: ReportingPeriod) -> &'static str {
    match period {
        ReportingPeriod::Daily => "DAILY_COST_THRESHOLD",
        ReportingPeriod::Weekly => "WEEKLY_COST_THRESHOLD",
        ReportingPeriod::Monthly => "MONTHLY_COST_THRESHOLD",
        ReportingPeriod::Yearly => "YEARLY_COST_THRESHOLD",
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Unrecognised values switch the feature off.
fn parse_flag(key: &'static str, raw: &str) -> bool {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" | "" => false,
        _ => {
            warn!(key, value = %raw, "Unrecognised flag value, treating as false");
            false
        }
    }
}
