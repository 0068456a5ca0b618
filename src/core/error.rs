use thiserror::Error;

use crate::core::config::ConfigError;

/// Terminal failures of a single invocation. None of these are retried.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid time period: {0}. Must be daily, weekly, monthly, or yearly.")]
    InvalidPeriod(String),
    #[error("An error occurred with the {service} API: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl ReportError {
    pub fn upstream(service: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Upstream {
            service,
            message: err.to_string(),
        }
    }

    /// Message safe to return to the caller. Unexpected errors keep their
    /// detail in the log only.
    pub fn public_message(&self) -> String {
        match self {
            Self::Unexpected(_) => "An unexpected error occurred.".to_string(),
            other => other.to_string(),
        }
    }
}
