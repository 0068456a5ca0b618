use serde::{Deserialize, Serialize};

pub const DEFAULT_TIME_PERIOD: &str = "daily";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportEvent {
    #[serde(default)]
    pub time_period: Option<String>,
}

impl ReportEvent {
    /// Requested period, lower-cased, `daily` when absent.
    pub fn time_period(&self) -> String {
        self.time_period
            .as_deref()
            .unwrap_or(DEFAULT_TIME_PERIOD)
            .to_lowercase()
    }
}

/// Response shape returned to the Lambda caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: body.into(),
        }
    }

    pub fn failure(body: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}
