use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::core::aws::ssm::ParameterStore;
use crate::core::error::ReportError;
use crate::core::notify::NotificationChannel;
use crate::core::report::{OutputFormat, RenderedReport};

const SERVICE: &str = "Slack webhook";
const FALLBACK_TEXT: &str = "AWS Cost Report";

/// Slack incoming webhook. The webhook URL is a secret held in Parameter
/// Store and is resolved on every send.
pub struct SlackWebhookChannel {
    parameters: Arc<dyn ParameterStore>,
    parameter_name: String,
    http: reqwest::Client,
}

impl SlackWebhookChannel {
    pub fn new(
        parameters: Arc<dyn ParameterStore>,
        parameter_name: impl Into<String>,
    ) -> Result<Self, ReportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ReportError::Unexpected(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            parameters,
            parameter_name: parameter_name.into(),
            http,
        })
    }
}

fn payload(body: &RenderedReport) -> serde_json::Value {
    match body {
        RenderedReport::SlackBlocks(doc) => json!({
            "text": FALLBACK_TEXT,
            "blocks": doc.get("blocks").cloned().unwrap_or_else(|| json!([])),
        }),
        other => json!({ "text": other.as_text() }),
    }
}

#[async_trait]
impl NotificationChannel for SlackWebhookChannel {
    fn name(&self) -> &'static str {
        "slack"
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::SlackBlocks
    }

    async fn send(&self, _subject: &str, body: &RenderedReport) -> Result<String, ReportError> {
        let url = self.parameters.get_parameter(&self.parameter_name).await?;

        let response = self
            .http
            .post(url.trim())
            .json(&payload(body))
            .send()
            .await
            .map_err(|e| ReportError::upstream(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ReportError::upstream(
                SERVICE,
                format!("HTTP {}: {}", status.as_u16(), detail),
            ));
        }
        Ok(status.as_u16().to_string())
    }
}
