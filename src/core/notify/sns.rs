use async_trait::async_trait;
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::Client;

use crate::core::error::ReportError;
use crate::core::notify::NotificationChannel;
use crate::core::report::{OutputFormat, RenderedReport};

const SERVICE: &str = "SNS";
/// SNS rejects subjects longer than 100 characters.
const MAX_SUBJECT_CHARS: usize = 100;

pub struct SnsChannel {
    client: Client,
    topic_arn: String,
}

impl SnsChannel {
    pub fn new(sdk: &aws_config::SdkConfig, topic_arn: impl Into<String>) -> Self {
        Self {
            client: Client::new(sdk),
            topic_arn: topic_arn.into(),
        }
    }
}

#[async_trait]
impl NotificationChannel for SnsChannel {
    fn name(&self) -> &'static str {
        "sns"
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::PlainText
    }

    async fn send(&self, subject: &str, body: &RenderedReport) -> Result<String, ReportError> {
        let output = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(sns_subject(subject))
            .message(body.as_text())
            .send()
            .await
            .map_err(|e| ReportError::upstream(SERVICE, DisplayErrorContext(&e)))?;
        Ok(output.message_id().unwrap_or_default().to_string())
    }
}

/// Subjects must be a single line of printable ASCII.
fn sns_subject(subject: &str) -> String {
    subject
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { ' ' })
        .take(MAX_SUBJECT_CHARS)
        .collect()
}
