use async_trait::async_trait;
use aws_sdk_sesv2::error::DisplayErrorContext;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client;

use crate::core::error::ReportError;
use crate::core::notify::NotificationChannel;
use crate::core::report::{OutputFormat, RenderedReport};

const SERVICE: &str = "SES";
const CHARSET: &str = "UTF-8";

/// Transactional email through SES. Reports are sent as HTML.
pub struct SesChannel {
    client: Client,
    sender: String,
    recipients: Vec<String>,
}

impl SesChannel {
    pub fn new(sdk: &aws_config::SdkConfig, sender: impl Into<String>, recipients: Vec<String>) -> Self {
        Self {
            client: Client::new(sdk),
            sender: sender.into(),
            recipients,
        }
    }
}

fn content(data: &str) -> Result<Content, ReportError> {
    Content::builder()
        .data(data)
        .charset(CHARSET)
        .build()
        .map_err(|e| ReportError::upstream(SERVICE, e))
}

#[async_trait]
impl NotificationChannel for SesChannel {
    fn name(&self) -> &'static str {
        "ses"
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Html
    }

    async fn send(&self, subject: &str, body: &RenderedReport) -> Result<String, ReportError> {
        let email_body = match body {
            RenderedReport::Html(html) => Body::builder().html(content(html)?).build(),
            other => Body::builder().text(content(&other.as_text())?).build(),
        };
        let message = Message::builder()
            .subject(content(subject)?)
            .body(email_body)
            .build();
        let destination = Destination::builder()
            .set_to_addresses(Some(self.recipients.clone()))
            .build();

        let output = self
            .client
            .send_email()
            .from_email_address(&self.sender)
            .destination(destination)
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| ReportError::upstream(SERVICE, DisplayErrorContext(&e)))?;
        Ok(output.message_id().unwrap_or_default().to_string())
    }
}
