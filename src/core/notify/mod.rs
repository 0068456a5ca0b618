pub mod ses;
pub mod slack;
pub mod sns;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::core::config::{CategoryOrder, ConfigError};
use crate::core::error::ReportError;
use crate::core::models::cost::ReportSummary;
use crate::core::report::{self, OutputFormat, RenderedReport};

/// A destination for rendered reports and notices.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Short channel name used in logs and failure summaries.
    fn name(&self) -> &'static str;

    /// Rendering this channel expects.
    fn format(&self) -> OutputFormat;

    /// Deliver the message, returning the provider's delivery id.
    async fn send(&self, subject: &str, body: &RenderedReport) -> Result<String, ReportError>;
}

/// Stand-in for a channel whose settings are incomplete. Every send fails
/// with the missing setting, so the gap surfaces only when a report is due.
pub struct UnconfiguredChannel {
    name: &'static str,
    format: OutputFormat,
    missing: &'static str,
}

impl UnconfiguredChannel {
    pub fn new(name: &'static str, format: OutputFormat, missing: &'static str) -> Self {
        Self {
            name,
            format,
            missing,
        }
    }
}

#[async_trait]
impl NotificationChannel for UnconfiguredChannel {
    fn name(&self) -> &'static str {
        self.name
    }

    fn format(&self) -> OutputFormat {
        self.format
    }

    async fn send(&self, _subject: &str, _body: &RenderedReport) -> Result<String, ReportError> {
        Err(ConfigError::Missing(self.missing).into())
    }
}

/// Strict threshold gate: equal to the threshold does not notify.
pub fn should_notify(summary: &ReportSummary, threshold: Decimal) -> bool {
    summary.current_total > threshold
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DispatchOutcome {
    /// `(channel, delivery id)` per successful send.
    pub delivered: Vec<(String, String)>,
    /// `(channel, error)` per failed send.
    pub failed: Vec<(String, String)>,
}

impl DispatchOutcome {
    pub fn failed_channels(&self) -> Vec<&str> {
        self.failed.iter().map(|(name, _)| name.as_str()).collect()
    }
}

/// Send the report to every channel. Delivery is best effort: a failing
/// channel is logged and recorded, and the remaining channels are still tried.
pub async fn dispatch(
    channels: &[&dyn NotificationChannel],
    summary: &ReportSummary,
    threshold: Decimal,
    order: CategoryOrder,
) -> DispatchOutcome {
    let subject = report::subject(summary);
    let mut rendered: Vec<(OutputFormat, RenderedReport)> = Vec::new();
    let mut outcome = DispatchOutcome::default();

    for channel in channels {
        let format = channel.format();
        let body = match rendered.iter().find(|(f, _)| *f == format) {
            Some((_, body)) => body.clone(),
            None => {
                let body = report::render(summary, threshold, format, order);
                rendered.push((format, body.clone()));
                body
            }
        };

        match channel.send(&subject, &body).await {
            Ok(id) => {
                info!(channel = channel.name(), delivery_id = %id, "Notification sent");
                outcome.delivered.push((channel.name().to_string(), id));
            }
            Err(e) => {
                warn!(channel = channel.name(), error = %e, "Notification failed");
                outcome.failed.push((channel.name().to_string(), e.to_string()));
            }
        }
    }

    outcome
}

/// Send a plain-text notice, logging instead of failing.
pub async fn notify_text(channel: &dyn NotificationChannel, subject: &str, message: &str) {
    let body = RenderedReport::PlainText(message.to_string());
    match channel.send(subject, &body).await {
        Ok(id) => info!(channel = channel.name(), delivery_id = %id, "Notice sent"),
        Err(e) => warn!(channel = channel.name(), error = %e, "Notice failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::fixtures::{dec, summary};
    use crate::core::testing::RecordingChannel;

    #[test]
    fn threshold_gate_is_strict() {
        let s = summary();
        assert!(should_notify(&s, dec("13.24")));
        assert!(!should_notify(&s, dec("13.25")));
        assert!(!should_notify(&s, dec("13.2500000")));
        assert!(!should_notify(&s, dec("20")));
    }

    #[tokio::test]
    async fn dispatch_renders_each_channel_format() {
        let text = RecordingChannel::new("sns", OutputFormat::PlainText);
        let blocks = RecordingChannel::new("slack", OutputFormat::SlackBlocks);
        let outcome = dispatch(
            &[&text, &blocks],
            &summary(),
            dec("1"),
            CategoryOrder::Discovery,
        )
        .await;

        assert_eq!(outcome.delivered.len(), 2);
        assert!(outcome.failed.is_empty());
        let sent = text.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "AWS Cost Report - Daily (Period: 2024-03-14 to 2024-03-14)");
        assert!(matches!(sent[0].1, RenderedReport::PlainText(_)));
        assert!(matches!(blocks.sent()[0].1, RenderedReport::SlackBlocks(_)));
    }

    #[tokio::test]
    async fn failing_channel_does_not_stop_the_others() {
        let broken = RecordingChannel::failing("sns", OutputFormat::PlainText);
        let slack = RecordingChannel::new("slack", OutputFormat::SlackBlocks);
        let outcome = dispatch(
            &[&broken, &slack],
            &summary(),
            dec("1"),
            CategoryOrder::Discovery,
        )
        .await;

        assert_eq!(outcome.failed_channels(), vec!["sns"]);
        assert_eq!(outcome.delivered.len(), 1);
        assert_eq!(slack.sent().len(), 1);
    }

    #[tokio::test]
    async fn unconfigured_channel_fails_at_send_time_with_the_missing_key() {
        let sns = UnconfiguredChannel::new("sns", OutputFormat::PlainText, "SNS_TOPIC_ARN");
        let outcome = dispatch(&[&sns], &summary(), dec("1"), CategoryOrder::Discovery).await;

        assert!(outcome.delivered.is_empty());
        assert_eq!(outcome.failed_channels(), vec!["sns"]);
        assert!(outcome.failed[0].1.contains("SNS_TOPIC_ARN must be set"));
    }

    #[tokio::test]
    async fn notify_text_swallows_failures() {
        let broken = RecordingChannel::failing("sns", OutputFormat::PlainText);
        notify_text(&broken, "subject", "message").await;
        assert_eq!(broken.attempts(), 1);
    }
}
