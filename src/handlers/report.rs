use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{error, info};

use crate::core::aggregate::aggregate;
use crate::core::aws::cost_explorer::{BillingSource, CostExplorerSource};
use crate::core::aws::dynamodb::{DynamoStore, IdempotencyStore};
use crate::core::aws::ssm::SsmParameterStore;
use crate::core::aws::sts::{IdentityLookup, StsIdentity};
use crate::core::config::{AppConfig, ChannelKind};
use crate::core::error::ReportError;
use crate::core::formatter::{format_date, format_money};
use crate::core::guard::IdempotencyGuard;
use crate::core::models::event::{HandlerResponse, ReportEvent};
use crate::core::notify::ses::SesChannel;
use crate::core::notify::slack::SlackWebhookChannel;
use crate::core::notify::sns::SnsChannel;
use crate::core::notify::{
    dispatch, should_notify, DispatchOutcome, NotificationChannel, UnconfiguredChannel,
};
use crate::core::period::{compute_windows, ReportingPeriod};
use crate::core::report::OutputFormat;

/// Collaborators of the cost report handler.
pub struct ReportDeps {
    pub billing: Box<dyn BillingSource>,
    /// Primary channel first, then the optional Slack mirror.
    pub channels: Vec<Box<dyn NotificationChannel>>,
    pub store: Option<Box<dyn IdempotencyStore>>,
    pub identity: Option<Box<dyn IdentityLookup>>,
}

impl ReportDeps {
    /// Wire the AWS-backed collaborators selected by `config`.
    ///
    /// Incomplete primary-channel settings do not fail here; they fail the
    /// send, and only when a report crosses its threshold.
    pub fn from_config(
        sdk: &aws_config::SdkConfig,
        config: &AppConfig,
    ) -> Result<Self, ReportError> {
        let notification = &config.notification;
        let primary = primary_channel(sdk, config);

        let mut channels = vec![primary];
        if notification.enable_slack {
            channels.push(Box::new(SlackWebhookChannel::new(
                Arc::new(SsmParameterStore::new(sdk)),
                notification.slack_webhook_parameter.clone(),
            )?));
        }

        Ok(Self {
            billing: Box::new(CostExplorerSource::new(sdk)),
            channels,
            store: config
                .report
                .idempotency_table
                .as_ref()
                .map(|table| Box::new(DynamoStore::new(sdk, table.clone())) as Box<dyn IdempotencyStore>),
            identity: config
                .report
                .include_account_id
                .then(|| Box::new(StsIdentity::new(sdk)) as Box<dyn IdentityLookup>),
        })
    }
}

fn primary_channel(
    sdk: &aws_config::SdkConfig,
    config: &AppConfig,
) -> Box<dyn NotificationChannel> {
    let notification = &config.notification;
    match notification.channel {
        ChannelKind::Sns => match config.sns_topic_arn() {
            Ok(topic_arn) => Box::new(SnsChannel::new(sdk, topic_arn)),
            Err(_) => Box::new(UnconfiguredChannel::new(
                "sns",
                OutputFormat::PlainText,
                "SNS_TOPIC_ARN",
            )),
        },
        ChannelKind::Ses => match notification.ses_sender.as_deref() {
            None => Box::new(UnconfiguredChannel::new("ses", OutputFormat::Html, "SES_SENDER")),
            Some(_) if notification.ses_recipients.is_empty() => Box::new(
                UnconfiguredChannel::new("ses", OutputFormat::Html, "SES_RECIPIENTS"),
            ),
            Some(sender) => Box::new(SesChannel::new(
                sdk,
                sender,
                notification.ses_recipients.clone(),
            )),
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    AlreadyProcessed {
        period: ReportingPeriod,
        window_end: NaiveDate,
    },
    NoData {
        period: ReportingPeriod,
    },
    BelowThreshold,
    Notified(DispatchOutcome),
}

impl ReportOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::AlreadyProcessed { period, window_end } => format!(
                "Cost report for the {} period ending {} was already processed.",
                period,
                format_date(*window_end)
            ),
            Self::NoData { period } => {
                format!("No cost data available for the specified {} period.", period)
            }
            Self::BelowThreshold => "Cost report generated successfully.".to_string(),
            Self::Notified(outcome) if !outcome.failed.is_empty() => format!(
                "Cost report generated successfully. Notification delivery failed for: {}.",
                outcome.failed_channels().join(", ")
            ),
            Self::Notified(_) => "Cost report generated successfully.".to_string(),
        }
    }
}

/// Run the cost report for one event and map the result to a response.
pub async fn handle(
    event: &ReportEvent,
    deps: &ReportDeps,
    config: &AppConfig,
    today: NaiveDate,
) -> HandlerResponse {
    match run(&event.time_period(), deps, config, today).await {
        Ok(outcome) => HandlerResponse::ok(outcome.message()),
        Err(err) => {
            match &err {
                ReportError::Unexpected(detail) => {
                    error!(detail = %detail, "Cost report failed unexpectedly")
                }
                other => error!(error = %other, "Cost report failed"),
            }
            HandlerResponse::failure(err.public_message())
        }
    }
}

pub async fn run(
    requested: &str,
    deps: &ReportDeps,
    config: &AppConfig,
    today: NaiveDate,
) -> Result<ReportOutcome, ReportError> {
    let period = ReportingPeriod::parse(requested)?;
    let (window, previous_window) = compute_windows(period, today);
    info!(
        period = %period,
        start = %window.start,
        end = %window.end,
        days = window.days(),
        previous_start = %previous_window.start,
        previous_end = %previous_window.end,
        "Computed reporting windows"
    );

    let guard = deps.store.as_deref().map(IdempotencyGuard::new);
    if let Some(guard) = &guard {
        if guard.already_processed(period, window.end).await? {
            info!(period = %period, end = %window.end, "Window already processed, skipping");
            return Ok(ReportOutcome::AlreadyProcessed {
                period,
                window_end: window.end,
            });
        }
    }

    let current = deps.billing.get_usage(&window).await?;
    let previous = deps.billing.get_usage(&previous_window).await?;

    let Some(summary) = aggregate(period, window, previous_window, &current, &previous) else {
        info!(period = %period, "No cost data returned");
        return Ok(ReportOutcome::NoData { period });
    };

    let summary = match &deps.identity {
        Some(identity) => summary.with_account(Some(identity.account_id().await?)),
        None => summary,
    };

    let threshold = config.thresholds.for_period(period);
    let outcome = if should_notify(&summary, threshold) {
        info!(
            total = %format_money(summary.current_total, &summary.unit),
            threshold = %format_money(threshold, &summary.unit),
            "Cost threshold exceeded, sending notification"
        );
        let channels: Vec<&dyn NotificationChannel> =
            deps.channels.iter().map(|c| c.as_ref()).collect();
        let outcome = dispatch(&channels, &summary, threshold, config.report.category_order).await;
        info!(
            delivered = outcome.delivered.len(),
            failed = outcome.failed.len(),
            "Notification dispatch finished"
        );
        ReportOutcome::Notified(outcome)
    } else {
        info!(
            total = %format_money(summary.current_total, &summary.unit),
            threshold = %format_money(threshold, &summary.unit),
            "Total cost did not exceed the threshold, no notification sent"
        );
        ReportOutcome::BelowThreshold
    };

    if let Some(guard) = &guard {
        guard.mark_processed(period, window.end).await?;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::cost::{CostGroup, DailyCostRow};
    use crate::core::report::RenderedReport;
    use crate::core::testing::{MemoryStore, MockBilling, RecordingChannel, StaticIdentity};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn rows(date: NaiveDate, groups: &[(&str, &str)]) -> Vec<DailyCostRow> {
        vec![DailyCostRow {
            date,
            groups: groups
                .iter()
                .map(|(category, amount)| CostGroup {
                    category: category.to_string(),
                    amount: Decimal::from_str(amount).unwrap(),
                    unit: "USD".to_string(),
                })
                .collect(),
        }]
    }

    /// Billing with EC2 at 12.50 for the current day and 9.00 for the previous.
    fn daily_billing() -> MockBilling {
        let (current, previous) = compute_windows(ReportingPeriod::Daily, today());
        MockBilling::default()
            .with(current, rows(current.start, &[("EC2", "12.50")]))
            .with(previous, rows(previous.start, &[("EC2", "9.00")]))
    }

    fn config_with_daily_threshold(threshold: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.thresholds.daily = Decimal::from_str(threshold).unwrap();
        config
    }

    fn deps(billing: &MockBilling, channels: &[&RecordingChannel]) -> ReportDeps {
        ReportDeps {
            billing: Box::new(billing.clone()),
            channels: channels
                .iter()
                .map(|c| Box::new((*c).clone()) as Box<dyn NotificationChannel>)
                .collect(),
            store: None,
            identity: None,
        }
    }

    fn event(period: &str) -> ReportEvent {
        ReportEvent {
            time_period: Some(period.to_string()),
        }
    }

    #[tokio::test]
    async fn daily_report_above_threshold_notifies_once() {
        let billing = daily_billing();
        let sns = RecordingChannel::new("sns", OutputFormat::PlainText);
        let response = handle(
            &event("daily"),
            &deps(&billing, &[&sns]),
            &config_with_daily_threshold("10.00"),
            today(),
        )
        .await;

        assert_eq!(response, HandlerResponse::ok("Cost report generated successfully."));
        let sent = sns.sent();
        assert_eq!(sent.len(), 1);
        let RenderedReport::PlainText(body) = &sent[0].1 else {
            panic!("expected a plain-text body");
        };
        assert!(body.contains("12.5000000 USD"));
        assert!(body.contains("Difference: 3.5000000 USD"));
        assert_eq!(
            sent[0].0,
            "AWS Cost Report - Daily (Period: 2024-03-14 to 2024-03-14)"
        );
    }

    #[tokio::test]
    async fn total_equal_to_threshold_does_not_notify() {
        let billing = daily_billing();
        let sns = RecordingChannel::new("sns", OutputFormat::PlainText);
        let response = handle(
            &event("daily"),
            &deps(&billing, &[&sns]),
            &config_with_daily_threshold("12.50"),
            today(),
        )
        .await;

        assert!(response.is_success());
        assert!(sns.sent().is_empty());
    }

    #[tokio::test]
    async fn missing_period_defaults_to_daily() {
        let billing = daily_billing();
        let sns = RecordingChannel::new("sns", OutputFormat::PlainText);
        let response = handle(
            &ReportEvent::default(),
            &deps(&billing, &[&sns]),
            &config_with_daily_threshold("10.00"),
            today(),
        )
        .await;
        assert!(response.is_success());
        assert_eq!(billing.queries().len(), 2);
        assert_eq!(sns.sent().len(), 1);
    }

    #[tokio::test]
    async fn invalid_period_fails_without_querying_billing() {
        let billing = daily_billing();
        let sns = RecordingChannel::new("sns", OutputFormat::PlainText);
        let response = handle(
            &event("fortnightly"),
            &deps(&billing, &[&sns]),
            &AppConfig::default(),
            today(),
        )
        .await;

        assert_eq!(response.status_code, 500);
        assert!(response.body.contains("Invalid time period: fortnightly"));
        assert!(billing.queries().is_empty());
        assert!(sns.sent().is_empty());
    }

    #[tokio::test]
    async fn empty_current_window_is_no_data() {
        let (_, previous) = compute_windows(ReportingPeriod::Daily, today());
        let billing =
            MockBilling::default().with(previous, rows(previous.start, &[("EC2", "9.00")]));
        let sns = RecordingChannel::new("sns", OutputFormat::PlainText);
        let response = handle(
            &event("daily"),
            &deps(&billing, &[&sns]),
            &AppConfig::default(),
            today(),
        )
        .await;

        assert_eq!(
            response,
            HandlerResponse::ok("No cost data available for the specified daily period.")
        );
        assert!(sns.sent().is_empty());
    }

    #[tokio::test]
    async fn billing_failure_is_a_500_with_upstream_detail() {
        let sns = RecordingChannel::new("sns", OutputFormat::PlainText);
        let response = handle(
            &event("weekly"),
            &deps(&MockBilling::failing(), &[&sns]),
            &AppConfig::default(),
            today(),
        )
        .await;

        assert_eq!(response.status_code, 500);
        assert!(response.body.contains("Cost Explorer"));
        assert!(response.body.contains("AccessDeniedException"));
    }

    #[tokio::test]
    async fn failed_channel_keeps_success_status_and_is_named() {
        let billing = daily_billing();
        let sns = RecordingChannel::failing("sns", OutputFormat::PlainText);
        let slack = RecordingChannel::new("slack", OutputFormat::SlackBlocks);
        let response = handle(
            &event("daily"),
            &deps(&billing, &[&sns, &slack]),
            &config_with_daily_threshold("1"),
            today(),
        )
        .await;

        assert!(response.is_success());
        assert!(response.body.ends_with("Notification delivery failed for: sns."));
        assert_eq!(sns.attempts(), 1);
        assert_eq!(slack.sent().len(), 1);
    }

    #[tokio::test]
    async fn processed_window_short_circuits_before_billing() {
        let billing = daily_billing();
        let sns = RecordingChannel::new("sns", OutputFormat::PlainText);
        let store = MemoryStore::with("daily", "2024-03-14");
        let mut deps = deps(&billing, &[&sns]);
        deps.store = Some(Box::new(store.clone()));

        let response = handle(
            &event("daily"),
            &deps,
            &config_with_daily_threshold("1"),
            today(),
        )
        .await;

        assert_eq!(response.status_code, 200);
        assert!(response.body.contains("already processed"));
        assert!(billing.queries().is_empty());
        assert!(sns.sent().is_empty());
    }

    #[tokio::test]
    async fn successful_run_marks_window_processed() {
        let billing = daily_billing();
        let sns = RecordingChannel::new("sns", OutputFormat::PlainText);
        let store = MemoryStore::with("daily", "2024-03-13");
        let mut deps = deps(&billing, &[&sns]);
        deps.store = Some(Box::new(store.clone()));

        let response = handle(
            &event("daily"),
            &deps,
            &config_with_daily_threshold("100"),
            today(),
        )
        .await;

        assert!(response.is_success());
        assert_eq!(billing.queries().len(), 2);
        assert_eq!(store.value("daily").as_deref(), Some("2024-03-14"));
    }

    #[tokio::test]
    async fn no_data_does_not_mark_window_processed() {
        let sns = RecordingChannel::new("sns", OutputFormat::PlainText);
        let store = MemoryStore::default();
        let mut deps = deps(&MockBilling::default(), &[&sns]);
        deps.store = Some(Box::new(store.clone()));

        let response = handle(&event("daily"), &deps, &AppConfig::default(), today()).await;
        assert!(response.body.starts_with("No cost data"));
        assert!(store.value("daily").is_none());
    }

    #[tokio::test]
    async fn account_id_is_added_to_the_report() {
        let billing = daily_billing();
        let sns = RecordingChannel::new("sns", OutputFormat::PlainText);
        let mut deps = deps(&billing, &[&sns]);
        deps.identity = Some(Box::new(StaticIdentity("123456789012")));

        handle(&event("daily"), &deps, &config_with_daily_threshold("1"), today()).await;
        let body = sns.sent()[0].1.as_text();
        assert!(body.contains("Account: 123456789012"));
    }

    #[tokio::test]
    async fn monthly_report_queries_both_windows() {
        let billing = MockBilling::default();
        let sns = RecordingChannel::new("sns", OutputFormat::PlainText);
        handle(&event("MONTHLY"), &deps(&billing, &[&sns]), &AppConfig::default(), today()).await;

        let (current, previous) = compute_windows(ReportingPeriod::Monthly, today());
        assert_eq!(billing.queries(), vec![current, previous]);
    }

    fn unconfigured_sns() -> Box<dyn NotificationChannel> {
        primary_channel(
            &aws_config::SdkConfig::builder()
                .behavior_version(aws_config::BehaviorVersion::latest())
                .build(),
            &AppConfig::default(),
        )
    }

    #[tokio::test]
    async fn missing_topic_does_not_fail_a_report_below_threshold() {
        let billing = daily_billing();
        let deps = ReportDeps {
            billing: Box::new(billing.clone()),
            channels: vec![unconfigured_sns()],
            store: None,
            identity: None,
        };

        let response = handle(
            &event("daily"),
            &deps,
            &config_with_daily_threshold("100"),
            today(),
        )
        .await;
        assert_eq!(response, HandlerResponse::ok("Cost report generated successfully."));
    }

    #[tokio::test]
    async fn missing_topic_is_reported_as_a_failed_channel_when_due() {
        let billing = daily_billing();
        let slack = RecordingChannel::new("slack", OutputFormat::SlackBlocks);
        let deps = ReportDeps {
            billing: Box::new(billing.clone()),
            channels: vec![unconfigured_sns(), Box::new(slack.clone())],
            store: None,
            identity: None,
        };

        let response = handle(
            &event("daily"),
            &deps,
            &config_with_daily_threshold("10.00"),
            today(),
        )
        .await;
        assert_eq!(response.status_code, 200);
        assert!(response.body.ends_with("Notification delivery failed for: sns."));
        assert_eq!(slack.sent().len(), 1);
    }

    #[test]
    fn ses_without_recipients_is_an_unconfigured_channel() {
        let mut config = AppConfig::default();
        config.notification.channel = ChannelKind::Ses;
        config.notification.ses_sender = Some("billing@example.com".into());
        let channel = primary_channel(
            &aws_config::SdkConfig::builder()
                .behavior_version(aws_config::BehaviorVersion::latest())
                .build(),
            &config,
        );
        assert_eq!(channel.name(), "ses");
        assert_eq!(channel.format(), OutputFormat::Html);
    }

    #[test]
    fn outcome_messages() {
        assert_eq!(
            ReportOutcome::AlreadyProcessed {
                period: ReportingPeriod::Weekly,
                window_end: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            }
            .message(),
            "Cost report for the weekly period ending 2024-03-14 was already processed."
        );
        assert_eq!(
            ReportOutcome::Notified(DispatchOutcome::default()).message(),
            "Cost report generated successfully."
        );
    }
}
