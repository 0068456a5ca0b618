pub mod disable;
pub mod report;

use chrono::NaiveDate;
use clap::ValueEnum;
use tracing::error;

use crate::core::config::{AppConfig, ConfigError};
use crate::core::error::ReportError;
use crate::core::models::event::{HandlerResponse, ReportEvent};
use crate::core::period::ReportingPeriod;
use disable::{DisableDeps, DisableTarget};
use report::ReportDeps;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HandlerKind {
    /// Cost report for a period
    Report,
    /// Disable the configured CloudFront distribution
    DisableCloudfront,
    /// Disable the configured Lightsail container service
    DisableLightsail,
}

impl HandlerKind {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::DisableCloudfront => "disable-cloudfront",
            Self::DisableLightsail => "disable-lightsail",
        }
    }
}

/// Run one invocation of `kind` against `payload`.
///
/// Every failure, including configuration and event parsing, becomes a 500
/// response instead of an error. The report period is validated first.
pub async fn run_handler(
    kind: HandlerKind,
    sdk: &aws_config::SdkConfig,
    config: Result<AppConfig, ConfigError>,
    payload: serde_json::Value,
    today: NaiveDate,
) -> HandlerResponse {
    match kind {
        HandlerKind::Report => {
            // A bad period is rejected before any settings are consulted.
            let event = match parse_event(payload).and_then(|event| {
                ReportingPeriod::parse(&event.time_period()).map(|_| event)
            }) {
                Ok(event) => event,
                Err(e) => return failed(kind, e),
            };
            let config = match config {
                Ok(config) => config,
                Err(e) => return failed(kind, e.into()),
            };
            match ReportDeps::from_config(sdk, &config) {
                Ok(deps) => report::handle(&event, &deps, &config, today).await,
                Err(e) => failed(kind, e),
            }
        }
        HandlerKind::DisableCloudfront | HandlerKind::DisableLightsail => {
            let target = if kind == HandlerKind::DisableCloudfront {
                DisableTarget::CloudFront
            } else {
                DisableTarget::Lightsail
            };
            let config = match config {
                Ok(config) => config,
                Err(e) => return failed(kind, e.into()),
            };
            match DisableDeps::from_config(sdk, &config, target) {
                Ok(deps) => disable::handle(&deps).await,
                Err(e) => failed(kind, e),
            }
        }
    }
}

/// Report events are objects; anything else (or a non-string period) is
/// rejected as an invalid period.
fn parse_event(payload: serde_json::Value) -> Result<ReportEvent, ReportError> {
    if payload.is_null() {
        return Ok(ReportEvent::default());
    }
    let shown = payload.get("time_period").unwrap_or(&payload).to_string();
    serde_json::from_value(payload).map_err(|_| ReportError::InvalidPeriod(shown))
}

fn failed(kind: HandlerKind, err: ReportError) -> HandlerResponse {
    error!(handler = kind.id(), error = %err, "Invocation failed");
    HandlerResponse::failure(err.public_message())
}
