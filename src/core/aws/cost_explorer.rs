use async_trait::async_trait;
use aws_sdk_costexplorer::error::DisplayErrorContext;
use aws_sdk_costexplorer::types::{
    DateInterval, Granularity, GroupDefinition, GroupDefinitionType, ResultByTime,
};
use aws_sdk_costexplorer::Client;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use crate::core::aggregate::DEFAULT_UNIT;
use crate::core::error::ReportError;
use crate::core::formatter::format_date;
use crate::core::models::cost::{CostGroup, DailyCostRow};
use crate::core::period::DateWindow;

const SERVICE: &str = "Cost Explorer";
const METRIC: &str = "UnblendedCost";
const GROUP_KEY: &str = "SERVICE";

/// Source of per-day, per-service cost rows.
#[async_trait]
pub trait BillingSource: Send + Sync {
    /// Daily unblended cost grouped by service for an inclusive window.
    async fn get_usage(&self, window: &DateWindow) -> Result<Vec<DailyCostRow>, ReportError>;
}

pub struct CostExplorerSource {
    client: Client,
}

impl CostExplorerSource {
    pub fn new(sdk: &aws_config::SdkConfig) -> Self {
        Self::from_client(Client::new(sdk))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BillingSource for CostExplorerSource {
    async fn get_usage(&self, window: &DateWindow) -> Result<Vec<DailyCostRow>, ReportError> {
        // Cost Explorer treats End as exclusive.
        let interval = DateInterval::builder()
            .start(format_date(window.start))
            .end(format_date(window.exclusive_end()))
            .build()
            .map_err(|e| ReportError::upstream(SERVICE, e))?;
        let group_by = GroupDefinition::builder()
            .r#type(GroupDefinitionType::Dimension)
            .key(GROUP_KEY)
            .build();

        let mut rows = Vec::new();
        let mut next_page_token: Option<String> = None;
        loop {
            let output = self
                .client
                .get_cost_and_usage()
                .time_period(interval.clone())
                .granularity(Granularity::Daily)
                .metrics(METRIC)
                .group_by(group_by.clone())
                .set_next_page_token(next_page_token.take())
                .send()
                .await
                .map_err(|e| ReportError::upstream(SERVICE, DisplayErrorContext(&e)))?;

            for result in output.results_by_time() {
                rows.push(parse_result(result)?);
            }

            match output.next_page_token() {
                Some(token) if !token.is_empty() => next_page_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(
            start = %window.start,
            end = %window.end,
            rows = rows.len(),
            "Fetched cost and usage"
        );
        Ok(rows)
    }
}

fn parse_result(result: &ResultByTime) -> Result<DailyCostRow, ReportError> {
    let start = result
        .time_period()
        .map(|p| p.start())
        .ok_or_else(|| ReportError::upstream(SERVICE, "result row without a time period"))?;
    let date = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .map_err(|e| ReportError::upstream(SERVICE, format!("bad date '{}': {}", start, e)))?;

    let mut groups = Vec::new();
    for group in result.groups() {
        let category = group
            .keys()
            .first()
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string());
        let metric = group.metrics().and_then(|m| m.get(METRIC));
        let amount = match metric.and_then(|m| m.amount()) {
            Some(raw) => parse_amount(raw)?,
            None => Decimal::ZERO,
        };
        let unit = metric
            .and_then(|m| m.unit())
            .unwrap_or(DEFAULT_UNIT)
            .to_string();
        groups.push(CostGroup {
            category,
            amount,
            unit,
        });
    }

    Ok(DailyCostRow { date, groups })
}

/// Amounts arrive as strings, occasionally in scientific notation.
fn parse_amount(raw: &str) -> Result<Decimal, ReportError> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| ReportError::upstream(SERVICE, format!("unparseable amount '{}'", raw)))
}
