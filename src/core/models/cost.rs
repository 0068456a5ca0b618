use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::period::{DateWindow, ReportingPeriod};

/// One `(category, amount, unit)` group of a billing result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostGroup {
    pub category: String,
    pub amount: Decimal,
    pub unit: String,
}

/// All groups the billing API returned for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCostRow {
    pub date: NaiveDate,
    #[serde(default)]
    pub groups: Vec<CostGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCost {
    pub name: String,
    pub current: Decimal,
    pub previous: Decimal,
}

impl CategoryCost {
    pub fn difference(&self) -> Decimal {
        self.current - self.previous
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub period: ReportingPeriod,
    pub window: DateWindow,
    pub previous_window: DateWindow,
    pub current_total: Decimal,
    pub previous_total: Decimal,
    pub unit: String,
    /// Every category seen on either side, in discovery order.
    pub per_category: Vec<CategoryCost>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl ReportSummary {
    pub fn difference(&self) -> Decimal {
        self.current_total - self.previous_total
    }

    #[cfg(test)]
    pub fn category(&self, name: &str) -> Option<&CategoryCost> {
        self.per_category.iter().find(|c| c.name == name)
    }

    pub fn with_account(mut self, account_id: Option<String>) -> Self {
        self.account_id = account_id;
        self
    }
}
