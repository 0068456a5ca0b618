use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::error::ReportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl ReportingPeriod {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Parse an event value, failing with `InvalidPeriod` for anything unknown.
    pub fn parse(id: &str) -> Result<Self, ReportError> {
        Self::from_id(id).ok_or_else(|| ReportError::InvalidPeriod(id.to_string()))
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Yearly => "Yearly",
        }
    }

    pub fn all() -> &'static [ReportingPeriod] {
        &[Self::Daily, Self::Weekly, Self::Monthly, Self::Yearly]
    }
}

impl std::fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A contiguous calendar range. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// End bound for APIs that take half-open `[start, end)` ranges.
    pub fn exclusive_end(&self) -> NaiveDate {
        self.end + Duration::days(1)
    }
}

/// Compute the current reporting window and the comparison window before it.
///
/// Windows are anchored on the day before `reference_date`, the last day with
/// complete billing data:
///
/// - daily: the anchor day, compared with the day before it
/// - weekly: the seven days ending on the anchor, compared with the seven before
/// - monthly: the 1st of the anchor's month through the anchor, compared with
///   the whole previous calendar month
/// - yearly: January 1st of the anchor's year through the anchor, compared with
///   the same range one year earlier
pub fn compute_windows(period: ReportingPeriod, reference_date: NaiveDate) -> (DateWindow, DateWindow) {
    let anchor = reference_date - Duration::days(1);

    match period {
        ReportingPeriod::Daily => (
            DateWindow::single(anchor),
            DateWindow::single(anchor - Duration::days(1)),
        ),
        ReportingPeriod::Weekly => {
            let start = anchor - Duration::days(6);
            let previous_end = start - Duration::days(1);
            (
                DateWindow::new(start, anchor),
                DateWindow::new(previous_end - Duration::days(6), previous_end),
            )
        }
        ReportingPeriod::Monthly => {
            let start = first_of_month(anchor);
            let previous_end = start - Duration::days(1);
            (
                DateWindow::new(start, anchor),
                DateWindow::new(first_of_month(previous_end), previous_end),
            )
        }
        ReportingPeriod::Yearly => {
            let start = first_of_year(anchor);
            (
                DateWindow::new(start, anchor),
                DateWindow::new(shift_year_back(start), shift_year_back(anchor)),
            )
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn first_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

// Feb 29 has no counterpart in a common year; clamp to Feb 28.
fn shift_year_back(date: NaiveDate) -> NaiveDate {
    let year = date.year() - 1;
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), date.day() - 1))
        .unwrap_or(date)
}
