pub mod html;
pub mod slack;
pub mod text;

use rust_decimal::Decimal;

use crate::core::config::CategoryOrder;
use crate::core::formatter::format_date;
use crate::core::models::cost::{CategoryCost, ReportSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    PlainText,
    SlackBlocks,
    Html,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedReport {
    PlainText(String),
    SlackBlocks(serde_json::Value),
    Html(String),
}

impl RenderedReport {
    /// Textual form of the report, used by channels that can only carry text.
    pub fn as_text(&self) -> String {
        match self {
            Self::PlainText(text) | Self::Html(text) => text.clone(),
            Self::SlackBlocks(blocks) => blocks.to_string(),
        }
    }
}

/// Render a summary in the requested format.
pub fn render(
    summary: &ReportSummary,
    threshold: Decimal,
    format: OutputFormat,
    order: CategoryOrder,
) -> RenderedReport {
    match format {
        OutputFormat::PlainText => RenderedReport::PlainText(text::render(summary, threshold, order)),
        OutputFormat::SlackBlocks => {
            RenderedReport::SlackBlocks(slack::render(summary, threshold, order))
        }
        OutputFormat::Html => RenderedReport::Html(html::render(summary, threshold, order)),
    }
}

/// Subject line shared by every channel.
pub fn subject(summary: &ReportSummary) -> String {
    format!(
        "AWS Cost Report - {} (Period: {} to {})",
        summary.period.title(),
        format_date(summary.window.start),
        format_date(summary.window.end)
    )
}

/// Categories shown in a breakdown: positive current cost only, ordered as
/// configured. Excluded categories still count toward the totals.
pub fn breakdown_rows(summary: &ReportSummary, order: CategoryOrder) -> Vec<&CategoryCost> {
    let mut rows: Vec<&CategoryCost> = summary
        .per_category
        .iter()
        .filter(|c| c.current > Decimal::ZERO)
        .collect();
    if order == CategoryOrder::Alphabetical {
        rows.sort_by(|a, b| a.name.cmp(&b.name));
    }
    rows
}
