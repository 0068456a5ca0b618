use rust_decimal::Decimal;

use crate::core::config::CategoryOrder;
use crate::core::formatter::{format_amount, format_date, format_money, pad_label};
use crate::core::models::cost::ReportSummary;
use crate::core::report::breakdown_rows;

/// Underscores added after the longest category name.
const LABEL_PADDING: usize = 10;
const AMOUNT_WIDTH: usize = 14;

/// Render the plain-text report.
///
/// Layout:
/// ```text
/// AWS Cost Report for daily (Period: 2024-03-14 to 2024-03-14)
/// Threshold: 10.0000000 USD
///
/// Summary:
/// Current daily cost: 12.5000000 USD | Previous daily cost: 9.0000000 USD | Difference: 3.5000000 USD
///
/// - Breakdown by Service:
/// EC2_____________| Current:     12.5000000 USD | Previous:      9.0000000 USD | Difference:      3.5000000 USD
/// ```
pub fn render(summary: &ReportSummary, threshold: Decimal, order: CategoryOrder) -> String {
    let period = summary.period.id();
    let unit = summary.unit.as_str();
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "AWS Cost Report for {} (Period: {} to {})",
        period,
        format_date(summary.window.start),
        format_date(summary.window.end)
    ));
    if let Some(account) = &summary.account_id {
        lines.push(format!("Account: {}", account));
    }
    lines.push(format!("Threshold: {}", format_money(threshold, unit)));
    lines.push(String::new());

    lines.push("Summary:".to_string());
    lines.push(format!(
        "Current {p} cost: {} | Previous {p} cost: {} | Difference: {}",
        format_money(summary.current_total, unit),
        format_money(summary.previous_total, unit),
        format_money(summary.difference(), unit),
        p = period
    ));
    lines.push(String::new());

    lines.push("- Breakdown by Service:".to_string());
    let rows = breakdown_rows(summary, order);
    if rows.is_empty() {
        lines.push("(no services with cost in this period)".to_string());
    }
    let width = rows
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
        + LABEL_PADDING;
    for category in rows {
        lines.push(format!(
            "{}| Current: {:>w$} {u} | Previous: {:>w$} {u} | Difference: {:>w$} {u}",
            pad_label(&category.name, width),
            format_amount(category.current),
            format_amount(category.previous),
            format_amount(category.difference()),
            w = AMOUNT_WIDTH,
            u = unit
        ));
    }

    lines.join("\n")
}
