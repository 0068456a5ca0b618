use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::core::config::CategoryOrder;
use crate::core::formatter::{format_date, format_money};
use crate::core::models::cost::ReportSummary;
use crate::core::report::breakdown_rows;

/// Slack rejects messages with more than 50 blocks.
const MAX_CATEGORY_BLOCKS: usize = 40;

/// Render the report as a Slack Block Kit document: `{"blocks": [...]}`.
pub fn render(summary: &ReportSummary, threshold: Decimal, order: CategoryOrder) -> Value {
    let period = summary.period.id();
    let unit = summary.unit.as_str();

    let mut context = format!(
        "Period: {} to {}",
        format_date(summary.window.start),
        format_date(summary.window.end)
    );
    if let Some(account) = &summary.account_id {
        context.push_str(&format!(" | Account: {}", account));
    }

    let mut blocks = vec![
        json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": format!("AWS Cost Report for {}", summary.period.title()),
                "emoji": true
            }
        }),
        json!({
            "type": "context",
            "elements": [{ "type": "plain_text", "text": context, "emoji": true }]
        }),
        json!({ "type": "divider" }),
        json!({
            "type": "section",
            "fields": [
                field(&format!("Current {} cost", period), &format_money(summary.current_total, unit)),
                field(&format!("Previous {} cost", period), &format_money(summary.previous_total, unit)),
                field("Difference", &format_money(summary.difference(), unit)),
                field("Threshold", &format_money(threshold, unit)),
            ]
        }),
        json!({ "type": "divider" }),
        json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": "*Breakdown by Service:*" }
        }),
    ];

    let rows = breakdown_rows(summary, order);
    for category in rows.iter().take(MAX_CATEGORY_BLOCKS) {
        blocks.push(json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "*{}*\nCurrent: {} | Previous: {} | Difference: {}",
                    mrkdwn_escape(&category.name),
                    format_money(category.current, unit),
                    format_money(category.previous, unit),
                    format_money(category.difference(), unit)
                )
            }
        }));
    }

    if rows.len() > MAX_CATEGORY_BLOCKS {
        let hidden = &rows[MAX_CATEGORY_BLOCKS..];
        let hidden_total: Decimal = hidden.iter().map(|c| c.current).sum();
        blocks.push(json!({
            "type": "context",
            "elements": [{
                "type": "mrkdwn",
                "text": format!(
                    "...and {} more services totalling {}",
                    hidden.len(),
                    format_money(hidden_total, unit)
                )
            }]
        }));
    }

    json!({ "blocks": blocks })
}

/// Escape the characters mrkdwn treats as control sequences.
fn mrkdwn_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn field(label: &str, value: &str) -> Value {
    json!({ "type": "mrkdwn", "text": format!("*{}:*\n{}", label, value) })
}
