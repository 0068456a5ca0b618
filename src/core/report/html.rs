use rust_decimal::Decimal;

use crate::core::config::CategoryOrder;
use crate::core::formatter::{format_date, format_money, html_escape};
use crate::core::models::cost::ReportSummary;
use crate::core::report::breakdown_rows;

/// Render the report as a standalone HTML document for email bodies.
pub fn render(summary: &ReportSummary, threshold: Decimal, order: CategoryOrder) -> String {
    let period = summary.period.id();
    let unit = html_escape(&summary.unit);
    let money = |amount: Decimal| html_escape(&format_money(amount, &summary.unit));

    let mut html = String::with_capacity(2048);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>AWS Cost Report for {}</title>\n",
        summary.period.title()
    ));
    html.push_str(
        "<style>\n\
         body{font-family:Arial,sans-serif;color:#1f2933}\n\
         table{border-collapse:collapse}\n\
         th,td{border:1px solid #cbd2d9;padding:4px 8px}\n\
         td.num{text-align:right;font-family:monospace}\n\
         </style>\n</head>\n<body>\n",
    );

    html.push_str(&format!(
        "<h1>AWS Cost Report for {}</h1>\n<p>Period: {} to {}</p>\n",
        summary.period.title(),
        format_date(summary.window.start),
        format_date(summary.window.end)
    ));
    if let Some(account) = &summary.account_id {
        html.push_str(&format!("<p>Account: {}</p>\n", html_escape(account)));
    }

    html.push_str("<h2>Summary</h2>\n<ul>\n");
    html.push_str(&format!(
        "<li>Current {} cost: {}</li>\n",
        period,
        money(summary.current_total)
    ));
    html.push_str(&format!(
        "<li>Previous {} cost: {}</li>\n",
        period,
        money(summary.previous_total)
    ));
    html.push_str(&format!("<li>Difference: {}</li>\n", money(summary.difference())));
    html.push_str(&format!("<li>Threshold: {}</li>\n</ul>\n", money(threshold)));

    html.push_str("<h2>Breakdown by Service</h2>\n");
    let rows = breakdown_rows(summary, order);
    if rows.is_empty() {
        html.push_str("<p>No services with cost in this period.</p>\n");
    } else {
        html.push_str(&format!(
            "<table>\n<thead><tr><th>Service</th><th>Current ({u})</th>\
             <th>Previous ({u})</th><th>Difference ({u})</th></tr></thead>\n<tbody>\n",
            u = unit
        ));
        for category in rows {
            html.push_str(&format!(
                "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td>\
                 <td class=\"num\">{}</td></tr>\n",
                html_escape(&category.name),
                money(category.current),
                money(category.previous),
                money(category.difference())
            ));
        }
        html.push_str("</tbody>\n</table>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}
