use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places shown for every amount in a report.
pub const AMOUNT_PLACES: u32 = 7;

/// Returns the amount in fixed-point notation with exactly seven decimals,
/// e.g. `12.5` -> `"12.5000000"`.
pub fn format_amount(amount: Decimal) -> String {
    let mut value = amount.round_dp_with_strategy(AMOUNT_PLACES, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(AMOUNT_PLACES);
    if value.is_zero() {
        value.set_sign_positive(true);
    }
    value.to_string()
}

/// Returns "{amount} {unit}", e.g. "12.5000000 USD".
pub fn format_money(amount: Decimal, unit: &str) -> String {
    format!("{} {}", format_amount(amount), unit)
}

/// Returns the ISO calendar date, e.g. "2024-03-14".
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Pads `label` on the right with underscores up to `width` characters.
pub fn pad_label(label: &str, width: usize) -> String {
    let len = label.chars().count();
    format!("{}{}", label, "_".repeat(width.saturating_sub(len)))
}

/// Minimal HTML escaping for category names and other API-provided strings.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
