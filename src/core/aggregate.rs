use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::core::models::cost::{CategoryCost, DailyCostRow, ReportSummary};
use crate::core::period::{DateWindow, ReportingPeriod};

/// Unit used when no current-side row carries a group.
pub const DEFAULT_UNIT: &str = "USD";

/// Reduce the current and previous billing rows into a [`ReportSummary`].
///
/// Returns `None` (no data) when either side has no rows at all. Rows without
/// groups still count as data, so a window with zero cost yields a summary
/// with a zero total.
pub fn aggregate(
    period: ReportingPeriod,
    window: DateWindow,
    previous_window: DateWindow,
    current: &[DailyCostRow],
    previous: &[DailyCostRow],
) -> Option<ReportSummary> {
    if current.is_empty() || previous.is_empty() {
        return None;
    }

    let mut categories: Vec<CategoryCost> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut slot = |name: &str, categories: &mut Vec<CategoryCost>| -> usize {
        *index.entry(name.to_string()).or_insert_with(|| {
            categories.push(CategoryCost {
                name: name.to_string(),
                current: Decimal::ZERO,
                previous: Decimal::ZERO,
            });
            categories.len() - 1
        })
    };

    for group in current.iter().flat_map(|row| &row.groups) {
        let i = slot(&group.category, &mut categories);
        categories[i].current += group.amount;
    }
    for group in previous.iter().flat_map(|row| &row.groups) {
        let i = slot(&group.category, &mut categories);
        categories[i].previous += group.amount;
    }

    let current_total = categories.iter().map(|c| c.current).sum();
    let previous_total = categories.iter().map(|c| c.previous).sum();

    Some(ReportSummary {
        period,
        window,
        previous_window,
        current_total,
        previous_total,
        unit: detect_unit(current),
        per_category: categories,
        account_id: None,
    })
}

fn detect_unit(rows: &[DailyCostRow]) -> String {
    rows.iter()
        .find_map(|row| row.groups.first())
        .map(|g| g.unit.clone())
        .unwrap_or_else(|| DEFAULT_UNIT.to_string())
}
