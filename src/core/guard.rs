use chrono::NaiveDate;
use tracing::warn;

use crate::core::aws::dynamodb::IdempotencyStore;
use crate::core::error::ReportError;
use crate::core::formatter::format_date;
use crate::core::period::ReportingPeriod;

/// Last-processed-date guard keyed by period.
///
/// This is a plain read-then-write with no locking: two concurrent
/// invocations for the same period can both pass `already_processed`.
pub struct IdempotencyGuard<'a> {
    store: &'a dyn IdempotencyStore,
}

impl<'a> IdempotencyGuard<'a> {
    pub fn new(store: &'a dyn IdempotencyStore) -> Self {
        Self { store }
    }

    /// True when the stored window end is on or after `window_end`.
    pub async fn already_processed(
        &self,
        period: ReportingPeriod,
        window_end: NaiveDate,
    ) -> Result<bool, ReportError> {
        let Some(raw) = self.store.get(period.id()).await? else {
            return Ok(false);
        };
        match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(last) => Ok(last >= window_end),
            Err(e) => {
                warn!(period = %period, value = %raw, error = %e, "Ignoring unparseable idempotency marker");
                Ok(false)
            }
        }
    }

    pub async fn mark_processed(
        &self,
        period: ReportingPeriod,
        window_end: NaiveDate,
    ) -> Result<(), ReportError> {
        self.store.put(period.id(), &format_date(window_end)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::MemoryStore;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[tokio::test]
    async fn empty_store_is_not_processed() {
        let store = MemoryStore::default();
        let guard = IdempotencyGuard::new(&store);
        assert!(!guard.already_processed(ReportingPeriod::Daily, d(14)).await.unwrap());
    }

    #[tokio::test]
    async fn same_or_later_marker_is_processed() {
        let store = MemoryStore::with("daily", "2024-03-14");
        let guard = IdempotencyGuard::new(&store);
        assert!(guard.already_processed(ReportingPeriod::Daily, d(14)).await.unwrap());
        assert!(guard.already_processed(ReportingPeriod::Daily, d(13)).await.unwrap());
        assert!(!guard.already_processed(ReportingPeriod::Daily, d(15)).await.unwrap());
    }

    #[tokio::test]
    async fn markers_are_kept_per_period() {
        let store = MemoryStore::with("weekly", "2024-03-14");
        let guard = IdempotencyGuard::new(&store);
        assert!(!guard.already_processed(ReportingPeriod::Daily, d(14)).await.unwrap());
        assert!(guard.already_processed(ReportingPeriod::Weekly, d(14)).await.unwrap());
    }

    #[tokio::test]
    async fn garbage_marker_is_treated_as_unprocessed() {
        let store = MemoryStore::with("daily", "yesterday");
        let guard = IdempotencyGuard::new(&store);
        assert!(!guard.already_processed(ReportingPeriod::Daily, d(14)).await.unwrap());
    }

    #[tokio::test]
    async fn mark_processed_writes_iso_date() {
        let store = MemoryStore::default();
        let guard = IdempotencyGuard::new(&store);
        guard.mark_processed(ReportingPeriod::Monthly, d(9)).await.unwrap();
        assert_eq!(store.value("monthly").as_deref(), Some("2024-03-09"));
        assert!(guard.already_processed(ReportingPeriod::Monthly, d(9)).await.unwrap());
    }
}
