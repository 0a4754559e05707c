//! Anonymous usage counter aggregation.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::telemetry::{AGGREGATE_KEY, TelemetryAggregate, TelemetryPolicy};
use crate::error::AppError;
use crate::infrastructure::kv::KvStore;
use crate::utils::retry::RetryPolicy;

/// Service owning the telemetry namespace.
///
/// All counters live in one JSON blob under [`AGGREGATE_KEY`]. Each post is a
/// read-merge-write; concurrent posts may lose increments, which is accepted
/// for anonymous counters.
pub struct TelemetryService {
    store: Arc<dyn KvStore>,
    policy: TelemetryPolicy,
    retry: RetryPolicy,
}

impl TelemetryService {
    pub fn new(store: Arc<dyn KvStore>, policy: TelemetryPolicy, retry: RetryPolicy) -> Self {
        Self {
            store,
            policy,
            retry,
        }
    }

    /// Sanitizes and merges a batch of deltas into the aggregate.
    ///
    /// Returns the number of entries that were dropped during sanitizing.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if both sections are absent
    /// - [`AppError::Internal`] if the store fails after retries
    pub async fn record(
        &self,
        increments: Option<&Map<String, Value>>,
        nested: Option<&Map<String, Value>>,
    ) -> Result<usize, AppError> {
        let batch = self.policy.sanitize(increments, nested)?;

        if batch.dropped > 0 {
            tracing::debug!(dropped = batch.dropped, "Dropped invalid telemetry entries");
        }

        metrics::counter!("telemetry_posts_total").increment(1);

        if batch.is_empty() {
            return Ok(batch.dropped);
        }

        let stored = self.load().await?;
        let mut aggregate = TelemetryAggregate::from_stored(stored.as_deref());
        aggregate.merge(&batch, self.policy.max_group_keys);

        let encoded = serde_json::to_string(&aggregate)
            .map_err(|e| AppError::internal(format!("telemetry encode failed: {e}")))?;
        self.save(&encoded).await?;

        Ok(batch.dropped)
    }

    /// Returns the current aggregate.
    ///
    /// Store failures degrade to an empty aggregate.
    pub async fn snapshot(&self) -> TelemetryAggregate {
        match self.load().await {
            Ok(stored) => TelemetryAggregate::from_stored(stored.as_deref()),
            Err(_) => {
                tracing::warn!("Serving empty telemetry aggregate after store failure");
                TelemetryAggregate::default()
            }
        }
    }

    /// Replaces the aggregate with an empty object.
    ///
    /// Authorization is checked by the caller.
    pub async fn reset(&self) -> Result<(), AppError> {
        self.save("{}").await?;
        tracing::info!("Telemetry aggregate reset");
        Ok(())
    }

    async fn load(&self) -> Result<Option<String>, AppError> {
        let store = self.store.as_ref();
        self.retry
            .run(move || store.get(AGGREGATE_KEY))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Telemetry read failed after retries");
                AppError::from(e)
            })
    }

    async fn save(&self, encoded: &str) -> Result<(), AppError> {
        let store = self.store.as_ref();
        self.retry
            .run(move || store.put(AGGREGATE_KEY, encoded))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Telemetry write failed after retries");
                AppError::from(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::kv::{MemoryKv, MockKvStore, StoreError};
    use serde_json::json;
    use std::time::Duration;

    fn service(store: Arc<dyn KvStore>) -> TelemetryService {
        TelemetryService::new(
            store,
            TelemetryPolicy::default(),
            RetryPolicy {
                attempts: 2,
                delay: Duration::from_millis(1),
            },
        )
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_increments_accumulate() {
        let service = service(Arc::new(MemoryKv::new()));
        let increments = object(json!({ "saveClicks": 2 }));

        service.record(Some(&increments), None).await.unwrap();
        service.record(Some(&increments), None).await.unwrap();

        assert_eq!(service.snapshot().await.count("saveClicks"), 4);
    }

    #[tokio::test]
    async fn test_invalid_entries_are_dropped_not_fatal() {
        let service = service(Arc::new(MemoryKv::new()));
        let increments = object(json!({
            "saveClicks": 1,
            "bogusMetric": 5,
            "printClicks": -3,
        }));
        let nested = object(json!({
            "countries": { "US": 2, "__proto__": 1 },
            "unknownGroup": { "x": 1 },
        }));

        let dropped = service
            .record(Some(&increments), Some(&nested))
            .await
            .unwrap();
        assert_eq!(dropped, 4);

        let aggregate = service.snapshot().await;
        assert_eq!(aggregate.count("saveClicks"), 1);
        assert_eq!(aggregate.count("printClicks"), 0);
        assert_eq!(aggregate.group("countries").unwrap().get("US"), Some(&2));
        assert!(aggregate.group("unknownGroup").is_none());
    }

    #[tokio::test]
    async fn test_missing_sections_rejected_without_store_access() {
        let mut mock = MockKvStore::new();
        mock.expect_get().times(0);
        mock.expect_put().times(0);

        let result = service(Arc::new(mock)).record(None, None).await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_record_surfaces_store_failure() {
        let mut mock = MockKvStore::new();
        mock.expect_get()
            .times(2)
            .returning(|_| Err(StoreError::Connection("refused".to_string())));
        mock.expect_put().times(0);

        let increments = object(json!({ "pageViews": 1 }));
        let result = service(Arc::new(mock)).record(Some(&increments), None).await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_snapshot_tolerates_store_failure() {
        let mut mock = MockKvStore::new();
        mock.expect_get()
            .returning(|_| Err(StoreError::Connection("refused".to_string())));

        let aggregate = service(Arc::new(mock)).snapshot().await;
        assert!(aggregate.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_replaced() {
        let store = Arc::new(MemoryKv::new());
        store.put(AGGREGATE_KEY, "{not json").await.unwrap();
        let service = service(store.clone());

        let increments = object(json!({ "helpOpened": 3 }));
        service.record(Some(&increments), None).await.unwrap();

        let raw = store.get(AGGREGATE_KEY).await.unwrap().unwrap();
        assert_eq!(raw, r#"{"helpOpened":3}"#);
    }

    #[tokio::test]
    async fn test_reset_empties_aggregate() {
        let service = service(Arc::new(MemoryKv::new()));
        let increments = object(json!({ "pageViews": 10 }));
        service.record(Some(&increments), None).await.unwrap();

        service.reset().await.unwrap();

        assert!(service.snapshot().await.is_empty());
    }
}
