//! Anonymous usage counters.
//!
//! All counters live in one JSON object stored under [`AGGREGATE_KEY`]. Flat
//! metrics are top-level numbers; nested groups are top-level objects mapping
//! a sanitized key to a number:
//!
//! ```json
//! { "saveClicks": 4, "countries": { "de": 2, "us-ca": 1 } }
//! ```
//!
//! Counters only grow. The whole object is replaced by an authorized reset.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::error::AppError;

/// Store key holding the aggregate.
pub const AGGREGATE_KEY: &str = "counters_v1";

/// Largest delta accepted for one counter in one request.
pub const MAX_DELTA: f64 = 1e9;

static NESTED_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Flat metrics clients may increment.
pub const FLAT_METRICS: &[&str] = &[
    "pageViews",
    "saveClicks",
    "shareClicks",
    "shortLinksCreated",
    "shortLinksCopied",
    "sharedLinkOpens",
    "optimizeRuns",
    "calendarExports",
    "printClicks",
    "settingsOpened",
    "helpOpened",
    "resetClicks",
];

/// Groups clients may increment sanitized keys in.
pub const NESTED_GROUPS: &[&str] = &[
    "countries",
    "regions",
    "strategies",
    "features",
    "languages",
    "errors",
];

/// Names that can never be used as nested keys.
pub const RESERVED_KEYS: &[&str] = &["__proto__", "constructor", "prototype", "increments", "nested"];

/// One stored counter: a flat count or a group of counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CounterValue {
    Count(u64),
    Group(BTreeMap<String, u64>),
}

/// The persisted counter blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TelemetryAggregate(BTreeMap<String, CounterValue>);

/// Deltas that survived sanitizing, ready to merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetryBatch {
    pub flat: Vec<(String, u64)>,
    pub nested: Vec<(String, String, u64)>,
    /// Entries dropped for unknown names, bad keys or bad deltas.
    pub dropped: usize,
}

impl TelemetryBatch {
    pub fn is_empty(&self) -> bool {
        self.flat.is_empty() && self.nested.is_empty()
    }
}

impl TelemetryAggregate {
    /// Decodes a stored blob. Missing or corrupt data yields an empty aggregate.
    pub fn from_stored(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        match serde_json::from_str(raw) {
            Ok(aggregate) => aggregate,
            Err(e) => {
                tracing::warn!(error = %e, "Stored telemetry aggregate is corrupt, starting empty");
                Self::default()
            }
        }
    }

    /// Current value of a flat metric (0 if absent).
    pub fn count(&self, metric: &str) -> u64 {
        match self.0.get(metric) {
            Some(CounterValue::Count(n)) => *n,
            _ => 0,
        }
    }

    /// Current counts of a nested group.
    pub fn group(&self, name: &str) -> Option<&BTreeMap<String, u64>> {
        match self.0.get(name) {
            Some(CounterValue::Group(group)) => Some(group),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Adds a sanitized batch to the stored counts.
    ///
    /// New nested keys are dropped once their group holds `max_group_keys`
    /// entries; keys already present keep accumulating.
    pub fn merge(&mut self, batch: &TelemetryBatch, max_group_keys: usize) {
        for (metric, delta) in &batch.flat {
            let slot = self
                .0
                .entry(metric.clone())
                .or_insert(CounterValue::Count(0));
            match slot {
                CounterValue::Count(n) => *n = n.saturating_add(*delta),
                CounterValue::Group(_) => *slot = CounterValue::Count(*delta),
            }
        }

        for (group, key, delta) in &batch.nested {
            let slot = self
                .0
                .entry(group.clone())
                .or_insert_with(|| CounterValue::Group(BTreeMap::new()));
            if let CounterValue::Count(_) = slot {
                *slot = CounterValue::Group(BTreeMap::new());
            }
            let CounterValue::Group(counts) = slot else {
                continue;
            };

            let full = counts.len() >= max_group_keys;
            match counts.get_mut(key) {
                Some(n) => *n = n.saturating_add(*delta),
                None if !full => {
                    counts.insert(key.clone(), *delta);
                }
                None => {
                    tracing::debug!(%group, %key, "Nested telemetry group is full, dropping new key");
                }
            }
        }
    }
}

/// Allow-lists and bounds for incoming telemetry.
#[derive(Debug, Clone)]
pub struct TelemetryPolicy {
    pub flat_metrics: Vec<String>,
    pub nested_groups: Vec<String>,
    pub max_group_keys: usize,
    pub max_key_length: usize,
}

impl Default for TelemetryPolicy {
    fn default() -> Self {
        Self {
            flat_metrics: FLAT_METRICS.iter().map(|s| s.to_string()).collect(),
            nested_groups: NESTED_GROUPS.iter().map(|s| s.to_string()).collect(),
            max_group_keys: 200,
            max_key_length: 64,
        }
    }
}

impl TelemetryPolicy {
    /// Filters raw `increments` / `nested` maps down to acceptable deltas.
    ///
    /// Unknown names, malformed keys and bad deltas are dropped one by one;
    /// only a request with neither section is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when both sections are absent.
    pub fn sanitize(
        &self,
        increments: Option<&Map<String, Value>>,
        nested: Option<&Map<String, Value>>,
    ) -> Result<TelemetryBatch, AppError> {
        if increments.is_none() && nested.is_none() {
            return Err(AppError::bad_request(
                "Nothing to record",
                json!({ "hint": "send `increments` and/or `nested`" }),
            ));
        }

        let mut batch = TelemetryBatch::default();

        for (metric, value) in increments.into_iter().flatten() {
            match (self.flat_metrics.contains(metric), parse_delta(value)) {
                (true, Some(0)) => {}
                (true, Some(delta)) => batch.flat.push((metric.clone(), delta)),
                _ => batch.dropped += 1,
            }
        }

        for (group, entries) in nested.into_iter().flatten() {
            let Some(entries) = entries.as_object().filter(|_| self.nested_groups.contains(group))
            else {
                batch.dropped += 1;
                continue;
            };

            for (key, value) in entries {
                match (self.is_valid_nested_key(key), parse_delta(value)) {
                    (true, Some(0)) => {}
                    (true, Some(delta)) => batch.nested.push((group.clone(), key.clone(), delta)),
                    _ => batch.dropped += 1,
                }
            }
        }

        Ok(batch)
    }

    fn is_valid_nested_key(&self, key: &str) -> bool {
        !key.is_empty()
            && key.len() <= self.max_key_length
            && NESTED_KEY_REGEX.is_match(key)
            && !RESERVED_KEYS.contains(&key)
    }
}

/// Accepts finite numbers in `[0, MAX_DELTA]`; fractions are floored.
fn parse_delta(value: &Value) -> Option<u64> {
    let delta = value.as_f64()?;
    if !delta.is_finite() || !(0.0..=MAX_DELTA).contains(&delta) {
        return None;
    }
    Some(delta.floor() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_allow_lists_are_disjoint() {
        for metric in FLAT_METRICS {
            assert!(!NESTED_GROUPS.contains(metric));
        }
    }

    #[test]
    fn test_sanitize_requires_a_section() {
        let err = TelemetryPolicy::default().sanitize(None, None).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_sanitize_drops_unknown_and_invalid_flat_entries() {
        let increments = object(json!({
            "saveClicks": 2,
            "shareClicks": 1.9,
            "unknownMetric": 5,
            "pageViews": -1,
            "printClicks": 2e9,
            "helpOpened": "3",
            "resetClicks": 0
        }));

        let batch = TelemetryPolicy::default()
            .sanitize(Some(&increments), None)
            .unwrap();

        assert_eq!(
            batch.flat,
            vec![("saveClicks".to_string(), 2), ("shareClicks".to_string(), 1)]
        );
        assert_eq!(batch.dropped, 4);
    }

    #[test]
    fn test_sanitize_nested_keys() {
        let nested = object(json!({
            "countries": {
                "de": 1,
                "us-ca": 2,
                "has space": 1,
                "__proto__": 1,
                "constructor": 1,
                "x".repeat(65): 1
            },
            "notAGroup": { "a": 1 },
            "features": 3
        }));

        let batch = TelemetryPolicy::default().sanitize(None, Some(&nested)).unwrap();

        assert_eq!(
            batch.nested,
            vec![
                ("countries".to_string(), "de".to_string(), 1),
                ("countries".to_string(), "us-ca".to_string(), 2),
            ]
        );
        assert_eq!(batch.dropped, 6);
    }

    #[test]
    fn test_sanitize_nested_keys_are_ascii_only() {
        let nested = object(json!({
            "countries": { "de": 1, "münchen": 1, "日本": 1, "snake_case-1": 1 }
        }));

        let batch = TelemetryPolicy::default().sanitize(None, Some(&nested)).unwrap();

        let keys: Vec<&str> = batch.nested.iter().map(|(_, key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["de", "snake_case-1"]);
        assert_eq!(batch.dropped, 2);
    }

    #[test]
    fn test_merge_accumulates() {
        let mut aggregate = TelemetryAggregate::default();
        let batch = TelemetryBatch {
            flat: vec![("saveClicks".to_string(), 2)],
            nested: vec![("countries".to_string(), "de".to_string(), 1)],
            dropped: 0,
        };

        aggregate.merge(&batch, 200);
        aggregate.merge(&batch, 200);

        assert_eq!(aggregate.count("saveClicks"), 4);
        assert_eq!(aggregate.group("countries").unwrap()["de"], 2);
    }

    #[test]
    fn test_merge_caps_new_nested_keys_only() {
        let mut aggregate = TelemetryAggregate::default();
        let first = TelemetryBatch {
            nested: vec![
                ("countries".to_string(), "de".to_string(), 1),
                ("countries".to_string(), "fr".to_string(), 1),
            ],
            ..Default::default()
        };
        aggregate.merge(&first, 2);

        let second = TelemetryBatch {
            nested: vec![
                ("countries".to_string(), "de".to_string(), 5),
                ("countries".to_string(), "us".to_string(), 1),
            ],
            ..Default::default()
        };
        aggregate.merge(&second, 2);

        let countries = aggregate.group("countries").unwrap();
        assert_eq!(countries.len(), 2);
        assert_eq!(countries["de"], 6);
        assert!(!countries.contains_key("us"));
    }

    #[test]
    fn test_serialized_shape() {
        let mut aggregate = TelemetryAggregate::default();
        aggregate.merge(
            &TelemetryBatch {
                flat: vec![("saveClicks".to_string(), 4)],
                nested: vec![("countries".to_string(), "de".to_string(), 2)],
                dropped: 0,
            },
            200,
        );

        let value = serde_json::to_value(&aggregate).unwrap();
        assert_eq!(value, json!({ "saveClicks": 4, "countries": { "de": 2 } }));
    }

    #[test]
    fn test_corrupt_blob_reads_as_empty() {
        assert!(TelemetryAggregate::from_stored(Some("{not json")).is_empty());
        assert!(TelemetryAggregate::from_stored(Some("[1,2]")).is_empty());
        assert!(TelemetryAggregate::from_stored(None).is_empty());

        let stored = TelemetryAggregate::from_stored(Some(r#"{"saveClicks":3}"#));
        assert_eq!(stored.count("saveClicks"), 3);
    }
}
