//! In-process threshold store and reading sink.
//!
//! Used by dev mode (no database) and by tests. Counts reads and writes so
//! tests can assert that a rejected request never touched the store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use super::{ReadingSink, ThresholdStore};
use crate::error::StoreError;
use crate::metrics;
use crate::model::{Metric, MetricThresholds, ThresholdRange};

#[derive(Debug, Default)]
pub struct MemoryStore {
    thresholds: Mutex<HashMap<Metric, MetricThresholds>>,
    latest: Mutex<HashMap<Metric, (f64, DateTime<Utc>)>>,
    threshold_reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Empty store: every threshold read fails with `MissingThreshold`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(entries: impl IntoIterator<Item = (Metric, MetricThresholds)>) -> Self {
        let store = Self::new();
        lock(&store.thresholds).extend(entries);
        store
    }

    pub fn set_range(&self, metric: Metric, range: ThresholdRange) {
        let mut thresholds = lock(&self.thresholds);
        thresholds
            .entry(metric)
            .and_modify(|t| t.range = range)
            .or_insert(MetricThresholds {
                range,
                alerting_enabled: true,
            });
    }

    /// Sets the flag, inserting the registry default range if `metric` has
    /// no row yet.
    pub fn set_alerting_enabled(&self, metric: Metric, enabled: bool) {
        let mut thresholds = lock(&self.thresholds);
        thresholds
            .entry(metric)
            .and_modify(|t| t.alerting_enabled = enabled)
            .or_insert(MetricThresholds {
                range: metrics::info(metric).default_range,
                alerting_enabled: enabled,
            });
    }

    /// Last persisted value for `metric`, if any.
    pub fn latest(&self, metric: Metric) -> Option<f64> {
        lock(&self.latest).get(&metric).map(|(value, _)| *value)
    }

    /// Number of `get_range` plus `get_alerting_enabled` calls so far.
    pub fn threshold_reads(&self) -> usize {
        self.threshold_reads.load(Ordering::SeqCst)
    }

    /// Number of single-metric writes so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn thresholds_for(&self, metric: Metric) -> Result<MetricThresholds, StoreError> {
        self.threshold_reads.fetch_add(1, Ordering::SeqCst);
        lock(&self.thresholds)
            .get(&metric)
            .copied()
            .ok_or(StoreError::MissingThreshold(metric))
    }
}

impl ThresholdStore for MemoryStore {
    fn get_range(&self, metric: Metric) -> Result<ThresholdRange, StoreError> {
        self.thresholds_for(metric).map(|t| t.range)
    }

    fn get_alerting_enabled(&self, metric: Metric) -> Result<bool, StoreError> {
        self.thresholds_for(metric).map(|t| t.alerting_enabled)
    }
}

impl ReadingSink for MemoryStore {
    fn write(&self, metric: Metric, value: f64, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        lock(&self.latest).insert(metric, (value, at));
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Reading;

    #[test]
    fn test_write_all_overwrites_previous_values() {
        let store = MemoryStore::new();
        store.write_all(&Reading::new(7.0, 25.0, 1.0)).unwrap();
        store.write_all(&Reading::new(7.5, 26.0, 2.0)).unwrap();
        assert_eq!(store.latest(Metric::Ph), Some(7.5));
        assert_eq!(store.latest(Metric::Temperature), Some(26.0));
        assert_eq!(store.latest(Metric::Turbidity), Some(2.0));
        assert_eq!(store.writes(), 6);
    }

    #[test]
    fn test_alerting_flag_can_be_toggled() {
        let store = MemoryStore::new();
        store.set_range(Metric::Ph, ThresholdRange::new(6.5, 8.5));
        assert!(store.get_alerting_enabled(Metric::Ph).unwrap());
        store.set_alerting_enabled(Metric::Ph, false);
        assert!(!store.get_alerting_enabled(Metric::Ph).unwrap());
    }

    #[test]
    fn test_alerting_flag_on_empty_store_inserts_default_range() {
        let store = MemoryStore::new();
        store.set_alerting_enabled(Metric::Turbidity, false);

        assert!(!store.get_alerting_enabled(Metric::Turbidity).unwrap());
        assert_eq!(
            store.get_range(Metric::Turbidity).unwrap(),
            ThresholdRange::new(0.0, 5.0)
        );
    }
}
