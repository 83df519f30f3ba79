//! Threshold store and reading sink.
//!
//! Both are external collaborators from the handler's point of view; the
//! traits here are the seam. `pg` backs a real deployment, `memory`
//! backs dev mode and tests.

pub mod memory;
pub mod pg;

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::model::{Metric, MetricThresholds, Reading, ThresholdRange, ThresholdSnapshot};

pub use memory::MemoryStore;
pub use pg::PgStore;

/// Read-only access to the configured ranges and alerting switches.
pub trait ThresholdStore: Send + Sync {
    fn get_range(&self, metric: Metric) -> Result<ThresholdRange, StoreError>;

    /// Must return an explicit boolean. Implementations reject missing or
    /// null flags instead of treating them as `false`.
    fn get_alerting_enabled(&self, metric: Metric) -> Result<bool, StoreError>;
}

/// Latest-value storage. Last write wins per metric.
pub trait ReadingSink: Send + Sync {
    fn write(&self, metric: Metric, value: f64, at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Writes every metric of `reading`. Implementations that can should do
    /// this atomically.
    fn write_all(&self, reading: &Reading) -> Result<(), StoreError> {
        for (metric, value) in reading.fields() {
            self.write(metric, value, reading.received_at)?;
        }
        Ok(())
    }
}

/// Reads range and flag for every metric, one call each.
pub fn load_snapshot(store: &dyn ThresholdStore) -> Result<ThresholdSnapshot, StoreError> {
    ThresholdSnapshot::try_from_fn(|metric| {
        Ok(MetricThresholds {
            range: store.get_range(metric)?,
            alerting_enabled: store.get_alerting_enabled(metric)?,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics;

    #[test]
    fn test_load_snapshot_reads_each_metric_once() {
        let store = MemoryStore::with_thresholds(metrics::default_thresholds());
        let snapshot = load_snapshot(&store).expect("seeded store should load");
        assert_eq!(store.threshold_reads(), 6, "one range and one flag read per metric");
        assert_eq!(snapshot.get(Metric::Ph).range, ThresholdRange::new(6.5, 8.5));
    }

    #[test]
    fn test_load_snapshot_fails_on_missing_metric() {
        let store = MemoryStore::new();
        let err = load_snapshot(&store).unwrap_err();
        assert!(matches!(err, StoreError::MissingThreshold(Metric::Ph)));
    }
}
