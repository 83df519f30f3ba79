/// Core data types for the water-quality monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O: readings, threshold ranges and per-metric evaluation
/// results only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// One of the three quantities every sensor reading carries.
///
/// The serialized names match the JSON keys the sensor posts and the keys
/// used in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "PH")]
    Ph,
    Temperature,
    Turbidity,
}

impl Metric {
    /// Fixed evaluation order. Nothing depends on it beyond the order of
    /// messages in a batched notification.
    pub const ALL: [Metric; 3] = [Metric::Ph, Metric::Temperature, Metric::Turbidity];

    /// JSON field name of this metric in an incoming reading.
    pub fn field_name(self) -> &'static str {
        match self {
            Metric::Ph => "PH",
            Metric::Temperature => "Temperature",
            Metric::Turbidity => "Turbidity",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Metric::Ph => 0,
            Metric::Temperature => 1,
            Metric::Turbidity => 2,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A validated sensor reading. All three metrics are always present.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub ph: f64,
    pub temperature: f64,
    pub turbidity: f64,
    pub received_at: DateTime<Utc>,
}

impl Reading {
    pub fn new(ph: f64, temperature: f64, turbidity: f64) -> Self {
        Self {
            ph,
            temperature,
            turbidity,
            received_at: Utc::now(),
        }
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Ph => self.ph,
            Metric::Temperature => self.temperature,
            Metric::Turbidity => self.turbidity,
        }
    }

    /// `(metric, value)` pairs in `Metric::ALL` order.
    pub fn fields(&self) -> [(Metric, f64); 3] {
        Metric::ALL.map(|m| (m, self.value(m)))
    }
}

// ---------------------------------------------------------------------------
// Threshold types
// ---------------------------------------------------------------------------

/// Allowed band for one metric.
///
/// `min <= max` is expected but not enforced here; `verify` reports
/// inverted ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRange {
    pub min: f64,
    pub max: f64,
}

impl ThresholdRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A value equal to either bound is in range. Only `v < min` or
    /// `v > max` is a breach.
    pub fn contains(&self, value: f64) -> bool {
        !(value < self.min || value > self.max)
    }
}

/// Range plus the alerting switch for one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricThresholds {
    pub range: ThresholdRange,
    pub alerting_enabled: bool,
}

/// Thresholds for every metric, read once per request.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSnapshot {
    entries: [MetricThresholds; 3],
}

impl ThresholdSnapshot {
    /// Builds a snapshot by asking `read` once per metric, stopping at the
    /// first error.
    pub fn try_from_fn<E>(
        mut read: impl FnMut(Metric) -> Result<MetricThresholds, E>,
    ) -> Result<Self, E> {
        Ok(Self {
            entries: [
                read(Metric::Ph)?,
                read(Metric::Temperature)?,
                read(Metric::Turbidity)?,
            ],
        })
    }

    pub fn get(&self, metric: Metric) -> &MetricThresholds {
        &self.entries[metric.index()]
    }
}

// ---------------------------------------------------------------------------
// Evaluation results
// ---------------------------------------------------------------------------

/// Outcome of checking one metric of one reading.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEvaluation {
    pub metric: Metric,
    pub value: f64,
    pub range: ThresholdRange,
    pub in_range: bool,
    pub alerting_enabled: bool,
    /// Set for every out-of-range value, whether or not alerting is enabled.
    pub message: Option<String>,
}

impl MetricEvaluation {
    /// Out of range and allowed to produce a notification.
    pub fn is_alert_eligible(&self) -> bool {
        !self.in_range && self.alerting_enabled
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
