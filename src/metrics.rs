/// Metric registry for the water-quality monitoring service.
///
/// Defines the display metadata for each monitored metric along with the
/// default thresholds used to seed an empty threshold store. This is the
/// single source of truth for metric labels and units; alert text and log
/// lines should reference metrics from here rather than hardcoding them.

use crate::model::{Metric, MetricThresholds, ThresholdRange};

// ---------------------------------------------------------------------------
// Metric metadata
// ---------------------------------------------------------------------------

/// Metadata for a single metric.
pub struct MetricInfo {
    pub metric: Metric,
    /// JSON key in an incoming reading.
    pub field_name: &'static str,
    /// Label used at the start of an alert message.
    pub label: &'static str,
    /// Unit appended to values in alert messages. Empty for PH.
    pub unit: &'static str,
    /// Range seeded into an empty store.
    pub default_range: ThresholdRange,
}

/// All monitored metrics, in evaluation order.
///
/// Default ranges suit a freshwater tank: near-neutral PH, tropical
/// temperature and clear water.
pub static METRIC_REGISTRY: &[MetricInfo] = &[
    MetricInfo {
        metric: Metric::Ph,
        field_name: "PH",
        label: "PH level",
        unit: "",
        default_range: ThresholdRange { min: 6.5, max: 8.5 },
    },
    MetricInfo {
        metric: Metric::Temperature,
        field_name: "Temperature",
        label: "Temperature",
        unit: "°C",
        default_range: ThresholdRange { min: 20.0, max: 30.0 },
    },
    MetricInfo {
        metric: Metric::Turbidity,
        field_name: "Turbidity",
        label: "Turbidity",
        unit: " NTU",
        default_range: ThresholdRange { min: 0.0, max: 5.0 },
    },
];

/// Looks up a metric by its JSON field name. Returns `None` if unknown.
pub fn find_metric(field_name: &str) -> Option<&'static MetricInfo> {
    METRIC_REGISTRY.iter().find(|m| m.field_name == field_name)
}

/// Registry entry for `metric`.
pub fn info(metric: Metric) -> &'static MetricInfo {
    &METRIC_REGISTRY[metric.index()]
}

/// Default thresholds with alerting enabled, in evaluation order.
pub fn default_thresholds() -> Vec<(Metric, MetricThresholds)> {
    METRIC_REGISTRY
        .iter()
        .map(|m| {
            (
                m.metric,
                MetricThresholds {
                    range: m.default_range,
                    alerting_enabled: true,
                },
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
