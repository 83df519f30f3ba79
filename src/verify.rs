//! Threshold Store Verification Module
//!
//! Reads every metric's range and alerting flag from the configured store and
//! reports what an ingestion request would see. Run it with `--verify` after
//! editing thresholds in the database, before readings start arriving.
//!
//! The ingestion path never checks `min <= max`; an inverted range makes every
//! value a breach. This report is where that gets caught.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::model::{Metric, ThresholdRange};
use crate::store::ThresholdStore;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub results: Vec<MetricVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub partial: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricVerification {
    pub metric: Metric,
    pub status: VerificationStatus,
    pub range: Option<ThresholdRange>,
    pub alerting_enabled: Option<bool>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

impl VerificationReport {
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }
}

// ============================================================================
// Verification
// ============================================================================

/// Checks one metric.
///
/// - `Failed`: the range cannot be read, or `min > max`.
/// - `PartialSuccess`: the range is usable but the alerting flag cannot be
///   read, so ingestion will still fail for this metric.
/// - `Success`: both read cleanly.
pub fn verify_metric(store: &dyn ThresholdStore, metric: Metric) -> MetricVerification {
    let mut result = MetricVerification {
        metric,
        status: VerificationStatus::Failed,
        range: None,
        alerting_enabled: None,
        error_message: None,
    };

    match store.get_range(metric) {
        Ok(range) => {
            result.range = Some(range);
            if range.min > range.max {
                result.error_message = Some(format!(
                    "Inverted range: min {} is greater than max {}",
                    range.min, range.max
                ));
                return result;
            }
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
            return result;
        }
    }

    match store.get_alerting_enabled(metric) {
        Ok(enabled) => {
            result.alerting_enabled = Some(enabled);
            result.status = VerificationStatus::Success;
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
            result.status = VerificationStatus::PartialSuccess;
        }
    }

    result
}

/// Checks every metric and summarizes.
pub fn verify_thresholds(store: &dyn ThresholdStore) -> VerificationReport {
    let results: Vec<MetricVerification> = Metric::ALL
        .iter()
        .map(|&metric| verify_metric(store, metric))
        .collect();

    let count = |status: VerificationStatus| results.iter().filter(|r| r.status == status).count();
    let summary = VerificationSummary {
        total: results.len(),
        working: count(VerificationStatus::Success),
        partial: count(VerificationStatus::PartialSuccess),
        failed: count(VerificationStatus::Failed),
    };

    VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        results,
        summary,
    }
}

// ============================================================================
// Tests
// ============================================================================
