//! Threshold breach evaluation.
//!
//! Pure: given a reading and a threshold snapshot, classify every metric.
//! Whether a breach actually produces a notification is decided later by
//! `alert::breach`, which owns the debounce state.

use crate::metrics;
use crate::model::{Metric, MetricEvaluation, Reading, ThresholdSnapshot};

/// Classifies each metric of `reading` against `snapshot`.
///
/// Results are in `Metric::ALL` order. Each metric is checked on its own;
/// no result depends on another metric's outcome.
pub fn evaluate(reading: &Reading, snapshot: &ThresholdSnapshot) -> Vec<MetricEvaluation> {
    Metric::ALL
        .iter()
        .map(|&metric| evaluate_metric(metric, reading.value(metric), snapshot))
        .collect()
}

fn evaluate_metric(metric: Metric, value: f64, snapshot: &ThresholdSnapshot) -> MetricEvaluation {
    let thresholds = snapshot.get(metric);
    let in_range = thresholds.range.contains(value);
    let message = (!in_range).then(|| breach_message(metric, value, thresholds.range.min, thresholds.range.max));

    MetricEvaluation {
        metric,
        value,
        range: thresholds.range,
        in_range,
        alerting_enabled: thresholds.alerting_enabled,
        message,
    }
}

/// Human-readable alert line, e.g.
/// `PH level out of range: 9.0 (allowed 6.5 to 8.5)`.
pub fn breach_message(metric: Metric, value: f64, min: f64, max: f64) -> String {
    let info = metrics::info(metric);
    let unit = info.unit;
    format!(
        "{} out of range: {}{unit} (allowed {}{unit} to {}{unit})",
        info.label,
        format_value(value),
        format_value(min),
        format_value(max),
    )
}

/// Whole numbers keep one decimal so `9` reads as `9.0`.
fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MetricThresholds, ThresholdRange};

    fn snapshot(alerting: [bool; 3]) -> ThresholdSnapshot {
        ThresholdSnapshot::try_from_fn::<()>(|m| {
            let range = match m {
                Metric::Ph => ThresholdRange::new(6.5, 8.5),
                Metric::Temperature => ThresholdRange::new(20.0, 30.0),
                Metric::Turbidity => ThresholdRange::new(0.0, 5.0),
            };
            Ok(MetricThresholds {
                range,
                alerting_enabled: alerting[m.index()],
            })
        })
        .unwrap()
    }

    fn eval_for(evals: &[MetricEvaluation], metric: Metric) -> &MetricEvaluation {
        evals.iter().find(|e| e.metric == metric).unwrap()
    }

    // --- Boundaries ---------------------------------------------------------

    #[test]
    fn test_values_exactly_at_bounds_are_in_range() {
        let snap = snapshot([true; 3]);
        let at_min = evaluate(&Reading::new(6.5, 20.0, 0.0), &snap);
        let at_max = evaluate(&Reading::new(8.5, 30.0, 5.0), &snap);
        for e in at_min.iter().chain(at_max.iter()) {
            assert!(e.in_range, "{} at a bound should be in range", e.metric);
            assert!(e.message.is_none());
            assert!(!e.is_alert_eligible());
        }
    }

    #[test]
    fn test_values_just_outside_bounds_breach() {
        let snap = snapshot([true; 3]);
        let evals = evaluate(&Reading::new(6.4, 30.1, 5.01), &snap);
        assert!(evals.iter().all(|e| !e.in_range && e.is_alert_eligible()));
    }

    // --- Alerting flag ------------------------------------------------------

    #[test]
    fn test_disabled_alerting_never_eligible() {
        let snap = snapshot([false, true, true]);
        let evals = evaluate(&Reading::new(12.0, 25.0, 1.0), &snap);
        let ph = eval_for(&evals, Metric::Ph);
        assert!(!ph.in_range, "classification still reports the breach");
        assert!(ph.message.is_some(), "message is still produced for logging");
        assert!(!ph.is_alert_eligible());
    }

    #[test]
    fn test_metrics_are_independent() {
        let snap = snapshot([true; 3]);
        let evals = evaluate(&Reading::new(9.0, 25.0, 1.0), &snap);
        assert_eq!(evals.len(), 3);
        assert!(!eval_for(&evals, Metric::Ph).in_range);
        assert!(eval_for(&evals, Metric::Temperature).in_range);
        assert!(eval_for(&evals, Metric::Turbidity).in_range);
    }

    // --- Messages -----------------------------------------------------------

    #[test]
    fn test_ph_message_keeps_decimal() {
        let msg = breach_message(Metric::Ph, 9.0, 6.5, 8.5);
        assert_eq!(msg, "PH level out of range: 9.0 (allowed 6.5 to 8.5)");
    }

    #[test]
    fn test_temperature_and_turbidity_carry_units() {
        let temp = breach_message(Metric::Temperature, 31.25, 20.0, 30.0);
        assert_eq!(
            temp,
            "Temperature out of range: 31.25°C (allowed 20.0°C to 30.0°C)"
        );
        let turb = breach_message(Metric::Turbidity, 7.0, 0.0, 5.0);
        assert_eq!(
            turb,
            "Turbidity out of range: 7.0 NTU (allowed 0.0 NTU to 5.0 NTU)"
        );
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let snap = snapshot([true; 3]);
        let reading = Reading::new(5.0, 35.0, 2.0);
        assert_eq!(evaluate(&reading, &snap), evaluate(&reading, &snap));
    }
}
