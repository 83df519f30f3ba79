//! Ingestion handler: one reading through validation, evaluation, debounce,
//! dispatch and persistence.
//!
//! The handler is synchronous. Every collaborator it talks to does blocking
//! I/O, so the HTTP layer runs it on the blocking pool.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::alert::{self, BreachTracker};
use crate::error::IngestError;
use crate::ingest::validate;
use crate::logging::{self, Component};
use crate::model::Reading;
use crate::notify::{Notification, NotificationDispatcher};
use crate::store::{self, ReadingSink, ThresholdStore};

/// Title and topic stamped on every alert notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationTemplate {
    pub title: String,
    pub topic: String,
}

impl Default for NotificationTemplate {
    fn default() -> Self {
        Self {
            title: "Sensor Alert".to_string(),
            topic: "sensor_alerts".to_string(),
        }
    }
}

/// Result of a successfully processed reading.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    pub reading: Reading,
    /// Messages for metrics that started a new breach episode with this
    /// reading. Present even if delivering the notification failed.
    pub alerts: Vec<String>,
}

pub struct IngestionHandler {
    thresholds: Arc<dyn ThresholdStore>,
    sink: Arc<dyn ReadingSink>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    tracker: Arc<BreachTracker>,
    template: NotificationTemplate,
}

impl IngestionHandler {
    pub fn new(
        thresholds: Arc<dyn ThresholdStore>,
        sink: Arc<dyn ReadingSink>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        tracker: Arc<BreachTracker>,
        template: NotificationTemplate,
    ) -> Self {
        Self {
            thresholds,
            sink,
            dispatcher,
            tracker,
            template,
        }
    }

    /// Handles a raw request body.
    pub fn handle_body(&self, body: &[u8]) -> Result<IngestOutcome, IngestError> {
        let reading = validate::parse_body(body)?;
        self.process(reading)
    }

    /// Handles an already-parsed JSON reading.
    pub fn handle(&self, raw: &Value) -> Result<IngestOutcome, IngestError> {
        let reading = validate::validate_reading(raw)?;
        self.process(reading)
    }

    /// Steps after validation. A store read failure returns before any
    /// breach state changes or anything is persisted.
    pub fn process(&self, reading: Reading) -> Result<IngestOutcome, IngestError> {
        let snapshot = store::load_snapshot(self.thresholds.as_ref()).map_err(|e| {
            logging::log_store_failure(Component::Thresholds, "threshold read", &e);
            IngestError::UpstreamRead(e)
        })?;

        let mut alerts = Vec::new();
        for eval in alert::evaluate(&reading, &snapshot) {
            if eval.is_alert_eligible() {
                if self.tracker.observe(eval.metric, true) {
                    info!(component = "ingest", metric = %eval.metric, value = eval.value, "breach started");
                    alerts.extend(eval.message);
                } else {
                    debug!(component = "ingest", metric = %eval.metric, value = eval.value, "breach still active, suppressed");
                }
            } else if eval.in_range {
                // Recovery is tracked even while alerting is off for this metric.
                self.tracker.observe(eval.metric, false);
            } else if let Some(message) = &eval.message {
                debug!(component = "ingest", metric = %eval.metric, "alerting disabled: {message}");
            }
        }

        if !alerts.is_empty() {
            let notification = Notification {
                title: self.template.title.clone(),
                body: alerts.join("\n"),
                topic: self.template.topic.clone(),
            };
            if let Err(e) = self.dispatcher.send(&notification) {
                logging::log_dispatch_failure(&e, &alerts);
            }
        }

        self.sink.write_all(&reading).map_err(|e| {
            logging::log_store_failure(Component::Sink, "reading write", &e);
            IngestError::Persistence(e)
        })?;

        if !alerts.is_empty() {
            info!(component = "ingest", count = alerts.len(), "reading processed with new alerts");
        }

        Ok(IngestOutcome { reading, alerts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::BreachState;
    use crate::error::{DispatchError, StoreError};
    use crate::metrics;
    use crate::model::{Metric, ThresholdRange};
    use crate::notify::LogDispatcher;
    use crate::store::MemoryStore;
    use serde_json::json;

    struct UnavailableStore;

    impl ThresholdStore for UnavailableStore {
        fn get_range(&self, _metric: Metric) -> Result<ThresholdRange, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        fn get_alerting_enabled(&self, _metric: Metric) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    struct FailingDispatcher;

    impl NotificationDispatcher for FailingDispatcher {
        fn send(&self, _notification: &Notification) -> Result<(), DispatchError> {
            Err(DispatchError::Rejected {
                status: 503,
                body: "unavailable".to_string(),
            })
        }
    }

    #[test]
    fn test_threshold_read_failure_persists_nothing() {
        let sink = Arc::new(MemoryStore::new());
        let tracker = Arc::new(BreachTracker::new());
        let handler = IngestionHandler::new(
            Arc::new(UnavailableStore),
            sink.clone(),
            Arc::new(LogDispatcher),
            tracker.clone(),
            NotificationTemplate::default(),
        );

        let result = handler.handle(&json!({"PH": 9.0, "Temperature": 25.0, "Turbidity": 1.0}));

        assert!(matches!(result, Err(IngestError::UpstreamRead(_))));
        assert_eq!(sink.writes(), 0);
        assert_eq!(tracker.state(Metric::Ph), BreachState::Inactive);
    }

    #[test]
    fn test_dispatch_failure_still_persists_and_reports_alerts() {
        let store = Arc::new(MemoryStore::with_thresholds(metrics::default_thresholds()));
        let handler = IngestionHandler::new(
            store.clone(),
            store.clone(),
            Arc::new(FailingDispatcher),
            Arc::new(BreachTracker::new()),
            NotificationTemplate::default(),
        );

        let outcome = handler
            .handle(&json!({"PH": 9.0, "Temperature": 25.0, "Turbidity": 1.0}))
            .expect("dispatch failure must not fail the request");

        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(store.latest(Metric::Ph), Some(9.0));
    }
}
