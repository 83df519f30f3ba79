/// Structured logging for the water-quality monitoring service.
///
/// Events go through `tracing` with a `component` field naming the part of
/// the pipeline they came from, plus the metric where one applies. Output is
/// human-readable by default or JSON lines for log shippers.

use std::fmt;

use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

use crate::error::{DispatchError, StoreError};

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Ingest,
    Thresholds,
    Notify,
    Sink,
    System,
}

impl Component {
    pub fn as_str(self) -> &'static str {
        match self {
            Component::Ingest => "ingest",
            Component::Thresholds => "thresholds",
            Component::Notify => "notify",
            Component::Sink => "sink",
            Component::System => "system",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Deployment choice, e.g. push delivery not configured.
    Expected,
    /// Service degradation: database down, broker rejecting requests.
    Unexpected,
    /// Data problem an operator has to fix, e.g. a missing threshold row.
    Configuration,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Configuration => write!(f, "CONFIGURATION"),
        }
    }
}

pub fn classify_store_failure(err: &StoreError) -> FailureType {
    match err {
        StoreError::MissingThreshold(_) | StoreError::AmbiguousFlag { .. } => {
            FailureType::Configuration
        }
        StoreError::Postgres(_) | StoreError::Unavailable(_) => FailureType::Unexpected,
    }
}

pub fn classify_dispatch_failure(err: &DispatchError) -> FailureType {
    match err {
        DispatchError::NotConfigured(_) => FailureType::Expected,
        DispatchError::Http(_) | DispatchError::Rejected { .. } => FailureType::Unexpected,
    }
}

// ---------------------------------------------------------------------------
// Subscriber setup
// ---------------------------------------------------------------------------

/// Installs the global subscriber. `RUST_LOG` overrides `default_level`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},tower_http=info")));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_err() {
        debug!(component = "system", "logger already initialized");
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a store failure with automatic classification.
pub fn log_store_failure(component: Component, operation: &str, err: &StoreError) {
    let failure_type = classify_store_failure(err);
    match failure_type {
        FailureType::Expected => {
            debug!(component = %component, %failure_type, "{operation} failed: {err}")
        }
        FailureType::Configuration => {
            warn!(component = %component, %failure_type, "{operation} failed: {err}")
        }
        FailureType::Unexpected => {
            error!(component = %component, %failure_type, "{operation} failed: {err}")
        }
    }
}

/// Log a failed notification along with what it was trying to say, so the
/// alert text is not lost when the broker is down.
pub fn log_dispatch_failure(err: &DispatchError, alerts: &[String]) {
    let failure_type = classify_dispatch_failure(err);
    let body = alerts.join(" | ");
    match failure_type {
        FailureType::Expected => debug!(
            component = %Component::Notify,
            %failure_type,
            alerts = %body,
            "notification not sent: {err}"
        ),
        _ => error!(
            component = %Component::Notify,
            %failure_type,
            alerts = %body,
            "notification failed: {err}"
        ),
    }
}
