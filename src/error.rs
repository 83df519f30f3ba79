//! Error types shared across the service.

use thiserror::Error;

use crate::model::Metric;

/// The incoming reading cannot be evaluated. Caller-correctable (HTTP 400).
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Request body is not valid JSON: {0}")]
    MalformedBody(String),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing required data fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Field {field} must be a number")]
    NotNumeric { field: &'static str },
}

/// Failures reading thresholds from, or writing readings to, the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Postgres(#[from] postgres::Error),

    #[error("No threshold configured for {0}")]
    MissingThreshold(Metric),

    #[error("Alerting flag for {metric} is ambiguous: {detail}")]
    AmbiguousFlag { metric: Metric, detail: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Failures delivering a push notification. Never surfaced to the caller.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Push broker rejected notification: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Dispatcher not configured: {0}")]
    NotConfigured(String),
}

/// Why one ingestion request did not complete.
///
/// Everything except `Validation` is collapsed into a generic failure at the
/// HTTP boundary.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to read thresholds: {0}")]
    UpstreamRead(#[source] StoreError),

    #[error("Failed to persist reading: {0}")]
    Persistence(#[source] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_lists_every_field() {
        let err = ValidationError::MissingFields(vec!["Temperature", "Turbidity"]);
        assert_eq!(
            err.to_string(),
            "Missing required data fields: Temperature, Turbidity"
        );
    }

    #[test]
    fn test_validation_converts_into_ingest_error() {
        let err: IngestError = ValidationError::NotAnObject.into();
        assert!(matches!(err, IngestError::Validation(ValidationError::NotAnObject)));
    }
}
