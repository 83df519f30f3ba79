//! Water-quality sensor ingestion and alerting service.
//!
//! Sensors post PH, temperature and turbidity readings to `POST /sensors`.
//! Each reading is checked against per-metric thresholds; a metric that
//! leaves its range triggers one push notification per excursion, and every
//! accepted reading is stored as the latest value.
//!
//! Module map:
//! - `model`, `metrics`: domain types and the metric registry
//! - `alert`: breach evaluation and debounce state
//! - `ingest`: request validation and the per-reading pipeline
//! - `store`, `notify`: threshold store, reading sink, push dispatcher
//! - `server`: axum routes
//! - `config`, `logging`, `error`: ambient plumbing
//! - `verify`, `dev_mode`: operator tooling

pub mod alert;
pub mod config;
pub mod dev_mode;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod notify;
pub mod server;
pub mod store;
pub mod verify;
