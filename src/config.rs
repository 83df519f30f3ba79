//! Service configuration.
//!
//! Loaded from a TOML file, then overridden from the environment (after
//! `.env` has been read by `main`). Every section is optional; a missing
//! config file yields the defaults below.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 5000
//!
//! [notification]
//! endpoint = "https://fcm.googleapis.com/v1/projects/my-project/messages:send"
//! topic = "sensor_alerts"
//! title = "Sensor Alert"
//! timeout_secs = 10
//!
//! [logging]
//! level = "info"
//! json = false
//!
//! [thresholds.PH]
//! min = 6.5
//! max = 8.5
//! alerting = true
//! ```

use std::collections::BTreeMap;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::ingest::NotificationTemplate;
use crate::metrics;
use crate::model::{Metric, MetricThresholds, ThresholdRange};

pub const DEFAULT_CONFIG_PATH: &str = "aquamon.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub notification: NotificationConfig,
    pub logging: LoggingConfig,
    pub database_url: Option<String>,
    /// Seed values for the threshold store, keyed by metric field name.
    /// Metrics not listed fall back to the registry defaults.
    pub thresholds: BTreeMap<String, ThresholdConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Resolves `host:port` to a bind address. `host` may be an IP literal
    /// or a name such as `localhost`; the first resolved address wins.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: "HOST".to_string(),
            value: self.host.clone(),
        };
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|_| invalid())?
            .next()
            .ok_or_else(invalid)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationConfig {
    /// Push broker URL. Without one, notifications are only logged.
    pub endpoint: Option<String>,
    /// Bearer token for the broker. Prefer `PUSH_ACCESS_TOKEN` over the file.
    pub access_token: Option<String>,
    pub topic: String,
    pub title: String,
    pub timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            access_token: None,
            topic: "sensor_alerts".to_string(),
            title: "Sensor Alert".to_string(),
            timeout_secs: 10,
        }
    }
}

impl NotificationConfig {
    pub fn template(&self) -> NotificationTemplate {
        NotificationTemplate {
            title: self.title.clone(),
            topic: self.topic.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// One `[thresholds.<METRIC>]` table. `alerting` must be a real boolean.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    pub min: f64,
    pub max: f64,
    pub alerting: bool,
}

impl ServiceConfig {
    /// Reads `path` if it exists, otherwise starts from defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        for key in config.thresholds.keys() {
            if metrics::find_metric(key).is_none() {
                return Err(ConfigError::InvalidValue {
                    key: "thresholds".to_string(),
                    value: key.clone(),
                });
            }
        }
        Ok(config)
    }

    /// Applies environment overrides. `lookup` is `std::env::var(..).ok()`
    /// in production and a map in tests. Blank values count as unset.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(url) = var("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(token) = var("PUSH_ACCESS_TOKEN") {
            self.notification.access_token = Some(token);
        }
        if let Some(endpoint) = var("PUSH_ENDPOINT") {
            self.notification.endpoint = Some(endpoint);
        }
        if let Some(host) = var("HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                value: port.clone(),
            })?;
        }
        Ok(())
    }

    /// Seed thresholds for every metric: configured values where present,
    /// registry defaults otherwise.
    pub fn seed_thresholds(&self) -> Vec<(Metric, MetricThresholds)> {
        metrics::default_thresholds()
            .into_iter()
            .map(|(metric, default)| {
                let thresholds = self
                    .thresholds
                    .get(metric.field_name())
                    .map(|t| MetricThresholds {
                        range: ThresholdRange::new(t.min, t.max),
                        alerting_enabled: t.alerting,
                    })
                    .unwrap_or(default);
                (metric, thresholds)
            })
            .collect()
    }

    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }
}
