//! HTTP push broker client.
//!
//! Posts a topic message in the Firebase Cloud Messaging v1 shape:
//!
//! ```json
//! {"message": {"topic": "sensor_alerts",
//!              "notification": {"title": "Sensor Alert", "body": "..."}}}
//! ```
//!
//! The access token is sent as a bearer token when configured.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use super::{Notification, NotificationDispatcher};
use crate::config::NotificationConfig;
use crate::error::DispatchError;

pub struct PushDispatcher {
    endpoint: String,
    access_token: Option<String>,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PushPayload<'a> {
    message: PushMessage<'a>,
}

#[derive(Debug, Serialize, PartialEq)]
struct PushMessage<'a> {
    topic: &'a str,
    notification: PushNotification<'a>,
}

#[derive(Debug, Serialize, PartialEq)]
struct PushNotification<'a> {
    title: &'a str,
    body: &'a str,
}

impl PushDispatcher {
    /// Builds a dispatcher from the `[notification]` config section.
    ///
    /// Fails if no endpoint is configured. A blank endpoint or token counts
    /// as unset.
    pub fn from_config(config: &NotificationConfig) -> Result<Self, DispatchError> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| DispatchError::NotConfigured("notification.endpoint is not set".to_string()))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint,
            access_token: config.access_token.clone().filter(|t| !t.trim().is_empty()),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn payload(notification: &Notification) -> PushPayload<'_> {
        PushPayload {
            message: PushMessage {
                topic: &notification.topic,
                notification: PushNotification {
                    title: &notification.title,
                    body: &notification.body,
                },
            },
        }
    }
}

impl NotificationDispatcher for PushDispatcher {
    fn send(&self, notification: &Notification) -> Result<(), DispatchError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&Self::payload(notification));
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(component = "notify", topic = %notification.topic, "push notification accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_matches_topic_message_shape() {
        let notification = Notification {
            title: "Sensor Alert".to_string(),
            body: "PH level out of range: 9.0 (allowed 6.5 to 8.5)".to_string(),
            topic: "sensor_alerts".to_string(),
        };
        let json = serde_json::to_value(PushDispatcher::payload(&notification)).unwrap();
        assert_eq!(json["message"]["topic"], "sensor_alerts");
        assert_eq!(json["message"]["notification"]["title"], "Sensor Alert");
        assert_eq!(
            json["message"]["notification"]["body"],
            "PH level out of range: 9.0 (allowed 6.5 to 8.5)"
        );
    }

    #[test]
    fn test_missing_endpoint_is_not_configured() {
        let config = NotificationConfig {
            endpoint: None,
            ..NotificationConfig::default()
        };
        let result = PushDispatcher::from_config(&config);
        assert!(matches!(result, Err(DispatchError::NotConfigured(_))));
    }

    #[test]
    fn test_blank_endpoint_is_not_configured() {
        for endpoint in ["", "  "] {
            let config = NotificationConfig {
                endpoint: Some(endpoint.to_string()),
                ..NotificationConfig::default()
            };
            let result = PushDispatcher::from_config(&config);
            assert!(
                matches!(result, Err(DispatchError::NotConfigured(_))),
                "endpoint {endpoint:?} should not enable push delivery"
            );
        }
    }
}
