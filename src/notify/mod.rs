//! Push notification dispatch.
//!
//! Delivery is best effort: one attempt per reading, failures are returned to
//! the caller to log and never retried.

pub mod push;

use tracing::info;

use crate::error::DispatchError;

pub use push::PushDispatcher;

/// One message for the push broker, broadcast to every subscriber of `topic`.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub topic: String,
}

pub trait NotificationDispatcher: Send + Sync {
    fn send(&self, notification: &Notification) -> Result<(), DispatchError>;
}

/// Logs notifications instead of delivering them. Used in dev mode and when
/// no push endpoint is configured.
#[derive(Debug, Default)]
pub struct LogDispatcher;

impl NotificationDispatcher for LogDispatcher {
    fn send(&self, notification: &Notification) -> Result<(), DispatchError> {
        info!(
            component = "notify",
            topic = %notification.topic,
            title = %notification.title,
            body = %notification.body,
            "push delivery disabled, notification logged only"
        );
        Ok(())
    }
}
