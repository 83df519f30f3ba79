/// Development mode: run the full pipeline without Postgres or a push broker.
///
/// Thresholds come from the config file (or registry defaults) and live in
/// memory, readings are kept in memory, and notifications are logged
/// instead of delivered.

use std::sync::Arc;

use tracing::info;

use crate::alert::BreachTracker;
use crate::config::ServiceConfig;
use crate::ingest::{IngestionHandler, NotificationTemplate};
use crate::notify::LogDispatcher;
use crate::store::MemoryStore;

pub struct DevMode {
    pub store: Arc<MemoryStore>,
}

impl DevMode {
    /// Seeds an in-memory store from `config`.
    pub fn new(config: &ServiceConfig) -> Self {
        let store = Arc::new(MemoryStore::with_thresholds(config.seed_thresholds()));
        info!(component = "system", "dev mode: in-memory store, notifications logged only");
        Self { store }
    }

    pub fn handler(&self, template: NotificationTemplate) -> IngestionHandler {
        IngestionHandler::new(
            self.store.clone(),
            self.store.clone(),
            Arc::new(LogDispatcher),
            Arc::new(BreachTracker::new()),
            template,
        )
    }
}
