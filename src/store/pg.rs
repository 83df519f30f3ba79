/// PostgreSQL-backed threshold store and reading sink.
///
/// Uses the synchronous `postgres` client. The client needs `&mut self`, so
/// it sits behind a mutex and every request takes it for the duration of one
/// query or one transaction. Callers on an async runtime must reach this
/// through `spawn_blocking`.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use postgres::{Client, NoTls};

use super::{ReadingSink, ThresholdStore};
use crate::error::StoreError;
use crate::model::{Metric, MetricThresholds, Reading, ThresholdRange};

const SCHEMA_SQL: &str = include_str!("../../sql/001_sensor_schema.sql");

pub struct PgStore {
    client: Mutex<Client>,
}

impl PgStore {
    /// Connects to `database_url` without TLS.
    pub fn connect(database_url: &str) -> Result<Self, StoreError> {
        let client = Client::connect(database_url, NoTls)?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client: Mutex::new(client),
        }
    }

    /// Creates the tables if they do not exist.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        self.client()?.batch_execute(SCHEMA_SQL)?;
        Ok(())
    }

    /// Inserts a threshold row for each metric that has none yet. Existing
    /// rows are left alone so values edited in the database win over config.
    ///
    /// Returns the number of rows inserted.
    pub fn seed_thresholds(
        &self,
        entries: &[(Metric, MetricThresholds)],
    ) -> Result<u64, StoreError> {
        let mut client = self.client()?;
        let mut tx = client.transaction()?;
        let mut inserted = 0;
        for (metric, thresholds) in entries {
            inserted += tx.execute(
                "INSERT INTO sensor_thresholds (metric, min_value, max_value, alerting_enabled)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (metric) DO NOTHING",
                &[
                    &metric.field_name(),
                    &thresholds.range.min,
                    &thresholds.range.max,
                    &thresholds.alerting_enabled,
                ],
            )?;
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Last persisted value and its timestamp for `metric`.
    pub fn latest(&self, metric: Metric) -> Result<Option<(f64, DateTime<Utc>)>, StoreError> {
        let row = self.client()?.query_opt(
            "SELECT value, updated_at FROM sensor_latest WHERE metric = $1",
            &[&metric.field_name()],
        )?;
        Ok(row.map(|r| (r.get(0), r.get(1))))
    }

    fn client(&self) -> Result<MutexGuard<'_, Client>, StoreError> {
        self.client
            .lock()
            .map_err(|_| StoreError::Unavailable("database client lock poisoned".to_string()))
    }
}

impl ThresholdStore for PgStore {
    fn get_range(&self, metric: Metric) -> Result<ThresholdRange, StoreError> {
        let row = self
            .client()?
            .query_opt(
                "SELECT min_value, max_value FROM sensor_thresholds WHERE metric = $1",
                &[&metric.field_name()],
            )?
            .ok_or(StoreError::MissingThreshold(metric))?;

        Ok(ThresholdRange::new(row.try_get(0)?, row.try_get(1)?))
    }

    fn get_alerting_enabled(&self, metric: Metric) -> Result<bool, StoreError> {
        let row = self
            .client()?
            .query_opt(
                "SELECT alerting_enabled FROM sensor_thresholds WHERE metric = $1",
                &[&metric.field_name()],
            )?
            .ok_or(StoreError::MissingThreshold(metric))?;

        let flag: Option<bool> = row.try_get(0)?;
        flag.ok_or_else(|| StoreError::AmbiguousFlag {
            metric,
            detail: "alerting_enabled is NULL".to_string(),
        })
    }
}

const UPSERT_LATEST: &str = "INSERT INTO sensor_latest (metric, value, updated_at)
     VALUES ($1, $2, $3)
     ON CONFLICT (metric) DO UPDATE
         SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at";

impl ReadingSink for PgStore {
    fn write(&self, metric: Metric, value: f64, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.client()?
            .execute(UPSERT_LATEST, &[&metric.field_name(), &value, &at])?;
        Ok(())
    }

    /// All three metrics in one transaction: either every value lands or none.
    fn write_all(&self, reading: &Reading) -> Result<(), StoreError> {
        let mut client = self.client()?;
        let mut tx = client.transaction()?;
        for (metric, value) in reading.fields() {
            tx.execute(
                UPSERT_LATEST,
                &[&metric.field_name(), &value, &reading.received_at],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
