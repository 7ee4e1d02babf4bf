//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::StoredSnapshot;
use crate::config::ServiceConfig;
use crate::domain::{LedgerSnapshot, MarketEvent};
use crate::error::MarketError;

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool from configuration and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`MarketError::PersistenceError`] if the database is
    /// unreachable or a migration fails.
    pub async fn connect(config: &ServiceConfig) -> Result<Self, MarketError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| MarketError::PersistenceError(e.to_string()))?;
        tracing::info!("database migrations applied");
        Ok(Self::new(pool))
    }

    /// Appends an event to the event log.
    ///
    /// # Errors
    ///
    /// Returns a [`MarketError::PersistenceError`] on database or
    /// serialization failure.
    pub async fn save_event(&self, event: &MarketEvent) -> Result<i64, MarketError> {
        let payload =
            serde_json::to_value(event).map_err(|e| MarketError::Internal(e.to_string()))?;
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO events (subject_id, event_type, payload) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(event.subject_id())
        .bind(event.event_type_str())
        .bind(&payload)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Stores a snapshot of the whole ledger.
    ///
    /// # Errors
    ///
    /// Returns a [`MarketError::PersistenceError`] on database failure.
    pub async fn save_snapshot(&self, snapshot: &LedgerSnapshot) -> Result<i64, MarketError> {
        let state_json =
            serde_json::to_value(snapshot).map_err(|e| MarketError::Internal(e.to_string()))?;
        let record_count = i64::try_from(snapshot.record_count()).unwrap_or(i64::MAX);
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO ledger_snapshots (record_count, state_json) VALUES ($1, $2) RETURNING id",
        )
        .bind(record_count)
        .bind(&state_json)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Loads the most recent snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`MarketError::PersistenceError`] on database failure or
    /// if the stored JSON no longer matches the ledger layout.
    pub async fn load_latest_snapshot(&self) -> Result<Option<LedgerSnapshot>, MarketError> {
        let row = sqlx::query_as::<_, StoredSnapshot>(
            "SELECT id, record_count, state_json, snapshot_at FROM ledger_snapshots \
             ORDER BY snapshot_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let snapshot: LedgerSnapshot = serde_json::from_value(row.state_json)
            .map_err(|e| MarketError::PersistenceError(format!("snapshot {}: {e}", row.id)))?;
        tracing::info!(snapshot_id = row.id, records = row.record_count, taken_at = %row.snapshot_at, "loaded ledger snapshot");
        Ok(Some(snapshot))
    }

    /// Deletes snapshots older than the given number of days.
    ///
    /// # Errors
    ///
    /// Returns a [`MarketError::PersistenceError`] on database failure.
    pub async fn delete_old_snapshots(&self, before_days: u64) -> Result<u64, MarketError> {
        let age = i64::try_from(before_days)
            .ok()
            .and_then(chrono::Duration::try_days)
            .ok_or_else(|| MarketError::Validation(format!("retention of {before_days} days")))?;
        let cutoff = Utc::now() - age;

        let result = sqlx::query("DELETE FROM ledger_snapshots WHERE snapshot_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
