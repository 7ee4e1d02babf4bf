//! Database rows read back from PostgreSQL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row of the `ledger_snapshots` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredSnapshot {
    /// Auto-increment row ID.
    pub id: i64,
    /// Records captured.
    pub record_count: i64,
    /// Serialized [`LedgerSnapshot`](crate::domain::LedgerSnapshot).
    pub state_json: serde_json::Value,
    /// Snapshot timestamp.
    pub snapshot_at: DateTime<Utc>,
}
