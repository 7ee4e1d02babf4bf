//! Persistence layer: PostgreSQL event log and ledger snapshots.
//!
//! The in-process [`Ledger`](crate::domain::Ledger) stays authoritative.
//! When enabled, [`worker::spawn_event_logger`] appends every published
//! event to the `events` table and [`worker::spawn_snapshotter`] stores
//! the whole ledger as JSONB; the latest snapshot is restored at startup.

pub mod models;
pub mod postgres;
pub mod worker;

pub use postgres::PostgresPersistence;
