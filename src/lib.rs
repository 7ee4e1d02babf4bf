//! # welfare-ledger
//!
//! REST API and live notification feed for an animal-welfare donation and
//! adoption marketplace.
//!
//! Welfare organizations publish fundraising cases and adoption listings,
//! donors pay on-chain and file adoption requests, and doctors diagnose
//! reported emergencies. Every workflow step runs against one in-memory
//! ledger under a single lock, so its checks and effects land together;
//! the accompanying inbox messages never roll a step back.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)        identity from X-User-Id / X-User-Role
//!     ├── WS Handler (ws/)
//!     │
//!     ├── Services (service/)         adoption, donation, case, emergency, user
//!     ├── EventBus (domain/)
//!     │
//!     ├── Ledger (domain/)            users, cases, listings, requests, inbox
//!     │
//!     └── PostgreSQL Persistence      event log + periodic snapshots
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
