//! WebSocket layer: the live notification feed.
//!
//! `GET /ws` upgrades to a WebSocket. Clients follow accounts by id and
//! receive every [`MarketEvent`](crate::domain::MarketEvent) whose audience
//! includes one of them.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
