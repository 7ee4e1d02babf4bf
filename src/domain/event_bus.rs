//! Broadcast channel for domain events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Services
//! publish a [`MarketEvent`] for every ledger mutation once the write
//! guard is released. Two kinds of subscriber read it:
//!
//! - each `/ws` connection, which forwards the events whose audience it
//!   follows (see `ws::connection`);
//! - the PostgreSQL event logger (`persistence::worker::spawn_event_logger`),
//!   which appends every event to the `events` table.

use tokio::sync::broadcast;

use super::MarketEvent;

/// Broadcast bus for [`MarketEvent`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity
/// (default 10 000). When the ring buffer is full, the oldest events are
/// dropped for lagging receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<MarketEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    /// If there are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: MarketEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Publishes a batch of events in order.
    pub fn publish_all(&self, events: impl IntoIterator<Item = MarketEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
