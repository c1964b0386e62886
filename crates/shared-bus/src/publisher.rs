//! # Event Publisher
//!
//! The sending half of the ledger event bus. Only committed operations
//! publish, so every event a subscriber sees describes ledger state that
//! exists.

use crate::events::{EventFilter, EventTopic, LedgerEvent};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

/// Destination for the events of committed contract operations.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one event, returning how many subscriptions were live.
    async fn publish(&self, event: LedgerEvent) -> usize;

    /// Events accepted since the publisher was created.
    fn events_published(&self) -> u64;
}

/// Broadcast bus shared by the runtime and its listeners.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<LedgerEvent>,
    /// Published events, per topic, in `EventTopic::RECORD_TOPICS` order.
    published: [AtomicU64; 3],
    capacity: usize,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// A bus that buffers up to `capacity` events per lagging subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            published: Default::default(),
            capacity,
        }
    }

    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, records = ?filter.record_ids, "Subscribed");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Follow every event about one waybill, note or registered asset.
    #[must_use]
    pub fn watch(&self, record_id: impl Into<String>) -> Subscription {
        self.subscribe(EventFilter::records(vec![record_id.into()]))
    }

    /// Events published on `topic`. `EventTopic::All` sums every topic.
    #[must_use]
    pub fn published_on(&self, topic: EventTopic) -> u64 {
        match topic_slot(topic) {
            Some(slot) => self.published[slot].load(Ordering::Relaxed),
            None => self.events_published(),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

fn topic_slot(topic: EventTopic) -> Option<usize> {
    EventTopic::RECORD_TOPICS.iter().position(|t| *t == topic)
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: LedgerEvent) -> usize {
        if let Some(slot) = topic_slot(event.topic()) {
            self.published[slot].fetch_add(1, Ordering::Relaxed);
        }
        let name = event.name();
        let record = event.record_id().to_string();

        // Sending fails only when nobody listens.
        let receivers = self.sender.send(event).unwrap_or(0);
        debug!(event = name, %record, receivers, "Event published");
        receivers
    }

    fn events_published(&self) -> u64 {
        self.published
            .iter()
            .map(|count| count.load(Ordering::Relaxed))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(id: &str) -> LedgerEvent {
        LedgerEvent::AssetCreated {
            asset_id: id.to_string(),
            payload: "{}".to_string(),
        }
    }

    fn advice(id: &str) -> LedgerEvent {
        LedgerEvent::AdviceAdded {
            note_id: id.to_string(),
            payload: "{}".to_string(),
        }
    }

    #[tokio::test]
    async fn test_publish_without_listeners() {
        let bus = InMemoryEventBus::new();

        assert_eq!(bus.publish(created("A1")).await, 0);
        assert_eq!(bus.events_published(), 1);
    }

    #[tokio::test]
    async fn test_every_subscription_counts_as_receiver() {
        let bus = InMemoryEventBus::new();
        let _all = bus.subscribe(EventFilter::all());
        let _notes = bus.subscribe(EventFilter::topics(vec![EventTopic::Notes]));

        // Filtering happens on the receiving side.
        assert_eq!(bus.publish(created("A1")).await, 2);
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_counts_per_topic() {
        let bus = InMemoryEventBus::new();
        bus.publish(created("A1")).await;
        bus.publish(created("A2")).await;
        bus.publish(advice("N1")).await;

        assert_eq!(bus.published_on(EventTopic::Custody), 2);
        assert_eq!(bus.published_on(EventTopic::Notes), 1);
        assert_eq!(bus.published_on(EventTopic::Register), 0);
        assert_eq!(bus.published_on(EventTopic::All), 3);
    }

    #[test]
    fn test_capacity() {
        assert_eq!(InMemoryEventBus::with_capacity(16).capacity(), 16);
        assert_eq!(InMemoryEventBus::new().capacity(), DEFAULT_CHANNEL_CAPACITY);
    }
}
