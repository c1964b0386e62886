//! # Event Publishing Adapter
//!
//! Publishes the events of a committed operation to the shared bus. The
//! contract returns events as part of its outcome; nothing reaches the bus
//! for a failed operation.

use crate::domain::errors::TransferError;
use crate::domain::outcome::Outcome;
use shared_bus::EventPublisher;
use std::sync::Arc;
use tracing::debug;

/// Forwards operation outcomes to an [`EventPublisher`].
pub struct EventPublishingAdapter<P: EventPublisher> {
    publisher: Arc<P>,
}

impl<P: EventPublisher> EventPublishingAdapter<P> {
    pub fn new(publisher: Arc<P>) -> Self {
        Self { publisher }
    }

    /// Publish every event of `outcome`, returning how many receivers got
    /// them in total.
    pub async fn publish<T>(&self, outcome: &Outcome<T>) -> usize {
        let mut delivered = 0;
        for event in &outcome.events {
            delivered += self.publisher.publish(event.clone()).await;
        }
        if !outcome.events.is_empty() {
            debug!(events = outcome.events.len(), delivered, "Outcome published");
        }
        delivered
    }

    /// Publish the events of a successful operation and hand back its value.
    pub async fn forward<T>(
        &self,
        result: Result<Outcome<T>, TransferError>,
    ) -> Result<T, TransferError> {
        let outcome = result?;
        self.publish(&outcome).await;
        Ok(outcome.value)
    }

    #[must_use]
    pub fn publisher(&self) -> &P {
        &self.publisher
    }
}
