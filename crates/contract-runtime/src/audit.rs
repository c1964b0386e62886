//! # Audit Log
//!
//! Writes every published ledger event to the log under the
//! `custody_audit` target, so `RUST_LOG=custody_audit=info` yields an
//! event trail without a listener process.

use shared_bus::Subscription;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::info;

/// Log the events of `subscription` until the bus is dropped. The task
/// returns how many events it logged.
pub fn spawn_audit_log(subscription: Subscription) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut events = subscription.into_stream();
        let mut logged = 0;
        while let Some(event) = events.next().await {
            logged += 1;
            info!(
                target: "custody_audit",
                event = event.name(),
                record = event.record_id(),
                payload = event.payload(),
                "Ledger event"
            );
        }
        logged
    })
}
