//! # Shared Bus - Ledger Event Distribution
//!
//! Carries the named domain events that contract operations return, from the
//! runtime to whoever listens (audit log, client notification layer).
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐  Outcome { value, events }  ┌──────────────┐
//! │   Contract   │ ──────────────────────────→ │   Runtime    │
//! │  operation   │                             │ (after commit)│
//! └──────────────┘                             └──────┬───────┘
//!                                                     │ publish()
//!                                                     ▼
//!                                              ┌──────────────┐
//!                                              │  Event Bus   │ ──→ subscribe()
//!                                              └──────────────┘
//! ```
//!
//! Events are never published for failed or no-op operations.
//!
//! Listeners either pull from a [`Subscription`] (`recv`, `try_recv`) or
//! consume it as a stream with [`Subscription::into_stream`]; the runtime's
//! audit log does the latter.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, LedgerEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
