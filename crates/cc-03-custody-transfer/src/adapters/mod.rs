//! # Adapters Module
//!
//! - `memory`: in-memory [`AssetRegistry`](crate::ports::outbound::AssetRegistry)
//! - `time`: clocks
//! - `bus`: publishes operation events to the shared bus
//! - `operations`: operation table and name-based dispatch

pub mod bus;
pub mod memory;
pub mod operations;
pub mod time;

pub use bus::EventPublishingAdapter;
pub use memory::InMemoryAssetRegistry;
pub use operations::{dispatch, operation, Intent, Invocation, OperationSpec, OPERATIONS};
pub use time::{FixedTimeSource, SystemTimeSource};
