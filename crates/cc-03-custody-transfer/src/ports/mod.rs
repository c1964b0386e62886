//! # Ports Layer
//!
//! - **Inbound (Driving)**: the contract operations
//! - **Outbound (Driven)**: the keyed record store and the clock

pub mod inbound;
pub mod outbound;
