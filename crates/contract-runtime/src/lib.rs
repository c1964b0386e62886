//! # Contract Runtime Library
//!
//! The host process of one peer, exposed as a library for tests.
//!
//! - `container/`: configuration, trust loading and wiring
//! - `host`: the JSON-lines invocation loop
//! - `audit`: ledger events written to the log

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod audit;
pub mod container;
pub mod host;

pub use container::{load_trust_context, ConfigError, ContractContainer, PeerContract, RuntimeConfig};
pub use audit::spawn_audit_log;
pub use host::{ContractHost, Response};
