//! # Integration Flows
//!
//! Cross-crate scenarios: trust validation, signature verification and the
//! contract running together, plus the runtime host in front of them.

pub mod custody_flow;
pub mod delivery_notes;
pub mod runtime_host;
pub mod trust_failures;
