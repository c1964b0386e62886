//! # Custody-Chain Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs      # Three-organization consortium on one ledger
//! ├── benchmarks/      # Criterion suites per subsystem
//! │   ├── cc_01_trust.rs
//! │   └── cc_02_signature.rs
//! └── integration/     # Cross-crate flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p cc-tests
//!
//! # By category
//! cargo test -p cc-tests integration::
//!
//! # Benchmarks
//! cargo bench -p cc-tests
//! ```

#![allow(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod benchmarks;
pub mod fixtures;
pub mod integration;
