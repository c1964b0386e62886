//! # Trust Validation Subsystem (CC-01)
//!
//! Decides whether a signer certificate chains to a configured trust anchor
//! and is neither expired nor revoked at a given time.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): certificate and CRL parsing, path
//!   building, revocation and validity checks, party identity
//! - **Ports Layer** (`ports/`): the `TrustValidationApi` trait
//! - **Service Layer** (`service.rs`): the API over a shared `TrustContext`
//!
//! ## Security Notes
//!
//! - Revocation is fail-closed: a certificate whose issuer has no current
//!   CRL is rejected.
//! - Issuer candidates are matched by name *and* by signature, so a
//!   certificate that merely copies a CA's name never joins a path.
//! - Trust material is immutable once built.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export public API
pub use domain::certificate::Certificate;
pub use domain::chain::{validate_chain, MAX_PATH_DEPTH};
pub use domain::context::{TrustContext, TrustContextBuilder};
pub use domain::crl::RevocationList;
pub use domain::entities::{CertificateSerial, ValidatedChain};
pub use domain::errors::{ChainFailure, TrustError};
pub use domain::identity::{PartyIdentity, ENROLLMENT_ATTRIBUTES_OID};
pub use domain::keys::{PublicKey, SignatureAlgorithm, SigningKey};
pub use ports::inbound::TrustValidationApi;
pub use service::TrustValidationService;
