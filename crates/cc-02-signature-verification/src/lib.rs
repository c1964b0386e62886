//! # Signature Verification Subsystem (CC-02)
//!
//! Verifies detached signatures over opaque bytes and XML-DSig signatures
//! embedded in documents, resolving each signer certificate and handing it
//! to the trust subsystem for chain validation.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): detached verification, XML parsing,
//!   canonicalization, reference digests, key resolution, signing
//! - **Ports Layer** (`ports/`): the `SignatureVerificationApi` trait
//! - **Service Layer** (`service.rs`): the API over a shared trust validator
//!
//! ## Security Notes
//!
//! - Detached payloads are verified byte for byte, never re-encoded.
//! - Every reference digest and the signature value must pass; an
//!   unresolvable or ambiguous `#id` reference fails closed.
//! - Documents declaring a DTD are refused.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::detached::{batch_verify_detached, verify_detached};
pub use domain::entities::{
    BatchVerificationResult, DetachedSignature, EmbeddedVerification, VerifiedSigner,
};
pub use domain::errors::SignatureError;
pub use domain::xml::algorithms::{CanonicalizationMethod, DigestMethod, SignatureMethod};
pub use domain::xml::document::{
    element_id, parse, single_signature, strip_declaration, IdIndex,
};
pub use domain::xml::dsig::{ReferenceTarget, SignatureBlock};
pub use domain::xml::keys::{resolve_signer, KeySource};
pub use domain::xml::signer::{KeyInfoMode, XmlSigner};
pub use domain::xml::verify::verify_embedded;
pub use ports::inbound::SignatureVerificationApi;
pub use service::SignatureVerificationService;
