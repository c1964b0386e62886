//! # Embedded XML Signatures
//!
//! Parsing, canonicalization and verification of enveloped and detached
//! XML-DSig signature blocks, plus a signer producing them.

pub mod algorithms;
pub mod c14n;
pub mod document;
pub mod dsig;
pub mod keys;
pub mod signer;
pub mod verify;
