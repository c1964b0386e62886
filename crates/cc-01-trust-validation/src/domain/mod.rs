//! # Domain Layer
//!
//! Certificates, revocation lists, path validation and party identity.
//! Pure logic over immutable material; no I/O.

pub mod certificate;
pub mod chain;
pub mod context;
pub mod crl;
pub mod entities;
pub mod errors;
pub mod identity;
pub mod keys;
