//! # Domain Layer
//!
//! Detached verification over opaque bytes and embedded verification over
//! XML documents. Certificates come from the trust subsystem.

pub mod detached;
pub mod entities;
pub mod errors;
pub mod xml;
