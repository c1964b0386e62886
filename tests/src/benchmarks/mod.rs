//! # Benchmarks
//!
//! | Subsystem | Operation | Target |
//! |-----------|-----------|--------|
//! | cc-01 Trust Validation | chain validation, depth 3 | < 1ms |
//! | cc-02 Signature Verification | detached verify incl. chain | < 1ms |
//! | cc-02 Signature Verification | embedded verify, note composite | < 5ms |

pub mod cc_01_trust;
pub mod cc_02_signature;
