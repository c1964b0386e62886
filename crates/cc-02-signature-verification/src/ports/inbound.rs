//! # Inbound Ports
//!
//! The signature verification API.

use crate::domain::entities::{
    BatchVerificationResult, DetachedSignature, EmbeddedVerification, VerifiedSigner,
};
use crate::domain::errors::SignatureError;
use shared_types::Timestamp;

/// Detached and embedded signature verification.
///
/// Every accepted signature has also passed certificate chain validation
/// at `at`. Implementations must be thread-safe (`Send + Sync`).
pub trait SignatureVerificationApi: Send + Sync {
    // =========================================================================
    // Detached
    // =========================================================================

    /// Verify a signature over the exact payload bytes.
    fn verify_detached(
        &self,
        request: &DetachedSignature,
        at: Timestamp,
    ) -> Result<VerifiedSigner, SignatureError>;

    /// Verify many detached signatures in parallel. Results keep input order.
    fn verify_detached_batch(
        &self,
        requests: &[DetachedSignature],
        at: Timestamp,
    ) -> BatchVerificationResult;

    // =========================================================================
    // Embedded
    // =========================================================================

    /// Verify the single signature block embedded in `document`.
    fn verify_embedded(
        &self,
        document: &str,
        at: Timestamp,
    ) -> Result<EmbeddedVerification, SignatureError>;
}
