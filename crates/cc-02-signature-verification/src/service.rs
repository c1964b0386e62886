//! # Signature Verification Service
//!
//! Implements [`SignatureVerificationApi`] by delegating to the domain layer
//! with a shared trust validator.

use crate::domain::detached;
use crate::domain::entities::{
    BatchVerificationResult, DetachedSignature, EmbeddedVerification, VerifiedSigner,
};
use crate::domain::errors::SignatureError;
use crate::domain::xml::verify;
use crate::ports::inbound::SignatureVerificationApi;
use cc_01_trust_validation::TrustValidationApi;
use shared_types::Timestamp;
use std::sync::Arc;
use tracing::{debug, warn};

/// Signature verification over a trust validator.
#[derive(Debug)]
pub struct SignatureVerificationService<T: TrustValidationApi> {
    trust: Arc<T>,
}

impl<T: TrustValidationApi> Clone for SignatureVerificationService<T> {
    fn clone(&self) -> Self {
        Self {
            trust: Arc::clone(&self.trust),
        }
    }
}

impl<T: TrustValidationApi> SignatureVerificationService<T> {
    pub fn new(trust: Arc<T>) -> Self {
        Self { trust }
    }

    /// The trust validator behind this service.
    #[must_use]
    pub fn trust(&self) -> &T {
        &self.trust
    }
}

impl<T: TrustValidationApi> SignatureVerificationApi for SignatureVerificationService<T> {
    fn verify_detached(
        &self,
        request: &DetachedSignature,
        at: Timestamp,
    ) -> Result<VerifiedSigner, SignatureError> {
        let result = detached::verify_detached(self.trust.as_ref(), request, at);
        if let Err(err) = &result {
            warn!(
                serial = %request.certificate_serial,
                kind = %err.failure_kind(),
                %err,
                "Detached signature rejected"
            );
        }
        result
    }

    fn verify_detached_batch(
        &self,
        requests: &[DetachedSignature],
        at: Timestamp,
    ) -> BatchVerificationResult {
        let batch = detached::batch_verify_detached(self.trust.as_ref(), requests, at);
        debug!(
            valid = batch.valid_count,
            invalid = batch.invalid_count,
            "Detached batch verified"
        );
        batch
    }

    fn verify_embedded(
        &self,
        document: &str,
        at: Timestamp,
    ) -> Result<EmbeddedVerification, SignatureError> {
        let result = verify::verify_embedded(self.trust.as_ref(), document, at);
        if let Err(err) = &result {
            warn!(kind = %err.failure_kind(), %err, "Embedded signature rejected");
        }
        result
    }
}
