//! # Detached Verification
//!
//! Verifies a signature over an opaque byte message. The message is never
//! re-encoded: the signer's exact bytes must be supplied.
//!
//! ## Steps
//!
//! 1. Resolve the certificate by serial from the trust context's table.
//! 2. The declared algorithm must match the certificate's key type.
//! 3. Verify the signature over the message bytes.
//! 4. Validate the certificate's chain at the invocation time.

use super::entities::{BatchVerificationResult, DetachedSignature, VerifiedSigner};
use super::errors::SignatureError;
use cc_01_trust_validation::{TrustError, TrustValidationApi};
use rayon::prelude::*;
use shared_types::Timestamp;
use tracing::debug;

/// Verify one detached signature.
pub fn verify_detached<T>(
    trust: &T,
    request: &DetachedSignature,
    at: Timestamp,
) -> Result<VerifiedSigner, SignatureError>
where
    T: TrustValidationApi + ?Sized,
{
    let certificate = trust.certificate(&request.certificate_serial)?;
    let key = certificate.public_key();

    if !request.algorithm.accepts(key) {
        return Err(TrustError::AlgorithmMismatch.into());
    }
    key.verify(request.algorithm, &request.payload, &request.signature)?;

    trust
        .validate_certificate(&certificate, at)
        .map_err(TrustError::from)?;

    let signer = VerifiedSigner::from_certificate(&certificate)?;
    debug!(
        serial = %signer.serial,
        party = %signer.party_id,
        bytes = request.payload.len(),
        "Detached signature verified"
    );
    Ok(signer)
}

/// Verify many detached signatures in parallel.
pub fn batch_verify_detached<T>(
    trust: &T,
    requests: &[DetachedSignature],
    at: Timestamp,
) -> BatchVerificationResult
where
    T: TrustValidationApi + ?Sized,
{
    let results = requests
        .par_iter()
        .map(|request| verify_detached(trust, request, at))
        .collect();

    BatchVerificationResult::from_results(results)
}
