//! # Domain Entities
//!
//! Requests and results of signature verification.

use super::errors::SignatureError;
use cc_01_trust_validation::{Certificate, CertificateSerial, PartyIdentity, SignatureAlgorithm};
use serde::{Deserialize, Serialize};

/// A detached signature over an opaque message, bound to a certificate by
/// serial. The message bytes are verified exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetachedSignature {
    #[serde(with = "hex::serde")]
    pub payload: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
    pub certificate_serial: CertificateSerial,
    pub algorithm: SignatureAlgorithm,
}

/// The party behind an accepted signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedSigner {
    /// Serial of the signing certificate.
    pub serial: CertificateSerial,
    /// Canonical party id derived from the certificate.
    pub party_id: String,
    /// Subject facts the party id was derived from.
    pub identity: PartyIdentity,
}

impl VerifiedSigner {
    /// Describe the subject of `certificate`.
    pub fn from_certificate(certificate: &Certificate) -> Result<Self, SignatureError> {
        let identity = PartyIdentity::from_certificate(certificate)?;
        Ok(Self {
            serial: certificate.serial().clone(),
            party_id: identity.canonical_id()?,
            identity,
        })
    }
}

/// Result of verifying an embedded signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedVerification {
    pub signer: VerifiedSigner,
    /// Reference URIs covered by the signature, in document order.
    pub references: Vec<String>,
    /// Raw `SignatureValue` bytes.
    pub signature_value: Vec<u8>,
}

/// Result of a batch of detached verifications.
#[derive(Debug, Clone)]
pub struct BatchVerificationResult {
    /// Individual results, in request order.
    pub results: Vec<Result<VerifiedSigner, SignatureError>>,
    /// Whether all verifications passed.
    pub all_valid: bool,
    /// Count of accepted signatures.
    pub valid_count: usize,
    /// Count of rejected signatures.
    pub invalid_count: usize,
}

impl BatchVerificationResult {
    /// Create a batch result from individual results.
    pub fn from_results(results: Vec<Result<VerifiedSigner, SignatureError>>) -> Self {
        let valid_count = results.iter().filter(|r| r.is_ok()).count();
        let invalid_count = results.len() - valid_count;

        Self {
            results,
            all_valid: invalid_count == 0,
            valid_count,
            invalid_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_signature_json_shape() {
        let json = r#"{
            "payload": "cafe",
            "signature": "00ff",
            "certificateSerial": "0A",
            "algorithm": "ecdsa-secp256k1-sha256"
        }"#;
        let parsed: DetachedSignature = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.payload, vec![0xca, 0xfe]);
        assert_eq!(parsed.certificate_serial.as_str(), "0a");
        assert_eq!(parsed.algorithm, SignatureAlgorithm::EcdsaSecp256k1Sha256);
    }

    #[test]
    fn test_batch_counts() {
        let batch = BatchVerificationResult::from_results(vec![
            Err(SignatureError::VerificationFailed),
            Err(SignatureError::NoMatchingKey),
        ]);
        assert!(!batch.all_valid);
        assert_eq!(batch.valid_count, 0);
        assert_eq!(batch.invalid_count, 2);
    }
}
