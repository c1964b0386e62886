//! # Signature Errors
//!
//! Error types for detached and embedded signature verification.

use cc_01_trust_validation::TrustError;
use shared_types::{ContractError, FailureKind};
use thiserror::Error;

/// Errors that can occur during signature verification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The signed document is not well-formed XML (or declares a DTD).
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// The document must carry exactly one signature block.
    #[error("Expected exactly one Signature element, found {0}")]
    SignatureCount(usize),

    /// A mandatory element of the signature block is missing.
    #[error("Missing {0} element")]
    MissingElement(&'static str),

    /// A mandatory attribute is missing.
    #[error("Missing {attribute} attribute on {element}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// Canonicalization, digest, transform or signature method not supported.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Only `""` and `#id` references are accepted.
    #[error("Unsupported reference URI: {0:?}")]
    UnsupportedReference(String),

    /// No element carries the referenced id.
    #[error("Reference #{0} does not resolve to an element")]
    UnresolvedReference(String),

    /// More than one element carries the referenced id.
    #[error("Id {0:?} is carried by more than one element")]
    DuplicateId(String),

    /// Base64 content could not be decoded.
    #[error("Invalid base64 in {0}")]
    InvalidEncoding(&'static str),

    /// A recomputed reference digest differs from the declared one.
    #[error("Digest mismatch for reference {0:?}")]
    DigestMismatch(String),

    /// No key source in `KeyInfo` yields a usable key for the signature method.
    #[error("No key source matches the signature method")]
    NoMatchingKey,

    /// The signature value does not verify over the canonical `SignedInfo`.
    #[error("Signature value does not verify")]
    VerificationFailed,

    /// Certificate resolution, key check or chain validation failed.
    #[error(transparent)]
    Trust(#[from] TrustError),
}

impl SignatureError {
    /// Map to the contract failure taxonomy.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Trust(err) => err.failure_kind(),
            _ => FailureKind::InvalidSignature,
        }
    }
}

impl From<SignatureError> for ContractError {
    fn from(err: SignatureError) -> Self {
        ContractError::new(err.failure_kind(), err.to_string())
    }
}
