//! # Trust Errors
//!
//! Error types for certificate parsing and chain validation.

use super::entities::CertificateSerial;
use shared_types::{ContractError, FailureKind, Timestamp};
use thiserror::Error;

/// Why a certification path was rejected.
///
/// Every variant means "reject"; the distinction exists for diagnostics.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainFailure {
    /// The path ends at a self-signed certificate that is not a trust anchor.
    #[error("Untrusted: {0}")]
    Untrusted(String),

    /// A certificate on the path is outside its validity window.
    #[error("Expired: {subject} is valid from {not_before} to {not_after}, checked at {at}")]
    Expired {
        subject: String,
        not_before: Timestamp,
        not_after: Timestamp,
        at: Timestamp,
    },

    /// A certificate on the path is listed in its issuer's CRL.
    #[error("Revoked: serial {serial} issued by {issuer} revoked at {revoked_at}")]
    Revoked {
        serial: CertificateSerial,
        issuer: String,
        revoked_at: Timestamp,
    },

    /// No issuer could be found for some certificate on the path.
    #[error("Path build failed: {0}")]
    PathBuildFailed(String),

    /// No current CRL signed by the issuer was supplied.
    #[error("Revocation status unknown: {0}")]
    RevocationUnknown(String),
}

impl ChainFailure {
    /// Map to the contract failure taxonomy.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Expired { .. } => FailureKind::ChainExpired,
            Self::Revoked { .. } => FailureKind::ChainRevoked,
            Self::Untrusted(_) | Self::PathBuildFailed(_) | Self::RevocationUnknown(_) => {
                FailureKind::ChainUntrusted
            }
        }
    }
}

/// Errors from certificate handling and the trust context.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrustError {
    /// DER certificate could not be decoded.
    #[error("Malformed certificate: {0}")]
    MalformedCertificate(String),

    /// DER CRL could not be decoded.
    #[error("Malformed revocation list: {0}")]
    MalformedRevocationList(String),

    /// Key or signature algorithm outside the supported set.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Public or private key bytes are invalid.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The declared algorithm does not match the key type.
    #[error("Signature algorithm does not match key type")]
    AlgorithmMismatch,

    /// The signature bytes did not verify.
    #[error("Signature verification failed")]
    BadSignature,

    /// A serial reference could not be parsed.
    #[error("Invalid serial number: {0}")]
    InvalidSerial(String),

    /// Two certificates in the signer table share a serial.
    #[error("Duplicate certificate serial: {0}")]
    DuplicateSerial(CertificateSerial),

    /// No certificate with this serial is loaded.
    #[error("Unknown certificate: {0}")]
    UnknownCertificate(CertificateSerial),

    /// A subject attribute needed for the party identity is absent.
    #[error("Missing identity attribute: {0}")]
    MissingAttribute(&'static str),

    /// The certification path was rejected.
    #[error(transparent)]
    Chain(#[from] ChainFailure),
}

impl TrustError {
    /// Map to the contract failure taxonomy.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Chain(failure) => failure.failure_kind(),
            Self::InvalidSerial(_) | Self::MissingAttribute(_) => FailureKind::InputIncomplete,
            Self::DuplicateSerial(_) => FailureKind::DataCorrupt,
            Self::MalformedCertificate(_)
            | Self::MalformedRevocationList(_)
            | Self::UnsupportedAlgorithm(_)
            | Self::InvalidKey(_)
            | Self::AlgorithmMismatch
            | Self::BadSignature
            | Self::UnknownCertificate(_) => FailureKind::InvalidSignature,
        }
    }
}

impl From<TrustError> for ContractError {
    fn from(err: TrustError) -> Self {
        ContractError::new(err.failure_kind(), err.to_string())
    }
}

impl From<ChainFailure> for ContractError {
    fn from(failure: ChainFailure) -> Self {
        ContractError::new(failure.failure_kind(), failure.to_string())
    }
}
