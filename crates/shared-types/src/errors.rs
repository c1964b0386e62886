//! # Error Types
//!
//! The failure taxonomy returned by every contract operation.
//!
//! All failures are terminal and synchronous. Callers must treat the chain
//! sub-kinds identically (reject); they are kept apart only for diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// A required argument or attribute is missing or empty.
    #[serde(rename = "INCOMPLETE_INPUT")]
    InputIncomplete,
    /// The record does not exist.
    #[serde(rename = "ASSET_NOT_FOUND")]
    NotFound,
    /// The record already exists.
    #[serde(rename = "ASSET_ALREADY_EXISTS")]
    AlreadyExists,
    /// A signature failed to verify or could not be bound to a certificate.
    #[serde(rename = "INVALID_SIGNATURE")]
    InvalidSignature,
    /// The signer's chain does not lead to a trust anchor.
    #[serde(rename = "CHAIN_UNTRUSTED")]
    ChainUntrusted,
    /// A certificate in the signer's chain is revoked.
    #[serde(rename = "CHAIN_REVOKED")]
    ChainRevoked,
    /// A certificate in the signer's chain is outside its validity window.
    #[serde(rename = "CHAIN_EXPIRED")]
    ChainExpired,
    /// Role, organization or locality mismatch.
    #[serde(rename = "INVALID_ACCESS")]
    AccessDenied,
    /// A stored record could not be decoded.
    #[serde(rename = "DATA_ERROR")]
    DataCorrupt,
}

impl FailureKind {
    /// Stable code string.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InputIncomplete => "INCOMPLETE_INPUT",
            Self::NotFound => "ASSET_NOT_FOUND",
            Self::AlreadyExists => "ASSET_ALREADY_EXISTS",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::ChainUntrusted => "CHAIN_UNTRUSTED",
            Self::ChainRevoked => "CHAIN_REVOKED",
            Self::ChainExpired => "CHAIN_EXPIRED",
            Self::AccessDenied => "INVALID_ACCESS",
            Self::DataCorrupt => "DATA_ERROR",
        }
    }

    /// True for the certificate chain kinds.
    #[must_use]
    pub fn is_chain_failure(&self) -> bool {
        matches!(
            self,
            Self::ChainUntrusted | Self::ChainRevoked | Self::ChainExpired
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned across the contract boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {detail}")]
pub struct ContractError {
    /// Stable kind.
    pub kind: FailureKind,
    /// Free text for diagnostics.
    pub detail: String,
}

impl ContractError {
    /// Create an error of the given kind.
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Missing or empty argument.
    pub fn incomplete(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::InputIncomplete, detail)
    }

    /// Role, organization or locality mismatch.
    pub fn access_denied(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::AccessDenied, detail)
    }
}
