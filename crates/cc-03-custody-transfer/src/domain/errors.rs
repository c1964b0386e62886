//! # Transfer Errors
//!
//! Every failure of a contract operation. All of them are terminal: nothing
//! was written when one is returned.

use crate::ports::outbound::RegistryError;
use cc_01_trust_validation::TrustError;
use cc_02_signature_verification::SignatureError;
use shared_types::{ContractError, FailureKind, OrganizationId, Role};
use thiserror::Error;

/// Errors that can occur during a contract operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    /// A required argument is missing or empty.
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    /// An argument is present but unusable.
    #[error("Invalid input {name}: {reason}")]
    InvalidInput { name: &'static str, reason: String },

    /// No operation of that name exists.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// The record does not exist.
    #[error("{0} does not exist")]
    NotFound(String),

    /// The record already exists.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// The caller's role is not the one this step expects.
    #[error("For this action role must be {expected} but it was {actual}")]
    RoleMismatch { expected: Role, actual: Role },

    /// Caller, peer and party organizations disagree.
    #[error(
        "Client from org {caller} is not authorized to write at an org {peer} peer on behalf of {expected}"
    )]
    OrganizationMismatch {
        caller: OrganizationId,
        peer: OrganizationId,
        expected: OrganizationId,
    },

    /// The record is not in a status that allows the operation.
    #[error("{operation} is not allowed while {asset_id} is {status}")]
    WrongStatus {
        asset_id: String,
        status: String,
        operation: &'static str,
    },

    /// A valid signature from someone other than the expected party.
    #[error("Signed by {actual}, expected {expected}")]
    SignerMismatch { expected: String, actual: String },

    /// The signer is not a party to the record.
    #[error("{0} is not a party to this record")]
    NotAParty(String),

    /// The signed payload differs from the dispatched one.
    #[error("Signed payload differs from the dispatched payload of {0}")]
    PayloadMismatch(String),

    /// The owner signature covers a different name than the owner submitted.
    #[error("Signature covers a name other than owner {0}")]
    OwnerMismatch(String),

    /// A signature covers something other than the message it is attached to.
    #[error("Signature references {found}, expected {expected}")]
    ReferenceMismatch { expected: String, found: String },

    /// Signature verification failed.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// Certificate lookup or identity extraction failed.
    #[error(transparent)]
    Identity(#[from] TrustError),

    /// A stored record could not be decoded or encoded.
    #[error("Data error for {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// The registry failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl TransferError {
    /// Map to the contract failure taxonomy.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::EmptyInput(_) | Self::InvalidInput { .. } | Self::UnknownOperation(_) => {
                FailureKind::InputIncomplete
            }
            Self::NotFound(_) => FailureKind::NotFound,
            Self::AlreadyExists(_) => FailureKind::AlreadyExists,
            Self::RoleMismatch { .. }
            | Self::OrganizationMismatch { .. }
            | Self::WrongStatus { .. }
            | Self::SignerMismatch { .. }
            | Self::NotAParty(_) => FailureKind::AccessDenied,
            Self::PayloadMismatch(_)
            | Self::OwnerMismatch(_)
            | Self::ReferenceMismatch { .. } => {
                FailureKind::InvalidSignature
            }
            Self::Signature(err) => err.failure_kind(),
            Self::Identity(err) => err.failure_kind(),
            Self::Corrupt { .. } | Self::Registry(_) => FailureKind::DataCorrupt,
        }
    }

    pub(crate) fn corrupt(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::Corrupt {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<TransferError> for ContractError {
    fn from(err: TransferError) -> Self {
        ContractError::new(err.failure_kind(), err.to_string())
    }
}
