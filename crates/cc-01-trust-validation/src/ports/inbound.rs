//! # Inbound Ports
//!
//! The trust validation API.

use crate::domain::certificate::Certificate;
use crate::domain::context::TrustContext;
use crate::domain::entities::{CertificateSerial, ValidatedChain};
use crate::domain::errors::{ChainFailure, TrustError};
use crate::domain::identity::PartyIdentity;
use shared_types::Timestamp;
use std::sync::Arc;

/// Certificate lookup and certification path validation.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait TrustValidationApi: Send + Sync {
    /// The material validation runs against.
    fn context(&self) -> &TrustContext;

    /// Resolve a signer certificate by serial.
    fn certificate(&self, serial: &CertificateSerial) -> Result<Arc<Certificate>, TrustError>;

    /// Validate an already parsed certificate at `at`.
    fn validate_certificate(
        &self,
        certificate: &Certificate,
        at: Timestamp,
    ) -> Result<ValidatedChain, ChainFailure>;

    /// Resolve a signer by serial and validate its chain at `at`.
    fn validate_serial(
        &self,
        serial: &CertificateSerial,
        at: Timestamp,
    ) -> Result<ValidatedChain, TrustError>;

    /// Validate many serials at once. Results keep input order.
    fn validate_batch(
        &self,
        serials: &[CertificateSerial],
        at: Timestamp,
    ) -> Vec<Result<ValidatedChain, TrustError>>;

    /// Identity of the subject of a signer certificate.
    fn party_identity(&self, serial: &CertificateSerial) -> Result<PartyIdentity, TrustError>;
}
