//! # Trust Validation Service
//!
//! Implements [`TrustValidationApi`] over a shared, immutable
//! [`TrustContext`]. Batch validation fans out over rayon.

use crate::domain::certificate::Certificate;
use crate::domain::context::TrustContext;
use crate::domain::entities::{CertificateSerial, ValidatedChain};
use crate::domain::errors::{ChainFailure, TrustError};
use crate::domain::identity::PartyIdentity;
use crate::ports::inbound::TrustValidationApi;
use rayon::prelude::*;
use shared_types::Timestamp;
use std::sync::Arc;
use tracing::{debug, warn};

/// Batches below this size are validated sequentially.
const PARALLEL_THRESHOLD: usize = 4;

/// Trust validation over a fixed context.
#[derive(Debug, Clone)]
pub struct TrustValidationService {
    context: Arc<TrustContext>,
}

impl TrustValidationService {
    pub fn new(context: Arc<TrustContext>) -> Self {
        Self { context }
    }

    /// Shared handle to the context.
    #[must_use]
    pub fn shared_context(&self) -> Arc<TrustContext> {
        Arc::clone(&self.context)
    }
}

impl TrustValidationApi for TrustValidationService {
    fn context(&self) -> &TrustContext {
        &self.context
    }

    fn certificate(&self, serial: &CertificateSerial) -> Result<Arc<Certificate>, TrustError> {
        self.context.require_certificate(serial).map(Arc::clone)
    }

    fn validate_certificate(
        &self,
        certificate: &Certificate,
        at: Timestamp,
    ) -> Result<ValidatedChain, ChainFailure> {
        let result = self.context.validate(certificate, at);
        if let Err(failure) = &result {
            warn!(
                serial = %certificate.serial(),
                subject = certificate.subject_text(),
                %failure,
                "Certificate rejected"
            );
        }
        result
    }

    fn validate_serial(
        &self,
        serial: &CertificateSerial,
        at: Timestamp,
    ) -> Result<ValidatedChain, TrustError> {
        let certificate = self.context.require_certificate(serial)?;
        Ok(self.validate_certificate(certificate, at)?)
    }

    fn validate_batch(
        &self,
        serials: &[CertificateSerial],
        at: Timestamp,
    ) -> Vec<Result<ValidatedChain, TrustError>> {
        debug!(count = serials.len(), "Validating certificate batch");

        if serials.len() < PARALLEL_THRESHOLD {
            return serials
                .iter()
                .map(|serial| self.validate_serial(serial, at))
                .collect();
        }

        serials
            .par_iter()
            .map(|serial| self.validate_serial(serial, at))
            .collect()
    }

    fn party_identity(&self, serial: &CertificateSerial) -> Result<PartyIdentity, TrustError> {
        let certificate = self.context.require_certificate(serial)?;
        PartyIdentity::from_certificate(certificate)
    }
}
