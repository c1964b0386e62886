//! # Trust Context
//!
//! Trust anchors, intermediates, CRL snapshots and the signer certificate
//! table, loaded once and never mutated. Refreshing material means building
//! a new context.

use super::certificate::Certificate;
use super::chain::validate_chain;
use super::crl::RevocationList;
use super::entities::{CertificateSerial, ValidatedChain};
use super::errors::{ChainFailure, TrustError};
use super::keys::PublicKey;
use shared_types::Timestamp;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use x509_cert::name::Name;

/// Immutable verification material.
#[derive(Debug, Clone, Default)]
pub struct TrustContext {
    anchors: Vec<Arc<Certificate>>,
    intermediates: Vec<Arc<Certificate>>,
    crls: Vec<Arc<RevocationList>>,
    certificates: HashMap<CertificateSerial, Arc<Certificate>>,
    by_key: HashMap<Vec<u8>, CertificateSerial>,
}

impl TrustContext {
    /// Start building a context.
    #[must_use]
    pub fn builder() -> TrustContextBuilder {
        TrustContextBuilder::default()
    }

    /// Signer certificate with this serial.
    #[must_use]
    pub fn certificate(&self, serial: &CertificateSerial) -> Option<&Arc<Certificate>> {
        self.certificates.get(serial)
    }

    /// Signer certificate with this serial, or `UnknownCertificate`.
    pub fn require_certificate(
        &self,
        serial: &CertificateSerial,
    ) -> Result<&Arc<Certificate>, TrustError> {
        self.certificate(serial)
            .ok_or_else(|| TrustError::UnknownCertificate(serial.clone()))
    }

    /// Signer certificate holding `key`.
    #[must_use]
    pub fn certificate_for_key(&self, key: &PublicKey) -> Option<&Arc<Certificate>> {
        self.by_key
            .get(&key.fingerprint())
            .and_then(|serial| self.certificates.get(serial))
    }

    /// Signer certificate with this serial whose issuer is `issuer`
    /// (RFC 4514 text).
    #[must_use]
    pub fn certificate_by_issuer_serial(
        &self,
        issuer: &str,
        serial: &CertificateSerial,
    ) -> Option<&Arc<Certificate>> {
        let issuer = Name::from_str(issuer).ok()?.to_string();
        self.certificate(serial)
            .filter(|cert| cert.issuer_text() == issuer)
    }

    /// Validate `leaf` against this context at `at`.
    pub fn validate(
        &self,
        leaf: &Certificate,
        at: Timestamp,
    ) -> Result<ValidatedChain, ChainFailure> {
        validate_chain(leaf, &self.intermediates, &self.anchors, &self.crls, at)
    }

    /// Trust anchors.
    #[must_use]
    pub fn anchors(&self) -> &[Arc<Certificate>] {
        &self.anchors
    }

    /// Intermediate CA certificates.
    #[must_use]
    pub fn intermediates(&self) -> &[Arc<Certificate>] {
        &self.intermediates
    }

    /// CRL snapshots.
    #[must_use]
    pub fn revocation_lists(&self) -> &[Arc<RevocationList>] {
        &self.crls
    }

    /// Number of signer certificates.
    #[must_use]
    pub fn certificate_count(&self) -> usize {
        self.certificates.len()
    }
}

/// Collects material for a [`TrustContext`].
#[derive(Debug, Default)]
pub struct TrustContextBuilder {
    anchors: Vec<Certificate>,
    intermediates: Vec<Certificate>,
    crls: Vec<RevocationList>,
    certificates: Vec<Certificate>,
}

impl TrustContextBuilder {
    /// Add a trust anchor.
    #[must_use]
    pub fn anchor(mut self, cert: Certificate) -> Self {
        self.anchors.push(cert);
        self
    }

    /// Add an intermediate CA.
    #[must_use]
    pub fn intermediate(mut self, cert: Certificate) -> Self {
        self.intermediates.push(cert);
        self
    }

    /// Add a CRL snapshot.
    #[must_use]
    pub fn revocation_list(mut self, crl: RevocationList) -> Self {
        self.crls.push(crl);
        self
    }

    /// Add a signer certificate to the serial table.
    #[must_use]
    pub fn certificate(mut self, cert: Certificate) -> Self {
        self.certificates.push(cert);
        self
    }

    /// Add a DER trust anchor.
    pub fn anchor_der(self, der: &[u8]) -> Result<Self, TrustError> {
        Ok(self.anchor(Certificate::from_der(der)?))
    }

    /// Add a DER intermediate CA.
    pub fn intermediate_der(self, der: &[u8]) -> Result<Self, TrustError> {
        Ok(self.intermediate(Certificate::from_der(der)?))
    }

    /// Add a DER CRL.
    pub fn revocation_list_der(self, der: &[u8]) -> Result<Self, TrustError> {
        Ok(self.revocation_list(RevocationList::from_der(der)?))
    }

    /// Add a DER signer certificate.
    pub fn certificate_der(self, der: &[u8]) -> Result<Self, TrustError> {
        Ok(self.certificate(Certificate::from_der(der)?))
    }

    /// Freeze the material. Fails if two signer certificates share a serial.
    pub fn build(self) -> Result<TrustContext, TrustError> {
        let mut certificates = HashMap::with_capacity(self.certificates.len());
        let mut by_key = HashMap::with_capacity(self.certificates.len());

        for cert in self.certificates {
            let serial = cert.serial().clone();
            if certificates.contains_key(&serial) {
                return Err(TrustError::DuplicateSerial(serial));
            }
            by_key
                .entry(cert.public_key().fingerprint())
                .or_insert_with(|| serial.clone());
            certificates.insert(serial, Arc::new(cert));
        }

        let context = TrustContext {
            anchors: self.anchors.into_iter().map(Arc::new).collect(),
            intermediates: self.intermediates.into_iter().map(Arc::new).collect(),
            crls: self.crls.into_iter().map(Arc::new).collect(),
            certificates,
            by_key,
        };

        info!(
            anchors = context.anchors.len(),
            intermediates = context.intermediates.len(),
            crls = context.crls.len(),
            certificates = context.certificates.len(),
            "Trust context built"
        );

        Ok(context)
    }
}
