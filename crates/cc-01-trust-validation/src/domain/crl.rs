//! # Revocation Lists
//!
//! Immutable snapshot of an X.509 CRL. A new snapshot replaces an old one by
//! building a new trust context; nothing here is mutated after parsing.

use super::certificate::Certificate;
use super::entities::CertificateSerial;
use super::errors::TrustError;
use super::keys::SignatureAlgorithm;
use shared_types::Timestamp;
use std::collections::HashMap;
use x509_cert::crl::CertificateList;
use x509_cert::der::{Decode, Encode};

/// A parsed certificate revocation list.
#[derive(Debug, Clone)]
pub struct RevocationList {
    tbs_der: Vec<u8>,
    issuer_der: Vec<u8>,
    issuer_text: String,
    this_update: Timestamp,
    next_update: Option<Timestamp>,
    revoked: HashMap<CertificateSerial, Timestamp>,
    signature_algorithm: SignatureAlgorithm,
    signature: Vec<u8>,
}

impl RevocationList {
    /// Parse a DER encoded CRL.
    pub fn from_der(der: &[u8]) -> Result<Self, TrustError> {
        let list: CertificateList = CertificateList::from_der(der).map_err(malformed)?;
        let tbs = &list.tbs_cert_list;

        let revoked = tbs
            .revoked_certificates
            .iter()
            .flatten()
            .map(|entry| {
                (
                    CertificateSerial::from_bytes(entry.serial_number.as_bytes()),
                    entry.revocation_date.to_unix_duration().as_secs(),
                )
            })
            .collect();

        Ok(Self {
            tbs_der: tbs.to_der().map_err(malformed)?,
            issuer_der: tbs.issuer.to_der().map_err(malformed)?,
            issuer_text: tbs.issuer.to_string(),
            this_update: tbs.this_update.to_unix_duration().as_secs(),
            next_update: tbs.next_update.map(|t| t.to_unix_duration().as_secs()),
            revoked,
            signature_algorithm: SignatureAlgorithm::from_algorithm_identifier(
                &list.signature_algorithm,
            )?,
            signature: list
                .signature
                .as_bytes()
                .ok_or_else(|| {
                    TrustError::MalformedRevocationList("signature is not octet aligned".into())
                })?
                .to_vec(),
        })
    }

    /// Issuer in RFC 4514 form.
    #[must_use]
    pub fn issuer_text(&self) -> &str {
        &self.issuer_text
    }

    /// DER encoding of the issuer name.
    #[must_use]
    pub fn issuer_der(&self) -> &[u8] {
        &self.issuer_der
    }

    /// Issue time of this snapshot.
    #[must_use]
    pub fn this_update(&self) -> Timestamp {
        self.this_update
    }

    /// Time by which a newer snapshot is due.
    #[must_use]
    pub fn next_update(&self) -> Option<Timestamp> {
        self.next_update
    }

    /// True if the snapshot is in force at `at`.
    #[must_use]
    pub fn is_current(&self, at: Timestamp) -> bool {
        self.this_update <= at && self.next_update.map_or(true, |next| at <= next)
    }

    /// Revocation time of `serial`, if listed.
    #[must_use]
    pub fn revoked_at(&self, serial: &CertificateSerial) -> Option<Timestamp> {
        self.revoked.get(serial).copied()
    }

    /// Number of listed serials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    /// True if nothing is revoked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }

    /// True if `issuer` is named as this list's issuer and signed it.
    #[must_use]
    pub fn is_issued_by(&self, issuer: &Certificate) -> bool {
        self.issuer_der == issuer.subject_der()
            && issuer
                .public_key()
                .verify(self.signature_algorithm, &self.tbs_der, &self.signature)
                .is_ok()
    }
}

fn malformed(e: x509_cert::der::Error) -> TrustError {
    TrustError::MalformedRevocationList(e.to_string())
}
