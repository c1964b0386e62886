//! # Certificates
//!
//! Immutable view of a parsed X.509v3 certificate with the fields chain
//! validation needs pre-extracted.

use super::entities::CertificateSerial;
use super::errors::TrustError;
use super::keys::{PublicKey, SignatureAlgorithm};
use shared_types::Timestamp;
use x509_cert::der::oid::{AssociatedOid, ObjectIdentifier};
use x509_cert::der::{Decode, Encode};
use x509_cert::ext::pkix::BasicConstraints;
use x509_cert::name::Name;

/// A parsed certificate.
#[derive(Debug, Clone)]
pub struct Certificate {
    der: Vec<u8>,
    tbs_der: Vec<u8>,
    serial: CertificateSerial,
    subject: Name,
    subject_der: Vec<u8>,
    issuer_der: Vec<u8>,
    subject_text: String,
    issuer_text: String,
    not_before: Timestamp,
    not_after: Timestamp,
    public_key: PublicKey,
    signature_algorithm: SignatureAlgorithm,
    signature: Vec<u8>,
    basic_constraints: Option<BasicConstraints>,
    extensions: Vec<(ObjectIdentifier, Vec<u8>)>,
}

impl Certificate {
    /// Parse a DER encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self, TrustError> {
        let cert = x509_cert::Certificate::from_der(der)
            .map_err(|e| TrustError::MalformedCertificate(e.to_string()))?;
        let tbs = &cert.tbs_certificate;

        let tbs_der = tbs.to_der().map_err(malformed)?;
        let subject_der = tbs.subject.to_der().map_err(malformed)?;
        let issuer_der = tbs.issuer.to_der().map_err(malformed)?;
        let public_key = PublicKey::from_spki(&tbs.subject_public_key_info)?;
        let signature_algorithm =
            SignatureAlgorithm::from_algorithm_identifier(&cert.signature_algorithm)?;
        let signature = cert
            .signature
            .as_bytes()
            .ok_or_else(|| TrustError::MalformedCertificate("signature is not octet aligned".into()))?
            .to_vec();

        let mut basic_constraints = None;
        let mut extensions = Vec::new();
        for ext in tbs.extensions.iter().flatten() {
            let value = ext.extn_value.as_bytes();
            if ext.extn_id == BasicConstraints::OID {
                basic_constraints = Some(BasicConstraints::from_der(value).map_err(malformed)?);
            }
            extensions.push((ext.extn_id, value.to_vec()));
        }

        Ok(Self {
            der: der.to_vec(),
            tbs_der,
            serial: CertificateSerial::from_bytes(tbs.serial_number.as_bytes()),
            subject_text: tbs.subject.to_string(),
            issuer_text: tbs.issuer.to_string(),
            subject: tbs.subject.clone(),
            subject_der,
            issuer_der,
            not_before: tbs.validity.not_before.to_unix_duration().as_secs(),
            not_after: tbs.validity.not_after.to_unix_duration().as_secs(),
            public_key,
            signature_algorithm,
            signature,
            basic_constraints,
            extensions,
        })
    }

    /// The original DER bytes.
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Normalized serial.
    #[must_use]
    pub fn serial(&self) -> &CertificateSerial {
        &self.serial
    }

    /// Subject name.
    #[must_use]
    pub fn subject(&self) -> &Name {
        &self.subject
    }

    /// Subject in RFC 4514 form.
    #[must_use]
    pub fn subject_text(&self) -> &str {
        &self.subject_text
    }

    /// Issuer in RFC 4514 form.
    #[must_use]
    pub fn issuer_text(&self) -> &str {
        &self.issuer_text
    }

    /// DER encoding of the issuer name, used for name chaining.
    #[must_use]
    pub fn issuer_der(&self) -> &[u8] {
        &self.issuer_der
    }

    /// DER encoding of the subject name.
    #[must_use]
    pub fn subject_der(&self) -> &[u8] {
        &self.subject_der
    }

    /// Start of the validity window.
    #[must_use]
    pub fn not_before(&self) -> Timestamp {
        self.not_before
    }

    /// End of the validity window.
    #[must_use]
    pub fn not_after(&self) -> Timestamp {
        self.not_after
    }

    /// True if `at` lies inside the validity window (inclusive).
    #[must_use]
    pub fn is_valid_at(&self, at: Timestamp) -> bool {
        self.not_before <= at && at <= self.not_after
    }

    /// Subject public key.
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// True if subject and issuer names are identical.
    #[must_use]
    pub fn is_self_issued(&self) -> bool {
        self.subject_der == self.issuer_der
    }

    /// True if the basic constraints extension marks this as a CA.
    #[must_use]
    pub fn is_ca(&self) -> bool {
        self.basic_constraints.as_ref().is_some_and(|bc| bc.ca)
    }

    /// Maximum number of intermediate CAs allowed below this CA.
    #[must_use]
    pub fn path_len_constraint(&self) -> Option<u8> {
        self.basic_constraints
            .as_ref()
            .and_then(|bc| bc.path_len_constraint)
    }

    /// Raw value of an extension, if present.
    #[must_use]
    pub fn extension(&self, oid: &ObjectIdentifier) -> Option<&[u8]> {
        self.extensions
            .iter()
            .find(|(id, _)| id == oid)
            .map(|(_, value)| value.as_slice())
    }

    /// True if `issuer` has the name this certificate names as issuer and
    /// its key verifies this certificate's signature.
    #[must_use]
    pub fn is_issued_by(&self, issuer: &Certificate) -> bool {
        self.issuer_der == issuer.subject_der
            && issuer
                .public_key
                .verify(self.signature_algorithm, &self.tbs_der, &self.signature)
                .is_ok()
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}

fn malformed(e: x509_cert::der::Error) -> TrustError {
    TrustError::MalformedCertificate(e.to_string())
}
