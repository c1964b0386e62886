//! # Test PKI
//!
//! An in-memory root → intermediate → leaf hierarchy with CRLs, for tests
//! and benches across the workspace. Every `TestPki` uses the same subject
//! names and fresh random keys, so two instances make convincing impostors
//! of each other.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use crate::domain::certificate::Certificate;
use crate::domain::context::TrustContext;
use crate::domain::entities::CertificateSerial;
use crate::domain::identity::ENROLLMENT_ATTRIBUTES_OID;
use crate::domain::keys::SigningKey;
use shared_types::Timestamp;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use x509_cert::certificate::{TbsCertificate, Version};
use x509_cert::crl::{CertificateList, RevokedCert, TbsCertList};
use x509_cert::der::asn1::{BitString, OctetString, UtcTime};
use x509_cert::der::oid::AssociatedOid;
use x509_cert::der::Encode;
use x509_cert::ext::pkix::BasicConstraints;
use x509_cert::ext::Extension;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::{Time, Validity};

/// One day in seconds.
pub const DAY: Timestamp = 86_400;

/// Fixed "now" for all fixtures (2023-11-14T22:13:20Z).
pub const FIXTURE_NOW: Timestamp = 1_700_000_000;

/// Subject of every test root.
pub const ROOT_SUBJECT: &str = "CN=Custody Test Root CA,O=Custody Chain";

/// Subject of every test intermediate.
pub const INTERMEDIATE_SUBJECT: &str = "CN=Custody Test Issuing CA,O=Custody Chain";

/// Key scheme for generated material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Ed25519,
    Secp256k1,
}

impl KeyKind {
    /// A fresh random key of this kind.
    #[must_use]
    pub fn generate(self) -> SigningKey {
        match self {
            Self::Ed25519 => SigningKey::ed25519_from_seed(&rand::random()),
            Self::Secp256k1 => loop {
                // Retry the (astronomically rare) out-of-range scalar.
                if let Ok(key) = SigningKey::secp256k1_from_bytes(&rand::random()) {
                    break key;
                }
            },
        }
    }
}

/// An issued certificate with its DER and private key.
#[derive(Debug, Clone)]
pub struct Issued {
    pub certificate: Certificate,
    pub der: Vec<u8>,
    pub key: SigningKey,
}

/// What to put in a leaf certificate.
#[derive(Debug, Clone)]
pub struct LeafSpec {
    common_name: String,
    organization: String,
    not_before: Option<Timestamp>,
    not_after: Option<Timestamp>,
    attributes: BTreeMap<String, String>,
    kind: Option<KeyKind>,
}

impl LeafSpec {
    pub fn new(common_name: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            common_name: common_name.into(),
            organization: organization.into(),
            not_before: None,
            not_after: None,
            attributes: BTreeMap::new(),
            kind: None,
        }
    }

    /// Override the validity window.
    #[must_use]
    pub fn validity(mut self, not_before: Timestamp, not_after: Timestamp) -> Self {
        self.not_before = Some(not_before);
        self.not_after = Some(not_after);
        self
    }

    /// Add an enrollment attribute.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Use a different key scheme from the issuing PKI.
    #[must_use]
    pub fn kind(mut self, kind: KeyKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// Root and intermediate CA with a leaf factory.
#[derive(Debug, Clone)]
pub struct TestPki {
    pub kind: KeyKind,
    pub root: Issued,
    pub intermediate: Issued,
}

impl TestPki {
    /// A fresh hierarchy. CAs are valid for ten years around [`FIXTURE_NOW`].
    #[must_use]
    pub fn new(kind: KeyKind) -> Self {
        let not_before = FIXTURE_NOW - 365 * DAY;
        let not_after = FIXTURE_NOW + 3650 * DAY;

        let root_key = kind.generate();
        let root_name = name(ROOT_SUBJECT);
        let root = issue(
            &root_key,
            &root_name,
            &root_key,
            root_name.clone(),
            (not_before, not_after),
            vec![basic_constraints(true, Some(1))],
        );

        let intermediate_key = kind.generate();
        let intermediate = issue(
            &root_key,
            &root_name,
            &intermediate_key,
            name(INTERMEDIATE_SUBJECT),
            (not_before, not_after),
            vec![basic_constraints(true, Some(0))],
        );

        Self {
            kind,
            root,
            intermediate,
        }
    }

    /// Fixed validation time.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        FIXTURE_NOW
    }

    /// Issue a leaf from the intermediate.
    pub fn issue_leaf(&mut self, spec: LeafSpec) -> Issued {
        let key = spec.kind.unwrap_or(self.kind).generate();
        let subject = name(&format!("CN={},O={}", spec.common_name, spec.organization));

        let mut extensions = vec![basic_constraints(false, None)];
        if !spec.attributes.is_empty() {
            let value = serde_json::json!({ "attrs": spec.attributes });
            extensions.push(Extension {
                extn_id: ENROLLMENT_ATTRIBUTES_OID,
                critical: false,
                extn_value: OctetString::new(serde_json::to_vec(&value).unwrap()).unwrap(),
            });
        }

        let window = (
            spec.not_before.unwrap_or(FIXTURE_NOW - 30 * DAY),
            spec.not_after.unwrap_or(FIXTURE_NOW + 365 * DAY),
        );

        issue(
            &self.intermediate.key,
            self.intermediate.certificate.subject(),
            &key,
            subject,
            window,
            extensions,
        )
    }

    /// CRL signed by the root, current for seven days from a day ago.
    #[must_use]
    pub fn root_crl(&self, revoked: &[CertificateSerial]) -> Vec<u8> {
        crl(&self.root, revoked)
    }

    /// CRL signed by the intermediate, current for seven days from a day ago.
    #[must_use]
    pub fn intermediate_crl(&self, revoked: &[CertificateSerial]) -> Vec<u8> {
        crl(&self.intermediate, revoked)
    }

    /// Context with this PKI's anchor, intermediate, empty CRLs and `leaves`
    /// as signer certificates.
    #[must_use]
    pub fn context(&self, leaves: &[&Issued]) -> TrustContext {
        self.context_revoking(leaves, &[])
    }

    /// Like [`TestPki::context`], with `revoked` listed on the intermediate's CRL.
    #[must_use]
    pub fn context_revoking(&self, leaves: &[&Issued], revoked: &[CertificateSerial]) -> TrustContext {
        let mut builder = TrustContext::builder()
            .anchor(self.root.certificate.clone())
            .intermediate(self.intermediate.certificate.clone())
            .revocation_list_der(&self.root_crl(&[]))
            .and_then(|b| b.revocation_list_der(&self.intermediate_crl(revoked)))
            .unwrap();
        for leaf in leaves {
            builder = builder.certificate(leaf.certificate.clone());
        }
        builder.build().unwrap()
    }
}

fn name(text: &str) -> Name {
    Name::from_str(text).unwrap()
}

fn time(at: Timestamp) -> Time {
    Time::UtcTime(UtcTime::from_unix_duration(Duration::from_secs(at)).unwrap())
}

fn random_serial() -> SerialNumber {
    let mut bytes: [u8; 9] = rand::random();
    // Positive and without a redundant leading zero.
    bytes[0] = (bytes[0] & 0x7f) | 0x01;
    SerialNumber::new(&bytes).unwrap()
}

fn basic_constraints(ca: bool, path_len_constraint: Option<u8>) -> Extension {
    let value = BasicConstraints {
        ca,
        path_len_constraint,
    };
    Extension {
        extn_id: BasicConstraints::OID,
        critical: true,
        extn_value: OctetString::new(value.to_der().unwrap()).unwrap(),
    }
}

fn issue(
    issuer_key: &SigningKey,
    issuer: &Name,
    subject_key: &SigningKey,
    subject: Name,
    (not_before, not_after): (Timestamp, Timestamp),
    extensions: Vec<Extension>,
) -> Issued {
    let algorithm = issuer_key.algorithm().algorithm_identifier();
    let tbs = TbsCertificate {
        version: Version::V3,
        serial_number: random_serial(),
        signature: algorithm.clone(),
        issuer: issuer.clone(),
        validity: Validity {
            not_before: time(not_before),
            not_after: time(not_after),
        },
        subject,
        subject_public_key_info: subject_key.public_key().to_spki().unwrap(),
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: Some(extensions),
    };

    let signature = issuer_key.sign_der(&tbs.to_der().unwrap());
    let cert = x509_cert::Certificate {
        tbs_certificate: tbs,
        signature_algorithm: algorithm,
        signature: BitString::from_bytes(&signature).unwrap(),
    };
    let der = cert.to_der().unwrap();

    Issued {
        certificate: Certificate::from_der(&der).unwrap(),
        der,
        key: subject_key.clone(),
    }
}

fn crl(issuer: &Issued, revoked: &[CertificateSerial]) -> Vec<u8> {
    let algorithm = issuer.key.algorithm().algorithm_identifier();
    let this_update = FIXTURE_NOW - DAY;

    let entries: Vec<RevokedCert> = revoked
        .iter()
        .map(|serial| RevokedCert {
            serial_number: SerialNumber::new(&serial_bytes(serial)).unwrap(),
            revocation_date: time(this_update),
            crl_entry_extensions: None,
        })
        .collect();

    let tbs = TbsCertList {
        version: Version::V2,
        signature: algorithm.clone(),
        issuer: issuer.certificate.subject().clone(),
        this_update: time(this_update),
        next_update: Some(time(this_update + 7 * DAY)),
        revoked_certificates: (!entries.is_empty()).then_some(entries),
        crl_extensions: None,
    };

    let signature = issuer.key.sign_der(&tbs.to_der().unwrap());
    CertificateList {
        tbs_cert_list: tbs,
        signature_algorithm: algorithm,
        signature: BitString::from_bytes(&signature).unwrap(),
    }
    .to_der()
    .unwrap()
}

fn serial_bytes(serial: &CertificateSerial) -> Vec<u8> {
    let mut bytes = serial.to_bytes();
    if bytes.first().is_some_and(|b| b & 0x80 != 0) {
        bytes.insert(0, 0);
    }
    bytes
}
