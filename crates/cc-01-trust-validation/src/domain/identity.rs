//! # Party Identity
//!
//! Derives a canonical party id from a certificate.
//!
//! Enrollment certificates carry their attributes in a JSON extension
//! (`{"attrs": {"ROLE": "CARRIER", "GLN": "...", "CCC": "..."}}`). When both
//! `CCC` (company code) and `GLN` (global location number) are present the
//! canonical id is `CCC-GLN`; otherwise it falls back to `O/CN`.

use super::certificate::Certificate;
use super::errors::TrustError;
use serde::{Deserialize, Serialize};
use shared_types::Role;
use std::collections::BTreeMap;
use x509_cert::der::oid::ObjectIdentifier;

/// Extension carrying enrollment attributes as JSON.
pub const ENROLLMENT_ATTRIBUTES_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.3.4.5.6.7.8.1");

const COMMON_NAME_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
const ORGANIZATION_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
const ORGANIZATIONAL_UNIT_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.11");

/// Attribute holding the company code.
pub const ATTR_COMPANY_CODE: &str = "CCC";
/// Attribute holding the global location number.
pub const ATTR_LOCATION_NUMBER: &str = "GLN";
/// Attribute holding the enrolled role.
pub const ATTR_ROLE: &str = "ROLE";

#[derive(Deserialize)]
struct EnrollmentAttributes {
    #[serde(default)]
    attrs: BTreeMap<String, String>,
}

/// Identity facts read from a certificate subject and its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyIdentity {
    pub common_name: Option<String>,
    pub organization: Option<String>,
    pub organizational_unit: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

impl PartyIdentity {
    /// Read the identity of a certificate's subject.
    pub fn from_certificate(cert: &Certificate) -> Result<Self, TrustError> {
        let mut identity = Self {
            common_name: None,
            organization: None,
            organizational_unit: None,
            attributes: BTreeMap::new(),
        };

        for rdn in cert.subject().0.iter() {
            for atv in rdn.0.iter() {
                let Ok(value) = std::str::from_utf8(atv.value.value()) else {
                    continue;
                };
                let slot = if atv.oid == COMMON_NAME_OID {
                    &mut identity.common_name
                } else if atv.oid == ORGANIZATION_OID {
                    &mut identity.organization
                } else if atv.oid == ORGANIZATIONAL_UNIT_OID {
                    &mut identity.organizational_unit
                } else {
                    continue;
                };
                slot.get_or_insert_with(|| value.to_string());
            }
        }

        if let Some(raw) = cert.extension(&ENROLLMENT_ATTRIBUTES_OID) {
            let parsed: EnrollmentAttributes = serde_json::from_slice(raw).map_err(|e| {
                TrustError::MalformedCertificate(format!("enrollment attributes: {e}"))
            })?;
            identity.attributes = parsed.attrs;
        }

        Ok(identity)
    }

    /// An enrollment attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// The enrolled role, if the certificate carries one.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.attribute(ATTR_ROLE).and_then(|r| r.parse().ok())
    }

    /// Canonical party id: `CCC-GLN`, or `O/CN` when those attributes are absent.
    pub fn canonical_id(&self) -> Result<String, TrustError> {
        if let (Some(ccc), Some(gln)) = (
            self.attribute(ATTR_COMPANY_CODE),
            self.attribute(ATTR_LOCATION_NUMBER),
        ) {
            return Ok(format!("{ccc}-{gln}"));
        }

        let organization = self
            .organization
            .as_deref()
            .ok_or(TrustError::MissingAttribute("O"))?;
        let common_name = self
            .common_name
            .as_deref()
            .ok_or(TrustError::MissingAttribute("CN"))?;
        Ok(format!("{organization}/{common_name}"))
    }

    /// Record id reserved by this party: `CCC-GLN-<sequence>`.
    ///
    /// Requires the `CCC` and `GLN` attributes.
    pub fn reservation_id(&self, sequence: u64) -> Result<String, TrustError> {
        let ccc = self
            .attribute(ATTR_COMPANY_CODE)
            .ok_or(TrustError::MissingAttribute(ATTR_COMPANY_CODE))?;
        let gln = self
            .attribute(ATTR_LOCATION_NUMBER)
            .ok_or(TrustError::MissingAttribute(ATTR_LOCATION_NUMBER))?;
        Ok(format!("{ccc}-{gln}-{sequence}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{KeyKind, LeafSpec, TestPki};

    #[test]
    fn test_canonical_id_from_attributes() {
        let mut pki = TestPki::new(KeyKind::Ed25519);
        let leaf = pki.issue_leaf(
            LeafSpec::new("shipper-1", "Org1MSP")
                .attribute("CCC", "4012345")
                .attribute("GLN", "0000001")
                .attribute("ROLE", "shipper"),
        );

        let identity = PartyIdentity::from_certificate(&leaf.certificate).unwrap();
        assert_eq!(identity.canonical_id().unwrap(), "4012345-0000001");
        assert_eq!(identity.role(), Some(Role::Shipper));
        assert_eq!(identity.reservation_id(7).unwrap(), "4012345-0000001-7");
    }

    #[test]
    fn test_canonical_id_falls_back_to_subject() {
        let mut pki = TestPki::new(KeyKind::Secp256k1);
        let leaf = pki.issue_leaf(LeafSpec::new("receiver-1", "Org3MSP"));

        let identity = PartyIdentity::from_certificate(&leaf.certificate).unwrap();
        assert_eq!(identity.common_name.as_deref(), Some("receiver-1"));
        assert_eq!(identity.canonical_id().unwrap(), "Org3MSP/receiver-1");
        assert_eq!(identity.role(), None);
        assert_eq!(
            identity.reservation_id(1),
            Err(TrustError::MissingAttribute(ATTR_COMPANY_CODE))
        );
    }

    #[test]
    fn test_blank_attribute_is_absent() {
        let mut pki = TestPki::new(KeyKind::Ed25519);
        let leaf = pki.issue_leaf(
            LeafSpec::new("carrier-1", "Org2MSP")
                .attribute("CCC", " ")
                .attribute("GLN", "0000002"),
        );

        let identity = PartyIdentity::from_certificate(&leaf.certificate).unwrap();
        assert_eq!(identity.canonical_id().unwrap(), "Org2MSP/carrier-1");
    }
}
