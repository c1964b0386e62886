//! # Signer Key Resolution
//!
//! `KeyInfo` content is read into a list of [`KeySource`]s in document
//! order, and [`resolve_signer`] picks the first one that yields a
//! certificate whose key fits the declared signature method.
//!
//! | Source | Certificate |
//! |--------|-------------|
//! | `KeyValue` / `DEREncodedKeyValue` | table entry holding that key |
//! | `X509Certificate` | the embedded certificate itself |
//! | `X509IssuerSerial` | table entry with that issuer and serial |
//!
//! Whatever certificate is chosen is chain-validated by the caller.

use super::algorithms::{DSIG11_NS, DSIG_NS, SECP256K1_CURVE_URN};
use super::document::{base64_content, child, text_content};
use crate::domain::errors::SignatureError;
use cc_01_trust_validation::{
    Certificate, CertificateSerial, PublicKey, SignatureAlgorithm, TrustContext,
};
use roxmltree::Node;
use std::sync::Arc;
use tracing::debug;

/// One way a signature block names its signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// A bare public key.
    KeyValue(PublicKey),
    /// A DER certificate carried in the document.
    X509Certificate(Vec<u8>),
    /// A certificate held elsewhere, named by issuer and serial.
    External {
        issuer: String,
        serial: CertificateSerial,
    },
}

impl KeySource {
    /// Read every recognized source under `KeyInfo`, in document order.
    /// Keys of unsupported types are skipped.
    pub fn parse_key_info(key_info: Node<'_, '_>) -> Result<Vec<Self>, SignatureError> {
        let mut sources = Vec::new();

        for node in key_info.children().filter(Node::is_element) {
            let ns = node.tag_name().namespace();
            match (ns, node.tag_name().name()) {
                (Some(DSIG_NS), "KeyValue") => {
                    if let Some(ec) = child(node, DSIG11_NS, "ECKeyValue") {
                        push_key(&mut sources, ec_key_value(ec));
                    }
                }
                (Some(DSIG11_NS), "DEREncodedKeyValue") => {
                    let der = base64_content(node, "DEREncodedKeyValue")?;
                    push_key(&mut sources, PublicKey::from_spki_der(&der).map_err(Into::into));
                }
                (Some(DSIG_NS), "X509Data") => {
                    for item in node.children().filter(Node::is_element) {
                        if item.has_tag_name((DSIG_NS, "X509Certificate")) {
                            sources.push(Self::X509Certificate(base64_content(
                                item,
                                "X509Certificate",
                            )?));
                        } else if item.has_tag_name((DSIG_NS, "X509IssuerSerial")) {
                            sources.push(issuer_serial(item)?);
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(sources)
    }
}

fn push_key(sources: &mut Vec<KeySource>, key: Result<PublicKey, SignatureError>) {
    match key {
        Ok(key) => sources.push(KeySource::KeyValue(key)),
        Err(err) => debug!(%err, "Skipping unusable key value"),
    }
}

fn ec_key_value(node: Node<'_, '_>) -> Result<PublicKey, SignatureError> {
    let curve = child(node, DSIG11_NS, "NamedCurve")
        .and_then(|c| c.attribute("URI"))
        .ok_or(SignatureError::MissingElement("NamedCurve"))?;
    if curve != SECP256K1_CURVE_URN {
        return Err(SignatureError::UnsupportedAlgorithm(curve.to_string()));
    }
    let point = child(node, DSIG11_NS, "PublicKey").ok_or(SignatureError::MissingElement("PublicKey"))?;
    Ok(PublicKey::secp256k1_from_sec1(&base64_content(point, "PublicKey")?)?)
}

fn issuer_serial(node: Node<'_, '_>) -> Result<KeySource, SignatureError> {
    let issuer = child(node, DSIG_NS, "X509IssuerName")
        .map(text_content)
        .ok_or(SignatureError::MissingElement("X509IssuerName"))?;
    let serial = child(node, DSIG_NS, "X509SerialNumber")
        .map(text_content)
        .ok_or(SignatureError::MissingElement("X509SerialNumber"))?;

    Ok(KeySource::External {
        issuer: issuer.trim().to_string(),
        serial: CertificateSerial::from_decimal(&serial)?,
    })
}

/// Pick the signing certificate: the first source, in order, that yields a
/// certificate whose key type matches `algorithm`.
pub fn resolve_signer(
    sources: &[KeySource],
    algorithm: SignatureAlgorithm,
    context: &TrustContext,
) -> Result<Arc<Certificate>, SignatureError> {
    for source in sources {
        let candidate = match source {
            KeySource::KeyValue(key) => context.certificate_for_key(key).cloned(),
            KeySource::X509Certificate(der) => Some(Arc::new(Certificate::from_der(der)?)),
            KeySource::External { issuer, serial } => {
                context.certificate_by_issuer_serial(issuer, serial).cloned()
            }
        };

        match candidate {
            Some(certificate) if algorithm.accepts(certificate.public_key()) => {
                return Ok(certificate)
            }
            Some(certificate) => {
                debug!(serial = %certificate.serial(), "Key source does not fit signature method");
            }
            None => debug!(?source, "Key source names no known certificate"),
        }
    }
    Err(SignatureError::NoMatchingKey)
}
