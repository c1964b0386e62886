//! # Signature Block Parsing
//!
//! Reads a `Signature` element into typed parts. Nothing here verifies
//! anything; unsupported methods are rejected while parsing.

use super::algorithms::{
    CanonicalizationMethod, DigestMethod, SignatureMethod, Transform, DSIG_NS,
};
use super::document::{algorithm_attribute, base64_content, children, required_child};
use super::keys::KeySource;
use crate::domain::errors::SignatureError;
use roxmltree::Node;

/// What a `Reference` points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceTarget {
    /// `URI=""`: the whole document.
    Document,
    /// `URI="#id"`: the single element carrying that id.
    Element(String),
}

impl ReferenceTarget {
    pub fn parse(uri: &str) -> Result<Self, SignatureError> {
        if uri.is_empty() {
            return Ok(Self::Document);
        }
        match uri.strip_prefix('#') {
            Some(id) if !id.is_empty() && !id.starts_with("xpointer(") => {
                Ok(Self::Element(id.to_string()))
            }
            _ => Err(SignatureError::UnsupportedReference(uri.to_string())),
        }
    }

    /// The URI form.
    #[must_use]
    pub fn uri(&self) -> String {
        match self {
            Self::Document => String::new(),
            Self::Element(id) => format!("#{id}"),
        }
    }
}

/// A parsed `Reference`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub target: ReferenceTarget,
    pub transforms: Vec<Transform>,
    pub digest_method: DigestMethod,
    pub digest_value: Vec<u8>,
}

/// A parsed `Signature` element.
#[derive(Debug, Clone)]
pub struct SignatureBlock<'a, 'input> {
    pub element: Node<'a, 'input>,
    pub signed_info: Node<'a, 'input>,
    pub canonicalization: CanonicalizationMethod,
    pub signature_method: SignatureMethod,
    pub references: Vec<Reference>,
    pub signature_value: Vec<u8>,
    pub key_sources: Vec<KeySource>,
}

impl<'a, 'input> SignatureBlock<'a, 'input> {
    pub fn parse(element: Node<'a, 'input>) -> Result<Self, SignatureError> {
        let signed_info = required_child(element, "SignedInfo")?;

        let canonicalization = CanonicalizationMethod::from_uri(algorithm_attribute(
            required_child(signed_info, "CanonicalizationMethod")?,
            "CanonicalizationMethod",
        )?)?;
        let signature_method = SignatureMethod::from_uri(algorithm_attribute(
            required_child(signed_info, "SignatureMethod")?,
            "SignatureMethod",
        )?)?;

        let references = children(signed_info, DSIG_NS, "Reference")
            .map(parse_reference)
            .collect::<Result<Vec<_>, _>>()?;
        if references.is_empty() {
            return Err(SignatureError::MissingElement("Reference"));
        }

        let signature_value =
            base64_content(required_child(element, "SignatureValue")?, "SignatureValue")?;

        let key_sources = match super::document::child(element, DSIG_NS, "KeyInfo") {
            Some(key_info) => KeySource::parse_key_info(key_info)?,
            None => Vec::new(),
        };

        Ok(Self {
            element,
            signed_info,
            canonicalization,
            signature_method,
            references,
            signature_value,
            key_sources,
        })
    }
}

fn parse_reference(node: Node<'_, '_>) -> Result<Reference, SignatureError> {
    let uri = node.attribute("URI").ok_or(SignatureError::MissingAttribute {
        element: "Reference",
        attribute: "URI",
    })?;

    let transforms = match super::document::child(node, DSIG_NS, "Transforms") {
        Some(list) => children(list, DSIG_NS, "Transform")
            .map(|t| Transform::from_uri(algorithm_attribute(t, "Transform")?))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(Reference {
        target: ReferenceTarget::parse(uri)?,
        transforms,
        digest_method: DigestMethod::from_uri(algorithm_attribute(
            required_child(node, "DigestMethod")?,
            "DigestMethod",
        )?)?,
        digest_value: base64_content(required_child(node, "DigestValue")?, "DigestValue")?,
    })
}
