//! # XML-DSig Algorithm Identifiers
//!
//! The closed set of canonicalization, digest, transform and signature
//! methods this crate accepts. Anything else is rejected.

use crate::domain::errors::SignatureError;
use cc_01_trust_validation::SignatureAlgorithm;
use sha2::{Digest, Sha256, Sha512};
use sha3::Sha3_256;

/// XML-DSig core namespace.
pub const DSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";
/// XML-DSig 1.1 namespace (`DEREncodedKeyValue`, `ECKeyValue`).
pub const DSIG11_NS: &str = "http://www.w3.org/2009/xmldsig11#";

const C14N: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315";
const C14N_WITH_COMMENTS: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315#WithComments";
const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
const EXC_C14N_WITH_COMMENTS: &str = "http://www.w3.org/2001/10/xml-exc-c14n#WithComments";

const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";

const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
const SHA512: &str = "http://www.w3.org/2001/04/xmlenc#sha512";
const SHA3_256: &str = "http://www.w3.org/2007/05/xmldsig-more#sha3-256";

const ECDSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256";
const EDDSA_ED25519: &str = "http://www.w3.org/2021/04/xmldsig-more#eddsa-ed25519";

/// Named curve URI for secp256k1 in `ECKeyValue`.
pub const SECP256K1_CURVE_URN: &str = "urn:oid:1.3.132.0.10";

// =============================================================================
// CANONICALIZATION
// =============================================================================

/// Canonical XML 1.0 variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanonicalizationMethod {
    #[default]
    Inclusive,
    InclusiveWithComments,
    Exclusive,
    ExclusiveWithComments,
}

impl CanonicalizationMethod {
    pub fn from_uri(uri: &str) -> Result<Self, SignatureError> {
        match uri {
            C14N => Ok(Self::Inclusive),
            C14N_WITH_COMMENTS => Ok(Self::InclusiveWithComments),
            EXC_C14N => Ok(Self::Exclusive),
            EXC_C14N_WITH_COMMENTS => Ok(Self::ExclusiveWithComments),
            other => Err(SignatureError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    #[must_use]
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Inclusive => C14N,
            Self::InclusiveWithComments => C14N_WITH_COMMENTS,
            Self::Exclusive => EXC_C14N,
            Self::ExclusiveWithComments => EXC_C14N_WITH_COMMENTS,
        }
    }

    #[must_use]
    pub fn with_comments(&self) -> bool {
        matches!(self, Self::InclusiveWithComments | Self::ExclusiveWithComments)
    }

    #[must_use]
    pub fn is_exclusive(&self) -> bool {
        matches!(self, Self::Exclusive | Self::ExclusiveWithComments)
    }
}

// =============================================================================
// TRANSFORMS
// =============================================================================

/// A reference transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Remove the signature element being verified from the node set.
    EnvelopedSignature,
    /// Serialize the node set with the given method.
    Canonicalize(CanonicalizationMethod),
}

impl Transform {
    pub fn from_uri(uri: &str) -> Result<Self, SignatureError> {
        if uri == ENVELOPED_SIGNATURE {
            return Ok(Self::EnvelopedSignature);
        }
        CanonicalizationMethod::from_uri(uri).map(Self::Canonicalize)
    }

    #[must_use]
    pub fn uri(&self) -> &'static str {
        match self {
            Self::EnvelopedSignature => ENVELOPED_SIGNATURE,
            Self::Canonicalize(method) => method.uri(),
        }
    }
}

// =============================================================================
// DIGESTS
// =============================================================================

/// Reference digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestMethod {
    #[default]
    Sha256,
    Sha512,
    Sha3_256,
}

impl DigestMethod {
    pub fn from_uri(uri: &str) -> Result<Self, SignatureError> {
        match uri {
            SHA256 => Ok(Self::Sha256),
            SHA512 => Ok(Self::Sha512),
            SHA3_256 => Ok(Self::Sha3_256),
            other => Err(SignatureError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    #[must_use]
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Sha256 => SHA256,
            Self::Sha512 => SHA512,
            Self::Sha3_256 => SHA3_256,
        }
    }

    #[must_use]
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
            Self::Sha3_256 => Sha3_256::digest(data).to_vec(),
        }
    }
}

// =============================================================================
// SIGNATURE METHODS
// =============================================================================

/// `SignatureMethod` algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureMethod {
    /// ECDSA over secp256k1 with SHA-256, value as fixed-width `r||s`.
    EcdsaSha256,
    /// Pure Ed25519.
    Ed25519,
}

impl SignatureMethod {
    pub fn from_uri(uri: &str) -> Result<Self, SignatureError> {
        match uri {
            ECDSA_SHA256 => Ok(Self::EcdsaSha256),
            EDDSA_ED25519 => Ok(Self::Ed25519),
            other => Err(SignatureError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    #[must_use]
    pub fn uri(&self) -> &'static str {
        match self {
            Self::EcdsaSha256 => ECDSA_SHA256,
            Self::Ed25519 => EDDSA_ED25519,
        }
    }

    #[must_use]
    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            Self::EcdsaSha256 => SignatureAlgorithm::EcdsaSecp256k1Sha256,
            Self::Ed25519 => SignatureAlgorithm::Ed25519,
        }
    }

    #[must_use]
    pub fn for_algorithm(algorithm: SignatureAlgorithm) -> Self {
        match algorithm {
            SignatureAlgorithm::EcdsaSecp256k1Sha256 => Self::EcdsaSha256,
            SignatureAlgorithm::Ed25519 => Self::Ed25519,
        }
    }
}
