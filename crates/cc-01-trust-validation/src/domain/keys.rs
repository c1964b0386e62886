//! # Keys and Signature Algorithms
//!
//! Public and private key material for the two supported schemes:
//!
//! - Ed25519 (`1.3.101.112`)
//! - ECDSA over secp256k1 with SHA-256 (`id-ecPublicKey`/`secp256k1`,
//!   signatures `ecdsa-with-SHA256`)
//!
//! Keys are read from and written to `SubjectPublicKeyInfo` so that the same
//! code serves certificates, CRLs and embedded key values.

use super::errors::TrustError;
use x509_cert::der::asn1::{Any, BitString};
use x509_cert::der::oid::ObjectIdentifier;
use x509_cert::der::{Decode, Encode, Tag, Tagged};
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

/// Ed25519 key and signature algorithm (RFC 8410).
pub const ED25519_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

/// `id-ecPublicKey` (RFC 5480).
pub const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// Named curve secp256k1 (SEC 2).
pub const SECP256K1_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.10");

/// `ecdsa-with-SHA256` (RFC 5758).
pub const ECDSA_WITH_SHA256_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");

// =============================================================================
// SIGNATURE ALGORITHMS
// =============================================================================

/// A signature algorithm this crate can verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureAlgorithm {
    /// Pure Ed25519.
    Ed25519,
    /// ECDSA on secp256k1 over a SHA-256 digest.
    EcdsaSecp256k1Sha256,
}

impl SignatureAlgorithm {
    /// Map an X.509 signature `AlgorithmIdentifier` to a supported algorithm.
    pub fn from_algorithm_identifier(id: &AlgorithmIdentifierOwned) -> Result<Self, TrustError> {
        if id.oid == ED25519_OID {
            Ok(Self::Ed25519)
        } else if id.oid == ECDSA_WITH_SHA256_OID {
            Ok(Self::EcdsaSecp256k1Sha256)
        } else {
            Err(TrustError::UnsupportedAlgorithm(id.oid.to_string()))
        }
    }

    /// The X.509 `AlgorithmIdentifier` for this algorithm (parameters absent).
    #[must_use]
    pub fn algorithm_identifier(&self) -> AlgorithmIdentifierOwned {
        let oid = match self {
            Self::Ed25519 => ED25519_OID,
            Self::EcdsaSecp256k1Sha256 => ECDSA_WITH_SHA256_OID,
        };
        AlgorithmIdentifierOwned {
            oid,
            parameters: None,
        }
    }

    /// True if `key` is of the type this algorithm signs with.
    #[must_use]
    pub fn accepts(&self, key: &PublicKey) -> bool {
        matches!(
            (self, key),
            (Self::Ed25519, PublicKey::Ed25519(_))
                | (Self::EcdsaSecp256k1Sha256, PublicKey::Secp256k1(_))
        )
    }
}

// =============================================================================
// PUBLIC KEYS
// =============================================================================

/// A verifying key.
#[derive(Debug, Clone)]
pub enum PublicKey {
    Ed25519(ed25519_dalek::VerifyingKey),
    Secp256k1(k256::ecdsa::VerifyingKey),
}

impl PublicKey {
    /// Parse a key from a `SubjectPublicKeyInfo`.
    pub fn from_spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self, TrustError> {
        let key_bytes = spki
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| TrustError::InvalidKey("public key bit string is not octet aligned".into()))?;

        if spki.algorithm.oid == ED25519_OID {
            let bytes: [u8; 32] = key_bytes
                .try_into()
                .map_err(|_| TrustError::InvalidKey(format!("ed25519 key of {} bytes", key_bytes.len())))?;
            let key = ed25519_dalek::VerifyingKey::from_bytes(&bytes)
                .map_err(|e| TrustError::InvalidKey(e.to_string()))?;
            return Ok(Self::Ed25519(key));
        }

        if spki.algorithm.oid == EC_PUBLIC_KEY_OID {
            let curve = named_curve(spki.algorithm.parameters.as_ref())?;
            if curve != SECP256K1_OID {
                return Err(TrustError::UnsupportedAlgorithm(format!("curve {curve}")));
            }
            let key = k256::ecdsa::VerifyingKey::from_sec1_bytes(key_bytes)
                .map_err(|e| TrustError::InvalidKey(e.to_string()))?;
            return Ok(Self::Secp256k1(key));
        }

        Err(TrustError::UnsupportedAlgorithm(spki.algorithm.oid.to_string()))
    }

    /// Encode as a `SubjectPublicKeyInfo`.
    pub fn to_spki(&self) -> Result<SubjectPublicKeyInfoOwned, TrustError> {
        let (algorithm, key) = match self {
            Self::Ed25519(key) => (
                AlgorithmIdentifierOwned {
                    oid: ED25519_OID,
                    parameters: None,
                },
                key.to_bytes().to_vec(),
            ),
            Self::Secp256k1(key) => (
                AlgorithmIdentifierOwned {
                    oid: EC_PUBLIC_KEY_OID,
                    parameters: Some(Any::encode_from(&SECP256K1_OID).map_err(der_error)?),
                },
                key.to_encoded_point(false).as_bytes().to_vec(),
            ),
        };
        Ok(SubjectPublicKeyInfoOwned {
            algorithm,
            subject_public_key: BitString::from_bytes(&key).map_err(der_error)?,
        })
    }

    /// Parse a DER encoded `SubjectPublicKeyInfo`.
    pub fn from_spki_der(der: &[u8]) -> Result<Self, TrustError> {
        let spki = SubjectPublicKeyInfoOwned::from_der(der).map_err(der_error)?;
        Self::from_spki(&spki)
    }

    /// DER encoded `SubjectPublicKeyInfo`.
    pub fn to_spki_der(&self) -> Result<Vec<u8>, TrustError> {
        self.to_spki()?.to_der().map_err(der_error)
    }

    /// secp256k1 key from a SEC1 point (compressed or uncompressed).
    pub fn secp256k1_from_sec1(bytes: &[u8]) -> Result<Self, TrustError> {
        k256::ecdsa::VerifyingKey::from_sec1_bytes(bytes)
            .map(Self::Secp256k1)
            .map_err(|e| TrustError::InvalidKey(e.to_string()))
    }

    /// Uncompressed SEC1 point, for secp256k1 keys only.
    #[must_use]
    pub fn to_sec1(&self) -> Option<Vec<u8>> {
        match self {
            Self::Ed25519(_) => None,
            Self::Secp256k1(key) => Some(key.to_encoded_point(false).as_bytes().to_vec()),
        }
    }

    /// Stable byte form used to index keys: raw Ed25519 bytes or the
    /// compressed SEC1 point.
    #[must_use]
    pub fn fingerprint(&self) -> Vec<u8> {
        match self {
            Self::Ed25519(key) => key.to_bytes().to_vec(),
            Self::Secp256k1(key) => key.to_encoded_point(true).as_bytes().to_vec(),
        }
    }

    /// Verify `signature` over `message`.
    ///
    /// ECDSA signatures may be DER encoded or fixed-width `r||s`; high-S
    /// values are normalized before verification.
    pub fn verify(
        &self,
        algorithm: SignatureAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), TrustError> {
        if !algorithm.accepts(self) {
            return Err(TrustError::AlgorithmMismatch);
        }

        match self {
            Self::Ed25519(key) => {
                let signature = ed25519_dalek::Signature::from_slice(signature)
                    .map_err(|_| TrustError::BadSignature)?;
                key.verify_strict(message, &signature)
                    .map_err(|_| TrustError::BadSignature)
            }
            Self::Secp256k1(key) => {
                use k256::ecdsa::signature::Verifier;

                let signature = k256::ecdsa::Signature::from_der(signature)
                    .or_else(|_| k256::ecdsa::Signature::from_slice(signature))
                    .map_err(|_| TrustError::BadSignature)?;
                let signature = signature.normalize_s().unwrap_or(signature);
                key.verify(message, &signature)
                    .map_err(|_| TrustError::BadSignature)
            }
        }
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint() == other.fingerprint()
    }
}

impl Eq for PublicKey {}

fn named_curve(parameters: Option<&Any>) -> Result<ObjectIdentifier, TrustError> {
    let parameters =
        parameters.ok_or_else(|| TrustError::InvalidKey("missing EC curve parameters".into()))?;
    if parameters.tag() != Tag::ObjectIdentifier {
        return Err(TrustError::InvalidKey("EC parameters are not a named curve".into()));
    }
    ObjectIdentifier::from_bytes(parameters.value())
        .map_err(|e| TrustError::InvalidKey(e.to_string()))
}

fn der_error(e: x509_cert::der::Error) -> TrustError {
    TrustError::InvalidKey(e.to_string())
}

// =============================================================================
// SIGNING KEYS
// =============================================================================

/// A private key for producing signatures.
///
/// Used by document signers and by fixtures; the contract core never signs.
#[derive(Clone)]
pub enum SigningKey {
    Ed25519(ed25519_dalek::SigningKey),
    Secp256k1(k256::ecdsa::SigningKey),
}

impl SigningKey {
    /// Ed25519 key from a 32-byte seed.
    #[must_use]
    pub fn ed25519_from_seed(seed: &[u8; 32]) -> Self {
        Self::Ed25519(ed25519_dalek::SigningKey::from_bytes(seed))
    }

    /// secp256k1 key from a 32-byte scalar.
    pub fn secp256k1_from_bytes(bytes: &[u8; 32]) -> Result<Self, TrustError> {
        k256::ecdsa::SigningKey::from_slice(bytes)
            .map(Self::Secp256k1)
            .map_err(|e| TrustError::InvalidKey(e.to_string()))
    }

    /// The algorithm this key signs with.
    #[must_use]
    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            Self::Ed25519(_) => SignatureAlgorithm::Ed25519,
            Self::Secp256k1(_) => SignatureAlgorithm::EcdsaSecp256k1Sha256,
        }
    }

    /// The matching verifying key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Ed25519(key) => PublicKey::Ed25519(key.verifying_key()),
            Self::Secp256k1(key) => PublicKey::Secp256k1(*key.verifying_key()),
        }
    }

    /// Sign in the X.509 encoding: DER for ECDSA, raw for Ed25519.
    #[must_use]
    pub fn sign_der(&self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Ed25519(key) => ed25519_dalek::Signer::sign(key, message).to_bytes().to_vec(),
            Self::Secp256k1(key) => {
                let signature: k256::ecdsa::Signature =
                    k256::ecdsa::signature::Signer::sign(key, message);
                signature.to_der().as_bytes().to_vec()
            }
        }
    }

    /// Sign in fixed-width form: 64 bytes for both schemes (`r||s` for ECDSA).
    #[must_use]
    pub fn sign_fixed(&self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Ed25519(key) => ed25519_dalek::Signer::sign(key, message).to_bytes().to_vec(),
            Self::Secp256k1(key) => {
                let signature: k256::ecdsa::Signature =
                    k256::ecdsa::signature::Signer::sign(key, message);
                signature.to_bytes().to_vec()
            }
        }
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SigningKey").field(&self.algorithm()).finish()
    }
}
