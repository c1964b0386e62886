//! # Embedded Signature Verification
//!
//! ## Steps
//!
//! 1. Parse the document and index every id-bearing element.
//! 2. Locate the single `Signature` element and parse it.
//! 3. Resolve the signing certificate from `KeyInfo`.
//! 4. For each reference: resolve the target, apply the transforms,
//!    canonicalize, digest, and compare in constant time.
//! 5. Canonicalize `SignedInfo` and verify `SignatureValue` over it.
//! 6. Validate the signer's certificate chain.
//!
//! Any failing step rejects the whole signature.

use super::algorithms::{CanonicalizationMethod, SignatureMethod, Transform};
use super::c14n::Canonicalizer;
use super::document::{parse, single_signature, IdIndex};
use super::dsig::{Reference, ReferenceTarget, SignatureBlock};
use super::keys::resolve_signer;
use crate::domain::entities::{EmbeddedVerification, VerifiedSigner};
use crate::domain::errors::SignatureError;
use cc_01_trust_validation::{TrustError, TrustValidationApi};
use roxmltree::{Document, Node};
use shared_types::Timestamp;
use subtle::ConstantTimeEq;
use tracing::debug;

/// Width of an ECDSA secp256k1 `r||s` signature value.
const ECDSA_FIXED_WIDTH: usize = 64;

/// Verify the single embedded signature of `document` at time `at`.
pub fn verify_embedded<T>(
    trust: &T,
    document: &str,
    at: Timestamp,
) -> Result<EmbeddedVerification, SignatureError>
where
    T: TrustValidationApi + ?Sized,
{
    let doc = parse(document)?;
    let ids = IdIndex::build(&doc);
    let block = SignatureBlock::parse(single_signature(&doc)?)?;

    let algorithm = block.signature_method.algorithm();
    let certificate = resolve_signer(&block.key_sources, algorithm, trust.context())?;

    for reference in &block.references {
        check_reference(&doc, &ids, block.element, reference)?;
    }

    if block.signature_method == SignatureMethod::EcdsaSha256
        && block.signature_value.len() != ECDSA_FIXED_WIDTH
    {
        return Err(SignatureError::VerificationFailed);
    }
    let signed_info = Canonicalizer::new(block.canonicalization).subtree(block.signed_info);
    certificate
        .public_key()
        .verify(algorithm, signed_info.as_bytes(), &block.signature_value)
        .map_err(|_| SignatureError::VerificationFailed)?;

    trust
        .validate_certificate(&certificate, at)
        .map_err(TrustError::from)?;

    let signer = VerifiedSigner::from_certificate(&certificate)?;
    let references: Vec<String> = block.references.iter().map(|r| r.target.uri()).collect();
    debug!(
        serial = %signer.serial,
        party = %signer.party_id,
        references = ?references,
        "Embedded signature verified"
    );

    Ok(EmbeddedVerification {
        signer,
        references,
        signature_value: block.signature_value,
    })
}

/// Recompute one reference digest and compare it with the declared value.
fn check_reference(
    doc: &Document<'_>,
    ids: &IdIndex<'_, '_>,
    signature: Node<'_, '_>,
    reference: &Reference,
) -> Result<(), SignatureError> {
    let mut method = CanonicalizationMethod::Inclusive;
    let mut exclude = None;
    for transform in &reference.transforms {
        match transform {
            Transform::EnvelopedSignature => exclude = Some(signature.id()),
            Transform::Canonicalize(m) => method = *m,
        }
    }

    // Same-document references never carry comments.
    let canonicalizer = Canonicalizer::new(method).without_comments().excluding(exclude);
    let octets = match &reference.target {
        ReferenceTarget::Document => canonicalizer.document(doc),
        ReferenceTarget::Element(id) => canonicalizer.subtree(ids.resolve(id)?),
    };

    let digest = reference.digest_method.digest(octets.as_bytes());
    let matches = digest.len() == reference.digest_value.len()
        && bool::from(digest.as_slice().ct_eq(reference.digest_value.as_slice()));
    if !matches {
        return Err(SignatureError::DigestMismatch(reference.target.uri()));
    }
    Ok(())
}
