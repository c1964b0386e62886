//! # Certification Path Validation
//!
//! Builds a path from a leaf to a trust anchor and checks it.
//!
//! ## Algorithm
//!
//! 1. Depth-first search over issuer candidates. A candidate must carry the
//!    subject name the child names as issuer, and its key must verify the
//!    child's signature. Intermediates must be CAs and respect their path
//!    length constraint. A trust anchor ends the search.
//! 2. Revocation: every certificate below the anchor needs a current CRL
//!    signed by its issuer. No such CRL is a failure, not a pass.
//! 3. Validity: every certificate on the path must be within its window at
//!    the validation time.
//!
//! Revocation is checked before validity so that a listed serial is always
//! reported as `Revoked`.

use super::certificate::Certificate;
use super::crl::RevocationList;
use super::entities::ValidatedChain;
use super::errors::ChainFailure;
use shared_types::Timestamp;
use std::sync::Arc;
use tracing::debug;

/// Longest path (leaf and anchor included) the search will build.
pub const MAX_PATH_DEPTH: usize = 8;

/// Validate `leaf` against the supplied material at time `at`.
pub fn validate_chain(
    leaf: &Certificate,
    intermediates: &[Arc<Certificate>],
    anchors: &[Arc<Certificate>],
    crls: &[Arc<RevocationList>],
    at: Timestamp,
) -> Result<ValidatedChain, ChainFailure> {
    let path = build_path(leaf, intermediates, anchors)?;

    check_revocation(&path, crls, at)?;
    check_validity(&path, at)?;

    let anchor_subject = path
        .last()
        .map(|cert| cert.subject_text().to_string())
        .unwrap_or_default();

    debug!(
        leaf = %leaf.serial(),
        depth = path.len(),
        anchor = %anchor_subject,
        "Certification path accepted"
    );

    Ok(ValidatedChain {
        serials: path.iter().map(|cert| cert.serial().clone()).collect(),
        anchor_subject,
    })
}

// =============================================================================
// PATH BUILDING
// =============================================================================

fn build_path<'a>(
    leaf: &'a Certificate,
    intermediates: &'a [Arc<Certificate>],
    anchors: &'a [Arc<Certificate>],
) -> Result<Vec<&'a Certificate>, ChainFailure> {
    // The leaf itself may be an anchor.
    if anchors.iter().any(|anchor| anchor.as_ref() == leaf) {
        return Ok(vec![leaf]);
    }

    let mut path = vec![leaf];
    let mut dead_end = None;
    if extend(&mut path, intermediates, anchors, &mut dead_end) {
        return Ok(path);
    }

    Err(dead_end.unwrap_or_else(|| {
        ChainFailure::PathBuildFailed(format!("no path from {}", leaf.subject_text()))
    }))
}

fn extend<'a>(
    path: &mut Vec<&'a Certificate>,
    intermediates: &'a [Arc<Certificate>],
    anchors: &'a [Arc<Certificate>],
    dead_end: &mut Option<ChainFailure>,
) -> bool {
    let Some(current) = path.last().copied() else {
        return false;
    };

    if let Some(anchor) = anchors.iter().find(|anchor| current.is_issued_by(anchor)) {
        path.push(anchor.as_ref());
        return true;
    }

    if path.len() + 1 >= MAX_PATH_DEPTH {
        record(
            dead_end,
            ChainFailure::PathBuildFailed(format!("path exceeds {MAX_PATH_DEPTH} certificates")),
        );
        return false;
    }

    // Intermediates already below this point in the path.
    let below = path.len() - 1;
    for candidate in intermediates {
        let candidate = candidate.as_ref();
        if path.contains(&candidate)
            || !candidate.is_ca()
            || candidate
                .path_len_constraint()
                .is_some_and(|max| below > usize::from(max))
            || !current.is_issued_by(candidate)
        {
            continue;
        }

        path.push(candidate);
        if extend(path, intermediates, anchors, dead_end) {
            return true;
        }
        path.pop();
    }

    if current.is_self_issued() && current.is_issued_by(current) {
        record(
            dead_end,
            ChainFailure::Untrusted(format!(
                "self-signed {} is not a trust anchor",
                current.subject_text()
            )),
        );
    } else {
        record(
            dead_end,
            ChainFailure::PathBuildFailed(format!(
                "no issuer for {} (issuer {})",
                current.subject_text(),
                current.issuer_text()
            )),
        );
    }
    false
}

/// Keep the most telling dead end: an untrusted root beats a missing issuer.
fn record(slot: &mut Option<ChainFailure>, failure: ChainFailure) {
    match (slot.as_ref(), &failure) {
        (None, _) => *slot = Some(failure),
        (Some(ChainFailure::PathBuildFailed(_)), ChainFailure::Untrusted(_)) => {
            *slot = Some(failure);
        }
        _ => {}
    }
}

// =============================================================================
// REVOCATION AND VALIDITY
// =============================================================================

fn check_revocation(
    path: &[&Certificate],
    crls: &[Arc<RevocationList>],
    at: Timestamp,
) -> Result<(), ChainFailure> {
    for pair in path.windows(2) {
        let (cert, issuer) = (pair[0], pair[1]);

        let crl = crls
            .iter()
            .filter(|crl| crl.is_current(at) && crl.is_issued_by(issuer))
            .max_by_key(|crl| crl.this_update())
            .ok_or_else(|| {
                ChainFailure::RevocationUnknown(format!(
                    "no current CRL from {} covering serial {}",
                    issuer.subject_text(),
                    cert.serial()
                ))
            })?;

        if let Some(revoked_at) = crl.revoked_at(cert.serial()) {
            return Err(ChainFailure::Revoked {
                serial: cert.serial().clone(),
                issuer: issuer.subject_text().to_string(),
                revoked_at,
            });
        }
    }
    Ok(())
}

fn check_validity(path: &[&Certificate], at: Timestamp) -> Result<(), ChainFailure> {
    match path.iter().find(|cert| !cert.is_valid_at(at)) {
        Some(cert) => Err(ChainFailure::Expired {
            subject: cert.subject_text().to_string(),
            not_before: cert.not_before(),
            not_after: cert.not_after(),
            at,
        }),
        None => Ok(()),
    }
}
