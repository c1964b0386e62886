//! # Trust Material Loading
//!
//! Builds a [`TrustContext`] from a directory laid out as:
//!
//! ```text
//! <dir>/anchors/*.der        root CA certificates (required, non-empty)
//! <dir>/intermediates/*.der  intermediate CA certificates
//! <dir>/crls/*.der           CRL snapshots, one per issuing CA
//! <dir>/certs/*.der          signer certificates, looked up by serial
//! ```
//!
//! Files are read in name order. Other extensions are ignored.

use super::config::ConfigError;
use cc_01_trust_validation::{TrustContext, TrustContextBuilder, TrustError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const ANCHORS: &str = "anchors";
const INTERMEDIATES: &str = "intermediates";
const CRLS: &str = "crls";
const CERTS: &str = "certs";

/// Load and freeze the trust material under `dir`.
pub fn load_trust_context(dir: &Path) -> Result<TrustContext, ConfigError> {
    let anchors = der_files(&dir.join(ANCHORS))?;
    if anchors.is_empty() {
        return Err(ConfigError::NoTrustAnchors(dir.join(ANCHORS)));
    }

    let mut builder = TrustContext::builder();
    builder = add_all(builder, &anchors, TrustContextBuilder::anchor_der)?;
    builder = add_all(
        builder,
        &der_files(&dir.join(INTERMEDIATES))?,
        TrustContextBuilder::intermediate_der,
    )?;
    builder = add_all(
        builder,
        &der_files(&dir.join(CRLS))?,
        TrustContextBuilder::revocation_list_der,
    )?;
    builder = add_all(
        builder,
        &der_files(&dir.join(CERTS))?,
        TrustContextBuilder::certificate_der,
    )?;

    let context = builder.build().map_err(|e| invalid(dir, e))?;
    info!(dir = %dir.display(), "Trust material loaded");
    Ok(context)
}

fn add_all(
    mut builder: TrustContextBuilder,
    files: &[PathBuf],
    add: fn(TrustContextBuilder, &[u8]) -> Result<TrustContextBuilder, TrustError>,
) -> Result<TrustContextBuilder, ConfigError> {
    for path in files {
        let der = fs::read(path).map_err(|e| ConfigError::Unreadable {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        builder = add(builder, &der).map_err(|e| invalid(path, e))?;
        debug!(path = %path.display(), "Loaded");
    }
    Ok(builder)
}

/// `.der` files directly under `dir`, sorted. A missing directory is empty.
fn der_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let unreadable = |e: std::io::Error| ConfigError::Unreadable {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(unreadable)? {
        let path = entry.map_err(unreadable)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "der") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn invalid(path: &Path, err: TrustError) -> ConfigError {
    ConfigError::InvalidMaterial {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}
