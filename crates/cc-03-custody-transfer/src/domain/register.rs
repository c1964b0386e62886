//! # Asset Register
//!
//! A plain ownership register next to the custody handoff. Each entry names
//! an owner, and every write that sets the owner carries a detached
//! signature over the owner's name bytes.

use cc_01_trust_validation::CertificateSerial;
use serde::{Deserialize, Serialize};
use shared_types::Timestamp;

/// Attributes supplied when registering or updating an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetAttributes {
    pub color: String,
    pub size: u32,
    pub owner: String,
    pub appraised_value: u64,
}

/// A register entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredAsset {
    pub id: String,
    pub color: String,
    pub size: u32,
    pub owner: String,
    pub appraised_value: u64,
    /// Signature over `owner`, as submitted.
    #[serde(with = "hex::serde")]
    pub owner_signature: Vec<u8>,
    pub signer_serial: CertificateSerial,
    pub updated_at: Timestamp,
}

impl RegisteredAsset {
    pub fn new(
        id: impl Into<String>,
        attributes: AssetAttributes,
        owner_signature: Vec<u8>,
        signer_serial: CertificateSerial,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            color: attributes.color,
            size: attributes.size,
            owner: attributes.owner,
            appraised_value: attributes.appraised_value,
            owner_signature,
            signer_serial,
            updated_at,
        }
    }

    /// Hand the asset to `owner`, returning the previous owner.
    pub fn reassign(
        &mut self,
        owner: String,
        owner_signature: Vec<u8>,
        signer_serial: CertificateSerial,
        at: Timestamp,
    ) -> String {
        self.owner_signature = owner_signature;
        self.signer_serial = signer_serial;
        self.updated_at = at;
        std::mem::replace(&mut self.owner, owner)
    }
}
