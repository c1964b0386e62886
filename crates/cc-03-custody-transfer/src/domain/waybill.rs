//! # Waybill
//!
//! The custody-handoff record. A public summary tracks status, parties and
//! the applied signature steps; the signed payload and signatures live in
//! two private partitions shared by neighbouring parties.
//!
//! ```text
//! Created ──Shipper──→ PendingIntermediary ──Carrier──→ PendingFinal ──Receiver──→ Completed
//!            signs                            signs                     signs
//! ```

use super::keys::{CARRIER_RECEIVER, SHIPPER_CARRIER};
use cc_01_trust_validation::{CertificateSerial, SignatureAlgorithm};
use cc_02_signature_verification::DetachedSignature;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::{OrganizationId, Party, Role, Timestamp};
use std::fmt;

/// A payload together with its detached signature and signer reference.
pub type SignedPayload = DetachedSignature;

/// Signing order of a custody handoff.
pub const REQUIRED_SIGNATORIES: [Role; 3] = [Role::Shipper, Role::Carrier, Role::Receiver];

/// Lifecycle of a waybill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaybillStatus {
    Created,
    PendingIntermediary,
    PendingFinal,
    Completed,
}

impl WaybillStatus {
    /// The role whose signature moves the waybill on, if any.
    #[must_use]
    pub fn expected_signatory(&self) -> Option<Role> {
        match self {
            Self::Created => Some(Role::Shipper),
            Self::PendingIntermediary => Some(Role::Carrier),
            Self::PendingFinal => Some(Role::Receiver),
            Self::Completed => None,
        }
    }

    /// Status after the expected signatory signed.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Created => Some(Self::PendingIntermediary),
            Self::PendingIntermediary => Some(Self::PendingFinal),
            Self::PendingFinal => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::PendingIntermediary => "PENDING_INTERMEDIARY",
            Self::PendingFinal => "PENDING_FINAL",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for WaybillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of one applied signature step. Kept in the public summary so
/// replays are recognised after the private partitions were purged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedStep {
    pub role: Role,
    pub signer_serial: CertificateSerial,
    #[serde(with = "hex::serde")]
    pub payload_digest: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub signature_digest: Vec<u8>,
    pub applied_at: Timestamp,
}

impl AppliedStep {
    /// SHA-256 of the payload and of the signature bytes.
    #[must_use]
    pub fn digests(signed: &SignedPayload) -> (Vec<u8>, Vec<u8>) {
        (
            Sha256::digest(&signed.payload).to_vec(),
            Sha256::digest(&signed.signature).to_vec(),
        )
    }

    #[must_use]
    pub fn matches(&self, signed: &SignedPayload) -> bool {
        let (payload, signature) = Self::digests(signed);
        self.payload_digest == payload && self.signature_digest == signature
    }
}

/// Public summary of a waybill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waybill {
    pub id: String,
    pub shipper: Party,
    pub carrier: Party,
    pub receiver: Party,
    pub status: WaybillStatus,
    pub required_signatories: Vec<Role>,
    pub applied: Vec<AppliedStep>,
    /// Party currently holding the goods.
    pub custodian: Party,
    pub created_at: Timestamp,
}

impl Waybill {
    pub fn new(
        id: impl Into<String>,
        shipper: Party,
        carrier: Party,
        receiver: Party,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            custodian: shipper.clone(),
            shipper,
            carrier,
            receiver,
            status: WaybillStatus::Created,
            required_signatories: REQUIRED_SIGNATORIES.to_vec(),
            applied: Vec::new(),
            created_at,
        }
    }

    /// The party named for `role`.
    #[must_use]
    pub fn party(&self, role: Role) -> &Party {
        match role {
            Role::Shipper => &self.shipper,
            Role::Carrier => &self.carrier,
            Role::Receiver => &self.receiver,
        }
    }

    /// The applied step this exact signed payload produced, if any.
    #[must_use]
    pub fn applied_step(&self, signed: &SignedPayload) -> Option<&AppliedStep> {
        self.applied.iter().find(|step| step.matches(signed))
    }

    /// Whether `organization` hosts `partition` for this waybill.
    #[must_use]
    pub fn hosts(&self, partition: &str, organization: &OrganizationId) -> bool {
        let members = match partition {
            SHIPPER_CARRIER => [&self.shipper, &self.carrier],
            CARRIER_RECEIVER => [&self.carrier, &self.receiver],
            _ => return false,
        };
        members.iter().any(|p| &p.organization == organization)
    }
}

/// A signature recorded in a private sub-record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedSignature {
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
    pub certificate_serial: CertificateSerial,
    pub algorithm: SignatureAlgorithm,
}

impl From<&SignedPayload> for RecordedSignature {
    fn from(signed: &SignedPayload) -> Self {
        Self {
            signature: signed.signature.clone(),
            certificate_serial: signed.certificate_serial.clone(),
            algorithm: signed.algorithm,
        }
    }
}

/// Private sub-record: the dispatched payload and the signatures over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateWaybill {
    pub id: String,
    #[serde(with = "hex::serde")]
    pub payload: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipper_signature: Option<RecordedSignature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_signature: Option<RecordedSignature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_signature: Option<RecordedSignature>,
}

impl PrivateWaybill {
    pub fn new(id: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            payload,
            shipper_signature: None,
            carrier_signature: None,
            receiver_signature: None,
        }
    }

    #[must_use]
    pub fn signature(&self, role: Role) -> Option<&RecordedSignature> {
        match role {
            Role::Shipper => self.shipper_signature.as_ref(),
            Role::Carrier => self.carrier_signature.as_ref(),
            Role::Receiver => self.receiver_signature.as_ref(),
        }
    }

    pub fn record(&mut self, role: Role, signature: RecordedSignature) {
        let slot = match role {
            Role::Shipper => &mut self.shipper_signature,
            Role::Carrier => &mut self.carrier_signature,
            Role::Receiver => &mut self.receiver_signature,
        };
        *slot = Some(signature);
    }
}

/// Result of a signed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResult {
    pub asset_id: String,
    pub from: WaybillStatus,
    pub to: WaybillStatus,
    /// False when the submission was a replay of an applied step.
    pub applied: bool,
    pub waybill: Waybill,
    /// The settled sub-record, returned once on completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<PrivateWaybill>,
}

/// What `readAsset` shows a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetView {
    pub waybill: Waybill,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipper_carrier: Option<PrivateWaybill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_receiver: Option<PrivateWaybill>,
}
