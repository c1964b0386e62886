//! # Custody Handoff
//!
//! Waybill operations. A signed step is checked in this order before
//! anything is staged:
//!
//! 1. replay of an applied step (no-op, no events)
//! 2. status allows a step, and the one requested
//! 3. caller role is the expected signatory
//! 4. caller, peer and party organizations agree
//! 5. payload equals the dispatched payload
//! 6. detached signature and certificate chain
//! 7. signer is the expected party

use super::{
    check_role, encode, event_payload, require, require_party, CustodyTransferService,
};
use crate::domain::errors::TransferError;
use crate::domain::invocation::InvocationContext;
use crate::domain::keys::{
    reservation_key, waybill_key, waybill_range, CARRIER_RECEIVER, SHIPPER_CARRIER, WORLD_STATE,
};
use crate::domain::outcome::Outcome;
use crate::domain::waybill::{
    AppliedStep, AssetView, PrivateWaybill, RecordedSignature, SignedPayload, TransitionResult,
    Waybill, WaybillStatus,
};
use crate::ports::outbound::{AssetRegistry, WriteBatch};
use cc_01_trust_validation::{CertificateSerial, TrustValidationApi};
use cc_02_signature_verification::SignatureVerificationApi;
use shared_bus::LedgerEvent;
use shared_types::{Party, Role};
use tracing::{debug, info, warn};

impl<R, T> CustodyTransferService<R, T>
where
    R: AssetRegistry,
    T: TrustValidationApi,
{
    pub(crate) fn reserve(&self, ctx: &InvocationContext) -> Result<Outcome<String>, TransferError> {
        check_role(ctx, Role::Shipper)?;
        let serial = ctx
            .caller
            .certificate_serial
            .as_deref()
            .ok_or(TransferError::EmptyInput("certificateSerial"))?;
        let serial = CertificateSerial::parse(serial)?;
        let identity = self.signatures.trust().party_identity(&serial)?;

        let key = reservation_key(&identity.canonical_id()?);
        let mut sequence: u64 = self.load(WORLD_STATE, &key)?.unwrap_or(0);
        let asset_id = loop {
            sequence += 1;
            let candidate = identity.reservation_id(sequence)?;
            if self.registry.get(WORLD_STATE, &waybill_key(&candidate))?.is_none() {
                break candidate;
            }
        };

        self.registry.put(WORLD_STATE, &key, encode(&key, &sequence)?)?;
        debug!(%asset_id, "Reserved asset id");
        Ok(Outcome::quiet(asset_id))
    }

    pub(crate) fn create(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        shipper: Party,
        carrier: Party,
        receiver: Party,
    ) -> Result<Outcome<Waybill>, TransferError> {
        require("assetId", asset_id)?;
        require_party("shipper", &shipper)?;
        require_party("carrier", &carrier)?;
        require_party("receiver", &receiver)?;
        check_role(ctx, Role::Shipper)?;
        self.check_locality(ctx, &shipper)?;

        let key = waybill_key(asset_id);
        if self.registry.get(WORLD_STATE, &key)?.is_some() {
            return Err(TransferError::AlreadyExists(format!("Asset {asset_id}")));
        }

        let waybill = Waybill::new(asset_id, shipper, carrier, receiver, ctx.timestamp);
        self.registry.put(WORLD_STATE, &key, encode(&key, &waybill)?)?;

        info!(%asset_id, shipper = %waybill.shipper.id, "Asset created");
        let event = LedgerEvent::AssetCreated {
            asset_id: asset_id.to_string(),
            payload: event_payload(&key, &waybill)?,
        };
        Ok(Outcome::with_event(waybill, event))
    }

    /// Apply the signed step the waybill expects. With `required`, only when
    /// the waybill is in that status.
    pub(crate) fn apply_step(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        signed: &SignedPayload,
        required: Option<(WaybillStatus, &'static str)>,
    ) -> Result<Outcome<TransitionResult>, TransferError> {
        require("assetId", asset_id)?;
        if signed.signature.is_empty() {
            return Err(TransferError::EmptyInput("signature"));
        }
        if signed.payload.is_empty() {
            return Err(TransferError::EmptyInput("payload"));
        }

        let mut waybill = self.load_waybill(asset_id)?;
        let from = waybill.status;

        if waybill.applied_step(signed).is_some() {
            debug!(%asset_id, status = %from, "Signed payload already applied");
            return Ok(Outcome::quiet(TransitionResult {
                asset_id: asset_id.to_string(),
                from,
                to: from,
                applied: false,
                waybill,
                completed: None,
            }));
        }

        let operation = required.map_or("transition", |(_, name)| name);
        let (role, to) = match (from.expected_signatory(), from.next()) {
            (Some(role), Some(to)) if required.map_or(true, |(status, _)| status == from) => {
                (role, to)
            }
            _ => {
                return Err(TransferError::WrongStatus {
                    asset_id: asset_id.to_string(),
                    status: from.to_string(),
                    operation,
                })
            }
        };
        check_role(ctx, role)?;
        let party = waybill.party(role).clone();
        self.check_locality(ctx, &party)?;

        let mut private = match role {
            Role::Shipper => PrivateWaybill::new(asset_id, signed.payload.clone()),
            Role::Carrier => self.load_private(SHIPPER_CARRIER, asset_id)?,
            Role::Receiver => self.load_private(CARRIER_RECEIVER, asset_id)?,
        };
        if private.payload != signed.payload {
            return Err(TransferError::PayloadMismatch(asset_id.to_string()));
        }

        let signer = self
            .signatures
            .verify_detached(signed, ctx.timestamp)
            .inspect_err(|err| warn!(%asset_id, %err, "Step signature rejected"))?;
        if signer.party_id != party.id {
            return Err(TransferError::SignerMismatch {
                expected: party.id,
                actual: signer.party_id,
            });
        }

        // All checks passed: stage the writes.
        private.record(role, RecordedSignature::from(signed));
        let mut batch = WriteBatch::new();
        let mut completed = None;
        match role {
            Role::Shipper => {
                batch.put(SHIPPER_CARRIER, asset_id, encode(asset_id, &private)?);
            }
            Role::Carrier => {
                let bytes = encode(asset_id, &private)?;
                batch.put(SHIPPER_CARRIER, asset_id, bytes.clone());
                batch.put(CARRIER_RECEIVER, asset_id, bytes);
                waybill.custodian = waybill.carrier.clone();
            }
            Role::Receiver => {
                batch.delete(SHIPPER_CARRIER, asset_id);
                batch.delete(CARRIER_RECEIVER, asset_id);
                waybill.custodian = waybill.receiver.clone();
                completed = Some(private);
            }
        }

        let (payload_digest, signature_digest) = AppliedStep::digests(signed);
        waybill.applied.push(AppliedStep {
            role,
            signer_serial: signer.serial.clone(),
            payload_digest,
            signature_digest,
            applied_at: ctx.timestamp,
        });
        waybill.status = to;

        let key = waybill_key(asset_id);
        batch.put(WORLD_STATE, &key, encode(&key, &waybill)?);
        self.registry.commit(batch)?;

        info!(%asset_id, %from, %to, signer = %signer.party_id, "Asset transitioned");
        let payload = event_payload(&key, &waybill)?;
        let event = if to == WaybillStatus::Completed {
            LedgerEvent::AssetCompleted {
                asset_id: asset_id.to_string(),
                payload,
            }
        } else {
            LedgerEvent::AssetTransitioned {
                asset_id: asset_id.to_string(),
                from: from.to_string(),
                to: to.to_string(),
                payload,
            }
        };

        Ok(Outcome::with_event(
            TransitionResult {
                asset_id: asset_id.to_string(),
                from,
                to,
                applied: true,
                waybill,
                completed,
            },
            event,
        ))
    }

    pub(crate) fn delete(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
    ) -> Result<Outcome<Waybill>, TransferError> {
        require("assetId", asset_id)?;
        let waybill = self.load_waybill(asset_id)?;
        check_role(ctx, Role::Shipper)?;
        self.check_locality(ctx, &waybill.shipper)?;
        if waybill.status != WaybillStatus::Created {
            return Err(TransferError::WrongStatus {
                asset_id: asset_id.to_string(),
                status: waybill.status.to_string(),
                operation: "deleteAsset",
            });
        }

        let key = waybill_key(asset_id);
        self.registry.delete(WORLD_STATE, &key)?;

        info!(%asset_id, "Asset deleted");
        let event = LedgerEvent::AssetDeleted {
            asset_id: asset_id.to_string(),
            payload: event_payload(&key, &waybill)?,
        };
        Ok(Outcome::with_event(waybill, event))
    }

    pub(crate) fn read(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
    ) -> Result<AssetView, TransferError> {
        require("assetId", asset_id)?;
        let waybill = self.load_waybill(asset_id)?;

        let local = self.caller_is_local(ctx);
        let hosted = |partition: &str| local && waybill.hosts(partition, &self.peer_organization);
        let shipper_carrier = if hosted(SHIPPER_CARRIER) {
            self.load(SHIPPER_CARRIER, asset_id)?
        } else {
            None
        };
        let carrier_receiver = if hosted(CARRIER_RECEIVER) {
            self.load(CARRIER_RECEIVER, asset_id)?
        } else {
            None
        };

        Ok(AssetView {
            waybill,
            shipper_carrier,
            carrier_receiver,
        })
    }

    pub(crate) fn range(&self, start: &str, end: &str) -> Result<Vec<Waybill>, TransferError> {
        let (lower, upper) = waybill_range(start, end);
        self.registry
            .range(WORLD_STATE, &lower, &upper)?
            .into_iter()
            .map(|(key, bytes)| {
                serde_json::from_slice(&bytes).map_err(|e| TransferError::corrupt(key, e))
            })
            .collect()
    }

    fn load_private(&self, partition: &str, asset_id: &str) -> Result<PrivateWaybill, TransferError> {
        self.load(partition, asset_id)?.ok_or_else(|| {
            TransferError::corrupt(
                format!("{partition}/{asset_id}"),
                "private record missing for a dispatched asset",
            )
        })
    }
}
