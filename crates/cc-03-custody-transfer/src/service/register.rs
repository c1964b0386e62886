//! # Asset Register
//!
//! Register operations. Whoever sets an owner signs the owner's name with a
//! certificate whose chain validates at the invocation time; the signer need
//! not be the owner.

use super::{encode, event_payload, require, CustodyTransferService};
use crate::domain::errors::TransferError;
use crate::domain::invocation::InvocationContext;
use crate::domain::keys::{holding_key, holding_range, WORLD_STATE};
use crate::domain::outcome::Outcome;
use crate::domain::register::{AssetAttributes, RegisteredAsset};
use crate::domain::waybill::SignedPayload;
use crate::ports::outbound::AssetRegistry;
use cc_01_trust_validation::TrustValidationApi;
use cc_02_signature_verification::{SignatureVerificationApi, VerifiedSigner};
use shared_bus::LedgerEvent;
use tracing::{debug, info, warn};

impl<R, T> CustodyTransferService<R, T>
where
    R: AssetRegistry,
    T: TrustValidationApi,
{
    pub(crate) fn register(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        attributes: AssetAttributes,
        signed: &SignedPayload,
    ) -> Result<Outcome<RegisteredAsset>, TransferError> {
        require("assetId", asset_id)?;
        let key = holding_key(asset_id);
        if self.registry.get(WORLD_STATE, &key)?.is_some() {
            return Err(TransferError::AlreadyExists(format!("Asset {asset_id}")));
        }
        let signer = self.verify_owner(ctx, asset_id, &attributes.owner, signed)?;

        let asset = RegisteredAsset::new(
            asset_id,
            attributes,
            signed.signature.clone(),
            signer.serial,
            ctx.timestamp,
        );
        self.registry.put(WORLD_STATE, &key, encode(&key, &asset)?)?;

        info!(%asset_id, owner = %asset.owner, "Asset registered");
        let event = LedgerEvent::AssetRegistered {
            asset_id: asset_id.to_string(),
            payload: event_payload(&key, &asset)?,
        };
        Ok(Outcome::with_event(asset, event))
    }

    pub(crate) fn update_registered(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        attributes: AssetAttributes,
        signed: &SignedPayload,
    ) -> Result<Outcome<RegisteredAsset>, TransferError> {
        require("assetId", asset_id)?;
        let key = holding_key(asset_id);
        self.load_registered(asset_id)?;
        let signer = self.verify_owner(ctx, asset_id, &attributes.owner, signed)?;

        let asset = RegisteredAsset::new(
            asset_id,
            attributes,
            signed.signature.clone(),
            signer.serial,
            ctx.timestamp,
        );
        self.registry.put(WORLD_STATE, &key, encode(&key, &asset)?)?;

        info!(%asset_id, owner = %asset.owner, "Registered asset updated");
        let event = LedgerEvent::AssetUpdated {
            asset_id: asset_id.to_string(),
            payload: event_payload(&key, &asset)?,
        };
        Ok(Outcome::with_event(asset, event))
    }

    /// Hand the asset to `new_owner`, returning the previous owner.
    pub(crate) fn transfer(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        new_owner: &str,
        signed: &SignedPayload,
    ) -> Result<Outcome<String>, TransferError> {
        require("assetId", asset_id)?;
        let mut asset = self.load_registered(asset_id)?;

        if asset.owner == new_owner && asset.owner_signature == signed.signature {
            debug!(%asset_id, owner = %new_owner, "Transfer already applied");
            return Ok(Outcome::quiet(asset.owner));
        }
        let signer = self.verify_owner(ctx, asset_id, new_owner, signed)?;

        let previous = asset.reassign(
            new_owner.to_string(),
            signed.signature.clone(),
            signer.serial,
            ctx.timestamp,
        );
        let key = holding_key(asset_id);
        self.registry.put(WORLD_STATE, &key, encode(&key, &asset)?)?;

        info!(%asset_id, %previous, owner = %new_owner, "Ownership transferred");
        let event = LedgerEvent::OwnershipTransferred {
            asset_id: asset_id.to_string(),
            previous_owner: previous.clone(),
            owner: new_owner.to_string(),
            payload: event_payload(&key, &asset)?,
        };
        Ok(Outcome::with_event(previous, event))
    }

    /// Remove a register entry. Only callers local to this peer may do so.
    pub(crate) fn deregister(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
    ) -> Result<Outcome<RegisteredAsset>, TransferError> {
        require("assetId", asset_id)?;
        let asset = self.load_registered(asset_id)?;
        if !self.caller_is_local(ctx) {
            return Err(TransferError::OrganizationMismatch {
                caller: ctx.caller.organization.clone(),
                peer: self.peer_organization.clone(),
                expected: self.peer_organization.clone(),
            });
        }

        let key = holding_key(asset_id);
        self.registry.delete(WORLD_STATE, &key)?;

        info!(%asset_id, "Registered asset deleted");
        let event = LedgerEvent::AssetDeregistered {
            asset_id: asset_id.to_string(),
            payload: event_payload(&key, &asset)?,
        };
        Ok(Outcome::with_event(asset, event))
    }

    pub(crate) fn registered_exists(&self, asset_id: &str) -> Result<bool, TransferError> {
        require("assetId", asset_id)?;
        Ok(self
            .registry
            .get(WORLD_STATE, &holding_key(asset_id))?
            .is_some())
    }

    pub(crate) fn load_registered(&self, asset_id: &str) -> Result<RegisteredAsset, TransferError> {
        require("assetId", asset_id)?;
        self.load(WORLD_STATE, &holding_key(asset_id))?
            .ok_or_else(|| TransferError::NotFound(format!("Asset {asset_id}")))
    }

    pub(crate) fn all_registered(&self) -> Result<Vec<RegisteredAsset>, TransferError> {
        let (lower, upper) = holding_range();
        self.registry
            .range(WORLD_STATE, &lower, &upper)?
            .into_iter()
            .map(|(key, bytes)| {
                serde_json::from_slice(&bytes).map_err(|e| TransferError::corrupt(key, e))
            })
            .collect()
    }

    /// The signature must cover exactly `owner` and verify with a trusted
    /// chain.
    fn verify_owner(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        owner: &str,
        signed: &SignedPayload,
    ) -> Result<VerifiedSigner, TransferError> {
        require("owner", owner)?;
        if signed.signature.is_empty() {
            return Err(TransferError::EmptyInput("signature"));
        }
        if signed.payload != owner.as_bytes() {
            return Err(TransferError::OwnerMismatch(owner.to_string()));
        }
        self.signatures
            .verify_detached(signed, ctx.timestamp)
            .inspect_err(|err| warn!(%asset_id, %err, "Owner signature rejected"))
            .map_err(TransferError::from)
    }
}
