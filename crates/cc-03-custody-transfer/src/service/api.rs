//! # Custody Transfer API Implementation

use super::CustodyTransferService;
use crate::domain::errors::TransferError;
use crate::domain::invocation::InvocationContext;
use crate::domain::note::{DeliveryNote, NoteView};
use crate::domain::outcome::Outcome;
use crate::domain::register::{AssetAttributes, RegisteredAsset};
use crate::domain::waybill::{AssetView, SignedPayload, TransitionResult, Waybill, WaybillStatus};
use crate::ports::inbound::CustodyTransferApi;
use crate::ports::outbound::AssetRegistry;
use cc_01_trust_validation::TrustValidationApi;
use shared_types::Party;

impl<R, T> CustodyTransferApi for CustodyTransferService<R, T>
where
    R: AssetRegistry,
    T: TrustValidationApi,
{
    fn reserve_asset_id(&self, ctx: &InvocationContext) -> Result<Outcome<String>, TransferError> {
        self.reserve(ctx)
    }

    fn create_asset(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        shipper: Party,
        carrier: Party,
        receiver: Party,
    ) -> Result<Outcome<Waybill>, TransferError> {
        self.create(ctx, asset_id, shipper, carrier, receiver)
    }

    fn transition(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        signed: &SignedPayload,
    ) -> Result<Outcome<TransitionResult>, TransferError> {
        self.apply_step(ctx, asset_id, signed, None)
    }

    fn dispatch_by_originator(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        signed: &SignedPayload,
    ) -> Result<Outcome<TransitionResult>, TransferError> {
        self.apply_step(
            ctx,
            asset_id,
            signed,
            Some((WaybillStatus::Created, "dispatchByOriginator")),
        )
    }

    fn endorse_by_intermediary(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        signed: &SignedPayload,
    ) -> Result<Outcome<TransitionResult>, TransferError> {
        self.apply_step(
            ctx,
            asset_id,
            signed,
            Some((WaybillStatus::PendingIntermediary, "endorseByIntermediary")),
        )
    }

    fn endorse_by_final(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        signed: &SignedPayload,
    ) -> Result<Outcome<TransitionResult>, TransferError> {
        self.apply_step(
            ctx,
            asset_id,
            signed,
            Some((WaybillStatus::PendingFinal, "endorseByFinal")),
        )
    }

    fn delete_asset(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
    ) -> Result<Outcome<Waybill>, TransferError> {
        self.delete(ctx, asset_id)
    }

    fn read_asset(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
    ) -> Result<AssetView, TransferError> {
        self.read(ctx, asset_id)
    }

    fn assets_by_range(
        &self,
        _ctx: &InvocationContext,
        start: &str,
        end: &str,
    ) -> Result<Vec<Waybill>, TransferError> {
        self.range(start, end)
    }

    fn create_note(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
        shipper: Party,
        receiver: Party,
        items: serde_json::Value,
    ) -> Result<Outcome<DeliveryNote>, TransferError> {
        self.create_delivery_note(ctx, note_id, shipper, receiver, items)
    }

    fn attach_message(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
        message: &str,
        signature: Option<&str>,
    ) -> Result<Outcome<DeliveryNote>, TransferError> {
        self.attach_note_message(ctx, note_id, message, signature)
    }

    fn attach_signature(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
        signature: &str,
    ) -> Result<Outcome<DeliveryNote>, TransferError> {
        self.attach_note_signature(ctx, note_id, signature)
    }

    fn add_advice(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
        advice: &str,
    ) -> Result<Outcome<DeliveryNote>, TransferError> {
        self.add_note_advice(ctx, note_id, advice)
    }

    fn update_items(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
        items: serde_json::Value,
    ) -> Result<Outcome<DeliveryNote>, TransferError> {
        self.update_note_items(ctx, note_id, items)
    }

    fn read_note(&self, ctx: &InvocationContext, note_id: &str) -> Result<NoteView, TransferError> {
        self.read_delivery_note(ctx, note_id)
    }

    fn export_asset(&self, _ctx: &InvocationContext, note_id: &str) -> Result<String, TransferError> {
        self.export_note(note_id)
    }

    fn delete_note(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
    ) -> Result<Outcome<DeliveryNote>, TransferError> {
        self.delete_delivery_note(ctx, note_id)
    }

    fn register_asset(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        attributes: AssetAttributes,
        signed: &SignedPayload,
    ) -> Result<Outcome<RegisteredAsset>, TransferError> {
        self.register(ctx, asset_id, attributes, signed)
    }

    fn update_registered_asset(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        attributes: AssetAttributes,
        signed: &SignedPayload,
    ) -> Result<Outcome<RegisteredAsset>, TransferError> {
        self.update_registered(ctx, asset_id, attributes, signed)
    }

    fn transfer_asset(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        new_owner: &str,
        signed: &SignedPayload,
    ) -> Result<Outcome<String>, TransferError> {
        self.transfer(ctx, asset_id, new_owner, signed)
    }

    fn delete_registered_asset(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
    ) -> Result<Outcome<RegisteredAsset>, TransferError> {
        self.deregister(ctx, asset_id)
    }

    fn asset_exists(&self, _ctx: &InvocationContext, asset_id: &str) -> Result<bool, TransferError> {
        self.registered_exists(asset_id)
    }

    fn read_registered_asset(
        &self,
        _ctx: &InvocationContext,
        asset_id: &str,
    ) -> Result<RegisteredAsset, TransferError> {
        self.load_registered(asset_id)
    }

    fn all_assets(&self, _ctx: &InvocationContext) -> Result<Vec<RegisteredAsset>, TransferError> {
        self.all_registered()
    }
}
