//! # Inbound Ports (Driving Ports / API)
//!
//! The contract's operations. Submit operations return an [`Outcome`] whose
//! events are published by the host after the writes were committed;
//! evaluate operations never write.

use crate::domain::errors::TransferError;
use crate::domain::invocation::InvocationContext;
use crate::domain::note::{DeliveryNote, NoteView};
use crate::domain::outcome::Outcome;
use crate::domain::register::{AssetAttributes, RegisteredAsset};
use crate::domain::waybill::{AssetView, SignedPayload, TransitionResult, Waybill};
use shared_types::Party;

/// Custody handoff, delivery-note and asset register operations.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait CustodyTransferApi: Send + Sync {
    // =========================================================================
    // Custody handoff (waybill)
    // =========================================================================

    /// Next free asset id for the calling shipper: `CCC-GLN-n`.
    fn reserve_asset_id(&self, ctx: &InvocationContext) -> Result<Outcome<String>, TransferError>;

    /// Create a waybill in status `Created`.
    fn create_asset(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        shipper: Party,
        carrier: Party,
        receiver: Party,
    ) -> Result<Outcome<Waybill>, TransferError>;

    /// Apply whichever signed step the waybill's status expects.
    fn transition(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        signed: &SignedPayload,
    ) -> Result<Outcome<TransitionResult>, TransferError>;

    /// Shipper signs the waybill payload: `Created → PendingIntermediary`.
    fn dispatch_by_originator(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        signed: &SignedPayload,
    ) -> Result<Outcome<TransitionResult>, TransferError>;

    /// Carrier countersigns: `PendingIntermediary → PendingFinal`.
    fn endorse_by_intermediary(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        signed: &SignedPayload,
    ) -> Result<Outcome<TransitionResult>, TransferError>;

    /// Receiver countersigns: `PendingFinal → Completed`, purging private data.
    fn endorse_by_final(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        signed: &SignedPayload,
    ) -> Result<Outcome<TransitionResult>, TransferError>;

    /// Withdraw a waybill that was never dispatched.
    fn delete_asset(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
    ) -> Result<Outcome<Waybill>, TransferError>;

    /// Public summary plus the private sub-records hosted at this peer.
    fn read_asset(&self, ctx: &InvocationContext, asset_id: &str)
        -> Result<AssetView, TransferError>;

    /// Public summaries with `start <= id < end` (empty bounds are open).
    fn assets_by_range(
        &self,
        ctx: &InvocationContext,
        start: &str,
        end: &str,
    ) -> Result<Vec<Waybill>, TransferError>;

    // =========================================================================
    // Delivery notes
    // =========================================================================

    fn create_note(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
        shipper: Party,
        receiver: Party,
        items: serde_json::Value,
    ) -> Result<Outcome<DeliveryNote>, TransferError>;

    /// Attach a message, optionally together with its signature.
    fn attach_message(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
        message: &str,
        signature: Option<&str>,
    ) -> Result<Outcome<DeliveryNote>, TransferError>;

    /// Attach a signature to the stored message it references.
    fn attach_signature(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
        signature: &str,
    ) -> Result<Outcome<DeliveryNote>, TransferError>;

    fn add_advice(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
        advice: &str,
    ) -> Result<Outcome<DeliveryNote>, TransferError>;

    fn update_items(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
        items: serde_json::Value,
    ) -> Result<Outcome<DeliveryNote>, TransferError>;

    fn read_note(&self, ctx: &InvocationContext, note_id: &str)
        -> Result<NoteView, TransferError>;

    /// The note's messages and signatures as one composite document.
    fn export_asset(&self, ctx: &InvocationContext, note_id: &str)
        -> Result<String, TransferError>;

    fn delete_note(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
    ) -> Result<Outcome<DeliveryNote>, TransferError>;

    // =========================================================================
    // Asset register
    // =========================================================================

    /// Register an asset. `signed` must cover the owner's name.
    fn register_asset(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        attributes: AssetAttributes,
        signed: &SignedPayload,
    ) -> Result<Outcome<RegisteredAsset>, TransferError>;

    /// Replace every attribute of a registered asset.
    fn update_registered_asset(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        attributes: AssetAttributes,
        signed: &SignedPayload,
    ) -> Result<Outcome<RegisteredAsset>, TransferError>;

    /// Hand a registered asset to `new_owner`; `signed` covers the new
    /// owner's name. Returns the previous owner.
    fn transfer_asset(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
        new_owner: &str,
        signed: &SignedPayload,
    ) -> Result<Outcome<String>, TransferError>;

    fn delete_registered_asset(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
    ) -> Result<Outcome<RegisteredAsset>, TransferError>;

    fn asset_exists(&self, ctx: &InvocationContext, asset_id: &str) -> Result<bool, TransferError>;

    fn read_registered_asset(
        &self,
        ctx: &InvocationContext,
        asset_id: &str,
    ) -> Result<RegisteredAsset, TransferError>;

    /// Every registered asset in id order.
    fn all_assets(&self, ctx: &InvocationContext) -> Result<Vec<RegisteredAsset>, TransferError>;
}
