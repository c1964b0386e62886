//! # Custody Transfer Subsystem (CC-03)
//!
//! The signature-gated transfer contract. Three record kinds share one
//! registry:
//!
//! - **Waybill**: a custody handoff that advances
//!   `Created → PendingIntermediary → PendingFinal → Completed`, one
//!   detached signature per step, from shipper, carrier and receiver in
//!   that order. Completion purges the private partitions.
//! - **Delivery note**: an accumulating record of XML messages and the
//!   embedded signatures over them, exportable as one composite document.
//! - **Registered asset**: an ownership register entry; every owner change
//!   carries a signature over the new owner's name.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): records, statuses, storage layout, errors
//! - **Ports Layer** (`ports/`): `CustodyTransferApi` in, `AssetRegistry` out
//! - **Service Layer** (`service/`): the contract at one peer
//! - **Adapters** (`adapters/`): in-memory registry, event publishing,
//!   operation table
//!
//! ## Guarantees
//!
//! - Every check runs before the first write; one commit per operation.
//! - A replayed signed payload is a no-op and emits nothing.
//! - Callers write only at their own organization's peer.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::{
    dispatch, operation, EventPublishingAdapter, FixedTimeSource, InMemoryAssetRegistry, Intent,
    Invocation, OperationSpec, SystemTimeSource, OPERATIONS,
};
pub use domain::errors::TransferError;
pub use domain::invocation::InvocationContext;
pub use domain::keys::{CARRIER_RECEIVER, NOTE_PROPERTIES, SHIPPER_CARRIER, WORLD_STATE};
pub use domain::note::{DeliveryNote, MessageSignature, NoteMessage, NoteStatus, NoteView};
pub use domain::outcome::Outcome;
pub use domain::register::{AssetAttributes, RegisteredAsset};
pub use domain::waybill::{
    AppliedStep, AssetView, PrivateWaybill, RecordedSignature, SignedPayload, TransitionResult,
    Waybill, WaybillStatus, REQUIRED_SIGNATORIES,
};
pub use ports::inbound::CustodyTransferApi;
pub use ports::outbound::{AssetRegistry, RegistryError, TimeSource, WriteBatch, WriteOp};
pub use service::CustodyTransferService;
