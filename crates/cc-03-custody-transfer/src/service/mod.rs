//! # Custody Transfer Service
//!
//! Implements [`CustodyTransferApi`] over an [`AssetRegistry`] and a trust
//! validator.
//!
//! ## Architecture
//!
//! Every submit operation runs in three phases:
//! 1. Read the records it needs from the registry
//! 2. Run every check (input, status, role, locality, signature)
//! 3. Stage all writes in one `WriteBatch` and commit once
//!
//! Nothing is written when a check fails.

mod api;
mod custody;
mod notes;
mod register;

use crate::domain::errors::TransferError;
use crate::domain::invocation::InvocationContext;
use crate::domain::keys::{note_key, waybill_key, WORLD_STATE};
use crate::domain::note::DeliveryNote;
use crate::domain::waybill::Waybill;
use crate::ports::outbound::AssetRegistry;
use cc_01_trust_validation::TrustValidationApi;
use cc_02_signature_verification::SignatureVerificationService;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{OrganizationId, Party, Role};
use std::sync::Arc;

/// The custody transfer contract as executed at one peer.
pub struct CustodyTransferService<R, T>
where
    R: AssetRegistry,
    T: TrustValidationApi,
{
    /// Record store of this peer.
    pub(crate) registry: Arc<R>,
    /// Detached and embedded verification.
    pub(crate) signatures: SignatureVerificationService<T>,
    /// Organization hosting this peer.
    pub(crate) peer_organization: OrganizationId,
}

impl<R, T> CustodyTransferService<R, T>
where
    R: AssetRegistry,
    T: TrustValidationApi,
{
    pub fn new(registry: Arc<R>, trust: Arc<T>, peer_organization: OrganizationId) -> Self {
        Self {
            registry,
            signatures: SignatureVerificationService::new(trust),
            peer_organization,
        }
    }

    #[must_use]
    pub fn peer_organization(&self) -> &OrganizationId {
        &self.peer_organization
    }

    #[must_use]
    pub fn registry(&self) -> &R {
        &self.registry
    }

    #[must_use]
    pub fn trust(&self) -> &T {
        self.signatures.trust()
    }

    /// Decode the record at `key`, if present.
    pub(crate) fn load<D: DeserializeOwned>(
        &self,
        partition: &str,
        key: &str,
    ) -> Result<Option<D>, TransferError> {
        match self.registry.get(partition, key)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| TransferError::corrupt(key, e)),
            None => Ok(None),
        }
    }

    pub(crate) fn load_waybill(&self, asset_id: &str) -> Result<Waybill, TransferError> {
        self.load(WORLD_STATE, &waybill_key(asset_id))?
            .ok_or_else(|| TransferError::NotFound(format!("Asset {asset_id}")))
    }

    pub(crate) fn load_note(&self, note_id: &str) -> Result<DeliveryNote, TransferError> {
        self.load(WORLD_STATE, &note_key(note_id))?
            .ok_or_else(|| TransferError::NotFound(format!("Note {note_id}")))
    }

    /// Whether the caller's organization is the one hosting this peer.
    pub(crate) fn caller_is_local(&self, ctx: &InvocationContext) -> bool {
        ctx.caller.organization == self.peer_organization
    }

    /// Locality rule: the caller writes only at its own peer, on behalf of a
    /// party hosted by its own organization.
    pub(crate) fn check_locality(
        &self,
        ctx: &InvocationContext,
        party: &Party,
    ) -> Result<(), TransferError> {
        let caller = &ctx.caller.organization;
        if caller != &self.peer_organization || caller != &party.organization {
            return Err(TransferError::OrganizationMismatch {
                caller: caller.clone(),
                peer: self.peer_organization.clone(),
                expected: party.organization.clone(),
            });
        }
        Ok(())
    }
}

/// JSON bytes of a record.
pub(crate) fn encode<S: Serialize>(key: &str, record: &S) -> Result<Vec<u8>, TransferError> {
    serde_json::to_vec(record).map_err(|e| TransferError::corrupt(key, e))
}

/// JSON text of a record, for event payloads.
pub(crate) fn event_payload<S: Serialize>(key: &str, record: &S) -> Result<String, TransferError> {
    serde_json::to_string(record).map_err(|e| TransferError::corrupt(key, e))
}

pub(crate) fn require(name: &'static str, value: &str) -> Result<(), TransferError> {
    if value.trim().is_empty() {
        return Err(TransferError::EmptyInput(name));
    }
    Ok(())
}

pub(crate) fn require_party(name: &'static str, party: &Party) -> Result<(), TransferError> {
    if party.id.trim().is_empty() || party.organization.is_blank() {
        return Err(TransferError::EmptyInput(name));
    }
    Ok(())
}

pub(crate) fn check_role(ctx: &InvocationContext, expected: Role) -> Result<(), TransferError> {
    if ctx.caller.role != expected {
        return Err(TransferError::RoleMismatch {
            expected,
            actual: ctx.caller.role,
        });
    }
    Ok(())
}
