//! # Delivery Notes
//!
//! Messages are stored under the `id` of their root element. A signature is
//! matched to a message only by its single `#id` reference, and is verified
//! embedded in the composite `<DELNOTE>message signature</DELNOTE>`.

use super::{
    check_role, encode, event_payload, require, require_party, CustodyTransferService,
};
use crate::domain::errors::TransferError;
use crate::domain::invocation::InvocationContext;
use crate::domain::keys::{implicit_partition, note_key, NOTE_PROPERTIES, WORLD_STATE};
use crate::domain::note::{composite, DeliveryNote, NoteView};
use crate::domain::outcome::Outcome;
use crate::ports::outbound::{AssetRegistry, WriteBatch};
use cc_01_trust_validation::TrustValidationApi;
use cc_02_signature_verification::{
    element_id, parse, single_signature, strip_declaration, ReferenceTarget, SignatureBlock,
    SignatureVerificationApi, VerifiedSigner,
};
use shared_bus::LedgerEvent;
use shared_types::{Party, Role};
use tracing::{debug, info, warn};

impl<R, T> CustodyTransferService<R, T>
where
    R: AssetRegistry,
    T: TrustValidationApi,
{
    pub(crate) fn create_delivery_note(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
        shipper: Party,
        receiver: Party,
        items: serde_json::Value,
    ) -> Result<Outcome<DeliveryNote>, TransferError> {
        require("noteId", note_id)?;
        require_party("shipper", &shipper)?;
        require_party("receiver", &receiver)?;
        check_role(ctx, Role::Shipper)?;
        self.check_locality(ctx, &shipper)?;

        let properties = match ctx.transient(NOTE_PROPERTIES) {
            Some(bytes) => Some(
                serde_json::from_slice::<serde_json::Value>(bytes).map_err(|e| {
                    TransferError::InvalidInput {
                        name: NOTE_PROPERTIES,
                        reason: e.to_string(),
                    }
                })?,
            ),
            None => None,
        };

        let key = note_key(note_id);
        if self.registry.get(WORLD_STATE, &key)?.is_some() {
            return Err(TransferError::AlreadyExists(format!("Note {note_id}")));
        }

        let note = DeliveryNote::new(note_id, shipper, receiver, items, ctx.timestamp);
        let mut batch = WriteBatch::new();
        batch.put(WORLD_STATE, &key, encode(&key, &note)?);
        if let Some(properties) = properties {
            if self.caller_is_local(ctx) {
                let partition = implicit_partition(&ctx.caller.organization);
                batch.put(&partition, note_id, encode(note_id, &properties)?);
            } else {
                debug!(%note_id, "Private properties not saved away from caller's peer");
            }
        }
        self.registry.commit(batch)?;

        info!(%note_id, shipper = %note.shipper.id, "Note created");
        let event = LedgerEvent::NoteCreated {
            note_id: note_id.to_string(),
            payload: event_payload(&key, &note)?,
        };
        Ok(Outcome::with_event(note, event))
    }

    pub(crate) fn attach_note_message(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
        message: &str,
        signature: Option<&str>,
    ) -> Result<Outcome<DeliveryNote>, TransferError> {
        require("noteId", note_id)?;
        require("message", message)?;
        let mut note = self.load_note(note_id)?;
        self.check_note_access(ctx, &note)?;

        let message = strip_declaration(message);
        let message_id = message_id(message)?;
        if note.message(&message_id).is_some() {
            return Err(TransferError::AlreadyExists(format!("Message {message_id}")));
        }

        let verified = match signature.filter(|s| !s.trim().is_empty()) {
            Some(signature) => {
                let signature = strip_declaration(signature);
                let referenced = signature_reference(signature)?;
                if referenced != message_id {
                    return Err(TransferError::ReferenceMismatch {
                        expected: format!("#{message_id}"),
                        found: format!("#{referenced}"),
                    });
                }
                let signer = self.verify_note_signature(ctx, &note, message, signature)?;
                Some((signature, signer))
            }
            None => None,
        };

        note.push_message(message_id.clone(), message.to_string(), ctx.timestamp);
        if let Some((signature, signer)) = verified {
            note.push_signature(
                &message_id,
                signature.to_string(),
                signer.party_id,
                signer.serial,
                ctx.timestamp,
            );
        }

        let key = note_key(note_id);
        self.registry.put(WORLD_STATE, &key, encode(&key, &note)?)?;

        info!(%note_id, %message_id, status = ?note.status, "Message attached");
        let event = LedgerEvent::MessageAttached {
            note_id: note_id.to_string(),
            message_id,
            payload: event_payload(&key, &note)?,
        };
        Ok(Outcome::with_event(note, event))
    }

    pub(crate) fn attach_note_signature(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
        signature: &str,
    ) -> Result<Outcome<DeliveryNote>, TransferError> {
        require("noteId", note_id)?;
        require("signature", signature)?;
        let mut note = self.load_note(note_id)?;
        self.check_note_access(ctx, &note)?;

        let signature = strip_declaration(signature);
        let message_id = signature_reference(signature)?;
        let message = note
            .message(&message_id)
            .ok_or_else(|| TransferError::NotFound(format!("Message {message_id}")))?;

        if message.signatures.iter().any(|s| s.document == signature) {
            debug!(%note_id, %message_id, "Signature already attached");
            return Ok(Outcome::quiet(note));
        }

        let signer = self.verify_note_signature(ctx, &note, &message.document, signature)?;
        note.push_signature(
            &message_id,
            signature.to_string(),
            signer.party_id,
            signer.serial,
            ctx.timestamp,
        );

        let key = note_key(note_id);
        self.registry.put(WORLD_STATE, &key, encode(&key, &note)?)?;

        info!(%note_id, %message_id, status = ?note.status, "Signature attached");
        let event = LedgerEvent::SignatureAttached {
            note_id: note_id.to_string(),
            message_id,
            payload: event_payload(&key, &note)?,
        };
        Ok(Outcome::with_event(note, event))
    }

    pub(crate) fn add_note_advice(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
        advice: &str,
    ) -> Result<Outcome<DeliveryNote>, TransferError> {
        require("noteId", note_id)?;
        require("advice", advice)?;
        let mut note = self.load_note(note_id)?;
        self.check_note_access(ctx, &note)?;

        note.advices.push(advice.to_string());
        let key = note_key(note_id);
        self.registry.put(WORLD_STATE, &key, encode(&key, &note)?)?;

        debug!(%note_id, advices = note.advices.len(), "Advice added");
        let event = LedgerEvent::AdviceAdded {
            note_id: note_id.to_string(),
            payload: event_payload(&key, &note)?,
        };
        Ok(Outcome::with_event(note, event))
    }

    pub(crate) fn update_note_items(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
        items: serde_json::Value,
    ) -> Result<Outcome<DeliveryNote>, TransferError> {
        require("noteId", note_id)?;
        if items.is_null() {
            return Err(TransferError::EmptyInput("items"));
        }
        let mut note = self.load_note(note_id)?;
        self.check_note_access(ctx, &note)?;

        note.items = items;
        let key = note_key(note_id);
        self.registry.put(WORLD_STATE, &key, encode(&key, &note)?)?;

        debug!(%note_id, "Items updated");
        let event = LedgerEvent::ItemsUpdated {
            note_id: note_id.to_string(),
            payload: event_payload(&key, &note)?,
        };
        Ok(Outcome::with_event(note, event))
    }

    pub(crate) fn read_delivery_note(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
    ) -> Result<NoteView, TransferError> {
        require("noteId", note_id)?;
        let note = self.load_note(note_id)?;
        let private_properties = if self.caller_is_local(ctx) {
            self.load(&implicit_partition(&ctx.caller.organization), note_id)?
        } else {
            None
        };
        Ok(NoteView {
            note,
            private_properties,
        })
    }

    pub(crate) fn export_note(&self, note_id: &str) -> Result<String, TransferError> {
        require("noteId", note_id)?;
        Ok(self.load_note(note_id)?.export())
    }

    pub(crate) fn delete_delivery_note(
        &self,
        ctx: &InvocationContext,
        note_id: &str,
    ) -> Result<Outcome<DeliveryNote>, TransferError> {
        require("noteId", note_id)?;
        let note = self.load_note(note_id)?;
        self.check_note_access(ctx, &note)?;

        let key = note_key(note_id);
        let mut batch = WriteBatch::new();
        batch.delete(WORLD_STATE, &key);
        if self.caller_is_local(ctx) {
            batch.delete(&implicit_partition(&ctx.caller.organization), note_id);
        }
        self.registry.commit(batch)?;

        info!(%note_id, "Note deleted");
        let event = LedgerEvent::NoteDeleted {
            note_id: note_id.to_string(),
            payload: event_payload(&key, &note)?,
        };
        Ok(Outcome::with_event(note, event))
    }

    /// Writers must call at their own peer from the organization of one of
    /// the note's parties.
    fn check_note_access(
        &self,
        ctx: &InvocationContext,
        note: &DeliveryNote,
    ) -> Result<(), TransferError> {
        let party = [&note.shipper, &note.receiver]
            .into_iter()
            .find(|p| p.organization == ctx.caller.organization)
            .ok_or_else(|| TransferError::NotAParty(ctx.caller.organization.to_string()))?;
        self.check_locality(ctx, party)
    }

    /// Verify `signature` over `message` and check the signer is a party.
    fn verify_note_signature(
        &self,
        ctx: &InvocationContext,
        note: &DeliveryNote,
        message: &str,
        signature: &str,
    ) -> Result<VerifiedSigner, TransferError> {
        let verification = self
            .signatures
            .verify_embedded(&composite(message, signature), ctx.timestamp)
            .inspect_err(|err| warn!(note_id = %note.id, %err, "Note signature rejected"))?;

        let signer = verification.signer;
        if !note.is_party(&signer.party_id) {
            return Err(TransferError::NotAParty(signer.party_id));
        }
        Ok(signer)
    }
}

/// The `id` of a message's root element.
fn message_id(message: &str) -> Result<String, TransferError> {
    let doc = parse(message).map_err(|e| TransferError::InvalidInput {
        name: "message",
        reason: e.to_string(),
    })?;
    element_id(doc.root_element())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or(TransferError::EmptyInput("message id"))
}

/// The element id a detached note signature refers to. Exactly one
/// same-document element reference is accepted.
fn signature_reference(signature: &str) -> Result<String, TransferError> {
    let doc = parse(signature)?;
    let block = SignatureBlock::parse(single_signature(&doc)?)?;
    match block.references.as_slice() {
        [reference] => match &reference.target {
            ReferenceTarget::Element(id) => Ok(id.clone()),
            ReferenceTarget::Document => Err(TransferError::ReferenceMismatch {
                expected: "#<message id>".to_string(),
                found: reference.target.uri(),
            }),
        },
        references => Err(TransferError::InvalidInput {
            name: "signature",
            reason: format!("{} references, expected one", references.len()),
        }),
    }
}
