//! # Delivery Note
//!
//! An accumulating record: parties attach XML messages, each identified by
//! the `id` of its root element, and detached XML signatures over them.
//! A signature is tied to its message by its `#id` reference only.

use cc_01_trust_validation::CertificateSerial;
use serde::{Deserialize, Serialize};
use shared_types::{Party, Timestamp};

/// Root element of the composite document.
pub const COMPOSITE_ROOT: &str = "DELNOTE";

/// Progress of a delivery note, derived from its messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoteStatus {
    /// No message attached yet.
    Open,
    /// At least one message carries no signature.
    AwaitingSignatures,
    /// Every message carries at least one signature.
    Signed,
}

/// A verified signature over one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSignature {
    /// `#<message id>`.
    pub reference: String,
    /// The signature document, without XML declaration.
    pub document: String,
    /// Canonical party id of the signer.
    pub signer: String,
    pub signer_serial: CertificateSerial,
    /// Position among all signatures of the note.
    pub sequence: u64,
    pub attached_at: Timestamp,
}

/// A message and the signatures attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteMessage {
    pub id: String,
    /// The message document, without XML declaration.
    pub document: String,
    pub signatures: Vec<MessageSignature>,
    pub attached_at: Timestamp,
}

/// Public record of a delivery note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryNote {
    pub id: String,
    pub shipper: Party,
    pub receiver: Party,
    pub status: NoteStatus,
    pub items: serde_json::Value,
    pub advices: Vec<String>,
    /// In attachment order.
    pub messages: Vec<NoteMessage>,
    pub created_at: Timestamp,
}

impl DeliveryNote {
    pub fn new(
        id: impl Into<String>,
        shipper: Party,
        receiver: Party,
        items: serde_json::Value,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            shipper,
            receiver,
            status: NoteStatus::Open,
            items,
            advices: Vec::new(),
            messages: Vec::new(),
            created_at,
        }
    }

    #[must_use]
    pub fn message(&self, id: &str) -> Option<&NoteMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Whether `party_id` is the shipper or the receiver.
    #[must_use]
    pub fn is_party(&self, party_id: &str) -> bool {
        self.shipper.id == party_id || self.receiver.id == party_id
    }

    /// Total signatures across all messages.
    #[must_use]
    pub fn signature_count(&self) -> u64 {
        self.messages.iter().map(|m| m.signatures.len() as u64).sum()
    }

    pub fn push_message(&mut self, id: String, document: String, at: Timestamp) {
        self.messages.push(NoteMessage {
            id,
            document,
            signatures: Vec::new(),
            attached_at: at,
        });
        self.refresh_status();
    }

    /// Append a signature to message `message_id`. False if no such message.
    pub fn push_signature(
        &mut self,
        message_id: &str,
        document: String,
        signer: String,
        signer_serial: CertificateSerial,
        at: Timestamp,
    ) -> bool {
        let sequence = self.signature_count();
        let Some(message) = self.messages.iter_mut().find(|m| m.id == message_id) else {
            return false;
        };
        message.signatures.push(MessageSignature {
            reference: format!("#{message_id}"),
            document,
            signer,
            signer_serial,
            sequence,
            attached_at: at,
        });
        self.refresh_status();
        true
    }

    fn refresh_status(&mut self) {
        self.status = if self.messages.is_empty() {
            NoteStatus::Open
        } else if self.messages.iter().all(|m| !m.signatures.is_empty()) {
            NoteStatus::Signed
        } else {
            NoteStatus::AwaitingSignatures
        };
    }

    /// Messages in attachment order, then signatures in attachment order,
    /// each on its own line inside one `DELNOTE` element.
    #[must_use]
    pub fn export(&self) -> String {
        let mut signatures: Vec<&MessageSignature> =
            self.messages.iter().flat_map(|m| &m.signatures).collect();
        signatures.sort_by_key(|s| s.sequence);

        let mut out = format!("<{COMPOSITE_ROOT}>\n");
        for message in &self.messages {
            out.push_str(&message.document);
            out.push('\n');
        }
        for signature in signatures {
            out.push_str(&signature.document);
            out.push('\n');
        }
        out.push_str(&format!("</{COMPOSITE_ROOT}>"));
        out
    }
}

/// A message and one signature wrapped for embedded verification.
#[must_use]
pub fn composite(message: &str, signature: &str) -> String {
    format!("<{COMPOSITE_ROOT}>{message}{signature}</{COMPOSITE_ROOT}>")
}

/// What `readNote` shows a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub note: DeliveryNote,
    /// Properties kept in the caller's implicit partition, when readable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_properties: Option<serde_json::Value>,
}
