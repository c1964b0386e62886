//! # Ledger Events
//!
//! Named domain events emitted by contract operations.
//!
//! Operations return their events as an explicit output; the runtime
//! publishes them only after the operation's writes were committed.

use serde::{Deserialize, Serialize};

/// A domain event produced by a committed contract operation.
///
/// `payload` is the JSON encoding of the public record after the operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data")]
pub enum LedgerEvent {
    /// A custody record was created.
    AssetCreated { asset_id: String, payload: String },
    /// A custody record moved to its next status.
    AssetTransitioned {
        asset_id: String,
        from: String,
        to: String,
        payload: String,
    },
    /// The final signatory accepted the handoff.
    AssetCompleted { asset_id: String, payload: String },
    /// A custody record was withdrawn before dispatch.
    AssetDeleted { asset_id: String, payload: String },
    /// A delivery note was opened.
    NoteCreated { note_id: String, payload: String },
    /// A message was attached to a delivery note.
    MessageAttached {
        note_id: String,
        message_id: String,
        payload: String,
    },
    /// A signature was attached to a stored message.
    SignatureAttached {
        note_id: String,
        message_id: String,
        payload: String,
    },
    /// Free-text advice was appended to a delivery note.
    AdviceAdded { note_id: String, payload: String },
    /// The item list of a delivery note was replaced.
    ItemsUpdated { note_id: String, payload: String },
    /// A delivery note was removed.
    NoteDeleted { note_id: String, payload: String },
    /// An owned asset was entered in the register.
    AssetRegistered { asset_id: String, payload: String },
    /// A registered asset's attributes were replaced.
    AssetUpdated { asset_id: String, payload: String },
    /// A registered asset changed owner.
    OwnershipTransferred {
        asset_id: String,
        previous_owner: String,
        owner: String,
        payload: String,
    },
    /// A registered asset was removed from the register.
    AssetDeregistered { asset_id: String, payload: String },
}

impl LedgerEvent {
    /// The event name as seen by subscribers.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AssetCreated { .. } => "AssetCreated",
            Self::AssetTransitioned { .. } => "AssetTransitioned",
            Self::AssetCompleted { .. } => "AssetCompleted",
            Self::AssetDeleted { .. } => "AssetDeleted",
            Self::NoteCreated { .. } => "NoteCreated",
            Self::MessageAttached { .. } => "MessageAttached",
            Self::SignatureAttached { .. } => "SignatureAttached",
            Self::AdviceAdded { .. } => "AdviceAdded",
            Self::ItemsUpdated { .. } => "ItemsUpdated",
            Self::NoteDeleted { .. } => "NoteDeleted",
            Self::AssetRegistered { .. } => "AssetRegistered",
            Self::AssetUpdated { .. } => "AssetUpdated",
            Self::OwnershipTransferred { .. } => "OwnershipTransferred",
            Self::AssetDeregistered { .. } => "AssetDeregistered",
        }
    }

    /// Get the topic for this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::AssetCreated { .. }
            | Self::AssetTransitioned { .. }
            | Self::AssetCompleted { .. }
            | Self::AssetDeleted { .. } => EventTopic::Custody,
            Self::NoteCreated { .. }
            | Self::MessageAttached { .. }
            | Self::SignatureAttached { .. }
            | Self::AdviceAdded { .. }
            | Self::ItemsUpdated { .. }
            | Self::NoteDeleted { .. } => EventTopic::Notes,
            Self::AssetRegistered { .. }
            | Self::AssetUpdated { .. }
            | Self::OwnershipTransferred { .. }
            | Self::AssetDeregistered { .. } => EventTopic::Register,
        }
    }

    /// Id of the record the event concerns.
    #[must_use]
    pub fn record_id(&self) -> &str {
        match self {
            Self::AssetCreated { asset_id, .. }
            | Self::AssetTransitioned { asset_id, .. }
            | Self::AssetCompleted { asset_id, .. }
            | Self::AssetDeleted { asset_id, .. }
            | Self::AssetRegistered { asset_id, .. }
            | Self::AssetUpdated { asset_id, .. }
            | Self::OwnershipTransferred { asset_id, .. }
            | Self::AssetDeregistered { asset_id, .. } => asset_id,
            Self::NoteCreated { note_id, .. }
            | Self::MessageAttached { note_id, .. }
            | Self::SignatureAttached { note_id, .. }
            | Self::AdviceAdded { note_id, .. }
            | Self::ItemsUpdated { note_id, .. }
            | Self::NoteDeleted { note_id, .. } => note_id,
        }
    }

    /// The JSON payload carried by the event.
    #[must_use]
    pub fn payload(&self) -> &str {
        match self {
            Self::AssetCreated { payload, .. }
            | Self::AssetTransitioned { payload, .. }
            | Self::AssetCompleted { payload, .. }
            | Self::AssetDeleted { payload, .. }
            | Self::NoteCreated { payload, .. }
            | Self::MessageAttached { payload, .. }
            | Self::SignatureAttached { payload, .. }
            | Self::AdviceAdded { payload, .. }
            | Self::ItemsUpdated { payload, .. }
            | Self::NoteDeleted { payload, .. }
            | Self::AssetRegistered { payload, .. }
            | Self::AssetUpdated { payload, .. }
            | Self::OwnershipTransferred { payload, .. }
            | Self::AssetDeregistered { payload, .. } => payload,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Custody handoff records.
    Custody,
    /// Delivery notes.
    Notes,
    /// Owned assets in the register.
    Register,
    /// All events (no filtering).
    All,
}

impl EventTopic {
    /// Topics that events are actually published on.
    pub const RECORD_TOPICS: [Self; 3] = [Self::Custody, Self::Notes, Self::Register];
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Record ids to include. Empty means all records.
    pub record_ids: Vec<String>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            record_ids: Vec::new(),
        }
    }

    /// Create a filter for events about specific records.
    #[must_use]
    pub fn records(record_ids: Vec<String>) -> Self {
        Self {
            topics: Vec::new(),
            record_ids,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let record_match = self.record_ids.is_empty()
            || self.record_ids.iter().any(|id| id == event.record_id());

        topic_match && record_match
    }
}
