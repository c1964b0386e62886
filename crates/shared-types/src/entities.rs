//! # Core Domain Entities
//!
//! Roles, organizations and parties taking part in a custody transfer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seconds since the Unix epoch.
///
/// Every invocation carries its own timestamp; certificate validity and CRL
/// freshness are judged against it rather than a wall clock.
pub type Timestamp = u64;

// =============================================================================
// ROLES
// =============================================================================

/// The role a party plays in a transfer.
///
/// The order of declaration is the signing order of a custody handoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Originator of the goods and of the transfer record.
    Shipper,
    /// Intermediary that takes custody in transit.
    Carrier,
    /// Final recipient.
    Receiver,
}

impl Role {
    /// Stable upper-case name, as found in enrollment attributes.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shipper => "SHIPPER",
            Self::Carrier => "CARRIER",
            Self::Receiver => "RECEIVER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SHIPPER" => Ok(Self::Shipper),
            "CARRIER" => Ok(Self::Carrier),
            // Older enrollments used this spelling.
            "RECEIVER" | "RECIEVER" => Ok(Self::Receiver),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

// =============================================================================
// ORGANIZATIONS AND PARTIES
// =============================================================================

/// Membership-service identifier of an organization (for example `Org1MSP`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct OrganizationId(pub String);

impl OrganizationId {
    /// Create an organization id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the identifier is empty or only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A participant named on a transfer record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Party {
    /// Canonical party id derived from the party's certificate.
    pub id: String,
    /// Organization whose node hosts this party.
    pub organization: OrganizationId,
}

impl Party {
    /// Create a party.
    pub fn new(id: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            organization: OrganizationId(organization.into()),
        }
    }
}

/// Identity of the client submitting an invocation.
///
/// Supplied by the external identity layer. The optional certificate serial
/// lets operations that need the caller's own certificate (id reservation)
/// look it up in the trust context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerIdentity {
    /// Role claimed by the caller.
    pub role: Role,
    /// Organization the caller belongs to.
    pub organization: OrganizationId,
    /// Hex serial of the caller's enrollment certificate, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_serial: Option<String>,
}

impl CallerIdentity {
    /// Create a caller identity without a certificate reference.
    pub fn new(role: Role, organization: impl Into<String>) -> Self {
        Self {
            role,
            organization: OrganizationId(organization.into()),
            certificate_serial: None,
        }
    }

    /// Attach the caller's certificate serial.
    #[must_use]
    pub fn with_certificate(mut self, serial: impl Into<String>) -> Self {
        self.certificate_serial = Some(serial.into());
        self
    }
}
