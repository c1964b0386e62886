//! # Runtime Configuration
//!
//! Settings for one peer's contract host, with defaults overridable from
//! the environment.
//!
//! | Variable            | Field                  |
//! |---------------------|------------------------|
//! | `CC_PEER_ORG`       | `peer.organization`    |
//! | `CC_TRUST_DIR`      | `trust.dir`            |
//! | `CC_LOG_LEVEL`      | `logging.level`        |
//! | `CC_EVENT_CAPACITY` | `events.capacity`      |

use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use shared_types::OrganizationId;
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_PEER_ORG: &str = "CC_PEER_ORG";
pub const ENV_TRUST_DIR: &str = "CC_TRUST_DIR";
pub const ENV_LOG_LEVEL: &str = "CC_LOG_LEVEL";
pub const ENV_EVENT_CAPACITY: &str = "CC_EVENT_CAPACITY";

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub peer: PeerConfig,
    pub trust: TrustConfig,
    pub logging: LoggingConfig,
    pub events: EventConfig,
}

impl RuntimeConfig {
    /// Defaults overridden from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its
    /// value.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(org) = lookup(ENV_PEER_ORG) {
            self.peer.organization = OrganizationId::new(org.trim());
        }
        if let Some(dir) = lookup(ENV_TRUST_DIR) {
            self.trust.dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(capacity) = lookup(ENV_EVENT_CAPACITY) {
            self.events.capacity =
                capacity
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        variable: ENV_EVENT_CAPACITY,
                        value: capacity.clone(),
                    })?;
        }
        Ok(self)
    }

    /// Reject settings the host cannot start with.
    ///
    /// The anchor set is checked when trust material is loaded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.peer.organization.is_blank() {
            return Err(ConfigError::MissingPeerOrganization);
        }
        if self.events.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                variable: ENV_EVENT_CAPACITY,
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Identity of the hosting peer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerConfig {
    /// Organization (MSP id) hosting this peer.
    pub organization: OrganizationId,
}

/// Location of trust material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustConfig {
    /// Directory with `anchors/`, `intermediates/`, `crls/` and `certs/`
    /// subdirectories of `.der` files.
    pub dir: PathBuf,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./trust"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventConfig {
    /// Events buffered per subscriber before it lags.
    pub capacity: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Peer organization is not set; set {ENV_PEER_ORG}")]
    MissingPeerOrganization,

    #[error("Invalid value for {variable}: {value:?}")]
    InvalidValue {
        variable: &'static str,
        value: String,
    },

    #[error("No trust anchors found in {0}")]
    NoTrustAnchors(PathBuf),

    #[error("Cannot read {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("Invalid trust material in {path}: {reason}")]
    InvalidMaterial { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.trust.dir, PathBuf::from("./trust"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.events.capacity, DEFAULT_CHANNEL_CAPACITY);
        assert!(config.peer.organization.is_blank());
    }

    #[test]
    fn test_overrides() {
        let config = RuntimeConfig::default()
            .with_overrides(env(&[
                (ENV_PEER_ORG, " Org2MSP "),
                (ENV_TRUST_DIR, "/etc/custody/trust"),
                (ENV_LOG_LEVEL, "debug"),
                (ENV_EVENT_CAPACITY, "64"),
            ]))
            .unwrap();

        assert_eq!(config.peer.organization, OrganizationId::new("Org2MSP"));
        assert_eq!(config.trust.dir, PathBuf::from("/etc/custody/trust"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.events.capacity, 64);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_bad_capacity() {
        let result = RuntimeConfig::default().with_overrides(env(&[(ENV_EVENT_CAPACITY, "lots")]));
        assert_eq!(
            result,
            Err(ConfigError::InvalidValue {
                variable: ENV_EVENT_CAPACITY,
                value: "lots".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_requires_peer_org() {
        assert_eq!(
            RuntimeConfig::default().validate(),
            Err(ConfigError::MissingPeerOrganization)
        );

        let blank = RuntimeConfig::default()
            .with_overrides(env(&[(ENV_PEER_ORG, "   ")]))
            .unwrap();
        assert_eq!(blank.validate(), Err(ConfigError::MissingPeerOrganization));
    }
}
