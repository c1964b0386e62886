//! # Invocation Context
//!
//! Who is calling and when, plus transient inputs that never reach the
//! ledger's transaction record.

use shared_types::{CallerIdentity, Timestamp};
use std::collections::BTreeMap;

/// Per-invocation facts supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub caller: CallerIdentity,
    /// Invocation time, used for certificate validity and record stamps.
    pub timestamp: Timestamp,
    pub transient: BTreeMap<String, Vec<u8>>,
}

impl InvocationContext {
    pub fn new(caller: CallerIdentity, timestamp: Timestamp) -> Self {
        Self {
            caller,
            timestamp,
            transient: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_transient(mut self, key: impl Into<String>, value: Vec<u8>) -> Self {
        self.transient.insert(key.into(), value);
        self
    }

    /// Name the caller's enrollment certificate by hex serial.
    #[must_use]
    pub fn with_caller_certificate(mut self, serial: impl Into<String>) -> Self {
        self.caller = self.caller.with_certificate(serial);
        self
    }

    #[must_use]
    pub fn transient(&self, key: &str) -> Option<&[u8]> {
        self.transient.get(key).map(Vec::as_slice)
    }
}
