//! # Operation Outcome

use shared_bus::LedgerEvent;

/// Value of a submit operation plus the events it emits.
///
/// Events are only meaningful once the operation's writes were committed;
/// a replayed step carries none.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub events: Vec<LedgerEvent>,
}

impl<T> Outcome<T> {
    /// An outcome without events.
    pub fn quiet(value: T) -> Self {
        Self {
            value,
            events: Vec::new(),
        }
    }

    pub fn with_event(value: T, event: LedgerEvent) -> Self {
        Self {
            value,
            events: vec![event],
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            events: self.events,
        }
    }
}
