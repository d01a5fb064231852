//! Door characteristic store.
//!
//! Holds the two values a remote controller sees, the requested target and
//! the physical current state, and notifies subscribers on every write.

use garage_common::door::types::{DoorState, TargetState};
use serde::Serialize;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::trace;

/// Read/write access to the target and current door characteristics.
///
/// The door engine writes through this trait; notifications are a side
/// effect of the implementation that the engine never observes.
pub trait DoorCharacteristics {
    /// Stored target state.
    fn target(&self) -> TargetState;

    /// Store a new target state.
    fn set_target(&mut self, target: TargetState);

    /// Stored current state.
    fn current(&self) -> DoorState;

    /// Store a new current state.
    fn set_current(&mut self, current: DoorState);
}

/// A characteristic write, as delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "characteristic", content = "value", rename_all = "snake_case")]
pub enum CharacteristicChange {
    /// Target door state was written.
    Target(TargetState),
    /// Current door state was written.
    Current(DoorState),
}

/// In-memory characteristic store with channel subscribers.
#[derive(Debug)]
pub struct CharacteristicStore {
    target: TargetState,
    current: DoorState,
    subscribers: Vec<Sender<CharacteristicChange>>,
}

impl CharacteristicStore {
    /// Create a store holding `Closed` / `Closed`.
    pub fn new() -> Self {
        Self {
            target: TargetState::Closed,
            current: DoorState::Closed,
            subscribers: Vec::new(),
        }
    }

    /// Subscribe to every subsequent write.
    ///
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<CharacteristicChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Number of live subscribers (as of the last notification).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn notify(&mut self, change: CharacteristicChange) {
        trace!(?change, "characteristic written");
        self.subscribers.retain(|tx| tx.send(change).is_ok());
    }
}

impl Default for CharacteristicStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DoorCharacteristics for CharacteristicStore {
    fn target(&self) -> TargetState {
        self.target
    }

    fn set_target(&mut self, target: TargetState) {
        self.target = target;
        self.notify(CharacteristicChange::Target(target));
    }

    fn current(&self) -> DoorState {
        self.current
    }

    fn set_current(&mut self, current: DoorState) {
        self.current = current;
        self.notify(CharacteristicChange::Current(current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_starts_closed() {
        let store = CharacteristicStore::new();
        assert_eq!(store.target(), TargetState::Closed);
        assert_eq!(store.current(), DoorState::Closed);
    }

    #[test]
    fn writes_are_broadcast_to_subscribers() {
        let mut store = CharacteristicStore::new();
        let a = store.subscribe();
        let b = store.subscribe();

        store.set_target(TargetState::Open);
        store.set_current(DoorState::Opening);

        for rx in [&a, &b] {
            let changes: Vec<_> = rx.try_iter().collect();
            assert_eq!(
                changes,
                vec![
                    CharacteristicChange::Target(TargetState::Open),
                    CharacteristicChange::Current(DoorState::Opening),
                ]
            );
        }
        assert_eq!(store.current(), DoorState::Opening);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut store = CharacteristicStore::new();
        let keep = store.subscribe();
        drop(store.subscribe());
        assert_eq!(store.subscriber_count(), 2);

        store.set_current(DoorState::Open);
        assert_eq!(store.subscriber_count(), 1);
        assert_eq!(keep.try_recv(), Ok(CharacteristicChange::Current(DoorState::Open)));
    }

    #[test]
    fn change_serializes_as_tagged_json() {
        let json = serde_json::to_string(&CharacteristicChange::Current(DoorState::Closing)).unwrap();
        assert_eq!(json, r#"{"characteristic":"current","value":"closing"}"#);
    }
}
