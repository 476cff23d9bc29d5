//! # Event bus for rebroadcasting worker events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that the handle's
//! forwarder publishes into and that any number of ad-hoc listeners subscribe to.
//!
//! ## Architecture
//! ```text
//! Publisher (one):                   Receivers (many):
//!                                  ┌──► WorkerHandle::subscribe() #1
//!   forwarder ─────► Bus ──────────┼──► WorkerHandle::subscribe() #2
//!              (broadcast chan)    └──► ...
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for worker events.
///
/// Receivers get clones of each event, in publish order.
pub struct Bus<T> {
    tx: broadcast::Sender<Event<T>>,
}

impl<T> Clone for Bus<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Clone> Bus<T> {
    /// Creates a new bus with the given channel capacity.
    ///
    /// The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event<T>>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped (this function still returns immediately).
    pub fn publish(&self, ev: Event<T>) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    ///
    /// A receiver only gets events **sent after** it subscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Event<T>> {
        self.tx.subscribe()
    }

    /// Number of currently attached receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
