//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for observing a worker from the owning side.
//! Each subscriber is driven by a dedicated task fed by its own queue owned by
//! the [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow; they do **not** block the worker, the handle
//!   or other subscribers.
//! - Events arrive in publish order, `Finished` last.
//! - No event is dropped. A subscriber that falls more than
//!   [`queue_capacity`](Subscribe::queue_capacity) events behind is reported (warn).

use async_trait::async_trait;

use crate::error::WorkerError;
use crate::events::{Event, EventKind};

/// Contract for event subscribers.
///
/// Override [`on_event`](Subscribe::on_event) to see every event with its
/// metadata, or the per-kind callbacks it dispatches to by default.
#[async_trait]
pub trait Subscribe<T>: Send + Sync + 'static
where
    T: Clone + Send + Sync + 'static,
{
    /// Handles a single event. Dispatches to the per-kind callbacks by default.
    async fn on_event(&self, event: &Event<T>) {
        match &event.kind {
            EventKind::Tick(result) => self.on_tick(result).await,
            EventKind::Error(error) => self.on_error(error).await,
            EventKind::Finished => self.on_finished().await,
        }
    }

    /// One iteration's successful result.
    async fn on_tick(&self, _result: &T) {}

    /// A failure from `prepare`, `process` or `cleanup`.
    async fn on_error(&self, _error: &WorkerError) {}

    /// The run is over and the handle is idle again.
    async fn on_finished(&self) {}

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Backlog size at which this subscriber is reported as lagging.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
