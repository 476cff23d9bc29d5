//! # SubscriberSet: non-blocking, lossless fan-out over multiple subscribers
//!
//! [`SubscriberSet`] distributes each [`Event`] to every subscriber
//! **without awaiting** their processing.
//!
//! ## What it guarantees
//! - `emit(&Event)` returns immediately and never drops an event.
//! - Per-subscriber FIFO (queue order), so `Finished` always arrives last.
//! - Panics inside subscribers are caught and logged (isolation).
//! - A slow subscriber delays only itself.
//!
//! ## What it does **not** guarantee
//! - No ordering across different subscribers.
//! - No bound on a lagging subscriber's backlog. Crossing
//!   [`Subscribe::queue_capacity`] pending events logs a warning.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use tokio::{runtime, sync::mpsc, task::JoinHandle};

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel<T> {
    name: &'static str,
    sender: mpsc::UnboundedSender<Arc<Event<T>>>,
    /// Events queued but not yet handled.
    pending: Arc<AtomicUsize>,
    /// Backlog size that triggers a lag warning.
    warn_at: usize,
}

/// Fan-out coordinator for multiple event subscribers.
///
/// - **Isolation**: each subscriber has a dedicated queue and task
/// - **Panic safety**: panics are caught and logged, later events still flow
/// - **Lag reporting**: a backlog beyond the subscriber's capacity is logged with its name
pub struct SubscriberSet<T> {
    channels: Vec<SubscriberChannel<T>>,
    workers: Vec<JoinHandle<()>>,
}

impl<T> SubscriberSet<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a new set and spawns one task per subscriber on `runtime`.
    ///
    /// Minimum warning threshold is 1 (enforced).
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe<T>>>, runtime: &runtime::Handle) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let warn_at = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::unbounded_channel::<Arc<Event<T>>>();
            let pending = Arc::new(AtomicUsize::new(0));
            let handled = Arc::clone(&pending);

            let handle = runtime.spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = if let Some(msg) = panic_err.downcast_ref::<&'static str>() {
                            (*msg).to_string()
                        } else if let Some(msg) = panic_err.downcast_ref::<String>() {
                            msg.clone()
                        } else {
                            "unknown panic".to_string()
                        };
                        tracing::error!(subscriber = sub.name(), %info, "subscriber panicked");
                    }
                    handled.fetch_sub(1, Ordering::Relaxed);
                }
            });

            channels.push(SubscriberChannel {
                name,
                sender: tx,
                pending,
                warn_at,
            });
            workers.push(handle);
        }

        Self { channels, workers }
    }

    /// Fan-out one event to all subscribers (non-blocking).
    ///
    /// Every live subscriber receives the event; only a subscriber whose task is
    /// gone (runtime shutting down) misses it, and that is logged.
    pub fn emit(&self, event: &Event<T>) {
        if self.channels.is_empty() {
            return;
        }
        let ev = Arc::new(event.clone());
        for channel in &self.channels {
            let backlog = channel.pending.fetch_add(1, Ordering::Relaxed);
            if channel.sender.send(Arc::clone(&ev)).is_err() {
                channel.pending.fetch_sub(1, Ordering::Relaxed);
                tracing::warn!(
                    subscriber = channel.name,
                    worker = %ev.worker,
                    seq = ev.seq,
                    "subscriber missed event: its task is gone"
                );
                continue;
            }
            if backlog == channel.warn_at {
                tracing::warn!(
                    subscriber = channel.name,
                    worker = %ev.worker,
                    backlog,
                    "subscriber is lagging behind"
                );
            }
        }
    }

    /// Graceful shutdown: close all queues and await every subscriber task.
    ///
    /// Events already queued are still delivered.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}
