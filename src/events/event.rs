//! # Events published by a worker and rebroadcast by its handle.
//!
//! The [`EventKind`] enum has exactly three variants:
//! - **Tick**: one iteration's successful result
//! - **Error**: a failure from `prepare`, `process` or `cleanup`
//! - **Finished**: the loop has exited and `cleanup` ran; always last, exactly once
//!
//! The [`Event`] struct carries metadata such as the per-run sequence number,
//! wall-clock timestamp, worker name and iteration.
//!
//! ## Ordering guarantees
//! Events from one run are published as `[Tick|Error]*, Finished`. `seq` starts at 0
//! for every run and increases by one per event.
//!
//! ## Example
//! ```rust
//! use tickvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::Tick(42))
//!     .with_worker("poller")
//!     .with_iteration(3);
//!
//! assert_eq!(ev.result(), Some(&42));
//! assert_eq!(ev.worker.as_ref(), "poller");
//! assert_eq!(ev.iteration, Some(3));
//! ```

use std::sync::Arc;
use std::time::SystemTime;

use crate::error::WorkerError;

/// Classification of worker events, with their payloads.
#[derive(Debug, Clone)]
pub enum EventKind<T> {
    /// `process()` returned a result.
    Tick(T),

    /// A hook failed. Shared because every subscriber gets a clone of the event.
    Error(Arc<WorkerError>),

    /// The run is over. Nothing is published after it.
    Finished,
}

/// Worker event with metadata.
///
/// - `seq`: per-run monotonic sequence number
/// - `at`: wall-clock timestamp (for logs)
/// - `worker`: name of the publishing worker
/// - `iteration`: set for `Tick` and for `Error` raised by `process()`
#[derive(Debug, Clone)]
pub struct Event<T> {
    /// Per-run sequence number (0-based).
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Name of the worker that published the event.
    pub worker: Arc<str>,
    /// 1-based loop iteration, if applicable.
    pub iteration: Option<u64>,
    /// Event classification and payload.
    pub kind: EventKind<T>,
}

impl<T> Event<T> {
    /// Creates a new event of the given kind stamped with the current time.
    pub fn new(kind: EventKind<T>) -> Self {
        Self {
            seq: 0,
            at: SystemTime::now(),
            worker: Arc::from(""),
            iteration: None,
            kind,
        }
    }

    /// Attaches a sequence number.
    #[inline]
    pub fn with_seq(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }

    /// Attaches a worker name.
    #[inline]
    pub fn with_worker(mut self, worker: impl Into<Arc<str>>) -> Self {
        self.worker = worker.into();
        self
    }

    /// Attaches an iteration number.
    #[inline]
    pub fn with_iteration(mut self, n: u64) -> Self {
        self.iteration = Some(n);
        self
    }

    #[inline]
    pub fn is_tick(&self) -> bool {
        matches!(self.kind, EventKind::Tick(_))
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self.kind, EventKind::Error(_))
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        matches!(self.kind, EventKind::Finished)
    }

    /// Returns the tick result, if this is a `Tick`.
    pub fn result(&self) -> Option<&T> {
        match &self.kind {
            EventKind::Tick(result) => Some(result),
            _ => None,
        }
    }

    /// Returns the error, if this is an `Error`.
    pub fn error(&self) -> Option<&WorkerError> {
        match &self.kind {
            EventKind::Error(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
