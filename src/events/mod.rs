//! Worker events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** the
//! [`WorkerHandle`](crate::WorkerHandle) uses to rebroadcast what its worker publishes.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publisher**: `Worker::run` (exactly one listener: the handle's forwarder).
//! - **Consumers**: `WorkerHandle::subscribe()` receivers and the handle's
//!   [`SubscriberSet`](crate::SubscriberSet).
//!
//! See `core/mod.rs` for the wiring diagram.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
