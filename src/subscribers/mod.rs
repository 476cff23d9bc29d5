//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] that
//! fans rebroadcast events out to every subscriber of a
//! [`WorkerHandle`](crate::WorkerHandle).
//!
//! ## Architecture
//! ```text
//! forwarder ── emit(&Event) ──► SubscriberSet
//!                                  ├──► [queue S1] ─► worker S1 ─► on_event ─► on_tick / on_error / on_finished
//!                                  ├──► [queue S2] ─► worker S2 ─► ...
//!                                  └──► [queue SN] ─► worker SN ─► ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use tickvisor::{Subscribe, WorkerError};
//! use async_trait::async_trait;
//!
//! struct Gauge;
//!
//! #[async_trait]
//! impl Subscribe<u64> for Gauge {
//!     async fn on_tick(&self, value: &u64) {
//!         // update a gauge
//!         let _ = value;
//!     }
//!
//!     async fn on_error(&self, error: &WorkerError) {
//!         // count error.as_label()
//!         let _ = error;
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod embedded;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
