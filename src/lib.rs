//! # tickvisor
//!
//! **tickvisor** runs a long-lived periodic job in its own tokio task while the
//! owning side (a UI thread, a service's main task) observes results, receives
//! errors and requests a graceful stop without ever blocking.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   owning side                                     worker task
//! ┌──────────────────────────────┐   spawn    ┌───────────────────────────┐
//! │ WorkerHandle                 │──────────► │ Worker::run()             │
//! │  start() / stop()            │            │  prepare                  │
//! │  is_running()                │  stop flag │  while running {          │
//! │  subscribe() / wait_idle()   │──────────► │    process ─► Tick|Error  │
//! └──────────────▲───────────────┘ (mutex)    │    wait(interval, poll)   │
//!                │                            │  }                        │
//!                │  rebroadcast               │  cleanup                  │
//!   ┌────────────┴────────────┐    mpsc       │  Finished                 │
//!   │ forwarder task          │◄──────────────┴───────────────────────────┘
//!   │  Tick/Error ─► fan-out  │
//!   │  Finished ─► join,      │
//!   │   running=false, fan-out│
//!   └─────┬──────────┬────────┘
//!         ▼          ▼
//!       Bus      SubscriberSet ─► Subscribe::on_tick / on_error / on_finished
//! ```
//!
//! ### Lifecycle
//! ```text
//! prepare()            failure ─► Error(Prepare), loop still runs
//! while running {
//!   process()          Ok ─► Tick(result) | Err ─► Error(Process), keep going
//!   wait interval      flag polled every poll_period; stop ends the wait early
//! }
//! cleanup()            failure ─► Error(Cleanup)
//! Finished             always, exactly once, last
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                       |
//! |-------------------|-------------------------------------------------------------|------------------------------------------|
//! | **Work**          | Define the periodic unit of work and its setup/teardown.    | [`Work`], [`WorkFn`], [`WorkRef`]        |
//! | **Worker**        | The loop itself with cooperative cancellation.              | [`Worker`], [`StopHandle`]               |
//! | **Handle**        | Start/stop/observe a worker from the owning side.           | [`WorkerHandle`], [`WorkerHandleBuilder`]|
//! | **Events**        | Tick / Error / Finished with ordering metadata.             | [`Event`], [`EventKind`], [`Bus`]        |
//! | **Subscriber API**| Callbacks per event kind, isolated per subscriber.          | [`Subscribe`], [`SubscriberSet`]         |
//! | **Errors**        | Loop failures and handle usage errors.                      | [`WorkerError`], [`HandleError`]         |
//! | **Configuration** | Interval, poll period, bus capacity, name.                  | [`Config`]                               |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] subscriber that emits `tracing` records.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tickvisor::{Config, WorkFn, WorkerHandle};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::new(Duration::from_millis(100))
//!         .with_poll_period(Duration::from_millis(10))
//!         .with_name("answer");
//!
//!     let handle = WorkerHandle::new(WorkFn::arc(|| async { Ok(42u32) }), cfg)?;
//!     let mut events = handle.subscribe();
//!
//!     handle.start()?;
//!     let first = events.recv().await?;
//!     assert_eq!(first.result(), Some(&42));
//!
//!     handle.shutdown(Duration::from_secs(1)).await?;
//!     assert!(!handle.is_running());
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod subscribers;
mod work;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{StopHandle, Worker, WorkerHandle, WorkerHandleBuilder};
pub use error::{HandleError, WorkerError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};
pub use work::{Work, WorkFn, WorkFnBuilder, WorkRef};

// Optional: expose a built-in tracing logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
