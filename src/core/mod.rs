//! Runtime core: worker loop and client handle.
//!
//! The public API from this module is [`Worker`], [`StopHandle`], [`WorkerHandle`]
//! and [`WorkerHandleBuilder`].
//!
//! ## Wiring
//! ```text
//!  owning task                      worker task                 forwarder task
//!  ───────────                      ───────────                 ──────────────
//!  WorkerHandle::start() ──spawn──► Worker::run()
//!                                     prepare
//!                                     loop { process; wait }  ──mpsc──► rebroadcast
//!                                     cleanup                           │
//!                                     Finished ───────────────mpsc──► join worker task
//!  WorkerHandle::stop()                                                running = false
//!     └─► StopHandle::request_stop()                                    rebroadcast Finished
//!           (flag read by the loop)
//! ```
//!
//! Internal modules:
//! - [`worker`]: the `prepare → repeat(process, wait) → cleanup → Finished` loop;
//! - [`state`]: the mutex-guarded running flag and [`StopHandle`];
//! - [`handle`]: spawn/stop/forward/teardown on the client side;
//! - [`builder`]: handle construction (config, subscribers, runtime).

mod builder;
mod handle;
mod state;
mod worker;

pub use builder::WorkerHandleBuilder;
pub use handle::WorkerHandle;
pub use state::StopHandle;
pub use worker::Worker;
