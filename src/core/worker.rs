//! # Worker: the periodic work loop.
//!
//! Runs one [`Work`](crate::Work) with:
//! - one `prepare()` before the loop,
//! - `process()` every [`Config::interval`] until a stop is requested,
//! - one `cleanup()` after the loop,
//! - cooperative cancellation via a mutex-guarded flag polled every [`Config::poll_period`].
//!
//! ## Event flow
//! ```text
//! prepare ──► [Error]
//!   loop while running {
//!     process ──► Tick | Error
//!     wait(interval), polling the flag every poll_period
//!   }
//! cleanup ──► [Error]
//! Finished (always, exactly once)
//! ```
//!
//! ## Rules
//! - Hook failures and panics are published as `Error` and never end the loop
//! - The flag is checked **before** every iteration, so a stop requested before
//!   the first iteration skips `process()` entirely
//! - A missing work function (`ProcessNotImplemented`) ends the loop at once
//! - Iterations run **sequentially**; an in-flight `process()` is never interrupted

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::{sync::mpsc, time};

use crate::{
    config::Config,
    core::state::{StopHandle, WorkerState},
    error::WorkerError,
    events::{Event, EventKind},
    work::WorkRef,
};

/// Publishing side of the worker's event channel.
///
/// Unbounded: the single listener must never miss an event, and the worker must
/// never block on it.
struct EventSink<T> {
    tx: mpsc::UnboundedSender<Event<T>>,
    worker: Arc<str>,
    seq: u64,
}

impl<T> EventSink<T> {
    fn publish(&mut self, kind: EventKind<T>, iteration: Option<u64>) {
        let ev = Event::new(kind)
            .with_seq(self.seq)
            .with_worker(Arc::clone(&self.worker));
        let ev = match iteration {
            Some(n) => ev.with_iteration(n),
            None => ev,
        };
        self.seq += 1;
        // A dropped listener only means nobody is watching.
        let _ = self.tx.send(ev);
    }

    fn publish_error(&mut self, err: WorkerError, iteration: Option<u64>) {
        self.publish(EventKind::Error(Arc::new(err)), iteration);
    }
}

/// Single-use executor of one [`Work`](crate::Work) run.
///
/// ### Responsibilities
/// - **Lifecycle**: `prepare → repeat(process, wait) → cleanup → Finished`
/// - **Cancellation**: honors [`request_stop`](Worker::request_stop) at safe points
/// - **Event publishing**: reports every result and failure to its one listener
///
/// A worker is consumed by [`run`](Worker::run). Build a new one to run again.
pub struct Worker<T> {
    work: WorkRef<T>,
    cfg: Config,
    state: Arc<WorkerState>,
    sink: EventSink<T>,
}

impl<T> Worker<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a worker and the receiving end of its event channel.
    pub fn new(work: WorkRef<T>, cfg: Config) -> (Self, mpsc::UnboundedReceiver<Event<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker: Arc<str> = Arc::from(cfg.name.as_ref());

        if cfg.poll_exceeds_interval() {
            tracing::warn!(
                worker = %worker,
                interval = ?cfg.interval,
                poll_period = ?cfg.poll_period_clamped(),
                "poll period exceeds interval; each wait becomes one poll-length sleep"
            );
        }

        let me = Self {
            work,
            cfg,
            state: Arc::new(WorkerState::new()),
            sink: EventSink { tx, worker, seq: 0 },
        };
        (me, rx)
    }

    /// Returns a cloneable handle that can stop this worker from anywhere.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle::new(Arc::clone(&self.state), Arc::clone(&self.sink.worker))
    }

    /// Requests a cooperative stop. Idempotent.
    pub fn request_stop(&self) {
        self.stop_handle().request_stop();
    }

    /// True until a stop is requested.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Runs the full lifecycle in the calling task and publishes `Finished` last.
    ///
    /// Never returns an error: the event channel is the only outcome signal.
    pub async fn run(mut self) {
        tracing::debug!(worker = %self.sink.worker, "worker loop starting");

        if let Err(source) = guarded(self.work.prepare()).await {
            tracing::warn!(worker = %self.sink.worker, error = %source, "prepare failed");
            self.sink.publish_error(WorkerError::Prepare { source }, None);
        }

        let mut iteration: u64 = 0;
        while self.state.is_running() {
            iteration += 1;

            match guarded(self.work.process()).await {
                Ok(result) => self.sink.publish(EventKind::Tick(result), Some(iteration)),
                Err(source) if is_not_implemented(&source) => {
                    tracing::error!(worker = %self.sink.worker, "process function not implemented");
                    self.sink
                        .publish_error(WorkerError::ProcessNotImplemented, Some(iteration));
                    break;
                }
                Err(source) => {
                    tracing::warn!(
                        worker = %self.sink.worker,
                        iteration,
                        error = %source,
                        "process failed"
                    );
                    self.sink
                        .publish_error(WorkerError::Process { iteration, source }, Some(iteration));
                }
            }

            self.wait_interval().await;
        }

        if let Err(source) = guarded(self.work.cleanup()).await {
            tracing::warn!(worker = %self.sink.worker, error = %source, "cleanup failed");
            self.sink.publish_error(WorkerError::Cleanup { source }, None);
        }

        tracing::debug!(worker = %self.sink.worker, iterations = iteration, "worker loop finished");
        self.sink.publish(EventKind::Finished, None);
    }

    /// Sleeps out the interval in poll-sized steps, returning early once stopped.
    ///
    /// A poll period longer than the interval yields exactly one poll-length sleep.
    async fn wait_interval(&self) {
        let interval = self.cfg.interval;
        if interval == Duration::ZERO {
            tokio::task::yield_now().await;
            return;
        }

        let poll = self.cfg.poll_period_clamped();
        let mut waited = Duration::ZERO;
        while waited < interval {
            if !self.state.is_running() {
                return;
            }
            time::sleep(poll).await;
            waited += poll;
        }
    }
}

/// Awaits a hook, turning a panic into an ordinary error.
async fn guarded<R>(fut: impl Future<Output = anyhow::Result<R>>) -> anyhow::Result<R> {
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(res) => res,
        Err(panic) => Err(anyhow::anyhow!("panicked: {}", panic_message(&*panic))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn is_not_implemented(err: &anyhow::Error) -> bool {
    err.downcast_ref::<WorkerError>()
        .is_some_and(WorkerError::is_fatal)
}
