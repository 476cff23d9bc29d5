//! # WorkerHandle: owns the worker's task and rebroadcasts its events.
//!
//! The [`WorkerHandle`] is the client-facing side of a periodic worker. It spawns
//! a fresh [`Worker`] per [`start`](WorkerHandle::start), forwards everything the
//! worker publishes to its own receivers and subscribers, and tears the task down
//! when the worker reports `Finished`.
//!
//! ## Architecture
//! ```text
//! start() ──► Worker::new(work, cfg) ──► runtime.spawn(worker.run())
//!                    │
//!                    └─ mpsc (unbounded, one listener)
//!                              ▼
//!                       forwarder task
//!                        ├─ Tick / Error ──► SubscriberSet::emit + Bus::publish
//!                        └─ Finished:
//!                             1. join the worker task
//!                             2. running = false
//!                             3. SubscriberSet::emit + Bus::publish (Finished)
//! ```
//!
//! ## State machine
//! ```text
//! Idle ──start()──► Running ──(worker publishes Finished)──► Idle
//!                      │
//!                      └─ stop() only requests the transition
//! ```
//!
//! ## Rules
//! - `start()` while running is rejected with [`HandleError::AlreadyRunning`]
//! - `stop()` before `start()` or after `Finished` is a no-op
//! - `Finished` reaches receivers only after the handle is idle again, so a
//!   subscriber may call `start()` from its `on_finished`
//! - Slow subscribers never delay the idle transition; their events queue up
//! - Dropping the handle requests a stop of the active run

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::{
    runtime,
    sync::{broadcast, mpsc, watch},
    task::JoinHandle,
    time,
};

use crate::{
    config::Config,
    core::{builder::WorkerHandleBuilder, state::StopHandle, worker::Worker},
    error::HandleError,
    events::{Bus, Event, EventKind},
    subscribers::SubscriberSet,
    work::WorkRef,
};

/// The run currently owned by the handle.
struct Active {
    stop: StopHandle,
    join: JoinHandle<()>,
}

pub(super) struct Inner<T> {
    work: WorkRef<T>,
    cfg: Config,
    bus: Bus<T>,
    subs: SubscriberSet<T>,
    runtime: runtime::Handle,
    slot: Mutex<Option<Active>>,
    running: watch::Sender<bool>,
    /// Held while one event is fanned out, so runs never interleave.
    relay: Mutex<()>,
}

impl<T> Inner<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(super) fn new(
        work: WorkRef<T>,
        cfg: Config,
        bus: Bus<T>,
        subs: SubscriberSet<T>,
        runtime: runtime::Handle,
    ) -> Self {
        let (running, _) = watch::channel(false);
        Self {
            work,
            cfg,
            bus,
            subs,
            runtime,
            slot: Mutex::new(None),
            running,
            relay: Mutex::new(()),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Active>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fans one event out to subscribers and bus receivers.
    ///
    /// A restart triggered by `Finished` reaches this only after the previous
    /// run's `Finished` went to every listener.
    fn rebroadcast(&self, ev: Event<T>) {
        let _relay = self.relay.lock().unwrap_or_else(PoisonError::into_inner);
        self.subs.emit(&ev);
        self.bus.publish(ev);
    }

    /// Joins the finished worker task and releases the slot.
    async fn reclaim(&self) {
        let active = self.slot().take();
        if let Some(active) = active {
            if let Err(err) = active.join.await {
                tracing::warn!(worker = %self.cfg.name, error = %err, "worker task did not complete cleanly");
            }
        }
    }
}

/// Client-side handle of one periodic worker.
///
/// Non-blocking: `start()` and `stop()` return immediately; outcomes arrive as
/// events through [`subscribe`](WorkerHandle::subscribe) and the subscribers given
/// to the [builder](WorkerHandle::builder).
pub struct WorkerHandle<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: Arc<Inner<T>>,
}

impl<T> WorkerHandle<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Starts a builder for the given work.
    pub fn builder(work: WorkRef<T>) -> WorkerHandleBuilder<T> {
        WorkerHandleBuilder::new(work)
    }

    /// Builds a handle with `cfg` and no subscribers on the current tokio runtime.
    pub fn new(work: WorkRef<T>, cfg: Config) -> Result<Self, HandleError> {
        Self::builder(work).config(cfg).build()
    }

    pub(super) fn from_inner(inner: Inner<T>) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Spawns a new worker run.
    ///
    /// Returns as soon as the worker task is spawned; no iteration is awaited.
    ///
    /// # Errors
    /// [`HandleError::AlreadyRunning`] if the previous run has not finished.
    pub fn start(&self) -> Result<(), HandleError> {
        let inner = &self.inner;
        let mut slot = inner.slot();
        if *inner.running.borrow() {
            return Err(HandleError::AlreadyRunning {
                worker: inner.cfg.name.to_string(),
            });
        }

        let (worker, events) = Worker::new(Arc::clone(&inner.work), inner.cfg.clone());
        let stop = worker.stop_handle();
        let join = inner.runtime.spawn(worker.run());
        *slot = Some(Active { stop, join });
        inner.running.send_replace(true);
        drop(slot);

        inner.runtime.spawn(forward(Arc::clone(inner), events));
        tracing::info!(worker = %inner.cfg.name, "worker started");
        Ok(())
    }

    /// Requests a cooperative stop of the active run.
    ///
    /// Does not wait; `Finished` signals the actual end. No-op when idle.
    pub fn stop(&self) {
        if let Some(active) = self.inner.slot().as_ref() {
            active.stop.request_stop();
        }
    }

    /// Point-in-time snapshot of the lifecycle flag.
    pub fn is_running(&self) -> bool {
        *self.inner.running.borrow()
    }

    /// Creates a receiver for the rebroadcast events.
    ///
    /// Only events published after this call are observed.
    pub fn subscribe(&self) -> broadcast::Receiver<Event<T>> {
        self.inner.bus.subscribe()
    }

    /// Resolves once the handle is idle (immediately if it already is).
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.running.subscribe();
        let _ = rx.wait_for(|running| !*running).await;
    }

    /// Requests a stop and waits up to `grace` for the run to finish.
    ///
    /// Nothing is killed on timeout; the worker keeps running until its
    /// in-flight `process()` returns.
    ///
    /// # Errors
    /// [`HandleError::GraceExceeded`] if `Finished` did not arrive within `grace`.
    pub async fn shutdown(&self, grace: Duration) -> Result<(), HandleError> {
        self.stop();
        match time::timeout(grace, self.wait_idle()).await {
            Ok(()) => Ok(()),
            Err(_elapsed) => {
                tracing::warn!(worker = %self.inner.cfg.name, ?grace, "worker did not finish within grace");
                Err(HandleError::GraceExceeded { grace })
            }
        }
    }

    /// Worker name.
    pub fn name(&self) -> &str {
        &self.inner.cfg.name
    }

    /// Configuration used for every run.
    pub fn config(&self) -> &Config {
        &self.inner.cfg
    }

    /// Number of registered callback subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subs.len()
    }
}

impl<T> Drop for WorkerHandle<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.stop();
    }
}

/// Relays one run's events and performs the `Finished` teardown.
///
/// If the worker task vanishes without `Finished` (aborted by runtime shutdown),
/// a `Finished` is synthesized so receivers still see exactly one.
async fn forward<T>(inner: Arc<Inner<T>>, mut events: mpsc::UnboundedReceiver<Event<T>>)
where
    T: Clone + Send + Sync + 'static,
{
    let mut next_seq = 0;
    let finished = loop {
        match events.recv().await {
            Some(ev) if ev.is_finished() => break ev,
            Some(ev) => {
                next_seq = ev.seq + 1;
                inner.rebroadcast(ev);
            }
            None => {
                tracing::warn!(worker = %inner.cfg.name, "worker ended without Finished");
                break Event::new(EventKind::Finished)
                    .with_seq(next_seq)
                    .with_worker(inner.cfg.name.as_ref());
            }
        }
    };

    inner.reclaim().await;
    inner.running.send_replace(false);
    tracing::info!(worker = %inner.cfg.name, "worker finished");
    inner.rebroadcast(finished);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::work::WorkFn;

    fn ticker() -> WorkRef<u32> {
        WorkFn::arc(|| async { Ok(42u32) })
    }

    fn cfg() -> Config {
        Config::new(Duration::from_millis(100))
            .with_poll_period(Duration::from_millis(10))
            .with_name("unit")
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_rejected_while_running() {
        let handle = WorkerHandle::new(ticker(), cfg()).unwrap();
        handle.start().unwrap();
        assert!(handle.is_running());

        let err = handle.start().unwrap_err();
        assert_eq!(
            err,
            HandleError::AlreadyRunning {
                worker: "unit".into()
            }
        );

        handle.shutdown(Duration::from_secs(1)).await.unwrap();
        assert!(!handle.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_idle_is_noop() {
        let handle = WorkerHandle::new(ticker(), cfg()).unwrap();
        handle.stop();
        assert!(!handle.is_running());
        handle.wait_idle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_arrives_after_idle() {
        let handle = WorkerHandle::new(ticker(), cfg()).unwrap();
        let mut rx = handle.subscribe();
        handle.start().unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.result(), Some(&42));
        handle.stop();

        loop {
            let ev = rx.recv().await.unwrap();
            if ev.is_finished() {
                assert!(!handle.is_running());
                break;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_times_out_on_stuck_process() {
        let work: WorkRef<()> = WorkFn::arc(|| async {
            time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        });
        let handle = WorkerHandle::new(work, cfg()).unwrap();
        handle.start().unwrap();
        tokio::task::yield_now().await;

        let err = handle.shutdown(Duration::from_millis(500)).await.unwrap_err();
        assert_eq!(err.as_label(), "handle_grace_exceeded");
        assert!(handle.is_running());
    }

    #[test]
    fn test_build_outside_runtime_fails() {
        let err = WorkerHandle::new(ticker(), cfg()).err();
        assert_eq!(err, Some(HandleError::NoRuntime));
    }
}
