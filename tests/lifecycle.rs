//! Integration tests for the WorkerHandle lifecycle
//!
//! These tests verify:
//! - Tick cadence and stop latency for a 1s interval / 50ms poll worker
//! - Exactly one Finished per run, always last
//! - Restart after Finished and rejection of a second concurrent start
//! - Subscriber callbacks and error forwarding
//! - Lossless delivery to slow subscribers and restart from `on_finished`
//! - Stop on drop

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use tickvisor::{
    Config, Event, HandleError, Subscribe, WorkFn, WorkRef, WorkerError, WorkerHandle,
};
use tokio::sync::broadcast;
use tokio::time::{self, Instant};

fn answer() -> WorkRef<u32> {
    WorkFn::arc(|| async { Ok(42u32) })
}

fn one_second() -> Config {
    Config::new(Duration::from_secs(1))
        .with_poll_period(Duration::from_millis(50))
        .with_name("answer")
}

/// Receives until `Finished`, returning everything seen (Finished included).
async fn collect_run<T: Clone>(rx: &mut broadcast::Receiver<Event<T>>) -> Vec<Event<T>> {
    let mut out = Vec::new();
    loop {
        let ev = rx.recv().await.expect("bus closed before Finished");
        let done = ev.is_finished();
        out.push(ev);
        if done {
            return out;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_ticks_once_per_interval_and_stops_within_poll_period() {
    let handle = WorkerHandle::new(answer(), one_second()).unwrap();
    let mut rx = handle.subscribe();
    let started = Instant::now();
    handle.start().unwrap();

    time::sleep(Duration::from_millis(2300)).await;
    let stop_at = Instant::now();
    handle.stop();
    assert!(handle.is_running(), "stop() must not perform the transition itself");

    let events = collect_run(&mut rx).await;
    let finished_after = stop_at.elapsed();

    assert!(finished_after <= Duration::from_millis(50), "took {finished_after:?}");
    assert!(started.elapsed() < Duration::from_secs(3));

    let (last, ticks) = events.split_last().unwrap();
    assert!(last.is_finished());
    assert_eq!(ticks.len(), 3);
    assert!(ticks.iter().all(|e| e.result() == Some(&42)));
    assert!(!handle.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_exactly_one_finished_and_nothing_after_it() {
    let handle = WorkerHandle::new(answer(), one_second()).unwrap();
    let mut rx = handle.subscribe();
    handle.start().unwrap();
    time::sleep(Duration::from_millis(1500)).await;
    handle.stop();
    handle.stop();

    let events = collect_run(&mut rx).await;
    assert_eq!(events.iter().filter(|e| e.is_finished()).count(), 1);

    // nothing else shows up, even well past another interval
    time::sleep(Duration::from_secs(5)).await;
    assert!(matches!(
        rx.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_second_start_is_rejected_and_restart_after_finished_works() {
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let work: WorkRef<u32> = WorkFn::arc(move || {
        let n = c.fetch_add(1, Ordering::SeqCst);
        async move { Ok(n) }
    });
    let handle = WorkerHandle::new(work, one_second()).unwrap();
    let mut rx = handle.subscribe();

    handle.start().unwrap();
    assert!(matches!(
        handle.start(),
        Err(HandleError::AlreadyRunning { .. })
    ));

    time::sleep(Duration::from_millis(10)).await;
    handle.stop();
    let first = collect_run(&mut rx).await;
    assert_eq!(first.iter().filter(|e| e.is_tick()).count(), 1);

    // restart straight from the Finished observation
    handle.start().unwrap();
    time::sleep(Duration::from_millis(10)).await;
    handle.stop();
    let second = collect_run(&mut rx).await;

    // a fresh worker: seq restarts at 0 and the shared work keeps its state
    assert_eq!(second[0].seq, 0);
    assert_eq!(second[0].result(), Some(&1));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_stop_before_start_is_noop() {
    let handle = WorkerHandle::new(answer(), one_second()).unwrap();
    handle.stop();
    assert!(!handle.is_running());
    handle.start().unwrap();
    assert!(handle.is_running());
    handle.shutdown(Duration::from_secs(1)).await.unwrap();
}

#[derive(Default)]
struct Journal {
    lines: Mutex<Vec<String>>,
    finished: tokio::sync::Notify,
}

#[async_trait]
impl Subscribe<u32> for Journal {
    async fn on_tick(&self, result: &u32) {
        self.lines.lock().unwrap().push(format!("tick:{result}"));
    }

    async fn on_error(&self, error: &WorkerError) {
        self.lines.lock().unwrap().push(format!("error:{}", error.as_label()));
    }

    async fn on_finished(&self) {
        self.lines.lock().unwrap().push("finished".into());
        self.finished.notify_one();
    }

    fn name(&self) -> &'static str {
        "journal"
    }
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_ticks_errors_and_finished() {
    let attempt = Arc::new(AtomicU32::new(0));
    let a = attempt.clone();
    let work: WorkRef<u32> = WorkFn::builder()
        .prepare(|| async { Err(anyhow::anyhow!("cold cache")) })
        .process(move || {
            let n = a.fetch_add(1, Ordering::SeqCst);
            async move {
                if n % 2 == 1 {
                    anyhow::bail!("odd attempt {n}");
                }
                Ok(n)
            }
        })
        .arc();

    let journal = Arc::new(Journal::default());
    let handle = WorkerHandle::builder(work)
        .config(
            Config::new(Duration::from_millis(100))
                .with_poll_period(Duration::from_millis(10))
                .with_name("journal"),
        )
        .with_subscriber(journal.clone())
        .build()
        .unwrap();

    handle.start().unwrap();
    time::sleep(Duration::from_millis(350)).await;
    handle.stop();
    journal.finished.notified().await;

    assert_eq!(
        *journal.lines.lock().unwrap(),
        vec![
            "error:worker_prepare_failed",
            "tick:0",
            "error:worker_process_failed",
            "tick:2",
            "error:worker_process_failed",
            "finished",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_missing_process_finishes_with_fatal_error() {
    let work: WorkRef<u32> = WorkFn::<u32>::builder().arc();
    let handle = WorkerHandle::new(work, one_second()).unwrap();
    let mut rx = handle.subscribe();
    handle.start().unwrap();

    let events = collect_run(&mut rx).await;
    assert_eq!(events.len(), 2);
    assert!(events[0].error().is_some_and(WorkerError::is_fatal));
    assert!(!handle.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_stops_worker() {
    let cleaned = Arc::new(AtomicU32::new(0));
    let c = cleaned.clone();
    let work: WorkRef<u32> = WorkFn::builder()
        .process(|| async { Ok(1u32) })
        .cleanup(move || {
            c.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .arc();

    let handle = WorkerHandle::new(work, one_second()).unwrap();
    let mut rx = handle.subscribe();
    handle.start().unwrap();
    drop(handle);

    let events = collect_run(&mut rx).await;
    assert!(events.last().unwrap().is_finished());
    assert_eq!(cleaned.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_wait_idle_resolves_after_finished() {
    let handle = WorkerHandle::new(answer(), one_second()).unwrap();
    handle.wait_idle().await;

    handle.start().unwrap();
    time::sleep(Duration::from_millis(700)).await;
    let stop_at = Instant::now();
    handle.stop();
    handle.wait_idle().await;

    assert!(!handle.is_running());
    assert!(stop_at.elapsed() <= Duration::from_millis(50));
}

/// Handles every tick slowly and keeps only one event of headroom.
#[derive(Default)]
struct Laggard {
    ticks: AtomicU32,
    finished: AtomicU32,
}

#[async_trait]
impl Subscribe<u32> for Laggard {
    async fn on_tick(&self, _result: &u32) {
        time::sleep(Duration::from_millis(200)).await;
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }

    async fn on_finished(&self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }

    fn queue_capacity(&self) -> usize {
        1
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_subscriber_still_gets_every_tick_and_finished() {
    let laggard = Arc::new(Laggard::default());
    let handle = WorkerHandle::builder(answer())
        .config(
            Config::new(Duration::from_millis(10))
                .with_poll_period(Duration::from_millis(5))
                .with_name("busy"),
        )
        .with_subscriber(laggard.clone())
        .build()
        .unwrap();
    let mut rx = handle.subscribe();

    handle.start().unwrap();
    time::sleep(Duration::from_millis(100)).await;
    let stop_at = Instant::now();
    handle.shutdown(Duration::from_secs(1)).await.unwrap();
    assert!(stop_at.elapsed() <= Duration::from_millis(10));

    let published = collect_run(&mut rx).await;
    let ticks = published.iter().filter(|e| e.is_tick()).count() as u32;
    assert!(ticks > 1);

    time::sleep(Duration::from_secs(60)).await;
    assert_eq!(laggard.ticks.load(Ordering::SeqCst), ticks);
    assert_eq!(laggard.finished.load(Ordering::SeqCst), 1);
}

/// Starts the handle it watches again from `on_finished`, once.
#[derive(Default)]
struct Restarter {
    handle: OnceLock<WorkerHandle<u32>>,
    restarts: Mutex<Vec<Result<(), HandleError>>>,
    restarted: tokio::sync::Notify,
}

#[async_trait]
impl Subscribe<u32> for Restarter {
    async fn on_finished(&self) {
        let Some(handle) = self.handle.get() else {
            return;
        };
        let mut restarts = self.restarts.lock().unwrap();
        if restarts.is_empty() {
            restarts.push(handle.start());
            self.restarted.notify_one();
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_subscriber_can_restart_from_on_finished() {
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let work: WorkRef<u32> = WorkFn::arc(move || {
        let n = c.fetch_add(1, Ordering::SeqCst);
        async move { Ok(n) }
    });

    let restarter = Arc::new(Restarter::default());
    let handle = WorkerHandle::builder(work)
        .config(one_second())
        .with_subscriber(restarter.clone())
        .build()
        .unwrap();
    let mut rx = handle.subscribe();
    assert!(restarter.handle.set(handle).is_ok());
    let handle = restarter.handle.get().unwrap();

    handle.start().unwrap();
    time::sleep(Duration::from_millis(10)).await;
    handle.stop();

    let first = collect_run(&mut rx).await;
    assert_eq!(first.iter().filter(|e| e.is_tick()).count(), 1);

    restarter.restarted.notified().await;
    assert!(restarter.restarts.lock().unwrap()[0].is_ok());
    assert!(handle.is_running());

    // the second run ticks after the first run's Finished, never before it
    let next = rx.recv().await.unwrap();
    assert_eq!(next.seq, 0);
    assert_eq!(next.result(), Some(&1));

    handle.shutdown(Duration::from_secs(1)).await.unwrap();
    let second = collect_run(&mut rx).await;
    assert!(second.last().unwrap().is_finished());
    assert_eq!(restarter.restarts.lock().unwrap().len(), 1);
}
