//! # Example: ticker
//!
//! Runs a worker that returns `42` every second, stops it after 2.3 seconds and
//! waits for `Finished`.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► WorkerHandle::start()
//!   │     └─► Worker::run(): Tick(42) at 0s, 1s, 2s
//!   ├─► sleep 2.3s
//!   ├─► WorkerHandle::stop()      (returns immediately)
//!   └─► receive Finished          (within one 50ms poll)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example ticker
//! ```

use std::time::{Duration, Instant};

use tickvisor::{Config, EventKind, WorkFn, WorkerHandle};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config::new(Duration::from_secs(1))
        .with_poll_period(Duration::from_millis(50))
        .with_name("ticker");

    let handle = WorkerHandle::new(WorkFn::arc(|| async { Ok(42u32) }), cfg)?;
    let mut events = handle.subscribe();

    let started = Instant::now();
    handle.start()?;

    let stop_timer = tokio::time::sleep(Duration::from_millis(2300));
    tokio::pin!(stop_timer);
    let mut stop_sent = false;
    loop {
        tokio::select! {
            _ = &mut stop_timer, if !stop_sent => {
                println!("[{:>5}ms] stop requested", started.elapsed().as_millis());
                handle.stop();
                stop_sent = true;
            }
            ev = events.recv() => {
                let ev = ev?;
                let at = started.elapsed().as_millis();
                match &ev.kind {
                    EventKind::Tick(v) => println!("[{at:>5}ms] tick #{} -> {v}", ev.iteration.unwrap_or(0)),
                    EventKind::Error(e) => println!("[{at:>5}ms] error: {e}"),
                    EventKind::Finished => {
                        println!("[{at:>5}ms] finished (running={})", handle.is_running());
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}
