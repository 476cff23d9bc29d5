//! # Example: failing_work
//!
//! Demonstrates the error policy: failures are published and the loop keeps going.
//!
//! Shows how to:
//! - Observe `Error` events from `prepare` and `process`.
//! - Decide on the owning side to stop after repeated failures.
//! - Use [`WorkerHandle::shutdown`] with a grace period.
//!
//! ## Run
//! ```bash
//! cargo run --example failing_work
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tickvisor::{Config, EventKind, WorkFn, WorkerHandle};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn").init();

    let attempts = Arc::new(AtomicU32::new(0));
    let a = Arc::clone(&attempts);
    let work = WorkFn::builder()
        .prepare(|| async { Err(anyhow::anyhow!("cache warm-up failed")) })
        .process(move || {
            let n = a.fetch_add(1, Ordering::Relaxed) + 1;
            async move {
                if n % 3 != 0 {
                    anyhow::bail!("upstream unavailable (attempt {n})");
                }
                Ok(format!("payload #{n}"))
            }
        })
        .arc();

    let cfg = Config::new(Duration::from_millis(100))
        .with_poll_period(Duration::from_millis(10))
        .with_name("flaky");
    let handle = WorkerHandle::new(work, cfg)?;
    let mut events = handle.subscribe();
    handle.start()?;

    let mut consecutive = 0;
    loop {
        let ev = events.recv().await?;
        match &ev.kind {
            EventKind::Tick(payload) => {
                consecutive = 0;
                println!("tick: {payload}");
            }
            EventKind::Error(err) => {
                consecutive += 1;
                println!("error #{consecutive}: {err}");
                if consecutive >= 2 && attempts.load(Ordering::Relaxed) > 6 {
                    println!("too many failures, shutting down");
                    handle.shutdown(Duration::from_secs(1)).await?;
                }
            }
            EventKind::Finished => {
                println!("finished after {} attempts", attempts.load(Ordering::Relaxed));
                break;
            }
        }
    }
    Ok(())
}
