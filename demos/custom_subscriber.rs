//! # Example: custom_subscriber
//!
//! Demonstrates how to build and attach a custom event subscriber.
//!
//! Shows how to:
//! - Implement the [`Subscribe`] trait through its per-kind callbacks.
//! - Wire subscribers into [`WorkerHandle::builder`].
//! - Restart a worker once it reports `Finished`.
//!
//! ## Run
//! ```bash
//! cargo run --example custom_subscriber
//! cargo run --example custom_subscriber --features logging   # adds LogWriter
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tickvisor::{Config, Subscribe, WorkFn, WorkerError, WorkerHandle};
use tokio::sync::mpsc;

/// Keeps a running sum of tick results and reports when a run ends.
struct Summer {
    sum: AtomicU64,
    done: mpsc::UnboundedSender<u64>,
}

#[async_trait]
impl Subscribe<u64> for Summer {
    async fn on_tick(&self, value: &u64) {
        let sum = self.sum.fetch_add(*value, Ordering::Relaxed) + value;
        println!("[summer] +{value} = {sum}");
    }

    async fn on_error(&self, error: &WorkerError) {
        println!("[summer] error ({}): {}", error.as_label(), error.as_message());
    }

    async fn on_finished(&self) {
        let _ = self.done.send(self.sum.load(Ordering::Relaxed));
    }

    fn name(&self) -> &'static str {
        "summer"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let counter = Arc::new(AtomicU64::new(0));
    let c = Arc::clone(&counter);
    let work = WorkFn::builder()
        .prepare(|| async {
            println!("[work] prepare");
            Ok(())
        })
        .process(move || {
            let n = c.fetch_add(1, Ordering::Relaxed);
            async move { Ok(n) }
        })
        .cleanup(|| async {
            println!("[work] cleanup");
            Ok(())
        })
        .arc();

    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let summer = Arc::new(Summer {
        sum: AtomicU64::new(0),
        done: done_tx,
    });

    #[allow(unused_mut)]
    let mut builder = WorkerHandle::builder(work)
        .config(
            Config::new(Duration::from_millis(200))
                .with_poll_period(Duration::from_millis(20))
                .with_name("counter"),
        )
        .with_subscriber(summer);
    #[cfg(feature = "logging")]
    {
        builder = builder.with_subscriber(Arc::new(tickvisor::LogWriter::new()));
    }
    let handle = builder.build()?;

    for run in 1..=2 {
        println!("=== run {run} ===");
        handle.start()?;
        tokio::time::sleep(Duration::from_millis(700)).await;
        handle.stop();
        let sum = done_rx.recv().await.unwrap_or_default();
        println!("=== run {run} finished, sum so far {sum} ===");
    }
    Ok(())
}
