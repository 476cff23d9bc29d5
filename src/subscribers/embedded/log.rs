//! # LogWriter: event logger
//!
//! A minimal subscriber that renders incoming [`Event`]s as `tracing` records.
//! Install any `tracing` subscriber to see them.
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO tickvisor: tick worker="poller" seq=0 iteration=1 result=42
//! WARN tickvisor: error worker="poller" seq=1 iteration=2 label="worker_process_failed" err=process failed at iteration 2: timeout
//! INFO tickvisor: finished worker="poller" seq=2
//! ```

use std::fmt::Debug;

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default, Debug)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<T> Subscribe<T> for LogWriter
where
    T: Debug + Clone + Send + Sync + 'static,
{
    async fn on_event(&self, e: &Event<T>) {
        match &e.kind {
            EventKind::Tick(result) => {
                tracing::info!(worker = %e.worker, seq = e.seq, iteration = ?e.iteration, ?result, "tick");
            }
            EventKind::Error(err) => {
                tracing::warn!(
                    worker = %e.worker,
                    seq = e.seq,
                    iteration = ?e.iteration,
                    label = err.as_label(),
                    err = %err,
                    "error"
                );
            }
            EventKind::Finished => {
                tracing::info!(worker = %e.worker, seq = e.seq, "finished");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_handles_every_kind() {
        let w = LogWriter::new();
        Subscribe::<u8>::on_event(&w, &Event::new(EventKind::Tick(1))).await;
        Subscribe::<u8>::on_event(
            &w,
            &Event::new(EventKind::Error(Arc::new(
                crate::WorkerError::ProcessNotImplemented,
            ))),
        )
        .await;
        Subscribe::<u8>::on_event(&w, &Event::new(EventKind::Finished)).await;
        assert_eq!(Subscribe::<u8>::name(&w), "LogWriter");
    }
}
