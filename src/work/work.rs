//! # Work trait.
//!
//! A [`Work`] is what a [`Worker`](crate::Worker) runs: one `prepare`, then `process`
//! every interval until a stop is requested, then one `cleanup`.
//!
//! Hooks return [`anyhow::Result`] so applications can use `?` on any error type.
//! Failures are wrapped by the worker into [`WorkerError`](crate::WorkerError)
//! and published; they never stop the loop.

use std::sync::Arc;

use async_trait::async_trait;

/// # Periodic unit of work.
///
/// Only [`process`](Work::process) is required. The worker owns no state of the
/// work itself: keep counters, connections and the like behind interior
/// mutability in the implementor.
///
/// Returning `Err(WorkerError::ProcessNotImplemented.into())` from `process`
/// marks the work as unconfigured: the worker publishes the fatal error and
/// leaves the loop.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use async_trait::async_trait;
/// use tickvisor::Work;
///
/// struct Counter(AtomicU64);
///
/// #[async_trait]
/// impl Work for Counter {
///     type Output = u64;
///
///     async fn process(&self) -> anyhow::Result<u64> {
///         Ok(self.0.fetch_add(1, Ordering::Relaxed))
///     }
/// }
/// ```
#[async_trait]
pub trait Work: Send + Sync + 'static {
    /// Result published with every `Tick`.
    type Output: Clone + Send + Sync + 'static;

    /// Runs once before the loop. Failure is published and the loop still runs.
    async fn prepare(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs once per iteration.
    ///
    /// The worker runs on a tokio task and never interrupts this call, so a stop
    /// takes effect only after it returns. Blocking code here stalls a runtime
    /// thread (on a `current_thread` runtime, the owning side too); move it onto
    /// [`tokio::task::spawn_blocking`] and await the join handle:
    ///
    /// ```
    /// # use async_trait::async_trait;
    /// # use tickvisor::Work;
    /// struct Checksum;
    ///
    /// #[async_trait]
    /// impl Work for Checksum {
    ///     type Output = u64;
    ///
    ///     async fn process(&self) -> anyhow::Result<u64> {
    ///         let sum = tokio::task::spawn_blocking(|| {
    ///             std::fs::read("/etc/hostname")
    ///                 .map(|bytes| bytes.iter().map(|b| u64::from(*b)).sum())
    ///         })
    ///         .await??;
    ///         Ok(sum)
    ///     }
    /// }
    /// ```
    async fn process(&self) -> anyhow::Result<Self::Output>;

    /// Runs once after the loop. Failure is published and `Finished` still follows.
    async fn cleanup(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Shared handle to work, reused across runs of the same [`WorkerHandle`](crate::WorkerHandle).
pub type WorkRef<T> = Arc<dyn Work<Output = T>>;
