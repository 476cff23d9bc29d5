//! # Closure-backed work (`WorkFn`)
//!
//! [`WorkFn`] wraps closures `Fn() -> Fut`, producing a fresh future per call.
//! Shared state goes into `Arc<...>` captured by the closures.
//!
//! `process` is optional at construction time so that work can be assembled
//! piecemeal; a `WorkFn` without it fails the first time the loop reaches it.
//!
//! ## Example
//! ```rust
//! use tickvisor::{WorkFn, WorkRef};
//!
//! let work: WorkRef<u32> = WorkFn::builder()
//!     .prepare(|| async { Ok(()) })
//!     .process(|| async { Ok(42u32) })
//!     .arc();
//! # let _ = work;
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};

use crate::error::WorkerError;
use crate::work::Work;

type Hook = Box<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;
type ProcessHook<T> = Box<dyn Fn() -> BoxFuture<'static, anyhow::Result<T>> + Send + Sync>;

/// Closure-backed [`Work`] implementation.
pub struct WorkFn<T> {
    prepare: Option<Hook>,
    process: Option<ProcessHook<T>>,
    cleanup: Option<Hook>,
}

impl<T> WorkFn<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates work from a process closure alone.
    pub fn new<F, Fut>(process: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self::builder().process(process).build()
    }

    /// Creates the work and returns it as a shared handle.
    ///
    /// ## Example
    /// ```rust
    /// use tickvisor::{WorkFn, WorkRef};
    ///
    /// let w: WorkRef<&'static str> = WorkFn::arc(|| async { Ok("pong") });
    /// # let _ = w;
    /// ```
    pub fn arc<F, Fut>(process: F) -> Arc<Self>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Arc::new(Self::new(process))
    }

    /// Starts a builder with no hooks set.
    pub fn builder() -> WorkFnBuilder<T> {
        WorkFnBuilder {
            inner: WorkFn {
                prepare: None,
                process: None,
                cleanup: None,
            },
        }
    }
}

impl<T> fmt::Debug for WorkFn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkFn")
            .field("prepare", &self.prepare.is_some())
            .field("process", &self.process.is_some())
            .field("cleanup", &self.cleanup.is_some())
            .finish()
    }
}

#[async_trait]
impl<T> Work for WorkFn<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = T;

    async fn prepare(&self) -> anyhow::Result<()> {
        match &self.prepare {
            Some(f) => f().await,
            None => Ok(()),
        }
    }

    async fn process(&self) -> anyhow::Result<T> {
        match &self.process {
            Some(f) => f().await,
            None => Err(WorkerError::ProcessNotImplemented.into()),
        }
    }

    async fn cleanup(&self) -> anyhow::Result<()> {
        match &self.cleanup {
            Some(f) => f().await,
            None => Ok(()),
        }
    }
}

/// Builder for [`WorkFn`].
pub struct WorkFnBuilder<T> {
    inner: WorkFn<T>,
}

impl<T> WorkFnBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Sets the hook run once before the loop.
    pub fn prepare<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.inner.prepare = Some(Box::new(move || f().boxed()));
        self
    }

    /// Sets the function run every iteration.
    pub fn process<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        self.inner.process = Some(Box::new(move || f().boxed()));
        self
    }

    /// Sets the hook run once after the loop.
    pub fn cleanup<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.inner.cleanup = Some(Box::new(move || f().boxed()));
        self
    }

    /// Finishes the builder.
    pub fn build(self) -> WorkFn<T> {
        self.inner
    }

    /// Finishes the builder and wraps the work in an `Arc`.
    pub fn arc(self) -> Arc<WorkFn<T>> {
        Arc::new(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_missing_hooks_default_to_noop() {
        let work: WorkFn<u8> = WorkFn::new(|| async { Ok(7) });
        assert!(work.prepare().await.is_ok());
        assert_eq!(work.process().await.unwrap(), 7);
        assert!(work.cleanup().await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_process_fails_with_not_implemented() {
        let work: WorkFn<u8> = WorkFn::builder().build();
        let err = work.process().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WorkerError>(),
            Some(WorkerError::ProcessNotImplemented)
        ));
    }

    #[tokio::test]
    async fn test_closures_share_captured_state() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let work = WorkFn::builder()
            .process(move || {
                let c = Arc::clone(&c);
                async move { Ok(c.fetch_add(1, Ordering::SeqCst)) }
            })
            .build();

        assert_eq!(work.process().await.unwrap(), 0);
        assert_eq!(work.process().await.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            format!("{work:?}"),
            "WorkFn { prepare: false, process: true, cleanup: false }"
        );
    }
}
