use std::sync::Arc;

use tokio::runtime;

use super::handle::{Inner, WorkerHandle};
use crate::{
    config::Config,
    error::HandleError,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
    work::WorkRef,
};

/// Builder for constructing a [`WorkerHandle`] with optional subscribers.
pub struct WorkerHandleBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    work: WorkRef<T>,
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe<T>>>,
    runtime: Option<runtime::Handle>,
}

impl<T> WorkerHandleBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a new builder for `work` with [`Config::default`].
    pub fn new(work: WorkRef<T>) -> Self {
        Self {
            work,
            cfg: Config::default(),
            subscribers: Vec::new(),
            runtime: None,
        }
    }

    /// Sets the worker configuration.
    pub fn config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive rebroadcast events through dedicated workers with
    /// bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe<T>>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one event subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe<T>>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Runs the worker and the handle's tasks on the given runtime instead of the current one.
    ///
    /// Lets a handle be built and driven from a thread that is not inside a runtime
    /// (a GUI thread, for instance).
    pub fn with_runtime(mut self, runtime: runtime::Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Builds the handle.
    ///
    /// Spawns one delivery task per subscriber on the chosen runtime.
    ///
    /// # Errors
    /// [`HandleError::NoRuntime`] if no runtime was given and the caller is not
    /// inside one.
    pub fn build(self) -> Result<WorkerHandle<T>, HandleError> {
        let runtime = match self.runtime {
            Some(rt) => rt,
            None => runtime::Handle::try_current().map_err(|_| HandleError::NoRuntime)?,
        };

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, &runtime);

        Ok(WorkerHandle::from_inner(Inner::new(
            self.work, self.cfg, bus, subs, runtime,
        )))
    }
}
