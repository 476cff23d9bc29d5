//! # Worker configuration.
//!
//! Provides [`Config`] settings for one periodic worker.
//!
//! Config is used in two ways:
//! 1. **Handle creation**: `WorkerHandle::builder(work).config(cfg)`
//! 2. **Direct worker use**: `Worker::new(work, cfg)`
//!
//! ## Sentinel values
//! - `poll_period = 0s` → clamped to 1ms (a zero step would never finish the wait)
//! - `bus_capacity = 0` → clamped to 1

use std::borrow::Cow;
use std::time::Duration;

/// Smallest poll step the wait loop will use.
const MIN_POLL_PERIOD: Duration = Duration::from_millis(1);

/// Configuration for a periodic worker.
///
/// ## Field semantics
/// - `interval`: pause between the end of one iteration and the start of the next
/// - `poll_period`: how often the stop flag is rechecked while waiting
/// - `bus_capacity`: handle event bus ring buffer size (min 1)
/// - `name`: worker name stamped on events and log records
///
/// `poll_period <= interval` is expected but not enforced. With a larger poll
/// period the wait degenerates into a single poll-length sleep.
///
/// ## Notes
/// All fields are public. Prefer the accessors over reading sentinel fields directly.
#[derive(Clone, Debug)]
pub struct Config {
    /// Pause between work iterations.
    pub interval: Duration,

    /// Granularity at which the stop flag is rechecked during the wait.
    ///
    /// Caps cancellation latency during the wait phase.
    pub poll_period: Duration,

    /// Capacity of the handle's broadcast bus.
    ///
    /// Receivers that lag behind more than `bus_capacity` events observe `Lagged`.
    pub bus_capacity: usize,

    /// Worker name.
    pub name: Cow<'static, str>,
}

impl Config {
    /// Creates a config with the given interval and default everything else.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    /// Sets the interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the poll period.
    pub fn with_poll_period(mut self, poll_period: Duration) -> Self {
        self.poll_period = poll_period;
        self
    }

    /// Sets the bus capacity.
    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity;
        self
    }

    /// Sets the worker name.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the poll period raised to at least 1ms.
    #[inline]
    pub fn poll_period_clamped(&self) -> Duration {
        self.poll_period.max(MIN_POLL_PERIOD)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// True when the poll period is longer than the interval.
    #[inline]
    pub fn poll_exceeds_interval(&self) -> bool {
        self.poll_period_clamped() > self.interval
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `interval = 1s`
    /// - `poll_period = 50ms`
    /// - `bus_capacity = 1024`
    /// - `name = "worker"`
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            poll_period: Duration::from_millis(50),
            bus_capacity: 1024,
            name: Cow::Borrowed("worker"),
        }
    }
}
