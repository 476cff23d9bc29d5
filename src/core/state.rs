//! # Shared stop flag.
//!
//! [`WorkerState`] is the only datum shared between the worker task and the rest
//! of the program: one `running` boolean behind a mutex. It starts `true`, a stop
//! request sets it to `false` once, and nothing ever sets it back. A stopped
//! worker is not restartable; the handle builds a new one per run.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Running flag guarded by a mutex.
#[derive(Debug)]
pub(crate) struct WorkerState {
    running: Mutex<bool>,
}

impl WorkerState {
    pub(crate) fn new() -> Self {
        Self {
            running: Mutex::new(true),
        }
    }

    /// Clears the flag. Returns `true` only for the call that actually flipped it.
    pub(crate) fn request_stop(&self) -> bool {
        let mut running = self.lock();
        std::mem::replace(&mut *running, false)
    }

    pub(crate) fn is_running(&self) -> bool {
        *self.lock()
    }

    // A poisoned bool is still a valid bool.
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cloneable handle that requests a stop of one worker run.
///
/// Safe to use from any thread or task, any number of times. It never waits
/// for the loop: completion is signalled by the `Finished` event.
#[derive(Clone, Debug)]
pub struct StopHandle {
    state: Arc<WorkerState>,
    worker: Arc<str>,
}

impl StopHandle {
    pub(crate) fn new(state: Arc<WorkerState>, worker: Arc<str>) -> Self {
        Self { state, worker }
    }

    /// Requests a cooperative stop.
    ///
    /// Takes effect within one poll period while the worker waits, or after the
    /// in-flight `process()` call returns.
    pub fn request_stop(&self) {
        if self.state.request_stop() {
            tracing::debug!(worker = %self.worker, "stop requested");
        }
    }

    /// True until the first stop request.
    pub fn is_stop_requested(&self) -> bool {
        !self.state.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_flips_once() {
        let state = WorkerState::new();
        assert!(state.is_running());
        assert!(state.request_stop());
        assert!(!state.request_stop());
        assert!(!state.is_running());
    }

    #[test]
    fn test_stop_from_other_threads() {
        let state = Arc::new(WorkerState::new());
        let handle = StopHandle::new(Arc::clone(&state), Arc::from("t"));

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let h = handle.clone();
                std::thread::spawn(move || h.request_stop())
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert!(handle.is_stop_requested());
        assert!(!state.is_running());
    }
}
