//! Error types used by workers and their handles.
//!
//! This module defines two error enums:
//!
//! - [`WorkerError`]: failures raised inside the work loop. They never escape
//!   [`Worker::run`](crate::Worker::run); they are published as
//!   [`EventKind::Error`](crate::EventKind::Error) events instead.
//! - [`HandleError`]: usage errors reported synchronously by
//!   [`WorkerHandle`](crate::WorkerHandle) (they do not originate in the loop).
//!
//! Both types provide `as_label` / `as_message` helpers for logs and metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced inside the work loop.
///
/// `Prepare`, `Process` and `Cleanup` wrap the application-defined cause and are
/// non-fatal: the loop keeps going. `ProcessNotImplemented` is fatal and keeps
/// the loop from running any further iteration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// `prepare()` failed (or panicked). The loop still runs.
    #[error("prepare failed: {source}")]
    Prepare {
        /// Application-defined cause.
        #[source]
        source: anyhow::Error,
    },

    /// `process()` failed (or panicked) for one iteration.
    #[error("process failed at iteration {iteration}: {source}")]
    Process {
        /// 1-based iteration that failed.
        iteration: u64,
        /// Application-defined cause.
        #[source]
        source: anyhow::Error,
    },

    /// `cleanup()` failed (or panicked). `Finished` is still published.
    #[error("cleanup failed: {source}")]
    Cleanup {
        /// Application-defined cause.
        #[source]
        source: anyhow::Error,
    },

    /// No work function was supplied.
    #[error("process function not implemented")]
    ProcessNotImplemented,
}

impl WorkerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tickvisor::WorkerError;
    ///
    /// assert_eq!(WorkerError::ProcessNotImplemented.as_label(), "worker_process_not_implemented");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Prepare { .. } => "worker_prepare_failed",
            WorkerError::Process { .. } => "worker_process_failed",
            WorkerError::Cleanup { .. } => "worker_cleanup_failed",
            WorkerError::ProcessNotImplemented => "worker_process_not_implemented",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WorkerError::Prepare { source } => format!("prepare: {source}"),
            WorkerError::Process { iteration, source } => {
                format!("process (iteration {iteration}): {source}")
            }
            WorkerError::Cleanup { source } => format!("cleanup: {source}"),
            WorkerError::ProcessNotImplemented => "process not implemented".to_string(),
        }
    }

    /// Indicates whether the error stops the loop.
    ///
    /// Only [`WorkerError::ProcessNotImplemented`] is fatal.
    ///
    /// # Example
    /// ```
    /// use tickvisor::WorkerError;
    ///
    /// let soft = WorkerError::Cleanup { source: anyhow::anyhow!("disk gone") };
    /// assert!(!soft.is_fatal());
    /// assert!(WorkerError::ProcessNotImplemented.is_fatal());
    /// ```
    pub fn is_fatal(&self) -> bool {
        matches!(self, WorkerError::ProcessNotImplemented)
    }
}

/// # Usage errors reported by a [`WorkerHandle`](crate::WorkerHandle).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    /// `start()` was called while the previous run has not finished yet.
    #[error("worker '{worker}' is already running")]
    AlreadyRunning {
        /// Worker name.
        worker: String,
    },

    /// No tokio runtime was available to host the worker.
    #[error("no tokio runtime available to spawn the worker")]
    NoRuntime,

    /// `shutdown()` gave up waiting for `Finished`; the worker was left running.
    #[error("worker did not finish within {grace:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
    },
}

impl HandleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tickvisor::HandleError;
    ///
    /// let err = HandleError::AlreadyRunning { worker: "poller".into() };
    /// assert_eq!(err.as_label(), "handle_already_running");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandleError::AlreadyRunning { .. } => "handle_already_running",
            HandleError::NoRuntime => "handle_no_runtime",
            HandleError::GraceExceeded { .. } => "handle_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandleError::AlreadyRunning { worker } => format!("already running: {worker}"),
            HandleError::NoRuntime => "no runtime".to_string(),
            HandleError::GraceExceeded { grace } => format!("grace exceeded after {grace:?}"),
        }
    }
}
