//! # Work abstractions.
//!
//! This module provides the units a worker executes:
//! - [`Work`] - trait with the `prepare` / `process` / `cleanup` hooks
//! - [`WorkFn`] - closure-backed implementation built with [`WorkFnBuilder`]
//! - [`WorkRef`] - shared reference to work (`Arc<dyn Work<Output = T>>`)

mod work;
mod work_fn;

pub use work::{Work, WorkRef};
pub use work_fn::{WorkFn, WorkFnBuilder};
