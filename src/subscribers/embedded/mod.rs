//! # Built-in subscribers
//!
//! - [`LogWriter`]: renders every event as a `tracing` record.

mod log;

pub use log::LogWriter;
