//! Log capture for assertions on `tracing` output
//!
//! The capture layer lives next to [`RecordingAdmin`](crate::RecordingAdmin)
//! in `docshard_db::testing`, so the unit tests of `docshard-db` use the same
//! implementation.
//!
//! # Example
//!
//! ```rust
//! use docshard_test::capture_logs;
//!
//! let (_guard, logs) = capture_logs();
//! tracing::warn!("No shard key defined for collection");
//! assert!(logs.contains(tracing::Level::WARN, "No shard key"));
//! ```

pub use docshard_db::testing::{CapturedEvent, CapturedLogs, capture_logs};
