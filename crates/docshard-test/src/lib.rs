//! # docshard-test
//!
//! Testing utilities for docshard.
//!
//! - [`RecordingAdmin`]: in-memory [`AdminCommands`](docshard_db::AdminCommands)
//!   that records every call
//! - [`logging`]: capture `tracing` events for assertions
//! - [`fixtures`]: `rstest` fixtures, including a MongoDB container behind the
//!   `testcontainers` feature
//!
//! ## Example
//!
//! ```rust,ignore
//! use docshard_test::fixtures::*;
//! use rstest::*;
//!
//! #[rstest]
//! #[tokio::test]
//! async fn test_with_mongo(#[future] mongodb_container: MongoContainer) {
//!     let mongo = mongodb_container.await;
//!     let settings = mongo.settings("sales");
//!     // ...
//! }
//! ```

pub mod fixtures;
pub mod logging;

pub use docshard_db::testing::{AdminCall, RecordingAdmin};
pub use logging::{CapturedLogs, capture_logs};
