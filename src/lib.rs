//! # docshard
//!
//! Shard-key discovery and enablement for MongoDB document entities.
//!
//! Document types declare the collection they live in and, optionally, a
//! shard key. When a type is registered with a mapping context, docshard
//! builds the supporting index and shards the collection, once per type, and
//! keeps going on deployments that are not sharded clusters.
//!
//! ## Crates
//!
//! - [`conf`]: connection and sharding settings (TOML and environment)
//! - [`db`]: entity declarations, mapping events, observer and executor
//! - `test` (feature `test`): recording admin backend, log capture and fixtures
//!
//! ## Feature Flags
//!
//! - `test` - Testing utilities
//! - `testcontainers` - MongoDB container fixture (requires Docker)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docshard::prelude::*;
//! use std::sync::Arc;
//!
//! struct Order;
//!
//! impl DocumentEntity for Order {
//! 	const COLLECTION_NAME: &'static str = "orders";
//! 	const SHARD_KEY: Option<&'static str> = Some(r#"{"region": 1}"#);
//! }
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! 	let mut settings = MongoSettings::from_file("docshard.toml")?;
//! 	settings.apply_env(&docshard::conf::Env::new())?;
//! 	settings.validate()?;
//!
//! 	let backend = Arc::new(MongoDBBackend::from_settings(&settings).await?);
//! 	let context = MappingContext::new(MappingEventBus::new());
//! 	let _observer = ShardingBootstrap::new(settings, backend).start(&context).await?;
//!
//! 	context.register::<Order>();
//! 	Ok(())
//! }
//! ```

pub use docshard_conf as conf;
pub use docshard_db as db;

#[cfg(feature = "test")]
pub use docshard_test as test;

// External crates re-exported for downstream users
pub use async_trait::async_trait;
pub use bson;
pub use tracing;

pub use docshard_conf::{Env, MongoSettings, SettingsError, ShardingSettings};
pub use docshard_db::{
	AdminCommands, AdminError, DocumentEntity, EntityMetadataObserver, MappingContext,
	MappingEventBus, MongoDBBackend, ShardEnablementExecutor, ShardKeyDeclaration,
	ShardKeyRegistry, ShardingBootstrap, ShardingError, ShardingOutcome,
};

/// Commonly used types
pub mod prelude {
	pub use docshard_db::prelude::*;

	pub use crate::async_trait;
}
