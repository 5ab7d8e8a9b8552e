//! # docshard-db
//!
//! Shard-key discovery and enablement for MongoDB document entities.
//!
//! Document types declare a collection name and, optionally, a shard key.
//! When a type is registered with a [`MappingContext`](mapping::MappingContext),
//! the [`EntityMetadataObserver`](observer::EntityMetadataObserver) picks up the
//! event, and the [`ShardEnablementExecutor`](executor::ShardEnablementExecutor)
//! builds the supporting index and issues `shardCollection` against the admin
//! database.
//!
//! ## Modules
//!
//! - [`entity`]: document type declarations and runtime descriptors
//! - [`mapping`]: mapping context and registration events
//! - [`shard_key`]: shard key declaration parsing
//! - [`registry`]: seen-set of processed entity types
//! - [`executor`]: `enableSharding` / `shardCollection` and error classification
//! - [`observer`]: reacts to registration events
//! - [`bootstrap`]: composition root
//! - [`backend`]: MongoDB driver implementation of [`AdminCommands`](admin::AdminCommands)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docshard_db::prelude::*;
//! use std::sync::Arc;
//!
//! struct Order;
//!
//! impl DocumentEntity for Order {
//! 	const COLLECTION_NAME: &'static str = "orders";
//! 	const SHARD_KEY: Option<&'static str> = Some(r#"{"region": 1, "orderId": 1}"#);
//! }
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let settings = MongoSettings::from_file("docshard.toml")?;
//! let backend = Arc::new(MongoDBBackend::from_settings(&settings).await?);
//!
//! let context = MappingContext::new(MappingEventBus::new());
//! let _observer = ShardingBootstrap::new(settings, backend).start(&context).await?;
//!
//! context.register::<Order>();
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Only genuine failures surface as [`ShardingError`]. A collection that is
//! already sharded, or a deployment without a `mongos` router, is reported
//! through [`ShardingOutcome`] instead.

pub mod admin;
pub mod backend;
pub mod bootstrap;
pub mod entity;
pub mod error;
pub mod executor;
pub mod mapping;
pub mod observer;
pub mod registry;
pub mod shard_key;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use admin::AdminCommands;
pub use backend::{MongoDBBackend, MongoDBBackendBuilder};
pub use bootstrap::ShardingBootstrap;
pub use entity::{DocumentEntity, DocumentMapping, EntityType, EntityTypeId};
pub use error::{AdminError, Result, ShardingError};
pub use executor::{ShardEnablementExecutor, ShardingOutcome};
pub use mapping::{MappingContext, MappingContextId, MappingEvent, MappingEventBus};
pub use observer::{EntityDisposition, EntityMetadataObserver};
pub use registry::ShardKeyRegistry;
pub use shard_key::{ShardKeyDeclaration, ShardKeyDirection, ShardKeyParseError};

/// Commonly used types
pub mod prelude {
	pub use crate::admin::AdminCommands;
	pub use crate::backend::MongoDBBackend;
	pub use crate::bootstrap::ShardingBootstrap;
	pub use crate::entity::DocumentEntity;
	pub use crate::error::{Result, ShardingError};
	pub use crate::executor::ShardingOutcome;
	pub use crate::mapping::{MappingContext, MappingEventBus};
	pub use crate::shard_key::ShardKeyDeclaration;
	pub use docshard_conf::MongoSettings;
}
