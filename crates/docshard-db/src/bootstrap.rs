//! Sharding bootstrap
//!
//! Wires the registry, the executor and the observer together for one mapping
//! context.
//!
//! # Example
//!
//! ```rust,no_run
//! use docshard_conf::MongoSettings;
//! use docshard_db::backend::MongoDBBackend;
//! use docshard_db::bootstrap::ShardingBootstrap;
//! use docshard_db::entity::DocumentEntity;
//! use docshard_db::mapping::{MappingContext, MappingEventBus};
//! use std::sync::Arc;
//!
//! struct Order;
//!
//! impl DocumentEntity for Order {
//! 	const COLLECTION_NAME: &'static str = "orders";
//! 	const SHARD_KEY: Option<&'static str> = Some(r#"{"region": 1}"#);
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = MongoSettings::default();
//! let backend = Arc::new(MongoDBBackend::from_settings(&settings).await?);
//!
//! let context = MappingContext::new(MappingEventBus::new());
//! let bootstrap = ShardingBootstrap::new(settings, backend);
//! let observer = bootstrap.start(&context).await?;
//!
//! context.register::<Order>();
//! # drop(observer);
//! # Ok(())
//! # }
//! ```

use docshard_conf::MongoSettings;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::admin::AdminCommands;
use crate::error::Result;
use crate::executor::ShardEnablementExecutor;
use crate::mapping::MappingContext;
use crate::observer::EntityMetadataObserver;
use crate::registry::ShardKeyRegistry;

/// Composition root of the sharding subsystem
#[derive(Debug)]
pub struct ShardingBootstrap {
	settings: MongoSettings,
	registry: Arc<ShardKeyRegistry>,
	executor: Arc<ShardEnablementExecutor>,
}

impl ShardingBootstrap {
	pub fn new(settings: MongoSettings, admin: Arc<dyn AdminCommands>) -> Self {
		Self {
			settings,
			registry: Arc::new(ShardKeyRegistry::new()),
			executor: Arc::new(ShardEnablementExecutor::new(admin)),
		}
	}

	pub fn settings(&self) -> &MongoSettings {
		&self.settings
	}

	/// Seen-set shared by every observer started from this bootstrap
	pub fn registry(&self) -> Arc<ShardKeyRegistry> {
		Arc::clone(&self.registry)
	}

	pub fn executor(&self) -> Arc<ShardEnablementExecutor> {
		Arc::clone(&self.executor)
	}

	/// Enable database sharding and start observing `context`.
	///
	/// Returns `None` when sharding is disabled. A fatal error while enabling
	/// database sharding aborts startup and no observer is spawned.
	pub async fn start(&self, context: &MappingContext) -> Result<Option<JoinHandle<Result<()>>>> {
		if !self.settings.sharding.enabled {
			tracing::info!(
				database = %self.executor.database_name(),
				"Sharding disabled, shard keys will not be applied"
			);
			return Ok(None);
		}

		let outcome = self.executor.ensure_database_sharding().await?;

		// Subscribe first so nothing registered after `start` returns is missed
		let events = context.bus().subscribe();
		let observer = Arc::new(EntityMetadataObserver::new(
			context.id(),
			self.registry(),
			self.executor(),
		));

		tracing::info!(
			context = %context.id(),
			database = %self.executor.database_name(),
			outcome = ?outcome,
			"Started shard key observer"
		);

		Ok(Some(observer.spawn(events)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::entity::DocumentEntity;
	use crate::error::AdminError;
	use crate::executor::ShardingOutcome;
	use crate::mapping::MappingEventBus;
	use crate::testing::RecordingAdmin;
	use bson::doc;
	use docshard_conf::ShardingSettings;
	use rstest::rstest;

	struct Order;

	impl DocumentEntity for Order {
		const COLLECTION_NAME: &'static str = "orders";
		const SHARD_KEY: Option<&'static str> = Some(r#"{"region": 1, "orderId": "hashed"}"#);
	}

	fn settings(enabled: bool) -> MongoSettings {
		MongoSettings {
			database: "sales".to_string(),
			sharding: ShardingSettings { enabled },
			..Default::default()
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_start_enables_database_and_observes_context() {
		// Arrange
		let admin = Arc::new(RecordingAdmin::new("sales"));
		let bootstrap = ShardingBootstrap::new(settings(true), admin.clone());
		let context = MappingContext::new(MappingEventBus::new());

		// Act
		let handle = bootstrap.start(&context).await.unwrap().unwrap();
		context.register::<Order>();
		drop(context);
		let result = handle.await.unwrap();

		// Assert
		assert!(result.is_ok());
		assert_eq!(
			bootstrap.executor().database_sharding_outcome(),
			Some(ShardingOutcome::Applied)
		);
		assert_eq!(admin.commands_named("enableSharding").len(), 1);
		assert_eq!(
			admin.commands_named("shardCollection"),
			vec![doc! {
				"shardCollection": "sales.orders",
				"key": { "region": 1, "orderId": "hashed" },
			}]
		);
		assert_eq!(bootstrap.registry().len(), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_start_when_disabled_does_nothing() {
		// Arrange
		let admin = Arc::new(RecordingAdmin::new("sales"));
		let bootstrap = ShardingBootstrap::new(settings(false), admin.clone());
		let context = MappingContext::new(MappingEventBus::new());

		// Act
		let handle = bootstrap.start(&context).await.unwrap();
		context.register::<Order>();

		// Assert
		assert!(handle.is_none());
		assert!(admin.calls().is_empty());
		assert_eq!(context.bus().subscriber_count(), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_start_aborts_on_fatal_enable_failure() {
		// Arrange
		let admin = Arc::new(RecordingAdmin::new("sales").fail_command(
			"enableSharding",
			AdminError::command(13, "Unauthorized", "not authorized on admin"),
		));
		let bootstrap = ShardingBootstrap::new(settings(true), admin);
		let context = MappingContext::new(MappingEventBus::new());

		// Act
		let result = bootstrap.start(&context).await;

		// Assert
		assert_eq!(result.unwrap_err().code(), Some(13));
		assert_eq!(context.bus().subscriber_count(), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_start_tolerates_standalone_server() {
		// Arrange
		let admin = Arc::new(RecordingAdmin::new("sales").fail_command(
			"enableSharding",
			AdminError::command(59, "CommandNotFound", "no such command: 'enableSharding'"),
		));
		let bootstrap = ShardingBootstrap::new(settings(true), admin);
		let context = MappingContext::new(MappingEventBus::new());

		// Act
		let handle = bootstrap.start(&context).await.unwrap();

		// Assert
		assert!(handle.is_some());
		assert_eq!(
			bootstrap.executor().database_sharding_outcome(),
			Some(ShardingOutcome::ClusterUnavailable)
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_observers_share_the_registry() {
		// Arrange
		let admin = Arc::new(RecordingAdmin::new("sales"));
		let bootstrap = ShardingBootstrap::new(settings(true), admin.clone());
		let bus = MappingEventBus::new();
		let first = MappingContext::new(bus.clone());
		let second = MappingContext::new(bus);

		// Act
		let first_handle = bootstrap.start(&first).await.unwrap().unwrap();
		let second_handle = bootstrap.start(&second).await.unwrap().unwrap();
		first.register::<Order>();
		second.register::<Order>();
		drop(first);
		drop(second);
		first_handle.await.unwrap().unwrap();
		second_handle.await.unwrap().unwrap();

		// Assert
		assert_eq!(admin.commands_named("enableSharding").len(), 1);
		assert_eq!(admin.commands_named("shardCollection").len(), 1);
	}
}
