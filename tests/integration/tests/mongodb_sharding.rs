//! Sharding against a real MongoDB server
//!
//! The container runs a standalone `mongod`, so sharding commands are unknown
//! to it. These tests check that the driver errors are classified the same way
//! the recording backend reports them, and that the supporting index is still
//! built.

use bson::doc;
use docshard::db::{AdminCommands, AdminError, ShardEnablementExecutor, ShardKeyDeclaration};
use docshard::prelude::*;
use docshard_test::fixtures::{MongoContainer, mongodb_container};
use rstest::*;
use std::sync::Arc;

struct Shipment;

impl DocumentEntity for Shipment {
	const COLLECTION_NAME: &'static str = "shipments";
	const SHARD_KEY: Option<&'static str> = Some(r#"{"warehouseId": 1, "shippedAt": -1}"#);
}

async fn backend(mongo: &MongoContainer, database: &str) -> Arc<MongoDBBackend> {
	Arc::new(MongoDBBackend::from_settings(&mongo.settings(database)).await.unwrap())
}

#[rstest]
#[tokio::test]
async fn test_health_check(#[future] mongodb_container: MongoContainer) {
	// Arrange
	let mongo = mongodb_container.await;
	let backend = backend(&mongo, "health").await;

	// Act
	let result = backend.health_check().await;

	// Assert
	assert!(result.is_ok());
}

#[rstest]
#[tokio::test]
async fn test_unknown_command_maps_to_command_not_found(#[future] mongodb_container: MongoContainer) {
	// Arrange
	let mongo = mongodb_container.await;
	let backend = backend(&mongo, "errors").await;

	// Act
	let result = backend.run_admin_command(doc! { "enableSharding": "errors" }).await;

	// Assert
	assert!(matches!(result, Err(AdminError::Command { code: 59, .. })));
}

#[rstest]
#[tokio::test]
async fn test_standalone_server_builds_index_and_continues(#[future] mongodb_container: MongoContainer) {
	// Arrange
	let mongo = mongodb_container.await;
	let backend = backend(&mongo, "logistics").await;
	let executor = ShardEnablementExecutor::new(backend.clone());
	let key = ShardKeyDeclaration::parse(Shipment::SHARD_KEY.unwrap()).unwrap();

	// Act
	let outcome = executor.create_shard_key("shipments", Some(&key)).await.unwrap();

	// Assert
	assert_eq!(outcome, ShardingOutcome::ClusterUnavailable);
	let indexes = backend
		.database()
		.collection::<bson::Document>("shipments")
		.list_index_names()
		.await
		.unwrap();
	assert!(indexes.contains(&"warehouseId_1_shippedAt_-1".to_string()));
}

#[rstest]
#[tokio::test]
async fn test_bootstrap_against_standalone_server(#[future] mongodb_container: MongoContainer) {
	// Arrange
	let mongo = mongodb_container.await;
	let settings = mongo.settings("bootstrap");
	let backend = backend(&mongo, "bootstrap").await;
	let bootstrap = ShardingBootstrap::new(settings, backend.clone());
	let context = MappingContext::new(MappingEventBus::new());

	// Act
	let observer = bootstrap.start(&context).await.unwrap().unwrap();
	context.register::<Shipment>();
	context.register::<Shipment>();
	drop(context);
	let result = observer.await.unwrap();

	// Assert
	assert!(result.is_ok());
	assert_eq!(
		bootstrap.executor().database_sharding_outcome(),
		Some(ShardingOutcome::ClusterUnavailable)
	);
	let indexes = backend
		.database()
		.collection::<bson::Document>("shipments")
		.list_index_names()
		.await
		.unwrap();
	assert!(indexes.contains(&"warehouseId_1_shippedAt_-1".to_string()));
}
