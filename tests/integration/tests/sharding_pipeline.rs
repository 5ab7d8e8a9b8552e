//! End-to-end sharding pipeline without a server
//!
//! Drives the public facade: settings, bootstrap, mapping context, observer and
//! executor, with a recording admin backend in place of MongoDB.

use bson::doc;
use docshard::db::{AdminError, EntityMetadataObserver, MappingEvent, ShardKeyRegistry};
use docshard::prelude::*;
use docshard_test::fixtures::recording_admin;
use docshard_test::{AdminCall, RecordingAdmin, capture_logs};
use rstest::*;
use std::sync::Arc;
use tracing::Level;

struct Order;

impl DocumentEntity for Order {
	const COLLECTION_NAME: &'static str = "orders";
	const SHARD_KEY: Option<&'static str> = Some(r#"{"region": 1, "orderId": 1}"#);
}

struct Customer;

impl DocumentEntity for Customer {
	const COLLECTION_NAME: &'static str = "customers";
	const SHARD_KEY: Option<&'static str> = Some(r#"{"customerId": "hashed"}"#);
}

struct AuditEntry;

impl DocumentEntity for AuditEntry {
	const COLLECTION_NAME: &'static str = "audit";
}

struct Address;

fn sales_settings() -> MongoSettings {
	MongoSettings::from_toml_str(
		r#"
		url = "mongodb://mongos.internal:27017"
		database = "sales"
		"#,
	)
	.unwrap()
}

/// Registration order is preserved end to end
#[rstest]
#[tokio::test]
async fn test_application_startup_shards_every_declared_collection(
	recording_admin: Arc<RecordingAdmin>,
) {
	// Arrange
	let bootstrap = ShardingBootstrap::new(sales_settings(), recording_admin.clone());
	let context = MappingContext::new(MappingEventBus::new());
	let observer = bootstrap.start(&context).await.unwrap().unwrap();

	// Act
	context.register::<Order>();
	context.register::<Customer>();
	context.register::<AuditEntry>();
	context.register_plain::<Address>();
	context.register::<Order>();
	drop(context);
	observer.await.unwrap().unwrap();

	// Assert
	assert_eq!(
		recording_admin.calls(),
		vec![
			AdminCall::Command(doc! { "enableSharding": "sales" }),
			AdminCall::CreateIndex {
				collection: "orders".to_string(),
				keys: doc! { "region": 1, "orderId": 1 },
				background: false,
			},
			AdminCall::Command(doc! {
				"shardCollection": "sales.orders",
				"key": { "region": 1, "orderId": 1 },
			}),
			AdminCall::CreateIndex {
				collection: "customers".to_string(),
				keys: doc! { "customerId": "hashed" },
				background: false,
			},
			AdminCall::Command(doc! {
				"shardCollection": "sales.customers",
				"key": { "customerId": "hashed" },
			}),
		]
	);
	assert_eq!(bootstrap.registry().len(), 4);
}

#[rstest]
#[tokio::test]
async fn test_missing_shard_key_is_reported_once(recording_admin: Arc<RecordingAdmin>) {
	// Arrange
	let (_guard, logs) = capture_logs();
	let executor = ShardingBootstrap::new(sales_settings(), recording_admin.clone()).executor();
	let registry = Arc::new(ShardKeyRegistry::new());
	let context = MappingContext::new(MappingEventBus::new());
	let observer = EntityMetadataObserver::new(context.id(), registry, executor);
	let event = MappingEvent::EntityRegistered {
		emitter: context.id(),
		entity: context.register::<AuditEntry>(),
	};

	// Act
	observer.on_entity_registered(&event).await.unwrap();
	observer.on_entity_registered(&event).await.unwrap();

	// Assert
	assert_eq!(logs.count_at(Level::WARN), 1);
	assert!(logs.contains(Level::WARN, "No shard key defined"));
	assert!(recording_admin.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_unsharded_deployment_keeps_running() {
	// Arrange
	let not_found = AdminError::command(59, "CommandNotFound", "no such command");
	let admin = Arc::new(
		RecordingAdmin::new("sales")
			.fail_command("enableSharding", not_found.clone())
			.fail_command("shardCollection", not_found),
	);
	let (_guard, logs) = capture_logs();
	let bootstrap = ShardingBootstrap::new(sales_settings(), admin.clone());
	let context = MappingContext::new(MappingEventBus::new());
	let observer = bootstrap.start(&context).await.unwrap().unwrap();

	// Act
	context.register::<Order>();
	context.register::<Customer>();
	drop(context);
	let result = observer.await.unwrap();

	// Assert
	assert!(result.is_ok());
	assert_eq!(admin.index_builds().len(), 2);
	assert!(logs.contains(Level::WARN, "mongos"));
}

#[rstest]
#[tokio::test]
async fn test_fatal_failure_stops_the_observer() {
	// Arrange
	let admin = Arc::new(RecordingAdmin::new("sales").fail_command(
		"shardCollection",
		AdminError::command(13, "Unauthorized", "not authorized on admin to execute command"),
	));
	let bootstrap = ShardingBootstrap::new(sales_settings(), admin.clone());
	let context = MappingContext::new(MappingEventBus::new());
	let observer = bootstrap.start(&context).await.unwrap().unwrap();

	// Act
	context.register::<Order>();
	let result = observer.await.unwrap();
	context.register::<Customer>();

	// Assert
	let err = result.unwrap_err();
	assert_eq!(err.code(), Some(13));
	assert!(matches!(err, ShardingError::Command { ref command, .. } if command == "shardCollection"));
	assert_eq!(admin.commands_named("shardCollection").len(), 1);
}
