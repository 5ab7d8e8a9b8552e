//! Shard enablement
//!
//! The executor issues the two administrative commands that shard a
//! collection:
//!
//! 1. `{ enableSharding: <db> }`, once per executor, at startup or right
//!    before the first shard key is applied.
//! 2. `{ shardCollection: "<db>.<collection>", key: <declaration> }`, after a
//!    foreground index with the same keys has been built.
//!
//! Both commands go through the same error classification. Each command
//! names its own "already done" codes:
//!
//! | Server code | Meaning | Result |
//! |-------------|---------|--------|
//! | `-1` (both), `23` (`enableSharding` only) | effect already holds | [`ShardingOutcome::AlreadyApplied`] |
//! | `59` | command unknown, not talking to `mongos` | [`ShardingOutcome::ClusterUnavailable`] |
//! | anything else | genuine failure | [`ShardingError::Command`] |
//!
//! For `shardCollection`, code `23` means the collection is sharded on some
//! other key, so it is a failure.

use bson::doc;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::admin::AdminCommands;
use crate::error::{AdminError, Result, ShardingError};
use crate::shard_key::ShardKeyDeclaration;

/// Legacy "already done" code reported by older servers
pub const LEGACY_ALREADY_APPLIED: i32 = -1;

/// `AlreadyInitialized`
pub const ALREADY_INITIALIZED: i32 = 23;

/// `CommandNotFound`
pub const COMMAND_NOT_FOUND: i32 = 59;

/// Codes meaning `enableSharding` already took effect
pub const ENABLE_SHARDING_ALREADY_APPLIED: &[i32] = &[LEGACY_ALREADY_APPLIED, ALREADY_INITIALIZED];

/// Codes meaning `shardCollection` already took effect
pub const SHARD_COLLECTION_ALREADY_APPLIED: &[i32] = &[LEGACY_ALREADY_APPLIED];

/// Result of a tolerated sharding operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardingOutcome {
	/// The command succeeded
	Applied,
	/// The server reported the effect already holds
	AlreadyApplied,
	/// Not connected to a sharded cluster router; nothing was sharded
	ClusterUnavailable,
	/// No shard key was declared; the collection stays unsharded
	MissingShardKey,
}

/// Classify the failure of an administrative command.
///
/// `already_applied` lists the codes that mean the command's effect already
/// holds. Tolerated failures come back as `Ok`, everything else as `Err`.
pub fn classify(command: &str, already_applied: &[i32], error: AdminError) -> Result<ShardingOutcome> {
	match error {
		AdminError::Command { code, .. } if already_applied.contains(&code) => {
			Ok(ShardingOutcome::AlreadyApplied)
		}
		AdminError::Command { code, message, .. } if code == COMMAND_NOT_FOUND => {
			tracing::warn!(
				command = command,
				error = %message,
				"Command not found - not connected to a cluster (mongos)? Continuing unsharded"
			);
			Ok(ShardingOutcome::ClusterUnavailable)
		}
		AdminError::Command {
			code,
			code_name,
			message,
		} => Err(ShardingError::Command {
			command: command.to_string(),
			code,
			code_name,
			message,
		}),
		AdminError::Driver(message) => Err(ShardingError::Driver(message)),
	}
}

/// Issues sharding commands against the admin database
pub struct ShardEnablementExecutor {
	admin: Arc<dyn AdminCommands>,
	database_sharding: OnceCell<ShardingOutcome>,
}

impl ShardEnablementExecutor {
	pub fn new(admin: Arc<dyn AdminCommands>) -> Self {
		Self {
			admin,
			database_sharding: OnceCell::new(),
		}
	}

	/// Name of the database whose collections get sharded
	pub fn database_name(&self) -> &str {
		self.admin.database_name()
	}

	/// Namespace passed to `shardCollection`
	pub fn shard_target(&self, collection: &str) -> String {
		format!("{}.{}", self.database_name(), collection)
	}

	/// Issue `enableSharding` for the configured database.
	///
	/// Every call reaches the server. Use [`ensure_database_sharding`](Self::ensure_database_sharding)
	/// to run it at most once.
	pub async fn enable_database_sharding(&self) -> Result<ShardingOutcome> {
		let database = self.database_name().to_string();

		match self
			.admin
			.run_admin_command(doc! { "enableSharding": database.as_str() })
			.await
		{
			Ok(_) => {
				tracing::info!(database = %database, "Enabled sharding for database");
				Ok(ShardingOutcome::Applied)
			}
			Err(error) => {
				let outcome = classify("enableSharding", ENABLE_SHARDING_ALREADY_APPLIED, error)?;
				if outcome == ShardingOutcome::AlreadyApplied {
					tracing::info!(database = %database, "Sharding already enabled for database");
				}
				Ok(outcome)
			}
		}
	}

	/// Enable database sharding once.
	///
	/// The first successful outcome is remembered and returned by later calls.
	/// A fatal error is not remembered, so the next call tries again.
	pub async fn ensure_database_sharding(&self) -> Result<ShardingOutcome> {
		self.database_sharding
			.get_or_try_init(|| self.enable_database_sharding())
			.await
			.copied()
	}

	/// Outcome of database enablement, if it already ran
	pub fn database_sharding_outcome(&self) -> Option<ShardingOutcome> {
		self.database_sharding.get().copied()
	}

	/// Build the supporting index and shard `collection` on `shard_key`.
	///
	/// Without a declaration nothing is sent to the server.
	pub async fn create_shard_key(
		&self,
		collection: &str,
		shard_key: Option<&ShardKeyDeclaration>,
	) -> Result<ShardingOutcome> {
		let Some(shard_key) = shard_key else {
			tracing::warn!(collection = collection, "No shard key defined for collection");
			return Ok(ShardingOutcome::MissingShardKey);
		};

		if self.ensure_database_sharding().await? == ShardingOutcome::ClusterUnavailable {
			tracing::debug!(
				collection = collection,
				"Database sharding unavailable, still attempting collection sharding"
			);
		}

		let keys = shard_key.to_document();

		// Foreground build: the index must exist before the collection is sharded
		self.admin
			.create_index(collection, keys.clone(), false)
			.await
			.map_err(|error| match error {
				AdminError::Command {
					code,
					code_name,
					message,
				} => ShardingError::Command {
					command: "createIndexes".to_string(),
					code,
					code_name,
					message,
				},
				AdminError::Driver(message) => ShardingError::Driver(message),
			})?;

		let target = self.shard_target(collection);
		let command = doc! {
			"shardCollection": target.as_str(),
			"key": keys,
		};

		match self.admin.run_admin_command(command).await {
			Ok(_) => {
				tracing::info!(namespace = %target, key = %shard_key, "Applied shard key");
				Ok(ShardingOutcome::Applied)
			}
			Err(error) => {
				let outcome = classify("shardCollection", SHARD_COLLECTION_ALREADY_APPLIED, error)?;
				if outcome == ShardingOutcome::AlreadyApplied {
					tracing::debug!(collection = collection, "Shard key already applied for collection");
				}
				Ok(outcome)
			}
		}
	}
}

impl std::fmt::Debug for ShardEnablementExecutor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ShardEnablementExecutor")
			.field("database", &self.database_name())
			.field("database_sharding", &self.database_sharding.get())
			.finish()
	}
}
