//! Entity metadata observer
//!
//! Listens to registration events of one mapping context and applies declared
//! shard keys. Each entity type is evaluated at most once per registry, no
//! matter how many times the mapping layer re-emits it or from how many tasks
//! the events arrive.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Result, ShardingError};
use crate::executor::{ShardEnablementExecutor, ShardingOutcome};
use crate::mapping::{MappingContextId, MappingEvent};
use crate::registry::ShardKeyRegistry;
use crate::shard_key::ShardKeyDeclaration;

/// What the observer did with a registration event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityDisposition {
	/// Emitted by another mapping context
	Foreign,
	/// The type was already evaluated
	AlreadySeen,
	/// The type has no document mapping
	NotADocument,
	/// The type was handed to the executor
	Processed(ShardingOutcome),
}

/// Applies shard keys for entity types registered in one mapping context
pub struct EntityMetadataObserver {
	context: MappingContextId,
	registry: Arc<ShardKeyRegistry>,
	executor: Arc<ShardEnablementExecutor>,
}

impl EntityMetadataObserver {
	pub fn new(
		context: MappingContextId,
		registry: Arc<ShardKeyRegistry>,
		executor: Arc<ShardEnablementExecutor>,
	) -> Self {
		Self {
			context,
			registry,
			executor,
		}
	}

	/// Mapping context whose events this observer handles
	pub fn context(&self) -> MappingContextId {
		self.context
	}

	/// Handle one registration event.
	///
	/// Only fatal administrative failures and unparseable declarations are
	/// returned as errors.
	pub async fn on_entity_registered(&self, event: &MappingEvent) -> Result<EntityDisposition> {
		if event.emitter() != self.context {
			return Ok(EntityDisposition::Foreign);
		}

		let entity = event.entity();
		if !self.registry.put_if_absent(entity.id()) {
			return Ok(EntityDisposition::AlreadySeen);
		}

		tracing::debug!(
			entity = %entity.id(),
			"Analyzing entity type for shard key information"
		);

		let Some(mapping) = entity.document_mapping() else {
			return Ok(EntityDisposition::NotADocument);
		};

		let shard_key = mapping
			.shard_key
			.as_deref()
			.map(|definition| {
				ShardKeyDeclaration::parse(definition).map_err(|e| ShardingError::InvalidShardKey {
					collection: mapping.collection.clone(),
					definition: definition.to_string(),
					reason: e.reason,
				})
			})
			.transpose()?;

		let outcome = self
			.executor
			.create_shard_key(&mapping.collection, shard_key.as_ref())
			.await?;

		Ok(EntityDisposition::Processed(outcome))
	}

	/// Drain `events` until the channel closes.
	///
	/// A fatal error stops the drain and is returned to the caller.
	pub async fn run(&self, mut events: mpsc::UnboundedReceiver<MappingEvent>) -> Result<()> {
		while let Some(event) = events.recv().await {
			if let Err(e) = self.on_entity_registered(&event).await {
				tracing::error!(
					entity = %event.entity().id(),
					error = %e,
					"Failed to apply shard key"
				);
				return Err(e);
			}
		}

		tracing::debug!(context = %self.context, "Mapping event channel closed");
		Ok(())
	}

	/// Run [`run`](Self::run) on a background task
	pub fn spawn(self: Arc<Self>, events: mpsc::UnboundedReceiver<MappingEvent>) -> JoinHandle<Result<()>> {
		tokio::spawn(async move { self.run(events).await })
	}
}

impl std::fmt::Debug for EntityMetadataObserver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EntityMetadataObserver")
			.field("context", &self.context)
			.field("seen", &self.registry.len())
			.finish()
	}
}
