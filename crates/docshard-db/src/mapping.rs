//! Mapping context and registration events
//!
//! A [`MappingContext`] is the place where document types become known. Each
//! registration publishes a [`MappingEvent::EntityRegistered`] on a
//! [`MappingEventBus`]. The bus may be shared by several contexts, so every
//! event names the context that emitted it.
//!
//! Registering the same type again re-emits the event. Listeners are expected
//! to deduplicate.
//!
//! # Example
//!
//! ```rust
//! use docshard_db::entity::DocumentEntity;
//! use docshard_db::mapping::{MappingContext, MappingEvent, MappingEventBus};
//!
//! struct Order;
//!
//! impl DocumentEntity for Order {
//! 	const COLLECTION_NAME: &'static str = "orders";
//! }
//!
//! let bus = MappingEventBus::new();
//! let mut events = bus.subscribe();
//! let context = MappingContext::new(bus.clone());
//!
//! context.register::<Order>();
//!
//! let MappingEvent::EntityRegistered { emitter, entity } = events.try_recv().unwrap();
//! assert_eq!(emitter, context.id());
//! assert_eq!(entity.document_mapping().unwrap().collection, "orders");
//! ```

use dashmap::DashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

use crate::entity::{DocumentEntity, EntityType, EntityTypeId};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a mapping context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MappingContextId(u64);

impl MappingContextId {
	/// Allocate a fresh identity
	pub fn next() -> Self {
		Self(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Display for MappingContextId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "mapping-context-{}", self.0)
	}
}

/// Event published by a mapping context
#[derive(Debug, Clone)]
pub enum MappingEvent {
	EntityRegistered {
		emitter: MappingContextId,
		entity: Arc<EntityType>,
	},
}

impl MappingEvent {
	/// Context that published this event
	pub fn emitter(&self) -> MappingContextId {
		match self {
			MappingEvent::EntityRegistered { emitter, .. } => *emitter,
		}
	}

	pub fn entity(&self) -> &Arc<EntityType> {
		match self {
			MappingEvent::EntityRegistered { entity, .. } => entity,
		}
	}
}

/// Shared notification channel for mapping events
///
/// Every subscriber gets its own unbounded queue. Publishing never blocks;
/// subscribers whose receiver was dropped are pruned on the next publish.
#[derive(Clone, Default)]
pub struct MappingEventBus {
	subscribers: Arc<RwLock<Vec<mpsc::UnboundedSender<MappingEvent>>>>,
}

impl MappingEventBus {
	pub fn new() -> Self {
		Self::default()
	}

	/// Open a new subscription. Only events published afterwards are delivered.
	pub fn subscribe(&self) -> mpsc::UnboundedReceiver<MappingEvent> {
		let (tx, rx) = mpsc::unbounded_channel();
		self.subscribers.write().push(tx);
		rx
	}

	/// Deliver an event to every live subscriber
	pub fn publish(&self, event: MappingEvent) {
		let mut closed = false;
		{
			let subscribers = self.subscribers.read();
			for subscriber in subscribers.iter() {
				if subscriber.send(event.clone()).is_err() {
					closed = true;
				}
			}
		}

		if closed {
			self.subscribers.write().retain(|s| !s.is_closed());
		}
	}

	/// Number of live subscribers
	pub fn subscriber_count(&self) -> usize {
		self.subscribers.read().iter().filter(|s| !s.is_closed()).count()
	}
}

/// Registry of entity types, publishing an event for every registration
pub struct MappingContext {
	id: MappingContextId,
	bus: MappingEventBus,
	entities: DashMap<EntityTypeId, Arc<EntityType>>,
}

impl MappingContext {
	pub fn new(bus: MappingEventBus) -> Self {
		Self {
			id: MappingContextId::next(),
			bus,
			entities: DashMap::new(),
		}
	}

	pub fn id(&self) -> MappingContextId {
		self.id
	}

	/// Bus this context publishes on
	pub fn bus(&self) -> &MappingEventBus {
		&self.bus
	}

	/// Register a persisted document type
	pub fn register<T: DocumentEntity>(&self) -> Arc<EntityType> {
		self.add(EntityType::document::<T>(self.id))
	}

	/// Register a type without a document mapping
	pub fn register_plain<T: Send + Sync + 'static>(&self) -> Arc<EntityType> {
		self.add(EntityType::plain::<T>(self.id))
	}

	fn add(&self, entity: EntityType) -> Arc<EntityType> {
		let entity = self
			.entities
			.entry(entity.id())
			.or_insert_with(|| Arc::new(entity))
			.clone();

		self.bus.publish(MappingEvent::EntityRegistered {
			emitter: self.id,
			entity: Arc::clone(&entity),
		});

		entity
	}

	/// Look up a registered type
	pub fn get(&self, id: &EntityTypeId) -> Option<Arc<EntityType>> {
		self.entities.get(id).map(|e| Arc::clone(e.value()))
	}

	/// All registered types, in no particular order
	pub fn persistent_entities(&self) -> Vec<Arc<EntityType>> {
		self.entities.iter().map(|e| Arc::clone(e.value())).collect()
	}
}

impl fmt::Debug for MappingContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MappingContext")
			.field("id", &self.id)
			.field("entities", &self.entities.len())
			.finish()
	}
}
