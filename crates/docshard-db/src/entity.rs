//! Entity type descriptors
//!
//! Every Rust type handed to a [`MappingContext`](crate::mapping::MappingContext)
//! is described by an [`EntityType`]. Types that are persisted as MongoDB
//! documents implement [`DocumentEntity`], which carries the collection name
//! and the optional shard key definition.
//!
//! # Example
//!
//! ```rust
//! use docshard_db::entity::DocumentEntity;
//!
//! struct Order;
//!
//! impl DocumentEntity for Order {
//! 	const COLLECTION_NAME: &'static str = "orders";
//! 	const SHARD_KEY: Option<&'static str> = Some(r#"{"region": 1}"#);
//! }
//! ```

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::mapping::MappingContextId;

/// Static declaration attached to a persisted document type
pub trait DocumentEntity: Send + Sync + 'static {
	/// Collection name in MongoDB
	const COLLECTION_NAME: &'static str;

	/// Shard key definition as a JSON object string, e.g. `{"tenantId": 1}`.
	///
	/// `None` leaves the collection unsharded.
	const SHARD_KEY: Option<&'static str> = None;
}

/// Identity of an entity type
///
/// Equality and hashing only consider the [`TypeId`]; the name is kept for logging.
#[derive(Clone, Copy)]
pub struct EntityTypeId {
	type_id: TypeId,
	type_name: &'static str,
}

impl EntityTypeId {
	pub fn of<T: 'static>() -> Self {
		Self {
			type_id: TypeId::of::<T>(),
			type_name: std::any::type_name::<T>(),
		}
	}

	/// Fully-qualified type name
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}
}

impl PartialEq for EntityTypeId {
	fn eq(&self, other: &Self) -> bool {
		self.type_id == other.type_id
	}
}

impl Eq for EntityTypeId {}

impl Hash for EntityTypeId {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.type_id.hash(state);
	}
}

impl fmt::Debug for EntityTypeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.type_name)
	}
}

impl fmt::Display for EntityTypeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.type_name)
	}
}

/// Document mapping of an entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMapping {
	pub collection: String,
	/// Raw shard key definition, parsed when the entity is processed
	pub shard_key: Option<String>,
}

/// Runtime descriptor of a type known to a mapping context
#[derive(Debug, Clone)]
pub struct EntityType {
	id: EntityTypeId,
	context: MappingContextId,
	document: Option<DocumentMapping>,
}

impl EntityType {
	/// Descriptor for a persisted document type
	pub fn document<T: DocumentEntity>(context: MappingContextId) -> Self {
		Self {
			id: EntityTypeId::of::<T>(),
			context,
			document: Some(DocumentMapping {
				collection: T::COLLECTION_NAME.to_string(),
				shard_key: T::SHARD_KEY.map(str::to_string),
			}),
		}
	}

	/// Descriptor for a type without a document mapping (embedded values and the like)
	pub fn plain<T: 'static>(context: MappingContextId) -> Self {
		Self {
			id: EntityTypeId::of::<T>(),
			context,
			document: None,
		}
	}

	pub fn id(&self) -> EntityTypeId {
		self.id
	}

	/// Mapping context that owns this type
	pub fn context(&self) -> MappingContextId {
		self.context
	}

	/// Document mapping, `None` when the type is not a persisted document
	pub fn document_mapping(&self) -> Option<&DocumentMapping> {
		self.document.as_ref()
	}

	pub fn is_document(&self) -> bool {
		self.document.is_some()
	}
}
