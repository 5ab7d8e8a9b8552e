//! Seen-set of processed entity types

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::entity::EntityTypeId;

/// Records which entity types have already been evaluated for a shard key.
///
/// Entries are only ever added. Insertion is atomic per key and only locks the
/// shard holding that key, so concurrent registrations of unrelated types do
/// not wait on each other.
#[derive(Debug, Default)]
pub struct ShardKeyRegistry {
	seen: DashMap<EntityTypeId, bool>,
}

impl ShardKeyRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Mark `id` as seen.
	///
	/// Returns `true` if this call performed the insertion and `false` if the
	/// type was already present.
	pub fn put_if_absent(&self, id: EntityTypeId) -> bool {
		match self.seen.entry(id) {
			Entry::Occupied(_) => false,
			Entry::Vacant(slot) => {
				slot.insert(true);
				true
			}
		}
	}

	pub fn contains(&self, id: &EntityTypeId) -> bool {
		self.seen.contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.seen.len()
	}

	pub fn is_empty(&self) -> bool {
		self.seen.is_empty()
	}
}
