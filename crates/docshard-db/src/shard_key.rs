//! Shard key declarations
//!
//! A shard key declaration is an ordered list of `(field, direction)` pairs.
//! Declarations are usually written next to a document type as an object
//! string, for example `{"tenantId": 1, "createdAt": -1}`, and parsed once
//! when the entity type is first processed. The relaxed shell syntax is
//! accepted too: `{tenantId: 1, 'createdAt': -1}`.
//!
//! # Example
//!
//! ```rust
//! use docshard_db::shard_key::{ShardKeyDeclaration, ShardKeyDirection};
//!
//! let key = ShardKeyDeclaration::parse(r#"{"tenantId": 1, "createdAt": -1}"#).unwrap();
//! assert_eq!(key.fields()[0], ("tenantId".to_string(), ShardKeyDirection::Ascending));
//! assert_eq!(key.fields()[1], ("createdAt".to_string(), ShardKeyDirection::Descending));
//! ```

use bson::{Bson, Document};
use serde_json::Value;
use std::fmt;

/// Direction of a single shard key field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShardKeyDirection {
	/// `1`
	#[default]
	Ascending,
	/// `-1`
	Descending,
	/// `"hashed"`
	Hashed,
}

impl ShardKeyDirection {
	/// BSON value used in index keys and in the `shardCollection` key document
	pub fn to_bson(self) -> Bson {
		match self {
			ShardKeyDirection::Ascending => Bson::Int32(1),
			ShardKeyDirection::Descending => Bson::Int32(-1),
			ShardKeyDirection::Hashed => Bson::String("hashed".to_string()),
		}
	}

	fn from_json(value: &Value) -> Result<Self, String> {
		match value {
			Value::Null => Ok(ShardKeyDirection::Ascending),
			// Relaxed syntax may hand back integers as floats
			Value::Number(n) => match n.as_f64() {
				Some(d) if d == 1.0 => Ok(ShardKeyDirection::Ascending),
				Some(d) if d == -1.0 => Ok(ShardKeyDirection::Descending),
				_ => Err(format!("direction must be 1 or -1, got {}", n)),
			},
			Value::String(s) if s == "hashed" => Ok(ShardKeyDirection::Hashed),
			other => Err(format!("unsupported direction {}", other)),
		}
	}
}

/// Error produced while parsing a shard key definition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct ShardKeyParseError {
	pub reason: String,
}

impl ShardKeyParseError {
	fn new(reason: impl Into<String>) -> Self {
		Self {
			reason: reason.into(),
		}
	}
}

/// Ordered shard key specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardKeyDeclaration {
	fields: Vec<(String, ShardKeyDirection)>,
}

impl ShardKeyDeclaration {
	/// Parse an object definition.
	///
	/// Both strict JSON and the relaxed form with unquoted or single-quoted
	/// keys are accepted. Field order is kept as written. `null` stands for an
	/// unspecified direction and defaults to ascending.
	pub fn parse(definition: &str) -> Result<Self, ShardKeyParseError> {
		if definition.trim().is_empty() {
			return Err(ShardKeyParseError::new("definition is empty"));
		}

		let value: Value = json5::from_str(definition)
			.map_err(|e| ShardKeyParseError::new(format!("malformed definition: {}", e)))?;

		let Value::Object(map) = value else {
			return Err(ShardKeyParseError::new("definition must be an object"));
		};

		if map.is_empty() {
			return Err(ShardKeyParseError::new("definition has no fields"));
		}

		let mut fields = Vec::with_capacity(map.len());
		for (field, direction) in &map {
			if field.is_empty() {
				return Err(ShardKeyParseError::new("field names must not be empty"));
			}
			let direction = ShardKeyDirection::from_json(direction)
				.map_err(|reason| ShardKeyParseError::new(format!("field '{}': {}", field, reason)))?;
			fields.push((field.clone(), direction));
		}

		Ok(Self { fields })
	}

	/// Start building a declaration field by field
	pub fn builder() -> ShardKeyDeclarationBuilder {
		ShardKeyDeclarationBuilder::default()
	}

	/// Fields in declaration order
	pub fn fields(&self) -> &[(String, ShardKeyDirection)] {
		&self.fields
	}

	/// Key document shared by the supporting index and the `shardCollection` command
	pub fn to_document(&self) -> Document {
		let mut keys = Document::new();
		for (field, direction) in &self.fields {
			keys.insert(field.clone(), direction.to_bson());
		}
		keys
	}
}

impl fmt::Display for ShardKeyDeclaration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_document())
	}
}

/// Builder for [`ShardKeyDeclaration`]
#[derive(Debug, Default)]
pub struct ShardKeyDeclarationBuilder {
	fields: Vec<(String, ShardKeyDirection)>,
}

impl ShardKeyDeclarationBuilder {
	/// Append a field with an explicit direction
	pub fn field(mut self, name: impl Into<String>, direction: ShardKeyDirection) -> Self {
		self.fields.push((name.into(), direction));
		self
	}

	pub fn ascending(self, name: impl Into<String>) -> Self {
		self.field(name, ShardKeyDirection::Ascending)
	}

	pub fn descending(self, name: impl Into<String>) -> Self {
		self.field(name, ShardKeyDirection::Descending)
	}

	pub fn hashed(self, name: impl Into<String>) -> Self {
		self.field(name, ShardKeyDirection::Hashed)
	}

	pub fn build(self) -> ShardKeyDeclaration {
		ShardKeyDeclaration {
			fields: self.fields,
		}
	}
}
