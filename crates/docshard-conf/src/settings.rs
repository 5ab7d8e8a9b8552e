//! MongoDB settings
//!
//! A settings file looks like this (every key is optional):
//!
//! ```toml
//! url = "mongodb://mongos-0.internal:27017,mongos-1.internal:27017"
//! database = "sales"
//! admin_database = "admin"
//! app_name = "order-service"
//! max_pool_size = 50
//! min_pool_size = 5
//! max_idle_time_secs = 300
//!
//! [sharding]
//! enabled = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::env::Env;

/// Settings errors
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Invalid TOML: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("Missing environment variable: {0}")]
	MissingVariable(String),

	#[error("Failed to parse environment variable '{key}': {error}")]
	ParseError { key: String, error: String },

	#[error("Invalid value for '{key}': {message}")]
	Invalid { key: String, message: String },
}

impl SettingsError {
	fn invalid(key: &str, message: impl Into<String>) -> Self {
		SettingsError::Invalid {
			key: key.to_string(),
			message: message.into(),
		}
	}
}

/// Sharding switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShardingSettings {
	/// Whether declared shard keys are applied at all
	pub enabled: bool,
}

impl Default for ShardingSettings {
	fn default() -> Self {
		Self { enabled: true }
	}
}

/// Connection and sharding settings for a MongoDB deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoSettings {
	/// Connection string, usually pointing at the `mongos` routers
	pub url: String,
	/// Database whose collections get sharded
	pub database: String,
	/// Database administrative commands run against
	pub admin_database: String,
	pub app_name: Option<String>,
	pub max_pool_size: Option<u32>,
	pub min_pool_size: Option<u32>,
	pub max_idle_time_secs: Option<u64>,
	pub sharding: ShardingSettings,
}

impl Default for MongoSettings {
	fn default() -> Self {
		Self {
			url: "mongodb://localhost:27017".to_string(),
			database: "test".to_string(),
			admin_database: "admin".to_string(),
			app_name: None,
			max_pool_size: None,
			min_pool_size: None,
			max_idle_time_secs: None,
			sharding: ShardingSettings::default(),
		}
	}
}

impl MongoSettings {
	/// Parse settings from TOML. Missing keys keep their defaults.
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(source)?)
	}

	/// Read settings from a TOML file
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let source = std::fs::read_to_string(path)?;
		Self::from_toml_str(&source)
	}

	/// Override values from environment variables.
	///
	/// Unset variables leave the current value untouched.
	pub fn apply_env(&mut self, env: &Env) -> Result<(), SettingsError> {
		if let Some(url) = env.optional_str("MONGODB_URL")? {
			self.url = url;
		}
		if let Some(database) = env.optional_str("MONGODB_DATABASE")? {
			self.database = database;
		}
		if let Some(admin_database) = env.optional_str("MONGODB_ADMIN_DATABASE")? {
			self.admin_database = admin_database;
		}
		if let Some(app_name) = env.optional_str("MONGODB_APP_NAME")? {
			self.app_name = Some(app_name);
		}
		if let Some(size) = env.optional_parse("MONGODB_MAX_POOL_SIZE")? {
			self.max_pool_size = Some(size);
		}
		if let Some(size) = env.optional_parse("MONGODB_MIN_POOL_SIZE")? {
			self.min_pool_size = Some(size);
		}
		if let Some(secs) = env.optional_parse("MONGODB_MAX_IDLE_TIME_SECS")? {
			self.max_idle_time_secs = Some(secs);
		}
		if let Some(enabled) = env.optional_bool("MONGODB_SHARDING_ENABLED")? {
			self.sharding.enabled = enabled;
		}
		Ok(())
	}

	/// Check the settings for values the driver or the server would reject
	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.url.trim().is_empty() {
			return Err(SettingsError::invalid("url", "must not be empty"));
		}

		validate_database_name("database", &self.database)?;
		validate_database_name("admin_database", &self.admin_database)?;

		if let (Some(min), Some(max)) = (self.min_pool_size, self.max_pool_size) {
			if min > max {
				return Err(SettingsError::invalid(
					"min_pool_size",
					format!("{} exceeds max_pool_size {}", min, max),
				));
			}
		}

		Ok(())
	}
}

fn validate_database_name(key: &str, name: &str) -> Result<(), SettingsError> {
	if name.is_empty() {
		return Err(SettingsError::invalid(key, "must not be empty"));
	}
	if let Some(c) = name.chars().find(|c| matches!(c, '.' | '$' | ' ' | '/' | '\\' | '"' | '\0')) {
		return Err(SettingsError::invalid(
			key,
			format!("database name '{}' contains forbidden character {:?}", name, c),
		));
	}
	Ok(())
}
