//! Environment variable access with prefix support

use std::env;
use std::str::FromStr;

use crate::settings::SettingsError;

/// Environment variable reader
///
/// # Example
///
/// ```rust
/// use docshard_conf::Env;
///
/// let env = Env::new().with_prefix("APP_");
/// assert_eq!(env.key_name("MONGODB_URL"), "APP_MONGODB_URL");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Env {
	/// Optional prefix for every lookup (e.g. "APP_")
	pub prefix: Option<String>,
}

impl Env {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set a prefix for all environment variable lookups
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}

	/// Full variable name including the prefix
	pub fn key_name(&self, key: &str) -> String {
		match &self.prefix {
			Some(prefix) => format!("{}{}", prefix, key),
			None => key.to_string(),
		}
	}

	/// Read a required string value
	pub fn str(&self, key: &str) -> Result<String, SettingsError> {
		let full_key = self.key_name(key);
		self.optional_str(key)?
			.ok_or(SettingsError::MissingVariable(full_key))
	}

	/// Read a string value, `None` when unset
	pub fn optional_str(&self, key: &str) -> Result<Option<String>, SettingsError> {
		let full_key = self.key_name(key);
		match env::var(&full_key) {
			Ok(value) => Ok(Some(value)),
			Err(env::VarError::NotPresent) => Ok(None),
			Err(env::VarError::NotUnicode(_)) => Err(SettingsError::ParseError {
				key: full_key,
				error: "value is not valid unicode".to_string(),
			}),
		}
	}

	/// Read a boolean value, `None` when unset
	pub fn optional_bool(&self, key: &str) -> Result<Option<bool>, SettingsError> {
		let full_key = self.key_name(key);
		self.optional_str(key)?
			.map(|value| {
				parse_bool(&value).map_err(|error| SettingsError::ParseError {
					key: full_key.clone(),
					error,
				})
			})
			.transpose()
	}

	/// Read and parse a value, `None` when unset
	pub fn optional_parse<T>(&self, key: &str) -> Result<Option<T>, SettingsError>
	where
		T: FromStr,
		T::Err: std::fmt::Display,
	{
		let full_key = self.key_name(key);
		self.optional_str(key)?
			.map(|value| {
				value
					.trim()
					.parse::<T>()
					.map_err(|e| SettingsError::ParseError {
						key: full_key.clone(),
						error: e.to_string(),
					})
			})
			.transpose()
	}
}

/// Parse a boolean the way environment variables usually spell it
///
/// Accepts `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off`, ignoring case
/// and surrounding whitespace.
pub fn parse_bool(value: &str) -> Result<bool, String> {
	match value.trim().to_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Ok(true),
		"false" | "0" | "no" | "off" => Ok(false),
		other => Err(format!("invalid boolean value: '{}'", other)),
	}
}
