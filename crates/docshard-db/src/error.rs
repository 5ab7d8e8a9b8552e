//! Sharding error types
//!
//! Two layers of errors live here:
//! - [`AdminError`]: what an admin backend reports when a command or an index
//!   build fails. Structured server errors keep their numeric code so the
//!   executor can classify them.
//! - [`ShardingError`]: what escapes the sharding subsystem. Only failures that
//!   must abort the current unit of work end up here.

/// Result type for sharding operations
pub type Result<T> = std::result::Result<T, ShardingError>;

/// Error reported by an admin backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminError {
	/// Structured error returned by the server for a command
	#[error("Command failed with code {code} ({code_name}): {message}")]
	Command {
		code: i32,
		code_name: String,
		message: String,
	},

	/// Any other driver failure (I/O, authentication, server selection)
	#[error("Driver error: {0}")]
	Driver(String),
}

impl AdminError {
	/// Create a structured command error
	pub fn command(code: i32, code_name: impl Into<String>, message: impl Into<String>) -> Self {
		AdminError::Command {
			code,
			code_name: code_name.into(),
			message: message.into(),
		}
	}

	/// Server error code, if the server produced one
	pub fn code(&self) -> Option<i32> {
		match self {
			AdminError::Command { code, .. } => Some(*code),
			AdminError::Driver(_) => None,
		}
	}
}

impl From<mongodb::error::Error> for AdminError {
	fn from(err: mongodb::error::Error) -> Self {
		use mongodb::error::ErrorKind;

		match err.kind.as_ref() {
			ErrorKind::Command(command) => AdminError::Command {
				code: command.code,
				code_name: command.code_name.clone(),
				message: command.message.clone(),
			},
			_ => AdminError::Driver(err.to_string()),
		}
	}
}

/// Unified error type for the sharding subsystem
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ShardingError {
	/// An administrative command failed in a way that cannot be tolerated
	#[error("Administrative command '{command}' failed with code {code} ({code_name}): {message}")]
	Command {
		command: String,
		code: i32,
		code_name: String,
		message: String,
	},

	/// Driver failure outside of a structured command error
	#[error("Driver error: {0}")]
	Driver(String),

	/// Shard key declaration could not be parsed
	#[error("Invalid shard key for collection '{collection}' ({definition:?}): {reason}")]
	InvalidShardKey {
		collection: String,
		definition: String,
		reason: String,
	},

	/// Could not connect to the cluster
	#[error("Connection error: {0}")]
	Connection(String),
}

impl ShardingError {
	/// Server error code carried by this error, if any
	pub fn code(&self) -> Option<i32> {
		match self {
			ShardingError::Command { code, .. } => Some(*code),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_admin_error_code() {
		// Arrange
		let command = AdminError::command(59, "CommandNotFound", "no such command: 'enableSharding'");
		let driver = AdminError::Driver("connection refused".to_string());

		// Act & Assert
		assert_eq!(command.code(), Some(59));
		assert_eq!(driver.code(), None);
	}

	#[rstest]
	fn test_sharding_error_display_names_the_command() {
		// Arrange
		let err = ShardingError::Command {
			command: "shardCollection".to_string(),
			code: 13,
			code_name: "Unauthorized".to_string(),
			message: "not authorized on admin".to_string(),
		};

		// Act
		let rendered = err.to_string();

		// Assert
		assert!(rendered.contains("shardCollection"));
		assert!(rendered.contains("13"));
		assert_eq!(err.code(), Some(13));
	}
}
