//! MongoDB admin backend
//!
//! [`MongoDBBackend`] is the production implementation of
//! [`AdminCommands`](crate::admin::AdminCommands). Commands go to the admin
//! database, index builds to the data database.
//!
//! # Example
//!
//! ```rust,no_run
//! use docshard_db::backend::MongoDBBackend;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = MongoDBBackend::builder()
//!     .url("mongodb://mongos.internal:27017")
//!     .database("sales")
//!     .app_name("order-service")
//!     .max_pool_size(50)
//!     .build()
//!     .await?;
//!
//! backend.health_check().await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use bson::{Document, doc};
use docshard_conf::MongoSettings;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Database, IndexModel};
use std::sync::Arc;
use std::time::Duration;

use crate::admin::AdminCommands;
use crate::error::{AdminError, Result, ShardingError};

/// MongoDB backend for administrative commands
///
/// Cloning is cheap: clones share the driver's connection pool.
#[derive(Clone)]
pub struct MongoDBBackend {
	client: Arc<Client>,
	database_name: String,
	admin_database_name: String,
}

/// Builder for configuring MongoDB connections
///
/// # Example
///
/// ```rust,no_run
/// use docshard_db::backend::MongoDBBackendBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MongoDBBackendBuilder::new()
///     .url("mongodb://localhost:27017")
///     .database("sales")
///     .admin_database("admin")
///     .min_pool_size(5)
///     .max_idle_time_secs(300)
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct MongoDBBackendBuilder {
	url: String,
	database: String,
	admin_database: String,
	app_name: Option<String>,
	max_pool_size: Option<u32>,
	min_pool_size: Option<u32>,
	max_idle_time_secs: Option<u64>,
}

impl Default for MongoDBBackendBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl MongoDBBackendBuilder {
	/// Create a new builder with default settings
	///
	/// # Example
	///
	/// ```rust
	/// # use docshard_db::backend::MongoDBBackendBuilder;
	/// let builder = MongoDBBackendBuilder::new();
	/// ```
	pub fn new() -> Self {
		Self {
			url: "mongodb://localhost:27017".to_string(),
			database: "test".to_string(),
			admin_database: "admin".to_string(),
			app_name: None,
			max_pool_size: None,
			min_pool_size: None,
			max_idle_time_secs: None,
		}
	}

	/// Builder pre-populated from settings
	pub fn from_settings(settings: &MongoSettings) -> Self {
		Self {
			url: settings.url.clone(),
			database: settings.database.clone(),
			admin_database: settings.admin_database.clone(),
			app_name: settings.app_name.clone(),
			max_pool_size: settings.max_pool_size,
			min_pool_size: settings.min_pool_size,
			max_idle_time_secs: settings.max_idle_time_secs,
		}
	}

	/// Set the MongoDB connection URL
	pub fn url(mut self, url: impl Into<String>) -> Self {
		self.url = url.into();
		self
	}

	/// Set the database whose collections get sharded
	pub fn database(mut self, database: impl Into<String>) -> Self {
		self.database = database.into();
		self
	}

	/// Set the database administrative commands run against
	pub fn admin_database(mut self, database: impl Into<String>) -> Self {
		self.admin_database = database.into();
		self
	}

	/// Set the application name reported to the server
	pub fn app_name(mut self, name: impl Into<String>) -> Self {
		self.app_name = Some(name.into());
		self
	}

	pub fn max_pool_size(mut self, size: u32) -> Self {
		self.max_pool_size = Some(size);
		self
	}

	pub fn min_pool_size(mut self, size: u32) -> Self {
		self.min_pool_size = Some(size);
		self
	}

	/// Set the maximum idle time for connections in seconds
	pub fn max_idle_time_secs(mut self, secs: u64) -> Self {
		self.max_idle_time_secs = Some(secs);
		self
	}

	/// Build the MongoDB backend.
	///
	/// The driver connects lazily; an unreachable server only shows up on the
	/// first command. Use [`MongoDBBackend::health_check`] to fail fast.
	pub async fn build(self) -> Result<MongoDBBackend> {
		let mut options = ClientOptions::parse(&self.url)
			.await
			.map_err(|e| ShardingError::Connection(e.to_string()))?;

		if let Some(app_name) = self.app_name {
			options.app_name = Some(app_name);
		}

		// Configure connection pool
		if let Some(max_size) = self.max_pool_size {
			options.max_pool_size = Some(max_size);
		}

		if let Some(min_size) = self.min_pool_size {
			options.min_pool_size = Some(min_size);
		}

		if let Some(idle_time) = self.max_idle_time_secs {
			options.max_idle_time = Some(Duration::from_secs(idle_time));
		}

		let client = Client::with_options(options).map_err(|e| ShardingError::Connection(e.to_string()))?;

		tracing::debug!(
			database = %self.database,
			admin_database = %self.admin_database,
			"Created MongoDB client"
		);

		Ok(MongoDBBackend {
			client: Arc::new(client),
			database_name: self.database,
			admin_database_name: self.admin_database,
		})
	}
}

impl MongoDBBackend {
	/// Create a builder for configuring the MongoDB connection
	pub fn builder() -> MongoDBBackendBuilder {
		MongoDBBackendBuilder::new()
	}

	/// Connect using settings
	///
	/// # Example
	///
	/// ```rust,no_run
	/// use docshard_conf::MongoSettings;
	/// use docshard_db::backend::MongoDBBackend;
	///
	/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
	/// let settings = MongoSettings::from_file("docshard.toml")?;
	/// let backend = MongoDBBackend::from_settings(&settings).await?;
	/// # Ok(())
	/// # }
	/// ```
	pub async fn from_settings(settings: &MongoSettings) -> Result<Self> {
		MongoDBBackendBuilder::from_settings(settings).build().await
	}

	/// Data database
	pub fn database(&self) -> Database {
		self.client.database(&self.database_name)
	}

	/// Database administrative commands run against
	pub fn admin_database(&self) -> Database {
		self.client.database(&self.admin_database_name)
	}

	pub fn admin_database_name(&self) -> &str {
		&self.admin_database_name
	}

	/// Ping the server
	pub async fn health_check(&self) -> Result<()> {
		self.admin_database()
			.run_command(doc! { "ping": 1 })
			.await
			.map_err(|e| ShardingError::Connection(format!("Health check failed: {}", e)))?;
		Ok(())
	}
}

impl std::fmt::Debug for MongoDBBackend {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MongoDBBackend")
			.field("database", &self.database_name)
			.field("admin_database", &self.admin_database_name)
			.finish_non_exhaustive()
	}
}

#[async_trait]
impl AdminCommands for MongoDBBackend {
	fn database_name(&self) -> &str {
		&self.database_name
	}

	async fn run_admin_command(&self, command: Document) -> std::result::Result<Document, AdminError> {
		Ok(self.admin_database().run_command(command).await?)
	}

	async fn create_index(
		&self,
		collection: &str,
		keys: Document,
		background: bool,
	) -> std::result::Result<(), AdminError> {
		let mut options = IndexOptions::default();
		// Ignored by 4.2+ servers; the build is foreground because the call is awaited
		#[allow(deprecated)]
		{
			options.background = Some(background);
		}

		let index = IndexModel::builder().keys(keys).options(options).build();

		self.database()
			.collection::<Document>(collection)
			.create_index(index)
			.await?;
		Ok(())
	}
}
