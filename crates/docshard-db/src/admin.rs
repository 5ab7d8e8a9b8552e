//! Administrative command seam
//!
//! The shard enablement executor only needs three things from a database:
//! the name of the data database, a way to run commands against the admin
//! database, and a way to build an index. [`AdminCommands`] captures exactly
//! that so the executor can run against the MongoDB driver or a recording
//! backend in tests.

use async_trait::async_trait;
use bson::Document;

use crate::error::AdminError;

/// Administrative access to a MongoDB deployment
#[async_trait]
pub trait AdminCommands: Send + Sync {
	/// Name of the database whose collections get sharded
	fn database_name(&self) -> &str;

	/// Run a command against the admin database
	///
	/// # Example
	///
	/// ```rust,ignore
	/// admin.run_admin_command(doc! { "enableSharding": "sales" }).await?;
	/// ```
	async fn run_admin_command(&self, command: Document) -> Result<Document, AdminError>;

	/// Build an index on a collection of the data database.
	///
	/// Returns once the server reports the build finished.
	async fn create_index(
		&self,
		collection: &str,
		keys: Document,
		background: bool,
	) -> Result<(), AdminError>;
}
