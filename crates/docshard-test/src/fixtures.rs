//! rstest fixtures

use docshard_db::testing::RecordingAdmin;
use rstest::*;
use std::sync::Arc;

#[cfg(feature = "testcontainers")]
pub use self::mongo::{MongoContainer, mongodb_container};

/// Recording admin backend bound to the `sales` database
#[fixture]
pub fn recording_admin() -> Arc<RecordingAdmin> {
	Arc::new(RecordingAdmin::new("sales"))
}

#[cfg(feature = "testcontainers")]
mod mongo {
	use docshard_conf::MongoSettings;
	use rstest::*;
	use testcontainers::core::{IntoContainerPort, WaitFor};
	use testcontainers::runners::AsyncRunner;
	use testcontainers::{ContainerAsync, GenericImage, ImageExt};

	/// A running `mongo:7.0` container (standalone `mongod`, no `mongos`)
	pub struct MongoContainer {
		// Held so the container lives as long as the fixture
		_container: ContainerAsync<GenericImage>,
		url: String,
		port: u16,
	}

	impl MongoContainer {
		pub fn url(&self) -> &str {
			&self.url
		}

		pub fn port(&self) -> u16 {
			self.port
		}

		/// Settings pointing at this container
		pub fn settings(&self, database: &str) -> MongoSettings {
			MongoSettings {
				url: self.url.clone(),
				database: database.to_string(),
				app_name: Some("docshard-tests".to_string()),
				..Default::default()
			}
		}
	}

	async fn try_start_mongodb_container()
	-> Result<MongoContainer, Box<dyn std::error::Error>> {
		let mongo = GenericImage::new("mongo", "7.0")
			.with_exposed_port(27017.tcp())
			.with_wait_for(WaitFor::message_on_stdout("Waiting for connections"))
			.with_startup_timeout(std::time::Duration::from_secs(60))
			.start()
			.await?;

		let port = mongo.get_host_port_ipv4(27017).await?;
		let url = format!("mongodb://127.0.0.1:{}", port);

		Ok(MongoContainer {
			_container: mongo,
			url,
			port,
		})
	}

	/// Fixture providing a MongoDB container
	///
	/// Start-up is retried a few times because Docker occasionally fails to
	/// bind the port on busy CI hosts.
	#[fixture]
	pub async fn mongodb_container() -> MongoContainer {
		const MAX_RETRIES: u32 = 3;
		const RETRY_DELAY_MS: u64 = 2000;

		let mut last_error = None;

		for attempt in 0..MAX_RETRIES {
			match try_start_mongodb_container().await {
				Ok(container) => return container,
				Err(e) => {
					tracing::warn!(
						attempt = attempt + 1,
						max_retries = MAX_RETRIES,
						error = %e,
						"MongoDB container start failed"
					);
					last_error = Some(e.to_string());

					if attempt < MAX_RETRIES - 1 {
						tokio::time::sleep(std::time::Duration::from_millis(RETRY_DELAY_MS)).await;
					}
				}
			}
		}

		panic!(
			"Failed to start MongoDB container after {} attempts: {:?}",
			MAX_RETRIES, last_error
		);
	}
}
