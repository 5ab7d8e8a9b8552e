//! Test utilities
//!
//! [`RecordingAdmin`] implements [`AdminCommands`] without a server. It keeps
//! every call in order and can be primed to fail specific commands.
//! [`capture_logs`] collects `tracing` events for assertions.

use async_trait::async_trait;
use bson::{Document, doc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

use crate::admin::AdminCommands;
use crate::error::AdminError;

/// A call observed by [`RecordingAdmin`]
#[derive(Debug, Clone, PartialEq)]
pub enum AdminCall {
	CreateIndex {
		collection: String,
		keys: Document,
		background: bool,
	},
	Command(Document),
}

impl AdminCall {
	/// Name of the command (first key of the command document)
	pub fn command_name(&self) -> Option<&str> {
		match self {
			AdminCall::Command(command) => command.keys().next().map(String::as_str),
			AdminCall::CreateIndex { .. } => None,
		}
	}
}

/// In-memory admin backend that records calls
///
/// # Example
///
/// ```rust,ignore
/// let admin = RecordingAdmin::new("sales")
///     .fail_command("enableSharding", AdminError::command(59, "CommandNotFound", "no such command"));
/// ```
#[derive(Debug)]
pub struct RecordingAdmin {
	database_name: String,
	calls: Mutex<Vec<AdminCall>>,
	command_failures: Mutex<HashMap<String, AdminError>>,
	index_failure: Mutex<Option<AdminError>>,
}

impl RecordingAdmin {
	pub fn new(database_name: impl Into<String>) -> Self {
		Self {
			database_name: database_name.into(),
			calls: Mutex::new(Vec::new()),
			command_failures: Mutex::new(HashMap::new()),
			index_failure: Mutex::new(None),
		}
	}

	/// Make every command named `command_name` fail with `error`
	pub fn fail_command(self, command_name: &str, error: AdminError) -> Self {
		self.command_failures
			.lock()
			.insert(command_name.to_string(), error);
		self
	}

	/// Make every index build fail with `error`
	pub fn fail_index(self, error: AdminError) -> Self {
		*self.index_failure.lock() = Some(error);
		self
	}

	/// All calls so far, in order
	pub fn calls(&self) -> Vec<AdminCall> {
		self.calls.lock().clone()
	}

	/// Commands named `command_name`, in order
	pub fn commands_named(&self, command_name: &str) -> Vec<Document> {
		self.calls
			.lock()
			.iter()
			.filter(|call| call.command_name() == Some(command_name))
			.filter_map(|call| match call {
				AdminCall::Command(command) => Some(command.clone()),
				AdminCall::CreateIndex { .. } => None,
			})
			.collect()
	}

	/// Index builds, in order
	pub fn index_builds(&self) -> Vec<AdminCall> {
		self.calls
			.lock()
			.iter()
			.filter(|call| matches!(call, AdminCall::CreateIndex { .. }))
			.cloned()
			.collect()
	}
}

#[async_trait]
impl AdminCommands for RecordingAdmin {
	fn database_name(&self) -> &str {
		&self.database_name
	}

	async fn run_admin_command(&self, command: Document) -> Result<Document, AdminError> {
		let name = command.keys().next().cloned().unwrap_or_default();
		self.calls.lock().push(AdminCall::Command(command));

		match self.command_failures.lock().get(&name) {
			Some(error) => Err(error.clone()),
			None => Ok(doc! { "ok": 1 }),
		}
	}

	async fn create_index(
		&self,
		collection: &str,
		keys: Document,
		background: bool,
	) -> Result<(), AdminError> {
		self.calls.lock().push(AdminCall::CreateIndex {
			collection: collection.to_string(),
			keys,
			background,
		});

		match self.index_failure.lock().as_ref() {
			Some(error) => Err(error.clone()),
			None => Ok(()),
		}
	}
}

/// A captured event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
	pub level: tracing::Level,
	pub message: String,
}

/// Events captured while the guard returned by [`capture_logs`] is alive
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
	events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturedLogs {
	pub fn events(&self) -> Vec<CapturedEvent> {
		self.events.lock().clone()
	}

	/// Whether an event at `level` contains `needle` in its message
	pub fn contains(&self, level: tracing::Level, needle: &str) -> bool {
		self.events
			.lock()
			.iter()
			.any(|event| event.level == level && event.message.contains(needle))
	}

	pub fn count_at(&self, level: tracing::Level) -> usize {
		self.events.lock().iter().filter(|event| event.level == level).count()
	}
}

struct CaptureLayer {
	logs: CapturedLogs,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for CaptureLayer {
	fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
		struct MessageVisitor {
			message: String,
		}

		impl tracing::field::Visit for MessageVisitor {
			fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
				if field.name() == "message" {
					self.message = format!("{:?}", value);
				}
			}
		}

		let mut visitor = MessageVisitor {
			message: String::new(),
		};
		event.record(&mut visitor);

		self.logs.events.lock().push(CapturedEvent {
			level: *event.metadata().level(),
			message: visitor.message,
		});
	}
}

/// Capture events on the current thread until the guard is dropped.
///
/// Use with a current-thread runtime; events emitted on other threads are not
/// seen.
///
/// # Example
///
/// ```rust,ignore
/// let (_guard, logs) = capture_logs();
/// tracing::warn!("No shard key defined for collection");
/// assert!(logs.contains(tracing::Level::WARN, "No shard key"));
/// ```
pub fn capture_logs() -> (DefaultGuard, CapturedLogs) {
	let logs = CapturedLogs::default();
	let guard = tracing_subscriber::registry()
		.with(CaptureLayer { logs: logs.clone() })
		.set_default();
	(guard, logs)
}
