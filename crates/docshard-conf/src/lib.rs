//! # docshard-conf
//!
//! Connection and sharding settings for the docshard MongoDB integration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables.
//!
//! ## Quick Start
//!
//! ```rust
//! use docshard_conf::{Env, MongoSettings};
//!
//! let mut settings = MongoSettings::from_toml_str(
//!     r#"
//!     url = "mongodb://mongos.internal:27017"
//!     database = "sales"
//!
//!     [sharding]
//!     enabled = true
//!     "#,
//! )?;
//! settings.apply_env(&Env::new().with_prefix("APP_"))?;
//! settings.validate()?;
//!
//! assert_eq!(settings.admin_database, "admin");
//! # Ok::<(), docshard_conf::SettingsError>(())
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `MONGODB_URL` | `url` |
//! | `MONGODB_DATABASE` | `database` |
//! | `MONGODB_ADMIN_DATABASE` | `admin_database` |
//! | `MONGODB_APP_NAME` | `app_name` |
//! | `MONGODB_MAX_POOL_SIZE` | `max_pool_size` |
//! | `MONGODB_MIN_POOL_SIZE` | `min_pool_size` |
//! | `MONGODB_MAX_IDLE_TIME_SECS` | `max_idle_time_secs` |
//! | `MONGODB_SHARDING_ENABLED` | `sharding.enabled` |

pub mod env;
pub mod settings;

pub use env::{Env, parse_bool};
pub use settings::{MongoSettings, SettingsError, ShardingSettings};
