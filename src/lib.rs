//! policy-sync - Backup and restore for Policy Service configuration
//!
//! Exports every policy object of a REST-managed Policy Service into a tree of
//! JSON files and restores such a tree (or a hand-picked list of files and
//! URLs) into the same or another instance. Links between policies are
//! re-resolved by name on the target, so ids never need to match.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `client`: the `Transport` trait and its reqwest implementation
//! - `models`: collection types, policy documents and href helpers
//! - `restore`: reference resolution, payload building, upsert and the restore driver
//! - `backup`: the backup walker and git sync
//! - `config`: configuration and path management
//! - `storage`: atomic JSON writes
//! - `display`: run summaries
//! - `cli`: command handlers
//! - `error`: custom error types
//!
//! # Example
//!
//! ```rust,ignore
//! use policy_sync::config::{paths::SyncPaths, settings::Settings};
//! use policy_sync::client::HttpTransport;
//! use policy_sync::restore::{FailurePolicy, RestoreDriver};
//!
//! let paths = SyncPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let password = settings.connection.resolved_password().unwrap_or_default();
//! let transport = HttpTransport::new(&settings.connection, password, None)?;
//! let report = RestoreDriver::new(&transport, FailurePolicy::Continue)
//!     .restore_tree(&settings.backups_path(&paths), &settings.collections)?;
//! println!("{}", report.summary());
//! ```

pub mod backup;
pub mod cli;
pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod models;
pub mod restore;
pub mod storage;

pub use error::{PolicyError, PolicyResult};
