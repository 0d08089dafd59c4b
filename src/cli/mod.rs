//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backup and restore layers.

pub mod backup;
pub mod config;
pub mod restore;
pub mod session;

pub use backup::handle_backup_command;
pub use config::{handle_config_command, handle_init_command};
pub use restore::{handle_restore_all_command, handle_restore_command};
pub use session::RunOptions;
