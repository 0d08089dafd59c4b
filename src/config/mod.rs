//! Configuration module for policy-sync
//!
//! This module provides configuration management including:
//! - Config directory resolution
//! - Settings persistence (connection, backup tree, git, restore policy)

pub mod paths;
pub mod settings;

pub use paths::SyncPaths;
pub use settings::Settings;
