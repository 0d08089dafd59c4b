//! Path management for policy-sync
//!
//! ## Path Resolution Order
//!
//! 1. `POLICY_SYNC_CONFIG_DIR` environment variable (if set)
//! 2. The platform config directory from `directories`
//!    (`~/.config/policy-sync` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::PolicyError;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "POLICY_SYNC_CONFIG_DIR";

/// Manages all paths used by policy-sync
#[derive(Debug, Clone)]
pub struct SyncPaths {
    /// Base directory for configuration and default backups
    base_dir: PathBuf,
}

impl SyncPaths {
    /// Create a new SyncPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, PolicyError> {
        let base_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create SyncPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Default location of the backup tree when none is configured
    pub fn default_backups_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Ensure the base directory exists
    pub fn ensure_directories(&self) -> Result<(), PolicyError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| PolicyError::Io(format!("Failed to create config directory: {}", e)))
    }

    /// Check if a settings file has been written
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, PolicyError> {
    ProjectDirs::from("", "", "policy-sync")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| PolicyError::Config("Could not determine home directory".into()))
}
