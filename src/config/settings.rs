//! User settings for policy-sync
//!
//! Connection details for the Policy Service, the backup tree and git sync
//! options, restore escalation and the list of collections to walk.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::paths::SyncPaths;
use crate::error::PolicyError;
use crate::models::CollectionType;
use crate::storage::write_json_atomic;

/// Environment variable overriding the configured password
pub const PASSWORD_ENV: &str = "POLICY_SYNC_PASSWORD";

/// How to reach and authenticate against the Policy Service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSettings {
    #[serde(default = "default_protocol")]
    pub protocol: String,

    #[serde(default)]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    /// Only read from disk; `init` and `config` never write it back
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Verify TLS certificates (appliances usually ship self-signed ones)
    #[serde(default)]
    pub verify_certs: bool,

    /// Path prefix of the API root
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Value of the `SOURCE` request header
    #[serde(default = "default_source_header")]
    pub source_header: String,

    /// Value of the `X-Origin-Host` request header
    #[serde(default = "default_origin_host")]
    pub origin_host: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            protocol: default_protocol(),
            host: String::new(),
            port: default_port(),
            username: String::new(),
            password: None,
            verify_certs: false,
            api_prefix: default_api_prefix(),
            source_header: default_source_header(),
            origin_host: default_origin_host(),
        }
    }
}

impl ConnectionSettings {
    /// Base URL of the API root
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.protocol,
            self.host,
            self.port,
            self.api_prefix.trim_end_matches('/')
        )
    }

    /// Password from the environment, falling back to the settings file
    pub fn resolved_password(&self) -> Option<Zeroizing<String>> {
        std::env::var(PASSWORD_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .or_else(|| self.password.clone())
            .map(Zeroizing::new)
    }

    /// Check that enough is configured to open a connection
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.host.trim().is_empty() {
            return Err(PolicyError::Config("connection.host is not set".into()));
        }
        if self.username.trim().is_empty() {
            return Err(PolicyError::Config("connection.username is not set".into()));
        }
        if self.protocol != "http" && self.protocol != "https" {
            return Err(PolicyError::Config(format!(
                "connection.protocol must be http or https, got '{}'",
                self.protocol
            )));
        }
        Ok(())
    }
}

/// Git synchronization of the backup tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitSettings {
    #[serde(default)]
    pub enabled: bool,

    /// Work tree of the repository; defaults to the backups path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_tree: Option<PathBuf>,

    /// Commit author, `First Last <email@domain.com>`
    #[serde(default = "default_git_author")]
    pub author: String,

    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            work_tree: None,
            author: default_git_author(),
            commit_message: default_commit_message(),
        }
    }
}

/// Backup tree settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BackupSettings {
    /// Root of the backup tree; defaults to `<config dir>/backups`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backups_path: Option<PathBuf>,

    #[serde(default)]
    pub git: GitSettings,
}

/// Restore behaviour
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RestoreSettings {
    /// Abort the run on the first document that fails to restore
    #[serde(default)]
    pub fail_fast: bool,
}

/// User settings for policy-sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub connection: ConnectionSettings,

    #[serde(default)]
    pub backup: BackupSettings,

    #[serde(default)]
    pub restore: RestoreSettings,

    /// Collections to back up and restore, in restore order
    #[serde(default = "default_collections")]
    pub collections: Vec<CollectionType>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_protocol() -> String {
    "https".to_string()
}

fn default_port() -> u16 {
    443
}

fn default_api_prefix() -> String {
    "/api/v3/onefuse".to_string()
}

fn default_source_header() -> String {
    "POLICY_SYNC".to_string()
}

fn default_origin_host() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

fn default_git_author() -> String {
    "Policy Backup <policy-backup@localhost>".to_string()
}

fn default_commit_message() -> String {
    "Policy Backup".to_string()
}

fn default_collections() -> Vec<CollectionType> {
    CollectionType::KNOWN.to_vec()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            connection: ConnectionSettings::default(),
            backup: BackupSettings::default(),
            restore: RestoreSettings::default(),
            collections: default_collections(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if the file doesn't exist
    pub fn load_or_create(paths: &SyncPaths) -> Result<Self, PolicyError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| PolicyError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                PolicyError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to disk (the password is never written)
    pub fn save(&self, paths: &SyncPaths) -> Result<(), PolicyError> {
        paths.ensure_directories()?;

        write_json_atomic(paths.settings_file(), self)
    }

    /// Root of the backup tree
    pub fn backups_path(&self, paths: &SyncPaths) -> PathBuf {
        self.backup
            .backups_path
            .clone()
            .unwrap_or_else(|| paths.default_backups_dir())
    }

    /// Work tree git runs in
    pub fn git_work_tree(&self, paths: &SyncPaths) -> PathBuf {
        self.backup
            .git
            .work_tree
            .clone()
            .unwrap_or_else(|| self.backups_path(paths))
    }
}
