//! Backing up a Policy Service to a directory tree
//!
//! # Layout
//!
//! ```text
//! <backups_path>/
//!   moduleCredentials/svc_account.json
//!   endpoints/microsoft_corp.json
//!   namingPolicies/docker_port.json
//!   ...
//! ```
//!
//! One file per object, named `<type>_<name>.json` for objects that carry a
//! `type` or `endpointType` and `<name>.json` otherwise. The tree is the input
//! of `restore-all` and can be kept in git via [`GitSync`].

mod git;
mod walker;

pub use git::{GitStep, GitSync};
pub use walker::{file_name_for, BackupReport, BackupWalker, CollectionBackup};
