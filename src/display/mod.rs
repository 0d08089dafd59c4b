//! Display formatting for terminal output
//!
//! Summaries printed at the end of backup and restore runs.

pub mod backup;
pub mod restore;

pub use backup::format_backup_report;
pub use restore::{format_password_reminder, format_restore_report, format_status};
