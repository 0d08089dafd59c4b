//! Backup CLI command
//!
//! Writes every policy of the configured Policy Service to the backup tree,
//! then syncs the tree with git when enabled.

use chrono::Utc;

use super::session::{format_elapsed, open_transport, RunOptions};
use crate::backup::{BackupReport, BackupWalker, GitSync};
use crate::config::paths::SyncPaths;
use crate::config::settings::Settings;
use crate::display::format_backup_report;
use crate::error::PolicyResult;

/// Handle the `backup` command
pub fn handle_backup_command(
    paths: &SyncPaths,
    settings: &Settings,
    options: &RunOptions,
) -> PolicyResult<BackupReport> {
    let backups_path = settings.backups_path(paths);

    println!("Policy Backup");
    println!("=============");
    let transport = open_transport(&settings.connection, options)?;
    println!("Backup directory: {}", backups_path.display());
    println!();

    let report = BackupWalker::new(&transport).backup_all(&backups_path, &settings.collections)?;

    print!("{}", format_backup_report(&report));
    println!(
        "Backup complete in {}.",
        format_elapsed(Utc::now().signed_duration_since(report.started_at))
    );

    if settings.backup.git.enabled {
        let git = GitSync::new(settings.git_work_tree(paths), &settings.backup.git);
        println!();
        println!("Syncing {} with git...", git.work_tree().display());
        let steps = git.run()?;
        let failed = steps.iter().filter(|s| !s.success).count();
        if failed == 0 {
            println!("Git sync complete.");
        } else {
            println!(
                "Git sync finished with {} failed command(s); see the log for details.",
                failed
            );
        }
    }

    Ok(report)
}
