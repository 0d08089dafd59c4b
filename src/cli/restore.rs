//! Restore CLI commands
//!
//! `restore` takes an ordered list of files and URLs; `restore-all` restores
//! the whole configured backup tree.

use chrono::Utc;

use super::session::{format_elapsed, open_transport, RunOptions};
use crate::config::paths::SyncPaths;
use crate::config::settings::Settings;
use crate::display::{format_password_reminder, format_restore_report};
use crate::error::{PolicyError, PolicyResult};
use crate::restore::{DocumentSource, FailurePolicy, RestoreDriver, RestoreReport};

fn failure_policy(settings: &Settings, options: &RunOptions) -> FailurePolicy {
    FailurePolicy::from_fail_fast(options.fail_fast || settings.restore.fail_fast)
}

/// Handle the `restore <SOURCE>...` command
pub fn handle_restore_command(
    settings: &Settings,
    sources: &[String],
    options: &RunOptions,
) -> PolicyResult<RestoreReport> {
    if sources.is_empty() {
        return Err(PolicyError::Config(
            "No restore sources given; pass one or more files or URLs".into(),
        ));
    }
    let sources: Vec<DocumentSource> = sources.iter().map(|s| DocumentSource::parse(s)).collect();

    println!("Policy Restore");
    println!("==============");
    let transport = open_transport(&settings.connection, options)?;
    println!("Sources: {}", sources.len());
    println!();

    let driver = RestoreDriver::new(&transport, failure_policy(settings, options));
    let report = driver.restore_sources(&sources)?;
    print_report(&report);
    Ok(report)
}

/// Handle the `restore-all` command
pub fn handle_restore_all_command(
    paths: &SyncPaths,
    settings: &Settings,
    options: &RunOptions,
) -> PolicyResult<RestoreReport> {
    let backups_path = settings.backups_path(paths);
    if !backups_path.is_dir() {
        return Err(PolicyError::Config(format!(
            "Backup directory {} does not exist",
            backups_path.display()
        )));
    }

    println!("Policy Restore");
    println!("==============");
    let transport = open_transport(&settings.connection, options)?;
    println!("Backup directory: {}", backups_path.display());
    println!();

    let driver = RestoreDriver::new(&transport, failure_policy(settings, options));
    let report = driver.restore_tree(&backups_path, &settings.collections)?;
    print_report(&report);
    Ok(report)
}

fn print_report(report: &RestoreReport) {
    println!("{}", format_restore_report(report));
    println!(
        "Restore finished in {}.",
        format_elapsed(Utc::now().signed_duration_since(report.started_at))
    );

    if let Some(reminder) = format_password_reminder(report) {
        println!();
        print!("{}", reminder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_policy_from_flag_or_settings() {
        let mut settings = Settings::default();
        let options = RunOptions::default();
        assert_eq!(failure_policy(&settings, &options), FailurePolicy::Continue);

        settings.restore.fail_fast = true;
        assert_eq!(failure_policy(&settings, &options), FailurePolicy::FailFast);

        let settings = Settings::default();
        let options = RunOptions {
            fail_fast: true,
            tracking_id: None,
        };
        assert_eq!(failure_policy(&settings, &options), FailurePolicy::FailFast);
    }

    #[test]
    fn test_restore_requires_sources() {
        let err = handle_restore_command(&Settings::default(), &[], &RunOptions::default())
            .unwrap_err();
        assert!(matches!(err, PolicyError::Config(_)));
    }
}
