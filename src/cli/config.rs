//! `init` and `config` commands

use crate::config::paths::SyncPaths;
use crate::config::settings::{Settings, PASSWORD_ENV};
use crate::error::PolicyResult;

/// Handle the `init` command
///
/// An existing settings file is left untouched.
pub fn handle_init_command(paths: &SyncPaths, settings: &Settings) -> PolicyResult<()> {
    if paths.is_initialized() {
        println!(
            "Already initialized: {}",
            paths.settings_file().display()
        );
        return Ok(());
    }

    println!("Initializing policy-sync at: {}", paths.base_dir().display());
    settings.save(paths)?;
    println!("Initialization complete!");
    println!();
    println!("Edit {} to set:", paths.settings_file().display());
    println!("  - connection.host and connection.username");
    println!("  - backup.backups_path (default: {})", paths.default_backups_dir().display());
    println!("  - backup.git.* to sync backups with a git repository");
    println!();
    println!(
        "The password is read from {} or prompted for at run time.",
        PASSWORD_ENV
    );
    Ok(())
}

/// Handle the `config` command
pub fn handle_config_command(paths: &SyncPaths, settings: &Settings) -> PolicyResult<()> {
    print!("{}", format_config(paths, settings));
    Ok(())
}

fn password_source(settings: &Settings) -> String {
    let from_env = std::env::var(PASSWORD_ENV)
        .map(|p| !p.is_empty())
        .unwrap_or(false);
    if from_env {
        format!("******** (from {})", PASSWORD_ENV)
    } else if settings.connection.password.is_some() {
        "******** (from settings file)".to_string()
    } else {
        "(not set, will prompt)".to_string()
    }
}

fn format_config(paths: &SyncPaths, settings: &Settings) -> String {
    let connection = &settings.connection;
    let git = &settings.backup.git;
    let or_unset = |value: &str| {
        if value.is_empty() {
            "(not set)".to_string()
        } else {
            value.to_string()
        }
    };

    let mut output = String::new();
    output.push_str("policy-sync Configuration\n");
    output.push_str("=========================\n");
    output.push_str(&format!("Config directory: {}\n", paths.base_dir().display()));
    output.push_str(&format!(
        "Settings file:    {}{}\n",
        paths.settings_file().display(),
        if paths.is_initialized() { "" } else { " (not created yet, run 'policy-sync init')" }
    ));
    output.push_str(&format!(
        "Backups path:     {}\n",
        settings.backups_path(paths).display()
    ));
    output.push('\n');
    output.push_str("Connection:\n");
    output.push_str(&format!("  URL:           {}\n", connection.base_url()));
    output.push_str(&format!("  Host:          {}\n", or_unset(&connection.host)));
    output.push_str(&format!("  Username:      {}\n", or_unset(&connection.username)));
    output.push_str(&format!("  Password:      {}\n", password_source(settings)));
    output.push_str(&format!("  Verify certs:  {}\n", connection.verify_certs));
    output.push_str(&format!("  Origin host:   {}\n", connection.origin_host));
    output.push('\n');
    output.push_str("Git sync:\n");
    output.push_str(&format!("  Enabled:       {}\n", git.enabled));
    output.push_str(&format!(
        "  Work tree:     {}\n",
        settings.git_work_tree(paths).display()
    ));
    output.push_str(&format!("  Author:        {}\n", git.author));
    output.push('\n');
    output.push_str(&format!("Restore fail-fast: {}\n", settings.restore.fail_fast));
    let collections: Vec<&str> = settings.collections.iter().map(|c| c.as_str()).collect();
    output.push_str(&format!("Policy types:      {}\n", collections.join(", ")));
    output
}
