use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use policy_sync::cli::{
    handle_backup_command, handle_config_command, handle_init_command,
    handle_restore_all_command, handle_restore_command, RunOptions,
};
use policy_sync::config::{paths::SyncPaths, settings::Settings};
use policy_sync::restore::RestoreReport;

#[derive(Parser)]
#[command(
    name = "policy-sync",
    version,
    about = "Back up and restore Policy Service policies as JSON files",
    long_about = "policy-sync exports every policy of a Policy Service into a tree \
                  of JSON files (optionally kept in git) and restores such a tree, \
                  or a list of individual files and URLs, into the same or another \
                  instance. Links between policies are re-resolved by name."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Abort a restore on the first policy that fails
    #[arg(long, global = true)]
    fail_fast: bool,

    /// Tracking id sent with every request (a random one is generated otherwise)
    #[arg(long, global = true, env = "POLICY_SYNC_TRACKING_ID")]
    tracking_id: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up all policies to the configured backup directory
    Backup,

    /// Restore individual policy files or URLs, in the order given
    ///
    /// Referenced policies must come first, e.g. a naming sequence before the
    /// naming policy that uses it.
    Restore {
        /// Policy JSON files or http(s) URLs
        #[arg(required = true, value_name = "SOURCE")]
        sources: Vec<String>,
    },

    /// Restore the whole configured backup directory
    RestoreAll,

    /// Show current configuration and paths
    Config,

    /// Write a default settings file
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    policy_sync::logging::init(cli.verbose);

    let paths = SyncPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    let options = RunOptions {
        fail_fast: cli.fail_fast,
        tracking_id: cli.tracking_id,
    };

    match cli.command {
        Some(Commands::Backup) => {
            handle_backup_command(&paths, &settings, &options)?;
        }
        Some(Commands::Restore { sources }) => {
            let report = handle_restore_command(&settings, &sources, &options)?;
            check_failures(&report)?;
        }
        Some(Commands::RestoreAll) => {
            let report = handle_restore_all_command(&paths, &settings, &options)?;
            check_failures(&report)?;
        }
        Some(Commands::Config) => handle_config_command(&paths, &settings)?,
        Some(Commands::Init) => handle_init_command(&paths, &settings)?,
        None => {
            println!("policy-sync - Policy Service backup and restore");
            println!();
            println!("Run 'policy-sync --help' for usage information.");
            println!("Run 'policy-sync init' to create a settings file.");
        }
    }

    Ok(())
}

fn check_failures(report: &RestoreReport) -> Result<()> {
    if report.has_failures() {
        bail!("{} of {} policies failed to restore", report.failed(), report.entries.len());
    }
    Ok(())
}
