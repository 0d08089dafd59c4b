//! Syncing the backup tree with a git remote
//!
//! Runs pull, add, commit and push in the work tree after a backup. A git
//! command that exits non-zero (nothing to commit, no upstream) is logged and
//! the sequence carries on; failing to start git at all is an error.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{info, warn};

use crate::config::settings::GitSettings;
use crate::error::{PolicyError, PolicyResult};

/// Outcome of one git invocation
#[derive(Debug, Clone)]
pub struct GitStep {
    pub args: Vec<String>,
    pub success: bool,
    pub output: String,
}

/// The git command sequence for one work tree
#[derive(Debug, Clone)]
pub struct GitSync {
    work_tree: PathBuf,
    author: String,
    message: String,
}

impl GitSync {
    pub fn new(work_tree: impl Into<PathBuf>, settings: &GitSettings) -> Self {
        Self {
            work_tree: work_tree.into(),
            author: settings.author.clone(),
            message: settings.commit_message.clone(),
        }
    }

    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    /// Arguments of each git invocation, in order
    pub fn commands(&self) -> Vec<Vec<String>> {
        let work_tree = format!("--work-tree={}", self.work_tree.display());
        let git_dir = format!("--git-dir={}", self.work_tree.join(".git").display());
        let with_repo = |rest: &[&str]| -> Vec<String> {
            let mut args = vec![work_tree.clone(), git_dir.clone()];
            args.extend(rest.iter().map(|s| s.to_string()));
            args
        };

        vec![
            with_repo(&["pull"]),
            with_repo(&["add", "."]),
            with_repo(&[
                "commit",
                "-a",
                "-m",
                &self.message,
                &format!("--author={}", self.author),
            ]),
            with_repo(&["push"]),
        ]
    }

    /// Run the sequence with the `git` on PATH
    pub fn run(&self) -> PolicyResult<Vec<GitStep>> {
        self.run_with("git")
    }

    fn run_with(&self, program: &str) -> PolicyResult<Vec<GitStep>> {
        let mut steps = Vec::new();

        for args in self.commands() {
            let output = Command::new(program)
                .args(&args)
                .output()
                .map_err(|e| PolicyError::Git(format!("Failed to run {}: {}", program, e)))?;

            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            let text = text.trim().to_string();
            let command = args.get(2).cloned().unwrap_or_default();

            if output.status.success() {
                info!(command = %command, output = %text, "git");
            } else {
                warn!(command = %command, status = %output.status, output = %text, "git command failed");
            }

            steps.push(GitStep {
                args,
                success: output.status.success(),
                output: text,
            });
        }

        Ok(steps)
    }
}
