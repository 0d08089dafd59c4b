//! Restore run results

use chrono::{DateTime, Utc};

use super::upsert::{SkipReason, UpsertOutcome};
use crate::models::CollectionType;

/// Final state of one restored source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    Created { placeholder_password: bool },
    Updated,
    Skipped(SkipReason),
    Failed(String),
}

impl From<UpsertOutcome> for EntryStatus {
    fn from(outcome: UpsertOutcome) -> Self {
        match outcome {
            UpsertOutcome::Created {
                placeholder_password,
                ..
            } => EntryStatus::Created {
                placeholder_password,
            },
            UpsertOutcome::Updated { .. } => EntryStatus::Updated,
            UpsertOutcome::Skipped(reason) => EntryStatus::Skipped(reason),
        }
    }
}

/// One source processed by a restore run
#[derive(Debug, Clone)]
pub struct RestoreEntry {
    pub source: String,
    pub collection: Option<CollectionType>,
    pub name: Option<String>,
    pub status: EntryStatus,
}

/// Everything a restore run did, in processing order
#[derive(Debug, Clone)]
pub struct RestoreReport {
    pub started_at: DateTime<Utc>,
    pub entries: Vec<RestoreEntry>,
}

impl Default for RestoreReport {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            entries: Vec::new(),
        }
    }
}

impl RestoreReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: RestoreEntry) {
        self.entries.push(entry);
    }

    pub fn created(&self) -> usize {
        self.count(|s| matches!(s, EntryStatus::Created { .. }))
    }

    pub fn updated(&self) -> usize {
        self.count(|s| matches!(s, EntryStatus::Updated))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, EntryStatus::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, EntryStatus::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Credentials created with the placeholder password
    pub fn credentials_needing_password(&self) -> Vec<&RestoreEntry> {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.status,
                    EntryStatus::Created {
                        placeholder_password: true
                    }
                )
            })
            .collect()
    }

    /// One-line totals
    pub fn summary(&self) -> String {
        format!(
            "Created: {}, Updated: {}, Skipped: {}, Failed: {}",
            self.created(),
            self.updated(),
            self.skipped(),
            self.failed()
        )
    }

    fn count(&self, predicate: impl Fn(&EntryStatus) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.status)).count()
    }
}
