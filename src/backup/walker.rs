//! Backup walker
//!
//! Pages through every configured collection and writes each object to
//! `<root>/<collection>/<file name>.json`.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::client::query::{self, QueryOutcome};
use crate::client::Transport;
use crate::error::PolicyResult;
use crate::models::href::relative_path;
use crate::models::{CollectionType, PolicyDocument};
use crate::storage::write_json_atomic;

/// Documents written for one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionBackup {
    pub collection: CollectionType,
    pub written: usize,
}

/// Result of a backup run
#[derive(Debug, Clone)]
pub struct BackupReport {
    pub started_at: DateTime<Utc>,
    pub root: PathBuf,
    pub collections: Vec<CollectionBackup>,
    /// Collections the source instance does not have
    pub skipped: Vec<CollectionType>,
}

impl BackupReport {
    fn new(root: &Path) -> Self {
        Self {
            started_at: Utc::now(),
            root: root.to_path_buf(),
            collections: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Total documents written
    pub fn total_written(&self) -> usize {
        self.collections.iter().map(|c| c.written).sum()
    }
}

/// Serializes every policy object of a Policy Service to disk
pub struct BackupWalker<'a> {
    transport: &'a dyn Transport,
}

impl<'a> BackupWalker<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    /// Back up `collections` under `root`
    ///
    /// Existing files are overwritten; files for objects that no longer
    /// exist on the source are left in place.
    pub fn backup_all(
        &self,
        root: &Path,
        collections: &[CollectionType],
    ) -> PolicyResult<BackupReport> {
        let mut report = BackupReport::new(root);

        for collection in collections {
            match self.backup_collection(root, collection)? {
                Some(written) => {
                    info!(policy_type = %collection, written, "Backed up policies");
                    report.collections.push(CollectionBackup {
                        collection: collection.clone(),
                        written,
                    });
                }
                None => {
                    warn!(
                        policy_type = %collection,
                        "policy_type not found on source, skipping backup"
                    );
                    report.skipped.push(collection.clone());
                }
            }
        }

        Ok(report)
    }

    /// Returns `None` when the source does not have the collection
    fn backup_collection(
        &self,
        root: &Path,
        collection: &CollectionType,
    ) -> PolicyResult<Option<usize>> {
        let dir = root.join(collection.as_str());
        let mut next = Some(collection.list_path());
        let mut visited = HashSet::new();
        let mut names = FileNames::default();
        let mut written = 0;

        while let Some(path) = next.take() {
            if !visited.insert(path.clone()) {
                warn!(policy_type = %collection, path = %path, "next link repeats a fetched page, stopping");
                break;
            }

            debug!(policy_type = %collection, path = %path, "fetching page");
            let page = match query::fetch_page(self.transport, collection, &path)? {
                QueryOutcome::Found(page) => page,
                QueryOutcome::CollectionUnsupported => return Ok(None),
            };

            for item in page.items {
                let document = PolicyDocument::from_value(item, collection.as_str())?;
                let file = dir.join(names.claim(&document));
                debug!(policy_type = %collection, file = %file.display(), "writing");
                write_json_atomic(&file, &document)?;
                written += 1;
            }

            next = page
                .next
                .map(|href| relative_path(&href, self.transport.api_prefix()));
        }

        Ok(Some(written))
    }
}

/// File name a document is stored under
///
/// `<discriminator>_<name>.json` when the document has a `type` or
/// `endpointType`, else `<name>.json`.
pub fn file_name_for(document: &PolicyDocument) -> String {
    let stem = match document.discriminator() {
        Some(discriminator) => format!("{}_{}", discriminator.value, document.name()),
        None => document.name().to_string(),
    };
    format!("{}.json", sanitize(&stem))
}

/// File names handed out during one collection walk, keyed to the owning id
#[derive(Debug, Default)]
struct FileNames {
    claimed: HashMap<String, Option<String>>,
}

impl FileNames {
    /// The file name for `document`
    ///
    /// Distinct objects whose names sanitize to the same file get the id
    /// appended instead of overwriting each other. The same object seen
    /// again keeps its name.
    fn claim(&mut self, document: &PolicyDocument) -> String {
        let preferred = file_name_for(document);
        let id = document.id();

        let mut candidate = preferred.clone();
        let mut attempt = 1;
        while let Some(owner) = self.claimed.get(&candidate) {
            if owner.is_some() && *owner == id {
                return candidate;
            }
            attempt += 1;
            candidate = disambiguated(&preferred, id.as_deref(), attempt);
        }

        if candidate != preferred {
            warn!(
                policy = document.name(),
                file = %preferred,
                renamed = %candidate,
                "Backup file name already used by another policy"
            );
        }
        self.claimed.insert(candidate.clone(), id);
        candidate
    }
}

fn disambiguated(preferred: &str, id: Option<&str>, attempt: usize) -> String {
    let stem = preferred.strip_suffix(".json").unwrap_or(preferred);
    match id {
        Some(id) if attempt == 2 => format!("{}_{}.json", stem, sanitize(id)),
        Some(id) => format!("{}_{}_{}.json", stem, sanitize(id), attempt - 1),
        None => format!("{}_{}.json", stem, attempt),
    }
}

fn sanitize(stem: &str) -> String {
    let mut safe: String = stem
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // Leading dots would hide the file from restore
    if safe.starts_with('.') {
        safe.replace_range(..1, "_");
    }
    if safe.is_empty() {
        safe.push('_');
    }
    safe
}
