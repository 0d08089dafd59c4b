//! Restore runs over a backup tree or an explicit list of sources

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use super::report::{EntryStatus, RestoreEntry, RestoreReport};
use super::source::DocumentSource;
use super::upsert::UpsertEngine;
use crate::client::Transport;
use crate::error::{PolicyError, PolicyResult};
use crate::models::href::collection_of;
use crate::models::{CollectionType, PolicyDocument};

/// How document-scoped failures affect the rest of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure and move on to the next document
    #[default]
    Continue,
    /// Abort the run on the first failure
    FailFast,
}

impl FailurePolicy {
    pub fn from_fail_fast(fail_fast: bool) -> Self {
        if fail_fast {
            Self::FailFast
        } else {
            Self::Continue
        }
    }
}

/// Feeds documents through the upsert engine in dependency order
pub struct RestoreDriver<'a> {
    transport: &'a dyn Transport,
    engine: UpsertEngine<'a>,
    policy: FailurePolicy,
}

impl<'a> RestoreDriver<'a> {
    pub fn new(transport: &'a dyn Transport, policy: FailurePolicy) -> Self {
        Self {
            transport,
            engine: UpsertEngine::new(transport),
            policy,
        }
    }

    /// Restore every document under `root`, one subdirectory per collection
    ///
    /// Collections are visited in the order given; within a collection files
    /// are processed in name order. Hidden files are ignored.
    pub fn restore_tree(
        &self,
        root: &Path,
        collections: &[CollectionType],
    ) -> PolicyResult<RestoreReport> {
        let mut report = RestoreReport::new();

        for collection in collections {
            let dir = root.join(collection.as_str());
            if !dir.is_dir() {
                warn!(
                    policy_type = %collection,
                    path = %dir.display(),
                    "Directory for policy type does not exist. Skipping."
                );
                continue;
            }

            info!(policy_type = %collection, "Restoring policies");
            for path in document_files(&dir)? {
                let source = DocumentSource::File(path);
                let loaded = source.load().map(|document| (document, collection.clone()));
                self.restore_one(&mut report, &source, loaded)?;
            }
        }

        Ok(report)
    }

    /// Restore the given sources in the order given
    ///
    /// The collection of each document is taken from its self link, so the
    /// caller must order the list so that referenced objects come first.
    pub fn restore_sources(&self, sources: &[DocumentSource]) -> PolicyResult<RestoreReport> {
        let mut report = RestoreReport::new();

        for source in sources {
            let loaded = source.load().and_then(|document| {
                let collection = self.collection_from_self_link(&document, source)?;
                Ok((document, collection))
            });
            self.restore_one(&mut report, source, loaded)?;
        }

        Ok(report)
    }

    fn collection_from_self_link(
        &self,
        document: &PolicyDocument,
        source: &DocumentSource,
    ) -> PolicyResult<CollectionType> {
        let href = document
            .self_href()
            .ok_or_else(|| PolicyError::invalid_document(source.to_string(), "no self link"))?;
        collection_of(href, self.transport.api_prefix()).ok_or_else(|| {
            PolicyError::invalid_document(
                source.to_string(),
                format!("cannot tell the collection of self href '{}'", href),
            )
        })
    }

    fn restore_one(
        &self,
        report: &mut RestoreReport,
        source: &DocumentSource,
        loaded: PolicyResult<(PolicyDocument, CollectionType)>,
    ) -> PolicyResult<()> {
        let source_name = source.to_string();

        let (collection, name, result) = match loaded {
            Ok((document, collection)) => {
                let result = self.engine.upsert(&document, &collection, &source_name);
                (Some(collection), Some(document.name().to_string()), result)
            }
            Err(e) => (None, None, Err(e)),
        };

        let status = match result {
            Ok(outcome) => EntryStatus::from(outcome),
            Err(e) if e.is_document_scoped() && self.policy == FailurePolicy::Continue => {
                if e.is_reference_error() {
                    error!(
                        file_path = %source_name,
                        error = %e,
                        "Failed to restore policy; restore the linked policy first"
                    );
                } else {
                    error!(file_path = %source_name, error = %e, "Failed to restore policy");
                }
                EntryStatus::Failed(e.to_string())
            }
            Err(e) => return Err(e),
        };

        report.push(RestoreEntry {
            source: source_name,
            collection,
            name,
            status,
        });
        Ok(())
    }
}

/// Regular, non-hidden files of a collection directory in name order
fn document_files(dir: &Path) -> PolicyResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| PolicyError::Io(format!("Failed to list {}: {}", dir.display(), e)))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden && entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
