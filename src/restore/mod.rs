//! Restoring policy documents into a Policy Service
//!
//! Documents are read from a backup tree or an explicit list of files and
//! URLs. Each one has its links re-resolved by name on the target and is then
//! created or updated in place, so restoring the same tree twice leaves the
//! target unchanged.

pub mod driver;
pub mod payload;
pub mod report;
pub mod resolver;
pub mod source;
pub mod upsert;

pub use driver::{FailurePolicy, RestoreDriver};
pub use payload::PayloadBuilder;
pub use report::{EntryStatus, RestoreEntry, RestoreReport};
pub use resolver::ReferenceResolver;
pub use source::DocumentSource;
pub use upsert::{SkipReason, UpsertEngine, UpsertOutcome, PLACEHOLDER_PASSWORD};
