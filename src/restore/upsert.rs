//! Idempotent create-or-update of a single policy document
//!
//! Per document the engine moves through Querying, then Creating, Updating
//! or Skipped. Errors returned from [`UpsertEngine::upsert`] are the Failed
//! state; the caller decides whether they end the run.

use std::fmt;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::payload::PayloadBuilder;
use super::resolver::ReferenceResolver;
use crate::client::query::{self, Filter, QueryOutcome};
use crate::client::Transport;
use crate::error::{PolicyError, PolicyResult};
use crate::models::{CollectionType, PolicyDocument};

/// Password written to restored credentials; secrets are never backed up
pub const PLACEHOLDER_PASSWORD: &str = "Pl@ceHolder123!";

const PASSWORD_FIELD: &str = "password";

/// Why a document was left alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The target has no such collection (older Policy Service version)
    CollectionUnsupported,
    /// Several objects on the target share the document's name and type
    AmbiguousUpsertTarget { count: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::CollectionUnsupported => write!(f, "collection not supported by target"),
            SkipReason::AmbiguousUpsertTarget { count } => {
                write!(f, "{} objects share this name and type", count)
            }
        }
    }
}

/// What happened to a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created {
        /// Self href of the new object, when the server returned one
        href: Option<String>,
        /// Whether the placeholder password was written
        placeholder_password: bool,
    },
    Updated {
        id: String,
    },
    Skipped(SkipReason),
}

/// Creates or updates documents on the target Policy Service
pub struct UpsertEngine<'a> {
    transport: &'a dyn Transport,
    builder: PayloadBuilder<'a>,
}

impl<'a> UpsertEngine<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self {
            transport,
            builder: PayloadBuilder::new(ReferenceResolver::new(transport)),
        }
    }

    /// Upsert `document` into `collection`
    ///
    /// `source` names where the document came from, for log messages.
    pub fn upsert(
        &self,
        document: &PolicyDocument,
        collection: &CollectionType,
        source: &str,
    ) -> PolicyResult<UpsertOutcome> {
        let name = document.name();
        let mut filter = Filter::name(name);
        if let Some(discriminator) = document.discriminator() {
            filter = filter.and(discriminator.field, discriminator.value);
        }

        debug!(policy_type = %collection, policy = name, filter = %filter.expression(), "querying");
        let page = match query::find(self.transport, collection, &filter)? {
            QueryOutcome::Found(page) => page,
            QueryOutcome::CollectionUnsupported => {
                warn!(
                    policy_type = %collection,
                    file_path = source,
                    "policy_type not found on target, {} will not be restored",
                    source
                );
                return Ok(UpsertOutcome::Skipped(SkipReason::CollectionUnsupported));
            }
        };

        match page.count {
            0 => self.create(document, collection, source),
            1 => {
                let id = page
                    .items
                    .first()
                    .and_then(query::object_id)
                    .ok_or_else(|| {
                        PolicyError::response(
                            collection.list_path(),
                            format!("existing {} '{}' has no id", collection, name),
                        )
                    })?;
                self.update(document, collection, &id, source)
            }
            count => {
                warn!(
                    policy_type = %collection,
                    policy = name,
                    count,
                    "More than one policy was found with this name and type, skipping policy restore"
                );
                Ok(UpsertOutcome::Skipped(SkipReason::AmbiguousUpsertTarget { count }))
            }
        }
    }

    fn create(
        &self,
        document: &PolicyDocument,
        collection: &CollectionType,
        source: &str,
    ) -> PolicyResult<UpsertOutcome> {
        info!(policy_type = %collection, file_path = source, "Creating policy");
        let mut payload = self.builder.build(document, collection)?;

        let placeholder_password = collection.holds_secrets();
        if placeholder_password {
            payload.insert(
                PASSWORD_FIELD.to_string(),
                Value::String(PLACEHOLDER_PASSWORD.to_string()),
            );
            warn!(
                credential = document.name(),
                file_path = source,
                "Credential restored with a placeholder password; update the password before using it"
            );
        }

        let path = collection.list_path();
        let response = self
            .transport
            .post(&path, Some(&Value::Object(payload)))?
            .error_for_status(&path)?;

        let href = response
            .json(&path)
            .ok()
            .and_then(|body| query::self_href(&body).map(str::to_string));

        Ok(UpsertOutcome::Created {
            href,
            placeholder_password,
        })
    }

    fn update(
        &self,
        document: &PolicyDocument,
        collection: &CollectionType,
        id: &str,
        source: &str,
    ) -> PolicyResult<UpsertOutcome> {
        info!(policy_type = %collection, file_path = source, id, "Updating policy");
        let mut payload = self.builder.build(document, collection)?;

        if collection.holds_secrets() {
            payload.remove(PASSWORD_FIELD);
        }

        let path = collection.object_path(id);
        self.transport
            .put(&path, Some(&Value::Object(payload)))?
            .error_for_status(&path)?;

        Ok(UpsertOutcome::Updated { id: id.to_string() })
    }
}
