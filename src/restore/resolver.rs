//! Reference resolution
//!
//! Stored documents link to related objects by href and title. Ids differ
//! between Policy Service instances, so a link is resolved on the target by
//! looking up its title in the linked collection.

use tracing::debug;

use crate::client::query::{self, Filter, QueryOutcome};
use crate::client::Transport;
use crate::error::{PolicyError, PolicyResult};
use crate::models::href::collection_of;
use crate::models::{CollectionType, Link, PolicyDocument};

/// Resolves links against the target Policy Service
pub struct ReferenceResolver<'a> {
    transport: &'a dyn Transport,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    /// Resolve a link found in `owner`, a document of collection `owner_collection`
    ///
    /// Returns the self href of the single matching object on the target.
    pub fn resolve(
        &self,
        link: &Link,
        owner_collection: &CollectionType,
        owner: &PolicyDocument,
    ) -> PolicyResult<String> {
        let link_type = collection_of(&link.href, self.transport.api_prefix()).ok_or_else(|| {
            PolicyError::invalid_document(
                owner.name(),
                format!("cannot tell the collection of link href '{}'", link.href),
            )
        })?;

        let endpoint_type = if link_type == CollectionType::Endpoints {
            owner_collection.endpoint_type().or(owner.type_field())
        } else {
            None
        };

        self.resolve_by_name(&link_type, &link.title, endpoint_type)
    }

    /// Look up an object by collection, name and optional endpoint type
    pub fn resolve_by_name(
        &self,
        link_type: &CollectionType,
        link_name: &str,
        endpoint_type: Option<&str>,
    ) -> PolicyResult<String> {
        let mut filter = Filter::name(link_name);
        if let Some(endpoint_type) = endpoint_type {
            filter = filter.and("type", endpoint_type);
        }

        let path = filter.path(link_type)?;
        let page = match query::find(self.transport, link_type, &filter)? {
            QueryOutcome::Found(page) => page,
            QueryOutcome::CollectionUnsupported => {
                return Err(PolicyError::server(404, path, "Not found."))
            }
        };

        match page.count {
            0 => Err(PolicyError::reference_not_found(link_type.as_str(), link_name)),
            1 => {
                let href = page
                    .items
                    .first()
                    .and_then(query::self_href)
                    .ok_or_else(|| {
                        PolicyError::response(
                            path.as_str(),
                            format!("match for {} '{}' has no self link", link_type, link_name),
                        )
                    })?;
                debug!(%link_type, link_name, href, "resolved link");
                Ok(href.to_string())
            }
            count => Err(PolicyError::AmbiguousReference {
                link_type: link_type.to_string(),
                link_name: link_name.to_string(),
                count,
            }),
        }
    }
}
