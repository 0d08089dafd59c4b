//! Create/update payload construction
//!
//! A stored document cannot be posted back as-is: its `id` belongs to the
//! source instance and its `_links` point at source ids. The payload keeps
//! every other field verbatim and replaces each link with the href of the
//! matching object on the target.

use serde_json::{Map, Value};
use tracing::warn;

use super::resolver::ReferenceResolver;
use crate::error::PolicyResult;
use crate::models::document::{ID_FIELD, LINKS_FIELD};
use crate::models::{CollectionType, LinkValue, PolicyDocument};

/// Transient fields dropped from every payload
pub const EXCLUDED_FIELDS: &[&str] = &["microsoftEndpoint"];

/// Builds create/update payloads from stored documents
pub struct PayloadBuilder<'a> {
    resolver: ReferenceResolver<'a>,
}

impl<'a> PayloadBuilder<'a> {
    pub fn new(resolver: ReferenceResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Build the payload for `document`, a member of `collection`
    ///
    /// Fails with the resolver's error on the first link that cannot be
    /// resolved; nothing is sent to the target in that case.
    pub fn build(
        &self,
        document: &PolicyDocument,
        collection: &CollectionType,
    ) -> PolicyResult<Map<String, Value>> {
        let mut payload: Map<String, Value> = document
            .fields()
            .iter()
            .filter(|(key, _)| {
                key.as_str() != ID_FIELD
                    && key.as_str() != LINKS_FIELD
                    && !EXCLUDED_FIELDS.contains(&key.as_str())
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        for (key, link) in document.links(document.name())? {
            let resolved = match link {
                LinkValue::Single(link) => {
                    Value::String(self.resolver.resolve(&link, collection, document)?)
                }
                LinkValue::List(links) => Value::Array(
                    links
                        .iter()
                        .map(|link| {
                            self.resolver
                                .resolve(link, collection, document)
                                .map(Value::String)
                        })
                        .collect::<PolicyResult<Vec<_>>>()?,
                ),
                LinkValue::Unsupported(value) => {
                    warn!(
                        policy = document.name(),
                        link = %key,
                        value = %value,
                        "Unknown link type found, dropping it from the payload"
                    );
                    continue;
                }
            };
            payload.insert(key, resolved);
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::MemoryTransport;
    use crate::error::PolicyError;
    use serde_json::json;

    fn build(server: &MemoryTransport, value: Value, collection: CollectionType) -> PolicyResult<Value> {
        let document = PolicyDocument::from_value(value, "test").unwrap();
        let builder = PayloadBuilder::new(ReferenceResolver::new(server));
        builder.build(&document, &collection).map(Value::Object)
    }

    #[test]
    fn test_document_without_links_is_copied_minus_id_and_links() {
        let server = MemoryTransport::new();
        let input = json!({
            "_links": {"self": {"href": "/api/v3/onefuse/validators/5/", "title": "v"}},
            "id": 5,
            "name": "v",
            "validatorType": "regex",
            "regex": "^[a-z]+$",
            "nested": {"a": [1, 2, 3]}
        });

        let payload = build(&server, input, CollectionType::Validators).unwrap();
        assert_eq!(
            payload,
            json!({
                "name": "v",
                "validatorType": "regex",
                "regex": "^[a-z]+$",
                "nested": {"a": [1, 2, 3]}
            })
        );
        assert!(server.requests().is_empty());
    }

    #[test]
    fn test_links_are_replaced_with_target_hrefs() {
        let server = MemoryTransport::new().with_collections(&["namingSequences", "validators"]);
        let seq = server.insert("namingSequences", json!({"name": "BASE10_port"}));
        let v1 = server.insert("validators", json!({"name": "dns_check"}));
        let v2 = server.insert("validators", json!({"name": "ad_check"}));

        let payload = build(
            &server,
            json!({
                "_links": {
                    "self": {"href": "/api/v3/onefuse/namingPolicies/4/", "title": "docker_port"},
                    "namingSequence": {"href": "/api/v3/onefuse/namingSequences/2/", "title": "BASE10_port"},
                    "validators": [
                        {"href": "/api/v3/onefuse/validators/3/", "title": "ad_check"},
                        {"href": "/api/v3/onefuse/validators/1/", "title": "dns_check"}
                    ]
                },
                "id": 4,
                "name": "docker_port",
                "template": "dock{{sequence}}"
            }),
            CollectionType::NamingPolicies,
        )
        .unwrap();

        assert_eq!(payload["namingSequence"], json!(seq));
        assert_eq!(payload["validators"], json!([v2, v1]));
        assert_eq!(payload["template"], "dock{{sequence}}");
        assert!(payload.get("id").is_none());
        assert!(payload.get("_links").is_none());
    }

    #[test]
    fn test_excluded_fields_are_dropped() {
        let server = MemoryTransport::new();
        let payload = build(
            &server,
            json!({"name": "ad", "microsoftEndpoint": "dc01", "ou": "OU=Servers"}),
            CollectionType::MicrosoftAdPolicies,
        )
        .unwrap();
        assert_eq!(payload, json!({"name": "ad", "ou": "OU=Servers"}));
    }

    #[test]
    fn test_unsupported_link_value_is_dropped() {
        let server = MemoryTransport::new();
        let payload = build(
            &server,
            json!({"name": "x", "_links": {"odd": 3}}),
            CollectionType::PropertySets,
        )
        .unwrap();
        assert_eq!(payload, json!({"name": "x"}));
    }

    #[test]
    fn test_unresolved_reference_aborts_document() {
        let server = MemoryTransport::new().with_collections(&["namingSequences"]);
        let err = build(
            &server,
            json!({
                "name": "docker_port",
                "_links": {
                    "namingSequence": {"href": "/api/v3/onefuse/namingSequences/2/", "title": "missing"}
                }
            }),
            CollectionType::NamingPolicies,
        )
        .unwrap_err();
        assert!(matches!(err, PolicyError::ReferenceNotFound { .. }));
    }
}
