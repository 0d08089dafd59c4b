//! Policy document model
//!
//! A policy document is kept as the raw JSON object the Policy Service
//! returned, so that unknown fields survive a backup/restore cycle untouched.
//! Accessors expose the handful of fields the restore algorithm needs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PolicyError, PolicyResult};

/// Field holding the server-assigned identifier
pub const ID_FIELD: &str = "id";
/// Field holding the hyperlink map
pub const LINKS_FIELD: &str = "_links";
/// Link name pointing at the document itself
pub const SELF_LINK: &str = "self";

/// A single hyperlink to another policy object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub title: String,
}

/// The value of a named `_links` entry
#[derive(Debug, Clone, PartialEq)]
pub enum LinkValue {
    Single(Link),
    List(Vec<Link>),
    /// Neither an object nor an array; carried so callers can report it
    Unsupported(Value),
}

/// The field that disambiguates objects sharing a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discriminator<'a> {
    pub field: &'static str,
    pub value: &'a str,
}

/// A policy object as stored on disk or returned by the Policy Service
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PolicyDocument {
    fields: Map<String, Value>,
}

impl PolicyDocument {
    /// Build a document from a JSON value, validating its shape
    ///
    /// `source_name` is used in error messages only.
    pub fn from_value(value: Value, source_name: &str) -> PolicyResult<Self> {
        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(PolicyError::invalid_document(
                    source_name,
                    format!("expected a JSON object, found {}", json_kind(&other)),
                ))
            }
        };

        match fields.get("name") {
            Some(Value::String(_)) => {}
            Some(_) => {
                return Err(PolicyError::invalid_document(
                    source_name,
                    "field 'name' is not a string",
                ))
            }
            None => {
                return Err(PolicyError::invalid_document(
                    source_name,
                    "missing field 'name'",
                ))
            }
        }

        if let Some(links) = fields.get(LINKS_FIELD) {
            if !links.is_object() {
                return Err(PolicyError::invalid_document(
                    source_name,
                    "field '_links' is not an object",
                ));
            }
        }

        Ok(Self { fields })
    }

    /// Parse a document from JSON text
    pub fn parse(content: &str, source_name: &str) -> PolicyResult<Self> {
        let value: Value = serde_json::from_str(content).map_err(|e| {
            PolicyError::invalid_document(source_name, format!("not valid JSON: {}", e))
        })?;
        Self::from_value(value, source_name)
    }

    /// The object's display name
    pub fn name(&self) -> &str {
        self.fields
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// The discriminating type field, `type` taking precedence over `endpointType`
    pub fn discriminator(&self) -> Option<Discriminator<'_>> {
        ["type", "endpointType"].into_iter().find_map(|field| {
            self.fields
                .get(field)
                .and_then(Value::as_str)
                .map(|value| Discriminator { field, value })
        })
    }

    /// The document's own `type` field
    pub fn type_field(&self) -> Option<&str> {
        self.fields.get("type").and_then(Value::as_str)
    }

    /// The server-assigned identifier, rendered as a path segment
    pub fn id(&self) -> Option<String> {
        match self.fields.get(ID_FIELD)? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// Href of the `_links.self` entry
    pub fn self_href(&self) -> Option<&str> {
        self.links_map()?
            .get(SELF_LINK)?
            .get("href")?
            .as_str()
    }

    /// Every `_links` entry except `self`, ordered by key
    ///
    /// Entries of a link list keep their stored order.
    pub fn links(&self, source_name: &str) -> PolicyResult<Vec<(String, LinkValue)>> {
        let Some(links) = self.links_map() else {
            return Ok(Vec::new());
        };

        let mut result = Vec::new();
        for (key, value) in links {
            if key == SELF_LINK {
                continue;
            }

            let link = match value {
                Value::Object(_) => LinkValue::Single(parse_link(value, key, source_name)?),
                Value::Array(items) => LinkValue::List(
                    items
                        .iter()
                        .map(|item| parse_link(item, key, source_name))
                        .collect::<PolicyResult<Vec<_>>>()?,
                ),
                other => LinkValue::Unsupported(other.clone()),
            };
            result.push((key.clone(), link));
        }

        Ok(result)
    }

    /// Top-level fields
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consume the document into a plain JSON value
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    fn links_map(&self) -> Option<&Map<String, Value>> {
        self.fields.get(LINKS_FIELD)?.as_object()
    }
}

fn parse_link(value: &Value, key: &str, source_name: &str) -> PolicyResult<Link> {
    Link::deserialize(value).map_err(|e| {
        PolicyError::invalid_document(source_name, format!("malformed link '{}': {}", key, e))
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn naming_policy() -> PolicyDocument {
        PolicyDocument::from_value(
            json!({
                "_links": {
                    "self": {"href": "/api/v3/onefuse/namingPolicies/4/", "title": "docker_port"},
                    "namingSequence": {"href": "/api/v3/onefuse/namingSequences/2/", "title": "BASE10_port"},
                    "validators": [
                        {"href": "/api/v3/onefuse/validators/1/", "title": "dns_check"},
                        {"href": "/api/v3/onefuse/validators/3/", "title": "ad_check"}
                    ]
                },
                "id": 4,
                "name": "docker_port",
                "template": "{{sequence}}"
            }),
            "docker_port.json",
        )
        .unwrap()
    }

    #[test]
    fn test_accessors() {
        let doc = naming_policy();
        assert_eq!(doc.name(), "docker_port");
        assert_eq!(doc.id().as_deref(), Some("4"));
        assert_eq!(doc.self_href(), Some("/api/v3/onefuse/namingPolicies/4/"));
        assert!(doc.discriminator().is_none());
    }

    #[test]
    fn test_links_skip_self_and_keep_order() {
        let doc = naming_policy();
        let links = doc.links("docker_port.json").unwrap();
        let keys: Vec<&str> = links.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["namingSequence", "validators"]);

        let validators = links.iter().find(|(k, _)| k == "validators").unwrap();
        match &validators.1 {
            LinkValue::List(items) => {
                assert_eq!(items[0].title, "dns_check");
                assert_eq!(items[1].title, "ad_check");
            }
            other => panic!("expected a list, got {:?}", other),
        }
    }

    #[test]
    fn test_links_are_ordered_by_key() {
        let doc = PolicyDocument::from_value(
            json!({
                "name": "p",
                "_links": {
                    "zone": {"href": "/api/v3/onefuse/dnsPolicies/1/", "title": "z"},
                    "self": {"href": "/api/v3/onefuse/ipamPolicies/2/", "title": "p"},
                    "alpha": {"href": "/api/v3/onefuse/validators/3/", "title": "a"}
                }
            }),
            "p.json",
        )
        .unwrap();
        let keys: Vec<String> = doc
            .links("p.json")
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["alpha", "zone"]);
    }

    #[test]
    fn test_discriminator_prefers_type() {
        let doc = PolicyDocument::from_value(
            json!({"name": "dc01", "type": "microsoft", "endpointType": "other"}),
            "dc01",
        )
        .unwrap();
        let disc = doc.discriminator().unwrap();
        assert_eq!(disc.field, "type");
        assert_eq!(disc.value, "microsoft");

        let doc = PolicyDocument::from_value(
            json!({"name": "sc", "endpointType": "servicenow"}),
            "sc",
        )
        .unwrap();
        assert_eq!(doc.discriminator().unwrap().field, "endpointType");
    }

    #[test]
    fn test_rejects_non_objects_and_missing_name() {
        let err = PolicyDocument::from_value(json!([1, 2]), "list.json").unwrap_err();
        assert!(err.to_string().contains("expected a JSON object"));

        let err = PolicyDocument::from_value(json!({"id": 1}), "noname.json").unwrap_err();
        assert!(err.to_string().contains("missing field 'name'"));
    }

    #[test]
    fn test_malformed_link_is_invalid_document() {
        let doc = PolicyDocument::from_value(
            json!({"name": "x", "_links": {"endpoint": {"href": "/endpoints/1/"}}}),
            "x.json",
        )
        .unwrap();
        let err = doc.links("x.json").unwrap_err();
        assert!(matches!(err, PolicyError::InvalidDocument { .. }));
    }

    #[test]
    fn test_unsupported_link_value() {
        let doc = PolicyDocument::from_value(
            json!({"name": "x", "_links": {"odd": "text"}}),
            "x.json",
        )
        .unwrap();
        let links = doc.links("x.json").unwrap();
        assert_eq!(links[0].1, LinkValue::Unsupported(json!("text")));
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = PolicyDocument::parse("{not json", "broken.json").unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
