//! Collection queries
//!
//! Builds `filter=name.iexact:"<value>";<field>.iexact:"<value>"` queries and
//! parses the paginated listing envelope:
//!
//! ```json
//! { "count": 2, "_embedded": { "<collection>": [ ... ] }, "_links": { "next": { "href": "..." } } }
//! ```
//!
//! Filter values are form-encoded into the query string, so names containing
//! `&`, `#` or `+` reach the server intact.

use reqwest::Url;
use serde_json::Value;

use super::Transport;
use crate::error::{PolicyError, PolicyResult};
use crate::models::CollectionType;

/// Case-insensitive exact-match filter on one or more fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    terms: Vec<(String, String)>,
}

impl Filter {
    /// Filter on the `name` field
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            terms: vec![("name".to_string(), name.into())],
        }
    }

    /// Add another field to match
    pub fn and(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.terms.push((field.into(), value.into()));
        self
    }

    /// Render the filter expression
    pub fn expression(&self) -> String {
        self.terms
            .iter()
            .map(|(field, value)| format!("{}.iexact:\"{}\"", field, value))
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Path of the filtered collection listing, with the query encoded
    pub fn path(&self, collection: &CollectionType) -> PolicyResult<String> {
        let list_path = collection.list_path();
        let mut url = Url::parse("http://localhost/")
            .and_then(|base| base.join(&list_path))
            .map_err(|e| PolicyError::Config(format!("Invalid collection path {}: {}", list_path, e)))?;
        url.query_pairs_mut().append_pair("filter", &self.expression());
        Ok(format!("{}?{}", url.path(), url.query().unwrap_or_default()))
    }
}

/// One page of a collection listing
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Total matches reported by the server
    pub count: usize,
    /// Objects embedded in this page
    pub items: Vec<Value>,
    /// Href of the next page, if any
    pub next: Option<String>,
}

impl ListPage {
    /// Parse a listing envelope for the given collection
    pub fn from_value(body: &Value, collection: &CollectionType) -> PolicyResult<Self> {
        let items = match body
            .get("_embedded")
            .and_then(|embedded| embedded.get(collection.as_str()))
        {
            Some(Value::Array(items)) => items.clone(),
            Some(_) => {
                return Err(PolicyError::response(
                    collection.list_path(),
                    format!("_embedded.{} is not a list", collection),
                ))
            }
            None => Vec::new(),
        };

        let count = body
            .get("count")
            .and_then(Value::as_u64)
            .map(|c| c as usize)
            .unwrap_or(items.len());

        let next = body
            .get("_links")
            .and_then(|links| links.get("next"))
            .and_then(|next| next.get("href"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self { count, items, next })
    }
}

/// Result of querying a collection
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    /// The collection answered; the first page of matches
    Found(ListPage),
    /// The target does not have this collection (older Policy Service version)
    CollectionUnsupported,
}

/// Fetch one listing page, mapping the "Not found." answer to an outcome
///
/// Any other non-success status is an error.
pub fn fetch_page(
    transport: &dyn Transport,
    collection: &CollectionType,
    path: &str,
) -> PolicyResult<QueryOutcome> {
    let response = transport.get(path, None)?;

    if response.is_not_found_detail() {
        return Ok(QueryOutcome::CollectionUnsupported);
    }

    let response = response.error_for_status(path)?;
    let body = response.json(path)?;
    Ok(QueryOutcome::Found(ListPage::from_value(&body, collection)?))
}

/// Query a collection with a filter
pub fn find(
    transport: &dyn Transport,
    collection: &CollectionType,
    filter: &Filter,
) -> PolicyResult<QueryOutcome> {
    fetch_page(transport, collection, &filter.path(collection)?)
}

/// The `id` of a listed object, rendered as a path segment
pub fn object_id(object: &Value) -> Option<String> {
    match object.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// The `_links.self.href` of a listed object
pub fn self_href(object: &Value) -> Option<&str> {
    object.get("_links")?.get("self")?.get("href")?.as_str()
}
