//! Hyperlink helpers
//!
//! The Policy Service hands out hrefs as absolute paths under its API prefix
//! (`/api/v3/onefuse/namingSequences/7/`) or as full URLs. The transport
//! addresses everything relative to the API root, so hrefs are normalized
//! here before they are requested or inspected.

use reqwest::Url;

use super::collection::CollectionType;

/// Base that relative hrefs are resolved against before the origin is dropped
const RESOLVE_BASE: &str = "http://localhost/";

/// Turn an href into a path relative to the API root
///
/// Scheme and authority are dropped, then the API prefix. Query strings are
/// preserved so that pagination cursors survive.
pub fn relative_path(href: &str, api_prefix: &str) -> String {
    let parsed = Url::parse(RESOLVE_BASE).and_then(|base| base.join(href));
    let path_and_query = match parsed {
        Ok(url) => match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        },
        Err(_) => href.to_string(),
    };

    let prefix = api_prefix.trim_end_matches('/');
    let relative = if prefix.is_empty() {
        path_and_query.as_str()
    } else {
        match path_and_query.strip_prefix(prefix) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') => rest,
            _ => path_and_query.as_str(),
        }
    };

    if relative.starts_with('/') {
        relative.to_string()
    } else {
        format!("/{}", relative)
    }
}

/// The collection an href points into
pub fn collection_of(href: &str, api_prefix: &str) -> Option<CollectionType> {
    let path = relative_path(href, api_prefix);
    let path = path.split('?').next().unwrap_or_default();
    path.trim_start_matches('/')
        .split('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .and_then(|segment| segment.parse().ok())
}
