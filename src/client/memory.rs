//! In-memory Policy Service for tests
//!
//! Emulates the parts of the API the crate relies on: `iexact` filters,
//! paginated listings with `next` links, create/replace/delete by id and the
//! `"Not found."` answer for collections the instance does not have.

use std::cell::RefCell;
use std::collections::BTreeMap;

use reqwest::Url;
use serde_json::{json, Map, Value};

use super::{ApiResponse, Method, Transport, NOT_FOUND_DETAIL};
use crate::error::{PolicyError, PolicyResult};

pub const PREFIX: &str = "/api/v3/onefuse";

/// A request the transport received
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct State {
    collections: BTreeMap<String, Vec<Value>>,
    next_id: u64,
    requests: Vec<RecordedRequest>,
    failures: Vec<(Method, String, u16)>,
}

/// Fake Policy Service keyed by collection tag
#[derive(Debug)]
pub struct MemoryTransport {
    state: RefCell<State>,
    page_size: usize,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                next_id: 1,
                ..State::default()
            }),
            page_size: 50,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Register collections the instance supports
    pub fn with_collections(self, tags: &[&str]) -> Self {
        {
            let mut state = self.state.borrow_mut();
            for tag in tags {
                state.collections.entry(tag.to_string()).or_default();
            }
        }
        self
    }

    /// Store an object, assigning an id and self link; returns the self href
    pub fn insert(&self, tag: &str, object: Value) -> String {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        let stored = with_identity(object, tag, id);
        let href = self_href(tag, id);
        state.collections.entry(tag.to_string()).or_default().push(stored);
        href
    }

    /// Make requests with this method and path prefix fail with a status
    ///
    /// Status 0 simulates a connection failure.
    pub fn fail_on(&self, method: Method, path_prefix: &str, status: u16) {
        self.state
            .borrow_mut()
            .failures
            .push((method, path_prefix.to_string(), status));
    }

    pub fn objects(&self, tag: &str) -> Vec<Value> {
        self.state
            .borrow()
            .collections
            .get(tag)
            .cloned()
            .unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.borrow().requests.clone()
    }

    /// Requests other than GET
    pub fn mutations(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != Method::Get)
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state.borrow_mut().requests.clear();
    }

    fn handle(&self, method: Method, path: &str, body: Option<&Value>) -> ApiResponse {
        let (path_part, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };
        let segments: Vec<&str> = path_part.split('/').filter(|s| !s.is_empty()).collect();

        let Some(tag) = segments.first().map(|s| s.to_string()) else {
            return not_found();
        };

        let mut state = self.state.borrow_mut();
        if !state.collections.contains_key(&tag) {
            return not_found();
        }

        match (method, segments.len()) {
            (Method::Get, 1) => {
                let params = parse_query(query.unwrap_or_default());
                let terms = params
                    .get("filter")
                    .map(|f| parse_filter(f))
                    .unwrap_or_default();
                let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);

                let matches: Vec<Value> = state.collections[&tag]
                    .iter()
                    .filter(|object| matches_filter(object, &terms))
                    .cloned()
                    .collect();

                let start = (page - 1) * self.page_size;
                let items: Vec<Value> = matches.iter().skip(start).take(self.page_size).cloned().collect();
                let mut links = Map::new();
                if start + items.len() < matches.len() {
                    let next = next_href(&tag, page + 1, params.get("filter"));
                    links.insert("next".into(), json!({ "href": next }));
                }

                let mut embedded = Map::new();
                embedded.insert(tag.clone(), Value::Array(items));
                respond(
                    200,
                    json!({
                        "count": matches.len(),
                        "_embedded": embedded,
                        "_links": links,
                    }),
                )
            }
            (Method::Get, 2) => match find_index(&state.collections[&tag], segments[1]) {
                Some(idx) => respond(200, state.collections[&tag][idx].clone()),
                None => not_found(),
            },
            (Method::Post, 1) => {
                let Some(Value::Object(_)) = body else {
                    return respond(400, json!({"detail": "Expected a JSON object."}));
                };
                let id = state.next_id;
                state.next_id += 1;
                let stored = with_identity(body.cloned().unwrap_or_default(), &tag, id);
                state.collections.entry(tag.clone()).or_default().push(stored.clone());
                respond(201, stored)
            }
            (Method::Put, 2) => {
                let Some(Value::Object(_)) = body else {
                    return respond(400, json!({"detail": "Expected a JSON object."}));
                };
                let Some(idx) = find_index(&state.collections[&tag], segments[1]) else {
                    return not_found();
                };
                let id: u64 = segments[1].parse().unwrap_or_default();
                let stored = with_identity(body.cloned().unwrap_or_default(), &tag, id);
                if let Some(objects) = state.collections.get_mut(&tag) {
                    objects[idx] = stored.clone();
                }
                respond(200, stored)
            }
            (Method::Delete, 2) => {
                let Some(idx) = find_index(&state.collections[&tag], segments[1]) else {
                    return not_found();
                };
                if let Some(objects) = state.collections.get_mut(&tag) {
                    objects.remove(idx);
                }
                ApiResponse::new(204, Vec::new(), "")
            }
            _ => respond(405, json!({"detail": "Method not allowed."})),
        }
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemoryTransport {
    fn api_prefix(&self) -> &str {
        PREFIX
    }

    fn send(&self, method: Method, path: &str, body: Option<&Value>) -> PolicyResult<ApiResponse> {
        self.state.borrow_mut().requests.push(RecordedRequest {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });

        let failure = self
            .state
            .borrow()
            .failures
            .iter()
            .find(|(m, prefix, _)| *m == method && path.starts_with(prefix.as_str()))
            .map(|(_, _, status)| *status);
        if let Some(status) = failure {
            if status == 0 {
                return Err(PolicyError::Transport("connection refused".into()));
            }
            return Ok(respond(status, json!({"detail": "Injected failure."})));
        }

        Ok(self.handle(method, path, body))
    }
}

fn self_href(tag: &str, id: u64) -> String {
    format!("{}/{}/{}/", PREFIX, tag, id)
}

fn with_identity(object: Value, tag: &str, id: u64) -> Value {
    let mut fields = match object {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    let title = fields.get("name").cloned().unwrap_or(Value::Null);
    fields.insert("id".into(), json!(id));
    let mut links = match fields.remove("_links") {
        Some(Value::Object(links)) => links,
        _ => Map::new(),
    };
    links.insert("self".into(), json!({"href": self_href(tag, id), "title": title}));
    fields.insert("_links".into(), Value::Object(links));
    Value::Object(fields)
}

fn find_index(objects: &[Value], id: &str) -> Option<usize> {
    objects
        .iter()
        .position(|o| o.get("id").map(|v| v.to_string()) == Some(id.to_string()))
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
    Url::parse(&format!("http://memory/?{}", query))
        .map(|url| {
            url.query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        })
        .unwrap_or_default()
}

fn next_href(tag: &str, page: usize, filter: Option<&String>) -> String {
    let mut url = Url::parse(&format!("http://memory{}/{}/", PREFIX, tag)).unwrap();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("page", &page.to_string());
        if let Some(filter) = filter {
            pairs.append_pair("filter", filter);
        }
    }
    format!("{}?{}", url.path(), url.query().unwrap_or_default())
}

fn parse_filter(filter: &str) -> Vec<(String, String)> {
    filter
        .split(';')
        .filter_map(|term| term.split_once(".iexact:"))
        .map(|(field, value)| (field.to_string(), value.trim_matches('"').to_string()))
        .collect()
}

fn matches_filter(object: &Value, terms: &[(String, String)]) -> bool {
    terms.iter().all(|(field, value)| {
        object
            .get(field)
            .and_then(Value::as_str)
            .map(|actual| actual.to_lowercase() == value.to_lowercase())
            .unwrap_or(false)
    })
}

fn respond(status: u16, body: Value) -> ApiResponse {
    ApiResponse::new(
        status,
        vec![("Content-Type".into(), "application/json".into())],
        body.to_string(),
    )
}

fn not_found() -> ApiResponse {
    respond(404, json!({ "detail": NOT_FOUND_DETAIL }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_and_create() {
        let server = MemoryTransport::new().with_collections(&["endpoints"]);
        server.insert("endpoints", json!({"name": "DC01", "type": "microsoft"}));
        server.insert("endpoints", json!({"name": "dc01", "type": "infoblox"}));

        let response = server
            .get(r#"/endpoints/?filter=name.iexact:"dc01";type.iexact:"MICROSOFT""#, None)
            .unwrap();
        let body = response.json("/endpoints/").unwrap();
        assert_eq!(body["count"], 1);
        assert_eq!(body["_embedded"]["endpoints"][0]["id"], 1);

        let created = server
            .post("/endpoints/", Some(&json!({"name": "new", "type": "bluecat"})))
            .unwrap();
        assert_eq!(created.status(), 201);
        assert_eq!(server.objects("endpoints").len(), 3);
    }

    #[test]
    fn test_unknown_collection_is_not_found() {
        let server = MemoryTransport::new();
        let response = server.get("/vraPolicies/", None).unwrap();
        assert!(response.is_not_found_detail());
    }

    #[test]
    fn test_put_replaces_object() {
        let server = MemoryTransport::new().with_collections(&["validators"]);
        server.insert("validators", json!({"name": "v", "regex": "a"}));
        let response = server
            .put("/validators/1/", Some(&json!({"name": "v", "regex": "b"})))
            .unwrap();
        assert!(response.is_success());
        assert_eq!(server.objects("validators")[0]["regex"], "b");
        assert_eq!(server.objects("validators")[0]["id"], 1);
    }
}
