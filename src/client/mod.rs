//! Transport layer for the Policy Service REST API
//!
//! Everything above this module talks to the Policy Service through the
//! [`Transport`] trait, which exposes exactly the four verbs the API needs.
//! Paths are relative to the API root (`/namingPolicies/?filter=...`).
//!
//! - `http`: the reqwest-backed implementation used by the CLI
//! - `query`: filter construction and collection listing parsing

pub mod http;
#[cfg(test)]
pub(crate) mod loopback;
#[cfg(test)]
pub(crate) mod memory;
pub mod query;

use std::fmt;

use serde_json::Value;

use crate::error::{PolicyError, PolicyResult};

pub use http::HttpTransport;
pub use query::{Filter, ListPage, QueryOutcome};

/// The `detail` the Policy Service returns for collections it does not have
pub const NOT_FOUND_DETAIL: &str = "Not found.";

/// HTTP verbs used against the Policy Service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(verb)
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A response from the Policy Service
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl ApiResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Raw body text
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parse the body as JSON
    ///
    /// A body that is not JSON means the server is not answering as the API
    /// does, so the error is not tied to any one document.
    pub fn json(&self, path: &str) -> PolicyResult<Value> {
        serde_json::from_str(&self.body).map_err(|e| {
            PolicyError::response(
                path,
                format!("body is not JSON (status {}): {}", self.status, e),
            )
        })
    }

    /// The `detail` message of an error body, if there is one
    pub fn detail(&self) -> Option<String> {
        let body: Value = serde_json::from_str(&self.body).ok()?;
        body.get("detail")?.as_str().map(str::to_string)
    }

    /// Whether this is the Policy Service's "Not found." answer
    pub fn is_not_found_detail(&self) -> bool {
        !self.is_success() && self.detail().as_deref() == Some(NOT_FOUND_DETAIL)
    }

    /// Convert into an error unless the status is a success
    pub fn error_for_status(self, path: &str) -> PolicyResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(PolicyError::server(self.status, path, self.body))
        }
    }
}

/// Authenticated request/response access to the Policy Service
pub trait Transport {
    /// Path prefix of the API root, used to relativize hrefs
    fn api_prefix(&self) -> &str;

    /// Issue a request against a path relative to the API root
    fn send(&self, method: Method, path: &str, body: Option<&Value>) -> PolicyResult<ApiResponse>;

    fn get(&self, path: &str, body: Option<&Value>) -> PolicyResult<ApiResponse> {
        self.send(Method::Get, path, body)
    }

    fn post(&self, path: &str, body: Option<&Value>) -> PolicyResult<ApiResponse> {
        self.send(Method::Post, path, body)
    }

    fn put(&self, path: &str, body: Option<&Value>) -> PolicyResult<ApiResponse> {
        self.send(Method::Put, path, body)
    }

    fn delete(&self, path: &str, body: Option<&Value>) -> PolicyResult<ApiResponse> {
        self.send(Method::Delete, path, body)
    }
}
