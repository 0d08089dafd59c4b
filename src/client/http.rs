//! reqwest-backed transport
//!
//! A blocking client with HTTP basic auth and the fixed header set the Policy
//! Service expects on every request.

use std::fmt;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONNECTION, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;
use zeroize::Zeroizing;

use super::{ApiResponse, Method, Transport};
use crate::config::settings::ConnectionSettings;
use crate::error::{PolicyError, PolicyResult};

/// Authenticated session against one Policy Service instance
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_prefix: String,
    username: String,
    password: Zeroizing<String>,
}

impl HttpTransport {
    /// Open a session
    ///
    /// `tracking_id` is sent as the `Tracking-Id` header when present.
    pub fn new(
        connection: &ConnectionSettings,
        password: Zeroizing<String>,
        tracking_id: Option<&str>,
    ) -> PolicyResult<Self> {
        connection.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CONNECTION, HeaderValue::from_static("Keep-Alive"));
        insert_header(&mut headers, "x-origin-host", &connection.origin_host)?;
        insert_header(&mut headers, "source", &connection.source_header)?;
        if let Some(tracking_id) = tracking_id.filter(|id| !id.is_empty()) {
            insert_header(&mut headers, "tracking-id", tracking_id)?;
        }

        let client = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(!connection.verify_certs)
            .build()?;

        Ok(Self {
            client,
            base_url: connection.base_url(),
            api_prefix: connection.api_prefix.trim_end_matches('/').to_string(),
            username: connection.username.clone(),
            password,
        })
    }

    /// Base URL requests are issued against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Transport for HttpTransport {
    fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    fn send(&self, method: Method, path: &str, body: Option<&Value>) -> PolicyResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "request");

        let mut request = self
            .client
            .request(method.into(), &url)
            .basic_auth(&self.username, Some(self.password.as_str()));

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .map_err(|e| PolicyError::Transport(format!("{} {}: {}", method, url, e)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let text = response.text()?;

        debug!(%method, %url, status, "response");
        Ok(ApiResponse::new(status, headers, text))
    }
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) -> PolicyResult<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|e| PolicyError::Config(format!("Invalid value for header {}: {}", name, e)))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}
