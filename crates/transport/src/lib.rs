//! Outbound transport used by filters to reach scoring services.
//!
//! This crate provides the one capability the recommendation core needs
//! from the network: send a request, get back a status and a body. It
//! handles:
//! - Describing requests without committing to an HTTP library
//! - Sending them through a shared reqwest client
//! - Mapping client failures and timeouts to [`TransportError`]
//!
//! A non-success status is *not* an error here; callers decide what a
//! 4xx/5xx means for them.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while talking to a scoring service
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },
}

/// HTTP verb of an outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(verb)
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A fully described request to a scoring service.
///
/// Built once per filter from the incoming query; sending it performs
/// no further transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub query: Vec<(String, String)>,
    /// JSON body, sent with `content-type: application/json`
    pub body: Option<serde_json::Value>,
}

impl OutboundRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// A POST carrying `body` as JSON
    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(HttpMethod::Post, url).with_body(body)
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

/// Status and body of a completed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Anything below 300 counts as success
    pub fn is_success(&self) -> bool {
        self.status < 300
    }
}

/// The fetch capability injected into filters.
///
/// Implementations must be `Send + Sync`: one transport is shared by every
/// filter of every request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return whatever the service answered.
    ///
    /// # Errors
    /// Returns [`TransportError`] when no response was received at all
    /// (connection failure, timeout). HTTP error statuses are returned as
    /// a normal [`RawResponse`].
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError>;
}

/// [`Transport`] backed by a pooled reqwest client.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method.into(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify_error(&request.url, e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(&request.url, e))?;

        debug!(
            "{} {} answered {} ({} bytes)",
            request.method,
            request.url,
            status,
            body.len()
        );
        Ok(RawResponse::new(status, body.to_vec()))
    }
}

fn classify_error(url: &str, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        debug!("Request to {} timed out", url);
        return TransportError::Timeout {
            url: url.to_string(),
        };
    }
    debug!("Request to {} failed: {}", url, err);
    TransportError::RequestFailed {
        url: url.to_string(),
        reason: err.to_string(),
    }
}
