//! Transport Module
//!
//! The HTTP collaborator the dispatcher hands finished requests to, and the
//! default implementation over `reqwest`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

use crate::error::TransportError;

// == Outgoing Request ==
/// A fully built request, open to mutation by the request hook before send.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: Url,
    /// Header names are stored lower-cased
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl OutgoingRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Sets a header, replacing any value under the same name regardless of case.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

// == Transport Response ==
/// What came back, before any status or JSON interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// Final url after redirects
    pub url: String,
    /// Lower-cased header names; repeated headers are joined with ", "
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl TransportResponse {
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

// == Transport Trait ==
/// Sends a request and yields the raw response.
///
/// Implementations report connection-level problems as `TransportError`;
/// HTTP error statuses are a normal response here.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutgoingRequest) -> Result<TransportResponse, TransportError>;
}

// == HTTP Transport ==
/// Default transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<TransportResponse, TransportError> {
        let mut headers = HeaderMap::with_capacity(request.headers.len());
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::with_source(format!("bad header name {name}"), e))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::with_source(format!("bad header value for {name}"), e))?;
            headers.insert(name, value);
        }

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers = flatten_headers(response.headers());
        let body = response.text().await?;

        Ok(TransportResponse {
            status,
            url,
            headers,
            body,
        })
    }
}

/// Lower-cased name to value map; non-UTF-8 values are skipped.
fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        flat.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    flat
}
