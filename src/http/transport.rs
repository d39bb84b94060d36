//! HTTP transport seam.
//!
//! The gateway and session negotiator speak to the network through the
//! [`HttpTransport`] trait so tests can substitute a captured transport.
//! The default implementation wraps a shared [`reqwest::Client`].

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// HttpRequest
// ============================================================================

/// One HTTP exchange, fully described.
///
/// Query parameters are already encoded into `url`; `timeout` and `cache`
/// are transport concerns extracted from the caller's options.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method, including the platform's custom `MGET`.
    pub method: String,
    /// Fully built target URL.
    pub url: Url,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// JSON request body, if any.
    pub body: Option<Value>,
    /// Per-request timeout override.
    pub timeout: Option<Duration>,
    /// Response-cache hint; transports without a cache ignore it.
    pub cache: bool,
}

impl HttpRequest {
    /// Creates a request with no headers, body, or transport options.
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>, url: Url) -> Self {
        Self {
            method: method.into(),
            url,
            headers: Vec::new(),
            body: None,
            timeout: None,
            cache: false,
        }
    }

    /// Adds a header.
    #[inline]
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the JSON body.
    #[inline]
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

// ============================================================================
// HttpResponse
// ============================================================================

/// A decoded HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON response body; `Value::Null` when the body is empty.
    pub body: Value,
}

// ============================================================================
// HttpTransport
// ============================================================================

/// Executes a single HTTP exchange.
///
/// No retries at this layer; failures propagate to the immediate caller.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Executes the request and decodes the response body as JSON.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`] on a transport-level failure
    /// - [`Error::Status`] on a non-success status code
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

// ============================================================================
// ReqwestTransport
// ============================================================================

/// Default transport backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }

    /// Creates a transport from an existing client.
    #[inline]
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| Error::invalid_argument(format!("bad method: {}", request.method)))?;

        trace!(method = %method, url = %request.url, "HTTP request");

        let mut builder = self.client.request(method, request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        // `cache` is a host-framework hint with no reqwest analog.

        let response = builder.send().await?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);

        if !status.is_success() {
            debug!(status = status.as_u16(), "HTTP request rejected");
            return Err(Error::status(status.as_u16(), body));
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let url = Url::parse("https://api.flowthings.io/v0.1/acct/flow").expect("url");
        let request = HttpRequest::new("GET", url)
            .with_header("X-Auth-Account", "acct")
            .with_body(Value::Null);

        assert_eq!(request.method, "GET");
        assert_eq!(request.headers.len(), 1);
        assert!(request.body.is_some());
        assert!(!request.cache);
    }

    #[test]
    fn test_custom_method_parses() {
        // The platform's bulk read uses a non-standard method.
        assert!(Method::from_bytes(b"MGET").is_ok());
    }
}
