//! HTTP transport for event envelopes.
//!
//! [`Transport`] is the seam between the dispatcher and the network so the
//! dispatcher can be exercised without sockets. [`HttpTransport`] is the
//! `reqwest` implementation used in production.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::DEFAULT_CONNECT_TIMEOUT;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for a single delivery attempt.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The underlying HTTP request failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Endpoint returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// OutboundRequest
// ---------------------------------------------------------------------------

/// A fully prepared POST: the body is the exact byte sequence that was signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl OutboundRequest {
    /// First header value with `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Sends one request, once. Returns the 2xx status code on success.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<u16, TransportError>;
}

// ---------------------------------------------------------------------------
// HttpTransport
// ---------------------------------------------------------------------------

/// `reqwest`-backed transport.
///
/// - connect timeout only; no total request timeout,
/// - certificate and hostname verification left on (the client default),
/// - redirects are not followed,
/// - a single attempt per request.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the given connect timeout.
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }

    /// Build a transport with the default 10 second connect timeout.
    pub fn with_defaults() -> Result<Self, TransportError> {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: OutboundRequest) -> Result<u16, TransportError> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }

        let response = builder.body(request.body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus(status.as_u16()));
        }
        Ok(status.as_u16())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
