//! Blocking HTTP transport for invalidation requests.

use std::fmt::Debug;
use std::time::Duration;

use invalidator_core::InvalidationMethod;
use reqwest::blocking::Client;
use reqwest::header::HOST;
use url::Url;

/// Default timeout for a single invalidation round-trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A fully validated request, ready to go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationRequest {
    /// The cache operation.
    pub method: InvalidationMethod,
    /// Proxy origin with the invalidated path appended.
    pub url: Url,
    /// Value of the `Host` header: the public domain being invalidated.
    pub host: String,
}

/// The parts of a proxy response that matter for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, if it could be read.
    pub body: Option<String>,
}

impl TransportResponse {
    /// Creates a response with a body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(body.into()),
        }
    }

    /// Returns true for `200 OK`, the only status proxies answer bans with.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Errors raised before a response was received.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The proxy could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// The proxy did not answer in time.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The HTTP client failed for another reason.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl TransportError {
    /// Creates a new connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a new client error.
    pub fn client(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Client(err.to_string())
        }
    }
}

/// Sends invalidation requests to a cache proxy.
///
/// The call blocks until the proxy answers or the transport gives up.
/// Timeouts belong to the implementation and are reported as
/// [`TransportError::Timeout`].
pub trait Transport: Send + Sync + Debug {
    /// Sends one request and returns the proxy's response.
    fn send(&self, request: &InvalidationRequest) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with [`DEFAULT_TIMEOUT`].
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a transport with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::client(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &InvalidationRequest) -> Result<TransportResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| TransportError::client(e.to_string()))?;

        let response = self
            .client
            .request(method, request.url.clone())
            .header(HOST, request.host.as_str())
            .send()?;

        let status = response.status().as_u16();
        let body = response.text().ok();

        Ok(TransportResponse { status, body })
    }
}
