//! The seam between the client and the network.

use crate::request::HttpRequest;
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

/// Sends a request and returns the raw response.
///
/// Implementations are shared between concurrent calls and must report
/// connection failures and timeouts as [`TransportError`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<ClientResponse, TransportError>;
}

/// Status code and raw body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ClientResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// No HTTP response could be obtained.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            "request timed out"
        } else if error.is_connect() {
            "could not connect"
        } else {
            "HTTP request failed"
        };
        Self::with_source(message, error)
    }
}

/// [`Transport`] backed by a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// If creating a [reqwest::Client] fails.
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
        })
    }

    /// Create a transport that sends a specific `User-Agent`.
    ///
    /// # Errors
    ///
    /// If creating a [reqwest::Client] fails.
    pub fn new_with_user_agent(user_agent: &str) -> reqwest::Result<Self> {
        Ok(Self {
            client: Client::builder().user_agent(user_agent).build()?,
        })
    }

    /// Wrap an already configured client, e.g. one with timeouts or a proxy.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<ClientResponse, TransportError> {
        let url = request.url();
        debug!(method = %request.method, path = url.path(), "sending request");

        let mut builder = self
            .client
            .request(request.method, url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!(status, bytes = body.len(), "received response");

        Ok(ClientResponse { status, body })
    }
}
