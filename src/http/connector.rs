//! Connection seam between the transport and the network.
//!
//! A [`Connector`] opens one [`Connection`] per call to a resolved
//! host and port; the connection performs exactly one exchange and is then
//! closed. [`ReqwestConnector`] is the production implementation.

use crate::http::error::TransportError;
use crate::http::request::PreparedRequest;
use crate::http::url::UrlComponents;
use async_trait::async_trait;
use reqwest::header::{CONNECTION, COOKIE};

/// Status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Opens connections to a resolved endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a connection to `url.host:url.port`, over TLS when
    /// [`UrlComponents::is_tls`] holds.
    async fn connect(&self, url: &UrlComponents) -> Result<Box<dyn Connection>, TransportError>;
}

/// A single open connection.
#[async_trait]
pub trait Connection: Send {
    /// Send `request` and read the full response.
    async fn execute(&mut self, request: &PreparedRequest) -> Result<HttpResponse, TransportError>;

    /// Release the connection. Must be safe to call more than once.
    fn close(&mut self);
}

/// [`Connector`] backed by a [`reqwest::Client`].
///
/// Idle connections are never kept, so each call opens and tears down its
/// own connection.
#[derive(Debug, Clone)]
pub struct ReqwestConnector {
    client: reqwest::Client,
}

impl ReqwestConnector {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| TransportError::Connect(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Connector for ReqwestConnector {
    async fn connect(&self, url: &UrlComponents) -> Result<Box<dyn Connection>, TransportError> {
        Ok(Box::new(ReqwestConnection {
            client: Some(self.client.clone()),
            origin: url.origin(),
            user: url.user.clone(),
            pass: url.pass.clone(),
        }))
    }
}

struct ReqwestConnection {
    /// `None` once closed
    client: Option<reqwest::Client>,
    origin: String,
    user: String,
    pass: String,
}

#[async_trait]
impl Connection for ReqwestConnection {
    async fn execute(&mut self, request: &PreparedRequest) -> Result<HttpResponse, TransportError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| TransportError::Request("connection already closed".to_string()))?;

        let url = format!("{}{}", self.origin, request.path);
        let mut builder = client
            .request(request.method.clone(), &url)
            .headers(request.headers.clone());

        if !self.user.is_empty() {
            let password = (!self.pass.is_empty()).then_some(self.pass.as_str());
            builder = builder.basic_auth(&self.user, password);
        }
        if !request.cookies.is_empty() {
            builder = builder.header(COOKIE, cookie_header(&request.cookies));
        }
        if let Some(timeout) = request.settings.timeout {
            builder = builder.timeout(timeout);
        }
        if request.settings.keep_alive == Some(false) {
            builder = builder.header(CONNECTION, "close");
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }

    fn close(&mut self) {
        self.client = None;
    }
}

fn cookie_header(cookies: &[(String, String)]) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}
