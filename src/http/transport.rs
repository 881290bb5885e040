//! HTTP transport
//!
//! [`Transport`] runs one request/response exchange per call: it resolves
//! the URL, opens a connection through its [`Connector`], builds the request
//! and sends it once. The connection is closed on every exit path. There
//! are no retries; failures surface to the caller immediately.
//!
//! # Example
//!
//! ```ignore
//! use comlib_translate::http::{Params, RequestOptions, Transport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = Transport::new()?;
//!     let response = transport
//!         .get("https://example.com/search", RequestOptions::new()
//!             .with_data(Params::new().with("q", "rust")))
//!         .await?;
//!     println!("{} {}", response.status, response.body);
//!     Ok(())
//! }
//! ```

use crate::http::connector::{Connection, Connector, HttpResponse, ReqwestConnector};
use crate::http::error::TransportError;
use crate::http::query::Payload;
use crate::http::request::{RequestOptions, configure_request};
use crate::http::url::parse_url;
use reqwest::Method;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

/// Outcome of the most recent exchange, kept for introspection only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    /// Full URL the request was sent to, including the query string
    pub url: String,
    pub method: Method,
    /// `None` when no response was received
    pub status: Option<u16>,
    pub error: Option<TransportError>,
}

/// Closes the wrapped connection when dropped.
struct ConnectionGuard(Box<dyn Connection>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// One-shot HTTP transport over a pluggable [`Connector`].
pub struct Transport {
    connector: Arc<dyn Connector>,
    /// Base options every call is merged over
    options: RequestOptions,
    last: Mutex<Option<Diagnostics>>,
}

impl Transport {
    /// Transport backed by a [`ReqwestConnector`]
    pub fn new() -> Result<Self, TransportError> {
        Ok(Self::with_connector(Arc::new(ReqwestConnector::new()?)))
    }

    pub fn with_connector(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            options: RequestOptions::default(),
            last: Mutex::new(None),
        }
    }

    /// Builder form of [`Transport::set_options`]
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the base options. Per-call options are merged over these.
    pub fn set_options(&mut self, options: RequestOptions) {
        self.options = options;
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<HttpResponse, TransportError> {
        self.request("GET", url, options).await
    }

    /// `POST` with `data` as the body
    pub async fn post(
        &self,
        url: &str,
        data: impl Into<Payload>,
        mut options: RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        options.data = Some(data.into());
        self.request("POST", url, options).await
    }

    /// `POST` with `json` serialized as the body
    pub async fn json(
        &self,
        url: &str,
        json: Value,
        mut options: RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        options.json = Some(json);
        self.request("POST", url, options).await
    }

    /// Send a single request.
    ///
    /// `method` applies only when `options` does not name one itself.
    pub async fn request(
        &self,
        method: &str,
        url: &str,
        mut options: RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        if options.method.is_none() {
            options.method = Some(method.to_string());
        }

        let info = parse_url(url);
        let request = configure_request(&info, &self.options, options);
        let full_url = format!("{}{}", info.origin(), request.path);

        let result = match self.connector.connect(&info).await {
            Ok(connection) => {
                let mut guard = ConnectionGuard(connection);
                guard.0.execute(&request).await
            }
            Err(err) => Err(err),
        };

        let diagnostics = Diagnostics {
            url: full_url,
            method: request.method.clone(),
            status: result.as_ref().ok().map(|response| response.status),
            error: result.as_ref().err().cloned(),
        };
        match &diagnostics.error {
            None => info!(
                url = %diagnostics.url,
                method = %diagnostics.method,
                status = ?diagnostics.status,
                "request completed"
            ),
            Some(err) => warn!(
                url = %diagnostics.url,
                method = %diagnostics.method,
                kind = err.kind(),
                error = %err,
                "request failed"
            ),
        }
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(diagnostics);

        result
    }

    /// Full URL of the most recent request
    pub fn last_url(&self) -> Option<String> {
        self.last_diagnostics().map(|diagnostics| diagnostics.url)
    }

    pub fn last_diagnostics(&self) -> Option<Diagnostics> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
