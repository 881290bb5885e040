use thiserror::Error;

/// Failures of the network exchange itself, as opposed to errors reported
/// by a provider inside a successful response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// DNS resolution or TCP/TLS connect failed
    #[error("connection failed: {0}")]
    Connect(String),
    /// The configured timeout elapsed before the exchange completed
    #[error("request timed out")]
    Timeout,
    /// Sending the request or reading the response failed
    #[error("request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// Short, stable name of the failure class, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Connect(_) => "connect",
            TransportError::Timeout => "timeout",
            TransportError::Request(_) => "request",
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}
