use thiserror::Error;

/// Error types for the Machine Translation module
///
/// Errors reported by a provider inside a well-formed response are not
/// errors here; they come back as [`CanonicalResult::Failed`].
///
/// [`CanonicalResult::Failed`]: crate::mt::CanonicalResult::Failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtError {
    /// Input rejected before any request was built
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Provider is not configured well enough to send a request
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// The network exchange failed
    #[error("Transport error: {0}")]
    TransportError(#[from] crate::http::TransportError),
    /// Empty or unparseable response, typically the provider blocking
    /// automated traffic
    #[error("Protocol anomaly: {0}")]
    ProtocolAnomaly(String),
    /// Response parsed but did not have the expected shape
    #[error("Decode error: {0}")]
    DecodeError(String),
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;
