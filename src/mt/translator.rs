//! Machine Translation trait and shared validation
//!
//! This module defines the `Translator` trait for provider abstraction, so
//! callers can hold any backend (Google web endpoint, Google Cloud v2,
//! Microsoft) behind one interface.
//!
//! # Example
//!
//! ```ignore
//! use comlib_translate::mt::{GoogleTranslateProvider, Translator};
//! use comlib_translate::http::Params;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleTranslateProvider::from_env()?;
//!     let params = Params::new().with("source", "en").with("target", "fr");
//!     let result = provider.translate("Hello, world!", &params).await?;
//!     println!("{:?}", result.text());
//!     Ok(())
//! }
//! ```

use crate::http::Params;
use crate::mt::error::{MtError, MtResult};
use crate::mt::result::CanonicalResult;
use async_trait::async_trait;

/// Texts of this many characters or more are rejected
pub const MAX_TEXT_CHARS: usize = 5000;

/// Generic trait for machine translation providers
///
/// All methods are async to support I/O-bound operations like network requests.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a single text
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate
    /// * `params` - Provider-specific parameters (language codes, format, ...)
    ///   merged over the provider's defaults
    ///
    /// # Returns
    ///
    /// * `Ok(CanonicalResult)` - Translated text, or the error the provider reported
    /// * `Err(MtError)` - Validation, configuration, transport or decoding failure
    async fn translate(&self, text: &str, params: &Params) -> MtResult<CanonicalResult>;

    /// Get the name of this translation provider
    ///
    /// Used for logging and debugging to identify which provider handled a translation.
    fn provider_name(&self) -> &str;
}

/// Reject texts of [`MAX_TEXT_CHARS`] characters or more.
pub fn validate_text_length(text: &str) -> MtResult<()> {
    if text.chars().count() >= MAX_TEXT_CHARS {
        return Err(MtError::ValidationError(format!(
            "Maximum number of characters exceeded: {}",
            MAX_TEXT_CHARS
        )));
    }
    Ok(())
}

/// Reject a blank API key.
///
/// Keyed providers check this when constructed and again before each
/// request, since the key can be replaced through a setter.
pub fn require_api_key(api_key: &str) -> MtResult<()> {
    if api_key.trim().is_empty() {
        return Err(MtError::ConfigError("API key cannot be empty".to_string()));
    }
    Ok(())
}
