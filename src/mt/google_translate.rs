//! Google Cloud Translation v2 provider
//!
//! This module integrates with Google Translate API v2. Text is posted as an
//! `application/x-www-form-urlencoded` body and the response is decoded by
//! [`CloudV2Decoder`].
//!
//! # Authentication
//!
//! The provider loads the API key from the `GOOGLE_TRANSLATE_API_KEY`
//! environment variable. Obtain a key from:
//! https://console.cloud.google.com/
//!
//! # Example
//!
//! ```ignore
//! use comlib_translate::http::Params;
//! use comlib_translate::mt::{GoogleTranslateProvider, Translator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleTranslateProvider::from_env()?;
//!     let params = Params::new().with("source", "en").with("target", "fr");
//!     let result = provider.translate("Hello, world!", &params).await?;
//!     println!("{:?}", result);
//!     Ok(())
//! }
//! ```

use crate::http::{Params, RequestOptions, Transport};
use crate::mt::decoder::{CloudV2Decoder, Decoder};
use crate::mt::error::{MtError, MtResult};
use crate::mt::result::CanonicalResult;
use crate::mt::translator::{Translator, require_api_key, validate_text_length};
use async_trait::async_trait;
use tracing::warn;

pub const TRANSLATE_API: &str = "https://translation.googleapis.com/language/translate/v2";

/// Google Translate API v2 provider
pub struct GoogleTranslateProvider {
    /// API key for authentication
    api_key: String,
    /// Transport used for every request
    transport: Transport,
    /// Endpoint the form is posted to
    base_url: String,
    decoder: CloudV2Decoder,
}

impl GoogleTranslateProvider {
    /// Create a new GoogleTranslateProvider with an explicit API key
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(MtError)` - If API key is empty or HTTP client creation fails
    pub fn new(api_key: String) -> MtResult<Self> {
        require_api_key(&api_key)?;

        Ok(Self {
            api_key,
            transport: Transport::new()?,
            base_url: TRANSLATE_API.to_string(),
            decoder: CloudV2Decoder,
        })
    }

    /// Create a GoogleTranslateProvider from the `GOOGLE_TRANSLATE_API_KEY` environment variable
    pub fn from_env() -> MtResult<Self> {
        let api_key = std::env::var("GOOGLE_TRANSLATE_API_KEY").map_err(|_| {
            MtError::ConfigError(
                "GOOGLE_TRANSLATE_API_KEY environment variable not set".to_string(),
            )
        })?;

        Self::new(api_key)
    }

    /// Replace the transport, e.g. to share base options or to use a mock connector
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Post to `base_url` instead of the public endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = api_key;
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Defaults sent with every request, before caller params are applied
    fn default_params() -> Params {
        Params::new()
            .with("q", "")
            .with("key", "")
            .with("model", "nmt")
            .with("format", "html")
            .with("source", "zh-CN")
            .with("target", "en")
    }

    /// Form body for `text`: defaults, then `params`, then the text and key.
    fn form_params(&self, text: &str, params: &Params) -> Params {
        let mut form = Self::default_params();
        form.merge(params);
        form.insert("q", text);
        form.insert("key", self.api_key.as_str());
        form
    }
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl Translator for GoogleTranslateProvider {
    async fn translate(&self, text: &str, params: &Params) -> MtResult<CanonicalResult> {
        require_api_key(&self.api_key)?;
        validate_text_length(text)?;

        let form = self.form_params(text, params);
        let options = RequestOptions::new().with_header("Accept", "application/json");
        let response = self.transport.post(&self.base_url, form, options).await?;

        if !response.is_success() {
            warn!(status = response.status, "Google Translate API returned an error status");
        }

        self.decoder.decode(&response.body)
    }

    fn provider_name(&self) -> &str {
        "Google Translate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{FORM_CONTENT_TYPE, MockConnector};
    use crate::mt::translator::MAX_TEXT_CHARS;
    use reqwest::Method;
    use std::sync::Arc;

    fn provider_with(mock: &Arc<MockConnector>) -> GoogleTranslateProvider {
        GoogleTranslateProvider::new("test-key".to_string())
            .unwrap()
            .with_transport(Transport::with_connector(mock.clone()))
    }

    // ========== Initialization Tests ==========

    #[test]
    fn test_new_with_valid_key() {
        let provider = GoogleTranslateProvider::new("test-api-key".to_string());
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().provider_name(), "Google Translate");
    }

    #[test]
    fn test_new_with_empty_key() {
        let result = GoogleTranslateProvider::new("".to_string());
        match result {
            Err(MtError::ConfigError(msg)) => assert!(msg.contains("empty")),
            _ => panic!("Expected ConfigError"),
        }
    }

    #[test]
    fn test_new_with_whitespace_key() {
        let result = GoogleTranslateProvider::new("   ".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_from_env_without_key() {
        // Ensure env var is not set for this test
        unsafe {
            std::env::remove_var("GOOGLE_TRANSLATE_API_KEY");
        }
        let result = GoogleTranslateProvider::from_env();
        match result {
            Err(MtError::ConfigError(msg)) => assert!(msg.contains("not set")),
            _ => panic!("Expected ConfigError"),
        }
    }

    #[test]
    fn test_set_api_key() {
        let mut provider = GoogleTranslateProvider::new("old".to_string()).unwrap();
        provider.set_api_key("new".to_string());
        assert_eq!(provider.api_key(), "new");
    }

    #[tokio::test]
    async fn test_cleared_key_fails_before_request() {
        let mock = Arc::new(MockConnector::new());
        let mut provider = provider_with(&mock);
        provider.set_api_key(String::new());

        let result = provider.translate("hello", &Params::new()).await;
        assert!(matches!(result, Err(MtError::ConfigError(_))));
        assert_eq!(mock.call_count(), 0);
    }

    // ========== Request Tests ==========

    #[tokio::test]
    async fn test_translate_posts_form_body() {
        let mock = Arc::new(MockConnector::new().respond(
            200,
            r#"{"data":{"translations":[{"translatedText":"bonjour"}]}}"#,
        ));
        let provider = provider_with(&mock);
        let params = Params::new().with("source", "en").with("target", "fr");

        let result = provider.translate("hello", &params).await.unwrap();
        assert_eq!(result, CanonicalResult::translated("bonjour"));

        let recorded = mock.last_request().unwrap();
        assert_eq!(recorded.url.host, "translation.googleapis.com");
        assert!(recorded.url.is_tls());
        assert_eq!(recorded.request.method, Method::POST);
        assert_eq!(recorded.request.path, "/language/translate/v2");
        assert_eq!(recorded.request.header("content-type"), Some(FORM_CONTENT_TYPE));
        assert_eq!(recorded.request.header("accept"), Some("application/json"));
        assert_eq!(
            recorded.request.body.as_deref(),
            Some("q=hello&key=test-key&model=nmt&format=html&source=en&target=fr")
        );
    }

    #[tokio::test]
    async fn test_translate_maps_provider_error() {
        let mock = Arc::new(MockConnector::new().respond(
            403,
            r#"{"error":{"code":403,"message":"quota exceeded"}}"#,
        ));
        let result = provider_with(&mock)
            .translate("hello", &Params::new())
            .await
            .unwrap();
        assert_eq!(result, CanonicalResult::failed(403, "quota exceeded"));
    }

    #[tokio::test]
    async fn test_translate_empty_body_is_protocol_anomaly() {
        let mock = Arc::new(MockConnector::new().respond(200, ""));
        let result = provider_with(&mock).translate("hello", &Params::new()).await;
        assert!(matches!(result, Err(MtError::ProtocolAnomaly(_))));
    }

    // ========== Validation Tests ==========

    #[tokio::test]
    async fn test_translate_text_too_long() {
        let mock = Arc::new(MockConnector::new());
        let long_text = "x".repeat(MAX_TEXT_CHARS + 1);
        let result = provider_with(&mock).translate(&long_text, &Params::new()).await;
        match result {
            Err(MtError::ValidationError(msg)) => assert!(msg.contains("exceeded")),
            _ => panic!("Expected ValidationError"),
        }
        assert_eq!(mock.call_count(), 0);
    }

    // ========== Debug Implementation Test ==========

    #[test]
    fn test_debug_output() {
        let provider = GoogleTranslateProvider::new("test-key".to_string()).unwrap();
        let debug_str = format!("{:?}", provider);
        // API key should be masked
        assert!(debug_str.contains("***"));
        assert!(!debug_str.contains("test-key"));
    }

    // ========== Integration Tests (require real API key) ==========

    #[tokio::test]
    #[ignore] // Run with: cargo test --ignored
    async fn test_real_api_single_translation() {
        if std::env::var("GOOGLE_TRANSLATE_API_KEY").is_err() {
            eprintln!("Skipping: GOOGLE_TRANSLATE_API_KEY not set");
            return;
        }

        let provider = GoogleTranslateProvider::from_env().unwrap();
        let params = Params::new().with("source", "en").with("target", "fr").with("format", "text");
        let result = provider.translate("Hello", &params).await.unwrap();
        println!("Translation: {} → {:?}", "Hello", result);

        assert!(result.is_success());
        assert!(!result.text().unwrap_or_default().is_empty());
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test --ignored
    async fn test_real_api_invalid_key() {
        let provider = GoogleTranslateProvider::new("invalid-key-xyz".to_string()).unwrap();
        let result = provider.translate("hello", &Params::new()).await.unwrap();

        // Google answers 400 with an error payload
        assert!(!result.is_success());
        assert!(result.error_code().is_some());
    }
}
