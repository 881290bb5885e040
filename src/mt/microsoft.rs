//! Microsoft Translator Text v3 provider
//!
//! Texts are submitted as a JSON array (`[{"Text": "..."}, ...]`) and
//! translated in one request. Language selection uses the API's own query
//! parameters: `from` (default `zh-Hans`), `to` (default `en`) and
//! `textType` (`plain` or `html`).
//!
//! # Authentication
//!
//! Requests carry the subscription key from `MICROSOFT_TRANSLATOR_KEY` and,
//! for regional resources, the region from `MICROSOFT_TRANSLATOR_REGION`.
//!
//! # Example
//!
//! ```ignore
//! use comlib_translate::http::Params;
//! use comlib_translate::mt::MicrosoftTranslatorProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = MicrosoftTranslatorProvider::from_env()?;
//!     let texts = vec!["Hallo".to_string(), "Welt".to_string()];
//!     let params = Params::new().with("from", "de").with("to", "en");
//!     for result in provider.translate_batch(&texts, &params).await? {
//!         println!("{:?}", result.text());
//!     }
//!     Ok(())
//! }
//! ```

use crate::http::{Params, RequestOptions, Transport};
use crate::mt::decoder::{BatchDecoder, SYNTHETIC_ERROR_CODE};
use crate::mt::error::{MtError, MtResult};
use crate::mt::result::CanonicalResult;
use crate::mt::translator::{Translator, require_api_key, validate_text_length};
use async_trait::async_trait;
use serde_json::{Value, json};
use uuid::Uuid;

pub const BASE_URL: &str = "https://api.cognitive.microsofttranslator.com/translate?api-version=3.0";

/// Microsoft Translator provider
pub struct MicrosoftTranslatorProvider {
    /// Subscription key, checked when a request is made
    api_key: String,
    /// Azure region of the resource, if it is not global
    region: Option<String>,
    base_url: String,
    transport: Transport,
    decoder: BatchDecoder,
}

impl MicrosoftTranslatorProvider {
    /// Create a provider with the given subscription key
    ///
    /// A blank key is rejected with [`MtError::ConfigError`].
    pub fn new(api_key: String) -> MtResult<Self> {
        require_api_key(&api_key)?;

        Ok(Self {
            api_key,
            region: None,
            base_url: BASE_URL.to_string(),
            transport: Transport::new()?,
            decoder: BatchDecoder,
        })
    }

    /// Create a provider from `MICROSOFT_TRANSLATOR_KEY` and the optional
    /// `MICROSOFT_TRANSLATOR_REGION`
    pub fn from_env() -> MtResult<Self> {
        let api_key = std::env::var("MICROSOFT_TRANSLATOR_KEY").map_err(|_| {
            MtError::ConfigError(
                "MICROSOFT_TRANSLATOR_KEY environment variable not set".to_string(),
            )
        })?;

        let mut provider = Self::new(api_key)?;
        provider.region = std::env::var("MICROSOFT_TRANSLATOR_REGION").ok();
        Ok(provider)
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Use `base_url` instead of the public endpoint. It should already carry
    /// the `api-version` query parameter.
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

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn set_region(&mut self, region: Option<String>) {
        self.region = region;
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    fn default_params() -> Params {
        Params::new()
            .with("from", "zh-Hans")
            .with("to", "en")
            .with("textType", "plain")
    }

    /// Translate every text in one request.
    ///
    /// All texts are validated before anything is sent; one text over the
    /// limit rejects the whole batch. Results are returned in input order,
    /// one per text.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        params: &Params,
    ) -> MtResult<Vec<CanonicalResult>> {
        require_api_key(&self.api_key)?;

        for (i, text) in texts.iter().enumerate() {
            validate_text_length(text).map_err(|e| match e {
                MtError::ValidationError(msg) => {
                    MtError::ValidationError(format!("Text at index {}: {}", i, msg))
                }
                other => other,
            })?;
        }

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = Self::default_params();
        query.merge(params);

        let body = Value::Array(texts.iter().map(|text| json!({ "Text": text })).collect());

        let mut options = RequestOptions::new()
            .with_header("Ocp-Apim-Subscription-Key", self.api_key.as_str())
            .with_header("X-ClientTraceId", Uuid::new_v4().to_string())
            .with_query(query);
        if let Some(region) = &self.region {
            options = options.with_header("Ocp-Apim-Subscription-Region", region.as_str());
        }

        let response = self.transport.json(&self.base_url, body, options).await?;

        self.decoder.decode_batch(&response.body, texts.len())
    }
}

impl std::fmt::Debug for MicrosoftTranslatorProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MicrosoftTranslatorProvider")
            .field("api_key", &"***")
            .field("region", &self.region)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl Translator for MicrosoftTranslatorProvider {
    /// Submit `text` as a one-element batch
    async fn translate(&self, text: &str, params: &Params) -> MtResult<CanonicalResult> {
        let results = self.translate_batch(&[text.to_string()], params).await?;
        Ok(results.into_iter().next().unwrap_or_else(|| {
            CanonicalResult::failed(SYNTHETIC_ERROR_CODE, "no translation returned")
        }))
    }

    fn provider_name(&self) -> &str {
        "Microsoft Translator"
    }
}
