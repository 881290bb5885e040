//! Google web translate provider
//!
//! Talks to the `translate_a/single` endpoint used by the browser front end.
//! It needs no account, but Google answers automated traffic with an empty
//! page; that case surfaces as [`MtError::ProtocolAnomaly`] so callers can
//! back off instead of treating it as a format error.
//!
//! Parameters use the endpoint's own names: `sl` (source language, default
//! `auto`) and `tl` (target language, default `en`).

use crate::http::{Params, RequestOptions, Transport};
use crate::mt::decoder::{Decoder, LegacyDecoder};
use crate::mt::error::{MtError, MtResult};
use crate::mt::result::CanonicalResult;
use crate::mt::translator::{Translator, validate_text_length};
use async_trait::async_trait;

pub const EN_BASE_URL: &str = "https://translate.google.com/translate_a/single";
pub const CN_BASE_URL: &str = "https://translate.google.cn/translate_a/single";

/// Sub-options requested from the endpoint, sent as repeated `dt` keys
const DT_OPTIONS: &[&str] = &["at", "bd", "ex", "ld", "md", "qca", "rw", "rm", "ss", "t"];

const DEFAULT_SOURCE: &str = "auto";
const DEFAULT_TARGET: &str = "en";

/// Which regional host to send requests to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BaseUrlType {
    /// translate.google.com
    #[default]
    En,
    /// translate.google.cn
    Cn,
}

impl BaseUrlType {
    pub fn base_url(self) -> &'static str {
        match self {
            BaseUrlType::En => EN_BASE_URL,
            BaseUrlType::Cn => CN_BASE_URL,
        }
    }
}

impl std::str::FromStr for BaseUrlType {
    type Err = MtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(BaseUrlType::En),
            "cn" => Ok(BaseUrlType::Cn),
            other => Err(MtError::ConfigError(format!(
                "unknown base url type '{}', expected 'en' or 'cn'",
                other
            ))),
        }
    }
}

/// Provider for the Google web translate endpoint
pub struct GoogleWebProvider {
    /// Optional API key, sent as `key` when set
    api_key: String,
    base_url_type: BaseUrlType,
    /// Overrides `base_url_type` when set
    base_url: Option<String>,
    transport: Transport,
    decoder: LegacyDecoder,
}

impl GoogleWebProvider {
    pub fn new() -> MtResult<Self> {
        Ok(Self {
            api_key: String::new(),
            base_url_type: BaseUrlType::default(),
            base_url: None,
            transport: Transport::new()?,
            decoder: LegacyDecoder,
        })
    }

    /// Create a provider configured from the environment
    ///
    /// Reads the optional `GOOGLE_TRANSLATE_KEY` and `GOOGLE_TRANSLATE_HOST`
    /// (`en` or `cn`) variables.
    pub fn from_env() -> MtResult<Self> {
        let mut provider = Self::new()?;
        if let Ok(key) = std::env::var("GOOGLE_TRANSLATE_KEY") {
            provider.set_api_key(key);
        }
        if let Ok(host) = std::env::var("GOOGLE_TRANSLATE_HOST") {
            provider.set_base_url_type(host.parse()?);
        }
        Ok(provider)
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = api_key;
    }

    pub fn base_url_type(&self) -> BaseUrlType {
        self.base_url_type
    }

    pub fn set_base_url_type(&mut self, base_url_type: BaseUrlType) {
        self.base_url_type = base_url_type;
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.base_url_type.base_url())
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Query parameters for `text`. `hl` follows the target language.
    fn query_params(&self, text: &str, params: &Params) -> Params {
        let target = params.get_str("tl").unwrap_or(DEFAULT_TARGET).to_string();

        let mut query = Params::new()
            .with("client", "at")
            .with("hl", target.as_str())
            .with("sl", DEFAULT_SOURCE)
            .with("tl", target.as_str())
            .with("q", "")
            .with("ie", "UTF-8")
            .with("oe", "UTF-8")
            .with("multires", "1")
            .with("otf", "2")
            .with("pc", "1")
            .with("trs", "1")
            .with("ssel", "0")
            .with("tsel", "0")
            .with("kc", "1")
            .with("dj", "1")
            .with("dt", DT_OPTIONS);
        if !self.api_key.is_empty() {
            query.insert("key", self.api_key.as_str());
        }

        query.merge(params);
        query.insert("q", text);
        query
    }
}

impl std::fmt::Debug for GoogleWebProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleWebProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url())
            .finish()
    }
}

#[async_trait]
impl Translator for GoogleWebProvider {
    async fn translate(&self, text: &str, params: &Params) -> MtResult<CanonicalResult> {
        validate_text_length(text)?;

        let options = RequestOptions::new()
            .with_header("Accept", "application/json")
            .with_data(self.query_params(text, params));
        let response = self.transport.get(self.base_url(), options).await?;

        self.decoder.decode(&response.body)
    }

    fn provider_name(&self) -> &str {
        "Google Web Translate"
    }
}
