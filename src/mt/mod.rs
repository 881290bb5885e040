/// Machine Translation Module
///
/// Uniform access to several machine translation services over the
/// [`http`](crate::http) transport.
///
/// # Overview
///
/// 1. **Translator trait** - [`Translator::translate`] returns a [`CanonicalResult`] for any provider
/// 2. **Providers** - Google web endpoint, Google Cloud v2 and Microsoft Translator (batch)
/// 3. **Decoders** - Map each provider's JSON dialect onto [`CanonicalResult`]
///
/// # Example
///
/// ```ignore
/// use comlib_translate::http::Params;
/// use comlib_translate::mt::{GoogleWebProvider, MtError, Translator};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = GoogleWebProvider::new()?;
///     let params = Params::new().with("sl", "zh-CN").with("tl", "en");
///     match provider.translate("欢迎你", &params).await {
///         Ok(result) => println!("{:?}", result.text()),
///         Err(MtError::ProtocolAnomaly(_)) => eprintln!("blocked, try again later"),
///         Err(e) => return Err(e.into()),
///     }
///     Ok(())
/// }
/// ```
pub mod decoder;
pub mod error;
pub mod google_translate;
pub mod google_web;
pub mod microsoft;
pub mod result;
pub mod translator;


pub use decoder::{BatchDecoder, CloudV2Decoder, Decoder, LegacyDecoder};
pub use error::{MtError, MtResult};
pub use google_translate::GoogleTranslateProvider;
pub use google_web::{BaseUrlType, GoogleWebProvider};
pub use microsoft::MicrosoftTranslatorProvider;
pub use result::CanonicalResult;
pub use translator::{MAX_TEXT_CHARS, Translator, require_api_key, validate_text_length};
