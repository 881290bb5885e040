//! Provider response decoders
//!
//! Each provider answers in its own JSON dialect. A [`Decoder`] turns one
//! raw response body into a [`CanonicalResult`]:
//!
//! | Decoder           | Success shape                                   | Error shape              |
//! |-------------------|-------------------------------------------------|--------------------------|
//! | [`LegacyDecoder`] | `{"sentences":[{"trans":..}], "src":..}`        | empty body (blocked)     |
//! | [`CloudV2Decoder`]| `{"data":{"translations":[{"translatedText"}]}}`| `{"error":{code,message}}`|
//! | [`BatchDecoder`]  | `[{"translations":[{"text":..}]}, ...]`         | `{"error":{code,message}}`|
//!
//! Every error produced here for an unusable body carries the raw body.

use crate::mt::error::{MtError, MtResult};
use crate::mt::result::CanonicalResult;
use serde_json::Value;
use tracing::warn;

/// Code used for failures synthesized locally rather than reported by a provider
pub const SYNTHETIC_ERROR_CODE: i64 = 500;

const BLOCKED_MESSAGE: &str =
    "Google detected unusual traffic from your computer network, try again later (2 - 48 hours)";

/// Decodes a raw provider response body.
pub trait Decoder: Send + Sync {
    fn decode(&self, raw: &str) -> MtResult<CanonicalResult>;
}

/// Decoder for the legacy `translate_a/single` web endpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyDecoder;

impl Decoder for LegacyDecoder {
    fn decode(&self, raw: &str) -> MtResult<CanonicalResult> {
        let json = parse_or_anomaly(raw)?;

        let sentences = json
            .get("sentences")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                MtError::DecodeError(format!("missing 'sentences' array. raw: {}", raw))
            })?;

        // Transliteration entries carry no `trans` and contribute nothing.
        let text: String = sentences
            .iter()
            .filter_map(|sentence| sentence.get("trans").and_then(Value::as_str))
            .collect();

        Ok(CanonicalResult::Translated {
            text,
            source_lang: non_empty_str(json.get("src")),
        })
    }
}

/// Decoder for Google Cloud Translation v2
#[derive(Debug, Clone, Copy, Default)]
pub struct CloudV2Decoder;

impl Decoder for CloudV2Decoder {
    fn decode(&self, raw: &str) -> MtResult<CanonicalResult> {
        let json = parse_or_anomaly(raw)?;

        if let Some(error) = json.get("error") {
            return Ok(provider_failure(error, raw));
        }

        let Some(translations) = json.pointer("/data/translations").and_then(Value::as_array) else {
            return Ok(CanonicalResult::failed(
                SYNTHETIC_ERROR_CODE,
                format!("not found data. raw: {}", raw),
            ));
        };

        let text: String = translations
            .iter()
            .filter_map(|t| t.get("translatedText").and_then(Value::as_str))
            .collect();
        let source_lang = translations
            .first()
            .and_then(|t| non_empty_str(t.get("detectedSourceLanguage")));

        Ok(CanonicalResult::Translated { text, source_lang })
    }
}

/// Decoder for the Microsoft Translator v3 batch API
///
/// A response holds one element per submitted text. Used through
/// [`Decoder::decode`] it decodes a single-text batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchDecoder;

impl BatchDecoder {
    /// Decode a response to a batch of `slots` texts.
    ///
    /// Always returns exactly `slots` results, in submission order. A
    /// top-level error object becomes the result of every slot.
    pub fn decode_batch(&self, raw: &str, slots: usize) -> MtResult<Vec<CanonicalResult>> {
        let json: Value = serde_json::from_str(raw.trim()).map_err(|e| {
            MtError::DecodeError(format!("invalid JSON response ({}). raw: {}", e, raw))
        })?;

        if let Some(error) = json.get("error") {
            return Ok(vec![provider_failure(error, raw); slots]);
        }

        let items = json.as_array().ok_or_else(|| {
            MtError::DecodeError(format!("expected a JSON array. raw: {}", raw))
        })?;

        Ok((0..slots)
            .map(|index| match items.get(index) {
                Some(item) => decode_batch_item(item),
                None => CanonicalResult::failed(
                    SYNTHETIC_ERROR_CODE,
                    format!("no translation returned for item {}. raw: {}", index, raw),
                ),
            })
            .collect())
    }
}

impl Decoder for BatchDecoder {
    fn decode(&self, raw: &str) -> MtResult<CanonicalResult> {
        self.decode_batch(raw, 1)?
            .into_iter()
            .next()
            .ok_or_else(|| MtError::DecodeError(format!("empty batch result. raw: {}", raw)))
    }
}

fn decode_batch_item(item: &Value) -> CanonicalResult {
    if let Some(text) = item.pointer("/translations/0/text").and_then(Value::as_str) {
        return CanonicalResult::Translated {
            text: text.to_string(),
            source_lang: non_empty_str(item.pointer("/detectedLanguage/language")),
        };
    }

    match item.get("error") {
        Some(error) => provider_failure(error, &item.to_string()),
        None => CanonicalResult::failed(
            SYNTHETIC_ERROR_CODE,
            format!("missing translations. raw: {}", item),
        ),
    }
}

/// Parse `raw`, treating an empty or unparseable body as the provider
/// blocking us rather than as a format problem.
fn parse_or_anomaly(raw: &str) -> MtResult<Value> {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(json) if !is_blank(&json) => Ok(json),
        _ => {
            warn!(body_len = raw.len(), "empty or unparseable provider response");
            Err(MtError::ProtocolAnomaly(format!(
                "{}. raw: {}",
                BLOCKED_MESSAGE, raw
            )))
        }
    }
}

fn is_blank(json: &Value) -> bool {
    match json {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Map a provider `error` value to a failed result.
fn provider_failure(error: &Value, raw: &str) -> CanonicalResult {
    match error {
        Value::Object(_) => CanonicalResult::failed(
            error
                .get("code")
                .and_then(Value::as_i64)
                .unwrap_or(SYNTHETIC_ERROR_CODE),
            error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("unknown error. raw: {}", raw)),
        ),
        Value::String(message) => CanonicalResult::failed(SYNTHETIC_ERROR_CODE, message.clone()),
        _ => CanonicalResult::failed(SYNTHETIC_ERROR_CODE, format!("unknown error. raw: {}", raw)),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
