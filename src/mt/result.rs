use serde::Serialize;

/// Provider-independent outcome of a translation.
///
/// Exactly one of the two shapes: translated text, or the error a provider
/// reported. Serializes untagged, so JSON output is either
/// `{"text": ..., "source_lang": ...}` or `{"code": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CanonicalResult {
    Translated {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        source_lang: Option<String>,
    },
    Failed {
        code: i64,
        message: String,
    },
}

impl CanonicalResult {
    pub fn translated(text: impl Into<String>) -> Self {
        CanonicalResult::Translated {
            text: text.into(),
            source_lang: None,
        }
    }

    pub fn failed(code: i64, message: impl Into<String>) -> Self {
        CanonicalResult::Failed {
            code,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CanonicalResult::Translated { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            CanonicalResult::Translated { text, .. } => Some(text),
            CanonicalResult::Failed { .. } => None,
        }
    }

    /// Source language detected or echoed by the provider
    pub fn source_lang(&self) -> Option<&str> {
        match self {
            CanonicalResult::Translated { source_lang, .. } => source_lang.as_deref(),
            CanonicalResult::Failed { .. } => None,
        }
    }

    pub fn error_code(&self) -> Option<i64> {
        match self {
            CanonicalResult::Failed { code, .. } => Some(*code),
            CanonicalResult::Translated { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            CanonicalResult::Failed { message, .. } => Some(message),
            CanonicalResult::Translated { .. } => None,
        }
    }
}
