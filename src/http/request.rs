//! Request construction
//!
//! Turns a resolved URL plus [`RequestOptions`] into a [`PreparedRequest`]:
//! the final request path, method, headers and body a [`Connection`] sends.
//!
//! Body selection for `POST`, `PUT` and `PATCH` follows a fixed precedence:
//! `json`, then `form`, then `data`. Only the first non-empty one becomes the
//! body. For other methods `data` is encoded into the query string instead.
//! An explicit `query` is appended to the path for every method.
//!
//! [`Connection`]: crate::http::Connection

use crate::http::query::{Params, Payload, build_query, encode_form};
use crate::http::url::UrlComponents;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Connection tuning forwarded untouched to the connector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportSettings {
    /// Upper bound for the whole exchange. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// `Some(false)` asks the peer to close the connection after responding
    pub keep_alive: Option<bool>,
}

impl TransportSettings {
    fn merged_over(self, base: &TransportSettings) -> TransportSettings {
        TransportSettings {
            timeout: self.timeout.or(base.timeout),
            keep_alive: self.keep_alive.or(base.keep_alive),
        }
    }
}

/// Per-call request options.
///
/// Every field is optional. A [`Transport`] may carry a base set of options
/// that per-call options are merged over; per-call values always win.
///
/// [`Transport`]: crate::http::Transport
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Option<String>,
    pub headers: Vec<(String, String)>,
    pub data: Option<Payload>,
    pub json: Option<Value>,
    pub form: Option<Params>,
    pub query: Option<Payload>,
    pub cookies: Vec<(String, String)>,
    pub settings: TransportSettings,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Add a header, replacing any earlier header with the same name
    /// (names compare case-insensitively).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        upsert_header(&mut self.headers, name.into(), value.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<Payload>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }

    pub fn with_form(mut self, form: Params) -> Self {
        self.form = Some(form);
        self
    }

    pub fn with_query(mut self, query: impl Into<Payload>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.cookies.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.cookies.push((name, value)),
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = Some(timeout);
        self
    }

    pub fn with_keep_alive(mut self, keep_alive: bool) -> Self {
        self.settings.keep_alive = Some(keep_alive);
        self
    }

    /// Merge `self` over `base`.
    ///
    /// Headers and cookies merge key by key, settings field by field, and
    /// every other option is taken whole from whichever side sets it
    /// (`self` first).
    pub fn merged_over(self, base: &RequestOptions) -> RequestOptions {
        let mut headers = base.headers.clone();
        for (name, value) in self.headers {
            upsert_header(&mut headers, name, value);
        }

        let mut cookies = base.cookies.clone();
        for (name, value) in self.cookies {
            match cookies.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = value,
                None => cookies.push((name, value)),
            }
        }

        RequestOptions {
            method: self.method.or_else(|| base.method.clone()),
            headers,
            data: self.data.or_else(|| base.data.clone()),
            json: self.json.or_else(|| base.json.clone()),
            form: self.form.or_else(|| base.form.clone()),
            query: self.query.or_else(|| base.query.clone()),
            cookies,
            settings: self.settings.merged_over(&base.settings),
        }
    }
}

fn upsert_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    match headers
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
    {
        Some(slot) => *slot = (name, value),
        None => headers.push((name, value)),
    }
}

/// A fully built request, ready for a connection to send.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    /// Path plus query string, relative to the connection's origin
    pub path: String,
    pub headers: HeaderMap,
    /// `None` when there is nothing to send
    pub body: Option<String>,
    pub cookies: Vec<(String, String)>,
    pub settings: TransportSettings,
}

impl PreparedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Methods whose requests carry a payload
pub fn is_body_bearing(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Build the request for `url` from `options` merged over `base`.
///
/// Never fails: an unknown method falls back to `GET` and headers that
/// are not valid HTTP are dropped with a warning.
pub fn configure_request(
    url: &UrlComponents,
    base: &RequestOptions,
    options: RequestOptions,
) -> PreparedRequest {
    let options = options.merged_over(base);

    let mut path = url.path.clone();
    if !url.query.is_empty() {
        path.push('?');
        path.push_str(&url.query);
    }

    let method_name = options
        .method
        .as_deref()
        .unwrap_or("GET")
        .to_ascii_uppercase();
    let method = Method::from_bytes(method_name.as_bytes()).unwrap_or_else(|_| {
        warn!(method = %method_name, "invalid request method, falling back to GET");
        Method::GET
    });

    let mut headers = HeaderMap::new();
    let mut body = None;

    if is_body_bearing(&method) {
        let (payload, content_type) = encode_body(&options);
        if let Some(content_type) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        if !payload.is_empty() {
            body = Some(payload);
        }
    } else if let Some(data) = &options.data {
        append_query(&mut path, &build_query(data));
    }

    if let Some(query) = &options.query {
        append_query(&mut path, &build_query(query));
    }

    // Caller headers go last so they override the content type chosen above.
    for (name, value) in &options.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!(header = %name, "skipping invalid request header"),
        }
    }

    debug!(%method, %path, has_body = body.is_some(), "prepared request");

    PreparedRequest {
        method,
        path,
        headers,
        body,
        cookies: options.cookies,
        settings: options.settings,
    }
}

/// Pick the body and its content type for a body-bearing request.
fn encode_body(options: &RequestOptions) -> (String, Option<&'static str>) {
    if let Some(json) = options.json.as_ref().filter(|json| !is_empty_json(json)) {
        return (json.to_string(), Some(JSON_CONTENT_TYPE));
    }

    if let Some(form) = options.form.as_ref().filter(|form| !form.is_empty()) {
        return (encode_form(form), Some(FORM_CONTENT_TYPE));
    }

    match &options.data {
        Some(Payload::Map(map)) if !map.is_empty() => (encode_form(map), Some(FORM_CONTENT_TYPE)),
        Some(Payload::Raw(raw)) => (raw.clone(), None),
        _ => (String::new(), None),
    }
}

fn is_empty_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn append_query(path: &mut String, query: &str) {
    if query.is_empty() {
        return;
    }
    path.push(if path.contains('?') { '&' } else { '?' });
    path.push_str(query);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::url::parse_url;
    use serde_json::json;

    fn configure(url: &str, options: RequestOptions) -> PreparedRequest {
        configure_request(&parse_url(url), &RequestOptions::default(), options)
    }

    // ========== Body Selection Tests ==========

    #[test]
    fn test_json_body_sets_json_content_type() {
        for method in ["POST", "PUT", "PATCH"] {
            let body = json!({"text": "hello", "n": 1});
            let request = configure(
                "http://example.com/api",
                RequestOptions::new().with_method(method).with_json(body.clone()),
            );
            assert_eq!(request.header("content-type"), Some(JSON_CONTENT_TYPE));
            assert_eq!(request.body.as_deref(), Some(body.to_string().as_str()));
        }
    }

    #[test]
    fn test_form_body_sets_form_content_type() {
        let form = Params::new().with("q", "a b").with("target", "fr");
        let request = configure(
            "http://example.com/api",
            RequestOptions::new().with_method("put").with_form(form),
        );
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.header("content-type"), Some(FORM_CONTENT_TYPE));
        assert_eq!(request.body.as_deref(), Some("q=a+b&target=fr"));
    }

    #[test]
    fn test_json_wins_over_form_and_data() {
        let request = configure(
            "http://example.com/api",
            RequestOptions::new()
                .with_method("POST")
                .with_json(json!([{"Text": "hi"}]))
                .with_form(Params::new().with("a", "1"))
                .with_data("raw"),
        );
        assert_eq!(request.body.as_deref(), Some(r#"[{"Text":"hi"}]"#));
        assert_eq!(request.header("content-type"), Some(JSON_CONTENT_TYPE));
    }

    #[test]
    fn test_empty_json_falls_through_to_form() {
        let request = configure(
            "http://example.com/api",
            RequestOptions::new()
                .with_method("POST")
                .with_json(json!({}))
                .with_form(Params::new().with("a", "1")),
        );
        assert_eq!(request.body.as_deref(), Some("a=1"));
        assert_eq!(request.header("content-type"), Some(FORM_CONTENT_TYPE));
    }

    #[test]
    fn test_map_data_is_form_encoded_not_queried() {
        let request = configure(
            "http://example.com/api",
            RequestOptions::new()
                .with_method("POST")
                .with_data(Params::new().with("q", "hello")),
        );
        assert_eq!(request.path, "/api");
        assert_eq!(request.body.as_deref(), Some("q=hello"));
        assert_eq!(request.header("content-type"), Some(FORM_CONTENT_TYPE));
    }

    #[test]
    fn test_raw_data_has_no_content_type() {
        let request = configure(
            "http://example.com/api",
            RequestOptions::new().with_method("POST").with_data("plain text"),
        );
        assert_eq!(request.body.as_deref(), Some("plain text"));
        assert_eq!(request.header("content-type"), None);
    }

    #[test]
    fn test_empty_body_sends_no_payload() {
        let request = configure(
            "http://example.com/api",
            RequestOptions::new().with_method("POST").with_data(""),
        );
        assert_eq!(request.body, None);
    }

    // ========== Query Tests ==========

    #[test]
    fn test_get_data_goes_to_query_string() {
        let request = configure(
            "http://example.com/search",
            RequestOptions::new().with_data(Params::new().with("q", "rust").with("dt", &["t", "bd"][..])),
        );
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/search?q=rust&dt=t&dt=bd");
        assert_eq!(request.body, None);
    }

    #[test]
    fn test_query_appended_with_ampersand_after_existing_query() {
        let request = configure(
            "https://api.example.com/translate?api-version=3.0",
            RequestOptions::new()
                .with_method("POST")
                .with_json(json!([{"Text": "x"}]))
                .with_query(Params::new().with("from", "de").with("to", "en")),
        );
        assert_eq!(request.path, "/translate?api-version=3.0&from=de&to=en");
    }

    #[test]
    fn test_data_segment_precedes_explicit_query() {
        let request = configure(
            "http://example.com/x",
            RequestOptions::new()
                .with_data(Params::new().with("a", "1"))
                .with_query("b=2"),
        );
        assert_eq!(request.path, "/x?a=1&b=2");
    }

    #[test]
    fn test_empty_query_segment_not_appended() {
        let request = configure(
            "http://example.com/x",
            RequestOptions::new().with_query(Params::new()),
        );
        assert_eq!(request.path, "/x");
    }

    // ========== Header Tests ==========

    #[test]
    fn test_caller_header_overrides_content_type() {
        let request = configure(
            "http://example.com/api",
            RequestOptions::new()
                .with_method("POST")
                .with_json(json!({"a": 1}))
                .with_header("Content-Type", "text/plain"),
        );
        assert_eq!(request.header("content-type"), Some("text/plain"));
    }

    #[test]
    fn test_invalid_header_is_skipped() {
        let request = configure(
            "http://example.com/api",
            RequestOptions::new()
                .with_header("Bad Header", "x")
                .with_header("Accept", "application/json"),
        );
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header("accept"), Some("application/json"));
    }

    #[test]
    fn test_unknown_method_falls_back_to_get() {
        let request = configure("http://example.com/", RequestOptions::new().with_method("BAD METHOD"));
        assert_eq!(request.method, Method::GET);
    }

    // ========== Merge Tests ==========

    #[test]
    fn test_base_options_merge_under_call_options() {
        let base = RequestOptions::new()
            .with_header("Accept", "text/html")
            .with_header("X-Base", "1")
            .with_cookie("session", "base")
            .with_timeout(Duration::from_secs(5))
            .with_keep_alive(false);
        let call = RequestOptions::new()
            .with_header("accept", "application/json")
            .with_cookie("session", "call")
            .with_timeout(Duration::from_secs(1));

        let request = configure_request(&parse_url("http://example.com/"), &base, call);
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.header("x-base"), Some("1"));
        assert_eq!(request.cookies, vec![("session".to_string(), "call".to_string())]);
        assert_eq!(request.settings.timeout, Some(Duration::from_secs(1)));
        assert_eq!(request.settings.keep_alive, Some(false));
    }

    #[test]
    fn test_base_method_used_when_call_has_none() {
        let base = RequestOptions::new().with_method("post");
        let request = configure_request(
            &parse_url("http://example.com/"),
            &base,
            RequestOptions::new().with_data("x"),
        );
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body.as_deref(), Some("x"));
    }
}
