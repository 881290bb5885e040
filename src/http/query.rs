//! Query-string and form encoding
//!
//! Parameters are kept in an insertion-ordered map so that the encoded
//! output is stable and matches the order callers declared them in.
//! List values are written with indexed keys (`dt[0]=a&dt[1]=b`) by
//! [`encode_form`]; [`build_query`] then collapses those indexes into bare
//! repeated keys (`dt=a&dt=b`), which is what endpoints expecting
//! multi-value parameters understand.

use regex::Regex;
use std::sync::LazyLock;
use url::form_urlencoded;

/// Percent-encoded `[<digits>]=` left behind by indexed list keys.
static INDEX_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%5B\d+%5D=").expect("index marker pattern is valid"));

/// A parameter value: either a scalar or a list of repeated values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    List(Vec<String>),
}

impl ParamValue {
    /// The scalar value, if this is not a list
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Single(value) => Some(value),
            ParamValue::List(_) => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Single(value.clone())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::List(values)
    }
}

impl From<&[&str]> for ParamValue {
    fn from(values: &[&str]) -> Self {
        ParamValue::List(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Insertion-ordered parameter map.
///
/// Inserting a key that already exists replaces its value in place, so the
/// key keeps its original position in the encoded output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, ParamValue)>);

impl Params {
    pub fn new() -> Self {
        Params(Vec::new())
    }

    /// Builder form of [`Params::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Scalar value for `key`; `None` for missing keys and list values.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Copy every entry of `overrides` into `self`, replacing existing keys.
    pub fn merge(&mut self, overrides: &Params) -> &mut Self {
        for (key, value) in overrides {
            self.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, ParamValue)> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a (String, ParamValue);
    type IntoIter = std::slice::Iter<'a, (String, ParamValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Data that is either already encoded or still a parameter map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Raw(String),
    Map(Params),
}

impl From<Params> for Payload {
    fn from(params: Params) -> Self {
        Payload::Map(params)
    }
}

impl From<&str> for Payload {
    fn from(raw: &str) -> Self {
        Payload::Raw(raw.to_string())
    }
}

impl From<String> for Payload {
    fn from(raw: String) -> Self {
        Payload::Raw(raw)
    }
}

/// Encode `data` as a query string.
///
/// Raw strings pass through untouched, so the function is idempotent on
/// its own output. Maps are form-encoded and indexed list keys are
/// collapsed into bare repeated keys.
///
/// # Example
///
/// ```ignore
/// let params = Params::new().with("q", "a b").with("dt", &["t", "bd"][..]);
/// assert_eq!(build_query(&Payload::Map(params)), "q=a+b&dt=t&dt=bd");
/// ```
pub fn build_query(data: &Payload) -> String {
    match data {
        Payload::Raw(raw) => raw.clone(),
        Payload::Map(params) => collapse_index_markers(encode_form(params)),
    }
}

/// `application/x-www-form-urlencoded` encoding of `params`, with list
/// values written under indexed keys.
pub fn encode_form(params: &Params) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        match value {
            ParamValue::Single(value) => {
                serializer.append_pair(key, value);
            }
            ParamValue::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    serializer.append_pair(&format!("{key}[{index}]"), item);
                }
            }
        }
    }
    serializer.finish()
}

fn collapse_index_markers(mut encoded: String) -> String {
    // Stripping one marker can expose another (`a[1][2]=`), so repeat
    // until none remain.
    while INDEX_MARKER.is_match(&encoded) {
        encoded = INDEX_MARKER.replace_all(&encoded, "=").into_owned();
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt_params() -> Params {
        Params::new()
            .with("client", "at")
            .with("dt", &["t", "bd", "at"][..])
            .with("q", "hello world")
    }

    #[test]
    fn test_raw_string_passes_through() {
        let raw = Payload::from("a=1&b[0]=2");
        assert_eq!(build_query(&raw), "a=1&b[0]=2");
    }

    #[test]
    fn test_build_query_idempotent_on_strings() {
        let once = build_query(&Payload::Map(dt_params()));
        let twice = build_query(&Payload::Raw(once.clone()));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_list_values_collapse_to_repeated_keys() {
        let query = build_query(&Payload::Map(dt_params()));
        assert_eq!(query, "client=at&dt=t&dt=bd&dt=at&q=hello+world");
    }

    #[test]
    fn test_encode_form_keeps_indexes() {
        let form = encode_form(&dt_params());
        assert_eq!(
            form,
            "client=at&dt%5B0%5D=t&dt%5B1%5D=bd&dt%5B2%5D=at&q=hello+world"
        );
    }

    #[test]
    fn test_no_index_marker_survives() {
        let params = Params::new()
            .with("a[1][2]", "x")
            .with("b[10]", "y")
            .with("c", vec!["1".to_string(), "2".to_string()]);
        let query = build_query(&Payload::Map(params));
        assert!(!INDEX_MARKER.is_match(&query), "left marker in {query}");
        assert_eq!(query, "a=x&b=y&c=1&c=2");
    }

    #[test]
    fn test_values_containing_brackets_are_untouched() {
        let params = Params::new().with("q", "[0]=");
        assert_eq!(build_query(&Payload::Map(params)), "q=%5B0%5D%3D");
    }

    #[test]
    fn test_insertion_order_preserved() {
        let params: Params = [("z", "1"), ("a", "2"), ("m", "3")].into_iter().collect();
        assert_eq!(build_query(&Payload::Map(params)), "z=1&a=2&m=3");
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut params = Params::new().with("from", "zh-Hans").with("to", "en");
        params.insert("from", "de");
        assert_eq!(params.len(), 2);
        assert_eq!(build_query(&Payload::Map(params)), "from=de&to=en");
    }

    #[test]
    fn test_merge_overrides_and_appends() {
        let mut params = Params::new().with("source", "zh-CN").with("target", "en");
        params.merge(&Params::new().with("target", "fr").with("format", "text"));
        assert_eq!(params.get_str("target"), Some("fr"));
        assert_eq!(
            build_query(&Payload::Map(params)),
            "source=zh-CN&target=fr&format=text"
        );
    }

    #[test]
    fn test_get_str_on_list_is_none() {
        let params = dt_params();
        assert!(params.contains_key("dt"));
        assert_eq!(params.get_str("dt"), None);
        assert_eq!(params.get_str("client"), Some("at"));
    }

    #[test]
    fn test_empty_map_encodes_empty() {
        assert_eq!(build_query(&Payload::Map(Params::new())), "");
    }
}
