//! URL resolution
//!
//! Splits a URL string into the pieces the transport needs to open a
//! connection and build a request line. Parsing never fails: anything the
//! parser cannot extract falls back to a fixed default, and a URL that does
//! not parse at all, or is not a hierarchical `http`/`https` URL, resolves
//! to `http://localhost:80/`.

use tracing::debug;
use url::Url;

/// Typed components of a URL, every field default-filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlComponents {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub path: String,
    pub query: String,
    pub fragment: String,
}

impl Default for UrlComponents {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 80,
            user: String::new(),
            pass: String::new(),
            path: "/".to_string(),
            query: String::new(),
            fragment: String::new(),
        }
    }
}

impl UrlComponents {
    /// Whether the connection to this endpoint is made over TLS.
    ///
    /// TLS is selected by port alone: port 443 means TLS, anything else is
    /// plain TCP.
    pub fn is_tls(&self) -> bool {
        self.port == 443
    }

    /// `scheme://host:port` of the connection this URL resolves to
    pub fn origin(&self) -> String {
        let scheme = if self.is_tls() { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

/// Parse `input` into [`UrlComponents`].
///
/// A `https` scheme always forces port 443, even when the input names a
/// different port.
///
/// # Example
///
/// ```ignore
/// let info = parse_url("https://api.example.com:8443/v2?x=1");
/// assert_eq!(info.port, 443);
/// assert_eq!(info.query, "x=1");
/// ```
pub fn parse_url(input: &str) -> UrlComponents {
    let defaults = UrlComponents::default();

    let mut info = match Url::parse(input.trim()) {
        // Inputs such as `localhost:8080/x` parse as opaque URLs with the host
        // in the scheme slot; only hierarchical http(s) URLs are usable.
        Ok(url) if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") => {
            debug!(url = input, scheme = url.scheme(), "unsupported url, using defaults");
            defaults
        }
        Ok(url) => {
            let path = match url.path() {
                "" => defaults.path,
                path if path.starts_with('/') => path.to_string(),
                path => format!("/{}", path),
            };

            UrlComponents {
                scheme: url.scheme().to_string(),
                host: url
                    .host_str()
                    .filter(|host| !host.is_empty())
                    .map(str::to_string)
                    .unwrap_or(defaults.host),
                // `Url::port` is `None` both when absent and when equal to the
                // scheme's default, so the fallback covers both.
                port: url.port().unwrap_or(defaults.port),
                user: url.username().to_string(),
                pass: url.password().unwrap_or_default().to_string(),
                path,
                query: url.query().unwrap_or_default().to_string(),
                fragment: url.fragment().unwrap_or_default().to_string(),
            }
        }
        Err(err) => {
            debug!(url = input, error = %err, "unparseable url, using defaults");
            defaults
        }
    };

    if info.scheme == "https" {
        info.port = 443;
    }

    info
}
