//! Validated cache proxy origins.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{InvalidationError, Result};

/// The origin of a cache proxy, e.g. `http://localhost:6081`.
///
/// A location is a bare http(s) origin: a scheme of `http` or `https`, a
/// non-empty authority, and nothing after it. Even a trailing `/` is
/// rejected, because request URLs are built by appending the invalidated
/// path to the location verbatim.
///
/// # Example
///
/// ```
/// use invalidator_core::BackendLocation;
///
/// let location = BackendLocation::parse("https://cache.internal:6081").unwrap();
/// assert_eq!(location.scheme(), "https");
/// assert_eq!(location.authority(), "cache.internal:6081");
///
/// assert!(BackendLocation::parse("https://cache.internal/").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendLocation {
    raw: String,
    url: Url,
    authority: String,
}

impl BackendLocation {
    /// Parses and validates a backend location.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidationError::Configuration`] when the scheme is not
    /// http(s), the authority is missing, a path, query, parameters or
    /// fragment component is present, or the text contains whitespace.
    pub fn parse(location: &str) -> Result<Self> {
        // The URL parser strips these, but request URLs reuse the raw text.
        if location.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidationError::configuration(
                location,
                "whitespace or control characters are not allowed",
            ));
        }

        let url = Url::parse(location)
            .map_err(|e| InvalidationError::configuration(location, format!("not a URL: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(InvalidationError::configuration(
                location,
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        let remainder = match location.split_once("://") {
            Some((_, remainder)) if !remainder.is_empty() => remainder,
            _ => {
                return Err(InvalidationError::configuration(
                    location,
                    "missing authority",
                ));
            },
        };

        if let Some(component) = remainder.chars().find_map(trailing_component) {
            return Err(InvalidationError::configuration(
                location,
                format!("{component} component is not allowed"),
            ));
        }

        let authority = url_authority(&url).ok_or_else(|| {
            InvalidationError::configuration(location, "missing authority")
        })?;

        Ok(Self {
            raw: location.to_string(),
            url,
            authority,
        })
    }

    /// Returns the location exactly as configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the URL scheme (`http` or `https`).
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Returns `host[:port]`, normalised the way request URLs are.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Concatenates `path` onto the location and parses the result.
    ///
    /// No validation beyond URL syntax happens here; see
    /// [`url_authority`] for comparing the result with this location.
    pub fn join_raw(&self, path: &str) -> std::result::Result<Url, url::ParseError> {
        Url::parse(&format!("{}{}", self.raw, path))
    }
}

/// Returns `host[:port]` for a parsed URL, without userinfo.
///
/// Default ports are dropped by the URL parser, so `http://proxy:80` and
/// `http://proxy` yield the same authority.
pub fn url_authority(url: &Url) -> Option<String> {
    let host = url.host_str().filter(|h| !h.is_empty())?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

fn trailing_component(c: char) -> Option<&'static str> {
    match c {
        '/' => Some("path"),
        '?' => Some("query"),
        '#' => Some("fragment"),
        ';' => Some("parameters"),
        _ => None,
    }
}

impl fmt::Display for BackendLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for BackendLocation {
    type Err = InvalidationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for BackendLocation {
    type Error = InvalidationError;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_bare_origins() {
        for location in [
            "http://localhost",
            "http://localhost:6081",
            "https://localhost",
            "https://cache.example.com:8443",
            "http://127.0.0.1:6081",
            "http://[::1]:6081",
        ] {
            let parsed = BackendLocation::parse(location);
            assert!(parsed.is_ok(), "{location} should be accepted: {parsed:?}");
        }
    }

    #[test]
    fn test_rejects_non_origins() {
        for location in [
            "https://localhost/",
            "ftp://localhost",
            "localhost",
            "https://localhost/some-path",
            "https://localhost?q=some-path",
            "https://localhost#some-path",
            "http://localhost;params",
            "http://",
            "http:localhost",
            "http://localhost:6081 ",
            " http://localhost:6081",
            "http://local\thost:6081",
            "http://localhost:6081\n",
            "",
        ] {
            let err = BackendLocation::parse(location).unwrap_err();
            assert!(err.is_configuration(), "{location} should be rejected");
        }
    }

    #[test]
    fn test_rejection_reason_names_component() {
        let err = BackendLocation::parse("https://localhost?q=1").unwrap_err();
        assert!(err.to_string().contains("query"));

        let err = BackendLocation::parse("ftp://localhost").unwrap_err();
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn test_accessors() {
        let location: BackendLocation = "http://localhost:8080".parse().unwrap();
        assert_eq!(location.as_str(), "http://localhost:8080");
        assert_eq!(location.to_string(), "http://localhost:8080");
        assert_eq!(location.scheme(), "http");
        assert_eq!(location.authority(), "localhost:8080");
    }

    #[test]
    fn test_authority_drops_default_port_and_userinfo() {
        let location = BackendLocation::try_from("http://admin@proxy:80").unwrap();
        assert_eq!(location.authority(), "proxy");
    }

    #[test]
    fn test_join_raw_appends_verbatim() {
        let location = BackendLocation::parse("http://localhost:8080").unwrap();
        let url = location.join_raw("/some/path").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/some/path");
        assert_eq!(url_authority(&url).as_deref(), Some("localhost:8080"));

        assert!(location.join_raw("path/to").is_err());
    }
}
