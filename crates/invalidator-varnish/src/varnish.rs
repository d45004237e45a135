//! Varnish backend implementation.

use std::borrow::Cow;
use std::sync::Arc;

use invalidator_core::location::url_authority;
use invalidator_core::{
    BackendLocation, CacheInvalidationHandler, InvalidationError, InvalidationMethod,
    InvalidationMode, Result,
};
use tracing::{Span, debug, error, info_span, warn};

use crate::transport::{HttpTransport, InvalidationRequest, Transport};

/// Placeholder logged when a proxy response has no readable body.
const MISSING_BODY: &str = "n/a";

/// Invalidates content on a Varnish proxy.
///
/// Requests go to `location + path` with `Host: domain`, using `BAN` for lazy
/// invalidation and `PURGE` for immediate eviction. Failed deliveries are
/// logged inside the backend's own span and never returned to the caller.
pub struct VarnishCache {
    /// The proxy origin.
    location: BackendLocation,
    /// How requests reach the proxy.
    transport: Arc<dyn Transport>,
    /// Logging context for everything this backend emits.
    span: Span,
}

impl VarnishCache {
    /// Creates a Varnish backend using the default HTTP transport.
    ///
    /// # Errors
    ///
    /// `InvalidationError::Configuration` if `location` is not a bare
    /// http(s) origin or the HTTP client cannot be built.
    pub fn new(location: &str) -> Result<Self> {
        let location = BackendLocation::parse(location)?;
        let transport = HttpTransport::new()
            .map_err(|e| InvalidationError::configuration(location.as_str(), e.to_string()))?;

        Ok(Self::from_parts(location, Arc::new(transport)))
    }

    /// Creates a Varnish backend that sends through `transport`.
    pub fn with_transport(location: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        let location = BackendLocation::parse(location)?;
        Ok(Self::from_parts(location, transport))
    }

    /// Creates a Varnish backend from an already validated location.
    pub fn from_parts(location: BackendLocation, transport: Arc<dyn Transport>) -> Self {
        let span = info_span!("varnish_backend", location = %location);

        Self {
            location,
            transport,
            span,
        }
    }

    /// Builds and validates a request without sending it.
    ///
    /// # Errors
    ///
    /// `InvalidationError::InvalidRequest` when `location + path` does not
    /// parse, points at another authority, or resolves to a path that is not
    /// a prefix of `path`; or when `domain` cannot be used as a `Host` header.
    pub fn build_request(
        &self,
        method: InvalidationMethod,
        domain: &str,
        path: &str,
    ) -> Result<InvalidationRequest> {
        let target = format!("{}{}", self.location, path);

        // `\` would otherwise be read as `/` and rewrite regex escapes.
        let url = self.location.join_raw(&escape_backslashes(path)).map_err(|e| {
            InvalidationError::invalid_request(&target, format!("not a valid URL: {e}"))
        })?;

        let authority = url_authority(&url).unwrap_or_default();
        if authority != self.location.authority() {
            return Err(InvalidationError::invalid_request(
                &target,
                format!(
                    "authority '{}' does not match backend '{}'",
                    authority,
                    self.location.authority()
                ),
            ));
        }

        // The resolved path stops at the first `?` or `#`, which regex
        // fragments may contain.
        let resolved = urlencoding::decode(url.path())
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| url.path().to_string());
        if !path.starts_with(&resolved) {
            return Err(InvalidationError::invalid_request(
                &target,
                format!("path resolves to '{resolved}'"),
            ));
        }

        if domain.is_empty() || !domain.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(InvalidationError::invalid_request(
                domain,
                "domain must be a non-empty host name",
            ));
        }

        Ok(InvalidationRequest {
            method,
            url,
            host: domain.to_string(),
        })
    }

    /// Validates and sends one request.
    ///
    /// Transport failures and non-200 responses are logged and swallowed.
    pub fn request(&self, method: InvalidationMethod, domain: &str, path: &str) -> Result<()> {
        let request = self.build_request(method, domain, path)?;
        let target = format!("{}{}", self.location, path);

        let _entered = self.span.enter();
        debug!(method = %method, url = %target, path = %path, "Sending invalidation request");

        let response = match self.transport.send(&request) {
            Ok(response) => response,
            Err(e) => {
                error!(url = %target, error = %e, "Could not reach cache proxy");
                return Ok(());
            },
        };

        if response.is_success() {
            debug!(url = %target, "Invalidation accepted");
        } else {
            error!(
                url = %target,
                status = response.status,
                body = %response.body.as_deref().unwrap_or(MISSING_BODY),
                "Cache proxy rejected invalidation"
            );
        }

        Ok(())
    }

    /// Issues a `BAN` request.
    ///
    /// The proxy is expected to turn it into a ban on
    /// `req.http.host == <domain> && req.url ~ <path>`.
    pub fn ban(&self, domain: &str, path: &str) -> Result<()> {
        self.request(InvalidationMethod::Ban, domain, path)
    }

    /// Issues a `PURGE` request.
    pub fn purge(&self, domain: &str, path: &str) -> Result<()> {
        self.request(InvalidationMethod::Purge, domain, path)
    }
}

fn escape_backslashes(path: &str) -> Cow<'_, str> {
    if path.contains('\\') {
        Cow::Owned(path.replace('\\', "%5C"))
    } else {
        Cow::Borrowed(path)
    }
}

impl CacheInvalidationHandler for VarnishCache {
    fn name(&self) -> &str {
        "varnish"
    }

    fn location(&self) -> &BackendLocation {
        &self.location
    }

    fn invalidate_page(&self, domain: &str, path: &str, mode: InvalidationMode) -> Result<()> {
        self.request(InvalidationMethod::for_page(mode), domain, path)
    }

    fn invalidate_path(&self, domain: &str, path: &str, mode: InvalidationMode) -> Result<()> {
        if mode.is_purge() {
            let _entered = self.span.enter();
            warn!(
                domain = %domain,
                path = %path,
                "Purge is not supported for path invalidation, falling back to ban"
            );
        }
        self.request(InvalidationMethod::for_path(mode), domain, path)
    }
}

impl std::fmt::Debug for VarnishCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VarnishCache")
            .field("location", &self.location.as_str())
            .field("transport", &self.transport)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::transport::{TransportError, TransportResponse};

    #[derive(Debug, Default)]
    struct RecordingTransport {
        requests: Mutex<Vec<InvalidationRequest>>,
    }

    impl Transport for RecordingTransport {
        fn send(
            &self,
            request: &InvalidationRequest,
        ) -> std::result::Result<TransportResponse, TransportError> {
            self.requests.lock().push(request.clone());
            Ok(TransportResponse::new(200, "Ban added"))
        }
    }

    fn varnish() -> (VarnishCache, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let cache =
            VarnishCache::with_transport("http://localhost:8080", transport.clone()).unwrap();
        (cache, transport)
    }

    #[test]
    fn test_rejects_invalid_location() {
        let transport = Arc::new(RecordingTransport::default());
        let err = VarnishCache::with_transport("http://localhost:8080/", transport).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_build_request_composes_url_and_host() {
        let (cache, _) = varnish();
        let request = cache
            .build_request(InvalidationMethod::Ban, "acme.co.uk", "/some/path")
            .unwrap();

        assert_eq!(request.method, InvalidationMethod::Ban);
        assert_eq!(request.url.as_str(), "http://localhost:8080/some/path");
        assert_eq!(request.host, "acme.co.uk");
    }

    #[test]
    fn test_accepts_valid_paths() {
        let (cache, transport) = varnish();

        for path in [
            "/path/to",
            "/path/to/",
            "/path/to/(.*?)",
            "/path(.*?).jpg",
            "/(.*?).jpg",
            "/",
            "/archive/[0-9]{4}/",
            r"/images/(.*)\.jpg",
            r"/news/\d+/",
        ] {
            let result = cache.ban("acme.co.uk", path);
            assert!(result.is_ok(), "{path} should be accepted: {result:?}");
        }

        assert_eq!(transport.requests.lock().len(), 9);
    }

    #[test]
    fn test_regex_escapes_survive_on_the_wire() {
        let (cache, _) = varnish();

        let request = cache
            .build_request(InvalidationMethod::Ban, "acme.co.uk", r"/(.*)\.jpg")
            .unwrap();
        assert_eq!(request.url.as_str(), "http://localhost:8080/(.*)%5C.jpg");

        let request = cache
            .build_request(InvalidationMethod::Ban, "acme.co.uk", r"/news/\d+/")
            .unwrap();
        assert_eq!(request.url.as_str(), "http://localhost:8080/news/%5Cd+/");
    }

    #[test]
    fn test_braces_are_percent_encoded() {
        let (cache, _) = varnish();

        let request = cache
            .build_request(InvalidationMethod::Ban, "acme.co.uk", "/archive/[0-9]{4}/")
            .unwrap();
        assert_eq!(request.url.as_str(), "http://localhost:8080/archive/[0-9]%7B4%7D/");
    }

    #[test]
    fn test_rejects_invalid_paths() {
        let (cache, transport) = varnish();

        for path in ["^.*$", "path/to", "", "/a/../b", "@evil.example.com/"] {
            let err = cache.ban("acme.co.uk", path).unwrap_err();
            assert!(err.is_invalid_request(), "{path} should be rejected");
        }

        assert!(transport.requests.lock().is_empty());
    }

    #[test]
    fn test_rejects_unusable_domain() {
        let (cache, transport) = varnish();

        assert!(cache.ban("", "/").unwrap_err().is_invalid_request());
        assert!(cache.ban("acme co uk", "/").unwrap_err().is_invalid_request());
        assert!(cache.ban("acme.co.uk\r\n", "/").unwrap_err().is_invalid_request());
        assert!(transport.requests.lock().is_empty());
    }

    #[test]
    fn test_page_and_path_methods() {
        let (cache, transport) = varnish();

        cache
            .invalidate_page("acme.co.uk", "/some/path", InvalidationMode::Lazy)
            .unwrap();
        cache
            .invalidate_page("acme.co.uk", "/some/path", InvalidationMode::Immediate)
            .unwrap();
        cache
            .invalidate_path("acme.co.uk", "/some/path", InvalidationMode::Immediate)
            .unwrap();

        let methods: Vec<_> = transport.requests.lock().iter().map(|r| r.method).collect();
        assert_eq!(
            methods,
            vec![
                InvalidationMethod::Ban,
                InvalidationMethod::Purge,
                InvalidationMethod::Ban
            ]
        );
    }

    #[test]
    fn test_name_and_debug() {
        let (cache, _) = varnish();
        assert_eq!(cache.name(), "varnish");
        assert_eq!(cache.location().as_str(), "http://localhost:8080");
        assert!(format!("{cache:?}").contains("http://localhost:8080"));
    }
}
