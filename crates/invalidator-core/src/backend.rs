//! Cache invalidation backend trait definition.

use std::fmt::Debug;

use crate::error::Result;
use crate::location::BackendLocation;
use crate::mode::InvalidationMode;

/// A cache proxy that can be told to drop content.
///
/// This trait abstracts over different proxy products so that callers can
/// invalidate content without knowing which caches sit in front of them.
/// Implementations validate their [`BackendLocation`] when they are built;
/// a backend that exists is always pointed at a bare http(s) origin.
///
/// Invalidation is advisory. Implementations must log and swallow network
/// failures and error responses, and only return an error when the request
/// itself is malformed.
///
/// # Implementors
///
/// - `VarnishCache` - issues `BAN` / `PURGE` requests to Varnish
///
/// # Example
///
/// ```
/// use invalidator_core::{BackendLocation, CacheInvalidationHandler, InvalidationMode, Result};
///
/// #[derive(Debug)]
/// struct NullCache {
///     location: BackendLocation,
/// }
///
/// impl CacheInvalidationHandler for NullCache {
///     fn name(&self) -> &str {
///         "null"
///     }
///
///     fn location(&self) -> &BackendLocation {
///         &self.location
///     }
///
///     fn invalidate_page(&self, _domain: &str, _path: &str, _mode: InvalidationMode) -> Result<()> {
///         Ok(())
///     }
///
///     fn invalidate_path(&self, _domain: &str, _path: &str, _mode: InvalidationMode) -> Result<()> {
///         Ok(())
///     }
/// }
///
/// let cache = NullCache { location: BackendLocation::parse("http://localhost").unwrap() };
/// assert!(cache.invalidate_page("acme.co.uk", "/", InvalidationMode::Lazy).is_ok());
/// ```
pub trait CacheInvalidationHandler: Send + Sync + Debug {
    /// Returns the backend kind, used for logging.
    fn name(&self) -> &str;

    /// Returns the origin this backend talks to.
    fn location(&self) -> &BackendLocation;

    /// Invalidates the single resource at `path` on `domain`.
    ///
    /// With [`InvalidationMode::Immediate`] the resource is evicted rather
    /// than marked stale, if the backend supports it.
    ///
    /// # Errors
    ///
    /// `InvalidationError::InvalidRequest` if the request cannot be built;
    /// nothing is sent in that case.
    fn invalidate_page(&self, domain: &str, path: &str, mode: InvalidationMode) -> Result<()>;

    /// Invalidates every resource on `domain` matching `path`.
    ///
    /// `path` may embed a pattern in the backend's matching language
    /// (for Varnish, a VCL regular expression). It is passed through
    /// unchanged.
    ///
    /// # Errors
    ///
    /// `InvalidationError::InvalidRequest` if the request cannot be built;
    /// nothing is sent in that case.
    fn invalidate_path(&self, domain: &str, path: &str, mode: InvalidationMode) -> Result<()>;
}

impl<T: CacheInvalidationHandler + ?Sized> CacheInvalidationHandler for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn location(&self) -> &BackendLocation {
        (**self).location()
    }

    fn invalidate_page(&self, domain: &str, path: &str, mode: InvalidationMode) -> Result<()> {
        (**self).invalidate_page(domain, path, mode)
    }

    fn invalidate_path(&self, domain: &str, path: &str, mode: InvalidationMode) -> Result<()> {
        (**self).invalidate_path(domain, path, mode)
    }
}
