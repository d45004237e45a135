//! # Invalidator Varnish Backend
//!
//! Varnish implementation of [`CacheInvalidationHandler`].
//!
//! Invalidations are sent as HTTP requests with the non-standard `BAN` and
//! `PURGE` verbs to the proxy's own address, carrying the public domain in
//! the `Host` header. The proxy's VCL must accept those verbs, for example:
//!
//! ```text
//! if (req.method == "BAN") {
//!     ban("req.http.host == " + req.http.host + " && req.url ~ " + req.url);
//!     return (synth(200, "Ban added"));
//! }
//! if (req.method == "PURGE") {
//!     return (purge);
//! }
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use invalidator_varnish::{CacheInvalidationHandler, InvalidationMode, VarnishCache};
//!
//! let varnish = VarnishCache::new("http://localhost:6081")?;
//! varnish.invalidate_page("acme.co.uk", "/news/today", InvalidationMode::Lazy)?;
//! varnish.invalidate_path("acme.co.uk", "/news/(.*)", InvalidationMode::Lazy)?;
//! # Ok::<(), invalidator_varnish::InvalidationError>(())
//! ```

pub mod transport;
pub mod varnish;

// Re-exports
pub use transport::{
    HttpTransport, InvalidationRequest, Transport, TransportError, TransportResponse,
};
pub use varnish::VarnishCache;

// Re-export the contract for consumers
pub use invalidator_core::{
    BackendLocation, CacheInvalidationHandler, InvalidationError, InvalidationMethod,
    InvalidationMode,
};
