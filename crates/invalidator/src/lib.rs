//! Invalidator - cache invalidation dispatcher
//!
//! Application code calls [`CacheHandler`] after it changes content; the
//! handler forwards the invalidation to every configured reverse proxy in
//! configuration order.
//!
//! ```no_run
//! use invalidator::{BackendConfig, CacheHandler, InvalidationMode};
//!
//! let handler = CacheHandler::new(&[
//!     BackendConfig::varnish("http://localhost:6081"),
//!     BackendConfig::varnish("http://proxy2:6081"),
//! ])?;
//!
//! handler.invalidate_page("acme.co.uk", "/news/today", InvalidationMode::Lazy)?;
//! # Ok::<(), invalidator::InvalidationError>(())
//! ```

pub mod handler;
pub mod settings;
pub mod telemetry;

pub use handler::CacheHandler;
pub use settings::{Settings, SettingsError};

pub use invalidator_core::{
    BackendConfig, BackendLocation, CacheInvalidationHandler, InvalidationError, InvalidationMode,
};
pub use invalidator_varnish::{HttpTransport, Transport, VarnishCache};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
