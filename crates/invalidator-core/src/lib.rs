//! Invalidator Core - Domain types and traits
//!
//! This crate provides the foundational types shared by every cache
//! invalidation backend: the validated [`BackendLocation`], the
//! [`InvalidationMode`] requested by callers, the [`InvalidationMethod`]
//! sent on the wire, and the [`CacheInvalidationHandler`] contract.
//!
//! # Example
//!
//! ```
//! use invalidator_core::{BackendLocation, InvalidationMethod, InvalidationMode};
//!
//! let location = BackendLocation::parse("http://localhost:6081").unwrap();
//! assert_eq!(location.authority(), "localhost:6081");
//!
//! let method = InvalidationMethod::for_page(InvalidationMode::Immediate);
//! assert_eq!(method.as_str(), "PURGE");
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod location;
pub mod mode;

pub use backend::CacheInvalidationHandler;
pub use config::BackendConfig;
pub use error::{InvalidationError, Result};
pub use location::BackendLocation;
pub use mode::{InvalidationMethod, InvalidationMode};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
