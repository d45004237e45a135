//! Error types for cache invalidation.
//!
//! Only two kinds of failure ever reach a caller: a malformed backend
//! location at construction time, and a malformed invalidation request
//! detected before anything is sent. Network failures and error responses
//! from a cache proxy are logged by the backend and never surface here.

use thiserror::Error;

/// Convenience alias for results carrying an [`InvalidationError`].
pub type Result<T> = std::result::Result<T, InvalidationError>;

/// Errors returned by invalidation backends and the handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidationError {
    /// The backend location is not a bare http(s) origin.
    #[error("invalid backend location '{location}': {reason}")]
    Configuration {
        /// The location string as configured
        location: String,
        /// Why it was rejected
        reason: String,
    },

    /// The request was rejected before any network call was made.
    #[error("invalid invalidation request for '{target}': {reason}")]
    InvalidRequest {
        /// The composed URL, or the offending value when no URL exists yet
        target: String,
        /// Why it was rejected
        reason: String,
    },
}

impl InvalidationError {
    /// Creates a new configuration error.
    pub fn configuration(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new invalid request error.
    pub fn invalid_request(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error was raised while constructing a backend.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Returns true if this error was raised while shaping a request.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Self::InvalidRequest { .. })
    }
}
