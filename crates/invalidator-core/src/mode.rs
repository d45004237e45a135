//! Invalidation semantics and their wire encoding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidationError;

/// How eagerly cached content should be dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidationMode {
    /// Mark content stale; the proxy revalidates on the next request.
    #[default]
    Lazy,
    /// Evict content immediately.
    Immediate,
}

impl InvalidationMode {
    /// Returns true for [`InvalidationMode::Immediate`].
    pub fn is_purge(self) -> bool {
        matches!(self, Self::Immediate)
    }
}

impl From<bool> for InvalidationMode {
    /// Maps a `purge` flag: `true` is immediate eviction.
    fn from(purge: bool) -> Self {
        if purge { Self::Immediate } else { Self::Lazy }
    }
}

/// The cache operation sent to a proxy.
///
/// Proxies such as Varnish accept these as non-standard HTTP verbs; the verb
/// string only appears at the transport boundary via [`as_str`](Self::as_str).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidationMethod {
    /// Add a ban for matching objects.
    Ban,
    /// Remove the object right away.
    Purge,
}

impl InvalidationMethod {
    /// Method used to invalidate a single page.
    pub fn for_page(mode: InvalidationMode) -> Self {
        match mode {
            InvalidationMode::Lazy => Self::Ban,
            InvalidationMode::Immediate => Self::Purge,
        }
    }

    /// Method used to invalidate a path pattern.
    ///
    /// There is no bulk purge, so this is always [`InvalidationMethod::Ban`].
    pub fn for_path(_mode: InvalidationMode) -> Self {
        Self::Ban
    }

    /// Returns the HTTP verb for this method.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ban => "BAN",
            Self::Purge => "PURGE",
        }
    }
}

impl fmt::Display for InvalidationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvalidationMethod {
    type Err = InvalidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BAN" => Ok(Self::Ban),
            "PURGE" => Ok(Self::Purge),
            other => Err(InvalidationError::invalid_request(
                other,
                "method must be BAN or PURGE",
            )),
        }
    }
}
