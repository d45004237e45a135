//! Backend configuration entries.

use serde::{Deserialize, Serialize};

/// Backend kind understood by the Varnish implementation.
pub const VARNISH_KIND: &str = "varnish";

/// One configured cache backend.
///
/// Entries are kept as plain strings so that an unknown `kind` can be
/// reported and skipped without first validating its location.
///
/// # Example
///
/// ```
/// use invalidator_core::BackendConfig;
///
/// let entry = BackendConfig::varnish("http://localhost:6081");
/// assert!(entry.is_varnish());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend kind tag, e.g. `varnish`.
    #[serde(alias = "backend", alias = "BACKEND", alias = "KIND")]
    pub kind: String,

    /// Origin of the cache proxy.
    #[serde(alias = "LOCATION")]
    pub location: String,
}

impl BackendConfig {
    /// Creates a new entry.
    pub fn new(kind: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            location: location.into(),
        }
    }

    /// Creates a Varnish entry.
    pub fn varnish(location: impl Into<String>) -> Self {
        Self::new(VARNISH_KIND, location)
    }

    /// Returns true if this entry names a Varnish backend.
    pub fn is_varnish(&self) -> bool {
        self.kind == VARNISH_KIND
    }
}
