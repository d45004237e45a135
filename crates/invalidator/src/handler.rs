//! Fan-out of invalidations to every configured backend.

use std::sync::Arc;

use invalidator_core::{
    BackendConfig, CacheInvalidationHandler, InvalidationError, InvalidationMode, Result,
};
use invalidator_varnish::{Transport, VarnishCache};
use tracing::{info, warn};

/// Owns the configured backends and broadcasts invalidations to them.
///
/// Backends are called one after another in configuration order. Each
/// backend already logs and swallows its own delivery failures, so one
/// unreachable proxy never stops the others from being invalidated.
#[derive(Debug)]
pub struct CacheHandler {
    caches: Vec<Box<dyn CacheInvalidationHandler>>,
}

impl CacheHandler {
    /// Builds backends from configuration, each with its own HTTP client.
    ///
    /// Entries of an unknown kind are skipped with a warning. With no usable
    /// entries the handler is a no-op and a "caching disabled" warning is
    /// logged.
    ///
    /// # Errors
    ///
    /// `InvalidationError::Configuration` if a known backend has a malformed
    /// location.
    pub fn new(config: &[BackendConfig]) -> Result<Self> {
        Self::build(config, VarnishCache::new)
    }

    /// Builds backends from configuration, all sending through `transport`.
    pub fn with_transport(config: &[BackendConfig], transport: Arc<dyn Transport>) -> Result<Self> {
        Self::build(config, |location| {
            VarnishCache::with_transport(location, Arc::clone(&transport))
        })
    }

    /// Wraps already constructed backends.
    pub fn from_backends(caches: Vec<Box<dyn CacheInvalidationHandler>>) -> Self {
        if caches.is_empty() {
            warn!("No caches set up - caching disabled");
        } else {
            info!(
                count = caches.len(),
                backends = ?caches.iter().map(|c| c.location().as_str()).collect::<Vec<_>>(),
                "Cache invalidation backends configured"
            );
        }

        Self { caches }
    }

    fn build(
        config: &[BackendConfig],
        mut varnish: impl FnMut(&str) -> Result<VarnishCache>,
    ) -> Result<Self> {
        let mut caches: Vec<Box<dyn CacheInvalidationHandler>> = Vec::with_capacity(config.len());

        for entry in config {
            if entry.is_varnish() {
                caches.push(Box::new(varnish(&entry.location)?));
            } else {
                warn!(
                    kind = %entry.kind,
                    location = %entry.location,
                    "Skipping cache backend of unknown kind"
                );
            }
        }

        Ok(Self::from_backends(caches))
    }

    /// Returns the backends in invocation order.
    pub fn backends(&self) -> &[Box<dyn CacheInvalidationHandler>] {
        &self.caches
    }

    /// Returns the number of backends.
    pub fn len(&self) -> usize {
        self.caches.len()
    }

    /// Returns true if no backend is configured.
    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    /// Returns true if at least one backend will be contacted.
    pub fn is_enabled(&self) -> bool {
        !self.is_empty()
    }

    /// Invalidates a single page on every backend.
    ///
    /// With [`InvalidationMode::Immediate`] the page is evicted right away.
    ///
    /// # Errors
    ///
    /// The first `InvalidRequest` returned by any backend. Every backend is
    /// still invoked.
    pub fn invalidate_page(&self, domain: &str, path: &str, mode: InvalidationMode) -> Result<()> {
        self.broadcast(|cache| cache.invalidate_page(domain, path, mode))
    }

    /// Invalidates every page matching `path` on every backend.
    ///
    /// `path` may contain a regular expression understood by the proxies.
    ///
    /// # Errors
    ///
    /// The first `InvalidRequest` returned by any backend. Every backend is
    /// still invoked.
    pub fn invalidate_path(&self, domain: &str, path: &str, mode: InvalidationMode) -> Result<()> {
        self.broadcast(|cache| cache.invalidate_path(domain, path, mode))
    }

    fn broadcast(&self, op: impl Fn(&dyn CacheInvalidationHandler) -> Result<()>) -> Result<()> {
        let mut first_error: Option<InvalidationError> = None;

        for cache in &self.caches {
            if let Err(e) = op(cache.as_ref()) {
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}
