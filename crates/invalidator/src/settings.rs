//! Configuration loading.
//!
//! Sources, lowest precedence first:
//!
//! 1. `invalidator.{toml,yaml,json}` in the working directory (optional)
//! 2. an explicit file passed on the command line (required when given)
//! 3. environment variables prefixed `INVALIDATOR`, nested with `__`,
//!    e.g. `INVALIDATOR__REQUEST_TIMEOUT_SECS=5`
//!
//! ```toml
//! request_timeout_secs = 10
//! log_level = "debug"
//!
//! [[backends]]
//! kind = "varnish"
//! location = "http://localhost:6081"
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use invalidator_core::BackendConfig;
use invalidator_varnish::{HttpTransport, TransportError};
use serde::Deserialize;
use thiserror::Error;

/// Base name of the optional configuration file in the working directory.
pub const DEFAULT_CONFIG_BASENAME: &str = "invalidator";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "INVALIDATOR";

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),

    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to create HTTP transport: {0}")]
    Transport(#[from] TransportError),
}

impl SettingsError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Process-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Cache backends, in invocation order.
    pub backends: Vec<BackendConfig>,
    /// Timeout for one invalidation round-trip, in seconds.
    pub request_timeout_secs: u64,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backends: Vec::new(),
            request_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from the default file, `explicit`, and the environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder =
            Config::builder().add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a single file, ignoring other sources.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path).required(true))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.request_timeout_secs == 0 {
            return Err(SettingsError::invalid(
                "request_timeout_secs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Returns the request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the HTTP transport shared by all backends.
    pub fn transport(&self) -> Result<HttpTransport, SettingsError> {
        Ok(HttpTransport::with_timeout(self.request_timeout())?)
    }
}
