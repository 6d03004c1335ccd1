//! Lookup service configuration — deserialization and validation.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::LookupError;

/// Standard HTTPS port; the only port on which the client negotiates TLS.
pub const HTTPS_PORT: u16 = 443;

/// Host serving the macaddress.io REST API.
pub const DEFAULT_HOST: &str = "api.macaddress.io";

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    HTTPS_PORT
}

fn default_timeout_ms() -> u64 {
    5_000
}

/// Top-level configuration, parsed from `maclookup.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,
}

/// Where and how to reach the lookup service.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bounds connect and the blocking receive, default 5s
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl EndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl LookupConfig {
    /// Read and parse a config file, validating it before returning.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LookupError::Configuration(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: LookupConfig = toml::from_str(&content).map_err(|e| {
            LookupError::Configuration(format!(
                "failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), host = %config.endpoint.host, "loaded config");
        Ok(config)
    }

    /// Fail fast on settings that could never produce a lookup.
    pub fn validate(&self) -> crate::Result<()> {
        let endpoint = &self.endpoint;
        if endpoint.host.trim().is_empty() {
            return Err(LookupError::Configuration(
                "endpoint host must not be empty".to_string(),
            ));
        }
        if endpoint.port == 0 {
            return Err(LookupError::Configuration(
                "endpoint port must be non-zero".to_string(),
            ));
        }
        if endpoint.timeout_ms == 0 {
            return Err(LookupError::Configuration(
                "timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
