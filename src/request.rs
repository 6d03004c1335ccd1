//! Lookup request construction.
//!
//! Builds the `/v1` GET path for the macaddress.io API. Only the MAC is
//! URL-encoded; the API key and `output=json` go out as given.

use url::Url;
use url::form_urlencoded::byte_serialize;

use crate::config::{EndpointConfig, HTTPS_PORT};
use crate::error::LookupError;

/// Location of the lookup service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// TLS is negotiated on the standard HTTPS port only.
    pub fn scheme(&self) -> &'static str {
        if self.port == HTTPS_PORT {
            "https"
        } else {
            "http"
        }
    }
}

impl From<&EndpointConfig> for Endpoint {
    fn from(config: &EndpointConfig) -> Self {
        Endpoint::new(config.host.clone(), config.port)
    }
}

/// A single MAC lookup, immutable once built.
#[derive(Debug, Clone)]
pub struct LookupRequest {
    mac_address: String,
    api_key: String,
    endpoint: Endpoint,
}

impl LookupRequest {
    pub fn new(
        mac_address: impl Into<String>,
        api_key: impl Into<String>,
        endpoint: Endpoint,
    ) -> Self {
        Self {
            mac_address: mac_address.into(),
            api_key: api_key.into(),
            endpoint,
        }
    }

    pub fn mac_address(&self) -> &str {
        &self.mac_address
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Request target: `/v1?apiKey=<key>&output=json&search=<mac>`.
    pub fn path(&self) -> String {
        let search: String = byte_serialize(self.mac_address.as_bytes()).collect();
        format!(
            "/v1?apiKey={}&output=json&search={}",
            self.api_key, search
        )
    }

    /// Absolute URL for the request.
    pub fn url(&self) -> crate::Result<Url> {
        let raw = format!(
            "{}://{}:{}{}",
            self.endpoint.scheme(),
            self.endpoint.host,
            self.endpoint.port,
            self.path()
        );
        Url::parse(&raw).map_err(|e| {
            LookupError::Configuration(format!(
                "invalid lookup URL for host '{}': {}",
                self.endpoint.host, e
            ))
        })
    }
}
