//! `MacLookupClient` — connection lifecycle and the lookup operation.
//!
//! The client owns at most one transport and moves through
//! `Unopened -> Open -> Closed`. `lookup` is only valid while open; `close`
//! is valid from any state and idempotent. Dropping the client closes it, so
//! an early `?` return never leaks the connection.

use std::time::Duration;

use crate::config::EndpointConfig;
use crate::error::LookupError;
use crate::request::{Endpoint, LookupRequest};
use crate::response::LookupResponse;
use crate::transport::{HttpsTransport, Transport};

/// Shortest API key accepted. Sanity check only; the service is authoritative.
pub const API_KEY_MIN: usize = 8;

/// Lifecycle state of a [`MacLookupClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Unopened,
    Open,
    Closed,
}

struct Session<T> {
    transport: T,
    endpoint: Endpoint,
    api_key: String,
}

enum Connection<T> {
    Unopened,
    Open(Session<T>),
    Closed,
}

/// Client for the macaddress.io lookup API.
pub struct MacLookupClient<T: Transport = HttpsTransport> {
    connection: Connection<T>,
}

impl<T: Transport> Default for MacLookupClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl MacLookupClient<HttpsTransport> {
    /// Open an HTTPS transport to `endpoint`.
    ///
    /// Fails with `Configuration` before any network activity if the host or
    /// API key is unusable.
    /// Fails with `Connection` if the host does not resolve.
    pub fn connect(
        &mut self,
        endpoint: &Endpoint,
        api_key: &str,
        timeout: Duration,
    ) -> crate::Result<()> {
        self.ensure_unopened()?;
        validate_connect_args(endpoint, api_key)?;
        let transport = HttpsTransport::connect(endpoint, timeout)?;
        self.attach(transport, endpoint.clone(), api_key)
    }

    /// [`connect`](Self::connect) using an endpoint section from the config file.
    pub fn connect_with_config(
        &mut self,
        config: &EndpointConfig,
        api_key: &str,
    ) -> crate::Result<()> {
        self.connect(&Endpoint::from(config), api_key, config.timeout())
    }
}

impl<T: Transport> MacLookupClient<T> {
    pub fn new() -> Self {
        Self {
            connection: Connection::Unopened,
        }
    }

    pub fn state(&self) -> ClientState {
        match self.connection {
            Connection::Unopened => ClientState::Unopened,
            Connection::Open(_) => ClientState::Open,
            Connection::Closed => ClientState::Closed,
        }
    }

    /// Open the client over an already-built transport.
    ///
    /// Applies the same host and key checks as `connect`.
    pub fn attach(&mut self, transport: T, endpoint: Endpoint, api_key: &str) -> crate::Result<()> {
        self.ensure_unopened()?;
        validate_connect_args(&endpoint, api_key)?;
        tracing::info!(host = %endpoint.host, port = endpoint.port, "connected to lookup service");
        self.connection = Connection::Open(Session {
            transport,
            endpoint,
            api_key: api_key.to_string(),
        });
        Ok(())
    }

    /// Look up one MAC address over the open connection.
    pub fn lookup(&mut self, mac_address: &str) -> crate::Result<LookupResponse> {
        let session = match &mut self.connection {
            Connection::Open(session) => session,
            Connection::Unopened => {
                return Err(LookupError::State(
                    "lookup called before connect".to_string(),
                ));
            }
            Connection::Closed => {
                return Err(LookupError::State(
                    "lookup called after close".to_string(),
                ));
            }
        };
        if mac_address.trim().is_empty() {
            return Err(LookupError::Configuration(
                "missing MAC address".to_string(),
            ));
        }

        let request = LookupRequest::new(
            mac_address,
            session.api_key.as_str(),
            session.endpoint.clone(),
        );
        let response = session.transport.get(&request)?;
        tracing::debug!(
            search = %mac_address,
            status = response.http_status,
            "lookup complete"
        );
        Ok(response)
    }

    /// Release the transport. No-op if never opened or already closed.
    pub fn close(&mut self) {
        if let Connection::Open(mut session) =
            std::mem::replace(&mut self.connection, Connection::Closed)
        {
            session.transport.close();
            tracing::debug!(host = %session.endpoint.host, "lookup client closed");
        }
    }

    fn ensure_unopened(&self) -> crate::Result<()> {
        match self.state() {
            ClientState::Unopened => Ok(()),
            state => Err(LookupError::State(format!(
                "connect requires an unopened client, found {:?}",
                state
            ))),
        }
    }
}

impl<T: Transport> Drop for MacLookupClient<T> {
    fn drop(&mut self) {
        self.close();
    }
}

fn validate_connect_args(endpoint: &Endpoint, api_key: &str) -> crate::Result<()> {
    if endpoint.host.trim().is_empty() {
        return Err(LookupError::Configuration(
            "missing lookup service host".to_string(),
        ));
    }
    if api_key.is_empty() {
        return Err(LookupError::Configuration("missing API key".to_string()));
    }
    if api_key.chars().count() < API_KEY_MIN {
        return Err(LookupError::Configuration(format!(
            "API key must be at least {} characters",
            API_KEY_MIN
        )));
    }
    Ok(())
}
