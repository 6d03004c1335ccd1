//! HTTP(S) transport to the lookup service.
//!
//! `HttpsTransport` wraps a blocking reqwest client configured for a single
//! request: rustls TLS on port 443, no redirects, one pooled connection, and
//! a timeout covering connect plus the full receive. The `Transport` trait is
//! the seam `MacLookupClient` holds, so the state machine can be driven
//! without a network.

use std::error::Error as StdError;
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;

use crate::error::LookupError;
use crate::request::{Endpoint, LookupRequest};
use crate::response::{HTTP_OK_LIMIT, LookupResponse};

/// An open channel to the lookup service, good for sending GET requests.
pub trait Transport {
    /// Send one GET and read the complete response.
    fn get(&mut self, request: &LookupRequest) -> crate::Result<LookupResponse>;

    /// Release the underlying connection. Must tolerate repeated calls.
    fn close(&mut self);
}

/// Blocking HTTPS transport backed by reqwest.
pub struct HttpsTransport {
    client: Option<Client>,
    endpoint: Endpoint,
    timeout: Duration,
}

impl HttpsTransport {
    /// Resolve `endpoint` and build the client for it.
    ///
    /// An unresolvable host fails here with [`LookupError::Connection`].
    /// reqwest performs the TCP and TLS handshake lazily on the first request,
    /// so refusal and TLS failures surface from [`Transport::get`].
    pub fn connect(endpoint: &Endpoint, timeout: Duration) -> crate::Result<Self> {
        let addrs = resolve(endpoint)?;
        let mut builder = Client::builder()
            .user_agent(concat!("maclookup/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .timeout(timeout)
            .redirect(Policy::none())
            .pool_max_idle_per_host(1);
        if is_loopback(&endpoint.host) {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| {
                LookupError::Connection(format!(
                    "failed to initialise client for {}: {}",
                    endpoint.host, e
                ))
            })?;

        tracing::debug!(
            host = %endpoint.host,
            port = endpoint.port,
            scheme = endpoint.scheme(),
            addrs = addrs.len(),
            timeout_ms = timeout.as_millis() as u64,
            "lookup transport ready"
        );

        Ok(Self {
            client: Some(client),
            endpoint: endpoint.clone(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Map a reqwest failure onto the lookup error taxonomy.
    ///
    /// The URL is stripped first: its query carries the API key.
    fn classify_error(&self, err: reqwest::Error) -> LookupError {
        let err = err.without_url();
        if err.is_timeout() {
            return LookupError::ConnectionTimeout(self.timeout);
        }
        if err.is_connect() || has_io_source(&err) {
            return LookupError::Connection(format!("{}: {}", self.endpoint.host, error_chain(&err)));
        }
        LookupError::Protocol(format!(
            "malformed response from {}: {}",
            self.endpoint.host,
            error_chain(&err)
        ))
    }
}

fn resolve(endpoint: &Endpoint) -> crate::Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = (endpoint.host.as_str(), endpoint.port)
        .to_socket_addrs()
        .map_err(|e| {
            LookupError::Connection(format!("failed to resolve {}: {}", endpoint.host, e))
        })?
        .collect();
    if addrs.is_empty() {
        return Err(LookupError::Connection(format!(
            "no addresses found for {}",
            endpoint.host
        )));
    }
    Ok(addrs)
}

fn is_loopback(host: &str) -> bool {
    host.eq_ignore_ascii_case("localhost")
        || host
            .parse::<std::net::IpAddr>()
            .is_ok_and(|ip| ip.is_loopback())
}

/// True when any error in the source chain is an I/O error.
fn has_io_source(err: &(dyn StdError + 'static)) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if cause.is::<std::io::Error>() {
            return true;
        }
        source = cause.source();
    }
    false
}

/// Flatten an error and its causes into one line.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

impl Transport for HttpsTransport {
    fn get(&mut self, request: &LookupRequest) -> crate::Result<LookupResponse> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| LookupError::State("transport is closed".to_string()))?;
        let url = request.url()?;

        tracing::debug!(
            host = %self.endpoint.host,
            search = %request.mac_address(),
            "sending lookup request"
        );

        let response = client
            .get(url)
            .send()
            .map_err(|e| self.classify_error(e))?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("Unknown");
        tracing::debug!(status = status.as_u16(), reason = %reason, "lookup response received");

        if status.as_u16() >= HTTP_OK_LIMIT {
            // Only status and reason matter once the exchange has failed.
            return LookupResponse::from_parts(status.as_u16(), reason, None);
        }

        let body = response.text().map_err(|e| self.classify_error(e))?;
        LookupResponse::from_parts(status.as_u16(), reason, Some(&body))
    }

    fn close(&mut self) {
        if self.client.take().is_some() {
            tracing::debug!(host = %self.endpoint.host, "lookup transport closed");
        }
    }
}

impl Drop for HttpsTransport {
    fn drop(&mut self) {
        self.close();
    }
}
