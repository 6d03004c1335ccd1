//! Error types for MAC lookup operations.

use std::time::Duration;

use thiserror::Error;

/// Main error type for lookup operations.
///
/// Service-reported failures (HTTP status >= 300) are not errors; they are
/// carried as data on [`crate::LookupResponse`].
#[derive(Error, Debug)]
pub enum LookupError {
    /// Missing or invalid API key, host, MAC address or config file
    #[error("configuration error: {0}")]
    Configuration(String),

    /// DNS, TCP or TLS failure talking to the lookup service
    #[error("connection error: {0}")]
    Connection(String),

    /// No response from the lookup service within the client timeout
    #[error("connection timed out after {}ms", .0.as_millis())]
    ConnectionTimeout(Duration),

    /// Response could not be parsed as HTTP, or its JSON body did not decode
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Operation not valid in the client's current state
    #[error("invalid client state: {0}")]
    State(String),
}

impl LookupError {
    /// True for transport-level failures, including timeouts.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            LookupError::Connection(_) | LookupError::ConnectionTimeout(_)
        )
    }

    /// Process exit code for a lookup that failed locally.
    ///
    /// Configuration errors get `EINVAL` so scripts can tell them apart from
    /// network trouble; everything else is `EIO`.
    pub fn exit_code(&self) -> i32 {
        match self {
            LookupError::Configuration(_) => libc::EINVAL,
            _ => libc::EIO,
        }
    }
}

/// Result type alias for lookup operations
pub type Result<T> = std::result::Result<T, LookupError>;
