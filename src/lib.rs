//! maclookup — MAC address vendor and virtual machine lookup.
//! Queries the macaddress.io REST API for one address, classifies the answer
//! and maps it to a shell-friendly exit code.

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;
pub mod verdict;

pub use client::{API_KEY_MIN, ClientState, MacLookupClient};
pub use config::{EndpointConfig, LookupConfig};
pub use error::{LookupError, Result};
pub use request::{Endpoint, LookupRequest};
pub use response::{Classification, LookupResponse, MacDetails, VendorDetails, classify, render};
pub use transport::{HttpsTransport, Transport};
pub use verdict::Verdict;
