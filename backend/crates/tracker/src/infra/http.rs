//! Shared HTTP client for the RDAP and DNS-over-HTTPS adapters.

use platform::config::NetworkConfig;
use reqwest::Client;

const USER_AGENT: &str = concat!("domain-tracker/", env!("CARGO_PKG_VERSION"));

/// Build a client with bounded connect and request times.
///
/// # Errors
///
/// Returns an error when the reqwest client cannot be constructed.
pub fn build_client(network: &NetworkConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(network.request_timeout())
        .connect_timeout(network.connect_timeout())
        .user_agent(USER_AGENT)
        .build()
}

pub(crate) fn transport_message(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {error}")
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else {
        error.to_string()
    }
}
