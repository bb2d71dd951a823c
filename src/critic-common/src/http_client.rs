//! Centralized HTTP client factory.
//!
//! All clients share the same baseline configuration: User-Agent,
//! tcp_nodelay, a connect timeout and a bounded idle pool.
//!
//! Review requests deliberately carry no overall timeout unless one is
//! configured: the review service may take as long as it needs.

use reqwest::Client;
use std::time::Duration;

/// User-Agent string for all HTTP requests
pub const USER_AGENT: &str = concat!("critic-cli/", env!("CARGO_PKG_VERSION"));

/// Timeout for establishing a TCP/TLS connection
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection pool idle timeout so DNS is re-resolved periodically.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Creates an HTTP client builder with standard configuration.
///
/// Use this when the client needs further customization before building.
pub fn create_client_builder() -> reqwest::ClientBuilder {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .tcp_nodelay(true)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(4)
}

/// Creates the client used for review submissions.
///
/// `timeout` bounds the whole request when set; `None` waits indefinitely
/// for the review service.
pub fn create_review_client(timeout: Option<Duration>) -> Result<Client, String> {
    let builder = create_client_builder();
    let builder = match timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    };

    builder
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {e}"))
}
