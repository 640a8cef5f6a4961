//! Shared HTTP resources for catalog calls
//!
//! All catalog clients run through one pooled `reqwest::Client` so worker
//! pools reuse connections to the same endpoints instead of opening a fresh
//! TLS session per call.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// HTTP connect timeout (seconds) - time to establish TCP connection
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
/// HTTP request timeout (seconds) - overall time for the entire request
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Idle connections kept per host for worker reuse
const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 20;

/// Global HTTP client shared by every catalog client instance
///
/// Configured with explicit timeouts so a stalled endpoint fails the current
/// attempt instead of hanging a worker indefinitely:
/// - Connect timeout: 10 seconds
/// - Request timeout: 30 seconds
pub static SHARED_HTTP_CLIENT: Lazy<Arc<Client>> = Lazy::new(|| {
    Arc::new(
        Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE_PER_HOST)
            .build()
            .unwrap_or_else(|e| {
                panic!("FATAL: Failed to build HTTP client: {}. Check system TLS configuration.", e);
            }),
    )
});

/// Get the shared HTTP client
///
/// Returns a clone of the Arc, which is cheap (just increments ref count)
pub fn shared_http_client() -> Arc<Client> {
    SHARED_HTTP_CLIENT.clone()
}
