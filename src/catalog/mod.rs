//! Remote catalog API surface
//!
//! The upload pipeline talks to the catalog exclusively through the
//! [`CatalogClient`] trait so tests can substitute scripted implementations.
//! [`http::HttpCatalogClient`] is the production implementation.

use async_trait::async_trait;
use std::time::Duration;

use crate::uploader::job::AssetKind;

pub mod http;
pub mod shared;

pub use http::HttpCatalogClient;
pub use shared::shared_http_client;

/// Catalog call errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The group balance cannot cover the upload fee
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Credentials rejected or missing group permissions
    #[error("unauthorized")]
    Unauthorized,

    /// Explicit throttle signal, optionally carrying the server's retry-after hint
    #[error("rate limited")]
    RateLimited {
        /// Parsed `Retry-After` value, when the server sent one
        retry_after: Option<Duration>,
    },

    /// Transport-level failure (connection, TLS, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with an error payload or status
    #[error("catalog rejected the request (status {status}): {message}")]
    Rejected {
        /// HTTP status code of the response
        status: u16,
        /// Error message extracted from the response body
        message: String,
    },

    /// Response arrived but could not be interpreted
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Asset creation was accepted but never reported completion
    #[error("asset operation did not complete: {0}")]
    OperationIncomplete(String),
}

impl CatalogError {
    /// True for errors that must never be retried.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CatalogError::InsufficientFunds | CatalogError::Unauthorized
        )
    }

    /// True for explicit throttle signals.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, CatalogError::RateLimited { .. })
    }

    /// Server-provided retry-after hint, if this is a throttle signal that
    /// carried one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            CatalogError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Session credentials for authenticated catalog calls.
///
/// `Debug` redacts the cookie so credentials never end up in logs.
#[derive(Clone)]
pub struct Credentials {
    /// `.ROBLOSECURITY` session cookie value
    pub cookie: String,
    /// User id reported as the publisher when listing assets
    pub user_id: u64,
}

impl Credentials {
    /// Create credentials from a session cookie and publisher user id.
    pub fn new(cookie: impl Into<String>, user_id: u64) -> Self {
        Self {
            cookie: cookie.into(),
            user_id,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("cookie", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Client contract for the two remote operations the pipeline performs
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Upload a new asset and wait for processing to finish.
    ///
    /// # Arguments
    /// * `name` - Display name for the asset
    /// * `file_bytes` - PNG image contents
    /// * `kind` - Asset category (shirt, pants, tshirt)
    /// * `group_id` - Group the asset is created under
    /// * `description` - Asset description
    ///
    /// # Returns
    /// The numeric id of the created asset
    ///
    /// # Errors
    /// Terminal errors (insufficient funds, unauthorized) must not be
    /// retried; everything else is transient
    async fn create_asset(
        &self,
        credentials: &Credentials,
        name: &str,
        file_bytes: &[u8],
        kind: AssetKind,
        group_id: u64,
        description: &str,
    ) -> CatalogResult<u64>;

    /// Put an uploaded asset up for sale at the given price.
    ///
    /// # Arguments
    /// * `asset_id` - Id returned by [`CatalogClient::create_asset`]
    /// * `price` - Sale price in Robux
    ///
    /// # Errors
    /// All listing failures are transient from the caller's perspective
    async fn release_for_sale(
        &self,
        credentials: &Credentials,
        asset_id: u64,
        price: u32,
        name: &str,
        description: &str,
        group_id: u64,
    ) -> CatalogResult<()>;
}
