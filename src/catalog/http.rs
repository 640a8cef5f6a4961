//! HTTP implementation of the catalog client
//!
//! Performs the multipart asset creation call, polls the resulting operation
//! until processing finishes, and posts collectible listings. Retry policy
//! lives with the caller; every method here represents a single attempt.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, COOKIE, RETRY_AFTER};
use reqwest::{multipart, Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::catalog::{shared, CatalogClient, CatalogError, CatalogResult, Credentials};
use crate::uploader::job::AssetKind;

/// Base URL for asset creation and operation polling
const ASSETS_BASE_URL: &str = "https://apis.roblox.com/assets/user-auth/v1";
/// Endpoint for putting assets up for sale
const COLLECTIBLES_URL: &str = "https://itemconfiguration.roblox.com/v1/collectibles";
/// Upload fee allowance sent with every creation request
const EXPECTED_UPLOAD_FEE: u32 = 10;
/// How many times to poll an operation before giving up on the attempt
const OPERATION_POLL_ATTEMPTS: u32 = 10;
/// Pause between operation polls
const OPERATION_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Longest response body fragment carried into error messages
const ERROR_BODY_LIMIT: usize = 200;

/// Production catalog client backed by the shared HTTP connection pool
pub struct HttpCatalogClient {
    client: Arc<Client>,
    assets_base_url: String,
    collectibles_url: String,
}

impl HttpCatalogClient {
    /// Create a client against the production endpoints.
    pub fn new() -> Self {
        Self {
            client: shared::shared_http_client(),
            assets_base_url: ASSETS_BASE_URL.to_string(),
            collectibles_url: COLLECTIBLES_URL.to_string(),
        }
    }

    /// Create a client against alternate endpoints.
    pub fn with_base_urls(
        assets_base_url: impl Into<String>,
        collectibles_url: impl Into<String>,
    ) -> Self {
        Self {
            client: shared::shared_http_client(),
            assets_base_url: assets_base_url.into(),
            collectibles_url: collectibles_url.into(),
        }
    }

    fn cookie_header(credentials: &Credentials) -> String {
        format!(".ROBLOSECURITY={}", credentials.cookie)
    }

    /// Poll the operation endpoint until the asset finishes processing.
    async fn poll_operation(
        &self,
        credentials: &Credentials,
        operation_id: &str,
    ) -> CatalogResult<u64> {
        let url = format!("{}/operations/{}", self.assets_base_url, operation_id);

        for attempt in 0..OPERATION_POLL_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(OPERATION_POLL_INTERVAL).await;
            }
            debug!(operation_id, attempt, "Polling asset operation");

            let response = self
                .client
                .get(&url)
                .header(COOKIE, Self::cookie_header(credentials))
                .send()
                .await
                .map_err(|e| CatalogError::Network(e.to_string()))?;

            if !response.status().is_success() {
                continue;
            }

            let body: OperationResponse = response
                .json()
                .await
                .map_err(|e| CatalogError::MalformedResponse(e.to_string()))?;

            if body.done.unwrap_or(false) {
                return body
                    .response
                    .as_ref()
                    .and_then(|r| r.asset_id.as_ref())
                    .and_then(parse_asset_id)
                    .ok_or_else(|| {
                        CatalogError::MalformedResponse(format!(
                            "operation {operation_id} completed without an asset id"
                        ))
                    });
            }
        }

        Err(CatalogError::OperationIncomplete(operation_id.to_string()))
    }
}

impl Default for HttpCatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn create_asset(
        &self,
        credentials: &Credentials,
        name: &str,
        file_bytes: &[u8],
        kind: AssetKind,
        group_id: u64,
        description: &str,
    ) -> CatalogResult<u64> {
        let payload = json!({
            "assetType": kind.api_name(),
            "creationContext": {
                "creator": { "groupId": group_id },
                "expectedPrice": EXPECTED_UPLOAD_FEE,
            },
            "description": description,
            "displayName": name,
        });

        let image_part = multipart::Part::bytes(file_bytes.to_vec())
            .file_name("upload.png")
            .mime_str("image/png")
            .map_err(|e| CatalogError::Network(e.to_string()))?;
        let form = multipart::Form::new()
            .text("request", payload.to_string())
            .part("fileContent", image_part);

        debug!(asset_name = %name, kind = %kind, "Creating asset");
        let response = self
            .client
            .post(format!("{}/assets", self.assets_base_url))
            .header(COOKIE, Self::cookie_header(credentials))
            .multipart(form)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited {
                retry_after: parse_retry_after(response.headers()),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;
        let parsed: CreateAssetResponse = serde_json::from_str(&body)
            .map_err(|_| CatalogError::MalformedResponse(truncate_body(&body)))?;

        match parsed.operation_id {
            Some(operation_id) => self.poll_operation(credentials, &operation_id).await,
            None => Err(classify_rejection(status, parsed.message)),
        }
    }

    async fn release_for_sale(
        &self,
        credentials: &Credentials,
        asset_id: u64,
        price: u32,
        name: &str,
        description: &str,
        group_id: u64,
    ) -> CatalogResult<()> {
        let payload = json!({
            "saleLocationConfiguration": { "saleLocationType": 1, "places": [] },
            "targetId": asset_id,
            "priceInRobux": price,
            "publishingType": 2,
            "idempotencyToken": Uuid::new_v4().to_string(),
            "publisherUserId": credentials.user_id,
            "creatorGroupId": group_id,
            "name": name,
            "description": description,
            "isFree": false,
            "agreedPublishingFee": 0,
            "priceOffset": 0,
            "quantity": 0,
            "quantityLimitPerUser": 0,
            "resaleRestriction": 2,
            "targetType": 0,
        });

        debug!(asset_id, price, "Releasing asset for sale");
        let response = self
            .client
            .post(&self.collectibles_url)
            .header(COOKIE, Self::cookie_header(credentials))
            .json(&payload)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited {
                retry_after: parse_retry_after(response.headers()),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Rejected {
                status: status.as_u16(),
                message: truncate_body(&body),
            });
        }

        let body: ReleaseResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::MalformedResponse(e.to_string()))?;
        match body.status {
            Some(0) => Ok(()),
            other => Err(CatalogError::Rejected {
                status: status.as_u16(),
                message: format!(
                    "listing returned status {}",
                    other.map_or_else(|| "none".to_string(), |s| s.to_string())
                ),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAssetResponse {
    operation_id: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    done: Option<bool>,
    response: Option<OperationResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResult {
    asset_id: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    status: Option<i64>,
}

/// Parse a `Retry-After` header into a duration, if present and numeric.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// The operations endpoint reports asset ids as either a JSON number or a
/// numeric string depending on the API version.
fn parse_asset_id(value: &serde_json::Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

/// Map an error payload onto the terminal/transient taxonomy.
fn classify_rejection(status: StatusCode, message: Option<String>) -> CatalogError {
    let message = message.unwrap_or_else(|| "unknown error".to_string());
    let lowered = message.to_lowercase();
    if lowered.contains("insufficientfunds") || lowered.contains("insufficient funds") {
        CatalogError::InsufficientFunds
    } else if lowered.contains("unauthorized") {
        CatalogError::Unauthorized
    } else {
        CatalogError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= ERROR_BODY_LIMIT {
        body.to_string()
    } else {
        let cut: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        format!("{cut}...")
    }
}
