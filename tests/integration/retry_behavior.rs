//! Integration tests for retry behavior and backoff timing
//!
//! Uses the virtual clock, so the multi-second backoff schedules complete
//! instantly while still asserting on elapsed virtual time.

use std::collections::VecDeque;
use std::fs;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use catalog_uploader::catalog::{CatalogClient, CatalogError, CatalogResult, Credentials};
use catalog_uploader::shutdown::ShutdownCoordinator;
use catalog_uploader::uploader::{
    AssetKind, Job, RateLimiter, UploadAttemptRunner, UploadConfig, UploadStatus,
};

/// Catalog stub driven by a queue of scripted create responses.
struct ScriptedClient {
    create: Mutex<VecDeque<CatalogResult<u64>>>,
    release_fails: bool,
    create_calls: AtomicU32,
    release_calls: AtomicU32,
}

impl ScriptedClient {
    fn new(responses: Vec<CatalogResult<u64>>) -> Self {
        Self {
            create: Mutex::new(responses.into()),
            release_fails: false,
            create_calls: AtomicU32::new(0),
            release_calls: AtomicU32::new(0),
        }
    }

    fn with_failing_release(mut self) -> Self {
        self.release_fails = true;
        self
    }
}

#[async_trait]
impl CatalogClient for ScriptedClient {
    async fn create_asset(
        &self,
        _credentials: &Credentials,
        _name: &str,
        _file_bytes: &[u8],
        _kind: AssetKind,
        _group_id: u64,
        _description: &str,
    ) -> CatalogResult<u64> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.create
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(999))
    }

    async fn release_for_sale(
        &self,
        _credentials: &Credentials,
        _asset_id: u64,
        _price: u32,
        _name: &str,
        _description: &str,
        _group_id: u64,
    ) -> CatalogResult<()> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        if self.release_fails {
            Err(CatalogError::Network("release refused".to_string()))
        } else {
            Ok(())
        }
    }
}

struct Fixture {
    _dir: TempDir,
    job: Job,
    limiter: Arc<RateLimiter>,
}

impl Fixture {
    fn new(limiter_delay: Duration) -> Self {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("blue_shirt.png");
        fs::write(&source, b"\x89PNG\r\n\x1a\npixels").unwrap();
        Self {
            job: Job::new(source, AssetKind::Shirt),
            limiter: Arc::new(RateLimiter::new(limiter_delay, Duration::from_secs(120))),
            _dir: dir,
        }
    }

    fn runner(&self, client: Arc<ScriptedClient>, config: UploadConfig) -> UploadAttemptRunner {
        UploadAttemptRunner::new(
            client,
            self.limiter.clone(),
            Credentials::new("cookie", 1),
            Arc::new(config),
            ShutdownCoordinator::shared(),
        )
    }
}

fn config(price: u32) -> UploadConfig {
    UploadConfig {
        group_id: 1,
        price,
        retry_delay: Duration::from_secs(3),
        ..Default::default()
    }
}

fn transient() -> CatalogError {
    CatalogError::Network("connection reset".to_string())
}

#[tokio::test(start_paused = true)]
async fn exponential_backoff_schedule_is_followed() {
    let fixture = Fixture::new(Duration::from_millis(1));
    let client = Arc::new(ScriptedClient::new(vec![
        Err(transient()),
        Err(transient()),
        Err(transient()),
        Err(transient()),
        Ok(41),
    ]));
    let runner = fixture.runner(client.clone(), config(0));

    let start = tokio::time::Instant::now();
    let result = runner
        .run(&fixture.job, "Blue Shirt", &fixture.job.source_path)
        .await;
    let elapsed = start.elapsed();

    assert_eq!(result.status, UploadStatus::Success);
    assert_eq!(result.attempt_count, 5);
    assert_eq!(client.create_calls.load(Ordering::SeqCst), 5);
    // Backoffs of 3 + 6 + 12 + 24 seconds between the five attempts
    assert!(elapsed >= Duration::from_secs(45), "elapsed was {elapsed:?}");
    assert!(elapsed < Duration::from_secs(46), "elapsed was {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn rate_limit_hint_inflates_the_next_wait() {
    let fixture = Fixture::new(Duration::from_secs(1));
    let client = Arc::new(ScriptedClient::new(vec![
        Err(CatalogError::RateLimited {
            retry_after: Some(Duration::from_secs(20)),
        }),
        Ok(42),
    ]));
    let runner = fixture.runner(client, config(0));

    let start = tokio::time::Instant::now();
    let result = runner
        .run(&fixture.job, "Blue Shirt", &fixture.job.source_path)
        .await;
    let elapsed = start.elapsed();

    assert_eq!(result.status, UploadStatus::Success);
    // Hint (20s) plus the safety margin becomes the limiter delay, which
    // gates the second attempt
    assert_eq!(fixture.limiter.current_delay(), Duration::from_secs(21));
    assert!(elapsed >= Duration::from_secs(21), "elapsed was {elapsed:?}");
    assert!(elapsed < Duration::from_secs(25), "elapsed was {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn terminal_rejection_fails_without_retrying() {
    let fixture = Fixture::new(Duration::from_millis(1));
    let client = Arc::new(ScriptedClient::new(vec![Err(
        CatalogError::InsufficientFunds,
    )]));
    let runner = fixture.runner(client.clone(), config(5));

    let start = tokio::time::Instant::now();
    let result = runner
        .run(&fixture.job, "Blue Shirt", &fixture.job.source_path)
        .await;
    let elapsed = start.elapsed();

    assert_eq!(result.status, UploadStatus::Failed);
    assert_eq!(result.attempt_count, 1);
    assert_eq!(client.create_calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.error_message.as_deref(), Some("insufficient funds"));
    assert!(elapsed < Duration::from_secs(1), "no backoff expected, got {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn listing_collapse_keeps_the_created_asset_id() {
    let fixture = Fixture::new(Duration::from_millis(1));
    let client = Arc::new(ScriptedClient::new(vec![Ok(77)]).with_failing_release());
    let runner = fixture.runner(client.clone(), config(9));

    let result = runner
        .run(&fixture.job, "Blue Shirt", &fixture.job.source_path)
        .await;

    assert_eq!(result.status, UploadStatus::Failed);
    assert_eq!(result.asset_id, Some(77));
    assert_eq!(
        result.error_message.as_deref(),
        Some("upload succeeded but listing failed")
    );
    // Listing has its own (linear) retry budget; the upload is never redone
    assert_eq!(client.release_calls.load(Ordering::SeqCst), 3);
    assert_eq!(client.create_calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.attempt_count, 1);
}
