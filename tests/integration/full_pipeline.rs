//! End-to-end pipeline tests over a scripted catalog client
//!
//! These tests exercise the public wiring the CLI uses: folder discovery,
//! dispatch, staging cleanup, backup archival, and aggregate statistics.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use catalog_uploader::catalog::{CatalogClient, CatalogResult, Credentials};
use catalog_uploader::files::discover_jobs;
use catalog_uploader::shutdown::{SharedShutdown, ShutdownCoordinator};
use catalog_uploader::uploader::config::RATE_LIMIT_MAX_DELAY;
use catalog_uploader::uploader::{
    AssetKind, BackupManager, Dispatcher, JobProcessor, RateLimiter, UploadAttemptRunner,
    UploadConfig, UploadStatus,
};

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Always-succeeding catalog that hands out sequential asset ids.
struct StubCatalog {
    next_id: AtomicU64,
    release_calls: AtomicU64,
}

impl StubCatalog {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1000),
            release_calls: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl CatalogClient for StubCatalog {
    async fn create_asset(
        &self,
        _credentials: &Credentials,
        _name: &str,
        _file_bytes: &[u8],
        _kind: AssetKind,
        _group_id: u64,
        _description: &str,
    ) -> CatalogResult<u64> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
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
        Ok(())
    }
}

fn write_png(path: &Path) {
    let mut bytes = PNG_MAGIC.to_vec();
    bytes.extend_from_slice(b"testdata");
    fs::write(path, bytes).unwrap();
}

struct Workspace {
    dir: TempDir,
    shutdown: SharedShutdown,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            shutdown: ShutdownCoordinator::shared(),
        }
    }

    fn base(&self) -> PathBuf {
        self.dir.path().join("IMAGES_TO_UPLOAD")
    }

    fn backups(&self) -> PathBuf {
        self.dir.path().join("backups")
    }

    fn temp(&self) -> PathBuf {
        self.dir.path().join("temp")
    }

    fn seed(&self, kind_folder: &str, names: &[&str]) {
        let folder = self.base().join(kind_folder);
        fs::create_dir_all(&folder).unwrap();
        for name in names {
            write_png(&folder.join(name));
        }
    }

    fn dispatcher(&self, catalog: Arc<StubCatalog>, config: UploadConfig) -> Dispatcher {
        let config = Arc::new(config);
        let limiter = Arc::new(RateLimiter::new(
            Duration::from_millis(1),
            RATE_LIMIT_MAX_DELAY,
        ));
        let runner = UploadAttemptRunner::new(
            catalog,
            limiter,
            Credentials::new("cookie", 9),
            config.clone(),
            self.shutdown.clone(),
        );
        let processor = JobProcessor::new(
            runner,
            BackupManager::new(self.backups(), true),
            config.clone(),
            self.temp(),
        );
        Dispatcher::new(Arc::new(processor), config, self.shutdown.clone())
    }

    fn staged_file_count(&self) -> usize {
        let mut count = 0;
        if let Ok(kinds) = fs::read_dir(self.temp()) {
            for kind_dir in kinds.filter_map(|e| e.ok()) {
                if let Ok(files) = fs::read_dir(kind_dir.path()) {
                    count += files.filter_map(|e| e.ok()).count();
                }
            }
        }
        count
    }

    fn backup_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.backups())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

fn config(price: u32) -> UploadConfig {
    UploadConfig {
        group_id: 555,
        price,
        retry_delay: Duration::from_millis(1),
        sleep_each_upload: Duration::from_millis(1),
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn discovered_jobs_upload_archive_and_clean_up() {
    let ws = Workspace::new();
    ws.seed("SHIRTS", &["b_shirt.png", "a_shirt.png"]);
    ws.seed("PANTS", &["plain_pants.png"]);

    let jobs = discover_jobs(&ws.base()).unwrap();
    assert_eq!(jobs.len(), 3);
    // Shirts first (sorted within the folder), then pants
    assert_eq!(jobs[0].file_name(), "a_shirt.png");
    assert_eq!(jobs[1].file_name(), "b_shirt.png");
    assert_eq!(jobs[2].file_name(), "plain_pants.png");
    assert_eq!(jobs[2].kind, AssetKind::Pants);

    let catalog = Arc::new(StubCatalog::new());
    let outcome = ws.dispatcher(catalog.clone(), config(5)).run(jobs).await;

    assert_eq!(outcome.results.len(), 3);
    assert!(outcome
        .results
        .iter()
        .all(|r| r.status == UploadStatus::Success));
    assert_eq!(outcome.stats.successful, 3);
    assert_eq!(outcome.stats.total_bytes, 3 * 16);
    assert_eq!(catalog.release_calls.load(Ordering::SeqCst), 3);

    // Every upload archived, every staged copy removed
    let backups = ws.backup_names();
    assert_eq!(backups.len(), 3);
    assert!(backups.iter().any(|n| n.starts_with("a_shirt_")));
    assert!(backups.iter().any(|n| n.starts_with("plain_pants_")));
    assert_eq!(ws.staged_file_count(), 0);

    // Sources stay in place; the backup is a copy, not a move
    assert!(ws.base().join("SHIRTS/a_shirt.png").exists());
}

#[tokio::test(start_paused = true)]
async fn parallel_run_yields_one_result_per_source() {
    let ws = Workspace::new();
    let names: Vec<String> = (0..8).map(|i| format!("tee_{i}.png")).collect();
    let name_refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
    ws.seed("TSHIRTS", &name_refs);

    let jobs = discover_jobs(&ws.base()).unwrap();
    let expected: HashSet<PathBuf> = jobs.iter().map(|j| j.source_path.clone()).collect();

    let parallel = UploadConfig {
        parallel: true,
        max_workers: 3,
        ..config(0)
    };
    let catalog = Arc::new(StubCatalog::new());
    let outcome = ws.dispatcher(catalog, parallel).run(jobs).await;

    assert_eq!(outcome.results.len(), 8);
    assert_eq!(outcome.stats.successful, 8);
    let seen: HashSet<PathBuf> = outcome
        .results
        .iter()
        .map(|r| r.source_path.clone())
        .collect();
    assert_eq!(seen, expected);

    // Asset ids are unique across workers
    let ids: HashSet<u64> = outcome.results.iter().filter_map(|r| r.asset_id).collect();
    assert_eq!(ids.len(), 8);
}

#[tokio::test(start_paused = true)]
async fn free_assets_never_touch_the_listing_endpoint() {
    let ws = Workspace::new();
    ws.seed("SHIRTS", &["freebie.png"]);

    let jobs = discover_jobs(&ws.base()).unwrap();
    let catalog = Arc::new(StubCatalog::new());
    let outcome = ws.dispatcher(catalog.clone(), config(0)).run(jobs).await;

    assert_eq!(outcome.stats.successful, 1);
    assert_eq!(catalog.release_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn aggregate_totals_match_recorded_results() {
    let ws = Workspace::new();
    // One uploadable file, one that cleans down to nothing and is skipped
    ws.seed("SHIRTS", &["good_one.png", "###.png"]);

    let jobs = discover_jobs(&ws.base()).unwrap();
    assert_eq!(jobs.len(), 2);

    let catalog = Arc::new(StubCatalog::new());
    let outcome = ws.dispatcher(catalog, config(0)).run(jobs).await;

    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.stats.successful, 1);
    assert_eq!(outcome.stats.skipped, 1);
    assert_eq!(
        outcome.stats.successful + outcome.stats.failed + outcome.stats.skipped,
        outcome.stats.total
    );
}
