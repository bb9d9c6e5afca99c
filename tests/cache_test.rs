//! Cache persistence integration tests.
//!
//! Drives a scan through the scanner, persists the cache, then simulates a
//! process restart by rebuilding the cache and scanner from the saved file.
//! The interesting cases are what the second process can serve without
//! touching the filesystem, and when the TTL forces it back to disk.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tempfile::TempDir;
use trailforge::cache::{ManualClock, ScanCache};
use trailforge::scanner::{DirectoryScanner, MediaScanner};
use trailforge::trailer::DEFAULT_TRAILERS_DIR;

const TTL: Duration = Duration::from_secs(24 * 60 * 60);

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn start_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn make_movie(root: &Path, folder: &str) {
    fs::create_dir_all(root.join(folder)).unwrap();
}

/// Build a cache + movie scanner pair on a clock pinned at `now`.
fn movie_scanner(now: DateTime<Utc>, root: &Path) -> (Arc<ScanCache>, MediaScanner) {
    let cache = Arc::new(ScanCache::new(Arc::new(ManualClock::at(now))));
    let scanner = DirectoryScanner::new(cache.clone(), TTL, DEFAULT_TRAILERS_DIR);
    (cache, MediaScanner::movies(scanner, [root]))
}

// ---------------------------------------------------------------------------
// Restart scenarios
// ---------------------------------------------------------------------------

#[test]
fn persisted_scan_is_served_without_touching_disk() {
    let parent = TempDir::new().unwrap();
    let root = parent.path().join("movies");
    fs::create_dir(&root).unwrap();
    make_movie(&root, "Arrival (2016)");
    let cache_file = parent.path().join("scan-cache.json");

    let (cache, movies) = movie_scanner(start_time(), &root);
    let outcome = movies.scan_all(false);
    assert_eq!(outcome.items.len(), 1);
    cache.save_to_file(&cache_file).unwrap();

    // Second process an hour later. The root is gone, so anything it
    // reports can only have come from the persisted cache.
    fs::remove_dir_all(&root).unwrap();
    let (cache, movies) = movie_scanner(start_time() + chrono::Duration::hours(1), &root);
    cache.load_from_file(&cache_file);

    let outcome = movies.scan_all(false);
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.items.len(), 1);
    assert_eq!(outcome.items[0].title, "Arrival");
}

#[test]
fn restart_past_ttl_goes_back_to_disk() {
    let parent = TempDir::new().unwrap();
    let root = parent.path().join("movies");
    fs::create_dir(&root).unwrap();
    make_movie(&root, "Arrival (2016)");
    let cache_file = parent.path().join("scan-cache.json");

    let (cache, movies) = movie_scanner(start_time(), &root);
    movies.scan_all(false);
    cache.save_to_file(&cache_file).unwrap();

    // The library changed while the process was down.
    make_movie(&root, "Heat (1995)");

    let (cache, movies) = movie_scanner(start_time() + chrono::Duration::hours(25), &root);
    cache.load_from_file(&cache_file);

    let outcome = movies.scan_all(false);
    let mut titles: Vec<String> = outcome.items.into_iter().map(|i| i.title).collect();
    titles.sort();
    assert_eq!(titles, vec!["Arrival", "Heat"]);
}

#[test]
fn invalidated_entry_is_not_persisted() {
    let parent = TempDir::new().unwrap();
    let movie_root = parent.path().join("movies");
    let tv_root = parent.path().join("tv");
    fs::create_dir(&movie_root).unwrap();
    fs::create_dir(&tv_root).unwrap();
    make_movie(&movie_root, "Arrival (2016)");
    make_movie(&tv_root, "The Wire");
    let cache_file = parent.path().join("scan-cache.json");

    let cache = Arc::new(ScanCache::new(Arc::new(ManualClock::at(start_time()))));
    let scanner = DirectoryScanner::new(cache.clone(), TTL, DEFAULT_TRAILERS_DIR);
    let movies = MediaScanner::movies(scanner.clone(), [&movie_root]);
    let shows = MediaScanner::tv_shows(scanner, [&tv_root]);
    movies.scan_all(false);
    shows.scan_all(false);
    assert_eq!(cache.len(), 2);

    cache.invalidate(&movies.roots()[0].cache_key());
    cache.save_to_file(&cache_file).unwrap();

    let restored = ScanCache::new(Arc::new(ManualClock::at(start_time())));
    restored.load_from_file(&cache_file);
    assert_eq!(restored.len(), 1);
    assert!(restored.get(&shows.roots()[0].cache_key()).is_some());
}

#[test]
fn cache_file_is_json_with_one_entry_per_root() {
    let parent = TempDir::new().unwrap();
    let root = parent.path().join("movies");
    fs::create_dir(&root).unwrap();
    make_movie(&root, "Arrival (2016)");
    let cache_file = parent.path().join("scan-cache.json");

    let (cache, movies) = movie_scanner(start_time(), &root);
    movies.scan_all(false);
    cache.save_to_file(&cache_file).unwrap();

    let content = fs::read_to_string(&cache_file).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    let entries = value["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0]["key"]
        .as_str()
        .unwrap()
        .contains(root.to_str().unwrap()));
}
