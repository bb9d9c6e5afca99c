//! Library scanning integration tests.
//!
//! Exercises the full scan path against real on-disk fixtures: movie and TV
//! trees with and without trailers, cache reuse across scans, TTL expiry,
//! forced refreshes, and unavailable roots.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tempfile::TempDir;
use trailforge::cache::{ManualClock, ScanCache};
use trailforge::scanner::{DirectoryScanner, MediaScanner};
use trailforge::trailer::DEFAULT_TRAILERS_DIR;
use trailforge::types::MediaKind;

const TTL: Duration = Duration::from_secs(24 * 60 * 60);

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn manual_clock() -> Arc<ManualClock> {
    let start = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
    Arc::new(ManualClock::at(start))
}

fn scanner_with_clock(clock: Arc<ManualClock>) -> DirectoryScanner {
    let cache = Arc::new(ScanCache::new(clock));
    DirectoryScanner::new(cache, TTL, DEFAULT_TRAILERS_DIR)
}

/// Create a movie folder, optionally with a trailer file of the given size.
fn make_movie(root: &Path, folder: &str, trailer_bytes: Option<usize>) {
    let dir = root.join(folder);
    fs::create_dir_all(&dir).unwrap();
    if let Some(size) = trailer_bytes {
        let trailer = dir.join(format!("{folder}-trailer.mp4"));
        fs::write(trailer, vec![0u8; size]).unwrap();
    }
}

/// Create a TV show folder. `trailer` is an optional file name to drop into
/// the trailers subdirectory; `None` with `with_dir` still creates the
/// (empty) subdirectory.
fn make_show(root: &Path, folder: &str, with_dir: bool, trailer: Option<&str>) {
    let dir = root.join(folder);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("S01E01.mkv"), b"episode").unwrap();
    if with_dir || trailer.is_some() {
        let trailers = dir.join("trailers");
        fs::create_dir_all(&trailers).unwrap();
        if let Some(name) = trailer {
            fs::write(trailers.join(name), b"trailer content").unwrap();
        }
    }
}

fn missing_titles(scanner: &MediaScanner, force: bool) -> Vec<String> {
    let outcome = scanner.scan_all(force);
    assert!(outcome.failures.is_empty(), "unexpected root failures: {:?}", outcome.failures);
    let mut titles: Vec<String> = outcome.items.into_iter().map(|i| i.title).collect();
    titles.sort();
    titles
}

// ---------------------------------------------------------------------------
// Movie scanning
// ---------------------------------------------------------------------------

#[test]
fn mixed_movie_library_reports_only_gaps() {
    let root = TempDir::new().unwrap();
    make_movie(root.path(), "Heat (1995)", Some(1024));
    make_movie(root.path(), "Arrival (2016)", None);
    make_movie(root.path(), "Stalker (1979)", Some(0));
    make_movie(root.path(), "Akira", None);
    fs::write(root.path().join("notes.txt"), b"not a folder").unwrap();
    fs::create_dir(root.path().join(".hidden")).unwrap();

    let scanner = scanner_with_clock(manual_clock());
    let movies = MediaScanner::movies(scanner, [root.path()]);
    let titles = missing_titles(&movies, false);

    // Zero-byte trailers count as missing; files and hidden dirs are skipped.
    assert_eq!(titles, vec!["Akira", "Arrival", "Stalker"]);
}

#[test]
fn movie_items_carry_title_year_and_kind() {
    let root = TempDir::new().unwrap();
    make_movie(root.path(), "Arrival (2016)", None);

    let scanner = scanner_with_clock(manual_clock());
    let movies = MediaScanner::movies(scanner, [root.path()]);
    let outcome = movies.scan_all(false);

    assert_eq!(outcome.items.len(), 1);
    let item = &outcome.items[0];
    assert_eq!(item.title, "Arrival");
    assert_eq!(item.year, Some(2016));
    assert_eq!(item.kind, MediaKind::Movie);
    assert_eq!(item.path, root.path().join("Arrival (2016)"));
}

#[test]
fn movie_trailer_name_matches_case_insensitively() {
    let root = TempDir::new().unwrap();
    let dir = root.path().join("Blade Runner (1982)");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("blade runner (1982)-TRAILER.MP4"), b"video").unwrap();

    let scanner = scanner_with_clock(manual_clock());
    let movies = MediaScanner::movies(scanner, [root.path()]);

    assert!(missing_titles(&movies, false).is_empty());
}

// ---------------------------------------------------------------------------
// TV scanning
// ---------------------------------------------------------------------------

#[test]
fn tv_library_requires_populated_trailers_dir() {
    let root = TempDir::new().unwrap();
    make_show(root.path(), "Dark", false, Some("teaser.webm"));
    make_show(root.path(), "Severance (2022)", true, None);
    make_show(root.path(), "The Wire", false, None);

    let scanner = scanner_with_clock(manual_clock());
    let shows = MediaScanner::tv_shows(scanner, [root.path()]);
    let titles = missing_titles(&shows, false);

    // An empty trailers dir and a missing one are both gaps.
    assert_eq!(titles, vec!["Severance", "The Wire"]);
}

#[test]
fn tv_trailers_dir_matches_case_insensitively() {
    let root = TempDir::new().unwrap();
    let dir = root.path().join("Andor (2022)");
    fs::create_dir_all(dir.join("Trailers")).unwrap();
    fs::write(dir.join("Trailers").join("clip.mkv"), b"video").unwrap();

    let scanner = scanner_with_clock(manual_clock());
    let shows = MediaScanner::tv_shows(scanner, [root.path()]);

    assert!(missing_titles(&shows, false).is_empty());
}

#[test]
fn tv_non_video_files_do_not_satisfy_the_rule() {
    let root = TempDir::new().unwrap();
    make_show(root.path(), "Chernobyl", true, Some("cover.jpg"));

    let scanner = scanner_with_clock(manual_clock());
    let shows = MediaScanner::tv_shows(scanner, [root.path()]);

    assert_eq!(missing_titles(&shows, false), vec!["Chernobyl"]);
}

// ---------------------------------------------------------------------------
// Cache behavior
// ---------------------------------------------------------------------------

#[test]
fn cached_listing_is_reused_until_ttl_expires() {
    let root = TempDir::new().unwrap();
    make_movie(root.path(), "Heat (1995)", None);

    let clock = manual_clock();
    let scanner = scanner_with_clock(clock.clone());
    let movies = MediaScanner::movies(scanner, [root.path()]);

    assert_eq!(missing_titles(&movies, false), vec!["Heat"]);

    // A folder added after the scan is invisible while the entry is fresh.
    make_movie(root.path(), "Ronin (1998)", None);
    clock.advance(TTL - Duration::from_secs(60));
    assert_eq!(missing_titles(&movies, false), vec!["Heat"]);

    // Once the TTL elapses the listing is rebuilt from disk.
    clock.advance(Duration::from_secs(120));
    assert_eq!(missing_titles(&movies, false), vec!["Heat", "Ronin"]);
}

#[test]
fn force_refresh_bypasses_a_fresh_cache_entry() {
    let root = TempDir::new().unwrap();
    make_movie(root.path(), "Heat (1995)", None);

    let clock = manual_clock();
    let scanner = scanner_with_clock(clock.clone());
    let movies = MediaScanner::movies(scanner, [root.path()]);

    assert_eq!(missing_titles(&movies, false), vec!["Heat"]);

    make_movie(root.path(), "Ronin (1998)", None);
    assert_eq!(missing_titles(&movies, true), vec!["Heat", "Ronin"]);

    // The forced scan re-stamped the entry, so it serves reads again.
    make_movie(root.path(), "Spartan (2004)", None);
    assert_eq!(missing_titles(&movies, false), vec!["Heat", "Ronin"]);
}

#[test]
fn cached_result_bakes_in_trailer_presence() {
    let root = TempDir::new().unwrap();
    make_movie(root.path(), "Heat (1995)", None);

    let clock = manual_clock();
    let scanner = scanner_with_clock(clock.clone());
    let movies = MediaScanner::movies(scanner, [root.path()]);

    assert_eq!(missing_titles(&movies, false), vec!["Heat"]);

    // A trailer dropped in after the scan does not clear the gap while the
    // entry is fresh; a forced refresh does.
    let trailer = root.path().join("Heat (1995)").join("Heat (1995)-trailer.mp4");
    fs::write(trailer, b"video").unwrap();
    assert_eq!(missing_titles(&movies, false), vec!["Heat"]);
    assert!(missing_titles(&movies, true).is_empty());
}

#[test]
fn unavailable_root_keeps_the_previous_cache_entry() {
    let parent = TempDir::new().unwrap();
    let root = parent.path().join("movies");
    fs::create_dir(&root).unwrap();
    make_movie(&root, "Heat (1995)", None);

    let clock = manual_clock();
    let scanner = scanner_with_clock(clock.clone());
    let movies = MediaScanner::movies(scanner, [&root]);

    assert_eq!(missing_titles(&movies, false), vec!["Heat"]);

    // Unmount the root. A forced scan fails but must not clobber the entry.
    fs::remove_dir_all(&root).unwrap();
    let outcome = movies.scan_all(true);
    assert!(outcome.items.is_empty());
    assert_eq!(outcome.failures.len(), 1);

    // Remount: the cached listing is still served.
    fs::create_dir(&root).unwrap();
    make_movie(&root, "Heat (1995)", None);
    assert_eq!(missing_titles(&movies, false), vec!["Heat"]);
}

// ---------------------------------------------------------------------------
// Multiple roots
// ---------------------------------------------------------------------------

#[test]
fn dead_root_is_reported_alongside_live_results() {
    let live = TempDir::new().unwrap();
    make_movie(live.path(), "Arrival (2016)", None);
    let dead = live.path().join("does-not-exist");

    let scanner = scanner_with_clock(manual_clock());
    let movies = MediaScanner::movies(scanner, [dead.as_path(), live.path()]);
    let outcome = movies.scan_all(false);

    assert_eq!(outcome.items.len(), 1);
    assert_eq!(outcome.items[0].title, "Arrival");
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].root.path, dead);
}

#[test]
fn movie_and_tv_scanners_share_one_cache() {
    let movie_root = TempDir::new().unwrap();
    let tv_root = TempDir::new().unwrap();
    make_movie(movie_root.path(), "Arrival (2016)", None);
    make_show(tv_root.path(), "The Wire", false, None);

    let clock = manual_clock();
    let cache = Arc::new(ScanCache::new(clock));
    let scanner = DirectoryScanner::new(cache, TTL, DEFAULT_TRAILERS_DIR);

    let movies = MediaScanner::movies(scanner.clone(), [movie_root.path()]);
    let shows = MediaScanner::tv_shows(scanner, [tv_root.path()]);

    assert_eq!(missing_titles(&movies, false), vec!["Arrival"]);
    assert_eq!(missing_titles(&shows, false), vec!["The Wire"]);

    // Kind is part of the cache key, so the entries do not collide.
    assert_eq!(missing_titles(&movies, false), vec!["Arrival"]);
    assert_eq!(missing_titles(&shows, false), vec!["The Wire"]);
}

#[test]
fn same_path_under_both_kinds_is_scanned_per_kind() {
    let root = TempDir::new().unwrap();
    make_movie(root.path(), "Twin Peaks (1990)", None);

    let clock = manual_clock();
    let cache = Arc::new(ScanCache::new(clock));
    let scanner = DirectoryScanner::new(cache, TTL, DEFAULT_TRAILERS_DIR);

    let movies = MediaScanner::movies(scanner.clone(), [root.path()]);
    let shows = MediaScanner::tv_shows(scanner, [root.path()]);

    // As a movie the folder lacks `<name>-trailer.mp4`; as a show it lacks
    // a trailers subdirectory. Both report the gap independently.
    assert_eq!(missing_titles(&movies, false), vec!["Twin Peaks"]);
    assert_eq!(missing_titles(&shows, false), vec!["Twin Peaks"]);
}
