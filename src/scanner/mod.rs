//! Media library scanner.
//!
//! Walks each configured root directory, classifies its immediate
//! subdirectories as media folders, and reports the ones missing a trailer.
//! Results are cached per root with a TTL so repeated runs over slow mounts
//! skip the directory walk entirely.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::ScanCache;
use crate::classify::{classify, is_system_entry};
use crate::error::{Error, Result};
use crate::trailer::TrailerRule;
use crate::types::{MediaItem, MediaKind, MediaRoot, ScanResult};

/// Scanner for discovering media folders that lack a trailer.
///
/// Scans are read-through: a fresh cache entry short-circuits the
/// filesystem listing, which is the dominant cost saving for libraries on
/// network mounts. The cache instance is injected and may be shared.
#[derive(Clone)]
pub struct DirectoryScanner {
    cache: Arc<ScanCache>,
    cache_ttl: Duration,
    trailers_dir: String,
}

impl DirectoryScanner {
    /// Create a scanner writing results into `cache` with `cache_ttl`.
    /// `trailers_dir` names the TV trailers subdirectory.
    pub fn new(cache: Arc<ScanCache>, cache_ttl: Duration, trailers_dir: impl Into<String>) -> Self {
        Self {
            cache,
            cache_ttl,
            trailers_dir: trailers_dir.into(),
        }
    }

    /// Scan one root for media folders missing a trailer.
    ///
    /// Returns the cached result when one is fresh and `force_refresh` is
    /// false. A forced scan always re-lists and overwrites the cache entry,
    /// even when the item set comes out unchanged. Fails with
    /// [`Error::PathUnavailable`] when the root cannot be listed; the cache
    /// entry for that root is left as it was.
    pub fn scan(&self, root: &MediaRoot, force_refresh: bool) -> Result<ScanResult> {
        let key = root.cache_key();
        if !force_refresh {
            if let Some(cached) = self.cache.get(&key) {
                debug!("Serving scan of {:?} from cache", root.path);
                return Ok(cached);
            }
        }

        let result = self.scan_root(root)?;
        self.cache.put(&key, result.clone(), self.cache_ttl);
        Ok(result)
    }

    /// List the root and test every media folder for a trailer.
    fn scan_root(&self, root: &MediaRoot) -> Result<ScanResult> {
        info!("Scanning directory: {:?}", root.path);
        let rule = TrailerRule::for_kind(root.kind, &self.trailers_dir);

        let entries =
            fs::read_dir(&root.path).map_err(|e| Error::path_unavailable(&root.path, e))?;

        let mut items = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::path_unavailable(&root.path, e))?;
            let name_os = entry.file_name();
            let Some(name) = name_os.to_str() else {
                warn!("Skipping non-UTF-8 entry under {:?}", root.path);
                continue;
            };

            // Skip hidden and reserved system entries
            if is_system_entry(name) {
                debug!("Skipping system entry: {}", name);
                continue;
            }

            // Only directories hold media
            match entry.file_type() {
                Ok(ft) if ft.is_dir() => {}
                Ok(_) => continue,
                Err(e) => {
                    warn!("Entry vanished during scan of {:?}: {}", root.path, e);
                    continue;
                }
            }

            let path = entry.path();
            let classification = classify(name);
            match rule.has_trailer(&path) {
                Ok(true) => debug!("Trailer present: {:?}", path),
                Ok(false) => items.push(MediaItem {
                    path,
                    title: classification.title,
                    year: classification.year,
                    kind: root.kind,
                }),
                Err(e) if e.is_not_found() => {
                    warn!("Media folder vanished during scan: {:?}", path);
                }
                Err(e) => {
                    warn!("Failed to check trailer for {:?}: {}", path, e);
                }
            }
        }

        info!(
            "Scan complete: {} missing trailers under {:?}",
            items.len(),
            root.path
        );
        Ok(ScanResult {
            root: root.clone(),
            items,
            scanned_at: self.cache.now(),
        })
    }
}

/// A root that could not be scanned, reported alongside the rest.
#[derive(Debug)]
pub struct RootFailure {
    pub root: MediaRoot,
    pub error: Error,
}

/// Aggregated outcome of scanning every root of one media kind.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Missing-trailer items, concatenated in root order.
    pub items: Vec<MediaItem>,
    /// Roots that could not be listed at all.
    pub failures: Vec<RootFailure>,
}

/// Facade binding the directory scanner to one media kind and its roots.
pub struct MediaScanner {
    scanner: DirectoryScanner,
    kind: MediaKind,
    roots: Vec<MediaRoot>,
}

impl MediaScanner {
    pub fn new(
        scanner: DirectoryScanner,
        kind: MediaKind,
        roots: impl IntoIterator<Item = impl Into<std::path::PathBuf>>,
    ) -> Self {
        let roots = roots
            .into_iter()
            .map(|path| MediaRoot::new(path, kind))
            .collect();
        Self {
            scanner,
            kind,
            roots,
        }
    }

    /// Facade over the configured movie roots.
    pub fn movies(
        scanner: DirectoryScanner,
        roots: impl IntoIterator<Item = impl Into<std::path::PathBuf>>,
    ) -> Self {
        Self::new(scanner, MediaKind::Movie, roots)
    }

    /// Facade over the configured TV show roots.
    pub fn tv_shows(
        scanner: DirectoryScanner,
        roots: impl IntoIterator<Item = impl Into<std::path::PathBuf>>,
    ) -> Self {
        Self::new(scanner, MediaKind::TvShow, roots)
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn roots(&self) -> &[MediaRoot] {
        &self.roots
    }

    /// Scan every configured root, concatenating results in root-list order
    /// and preserving each scan's internal listing order.
    ///
    /// A root that cannot be read is reported as a failure next to the
    /// items from the roots that could; one dead mount never hides the
    /// others. No deduplication: two roots naming the same directory
    /// double-report, which is a configuration mistake, not a scanner
    /// concern.
    pub fn scan_all(&self, force_refresh: bool) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        for root in &self.roots {
            match self.scanner.scan(root, force_refresh) {
                Ok(result) => outcome.items.extend(result.items),
                Err(error) => {
                    warn!("Skipping root {:?}: {}", root.path, error);
                    outcome.failures.push(RootFailure {
                        root: root.clone(),
                        error,
                    });
                }
            }
        }
        outcome
    }
}
