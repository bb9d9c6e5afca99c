//! Orchestrates the scan, lookup, and download flow for missing trailers.
//!
//! Scanning yields the items without trailers; each one is resolved to a
//! download target by the first provider with a candidate and handed to the
//! download tool. One bad item never aborts the run: lookup and download
//! failures are logged, counted, and skipped.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::cache::ScanCache;
use crate::download::TrailerDownloader;
use crate::metadata::{TrailerCandidate, TrailerProvider};
use crate::scanner::MediaScanner;
use crate::trailer::TrailerRule;
use crate::types::{MediaItem, MediaRoot};

/// Summary of one fetch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchReport {
    /// Items without a trailer that were processed.
    pub attempted: usize,
    /// Trailers that landed on disk (or would have, in dry-run mode).
    pub downloaded: usize,
    /// Items where the download tool or filesystem failed.
    pub failed: usize,
    /// Items no provider had a candidate for.
    pub no_candidates: usize,
    /// Roots that could not be scanned at all.
    pub scan_failures: usize,
}

impl FetchReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: FetchReport) {
        self.attempted += other.attempted;
        self.downloaded += other.downloaded;
        self.failed += other.failed;
        self.no_candidates += other.no_candidates;
        self.scan_failures += other.scan_failures;
    }

    /// True when anything went wrong during the run.
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.scan_failures > 0
    }
}

/// Drives providers and the download tool to fill trailer gaps.
pub struct TrailerFetcher {
    providers: Vec<Arc<dyn TrailerProvider>>,
    downloader: TrailerDownloader,
    cache: Arc<ScanCache>,
    trailers_dir: String,
    limit: Option<usize>,
    dry_run: bool,
}

impl TrailerFetcher {
    pub fn new(
        downloader: TrailerDownloader,
        cache: Arc<ScanCache>,
        trailers_dir: impl Into<String>,
    ) -> Self {
        Self {
            providers: Vec::new(),
            downloader,
            cache,
            trailers_dir: trailers_dir.into(),
            limit: None,
            dry_run: false,
        }
    }

    /// Append a provider. Providers are consulted in registration order and
    /// the first non-empty candidate list wins.
    pub fn with_provider(mut self, provider: Arc<dyn TrailerProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Cap the number of items processed in one run.
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Log what would happen without touching the filesystem or invoking
    /// the download tool.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self.downloader = self.downloader.dry_run(dry_run);
        self
    }

    /// Scan the given library and try to fetch a trailer for every item
    /// that has none.
    pub async fn fetch_missing(&self, scanner: &MediaScanner, force_refresh: bool) -> FetchReport {
        let outcome = scanner.scan_all(force_refresh);

        let mut report = FetchReport {
            scan_failures: outcome.failures.len(),
            ..FetchReport::default()
        };

        for item in &outcome.items {
            if let Some(limit) = self.limit {
                if report.attempted >= limit {
                    info!(
                        limit,
                        remaining = outcome.items.len() - report.attempted,
                        "Fetch limit reached"
                    );
                    break;
                }
            }
            report.attempted += 1;

            match self.fetch_one(item).await {
                Ok(true) => {
                    report.downloaded += 1;
                    self.invalidate_root(item);
                }
                Ok(false) => {
                    info!(item = %item, "No trailer candidates found");
                    report.no_candidates += 1;
                }
                Err(e) => {
                    warn!(item = %item, error = %format!("{e:#}"), "Trailer fetch failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            attempted = report.attempted,
            downloaded = report.downloaded,
            failed = report.failed,
            no_candidates = report.no_candidates,
            "Fetch run finished"
        );
        report
    }

    /// Fetch a trailer for a single item. `Ok(false)` means no provider had
    /// a candidate.
    async fn fetch_one(&self, item: &MediaItem) -> anyhow::Result<bool> {
        let rule = TrailerRule::for_kind(item.kind, &self.trailers_dir);
        let output = rule.expected_path(&item.path);

        let Some(candidate) = self.find_candidate(item).await else {
            return Ok(false);
        };

        info!(
            item = %item,
            trailer = %candidate.name,
            official = candidate.official,
            "Fetching trailer"
        );

        // TV trailers live in a subdirectory that may not exist yet.
        if !self.dry_run {
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        self.downloader.download(&candidate.url, &output).await?;
        Ok(true)
    }

    /// Ask each provider in turn for candidates, taking the first hit.
    /// Provider failures are absorbed so the next provider still gets a try.
    async fn find_candidate(&self, item: &MediaItem) -> Option<TrailerCandidate> {
        for provider in &self.providers {
            if !provider.is_available() {
                debug!(provider = provider.name(), "Provider not available, skipping");
                continue;
            }

            match provider
                .find_trailers(&item.title, item.year, item.kind)
                .await
            {
                Ok(candidates) => {
                    if let Some(candidate) = candidates.into_iter().next() {
                        debug!(
                            provider = provider.name(),
                            trailer = %candidate.name,
                            "Provider returned a candidate"
                        );
                        return Some(candidate);
                    }
                    debug!(provider = provider.name(), "Provider had no candidates");
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %format!("{e:#}"),
                        "Provider lookup failed"
                    );
                }
            }
        }
        None
    }

    /// A fresh trailer makes the cached scan of its root stale.
    fn invalidate_root(&self, item: &MediaItem) {
        if let Some(parent) = item.path.parent() {
            let key = MediaRoot::new(parent, item.kind).cache_key();
            self.cache.invalidate(&key);
        }
    }
}
