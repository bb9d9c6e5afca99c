//! On-disk persistence for the scan cache.
//!
//! The cache survives process restarts as a pretty-printed JSON file. Each
//! entry records when it was written and its TTL, so freshness is judged
//! against wall-clock time no matter how long the process was down. A file
//! that cannot be read or parsed is treated as an empty cache.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{expiry, CacheEntry, ScanCache};
use crate::types::ScanResult;

#[derive(Serialize, Deserialize)]
struct PersistedEntry {
    key: String,
    result: ScanResult,
    written_at: DateTime<Utc>,
    ttl_secs: u64,
}

#[derive(Serialize, Deserialize, Default)]
struct PersistedCache {
    entries: Vec<PersistedEntry>,
}

impl ScanCache {
    /// Load persisted entries into this cache.
    ///
    /// A missing file is an empty cache. An unreadable or unparsable file is
    /// logged at warn level and ignored; persisted state is a convenience,
    /// never worth failing a run over. Entries already stale at load time
    /// are dropped on the spot.
    pub fn load_from_file(&self, path: &Path) {
        let persisted = match read_persisted(path) {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::warn!("Failed to load scan cache: {e:#}");
                return;
            }
        };

        let now = self.clock.now();
        let mut loaded = 0usize;
        for entry in persisted.entries {
            let expires_at = expiry(entry.written_at, Duration::from_secs(entry.ttl_secs));
            if now >= expires_at {
                continue;
            }
            self.entries.insert(
                entry.key,
                CacheEntry {
                    result: entry.result,
                    written_at: entry.written_at,
                    expires_at,
                },
            );
            loaded += 1;
        }
        tracing::debug!(entries = loaded, path = %path.display(), "Loaded scan cache");
    }

    /// Write all fresh entries to `path` as JSON, creating parent
    /// directories as needed.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let now = self.clock.now();
        let entries: Vec<PersistedEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_fresh(now))
            .map(|entry| {
                let value = entry.value();
                PersistedEntry {
                    key: entry.key().clone(),
                    result: value.result.clone(),
                    written_at: value.written_at,
                    ttl_secs: (value.expires_at - value.written_at).num_seconds().max(0) as u64,
                }
            })
            .collect();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create cache directory {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(&PersistedCache { entries })?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write scan cache to {}", path.display()))?;
        Ok(())
    }
}

fn read_persisted(path: &Path) -> Result<PersistedCache> {
    if !path.exists() {
        return Ok(PersistedCache::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scan cache from {}", path.display()))?;
    let persisted = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse scan cache at {}", path.display()))?;
    Ok(persisted)
}
