//! Core type definitions for media roots, discovered items, and scan results.
//!
//! All types serialize with serde; [`ScanResult`] is what the cache persists
//! between runs, so its shape is part of the on-disk cache format.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of media a root directory contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Movie folders with a sibling trailer file.
    Movie,
    /// TV show folders with a trailers subdirectory.
    TvShow,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::TvShow => write!(f, "tvshow"),
        }
    }
}

/// A configured library root directory and the kind of media under it.
///
/// Roots come from configuration and never change during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRoot {
    pub path: PathBuf,
    pub kind: MediaKind,
}

impl MediaRoot {
    pub fn new(path: impl Into<PathBuf>, kind: MediaKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn movie(path: impl Into<PathBuf>) -> Self {
        Self::new(path, MediaKind::Movie)
    }

    pub fn tv_show(path: impl Into<PathBuf>) -> Self {
        Self::new(path, MediaKind::TvShow)
    }

    /// Cache key for this root. Path and kind together, since the same
    /// directory could in principle be configured under both kinds.
    pub fn cache_key(&self) -> String {
        format!("{}|{}", self.path.display(), self.kind)
    }
}

/// One media folder found to be missing its trailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Absolute path of the media folder. Existed at scan time.
    pub path: PathBuf,
    /// Title derived from the folder name, year marker stripped.
    pub title: String,
    /// Release year, if the folder name carried one.
    pub year: Option<u16>,
    /// Kind inherited from the root this item was found under.
    pub kind: MediaKind,
}

impl fmt::Display for MediaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => write!(f, "{}", self.title),
        }
    }
}

/// The outcome of scanning one root: every item missing a trailer, in
/// directory listing order, plus when the listing happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub root: MediaRoot,
    pub items: Vec<MediaItem>,
    pub scanned_at: DateTime<Utc>,
}

impl ScanResult {
    pub fn new(root: MediaRoot, items: Vec<MediaItem>) -> Self {
        Self {
            root,
            items,
            scanned_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
