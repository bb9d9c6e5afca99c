//! Trait definition and types for trailer providers.
//!
//! This module defines the [`TrailerProvider`] trait that all trailer lookup
//! backends (TMDB, plain YouTube search, etc.) implement, along with the
//! candidate type returned by provider queries.

use async_trait::async_trait;

use crate::types::MediaKind;

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// A single trailer located by a provider, ready to hand to the downloader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailerCandidate {
    /// Display name of the video as the provider reports it.
    pub name: String,
    /// Watch URL (or search target) the download tool understands.
    pub url: String,
    /// Whether the provider flags this video as an official trailer.
    pub official: bool,
}

impl TrailerCandidate {
    pub fn new(name: impl Into<String>, url: impl Into<String>, official: bool) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            official,
        }
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Async trait that all trailer providers must implement.
///
/// Each provider wraps a single external source (the TMDB videos API, a
/// YouTube search expression, etc.) and exposes a uniform interface for
/// locating trailers for a media item.
///
/// Providers are expected to be cheaply cloneable or wrapped in an `Arc` so
/// they can be shared across tasks.
#[async_trait]
pub trait TrailerProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Returns `true` when the provider has been configured with valid
    /// credentials and is ready to serve requests.
    fn is_available(&self) -> bool;

    /// Look up trailers for `title`, optionally constrained by `year`.
    ///
    /// Candidates are ordered best-first: official trailers before
    /// unofficial ones, provider order otherwise preserved. An empty vec
    /// means the provider found the item but it has no usable trailer.
    async fn find_trailers(
        &self,
        title: &str,
        year: Option<u16>,
        kind: MediaKind,
    ) -> anyhow::Result<Vec<TrailerCandidate>>;
}
