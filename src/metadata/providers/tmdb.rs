//! TMDB (The Movie Database) trailer provider.
//!
//! Implements [`TrailerProvider`] by querying the TMDB v3 REST API: a title
//! search resolves the library folder to a TMDB id, then the videos endpoint
//! lists the YouTube trailers attached to that entry.
//!
//! Features:
//! - Token-bucket rate limiting at 4 requests / second via [`governor`].
//! - 30-second request timeout.
//! - Official trailers ranked ahead of fan uploads.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use tracing::debug;

use crate::metadata::provider::{TrailerCandidate, TrailerProvider};
use crate::types::MediaKind;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const YOUTUBE_WATCH_BASE: &str = "https://www.youtube.com/watch?v=";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse<T> {
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieSearchResult {
    id: u64,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbTvSearchResult {
    id: u64,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbVideosResponse {
    results: Vec<TmdbVideo>,
}

#[derive(Debug, Deserialize)]
struct TmdbVideo {
    key: String,
    name: Option<String>,
    site: Option<String>,
    #[serde(rename = "type")]
    video_type: Option<String>,
    #[serde(default)]
    official: bool,
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// TMDB trailer provider.
///
/// Wraps the TMDB v3 REST API with built-in rate limiting. A lookup takes
/// two requests: one search to resolve the TMDB id, one videos call to list
/// the trailers attached to it.
///
/// # Examples
///
/// ```no_run
/// use trailforge::metadata::providers::TmdbProvider;
///
/// let provider = TmdbProvider::new("your-api-key".into(), "en-US".into());
/// ```
pub struct TmdbProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl TmdbProvider {
    /// Create a new TMDB provider with the given API key and language.
    ///
    /// The `language` parameter should be an ISO-639-1 language tag such as
    /// `"en-US"`. Rate limiting is configured at 4 requests per second.
    pub fn new(api_key: String, language: String) -> Self {
        Self::with_base_url(api_key, language, TMDB_BASE_URL.to_string())
    }

    /// Create a provider pointed at a custom API root.
    ///
    /// Tests use this to target a local mock server instead of the real API.
    pub fn with_base_url(api_key: String, language: String, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");

        let quota = Quota::per_second(NonZeroU32::new(4).unwrap());
        let rate_limiter = RateLimiter::direct(quota);

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            language,
            rate_limiter,
        }
    }

    /// Execute a GET request with rate limiting.
    async fn get(&self, url: &str) -> anyhow::Result<reqwest::Response> {
        self.rate_limiter.until_ready().await;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("TMDB request failed: {url}"))?;

        resp.error_for_status()
            .with_context(|| format!("TMDB request returned error: {url}"))
    }

    /// Build a full API URL with the API key and language query parameters.
    fn url(&self, path: &str, extra_params: &[(&str, &str)]) -> String {
        let mut url = format!(
            "{}{path}?api_key={}&language={}",
            self.base_url, self.api_key, self.language
        );
        for (key, value) in extra_params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoded(value));
        }
        url
    }

    /// Resolve a title to a TMDB id via the search endpoint.
    ///
    /// Takes the top-ranked search result; TMDB already orders by popularity
    /// and match quality. Returns `None` when the search comes back empty.
    async fn lookup_id(
        &self,
        title: &str,
        year: Option<u16>,
        kind: MediaKind,
    ) -> anyhow::Result<Option<u64>> {
        let year_str = year.map(|y| y.to_string());
        let mut params = vec![("query", title)];

        match kind {
            MediaKind::Movie => {
                if let Some(ref y) = year_str {
                    params.push(("year", y.as_str()));
                }
                let url = self.url("/search/movie", &params);
                debug!(url = %url, "TMDB search movie");

                let body: TmdbSearchResponse<TmdbMovieSearchResult> = self
                    .get(&url)
                    .await?
                    .json()
                    .await
                    .context("failed to parse TMDB movie search response")?;

                Ok(body.results.into_iter().next().map(|r| {
                    debug!(id = r.id, title = ?r.title, "TMDB matched movie");
                    r.id
                }))
            }
            MediaKind::TvShow => {
                if let Some(ref y) = year_str {
                    params.push(("first_air_date_year", y.as_str()));
                }
                let url = self.url("/search/tv", &params);
                debug!(url = %url, "TMDB search TV");

                let body: TmdbSearchResponse<TmdbTvSearchResult> = self
                    .get(&url)
                    .await?
                    .json()
                    .await
                    .context("failed to parse TMDB TV search response")?;

                Ok(body.results.into_iter().next().map(|r| {
                    debug!(id = r.id, name = ?r.name, "TMDB matched TV show");
                    r.id
                }))
            }
        }
    }

    /// Fetch the videos attached to a TMDB entry and keep the YouTube trailers.
    async fn fetch_trailers(
        &self,
        id: u64,
        kind: MediaKind,
    ) -> anyhow::Result<Vec<TrailerCandidate>> {
        let path = match kind {
            MediaKind::Movie => format!("/movie/{id}/videos"),
            MediaKind::TvShow => format!("/tv/{id}/videos"),
        };
        let url = self.url(&path, &[]);
        debug!(url = %url, "TMDB fetch videos");

        let body: TmdbVideosResponse = self
            .get(&url)
            .await?
            .json()
            .await
            .context("failed to parse TMDB videos response")?;

        let mut candidates: Vec<TrailerCandidate> = body
            .results
            .into_iter()
            .filter(is_youtube_trailer)
            .map(|v| TrailerCandidate {
                name: v.name.unwrap_or_default(),
                url: format!("{YOUTUBE_WATCH_BASE}{}", v.key),
                official: v.official,
            })
            .collect();

        // Stable sort: official first, TMDB order preserved within each group.
        candidates.sort_by_key(|c| !c.official);
        Ok(candidates)
    }
}

/// Minimal percent-encoding for query parameter values.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";

/// Whether a TMDB video entry is a YouTube-hosted trailer.
fn is_youtube_trailer(video: &TmdbVideo) -> bool {
    video.site.as_deref() == Some("YouTube") && video.video_type.as_deref() == Some("Trailer")
}

#[async_trait]
impl TrailerProvider for TmdbProvider {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn find_trailers(
        &self,
        title: &str,
        year: Option<u16>,
        kind: MediaKind,
    ) -> anyhow::Result<Vec<TrailerCandidate>> {
        let Some(id) = self.lookup_id(title, year, kind).await? else {
            debug!(title, "TMDB search returned no results");
            return Ok(Vec::new());
        };

        self.fetch_trailers(id, kind).await
    }
}
