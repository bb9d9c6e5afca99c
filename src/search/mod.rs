//! YouTube search fallback for items no metadata provider can resolve.
//!
//! yt-dlp accepts `ytsearchN:<query>` expressions as download targets, so a
//! plain text search can stand in for a real trailer URL when TMDB is
//! unconfigured or has no videos for an item. The query is built from a
//! configurable template, substituting `{title}` and `{year}`.

use async_trait::async_trait;

use crate::metadata::provider::{TrailerCandidate, TrailerProvider};
use crate::types::MediaKind;

/// Default query template. `{year}` drops out cleanly when unknown.
pub const DEFAULT_QUERY_FORMAT: &str = "{title} {year} trailer";

/// Build a search query from a template, substituting `{title}` and `{year}`.
///
/// When `year` is `None` the `{year}` placeholder is removed and any doubled
/// whitespace left behind is collapsed.
///
/// ```
/// use trailforge::search::build_query;
///
/// assert_eq!(
///     build_query("{title} {year} trailer", "Inception", Some(2010)),
///     "Inception 2010 trailer"
/// );
/// assert_eq!(
///     build_query("{title} {year} trailer", "Inception", None),
///     "Inception trailer"
/// );
/// ```
pub fn build_query(format: &str, title: &str, year: Option<u16>) -> String {
    let year_str = year.map(|y| y.to_string()).unwrap_or_default();
    let query = format
        .replace("{title}", title)
        .replace("{year}", &year_str);

    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build the yt-dlp search target for a query.
///
/// `ytsearch1:` takes the top hit only; larger `max_results` values let
/// yt-dlp pick from more results.
pub fn search_target(query: &str, max_results: usize) -> String {
    format!("ytsearch{max_results}:{query}")
}

/// Trailer provider backed by YouTube text search.
///
/// Always available. Returns a single candidate whose URL is a search
/// expression rather than a direct watch link, so it ranks last among
/// providers: anything that resolves a real URL should be tried first.
pub struct YtSearchProvider {
    query_format: String,
    max_results: usize,
}

impl YtSearchProvider {
    pub fn new(query_format: impl Into<String>, max_results: usize) -> Self {
        Self {
            query_format: query_format.into(),
            max_results: max_results.max(1),
        }
    }
}

impl Default for YtSearchProvider {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY_FORMAT, 1)
    }
}

#[async_trait]
impl TrailerProvider for YtSearchProvider {
    fn name(&self) -> &'static str {
        "ytsearch"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn find_trailers(
        &self,
        title: &str,
        year: Option<u16>,
        _kind: MediaKind,
    ) -> anyhow::Result<Vec<TrailerCandidate>> {
        let query = build_query(&self.query_format, title, year);
        let target = search_target(&query, self.max_results);

        Ok(vec![TrailerCandidate::new(query, target, false)])
    }
}
