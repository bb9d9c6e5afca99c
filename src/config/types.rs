use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::trailer::DEFAULT_TRAILERS_DIR;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Root directories containing one folder per movie.
    #[serde(default)]
    pub movie_roots: Vec<PathBuf>,

    /// Root directories containing one folder per show.
    #[serde(default)]
    pub tvshow_roots: Vec<PathBuf>,

    /// Prefix applied to relative roots, e.g. an SMB mount point. Absolute
    /// roots are used as-is.
    #[serde(default)]
    pub mount_point: Option<PathBuf>,

    /// Name of the TV trailers subdirectory (matched case-insensitively).
    #[serde(default = "default_trailers_dir")]
    pub trailers_dir: String,
}

fn default_trailers_dir() -> String {
    DEFAULT_TRAILERS_DIR.to_string()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            movie_roots: Vec::new(),
            tvshow_roots: Vec::new(),
            mount_point: None,
            trailers_dir: default_trailers_dir(),
        }
    }
}

impl LibraryConfig {
    /// Movie roots with the mount point applied to relative entries.
    pub fn resolved_movie_roots(&self) -> Vec<PathBuf> {
        self.resolve(&self.movie_roots)
    }

    /// TV show roots with the mount point applied to relative entries.
    pub fn resolved_tvshow_roots(&self) -> Vec<PathBuf> {
        self.resolve(&self.tvshow_roots)
    }

    fn resolve(&self, roots: &[PathBuf]) -> Vec<PathBuf> {
        roots
            .iter()
            .map(|root| match &self.mount_point {
                Some(mount) if root.is_relative() => mount.join(root),
                _ => root.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// How long a scan result stays fresh (default: 24 hours).
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,

    /// On-disk cache location. Defaults to
    /// `~/.cache/trailforge/scan-cache.json`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_ttl_hours() -> u64 {
    24
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_hours: default_ttl_hours(),
            path: None,
        }
    }
}

impl CacheConfig {
    /// TTL as a duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours * 60 * 60)
    }

    /// The cache file path, falling back to the default location.
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => {
                let expanded = shellexpand::tilde("~/.cache/trailforge/scan-cache.json");
                PathBuf::from(expanded.as_ref())
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// TMDB API key. Falls back to the TMDB_API_KEY environment variable
    /// when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Metadata language passed to the API.
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en-US".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Query template for the video-platform fallback; `{title}` and
    /// `{year}` are substituted.
    #[serde(default = "default_query_format")]
    pub query_format: String,

    /// How many search results the downloader may consider.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_query_format() -> String {
    "{title} {year} trailer".to_string()
}

fn default_max_results() -> usize {
    1
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query_format: default_query_format(),
            max_results: default_max_results(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Downloader executable name or path.
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Container format requested from the downloader.
    #[serde(default = "default_format")]
    pub format: String,

    /// Extra arguments appended to every downloader invocation.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_tool() -> String {
    "yt-dlp".to_string()
}

fn default_format() -> String {
    "mp4".to_string()
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            format: default_format(),
            extra_args: Vec::new(),
        }
    }
}
