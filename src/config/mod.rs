mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./trailforge.toml",
        "~/.config/trailforge/config.toml",
        "/etc/trailforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // No file anywhere; defaults let read-only commands still work
    tracing::warn!("No config file found, using built-in defaults");
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if config.tmdb.api_key.is_none() {
        if let Ok(key) = std::env::var("TMDB_API_KEY") {
            if !key.is_empty() {
                config.tmdb.api_key = Some(key);
            }
        }
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.library.movie_roots.is_empty() && config.library.tvshow_roots.is_empty() {
        anyhow::bail!("No media roots configured; set [library] movie_roots or tvshow_roots");
    }

    if config.library.trailers_dir.is_empty() {
        anyhow::bail!("trailers_dir cannot be empty");
    }

    if config.cache.enabled && config.cache.ttl_hours == 0 {
        anyhow::bail!("Cache TTL cannot be 0 hours; disable the cache instead");
    }

    // A missing root is only a warning: it may be an unmounted share that
    // comes back later.
    for root in config
        .library
        .resolved_movie_roots()
        .iter()
        .chain(config.library.resolved_tvshow_roots().iter())
    {
        if !root.exists() {
            tracing::warn!("Media root does not exist (unmounted share?): {:?}", root);
        }
    }

    Ok(())
}
