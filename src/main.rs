mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, KindFilter};

use trailforge::cache::ScanCache;
use trailforge::config::{self, Config};
use trailforge::download::{self, TrailerDownloader};
use trailforge::fetch::{FetchReport, TrailerFetcher};
use trailforge::fixup::{self, FixupReport};
use trailforge::metadata::TmdbProvider;
use trailforge::scanner::{DirectoryScanner, MediaScanner, ScanOutcome};
use trailforge::search::YtSearchProvider;
use trailforge::types::MediaKind;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "trailforge=debug".to_string()
        } else {
            "trailforge=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Scan {
            kind,
            force,
            no_cache,
        } => scan(cli.config.as_deref(), kind, force, no_cache),
        Commands::Fetch {
            kind,
            force,
            limit,
            dry_run,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(fetch(cli.config.as_deref(), kind, force, limit, dry_run))
        }
        Commands::ClearCache => clear_cache(cli.config.as_deref()),
        Commands::FixExtensions { dry_run } => fix_extensions(cli.config.as_deref(), dry_run),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("trailforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Build the shared cache, loading the persisted file when enabled.
fn open_cache(config: &Config, use_persisted: bool) -> Arc<ScanCache> {
    let cache = Arc::new(ScanCache::with_system_clock());
    if use_persisted {
        cache.load_from_file(&config.cache.resolved_path());
    }
    cache
}

/// Persist the cache, logging rather than failing on error.
fn save_cache(config: &Config, cache: &ScanCache) {
    if let Err(e) = cache.save_to_file(&config.cache.resolved_path()) {
        tracing::warn!("Failed to persist scan cache: {e:#}");
    }
}

/// The per-kind scanners a command should run, honoring the `--kind` filter.
fn build_scanners(
    config: &Config,
    scanner: &DirectoryScanner,
    filter: Option<KindFilter>,
) -> Vec<MediaScanner> {
    let mut scanners = Vec::new();
    if filter.is_none() || filter == Some(KindFilter::Movies) {
        scanners.push(MediaScanner::movies(
            scanner.clone(),
            config.library.resolved_movie_roots(),
        ));
    }
    if filter.is_none() || filter == Some(KindFilter::Tv) {
        scanners.push(MediaScanner::tv_shows(
            scanner.clone(),
            config.library.resolved_tvshow_roots(),
        ));
    }
    scanners
}

fn kind_heading(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Movie => "Movies",
        MediaKind::TvShow => "TV shows",
    }
}

fn print_outcome(kind: MediaKind, outcome: &ScanOutcome) {
    println!(
        "\n{} missing trailers: {}",
        kind_heading(kind),
        outcome.items.len()
    );
    for item in &outcome.items {
        println!("  {} - {}", item, item.path.display());
    }
    for failure in &outcome.failures {
        println!(
            "  ! {} unavailable: {}",
            failure.root.path.display(),
            failure.error
        );
    }
}

fn scan(
    config_path: Option<&Path>,
    kind: Option<KindFilter>,
    force: bool,
    no_cache: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let use_cache = config.cache.enabled && !no_cache;
    let cache = open_cache(&config, use_cache);

    let scanner = DirectoryScanner::new(
        Arc::clone(&cache),
        config.cache.ttl(),
        config.library.trailers_dir.clone(),
    );

    let mut missing = 0usize;
    let mut failures = 0usize;
    for media in build_scanners(&config, &scanner, kind) {
        let outcome = media.scan_all(force);
        print_outcome(media.kind(), &outcome);
        missing += outcome.items.len();
        failures += outcome.failures.len();
    }

    println!("\nTotal missing: {missing}");

    if use_cache {
        save_cache(&config, &cache);
    }

    if failures > 0 {
        anyhow::bail!("{failures} root(s) could not be scanned");
    }
    Ok(())
}

async fn fetch(
    config_path: Option<&Path>,
    kind: Option<KindFilter>,
    force: bool,
    limit: Option<usize>,
    dry_run: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let cache = open_cache(&config, config.cache.enabled);

    let scanner = DirectoryScanner::new(
        Arc::clone(&cache),
        config.cache.ttl(),
        config.library.trailers_dir.clone(),
    );

    let downloader = TrailerDownloader::new(&config.download);
    let mut fetcher = TrailerFetcher::new(
        downloader,
        Arc::clone(&cache),
        config.library.trailers_dir.clone(),
    )
    .limit(limit)
    .dry_run(dry_run);

    // TMDB resolves real watch URLs; the text search is the fallback.
    match config.tmdb.api_key.clone() {
        Some(key) => {
            fetcher = fetcher.with_provider(Arc::new(TmdbProvider::new(
                key,
                config.tmdb.language.clone(),
            )));
        }
        None => {
            tracing::info!("No TMDB API key configured, using search fallback only");
        }
    }
    fetcher = fetcher.with_provider(Arc::new(YtSearchProvider::new(
        config.search.query_format.clone(),
        config.search.max_results,
    )));

    let mut report = FetchReport::default();
    for media in build_scanners(&config, &scanner, kind) {
        report.merge(fetcher.fetch_missing(&media, force).await);
    }

    println!("\nAttempted:     {}", report.attempted);
    println!("Downloaded:    {}", report.downloaded);
    println!("No candidates: {}", report.no_candidates);
    println!("Failed:        {}", report.failed);
    if report.scan_failures > 0 {
        println!("Unscanned roots: {}", report.scan_failures);
    }

    if config.cache.enabled {
        save_cache(&config, &cache);
    }

    if report.has_failures() {
        anyhow::bail!(
            "{} item(s) failed, {} root(s) unscanned",
            report.failed,
            report.scan_failures
        );
    }
    Ok(())
}

fn clear_cache(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let path = config.cache.resolved_path();

    if path.exists() {
        std::fs::remove_file(&path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
        println!("Removed {}", path.display());
    } else {
        println!("No cache file at {}", path.display());
    }
    Ok(())
}

fn fix_extensions(config_path: Option<&Path>, dry_run: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let mut report = FixupReport::default();
    let mut root_failures = 0usize;
    for root in config.library.resolved_movie_roots() {
        match fixup::fix_extensions(&root, dry_run) {
            Ok(r) => report.merge(r),
            Err(e) => {
                println!("! {e}");
                root_failures += 1;
            }
        }
    }

    let verb = if dry_run { "Would rename" } else { "Renamed" };
    println!("{verb}: {}", report.renamed);
    if report.skipped > 0 {
        println!("Skipped (target exists): {}", report.skipped);
    }
    if report.failed > 0 || root_failures > 0 {
        anyhow::bail!(
            "{} rename(s) failed, {} root(s) unavailable",
            report.failed,
            root_failures
        );
    }
    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tools = download::check_tools(&config.download.tool);
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({version})");
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable downloads.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_config_summary(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            print_config_summary(&config);
        }
    }

    Ok(())
}

fn print_config_summary(config: &Config) {
    println!("  Movie roots: {}", config.library.movie_roots.len());
    println!("  TV show roots: {}", config.library.tvshow_roots.len());
    println!("  Trailers subdir: {}", config.library.trailers_dir);
    if config.cache.enabled {
        println!(
            "  Cache: {} (TTL {}h)",
            config.cache.resolved_path().display(),
            config.cache.ttl_hours
        );
    } else {
        println!("  Cache: disabled");
    }
    println!(
        "  TMDB: {}",
        if config.tmdb.api_key.is_some() {
            "configured"
        } else {
            "not configured (search fallback only)"
        }
    );
    println!("  Download tool: {}", config.download.tool);
}
