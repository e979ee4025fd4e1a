//! Scoped-Harvest main entry point
//!
//! This is the command-line interface for the Scoped-Harvest crawl-and-ingest
//! pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use scoped_harvest::config::{load_config_with_hash, validate, Config};
use scoped_harvest::output::write_result;
use scoped_harvest::{Coordinator, CrawlLimits};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Scoped-Harvest: crawl one product page and its linked subtree
///
/// Scoped-Harvest walks a product page and the relevant pages below it on the
/// same site, downloads the PDFs it finds, and aggregates everything into a
/// plain-text file ready for structured extraction.
#[derive(Parser, Debug)]
#[command(name = "scoped-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A scoped crawl-and-ingest pipeline", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Product page to start from
    #[arg(long, value_name = "URL")]
    url: String,

    /// Maximum link depth from the start page
    #[arg(long)]
    depth: Option<u32>,

    /// Maximum number of pages to fetch
    #[arg(long)]
    page_limit: Option<usize>,

    /// Maximum number of documents to download
    #[arg(long)]
    document_limit: Option<usize>,

    /// Only follow links whose path contains this substring
    #[arg(long, value_name = "SUBSTRING")]
    path_must_contain: Option<String>,

    /// Directory for aggregated.txt and summary.md
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Crawl pages only; list documents without downloading them
    #[arg(long)]
    skip_documents: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            (Config::default(), None)
        }
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid settings after command-line overrides")?;

    if cli.dry_run {
        handle_dry_run(&config, &cli.url);
        return Ok(());
    }

    if let Err(e) = handle_harvest(config, &cli, config_hash.as_deref()).await {
        tracing::error!("Harvest failed: {:#}", e);
        return Err(e);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scoped_harvest=info,warn"),
            1 => EnvFilter::new("scoped_harvest=debug,info"),
            2 => EnvFilter::new("scoped_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line values take precedence over the config file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(limit) = cli.page_limit {
        config.crawler.page_limit = limit;
    }
    if let Some(limit) = cli.document_limit {
        config.crawler.document_limit = limit;
    }
    if let Some(scope) = &cli.path_must_contain {
        config.crawler.path_must_contain = Some(scope.clone());
    }
    if let Some(dir) = &cli.output_dir {
        config.output.output_dir = dir.display().to_string();
    }
}

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(config: &Config, start_url: &str) {
    println!("=== Scoped-Harvest Dry Run ===\n");

    println!("Start URL: {}", start_url);

    println!("\nCrawler:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Page limit: {}", config.crawler.page_limit);
    println!("  Document limit: {}", config.crawler.document_limit);
    println!(
        "  Scope: {}",
        config
            .crawler
            .path_must_contain
            .as_deref()
            .unwrap_or("(start URL path)")
    );
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);

    println!("\nHTTP:");
    println!("  Page timeout: {}ms", config.http.page_timeout_ms);
    println!("  Document timeout: {}ms", config.http.document_timeout_ms);
    println!("  Max attempts: {}", config.http.max_attempts);
    println!("  Max redirects: {}", config.http.max_redirects);

    println!("\nDocuments:");
    println!("  Extensions: {}", config.documents.extensions.join(", "));
    println!(
        "  Concurrency: {} (pause {}ms)",
        config.documents.concurrency, config.documents.batch_pause_ms
    );
    println!("  Page cap: {}", config.documents.page_cap);
    if let Some(repo) = &config.documents.repository {
        println!(
            "  Repository rewrite: {} -> {}",
            repo.path_prefix, repo.repository_url
        );
    }

    println!("\nOutput:");
    println!("  Directory: {}", config.output.output_dir);

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, cli: &Cli, config_hash: Option<&str>) -> Result<()> {
    let max_depth = config.crawler.max_depth;
    let limits = CrawlLimits::from_config(&config.crawler);
    let output_dir = PathBuf::from(&config.output.output_dir);

    let coordinator = Coordinator::new(config).context("Failed to build HTTP client")?;

    let result = if cli.skip_documents {
        tracing::info!("Skipping document downloads");
        coordinator.crawl(&cli.url, max_depth, &limits).await?
    } else {
        coordinator.harvest(&cli.url, max_depth, &limits).await?
    };

    let paths = write_result(&result, &cli.url, config_hash, &output_dir)
        .with_context(|| format!("Failed to write output to {}", output_dir.display()))?;

    tracing::info!(
        "Harvest completed: {} pages, {} documents ({} extracted)",
        result.pages.len(),
        result.discovered_documents.len(),
        result.successful_documents()
    );
    println!("✓ Aggregated text written to: {}", paths.aggregated.display());
    println!("✓ Summary written to: {}", paths.summary.display());

    Ok(())
}
