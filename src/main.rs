//! Sumi-Trawl main entry point
//!
//! This is the command-line interface for the Sumi-Trawl single-domain crawler.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use sumi_trawl::config::{compute_config_hash, parse_config_file, Config, CrawlSettings};
use sumi_trawl::crawler::Coordinator;
use sumi_trawl::output::print_summary;
use tracing_subscriber::EnvFilter;

/// Sumi-Trawl: a polite single-domain crawler
///
/// Sumi-Trawl starts from one seed URL and visits every reachable page on the
/// same host, skipping excluded paths, duplicate content and other domains.
#[derive(Parser, Debug)]
#[command(name = "sumi-trawl")]
#[command(version)]
#[command(about = "A polite single-domain crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URL (overrides crawler.seed-url)
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Exclusion pattern, may be repeated (added to crawler.exclude-patterns)
    #[arg(long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Number of concurrent workers (overrides crawler.max-workers)
    #[arg(long, value_name = "N")]
    workers: Option<u32>,

    /// Politeness delay per worker in seconds (overrides crawler.delay-seconds)
    #[arg(long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Do not fetch or honor robots.txt
    #[arg(long)]
    no_robots: bool,

    /// Print every visited URL after the summary
    #[arg(long)]
    list_visited: bool,

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

impl Cli {
    /// Applies command-line overrides on top of the file configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(seed) = &self.seed {
            config.crawler.seed_url = Some(seed.clone());
        }
        config
            .crawler
            .exclude_patterns
            .extend(self.exclude.iter().cloned());
        if let Some(workers) = self.workers {
            config.crawler.max_workers = workers;
        }
        if let Some(delay) = self.delay {
            config.crawler.delay_seconds = delay;
        }
        if self.no_robots {
            config.robots.respect = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let config = parse_config_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            let hash = compute_config_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);

    let settings = CrawlSettings::from_config(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&settings);
        return Ok(());
    }

    handle_crawl(settings, cli.list_visited).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_trawl=info,warn"),
            1 => EnvFilter::new("sumi_trawl=debug,info"),
            2 => EnvFilter::new("sumi_trawl=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(settings: &CrawlSettings) {
    println!("=== Sumi-Trawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed: {}", settings.seed);
    println!("  Base domain: {}", settings.base_domain());
    println!("  Workers: {}", settings.max_workers);
    println!("  Delay: {:.2}s", settings.delay.as_secs_f64());
    println!("  Robots.txt: {}", if settings.respect_robots { "respected" } else { "ignored" });

    println!("\nUser Agent:");
    println!("  {}", settings.user_agent.header_value());

    println!("\nFetch:");
    println!("  Timeout: {:?}", settings.request_timeout);
    println!("  Connect timeout: {:?}", settings.connect_timeout);
    println!("  Retries: {} ({:?} apart)", settings.max_retries, settings.retry_delay);

    let exclusions = settings.classifier.exclusions();
    println!("\nExclusion Patterns ({}):", exclusions.len());
    for pattern in exclusions {
        println!("  - {}", pattern.as_str());
    }

    let rules = settings.classifier.priority_rules();
    println!("\nPriority Rules ({}):", rules.len());
    for rule in rules {
        println!("  - {} => {}", rule.pattern(), rule.score());
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(settings: CrawlSettings, list_visited: bool) -> Result<()> {
    let coordinator = Coordinator::new(settings).context("Failed to start crawl")?;

    let cancel = coordinator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            cancel.cancel();
        }
    });

    let summary = coordinator.run().await?;
    print_summary(&summary, list_visited);

    if !summary.is_clean() {
        anyhow::bail!("{} worker(s) terminated abnormally", summary.worker_failures);
    }

    Ok(())
}
