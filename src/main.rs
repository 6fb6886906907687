//! Sumi-Mirror main entry point
//!
//! This is the command-line interface for the Sumi-Mirror site mirror.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use sumi_mirror::config::{parse_config, parse_duration, validate, validate_seed, Config};
use sumi_mirror::crawler::crawl;
use sumi_mirror::output::{format_report, load_statistics, print_statistics};
use sumi_mirror::storage::open_index;
use tracing_subscriber::EnvFilter;

/// Sumi-Mirror: a resumable, depth-bounded site mirror
///
/// Sumi-Mirror fetches pages starting from a seed URL, stores each body under
/// a hash of its URL, and follows the links it finds up to a maximum depth.
/// Interrupted crawls resume from the index kept in the base directory.
#[derive(Parser, Debug)]
#[command(name = "sumi-mirror")]
#[command(version)]
#[command(about = "A resumable, depth-bounded site mirror", long_about = None)]
struct Cli {
    /// Absolute URL to start crawling from
    #[arg(value_name = "SEED", required_unless_present = "stats")]
    seed: Option<String>,

    /// Minimum time between requests, e.g. "5s", "250ms", "1m30s"
    #[arg(value_name = "DELAY", value_parser = parse_duration)]
    delay: Option<Duration>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum link depth from the seed (the seed is depth 0)
    #[arg(short = 'd', long, value_name = "N")]
    max_depth: Option<u32>,

    /// Directory holding the index and the mirrored pages
    #[arg(short, long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Number of concurrent fetch workers
    #[arg(short, long, value_name = "N")]
    workers: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show statistics from the index and exit
    #[arg(long)]
    stats: bool,
}

impl Cli {
    /// Applies command-line overrides on top of a loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(delay) = self.delay {
            config.crawler.request_delay = delay;
        }
        if let Some(max_depth) = self.max_depth {
            config.crawler.max_depth = max_depth;
        }
        if let Some(base_dir) = &self.base_dir {
            config.storage.base_dir = base_dir.clone();
        }
        if let Some(workers) = self.workers {
            config.crawler.workers = workers;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {:#}", e);
            return Err(e);
        }
    };

    if cli.stats {
        return handle_stats(&config);
    }

    // Guaranteed by clap unless --stats was given
    let seed = cli.seed.as_deref().context("a seed URL is required")?;

    handle_crawl(config, seed).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_mirror=info,warn"),
            1 => EnvFilter::new("sumi_mirror=debug,info"),
            2 => EnvFilter::new("sumi_mirror=trace,debug"),
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

/// Builds the effective configuration: defaults, then the file, then flags
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            // Validated below, once the flags have been applied
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => Config::default(),
    };

    cli.apply_overrides(&mut config);
    validate(&config)?;

    tracing::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Handles the --stats mode: shows statistics from the index
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let index_path = config.storage.index_path();
    if !index_path.is_file() {
        anyhow::bail!("no index found at {}", index_path.display());
    }

    println!("Index: {}\n", index_path.display());

    let index = open_index(&index_path)
        .with_context(|| format!("failed to open {}", index_path.display()))?;
    let stats = load_statistics(&index)?;

    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, seed: &str) -> anyhow::Result<()> {
    let seed = validate_seed(seed)?;

    tracing::info!("Mirroring into {}", config.storage.base_dir.display());

    match crawl(config, &seed).await {
        Ok(report) => {
            tracing::info!("Crawl finished: {}", format_report(&report));
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_positional_arguments() {
        let cli = Cli::try_parse_from(["sumi-mirror", "http://example.com/", "250ms"]).unwrap();
        assert_eq!(cli.seed.as_deref(), Some("http://example.com/"));
        assert_eq!(cli.delay, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_cli_requires_seed() {
        let err = Cli::try_parse_from(["sumi-mirror"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_stats_without_seed() {
        let cli = Cli::try_parse_from(["sumi-mirror", "--stats", "-b", "/tmp/m"]).unwrap();
        assert!(cli.stats);
        assert!(cli.seed.is_none());
    }

    #[test]
    fn test_cli_rejects_bad_delay() {
        assert!(Cli::try_parse_from(["sumi-mirror", "http://example.com/", "soon"]).is_err());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let cli = Cli::try_parse_from([
            "sumi-mirror",
            "http://example.com/",
            "2s",
            "-d",
            "0",
            "-w",
            "4",
            "-b",
            "/srv/mirror",
        ])
        .unwrap();

        let mut config = parse_config(
            r#"
            [crawler]
            max-depth = 5
            request-delay = "10s"
            workers = 2
            "#,
        )
        .unwrap();
        cli.apply_overrides(&mut config);

        assert_eq!(config.crawler.max_depth, 0);
        assert_eq!(config.crawler.request_delay, Duration::from_secs(2));
        assert_eq!(config.crawler.workers, 4);
        assert_eq!(config.storage.base_dir, PathBuf::from("/srv/mirror"));
    }

    #[test]
    fn test_build_config_validates() {
        let cli = Cli::try_parse_from(["sumi-mirror", "http://example.com/", "-w", "0"]).unwrap();
        assert!(build_config(&cli).is_err());
    }
}
