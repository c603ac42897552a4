//! iterscraper main entry point
//!
//! This is the command-line interface for iterscraper.

use anyhow::Context;
use clap::Parser;
use iterscraper::config::{parse_columns, read_config, Config};
use iterscraper::crawler::{Coordinator, MismatchPolicy};
use iterscraper::output::print_summary;
use iterscraper::ConfigError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// iterscraper: scrape pages whose URLs contain an incrementing integer
///
/// Fields are pulled from each page with CSS selectors and written as CSV,
/// one row per element matched by the first column's selector.
#[derive(Parser, Debug)]
#[command(name = "iterscraper")]
#[command(version)]
#[command(about = "Scrape a range of numbered pages into CSV", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// The URL to scrape, containing "%d" where the id should be substituted
    #[arg(long = "url", value_name = "TEMPLATE")]
    url_template: Option<String>,

    /// The first id that should be searched in the URL (inclusive)
    #[arg(long, allow_negative_numbers = true)]
    from: Option<i64>,

    /// The last id that should be searched in the URL (exclusive)
    #[arg(long, allow_negative_numbers = true)]
    to: Option<i64>,

    /// How many scrapers to run in parallel
    #[arg(long)]
    concurrency: Option<usize>,

    /// Filename to export the CSV results to
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Query string of column to selector, e.g. "name=.name&address=.addr"
    #[arg(long, value_name = "QUERY")]
    columns: Option<String>,

    /// What to do when columns match different numbers of elements (pad, truncate, fail)
    #[arg(long, value_name = "POLICY")]
    mismatch: Option<MismatchPolicy>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Validate configuration and show what would be scraped without fetching
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
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli).context("invalid configuration")?;
    let coordinator = Coordinator::new(config).context("invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&coordinator);
        return Ok(());
    }

    let output_path = coordinator.config().output.path.clone();
    let summary = coordinator
        .run()
        .await
        .with_context(|| format!("scrape into {} failed", output_path))?;

    if !cli.quiet {
        print_summary(&summary, &output_path);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("iterscraper=info,warn"),
            1 => EnvFilter::new("iterscraper=debug,info"),
            2 => EnvFilter::new("iterscraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the optional config file and layers command-line flags on top
fn build_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            read_config(path)?
        }
        None => Config::default(),
    };

    if let Some(template) = &cli.url_template {
        config.scrape.url_template = template.clone();
    }
    if let Some(from) = cli.from {
        config.scrape.from = from;
    }
    if let Some(to) = cli.to {
        config.scrape.to = to;
    }
    if let Some(concurrency) = cli.concurrency {
        config.scrape.concurrency = concurrency;
    }
    if let Some(mismatch) = cli.mismatch {
        config.scrape.mismatch = mismatch;
    }
    if let Some(output) = &cli.output {
        config.output.path = output.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.http.timeout_secs = timeout;
    }
    if let Some(columns) = &cli.columns {
        config.columns = parse_columns(columns)?;
    }

    Ok(config)
}

/// Handles the --dry-run mode: shows the plan without fetching anything
fn handle_dry_run(coordinator: &Coordinator) {
    let config = coordinator.config();
    let mut tasks = coordinator.tasks();

    println!("=== iterscraper Dry Run ===\n");

    println!("Pages:");
    println!("  Template: {}", config.scrape.url_template);
    println!("  Ids: [{}, {})", config.scrape.from, config.scrape.to);
    println!("  Task count: {}", tasks.remaining());
    if let Some(first) = tasks.next() {
        println!("  First URL: {}", first.url);
    }
    println!("  Concurrency: {}", config.scrape.concurrency);
    println!("  Timeout: {}s", config.http.timeout_secs);

    println!("\nColumns ({}):", config.columns.len());
    for column in &config.columns {
        println!("  - {} <- {}", column.header, column.selector);
    }
    println!("  Mismatch policy: {}", config.scrape.mismatch);

    println!("\nOutput:");
    println!("  File: {}", config.output.path);
    println!("  Header: {}", coordinator.header_row().join(","));

    println!("\n✓ Configuration is valid");
}
