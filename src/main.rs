//! Word-Ripple main entry point
//!
//! This is the command-line interface for the Word-Ripple word frequency crawler.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use word_ripple::config::load_config;
use word_ripple::crawler::crawl;
use word_ripple::output::{below_percentile, drop_ignored, render_json};

/// Word-Ripple: word frequencies across an article's link neighbourhood
///
/// Word-Ripple counts the words of an article and of every article reachable
/// from it within DEPTH link hops, and prints the counts as JSON.
#[derive(Parser, Debug)]
#[command(name = "word-ripple")]
#[command(version = "1.0.0")]
#[command(about = "Word frequencies across an article's link neighbourhood", long_about = None)]
struct Cli {
    /// Title of the seed article
    #[arg(value_name = "ARTICLE")]
    article: String,

    /// Number of link hops to follow (0 = seed article only)
    #[arg(short, long, default_value_t = 0)]
    depth: u32,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Word to leave out of the result (repeatable)
    #[arg(long = "ignore", value_name = "WORD")]
    ignore: Vec<String>,

    /// Keep only words whose count is below this percentile of all counts
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    percentile: Option<u8>,

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

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match &cli.config {
        Some(path) => tracing::info!("Loading configuration from: {}", path.display()),
        None => tracing::info!("Using default configuration"),
    }
    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    tracing::info!(
        "Crawling '{}' to depth {} with {} workers against {}",
        cli.article,
        cli.depth,
        config.engine.workers,
        config.api.url
    );

    let result = crawl(&config, &cli.article, cli.depth)
        .await
        .context("Failed to start crawl")?;

    let mut words = match result.into_words() {
        Ok(words) => words,
        Err(error) => {
            tracing::error!("Crawl failed: {}", error);
            bail!(error);
        }
    };
    tracing::info!("Crawl completed with {} distinct words", words.len());

    drop_ignored(&mut words, &cli.ignore);
    if let Some(p) = cli.percentile {
        words = below_percentile(words, f64::from(p));
    }

    println!("{}", render_json(&words)?);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only the JSON result.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("word_ripple=info,warn"),
            1 => EnvFilter::new("word_ripple=debug,info"),
            2 => EnvFilter::new("word_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
